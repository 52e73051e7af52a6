//! S2-SSEdit Settings Crate
//!
//! Handles editor configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{BundleSettings, Config, EditorSettings, APP_DIR_NAME, CONFIG_FILE_NAME};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
