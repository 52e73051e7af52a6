//! Configuration for S2-SSEdit.
//!
//! Supports JSON and TOML files stored in the platform config directory.
//!
//! Configuration is organized into sections:
//! - Bundle settings (stream file names, last opened directory)
//! - Editor preferences (grid snap, insertion shapes, viewport, object limit)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use s2ssedit_core::{LevelBundle, DEFAULT_LAYOUT_FILE, DEFAULT_MAX_OBJECTS, DEFAULT_OBJECT_FILE};
use s2ssedit_editor::{InsertMode, SessionOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "s2ssedit";

/// File name of the default config file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Upper bound for the visible row count.
const MAX_VISIBLE_ROWS: i32 = 0x400;

/// Where the special stage data lives inside a disassembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// File name of the object location stream
    pub object_file: String,
    /// File name of the layout stream
    pub layout_file: String,
    /// Last opened bundle directory
    pub last_dir: Option<PathBuf>,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            object_file: DEFAULT_OBJECT_FILE.to_string(),
            layout_file: DEFAULT_LAYOUT_FILE.to_string(),
            last_dir: None,
        }
    }
}

/// Editing preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Snap angles to the 4-step grid
    pub snap_to_grid: bool,
    /// Shape drawn in ring insertion mode
    pub ring_mode: InsertMode,
    /// Shape drawn in bomb insertion mode
    pub bomb_mode: InsertMode,
    /// Rows visible at once in the stage view
    pub visible_rows: i32,
    /// Objects per segment before the game starts dropping sprites
    pub max_objects_per_segment: u16,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            ring_mode: InsertMode::Single,
            bomb_mode: InsertMode::Single,
            visible_rows: 32,
            max_objects_per_segment: DEFAULT_MAX_OBJECTS,
        }
    }
}

impl From<&EditorSettings> for SessionOptions {
    fn from(settings: &EditorSettings) -> Self {
        Self {
            snap_to_grid: settings.snap_to_grid,
            ring_mode: settings.ring_mode,
            bomb_mode: settings.bomb_mode,
            visible_rows: settings.visible_rows,
            max_objects_per_segment: settings.max_objects_per_segment,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Bundle settings
    pub bundle: BundleSettings,
    /// Editor preferences
    pub editor: EditorSettings,
}

/// File format picked from a path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file path, `<config dir>/s2ssedit/config.toml`.
    pub fn default_path() -> SettingsResult<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no platform config directory".to_string())
        })?;
        path.push(APP_DIR_NAME);
        path.push(CONFIG_FILE_NAME);
        Ok(path)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded settings");
        Ok(config)
    }

    /// Loads `path`, or the defaults when it does not exist yet.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::SaveError(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        std::fs::write(path, content)?;
        tracing::info!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bundle.object_file.trim().is_empty() {
            return Err(ConfigError::EmptyValue("bundle.object_file".to_string()));
        }
        if self.bundle.layout_file.trim().is_empty() {
            return Err(ConfigError::EmptyValue("bundle.layout_file".to_string()));
        }
        if !(1..=MAX_VISIBLE_ROWS).contains(&self.editor.visible_rows) {
            return Err(ConfigError::ValueOutOfRange {
                key: "editor.visible_rows".to_string(),
                value: self.editor.visible_rows.to_string(),
            });
        }
        if self.editor.max_objects_per_segment == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "editor.max_objects_per_segment".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Bundle rooted at `dir` using the configured stream file names.
    pub fn bundle_at(&self, dir: impl Into<PathBuf>) -> LevelBundle {
        LevelBundle::new(dir).with_file_names(&self.bundle.object_file, &self.bundle.layout_file)
    }

    /// Remembers a bundle directory as the last one opened.
    pub fn set_last_dir(&mut self, dir: impl Into<PathBuf>) {
        self.bundle.last_dir = Some(dir.into());
    }

    /// Session tunables from the editor section.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::from(&self.editor)
    }
}
