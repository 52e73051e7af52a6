//! # S2-SSEdit
//!
//! Editor core for the special stages of Sonic the Hedgehog 2.
//!
//! ## Architecture
//!
//! S2-SSEdit is organized as a workspace with multiple crates:
//!
//! 1. **s2ssedit-core** - Object/segment/stage model, container format, bundle I/O
//! 2. **s2ssedit-editor** - Position index, edit commands, undo/redo, placement, session
//! 3. **s2ssedit-settings** - Editor configuration files
//! 4. **s2ssedit** - Logging setup and the bundle inspector binary
//!
//! ## Features
//!
//! - **Bit-exact I/O**: decodes and re-encodes the object location and layout streams
//! - **Undoable editing**: every edit is a reversible command with merge-on-push history
//! - **Placement tools**: lines, loops, zigzags, diamonds, lozenges, stars and triangles
//! - **Headless session**: pointer gestures, clipboards and drag-and-drop without a GUI

pub mod cli;

pub use s2ssedit_core::{
    CoreError, CoreResult, Geometry, LevelBundle, Object, ObjectFile, ObjectKind, ObjectSet,
    Segment, SegmentFlags, Stage, StageDocument, StreamCodec, Terminator,
};
pub use s2ssedit_editor::{
    EditCommand, EditMode, EditorError, EditorResult, EditorSession, GridPoint, History,
    InsertMode, PointerButton, PositionIndex, SessionStatus,
};
pub use s2ssedit_settings::{Config, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
