//! Error types for the editor crate.
//!
//! Commands themselves never fail: a target that has disappeared makes the
//! command a no-op. These errors cover history misuse, session operations
//! whose preconditions are not met, and malformed clipboard data.

use thiserror::Error;

/// Errors that can occur in editor operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Undo was requested with an empty undo stack.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Redo was requested with an empty redo stack.
    #[error("Nothing to redo")]
    NothingToRedo,

    /// No document is loaded or it has no stages.
    #[error("No stage loaded")]
    NoStage,

    /// A stage index past the end of the document.
    #[error("Stage {index} out of range ({count} stages)")]
    StageOutOfRange { index: usize, count: usize },

    /// A segment index past the end of the current stage.
    #[error("Segment {index} out of range ({count} segments)")]
    SegmentOutOfRange { index: usize, count: usize },

    /// Paste was requested with nothing copied.
    #[error("Clipboard is empty")]
    EmptyClipboard,

    /// A clipboard payload whose length is not a whole number of records.
    #[error("Malformed clipboard payload: {len} bytes is not a multiple of 4")]
    MalformedPayload { len: usize },

    /// A clipboard record with an unknown object kind byte.
    #[error("Malformed clipboard payload: invalid object kind {0:#04x}")]
    InvalidObjectKind(u8),

    /// An operation that needs a selection was invoked without one.
    #[error("Nothing selected")]
    NothingSelected,

    /// A swap would move a stage or segment past either end.
    #[error("Cannot move {what} past the {edge} boundary")]
    AtBoundary { what: &'static str, edge: &'static str },
}

/// Result type alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
