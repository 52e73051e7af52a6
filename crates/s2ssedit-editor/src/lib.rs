//! # S2-SSEdit Editor
//!
//! Editing layer on top of `s2ssedit-core`.
//!
//! ## Components
//!
//! - **Position Index**: maps a stage's segments onto one flat row axis
//! - **Commands**: reversible, mergeable edits of the object file
//! - **History**: undo/redo stacks with merge-on-push
//! - **Placement**: ring and bomb shape generators and box selection
//! - **Clipboard**: byte payload for copy/paste and drag-and-drop
//! - **Session**: headless editor state driven by pointer and menu events
//!
//! ```text
//! EditorSession
//!   ├── ObjectFile (document)
//!   ├── History ── EditCommand
//!   ├── PositionIndex
//!   └── placement / clipboard
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use s2ssedit_editor::{EditorSession, EditMode, GridPoint, PointerButton};
//!
//! let mut session = EditorSession::new(file);
//! session.set_mode(EditMode::InsertRing);
//! session.press(GridPoint::new(3, 0x10), false);
//! session.release(GridPoint::new(3, 0x10), PointerButton::Primary)?;
//! session.undo()?;
//! ```

pub mod clipboard;
pub mod commands;
pub mod error;
pub mod history;
pub mod placement;
pub mod position_index;
pub mod session;

pub use clipboard::{decode_payload, encode_payload, PAYLOAD_TYPE};
pub use commands::{
    AlterSegment, AlterSelection, EditCommand, MergeResult, MoveDirection, MoveObjects,
    MoveSegment, MoveStage, ObjectsEdit, SegmentEdit, StageEdit,
};
pub use error::{EditorError, EditorResult};
pub use history::History;
pub use placement::{
    angle_normal, angle_simple, angle_step, box_select, generate, GridPoint, Gesture, InsertMode,
};
pub use position_index::PositionIndex;
pub use session::{
    EditMode, EditorSession, Nudge, PointerButton, SessionOptions, SessionStatus, SyncPhase,
};
