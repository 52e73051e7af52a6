//! Error types for the special stage data crate.
//!
//! This module provides structured error types for container parsing and
//! serialisation, the stream codec boundary, and bundle file operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the two data streams an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// The object location stream (rings, bombs, terminators).
    Objects,
    /// The layout stream (one geometry/flip byte per segment).
    Layout,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Objects => write!(f, "object"),
            Self::Layout => write!(f, "layout"),
        }
    }
}

/// Errors raised while decoding or encoding the container format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The stream ended in the middle of a record.
    #[error("Unexpected end of {stream} stream at offset {offset}")]
    UnexpectedEof { stream: StreamKind, offset: usize },

    /// A layout byte carries geometry bits that name no known geometry.
    #[error("Invalid segment geometry value: {0:#04x}")]
    InvalidGeometry(u8),

    /// The offset table is malformed (odd length, or points outside the stream).
    #[error("Invalid {stream} offset table: {reason}")]
    InvalidOffsetTable { stream: StreamKind, reason: String },

    /// The two streams describe a different number of stages.
    #[error("Stage table mismatch: {objects} object stages, {layouts} layout stages")]
    StageTableMismatch { objects: usize, layouts: usize },

    /// An object row does not fit the 6-bit position field.
    #[error("Row position {0} does not fit in 6 bits")]
    PositionOutOfRange(u8),

    /// An offset does not fit in the 16-bit offset table.
    #[error("{stream} stream too large: offset {offset} exceeds 16 bits")]
    StreamTooLarge { stream: StreamKind, offset: usize },
}

/// Errors reported by a stream codec implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The compressed input could not be decoded.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// The raw input could not be encoded.
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Errors that can occur while loading, saving or converting stage data.
#[derive(Error, Debug)]
pub enum CoreError {
    /// One of the bundle files does not exist or cannot be opened.
    #[error("Missing bundle file: {}", .0.display())]
    MissingFile(PathBuf),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The external codec rejected a stream.
    #[error("{stream} codec error: {source}")]
    Codec {
        stream: StreamKind,
        #[source]
        source: CodecError,
    },

    /// The decoded data is not a valid container.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for container format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
