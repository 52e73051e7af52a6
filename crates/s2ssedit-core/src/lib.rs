//! # S2-SSEdit Core
//!
//! Data model and container format for Sonic 2 special stage data.
//! Provides objects, segments, stages and the object file, the bit-exact
//! reader/writer for the object and layout streams, the stream codec
//! boundary and directory bundle I/O.

pub mod bundle;
pub mod codec;
pub mod error;
mod format;
pub mod object;
pub mod object_file;
pub mod segment;
pub mod serialization;
pub mod stage;

pub use bundle::{LevelBundle, DEFAULT_LAYOUT_FILE, DEFAULT_OBJECT_FILE};
pub use codec::{PassthroughCodec, StreamCodec};
pub use error::{CodecError, CoreError, CoreResult, FormatError, FormatResult, StreamKind};
pub use object::{sets_match, Object, ObjectKind, ObjectSet};
pub use object_file::{ObjectFile, RawStreams};
pub use segment::{
    is_aerial, Geometry, Segment, SegmentFlags, SegmentStats, Terminator, DEFAULT_MAX_OBJECTS,
};
pub use serialization::{ObjectRecord, SegmentRecord, StageDocument, StageRecord};
pub use stage::Stage;
