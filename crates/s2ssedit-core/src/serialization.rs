//! JSON export and import of the decoded stage data.
//!
//! Segments are written as plain records and rebuilt through
//! [`Segment::update`] on import, so the ring/bomb/shadow counters are always
//! derived from the imported objects. Rows that do not fit the 6-bit position
//! field are rejected.

use crate::error::{CoreResult, FormatError};
use crate::object::ObjectKind;
use crate::object_file::ObjectFile;
use crate::segment::{Geometry, Segment, SegmentFlags, Terminator, POSITION_MASK};
use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON document version.
const FILE_FORMAT_VERSION: &str = "1.0";

/// One object in a segment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub position: u8,
    pub angle: u8,
    pub kind: ObjectKind,
}

/// Serialised segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    #[serde(default)]
    pub terminator: Terminator,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub flip: bool,
    #[serde(default)]
    pub objects: Vec<ObjectRecord>,
}

/// Serialised stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageRecord {
    pub segments: Vec<SegmentRecord>,
}

/// Top-level JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDocument {
    pub version: String,
    pub stages: Vec<StageRecord>,
}

impl From<&Segment> for SegmentRecord {
    fn from(segment: &Segment) -> Self {
        Self {
            terminator: segment.terminator(),
            geometry: segment.geometry(),
            flip: segment.flip(),
            objects: segment
                .objects(0)
                .map(|obj| ObjectRecord {
                    position: obj.position(),
                    angle: obj.angle(),
                    kind: obj.kind(),
                })
                .collect(),
        }
    }
}

impl TryFrom<&SegmentRecord> for Segment {
    type Error = FormatError;

    fn try_from(record: &SegmentRecord) -> Result<Self, Self::Error> {
        let mut segment = Segment::with_flags(SegmentFlags {
            terminator: record.terminator,
            geometry: record.geometry,
            flip: record.flip,
        });
        for obj in &record.objects {
            if obj.position > POSITION_MASK {
                return Err(FormatError::PositionOutOfRange(obj.position));
            }
            segment.update(obj.position, obj.angle, obj.kind, true);
        }
        Ok(segment)
    }
}

impl From<&ObjectFile> for StageDocument {
    fn from(file: &ObjectFile) -> Self {
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            stages: file
                .stages()
                .iter()
                .map(|stage| StageRecord {
                    segments: stage.segments().iter().map(SegmentRecord::from).collect(),
                })
                .collect(),
        }
    }
}

impl TryFrom<&StageDocument> for ObjectFile {
    type Error = FormatError;

    fn try_from(doc: &StageDocument) -> Result<Self, Self::Error> {
        let stages = doc
            .stages
            .iter()
            .map(|stage| {
                let segments = stage
                    .segments
                    .iter()
                    .map(Segment::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Stage::from_segments(segments))
            })
            .collect::<Result<Vec<_>, FormatError>>()?;
        Ok(ObjectFile::from_stages(stages))
    }
}

impl ObjectFile {
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(&StageDocument::from(self))?)
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        let doc: StageDocument = serde_json::from_str(json)?;
        if doc.version != FILE_FORMAT_VERSION {
            tracing::warn!(version = %doc.version, "unexpected stage document version");
        }
        Ok(Self::try_from(&doc)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "exported stages as JSON");
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
