//! The decoded level file: every special stage in order.

use crate::error::{FormatError, FormatResult, StreamKind};
use crate::format::{read_offset_table, write_offset, ByteReader};
use crate::segment::Segment;
use crate::stage::Stage;

/// Decoded object and layout streams for all stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStreams {
    pub objects: Vec<u8>,
    pub layout: Vec<u8>,
}

/// All special stages of a game, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectFile {
    stages: Vec<Stage>,
}

impl ObjectFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn stage_mut(&mut self, index: usize) -> Option<&mut Stage> {
        self.stages.get_mut(index)
    }

    /// Inserts before `index`; an index past the end appends.
    pub fn insert(&mut self, index: usize, stage: Stage) {
        let index = index.min(self.stages.len());
        self.stages.insert(index, stage);
    }

    pub fn append(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn remove(&mut self, index: usize) -> Option<Stage> {
        (index < self.stages.len()).then(|| self.stages.remove(index))
    }

    pub fn move_left(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.stages.len() {
            return false;
        }
        self.stages.swap(index - 1, index);
        true
    }

    pub fn move_right(&mut self, index: usize) -> bool {
        if index + 1 >= self.stages.len() {
            return false;
        }
        self.stages.swap(index, index + 1);
        true
    }

    /// Size of the decoded object stream, offset table included.
    pub fn size(&self) -> usize {
        2 * self.stages.len() + self.stages.iter().map(Stage::size).sum::<usize>()
    }

    /// Parses the decoded object and layout streams.
    ///
    /// Two empty streams decode to a file with no stages.
    pub fn from_streams(objects: &[u8], layout: &[u8]) -> FormatResult<Self> {
        if objects.is_empty() && layout.is_empty() {
            return Ok(Self::default());
        }

        let mut obj = ByteReader::new(objects, StreamKind::Objects);
        let mut lay = ByteReader::new(layout, StreamKind::Layout);
        let obj_spans = read_offset_table(&mut obj, objects.len())?;
        let lay_spans = read_offset_table(&mut lay, layout.len())?;
        if obj_spans.len() != lay_spans.len() {
            return Err(FormatError::StageTableMismatch {
                objects: obj_spans.len(),
                layouts: lay_spans.len(),
            });
        }

        let mut stages = Vec::with_capacity(obj_spans.len());
        for (obj_span, lay_span) in obj_spans.iter().zip(&lay_spans) {
            obj.seek(obj_span.start);
            lay.seek(lay_span.start);
            let mut stage = Stage::new();
            while obj.position() < obj_span.end && lay.position() < lay_span.end {
                stage.append(Segment::read(&mut obj, &mut lay)?);
            }
            stages.push(stage);
        }

        tracing::debug!(
            stages = stages.len(),
            object_bytes = objects.len(),
            layout_bytes = layout.len(),
            "decoded special stage streams"
        );
        Ok(Self { stages })
    }

    /// Serialises into decoded object and layout streams.
    pub fn to_streams(&self) -> FormatResult<RawStreams> {
        let table = 2 * self.stages.len();
        let mut objects = Vec::with_capacity(self.size());
        let mut layout = Vec::with_capacity(
            table + self.stages.iter().map(Stage::num_segments).sum::<usize>(),
        );

        let mut obj_off = table;
        let mut lay_off = table;
        for stage in &self.stages {
            write_offset(&mut objects, obj_off, StreamKind::Objects)?;
            write_offset(&mut layout, lay_off, StreamKind::Layout)?;
            obj_off += stage.size();
            lay_off += stage.num_segments();
        }

        for stage in &self.stages {
            for segment in stage.segments() {
                segment.write(&mut objects, &mut layout);
            }
        }

        Ok(RawStreams { objects, layout })
    }
}
