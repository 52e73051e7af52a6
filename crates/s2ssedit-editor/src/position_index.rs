//! Flattened row positions for the current stage.
//!
//! Rows are numbered continuously across all segments of a stage. The index
//! maps such a flat row back to its segment and must be rebuilt whenever the
//! segment list or a segment's geometry changes.

use s2ssedit_core::Stage;

/// Cumulative segment start rows of one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    segpos: Vec<i32>,
    endpos: i32,
}

impl PositionIndex {
    /// Index of a stage with no segments.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stage(stage: &Stage) -> Self {
        let mut index = Self::new();
        index.rebuild(stage);
        index
    }

    /// Recomputes segment starts from each segment's length.
    pub fn rebuild(&mut self, stage: &Stage) {
        self.segpos.clear();
        let mut pos = 0i32;
        for segment in stage.segments() {
            self.segpos.push(pos);
            pos += segment.length() as i32;
        }
        self.endpos = pos;
        tracing::trace!(
            segments = self.segpos.len(),
            endpos = self.endpos,
            "rebuilt position index"
        );
    }

    pub fn clear(&mut self) {
        self.segpos.clear();
        self.endpos = 0;
    }

    pub fn num_segments(&self) -> usize {
        self.segpos.len()
    }

    /// Total rows in the stage.
    pub fn end_pos(&self) -> i32 {
        self.endpos
    }

    pub fn segment_starts(&self) -> &[i32] {
        &self.segpos
    }

    /// First flat row of a segment.
    pub fn segment_start(&self, segment: usize) -> Option<i32> {
        self.segpos.get(segment).copied()
    }

    pub fn contains(&self, pos: i32) -> bool {
        (0..self.endpos).contains(&pos)
    }

    /// Segment holding a flat row.
    ///
    /// Rows outside `[0, end_pos)` yield [`num_segments`](Self::num_segments),
    /// which callers compare against the segment count.
    pub fn find_segment(&self, pos: i32) -> usize {
        if !self.contains(pos) {
            return self.segpos.len();
        }
        let seg = self.segpos.partition_point(|&start| start < pos);
        if self.segpos.get(seg) == Some(&pos) {
            seg
        } else {
            seg - 1
        }
    }

    /// Segment and in-segment row for a flat row, if it is inside the stage.
    pub fn locate(&self, pos: i32) -> Option<(usize, u8)> {
        let seg = self.find_segment(pos);
        let start = self.segment_start(seg)?;
        Some((seg, (pos - start) as u8))
    }

    /// Flat row of a segment-relative position.
    pub fn flatten(&self, segment: usize, position: u8) -> Option<i32> {
        Some(self.segment_start(segment)? + i32::from(position))
    }
}
