//! Stages: ordered sequences of segments.

use crate::segment::Segment;

/// One special stage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stage {
    segments: Vec<Segment>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segment_mut(&mut self, index: usize) -> Option<&mut Segment> {
        self.segments.get_mut(index)
    }

    /// Inserts before `index`; an index past the end appends.
    pub fn insert(&mut self, index: usize, segment: Segment) {
        let index = index.min(self.segments.len());
        self.segments.insert(index, segment);
    }

    pub fn append(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Removes and returns the segment at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<Segment> {
        (index < self.segments.len()).then(|| self.segments.remove(index))
    }

    /// Swaps `index` with its predecessor. Returns false at the ends.
    pub fn move_left(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.segments.len() {
            return false;
        }
        self.segments.swap(index - 1, index);
        true
    }

    /// Swaps `index` with its successor. Returns false at the ends.
    pub fn move_right(&mut self, index: usize) -> bool {
        if index + 1 >= self.segments.len() {
            return false;
        }
        self.segments.swap(index, index + 1);
        true
    }

    /// Encoded size in the object stream.
    pub fn size(&self) -> usize {
        self.segments.iter().map(Segment::size).sum()
    }

    /// Objects across all segments.
    pub fn num_objects(&self) -> usize {
        self.segments.iter().map(Segment::num_objects).sum()
    }
}
