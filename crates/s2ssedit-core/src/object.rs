//! Placed objects and object sets.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Kind of a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    #[default]
    Ring,
    Bomb,
}

impl ObjectKind {
    /// Bit that distinguishes bombs from rings in an object byte.
    pub const ITEM_MASK: u8 = 0x40;

    /// Returns the kind bit as stored in the object stream.
    pub fn bits(self) -> u8 {
        match self {
            Self::Ring => 0x00,
            Self::Bomb => Self::ITEM_MASK,
        }
    }

    /// Extracts the kind from an object byte.
    pub fn from_bits(byte: u8) -> Self {
        if byte & Self::ITEM_MASK != 0 {
            Self::Bomb
        } else {
            Self::Ring
        }
    }

    /// The other kind.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ring => Self::Bomb,
            Self::Bomb => Self::Ring,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ring => write!(f, "ring"),
            Self::Bomb => write!(f, "bomb"),
        }
    }
}

/// Identifies a ring or bomb at a stage-relative location.
///
/// Objects order and compare by `(segment, position, angle)` only, so a set of
/// objects holds at most one entry per location. Use [`Object::matches`] when
/// the kind must agree as well.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Object {
    segment: usize,
    position: u8,
    angle: u8,
    kind: ObjectKind,
}

impl Object {
    /// Creates a new object.
    pub fn new(segment: usize, position: u8, angle: u8, kind: ObjectKind) -> Self {
        Self {
            segment,
            position,
            angle,
            kind,
        }
    }

    pub fn segment(&self) -> usize {
        self.segment
    }

    /// Row inside the segment.
    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Same location with a different kind.
    pub fn with_kind(self, kind: ObjectKind) -> Self {
        Self { kind, ..self }
    }

    /// Same kind at a different location.
    pub fn relocated(self, segment: usize, position: u8, angle: u8) -> Self {
        Self {
            segment,
            position,
            angle,
            ..self
        }
    }

    /// True when both location and kind agree.
    pub fn matches(&self, other: &Object) -> bool {
        self == other && self.kind == other.kind
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Object {}

impl PartialOrd for Object {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Object {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.segment, self.position, self.angle).cmp(&(
            other.segment,
            other.position,
            other.angle,
        ))
    }
}

/// Ordered set of objects, one per location.
pub type ObjectSet = BTreeSet<Object>;

/// True when both sets hold the same locations with the same kinds.
pub fn sets_match(lhs: &ObjectSet, rhs: &ObjectSet) -> bool {
    lhs.len() == rhs.len() && lhs.iter().zip(rhs.iter()).all(|(a, b)| a.matches(b))
}
