//! Segments: one stretch of special stage track with its object placements.

use crate::error::{FormatError, FormatResult};
use crate::format::ByteReader;
use crate::object::{Object, ObjectKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mask selecting the row position from an object byte.
pub const POSITION_MASK: u8 = 0x3f;
/// Angles with this bit set are in the air and cast no shadow.
pub const AERIAL_MASK: u8 = 0x80;
/// Layout byte bit holding the flip flag.
pub const FLIP_MASK: u8 = 0x80;
/// Layout byte bits holding the geometry.
pub const GEOMETRY_MASK: u8 = 0x7f;

/// Marker that ends a segment in the object stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    #[default]
    NormalSegment,
    RingsMessage,
    Checkpoint,
    ChaosEmerald,
}

impl Terminator {
    pub const ALL: [Terminator; 4] = [
        Self::NormalSegment,
        Self::RingsMessage,
        Self::Checkpoint,
        Self::ChaosEmerald,
    ];

    /// The reserved byte value written for this terminator.
    pub fn byte(self) -> u8 {
        match self {
            Self::NormalSegment => 0xff,
            Self::RingsMessage => 0xfc,
            Self::Checkpoint => 0xfe,
            Self::ChaosEmerald => 0xfd,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0xff => Some(Self::NormalSegment),
            0xfc => Some(Self::RingsMessage),
            0xfe => Some(Self::Checkpoint),
            0xfd => Some(Self::ChaosEmerald),
            _ => None,
        }
    }
}

impl std::fmt::Display for Terminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NormalSegment => write!(f, "Normal segment"),
            Self::RingsMessage => write!(f, "Rings message"),
            Self::Checkpoint => write!(f, "Checkpoint"),
            Self::ChaosEmerald => write!(f, "Chaos emerald"),
        }
    }
}

/// Shape of a segment's track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    TurnThenRise,
    TurnThenDrop,
    TurnThenStraight,
    #[default]
    Straight,
    StraightThenTurn,
}

impl Geometry {
    pub const ALL: [Geometry; 5] = [
        Self::TurnThenRise,
        Self::TurnThenDrop,
        Self::TurnThenStraight,
        Self::Straight,
        Self::StraightThenTurn,
    ];

    pub fn bits(self) -> u8 {
        match self {
            Self::TurnThenRise => 0,
            Self::TurnThenDrop => 1,
            Self::TurnThenStraight => 2,
            Self::Straight => 3,
            Self::StraightThenTurn => 4,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.get(usize::from(bits)).copied()
    }

    /// Row count of the animation for this shape.
    pub fn nominal_length(self) -> u32 {
        match self {
            Self::TurnThenRise => 24,
            Self::TurnThenDrop => 24,
            Self::TurnThenStraight => 12,
            Self::Straight => 16,
            Self::StraightThenTurn => 11,
        }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TurnThenRise => write!(f, "Turn then rise"),
            Self::TurnThenDrop => write!(f, "Turn then drop"),
            Self::TurnThenStraight => write!(f, "Turn then straight"),
            Self::Straight => write!(f, "Straight"),
            Self::StraightThenTurn => write!(f, "Straight then turn"),
        }
    }
}

/// The three per-segment flags edited together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SegmentFlags {
    pub terminator: Terminator,
    pub geometry: Geometry,
    pub flip: bool,
}

/// Objects per segment above which the game may drop sprites.
pub const DEFAULT_MAX_OBJECTS: u16 = 100;

/// Object counts of one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SegmentStats {
    pub rings: u16,
    pub bombs: u16,
    pub shadows: u16,
    pub total: u16,
    pub over_limit: bool,
}

/// True when an object at this angle is airborne.
pub fn is_aerial(angle: u8) -> bool {
    angle & AERIAL_MASK != 0
}

type Row = BTreeMap<u8, ObjectKind>;

/// A segment of track: sparse object rows plus terminator, geometry and flip.
///
/// The ring, bomb and shadow counters are maintained on every insertion,
/// replacement and removal; they are never recomputed from the rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    rows: BTreeMap<u8, Row>,
    flags: SegmentFlags,
    num_rings: u16,
    num_bombs: u16,
    num_shadows: u16,
}

impl Segment {
    /// Creates an empty straight segment ending normally.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: SegmentFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    /// Row count of a segment with the given geometry.
    ///
    /// Every geometry is laid out with the turn-then-rise row count for now;
    /// [`Geometry::nominal_length`] holds the per-shape values.
    pub fn length_of(_geometry: Geometry) -> u32 {
        Geometry::TurnThenRise.nominal_length()
    }

    pub fn length(&self) -> u32 {
        Self::length_of(self.flags.geometry)
    }

    pub fn flags(&self) -> SegmentFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: SegmentFlags) {
        self.flags = flags;
    }

    pub fn terminator(&self) -> Terminator {
        self.flags.terminator
    }

    pub fn set_terminator(&mut self, terminator: Terminator) {
        self.flags.terminator = terminator;
    }

    pub fn geometry(&self) -> Geometry {
        self.flags.geometry
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.flags.geometry = geometry;
    }

    pub fn flip(&self) -> bool {
        self.flags.flip
    }

    pub fn set_flip(&mut self, flip: bool) {
        self.flags.flip = flip;
    }

    /// The layout byte for this segment.
    pub fn flip_geometry_byte(&self) -> u8 {
        let flip = if self.flags.flip { FLIP_MASK } else { 0 };
        flip | self.flags.geometry.bits()
    }

    pub fn num_rings(&self) -> u16 {
        self.num_rings
    }

    pub fn num_bombs(&self) -> u16 {
        self.num_bombs
    }

    pub fn num_shadows(&self) -> u16 {
        self.num_shadows
    }

    /// Rings plus bombs plus shadows; the game budgets all three.
    pub fn total_objects(&self) -> u16 {
        self.num_rings + self.num_bombs + self.num_shadows
    }

    pub fn stats(&self, max_objects: u16) -> SegmentStats {
        let total = self.total_objects();
        SegmentStats {
            rings: self.num_rings,
            bombs: self.num_bombs,
            shadows: self.num_shadows,
            total,
            over_limit: total > max_objects,
        }
    }

    /// Number of placed objects.
    pub fn num_objects(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Objects in one row, keyed by angle.
    pub fn row(&self, position: u8) -> Option<&BTreeMap<u8, ObjectKind>> {
        self.rows.get(&position)
    }

    /// Every object in position-major, angle-minor order.
    pub fn objects(&self, segment: usize) -> impl Iterator<Item = Object> + '_ {
        self.rows.iter().flat_map(move |(&position, row)| {
            row.iter()
                .map(move |(&angle, &kind)| Object::new(segment, position, angle, kind))
        })
    }

    pub fn get(&self, position: u8, angle: u8) -> Option<ObjectKind> {
        self.rows.get(&position)?.get(&angle).copied()
    }

    pub fn contains(&self, position: u8, angle: u8) -> bool {
        self.get(position, angle).is_some()
    }

    /// Writes `kind` at a location.
    ///
    /// An existing object is retyped. An empty location is filled only when
    /// `insert` is set.
    pub fn update(&mut self, position: u8, angle: u8, kind: ObjectKind, insert: bool) {
        let previous = match self.rows.get_mut(&position) {
            Some(row) => match row.get_mut(&angle) {
                Some(existing) if *existing == kind => return,
                Some(existing) => Some(std::mem::replace(existing, kind)),
                None if insert => {
                    row.insert(angle, kind);
                    None
                }
                None => return,
            },
            None if insert => {
                self.rows.entry(position).or_default().insert(angle, kind);
                None
            }
            None => return,
        };
        if let Some(previous) = previous {
            self.del_obj(angle, previous);
        }
        self.add_obj(angle, kind);
    }

    /// Removes the object at a location, returning its kind.
    pub fn remove(&mut self, position: u8, angle: u8) -> Option<ObjectKind> {
        let row = self.rows.get_mut(&position)?;
        let kind = row.remove(&angle)?;
        if row.is_empty() {
            self.rows.remove(&position);
        }
        self.del_obj(angle, kind);
        Some(kind)
    }

    /// Encoded size in the object stream: two bytes per object plus terminator.
    pub fn size(&self) -> usize {
        2 * self.num_objects() + 1
    }

    fn add_obj(&mut self, angle: u8, kind: ObjectKind) {
        if !is_aerial(angle) {
            self.num_shadows += 1;
        }
        match kind {
            ObjectKind::Ring => self.num_rings += 1,
            ObjectKind::Bomb => self.num_bombs += 1,
        }
    }

    fn del_obj(&mut self, angle: u8, kind: ObjectKind) {
        if !is_aerial(angle) {
            self.num_shadows -= 1;
        }
        match kind {
            ObjectKind::Ring => self.num_rings -= 1,
            ObjectKind::Bomb => self.num_bombs -= 1,
        }
    }

    /// Reads one segment: a layout byte, then object records up to a terminator.
    pub(crate) fn read(objects: &mut ByteReader<'_>, layout: &mut ByteReader<'_>) -> FormatResult<Self> {
        let geom = layout.read_u8()?;
        let geometry =
            Geometry::from_bits(geom & GEOMETRY_MASK).ok_or(FormatError::InvalidGeometry(geom))?;
        let mut segment = Segment::with_flags(SegmentFlags {
            terminator: Terminator::NormalSegment,
            geometry,
            flip: geom & FLIP_MASK != 0,
        });

        loop {
            let byte = objects.read_u8()?;
            if let Some(terminator) = Terminator::from_byte(byte) {
                segment.flags.terminator = terminator;
                return Ok(segment);
            }
            let angle = objects.read_u8()?;
            segment.update(byte & POSITION_MASK, angle, ObjectKind::from_bits(byte), true);
        }
    }

    /// Appends this segment's object records and layout byte.
    pub(crate) fn write(&self, objects: &mut Vec<u8>, layout: &mut Vec<u8>) {
        for (&position, row) in &self.rows {
            if position > POSITION_MASK {
                tracing::warn!(position, "row position does not fit in 6 bits, masking");
            }
            for (&angle, &kind) in row {
                objects.push(kind.bits() | (position & POSITION_MASK));
                objects.push(angle);
            }
        }
        objects.push(self.flags.terminator.byte());
        layout.push(self.flip_geometry_byte());
    }
}
