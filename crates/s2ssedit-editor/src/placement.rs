//! Placement generators that turn a drag gesture into a set of objects.
//!
//! Gestures are measured from an anchor point to the current point. Rows are
//! flat positions from the [`PositionIndex`]; angles are converted to
//! gesture space with [`angle_simple`] so that the tube's visible center is
//! at 0x80, and converted back with [`angle_normal`] when an object is
//! placed. Angle arithmetic wraps modulo 256. Points that fall outside the
//! stage are skipped.

use crate::position_index::PositionIndex;
use s2ssedit_core::{Object, ObjectKind, ObjectSet, Stage};
use serde::{Deserialize, Serialize};

/// Size of one object on the editing grid.
pub const IMAGE_SIZE: i32 = 16;
pub const HALF_IMAGE_SIZE: i32 = 8;
pub const QUARTER_IMAGE_SIZE: i32 = 4;

const CENTER_X: u8 = 0x40;
const RIGHT_ANGLE: u8 = 0x80;
const FULL_TURN: i32 = 0x100;

/// Rows past either end of the stage a gesture may reach before it is pinned.
const GESTURE_REACH: i32 = 0x400;

/// Stored angle to gesture-space angle.
pub fn angle_simple(angle: u8) -> u8 {
    angle.wrapping_add(CENTER_X)
}

/// Gesture-space angle back to a stored angle, wrapping into 8 bits.
pub fn angle_normal(angle: i32) -> u8 {
    (angle as u8).wrapping_add(CENTER_X).wrapping_add(RIGHT_ANGLE)
}

/// Angle step of one keyboard nudge.
pub fn angle_step(snap_to_grid: bool) -> i32 {
    if snap_to_grid {
        4
    } else {
        1
    }
}

/// Sign that treats zero as positive.
fn sigplus(x: i32) -> i32 {
    if x >= 0 {
        1
    } else {
        -1
    }
}

/// Angular half-width used by the wedge shapes.
pub fn clamp_wedge_delta(angledelta: i32) -> i32 {
    angledelta.abs().clamp(QUARTER_IMAGE_SIZE, HALF_IMAGE_SIZE)
}

/// Shape drawn by an insertion drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertMode {
    #[default]
    Single,
    Line,
    Loop,
    Zigzag,
    Diamond,
    Lozenge,
    Star,
    Triangle,
}

impl InsertMode {
    pub const ALL: [InsertMode; 8] = [
        Self::Single,
        Self::Line,
        Self::Loop,
        Self::Zigzag,
        Self::Diamond,
        Self::Lozenge,
        Self::Star,
        Self::Triangle,
    ];

    /// Next mode, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous mode, wrapping around.
    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for InsertMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Line => "line",
            Self::Loop => "loop",
            Self::Zigzag => "zigzag",
            Self::Diamond => "diamond",
            Self::Lozenge => "lozenge",
            Self::Star => "star",
            Self::Triangle => "triangle",
        };
        write!(f, "{name}")
    }
}

/// A point on the editing grid: flat row plus stored angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPoint {
    pub pos: i32,
    pub angle: u8,
}

impl GridPoint {
    pub fn new(pos: i32, angle: u8) -> Self {
        Self { pos, angle }
    }

    /// Flat location of an object.
    pub fn of_object(index: &PositionIndex, obj: &Object) -> Option<Self> {
        Some(Self::new(
            index.flatten(obj.segment(), obj.position())?,
            obj.angle(),
        ))
    }
}

/// One insertion drag, from press to the current pointer location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub mode: InsertMode,
    pub kind: ObjectKind,
    pub anchor: GridPoint,
    pub current: GridPoint,
    pub snap_to_grid: bool,
    pub button_held: bool,
}

/// Angle step between consecutive objects, snapped when requested.
pub fn compute_angledelta(dpos: i32, mode: InsertMode, snap_to_grid: bool, dangle: i32) -> i32 {
    let mut angledelta = dangle;
    if mode == InsertMode::Line && dpos != 0 {
        angledelta /= dpos.abs();
    }
    if snap_to_grid {
        angledelta += 3 * sigplus(angledelta);
        angledelta /= 4;
        angledelta *= 4;
    }
    angledelta
}

/// Collects placed objects, dropping rows outside the stage.
struct Placer<'a> {
    index: &'a PositionIndex,
    kind: ObjectKind,
    out: ObjectSet,
}

impl<'a> Placer<'a> {
    fn new(index: &'a PositionIndex, kind: ObjectKind) -> Self {
        Self {
            index,
            kind,
            out: ObjectSet::new(),
        }
    }

    /// Places an object at a flat row and gesture-space angle.
    fn emplace(&mut self, pos: i32, angle: i32) -> bool {
        match self.index.locate(pos) {
            Some((segment, position)) => {
                self.out
                    .insert(Object::new(segment, position, angle_normal(angle), self.kind));
                true
            }
            None => false,
        }
    }

    fn line(&mut self, dpos: i32, mut pos0: i32, pos1: i32, mut angle0: i32, angledelta: i32) {
        let delta = sigplus(dpos);
        loop {
            let placed = self.emplace(pos0, angle0);
            pos0 += delta;
            if placed {
                angle0 = wrap(angle0 + angledelta);
            }
            if pos0 == pos1 + delta {
                break;
            }
        }
    }

    fn circle(&mut self, dpos: i32, mut pos0: i32, mut angle0: i32, mut angledelta: i32, snap: bool) {
        let dy = dpos.signum();
        let (nobj, delta) = if dy != 0 {
            if angledelta == 0 {
                angledelta = angle_step(snap);
            }
            let nobj = FULL_TURN / angledelta.abs();
            let step = if nobj > 0 {
                f64::from(FULL_TURN) / f64::from(nobj)
            } else {
                0.0
            };
            (nobj, f64::from(sigplus(angledelta)) * step)
        } else {
            angledelta = angledelta.abs().max(HALF_IMAGE_SIZE);
            let nobj = (FULL_TURN - angledelta) / angledelta;
            let step = if nobj > 0 {
                f64::from(FULL_TURN - angledelta) / f64::from(nobj)
            } else {
                0.0
            };
            (nobj, step)
        };

        for _ in 0..=nobj {
            if self.emplace(pos0, angle0) {
                angle0 += delta as i32;
            }
            pos0 += dy;
        }
    }

    fn zigzag(&mut self, dpos: i32, mut pos0: i32, pos1: i32, mut angle0: i32, angledelta: i32) {
        let delta = sigplus(dpos);
        let mut angledelta = angledelta.clamp(-HALF_IMAGE_SIZE, HALF_IMAGE_SIZE);
        loop {
            let placed = self.emplace(pos0, angle0);
            pos0 += delta;
            if placed {
                angle0 = wrap(angle0 + angledelta);
                angledelta = -angledelta;
            }
            if pos0 == pos1 + delta {
                break;
            }
        }
    }

    fn diamond(&mut self, dpos: i32, pos0: i32, pos1: i32, angle0: i32, angledelta: i32) {
        let delta = sigplus(dpos);
        let angledelta = clamp_wedge_delta(angledelta);
        self.emplace(pos0, angle0);
        self.emplace(pos1, angle0);
        let mut ii = pos0 + delta;
        while ii != pos1 {
            self.emplace(ii, wrap(angle0 - angledelta));
            self.emplace(ii, wrap(angle0 + angledelta));
            ii += delta;
        }
    }

    fn star_lozenge(&mut self, dpos: i32, pos0: i32, pos1: i32, angle0: i32, angledelta: i32, fill: bool) {
        let off0 = i32::from(dpos >= 0);
        let off1 = i32::from(dpos < 0);
        self.triangle(angle0, pos0, angledelta, sigplus(dpos), (dpos + off0) / 2, fill);
        self.triangle(angle0, pos1, angledelta, -sigplus(dpos), (-dpos + off1) / 2, fill);
    }

    /// Wedge with its apex at row `y`, widening by `dx` per row over `h` rows.
    /// A negative `h` draws the wedge on the other side of the apex.
    fn triangle(&mut self, angle: i32, y: i32, mut dx: i32, mut dy: i32, h: i32, fill: bool) {
        self.emplace(y, angle);
        let (mut delta, i, last) = if h > 0 {
            (dx, y + dy, y + h)
        } else {
            let start = (-h * dx, y + h, y);
            dx = -dx;
            dy = -dy;
            start
        };
        if dy <= 0 {
            return;
        }

        // Rows outside the stage are skipped without widening the wedge.
        let mut i = i.max(0);
        let last = last.min(self.index.end_pos());
        while i < last {
            let row = i;
            i += dy;
            if fill {
                self.fill_row(row, angle, delta);
            } else {
                self.emplace(row, wrap(angle - delta));
                self.emplace(row, wrap(angle + delta));
            }
            delta += dx;
        }
    }

    /// Symmetric pairs spaced evenly from the center out to `delta`.
    fn fill_row(&mut self, row: i32, angle: i32, delta: i32) {
        let delta = i64::from(delta);
        let cnt = (2 * delta) / i64::from(HALF_IMAGE_SIZE);
        if cnt <= 0 {
            self.emplace(row, angle);
            return;
        }
        let middle = cnt % 2 == 0;
        if middle {
            self.emplace(row, angle);
        }
        let dj = 8 * delta;
        let min = if middle { cnt * i64::from(IMAGE_SIZE) } else { 0 };
        let mut j = 4 * delta * cnt;
        while j >= min {
            let jang = j as f64 / (4.0 * cnt as f64);
            self.emplace(row, (f64::from(angle) - jang) as i32);
            self.emplace(row, (f64::from(angle) + jang) as i32);
            j -= dj;
        }
    }
}

/// Keeps an angle in signed 8-bit range.
fn wrap(angle: i32) -> i32 {
    i32::from(angle as i8)
}

/// Objects an insertion gesture would place.
pub fn generate(index: &PositionIndex, gesture: &Gesture) -> ObjectSet {
    let mut placer = Placer::new(index, gesture.kind);
    let angle0 = i32::from(angle_simple(gesture.anchor.angle));
    let angle1 = i32::from(angle_simple(gesture.current.angle));
    let reach = index.end_pos().max(GESTURE_REACH);
    let pin = |pos: i32| pos.clamp(-reach, index.end_pos() + reach);
    let pos0 = pin(gesture.anchor.pos);
    let pos1 = pin(gesture.current.pos);
    let dangle = angle1 - angle0;
    let dpos = pos1 - pos0;
    let mode = gesture.mode;

    if mode == InsertMode::Single
        || (mode != InsertMode::Loop && dpos == 0)
        || !gesture.button_held
    {
        placer.emplace(pos1, angle1);
        return placer.out;
    }

    let angledelta = compute_angledelta(dpos, mode, gesture.snap_to_grid, dangle);
    match mode {
        InsertMode::Line => placer.line(dpos, pos0, pos1, angle0, angledelta),
        InsertMode::Loop => placer.circle(dpos, pos0, angle0, angledelta, gesture.snap_to_grid),
        InsertMode::Zigzag => placer.zigzag(dpos, pos0, pos1, angle0, angledelta),
        InsertMode::Diamond => placer.diamond(dpos, pos0, pos1, angle0, angledelta),
        InsertMode::Lozenge | InsertMode::Star => placer.star_lozenge(
            dpos,
            pos0,
            pos1,
            angle0,
            clamp_wedge_delta(angledelta),
            mode == InsertMode::Lozenge,
        ),
        InsertMode::Triangle => placer.triangle(
            angle0,
            pos1,
            clamp_wedge_delta(angledelta),
            -sigplus(dpos),
            -dpos,
            true,
        ),
        InsertMode::Single => {}
    }
    tracing::trace!(%mode, count = placer.out.len(), "generated placement");
    placer.out
}

/// Existing objects inside the rectangle spanned by two points.
///
/// Both corners are inclusive. A zero-size rectangle selects nothing.
pub fn box_select(stage: &Stage, index: &PositionIndex, anchor: GridPoint, current: GridPoint) -> ObjectSet {
    let mut found = ObjectSet::new();
    let angle0 = i32::from(angle_simple(anchor.angle));
    let angle1 = i32::from(angle_simple(current.angle));
    if angle0 == angle1 && anchor.pos == current.pos {
        return found;
    }

    for i in anchor.pos.min(current.pos)..=anchor.pos.max(current.pos) {
        let Some((seg, pos)) = index.locate(i) else {
            continue;
        };
        let Some(segment) = stage.segment(seg) else {
            continue;
        };
        let Some(row) = segment.row(pos) else {
            continue;
        };
        for j in angle0.min(angle1)..=angle0.max(angle1) {
            let angle = (j + 0xc0) as u8;
            if let Some(&kind) = row.get(&angle) {
                found.insert(Object::new(seg, pos, angle, kind));
            }
        }
    }
    found
}
