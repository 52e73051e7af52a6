//! Headless editor session.
//!
//! [`EditorSession`] owns the document, the undo history and all interaction
//! state (cursor, selection, previews, clipboards, gesture anchor). A front
//! end forwards pointer and button events to it and re-reads
//! [`SessionStatus`] through [`EditorSession::sync_with`].

use crate::clipboard::{decode_payload, encode_payload};
use crate::commands::{EditCommand, MoveDirection};
use crate::error::{EditorError, EditorResult};
use crate::history::History;
use crate::placement::{self, GridPoint, Gesture, InsertMode};
use crate::position_index::PositionIndex;
use s2ssedit_core::{
    sets_match, Geometry, Object, ObjectFile, ObjectKind, ObjectSet, Segment, SegmentFlags,
    SegmentStats, Stage, Terminator, DEFAULT_MAX_OBJECTS,
};
use serde::{Deserialize, Serialize};

/// Rows a keyboard move can wrap around within a segment.
const ROW_WRAP: i32 = 0x40;

/// What a primary-button gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Select,
    InsertRing,
    InsertBomb,
    Delete,
}

impl EditMode {
    pub const ALL: [EditMode; 4] = [Self::Select, Self::InsertRing, Self::InsertBomb, Self::Delete];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Pointer button of a release event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Arrow-key direction for nudging the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Up,
    Down,
    Left,
    Right,
}

/// Whether the session is currently pushing state out to a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Syncing,
}

/// Tunables a front end or the settings file provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub snap_to_grid: bool,
    pub ring_mode: InsertMode,
    pub bomb_mode: InsertMode,
    /// Rows visible at once; keyboard moves scroll to keep objects inside.
    pub visible_rows: i32,
    /// Segment object total above which the status reports an overflow.
    pub max_objects_per_segment: u16,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            snap_to_grid: true,
            ring_mode: InsertMode::Single,
            bomb_mode: InsertMode::Single,
            visible_rows: 32,
            max_objects_per_segment: DEFAULT_MAX_OBJECTS,
        }
    }
}

/// Snapshot of everything a front end displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionStatus {
    pub num_stages: usize,
    pub current_stage: Option<usize>,
    pub num_segments: usize,
    pub current_segment: Option<usize>,
    pub scroll: i32,
    pub end_pos: i32,
    pub segment_flags: Option<SegmentFlags>,
    pub segment_stats: Option<SegmentStats>,
    pub mode: EditMode,
    pub ring_mode: InsertMode,
    pub bomb_mode: InsertMode,
    pub snap_to_grid: bool,
    pub selected: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub has_previous_stage: bool,
    pub has_next_stage: bool,
    pub has_previous_segment: bool,
    pub has_next_segment: bool,
    pub can_paste_objects: bool,
    pub can_paste_segment: bool,
    pub can_paste_stage: bool,
}

/// Copied objects and the scroll row they were copied at.
#[derive(Debug, Clone)]
struct ObjectClipboard {
    objects: ObjectSet,
    scroll: i32,
}

/// Editing state for one open document.
#[derive(Debug)]
pub struct EditorSession {
    file: ObjectFile,
    history: History,
    index: PositionIndex,
    options: SessionOptions,
    phase: SyncPhase,

    current_stage: usize,
    current_segment: usize,
    scroll: i32,
    mode: EditMode,

    selection: ObjectSet,
    hot: ObjectSet,
    insertion: ObjectSet,
    drag_source: ObjectSet,

    object_clipboard: Option<ObjectClipboard>,
    segment_clipboard: Option<Segment>,
    stage_clipboard: Option<Stage>,

    anchor: Option<GridPoint>,
    pending_deselect: Option<Object>,
    drag_from_selection: bool,
    drawing_box: bool,
    dragging: bool,
}

impl EditorSession {
    pub fn new(file: ObjectFile) -> Self {
        Self::with_options(file, SessionOptions::default())
    }

    pub fn with_options(file: ObjectFile, options: SessionOptions) -> Self {
        let mut session = Self {
            file,
            history: History::new(),
            index: PositionIndex::new(),
            options,
            phase: SyncPhase::Idle,
            current_stage: 0,
            current_segment: 0,
            scroll: 0,
            mode: EditMode::Select,
            selection: ObjectSet::new(),
            hot: ObjectSet::new(),
            insertion: ObjectSet::new(),
            drag_source: ObjectSet::new(),
            object_clipboard: None,
            segment_clipboard: None,
            stage_clipboard: None,
            anchor: None,
            pending_deselect: None,
            drag_from_selection: false,
            drawing_box: false,
            dragging: false,
        };
        session.rebuild_index();
        session.goto_segment(0);
        session
    }

    /// Swaps in a freshly loaded document, dropping history and transient state.
    pub fn replace_document(&mut self, file: ObjectFile) {
        self.file = file;
        self.history.clear();
        self.clear_transient();
        self.current_stage = 0;
        self.current_segment = 0;
        self.rebuild_index();
        self.goto_segment(0);
        tracing::info!(stages = self.file.num_stages(), "document replaced");
    }

    pub fn document(&self) -> &ObjectFile {
        &self.file
    }

    pub fn into_document(self) -> ObjectFile {
        self.file
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn position_index(&self) -> &PositionIndex {
        &self.index
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn current_stage(&self) -> usize {
        self.current_stage
    }

    pub fn current_segment(&self) -> usize {
        self.current_segment
    }

    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn selection(&self) -> &ObjectSet {
        &self.selection
    }

    /// Replaces the selection, e.g. from a front end's select-all.
    pub fn set_selection(&mut self, selection: ObjectSet) {
        self.selection = selection;
    }

    /// Objects inside the box currently being dragged out.
    pub fn hot(&self) -> &ObjectSet {
        &self.hot
    }

    /// Objects the current insertion or drag would place.
    pub fn insertion(&self) -> &ObjectSet {
        &self.insertion
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Records and applies a command, then refreshes the position index.
    pub fn do_action(&mut self, cmd: EditCommand) {
        self.history.do_action(&mut self.file, cmd);
        self.rebuild_index();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> EditorResult<()> {
        self.history.undo(&mut self.file, &mut self.selection)?;
        self.after_history_step();
        Ok(())
    }

    pub fn redo(&mut self) -> EditorResult<()> {
        self.history.redo(&mut self.file, &mut self.selection)?;
        self.after_history_step();
        Ok(())
    }

    fn after_history_step(&mut self) {
        if self.mode != EditMode::Select {
            self.selection.clear();
        }
        self.clamp_cursor();
    }

    fn rebuild_index(&mut self) {
        match self.file.stage(self.current_stage) {
            Some(stage) => self.index.rebuild(stage),
            None => self.index.clear(),
        }
    }

    /// Pulls stage and segment back inside the document after it shrank.
    fn clamp_cursor(&mut self) {
        let stages = self.file.num_stages();
        if self.current_stage >= stages {
            self.current_stage = stages.saturating_sub(1);
        }
        self.rebuild_index();
        let segments = self.index.num_segments();
        if self.current_segment >= segments {
            self.goto_segment(segments.saturating_sub(1));
        }
    }

    fn stage_ref(&self) -> EditorResult<&Stage> {
        self.file.stage(self.current_stage).ok_or(EditorError::NoStage)
    }

    fn segment_ref(&self) -> EditorResult<&Segment> {
        let stage = self.stage_ref()?;
        stage
            .segment(self.current_segment)
            .ok_or(EditorError::SegmentOutOfRange {
                index: self.current_segment,
                count: stage.num_segments(),
            })
    }

    /// Like [`goto_segment`](Self::goto_segment) but rejects indices past the
    /// end of the stage.
    pub fn select_segment(&mut self, segment: usize) -> EditorResult<()> {
        let count = self.index.num_segments();
        if segment >= count {
            return Err(EditorError::SegmentOutOfRange { index: segment, count });
        }
        self.goto_segment(segment);
        Ok(())
    }

    /// Makes `segment` current and scrolls to its first row.
    pub fn goto_segment(&mut self, segment: usize) {
        self.current_segment = segment;
        self.scroll = self.index.segment_start(segment).unwrap_or(0);
    }

    /// Scrolls to a flat row; the segment under it becomes current.
    pub fn set_scroll(&mut self, row: i32) {
        self.scroll = row.clamp(0, (self.index.end_pos() - 1).max(0));
        let seg = self.index.find_segment(self.scroll);
        if seg < self.index.num_segments() {
            self.current_segment = seg;
        }
    }

    fn select_stage(&mut self, stage: usize) {
        self.current_stage = stage;
        self.clamp_cursor();
    }

    pub fn goto_stage(&mut self, stage: usize) -> EditorResult<()> {
        let count = self.file.num_stages();
        if stage >= count {
            return Err(EditorError::StageOutOfRange { index: stage, count });
        }
        self.select_stage(stage);
        Ok(())
    }

    pub fn first_stage(&mut self) {
        self.select_stage(0);
    }

    pub fn previous_stage(&mut self) -> bool {
        if self.current_stage == 0 {
            return false;
        }
        self.select_stage(self.current_stage - 1);
        true
    }

    pub fn next_stage(&mut self) -> bool {
        if self.current_stage + 1 >= self.file.num_stages() {
            return false;
        }
        self.select_stage(self.current_stage + 1);
        true
    }

    pub fn last_stage(&mut self) {
        self.select_stage(self.file.num_stages().saturating_sub(1));
    }

    pub fn first_segment(&mut self) {
        self.goto_segment(0);
    }

    pub fn previous_segment(&mut self) -> bool {
        if self.current_segment == 0 {
            return false;
        }
        self.goto_segment(self.current_segment - 1);
        true
    }

    pub fn next_segment(&mut self) -> bool {
        if self.current_segment + 1 >= self.index.num_segments() {
            return false;
        }
        self.goto_segment(self.current_segment + 1);
        true
    }

    pub fn last_segment(&mut self) {
        self.goto_segment(self.index.num_segments().saturating_sub(1));
    }

    pub fn insert_stage_before(&mut self) {
        self.do_action(EditCommand::insert_stage(self.current_stage, Stage::new()));
        self.clamp_cursor();
    }

    pub fn append_stage(&mut self) {
        self.current_stage = self.file.num_stages();
        self.do_action(EditCommand::insert_stage(self.current_stage, Stage::new()));
        self.clamp_cursor();
    }

    pub fn cut_stage(&mut self) -> EditorResult<()> {
        let stage = self.stage_ref()?.clone();
        self.stage_clipboard = Some(stage.clone());
        self.do_action(EditCommand::delete_stage(self.current_stage, stage));
        self.clamp_cursor();
        Ok(())
    }

    pub fn copy_stage(&mut self) -> EditorResult<()> {
        self.stage_clipboard = Some(self.stage_ref()?.clone());
        Ok(())
    }

    /// Inserts the copied stage after the current one and moves to it.
    pub fn paste_stage(&mut self) -> EditorResult<()> {
        let stage = self
            .stage_clipboard
            .clone()
            .ok_or(EditorError::EmptyClipboard)?;
        if !self.file.is_empty() {
            self.current_stage += 1;
        }
        self.do_action(EditCommand::insert_stage(self.current_stage, stage));
        self.clamp_cursor();
        Ok(())
    }

    pub fn delete_stage(&mut self) -> EditorResult<()> {
        let stage = self.stage_ref()?.clone();
        self.do_action(EditCommand::delete_stage(self.current_stage, stage));
        self.clamp_cursor();
        Ok(())
    }

    pub fn swap_stage_previous(&mut self) -> EditorResult<()> {
        self.stage_ref()?;
        if self.current_stage == 0 {
            return Err(EditorError::AtBoundary {
                what: "stage",
                edge: "first",
            });
        }
        self.do_action(EditCommand::move_stage(self.current_stage, MoveDirection::Left));
        self.current_stage -= 1;
        self.clamp_cursor();
        Ok(())
    }

    pub fn swap_stage_next(&mut self) -> EditorResult<()> {
        self.stage_ref()?;
        if self.current_stage + 1 >= self.file.num_stages() {
            return Err(EditorError::AtBoundary {
                what: "stage",
                edge: "last",
            });
        }
        self.do_action(EditCommand::move_stage(self.current_stage, MoveDirection::Right));
        self.current_stage += 1;
        self.clamp_cursor();
        Ok(())
    }

    pub fn insert_segment_before(&mut self) -> EditorResult<()> {
        self.stage_ref()?;
        self.do_action(EditCommand::insert_segment(
            self.current_stage,
            self.current_segment,
            Segment::new(),
        ));
        self.goto_segment(self.current_segment);
        Ok(())
    }

    pub fn append_segment(&mut self) -> EditorResult<()> {
        let count = self.stage_ref()?.num_segments();
        self.do_action(EditCommand::insert_segment(self.current_stage, count, Segment::new()));
        self.goto_segment(self.index.num_segments().saturating_sub(1));
        Ok(())
    }

    pub fn cut_segment(&mut self) -> EditorResult<()> {
        let segment = self.segment_ref()?.clone();
        self.segment_clipboard = Some(segment.clone());
        self.do_action(EditCommand::delete_segment(
            self.current_stage,
            self.current_segment,
            segment,
        ));
        self.clamp_cursor();
        Ok(())
    }

    pub fn copy_segment(&mut self) -> EditorResult<()> {
        self.segment_clipboard = Some(self.segment_ref()?.clone());
        Ok(())
    }

    /// Inserts the copied segment before the current one.
    pub fn paste_segment(&mut self) -> EditorResult<()> {
        self.stage_ref()?;
        let segment = self
            .segment_clipboard
            .clone()
            .ok_or(EditorError::EmptyClipboard)?;
        self.do_action(EditCommand::insert_segment(
            self.current_stage,
            self.current_segment,
            segment,
        ));
        self.clamp_cursor();
        Ok(())
    }

    pub fn delete_segment(&mut self) -> EditorResult<()> {
        let segment = self.segment_ref()?.clone();
        self.do_action(EditCommand::delete_segment(
            self.current_stage,
            self.current_segment,
            segment,
        ));
        self.clamp_cursor();
        Ok(())
    }

    pub fn swap_segment_previous(&mut self) -> EditorResult<()> {
        self.segment_ref()?;
        if self.current_segment == 0 {
            return Err(EditorError::AtBoundary {
                what: "segment",
                edge: "first",
            });
        }
        self.do_action(EditCommand::move_segment(
            self.current_stage,
            self.current_segment,
            MoveDirection::Left,
        ));
        self.goto_segment(self.current_segment - 1);
        Ok(())
    }

    pub fn swap_segment_next(&mut self) -> EditorResult<()> {
        self.segment_ref()?;
        if self.current_segment + 1 >= self.index.num_segments() {
            return Err(EditorError::AtBoundary {
                what: "segment",
                edge: "last",
            });
        }
        self.do_action(EditCommand::move_segment(
            self.current_stage,
            self.current_segment,
            MoveDirection::Right,
        ));
        self.goto_segment(self.current_segment + 1);
        Ok(())
    }

    fn alter_current_segment(&mut self, change: impl FnOnce(&mut SegmentFlags)) -> EditorResult<()> {
        if self.phase == SyncPhase::Syncing {
            tracing::trace!("segment flag change ignored while syncing");
            return Ok(());
        }
        let old = self.segment_ref()?.flags();
        let mut new = old;
        change(&mut new);
        self.do_action(EditCommand::alter_segment(
            self.current_stage,
            self.current_segment,
            old,
            new,
        ));
        Ok(())
    }

    pub fn set_terminator(&mut self, terminator: Terminator) -> EditorResult<()> {
        self.alter_current_segment(|flags| flags.terminator = terminator)
    }

    pub fn set_geometry(&mut self, geometry: Geometry) -> EditorResult<()> {
        self.alter_current_segment(|flags| flags.geometry = geometry)
    }

    pub fn set_flip(&mut self, flip: bool) -> EditorResult<()> {
        self.alter_current_segment(|flags| flags.flip = flip)
    }

    /// The object stored at a grid point, if any.
    pub fn object_at(&self, point: GridPoint) -> Option<Object> {
        let (seg, pos) = self.index.locate(point.pos)?;
        let kind = self
            .file
            .stage(self.current_stage)?
            .segment(seg)?
            .get(pos, point.angle)?;
        Some(Object::new(seg, pos, point.angle, kind))
    }

    fn require_selection(&self) -> EditorResult<()> {
        if self.selection.is_empty() {
            Err(EditorError::NothingSelected)
        } else {
            Ok(())
        }
    }

    pub fn cut_objects(&mut self) -> EditorResult<()> {
        self.stage_ref()?;
        self.require_selection()?;
        let objects = std::mem::take(&mut self.selection);
        self.object_clipboard = Some(ObjectClipboard {
            objects: objects.clone(),
            scroll: self.scroll,
        });
        self.do_action(EditCommand::delete_selection(self.current_stage, objects));
        Ok(())
    }

    pub fn copy_objects(&mut self) -> EditorResult<()> {
        self.require_selection()?;
        self.object_clipboard = Some(ObjectClipboard {
            objects: self.selection.clone(),
            scroll: self.scroll,
        });
        Ok(())
    }

    /// Pastes copied objects shifted by how far the view scrolled since the
    /// copy. Rows are clamped into the stage; the pasted objects become the
    /// selection.
    pub fn paste_objects(&mut self) -> EditorResult<()> {
        self.stage_ref()?;
        let clip = self
            .object_clipboard
            .clone()
            .ok_or(EditorError::EmptyClipboard)?;
        if self.index.end_pos() == 0 {
            return Ok(());
        }
        let maxpos = self.index.end_pos() - 1;
        let delta = self.scroll - clip.scroll;

        self.selection.clear();
        for obj in &clip.objects {
            let Some(flat) = self.index.flatten(obj.segment(), obj.position()) else {
                continue;
            };
            let newpos = (flat + delta).clamp(0, maxpos);
            if let Some((seg, pos)) = self.index.locate(newpos) {
                self.selection.insert(obj.relocated(seg, pos, obj.angle()));
            }
        }
        self.do_action(EditCommand::insert_objects(
            self.current_stage,
            self.selection.clone(),
        ));
        Ok(())
    }

    pub fn delete_selection(&mut self) -> EditorResult<()> {
        self.stage_ref()?;
        self.require_selection()?;
        let objects = std::mem::take(&mut self.selection);
        self.do_action(EditCommand::delete_selection(self.current_stage, objects));
        Ok(())
    }

    /// Retypes every selected object.
    pub fn set_selection_kind(&mut self, kind: ObjectKind) -> EditorResult<()> {
        if self.phase == SyncPhase::Syncing {
            return Ok(());
        }
        self.stage_ref()?;
        self.require_selection()?;
        self.do_action(EditCommand::alter_selection(
            self.current_stage,
            kind,
            self.selection.clone(),
        ));
        self.selection = self
            .selection
            .iter()
            .map(|obj| obj.with_kind(kind))
            .collect();
        Ok(())
    }

    /// Nudges the selection by an angle and row delta.
    ///
    /// Rows wrap within the 64-row field of the object's own segment and
    /// angles wrap around the tube. A target cell held by an unselected
    /// object is stepped over, trying at most 64 times.
    pub fn move_selection(&mut self, dangle: i32, drow: i32) -> EditorResult<()> {
        let stage = self.stage_ref()?;
        self.require_selection()?;

        let mut moved = ObjectSet::new();
        let mut scroll_to = None;
        for obj in &self.selection {
            let Some(segment) = stage.segment(obj.segment()) else {
                continue;
            };
            if !segment.contains(obj.position(), obj.angle()) {
                continue;
            }

            let mut angle = wrap_angle(i32::from(obj.angle()) + dangle);
            let mut row = (i32::from(obj.position()) + drow).rem_euclid(ROW_WRAP);
            let mut tries = ROW_WRAP;
            while tries > 0
                && segment.contains(row as u8, angle)
                && !self
                    .selection
                    .contains(&obj.relocated(obj.segment(), row as u8, angle))
            {
                angle = wrap_angle(i32::from(angle) + dangle);
                row = (row + drow).rem_euclid(ROW_WRAP);
                tries -= 1;
            }

            if let Some(start) = self.index.segment_start(obj.segment()) {
                let flat = start + row;
                if flat < self.scroll || flat >= self.scroll + self.options.visible_rows {
                    scroll_to = Some(flat);
                }
            }
            moved.insert(obj.relocated(obj.segment(), row as u8, angle));
        }

        if let Some(row) = scroll_to {
            self.set_scroll(row);
        }
        self.do_action(EditCommand::move_objects(
            self.current_stage,
            self.selection.clone(),
            moved.clone(),
        ));
        self.selection = moved;
        Ok(())
    }

    /// Moves the selection one row, or one angle step of the current grid.
    pub fn nudge_selection(&mut self, direction: Nudge) -> EditorResult<()> {
        let step = placement::angle_step(self.options.snap_to_grid);
        match direction {
            Nudge::Up => self.move_selection(0, -1),
            Nudge::Down => self.move_selection(0, 1),
            Nudge::Left => self.move_selection(-step, 0),
            Nudge::Right => self.move_selection(step, 0),
        }
    }

    /// Empty cell becomes a ring, a ring becomes a bomb, a bomb is deleted.
    pub fn cycle_object(&mut self, point: GridPoint) -> EditorResult<()> {
        self.stage_ref()?;
        let Some((seg, pos)) = self.index.locate(point.pos) else {
            return Ok(());
        };
        self.selection.clear();
        match self.object_at(point) {
            Some(obj) if obj.kind() == ObjectKind::Bomb => {
                self.do_action(EditCommand::delete_selection(
                    self.current_stage,
                    ObjectSet::from([obj]),
                ));
            }
            Some(obj) => {
                self.do_action(EditCommand::alter_selection(
                    self.current_stage,
                    ObjectKind::Bomb,
                    ObjectSet::from([obj]),
                ));
                self.selection.insert(obj.with_kind(ObjectKind::Bomb));
            }
            None => {
                let ring = Object::new(seg, pos, point.angle, ObjectKind::Ring);
                self.selection.insert(ring);
                self.do_action(EditCommand::insert_objects(
                    self.current_stage,
                    self.selection.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Deletes the object at a point; empty cells are ignored.
    pub fn delete_object_at(&mut self, point: GridPoint) -> EditorResult<()> {
        self.stage_ref()?;
        if let Some(obj) = self.object_at(point) {
            self.do_action(EditCommand::delete_selection(
                self.current_stage,
                ObjectSet::from([obj]),
            ));
        }
        Ok(())
    }

    fn clear_transient(&mut self) {
        self.selection.clear();
        self.hot.clear();
        self.insertion.clear();
        self.drag_source.clear();
        self.anchor = None;
        self.pending_deselect = None;
        self.drag_from_selection = false;
        self.drawing_box = false;
        self.dragging = false;
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.selection.clear();
        self.hot.clear();
        self.insertion.clear();
        self.drag_source.clear();
    }

    pub fn set_ring_mode(&mut self, mode: InsertMode) {
        self.options.ring_mode = mode;
    }

    pub fn set_bomb_mode(&mut self, mode: InsertMode) {
        self.options.bomb_mode = mode;
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.options.snap_to_grid = snap;
    }

    /// Kind and shape the current insert mode places.
    fn insert_kind(&self) -> Option<(ObjectKind, InsertMode)> {
        match self.mode {
            EditMode::InsertRing => Some((ObjectKind::Ring, self.options.ring_mode)),
            EditMode::InsertBomb => Some((ObjectKind::Bomb, self.options.bomb_mode)),
            EditMode::Select | EditMode::Delete => None,
        }
    }

    /// Primary button pressed at `point`. `additive` keeps the existing
    /// selection in select mode.
    pub fn press(&mut self, point: GridPoint, additive: bool) {
        self.anchor = Some(point);
        self.pending_deselect = None;
        self.drawing_box = false;
        self.drag_from_selection = false;
        self.hot.clear();

        if self.mode != EditMode::Select {
            self.selection.clear();
            self.update_insertion(point, true);
            return;
        }

        let hotspot = self.object_at(point);
        let hot_selected = hotspot.is_some_and(|obj| self.selection.contains(&obj));
        if !additive && !hot_selected {
            self.selection.clear();
        }
        if let Some(obj) = hotspot {
            if hot_selected {
                self.pending_deselect = Some(obj);
                self.drag_from_selection = true;
            } else {
                self.selection.insert(obj);
            }
        }
    }

    /// Pointer moved to `point`.
    pub fn motion(&mut self, point: GridPoint, button_held: bool) {
        if !button_held {
            self.drawing_box = false;
        }
        match self.mode {
            EditMode::Select | EditMode::Delete => {
                if !button_held || self.dragging || self.drag_from_selection {
                    return;
                }
                let anchor = self.anchor.unwrap_or(point);
                self.hot.clear();
                if anchor == point {
                    return;
                }
                self.drawing_box = true;
                if let Ok(stage) = self.stage_ref() {
                    self.hot = placement::box_select(stage, &self.index, anchor, point);
                }
            }
            EditMode::InsertRing | EditMode::InsertBomb => {
                self.update_insertion(point, button_held);
            }
        }
    }

    fn update_insertion(&mut self, point: GridPoint, button_held: bool) {
        let Some((kind, mode)) = self.insert_kind() else {
            return;
        };
        let gesture = Gesture {
            mode,
            kind,
            anchor: self.anchor.unwrap_or(point),
            current: point,
            snap_to_grid: self.options.snap_to_grid,
            button_held,
        };
        self.insertion = placement::generate(&self.index, &gesture);
    }

    /// Button released at `point`; commits whatever the gesture built.
    pub fn release(&mut self, point: GridPoint, button: PointerButton) -> EditorResult<()> {
        let drew_box = std::mem::take(&mut self.drawing_box);
        let pending = self.pending_deselect.take();
        self.drag_from_selection = false;
        self.stage_ref()?;
        if self.index.locate(point.pos).is_none() {
            return Ok(());
        }

        match (self.mode, button) {
            (EditMode::Select, PointerButton::Primary) => {
                self.finalize_selection();
                if let Some(obj) = pending.filter(|_| !drew_box && !self.dragging) {
                    self.selection.remove(&obj);
                }
            }
            (EditMode::Select, PointerButton::Secondary) => self.cycle_object(point)?,
            (EditMode::Delete, _) => {
                if self.hot.is_empty() {
                    self.delete_object_at(point)?;
                } else {
                    let objects = std::mem::take(&mut self.hot);
                    self.do_action(EditCommand::delete_selection(self.current_stage, objects));
                }
            }
            (EditMode::InsertRing | EditMode::InsertBomb, PointerButton::Primary) => {
                self.commit_insertion();
            }
            (EditMode::InsertRing | EditMode::InsertBomb, PointerButton::Secondary) => {
                self.delete_object_at(point)?;
            }
        }
        Ok(())
    }

    /// Toggles every object of the box selection in or out of the selection.
    fn finalize_selection(&mut self) {
        for obj in std::mem::take(&mut self.hot) {
            if !self.selection.remove(&obj) {
                self.selection.insert(obj);
            }
        }
    }

    /// Inserts the preview, remembering anything it overwrites for undo.
    fn commit_insertion(&mut self) {
        if self.insertion.is_empty() {
            return;
        }
        let replaced: ObjectSet = self
            .insertion
            .iter()
            .filter_map(|obj| {
                let kind = self
                    .file
                    .stage(self.current_stage)?
                    .segment(obj.segment())?
                    .get(obj.position(), obj.angle())?;
                Some(obj.with_kind(kind))
            })
            .collect();
        let inserted = std::mem::take(&mut self.insertion);
        self.do_action(EditCommand::insert_objects_ex(
            self.current_stage,
            replaced,
            inserted,
        ));
    }

    /// Starts dragging the selection.
    pub fn begin_drag(&mut self) -> EditorResult<()> {
        self.require_selection()?;
        self.drag_source = self.selection.clone();
        self.dragging = true;
        Ok(())
    }

    /// Moves the drag preview so the press point lands on `point`.
    pub fn drag_motion(&mut self, point: GridPoint) {
        let anchor = self.anchor.unwrap_or(point);
        let dangle = i32::from(point.angle.wrapping_sub(anchor.angle) as i8);
        let dpos = point.pos - anchor.pos;

        self.insertion.clear();
        if dangle == 0 && dpos == 0 {
            self.insertion = self.drag_source.clone();
            return;
        }
        let maxpos = (self.index.end_pos() - 1).max(0);
        for obj in &self.drag_source {
            let Some(flat) = self.index.flatten(obj.segment(), obj.position()) else {
                continue;
            };
            let angle = wrap_angle(i32::from(obj.angle()) + dangle);
            if let Some((seg, pos)) = self.index.locate((flat + dpos).clamp(0, maxpos)) {
                self.insertion.insert(obj.relocated(seg, pos, angle));
            }
        }
    }

    /// Bytes describing the drag preview, if there is one.
    pub fn drag_payload(&self) -> Option<Vec<u8>> {
        (!self.insertion.is_empty()).then(|| encode_payload(&self.insertion))
    }

    /// Receives a dropped payload and moves the drag source there.
    pub fn drop_payload(&mut self, data: &[u8]) -> EditorResult<()> {
        let dropped = decode_payload(data)?;
        self.stage_ref()?;
        self.selection = dropped;
        let source = std::mem::take(&mut self.drag_source);
        if !sets_match(&source, &self.selection) {
            self.do_action(EditCommand::move_objects(
                self.current_stage,
                source,
                self.selection.clone(),
            ));
        }
        self.insertion.clear();
        self.dragging = false;
        Ok(())
    }

    /// Abandons a drag without moving anything.
    pub fn cancel_drag(&mut self) {
        self.drag_source.clear();
        self.insertion.clear();
        self.dragging = false;
    }

    /// Current display state.
    pub fn status(&self) -> SessionStatus {
        let stage = self.file.stage(self.current_stage);
        let segment = stage.and_then(|s| s.segment(self.current_segment));
        let num_segments = stage.map_or(0, Stage::num_segments);
        SessionStatus {
            num_stages: self.file.num_stages(),
            current_stage: stage.map(|_| self.current_stage),
            num_segments,
            current_segment: segment.map(|_| self.current_segment),
            scroll: self.scroll,
            end_pos: self.index.end_pos(),
            segment_flags: segment.map(Segment::flags),
            segment_stats: segment.map(|s| s.stats(self.options.max_objects_per_segment)),
            mode: self.mode,
            ring_mode: self.options.ring_mode,
            bomb_mode: self.options.bomb_mode,
            snap_to_grid: self.options.snap_to_grid,
            selected: self.selection.len(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            has_previous_stage: stage.is_some() && self.current_stage > 0,
            has_next_stage: self.current_stage + 1 < self.file.num_stages(),
            has_previous_segment: segment.is_some() && self.current_segment > 0,
            has_next_segment: self.current_segment + 1 < num_segments,
            can_paste_objects: self.object_clipboard.is_some(),
            can_paste_segment: self.segment_clipboard.is_some(),
            can_paste_stage: self.stage_clipboard.is_some(),
        }
    }

    /// Pushes the current state to a front end.
    ///
    /// The cursor is clamped, then `refresh` runs with the session in
    /// [`SyncPhase::Syncing`]. Changes to segment flags or object kinds
    /// issued from inside `refresh` are ignored, and a nested call returns
    /// `None` without running its callback.
    pub fn sync_with<F>(&mut self, refresh: F) -> Option<SessionStatus>
    where
        F: FnOnce(&mut Self, &SessionStatus),
    {
        if self.phase == SyncPhase::Syncing {
            tracing::trace!("nested sync ignored");
            return None;
        }
        self.phase = SyncPhase::Syncing;
        self.clamp_cursor();
        let status = self.status();
        refresh(self, &status);
        self.phase = SyncPhase::Idle;
        Some(status)
    }
}

/// Wraps a shifted angle back into 8 bits.
fn wrap_angle(angle: i32) -> u8 {
    angle as u8
}
