//! Reversible edit commands.
//!
//! Every edit to the document goes through an [`EditCommand`]. A command
//! carries the state it needs to undo itself, so reverting never consults the
//! rest of the document. Commands that find their target missing do nothing.

use s2ssedit_core::{sets_match, ObjectFile, ObjectKind, ObjectSet, Segment, SegmentFlags, Stage};

/// Outcome of offering a new command to the most recent undo entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeResult {
    /// Unrelated; the new command gets its own entry.
    NoMerge,
    /// The existing entry absorbed the new command.
    Merged,
    /// Together the two commands are a no-op; drop the existing entry.
    DeleteSelf,
}

/// Direction of a stage or segment swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the start (index - 1).
    Left,
    /// Towards the end (index + 1).
    Right,
}

/// Retype a set of existing objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterSelection {
    pub stage: usize,
    pub kind: ObjectKind,
    /// Objects with their original kinds.
    pub objects: ObjectSet,
}

/// A set of objects removed from or inserted into a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectsEdit {
    pub stage: usize,
    pub objects: ObjectSet,
}

/// Remove one set of objects and insert another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveObjects {
    pub stage: usize,
    pub from: ObjectSet,
    pub to: ObjectSet,
}

/// Change a segment's terminator, geometry and flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlterSegment {
    pub stage: usize,
    pub segment: usize,
    pub old: SegmentFlags,
    pub new: SegmentFlags,
}

/// A whole segment removed from or inserted into a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentEdit {
    pub stage: usize,
    pub index: usize,
    pub segment: Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSegment {
    pub stage: usize,
    pub index: usize,
    pub direction: MoveDirection,
}

/// A whole stage removed from or inserted into the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEdit {
    pub index: usize,
    pub stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveStage {
    pub index: usize,
    pub direction: MoveDirection,
}

/// Every kind of edit the history can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum EditCommand {
    AlterSelection(AlterSelection),
    DeleteSelection(ObjectsEdit),
    InsertObjects(ObjectsEdit),
    MoveObjects(MoveObjects),
    /// Insertion that replaces whatever was under it; never merges.
    InsertObjectsEx(MoveObjects),
    AlterSegment(AlterSegment),
    DeleteSegment(SegmentEdit),
    InsertSegment(SegmentEdit),
    MoveSegment(MoveSegment),
    DeleteStage(StageEdit),
    InsertStage(StageEdit),
    MoveStage(MoveStage),
}

impl EditCommand {
    pub fn alter_selection(stage: usize, kind: ObjectKind, objects: ObjectSet) -> Self {
        Self::AlterSelection(AlterSelection {
            stage,
            kind,
            objects,
        })
    }

    pub fn delete_selection(stage: usize, objects: ObjectSet) -> Self {
        Self::DeleteSelection(ObjectsEdit { stage, objects })
    }

    pub fn insert_objects(stage: usize, objects: ObjectSet) -> Self {
        Self::InsertObjects(ObjectsEdit { stage, objects })
    }

    pub fn move_objects(stage: usize, from: ObjectSet, to: ObjectSet) -> Self {
        Self::MoveObjects(MoveObjects { stage, from, to })
    }

    /// Insert `to`, first removing the `replaced` objects it overwrites.
    pub fn insert_objects_ex(stage: usize, replaced: ObjectSet, to: ObjectSet) -> Self {
        Self::InsertObjectsEx(MoveObjects {
            stage,
            from: replaced,
            to,
        })
    }

    pub fn alter_segment(stage: usize, segment: usize, old: SegmentFlags, new: SegmentFlags) -> Self {
        Self::AlterSegment(AlterSegment {
            stage,
            segment,
            old,
            new,
        })
    }

    pub fn delete_segment(stage: usize, index: usize, segment: Segment) -> Self {
        Self::DeleteSegment(SegmentEdit {
            stage,
            index,
            segment,
        })
    }

    pub fn insert_segment(stage: usize, index: usize, segment: Segment) -> Self {
        Self::InsertSegment(SegmentEdit {
            stage,
            index,
            segment,
        })
    }

    pub fn move_segment(stage: usize, index: usize, direction: MoveDirection) -> Self {
        Self::MoveSegment(MoveSegment {
            stage,
            index,
            direction,
        })
    }

    pub fn delete_stage(index: usize, stage: Stage) -> Self {
        Self::DeleteStage(StageEdit { index, stage })
    }

    pub fn insert_stage(index: usize, stage: Stage) -> Self {
        Self::InsertStage(StageEdit { index, stage })
    }

    pub fn move_stage(index: usize, direction: MoveDirection) -> Self {
        Self::MoveStage(MoveStage { index, direction })
    }

    /// Returns the name of the command for display.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AlterSelection(_) => "Alter selection",
            Self::DeleteSelection(_) => "Delete selection",
            Self::InsertObjects(_) => "Insert objects",
            Self::MoveObjects(_) => "Move objects",
            Self::InsertObjectsEx(_) => "Insert objects",
            Self::AlterSegment(_) => "Alter segment",
            Self::DeleteSegment(_) => "Delete segment",
            Self::InsertSegment(_) => "Insert segment",
            Self::MoveSegment(_) => "Move segment",
            Self::DeleteStage(_) => "Delete stage",
            Self::InsertStage(_) => "Insert stage",
            Self::MoveStage(_) => "Move stage",
        }
    }

    /// Performs the edit. When a selection is given it is rewritten to what
    /// the edit leaves selected.
    pub fn apply(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        tracing::debug!(command = self.name(), "apply");
        match self {
            Self::AlterSelection(cmd) => cmd.apply(file, selection),
            Self::DeleteSelection(cmd) => cmd.remove(file, selection),
            Self::InsertObjects(cmd) => cmd.restore(file, selection),
            Self::MoveObjects(cmd) | Self::InsertObjectsEx(cmd) => cmd.apply(file, selection),
            Self::AlterSegment(cmd) => cmd.write(file, cmd.new, selection),
            Self::DeleteSegment(cmd) => cmd.remove(file, selection),
            Self::InsertSegment(cmd) => cmd.restore(file, selection),
            Self::MoveSegment(cmd) => cmd.apply(file, selection),
            Self::DeleteStage(cmd) => cmd.remove(file, selection),
            Self::InsertStage(cmd) => cmd.restore(file, selection),
            Self::MoveStage(cmd) => cmd.apply(file, selection),
        }
    }

    /// Undoes [`apply`](Self::apply) and restores the selection it replaced.
    pub fn revert(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        tracing::debug!(command = self.name(), "revert");
        match self {
            Self::AlterSelection(cmd) => cmd.revert(file, selection),
            Self::DeleteSelection(cmd) => cmd.restore(file, selection),
            Self::InsertObjects(cmd) => cmd.remove(file, selection),
            Self::MoveObjects(cmd) | Self::InsertObjectsEx(cmd) => cmd.revert(file, selection),
            Self::AlterSegment(cmd) => cmd.write(file, cmd.old, selection),
            Self::DeleteSegment(cmd) => cmd.restore(file, selection),
            Self::InsertSegment(cmd) => cmd.remove(file, selection),
            Self::MoveSegment(cmd) => cmd.revert(file, selection),
            Self::DeleteStage(cmd) => cmd.restore(file, selection),
            Self::InsertStage(cmd) => cmd.remove(file, selection),
            Self::MoveStage(cmd) => cmd.revert(file, selection),
        }
    }

    /// Tries to fold `other`, which is about to be pushed, into this command.
    pub fn merge(&mut self, other: &EditCommand) -> MergeResult {
        let result = match (self, other) {
            (Self::AlterSelection(this), Self::AlterSelection(next)) => this.merge(next),
            (Self::MoveObjects(this), Self::MoveObjects(next)) => this.merge(next),
            (Self::AlterSegment(this), Self::AlterSegment(next)) => this.merge(next),
            _ => MergeResult::NoMerge,
        };
        if result != MergeResult::NoMerge {
            tracing::debug!(?result, command = other.name(), "merged command");
        }
        result
    }
}

fn clear(selection: Option<&mut ObjectSet>) {
    if let Some(sel) = selection {
        sel.clear();
    }
}

impl AlterSelection {
    fn apply(&self, file: &mut ObjectFile, mut selection: Option<&mut ObjectSet>) {
        if let Some(sel) = selection.as_deref_mut() {
            sel.clear();
        }
        let Some(stage) = file.stage_mut(self.stage) else {
            return;
        };
        for obj in &self.objects {
            let Some(segment) = stage.segment_mut(obj.segment()) else {
                continue;
            };
            segment.update(obj.position(), obj.angle(), self.kind, false);
            if let Some(sel) = selection.as_deref_mut() {
                sel.insert(obj.with_kind(self.kind));
            }
        }
    }

    fn revert(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        if let Some(stage) = file.stage_mut(self.stage) {
            for obj in &self.objects {
                if let Some(segment) = stage.segment_mut(obj.segment()) {
                    segment.update(obj.position(), obj.angle(), obj.kind(), false);
                }
            }
        }
        if let Some(sel) = selection {
            sel.clone_from(&self.objects);
        }
    }

    fn merge(&mut self, next: &AlterSelection) -> MergeResult {
        if self.stage != next.stage
            || self.objects.len() != next.objects.len()
            || !self.objects.iter().eq(next.objects.iter())
        {
            return MergeResult::NoMerge;
        }
        if self.objects.iter().any(|obj| obj.kind() != next.kind) {
            self.kind = next.kind;
            MergeResult::Merged
        } else {
            MergeResult::DeleteSelf
        }
    }
}

fn remove_objects(
    file: &mut ObjectFile,
    stage: usize,
    objects: &ObjectSet,
    selection: Option<&mut ObjectSet>,
) {
    clear(selection);
    let Some(stage) = file.stage_mut(stage) else {
        return;
    };
    for obj in objects {
        if let Some(segment) = stage.segment_mut(obj.segment()) {
            segment.remove(obj.position(), obj.angle());
        }
    }
}

fn restore_objects(
    file: &mut ObjectFile,
    stage: usize,
    objects: &ObjectSet,
    selection: Option<&mut ObjectSet>,
) {
    if let Some(stage) = file.stage_mut(stage) {
        for obj in objects {
            if let Some(segment) = stage.segment_mut(obj.segment()) {
                segment.update(obj.position(), obj.angle(), obj.kind(), true);
            }
        }
    }
    if let Some(sel) = selection {
        sel.clone_from(objects);
    }
}

impl ObjectsEdit {
    fn remove(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        remove_objects(file, self.stage, &self.objects, selection);
    }

    fn restore(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        restore_objects(file, self.stage, &self.objects, selection);
    }
}

impl MoveObjects {
    fn apply(&self, file: &mut ObjectFile, mut selection: Option<&mut ObjectSet>) {
        remove_objects(file, self.stage, &self.from, selection.as_deref_mut());
        restore_objects(file, self.stage, &self.to, selection);
    }

    fn revert(&self, file: &mut ObjectFile, mut selection: Option<&mut ObjectSet>) {
        remove_objects(file, self.stage, &self.to, selection.as_deref_mut());
        restore_objects(file, self.stage, &self.from, selection);
    }

    fn merge(&mut self, next: &MoveObjects) -> MergeResult {
        if self.stage != next.stage || !sets_match(&self.to, &next.from) {
            return MergeResult::NoMerge;
        }
        if sets_match(&self.from, &next.to) {
            return MergeResult::DeleteSelf;
        }
        self.to.clone_from(&next.to);
        MergeResult::Merged
    }
}

impl AlterSegment {
    fn write(&self, file: &mut ObjectFile, flags: SegmentFlags, selection: Option<&mut ObjectSet>) {
        let Some(segment) = file
            .stage_mut(self.stage)
            .and_then(|stage| stage.segment_mut(self.segment))
        else {
            return;
        };
        segment.set_flags(flags);
        clear(selection);
    }

    fn merge(&mut self, next: &AlterSegment) -> MergeResult {
        if self.stage != next.stage || self.segment != next.segment {
            return MergeResult::NoMerge;
        }
        if self.new == next.new {
            return MergeResult::DeleteSelf;
        }
        self.new = next.new;
        MergeResult::Merged
    }
}

impl SegmentEdit {
    fn remove(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        let Some(stage) = file.stage_mut(self.stage) else {
            return;
        };
        if stage.remove(self.index).is_some() {
            clear(selection);
        }
    }

    fn restore(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        let Some(stage) = file.stage_mut(self.stage) else {
            return;
        };
        if self.index <= stage.num_segments() {
            stage.insert(self.index, self.segment.clone());
        }
        clear(selection);
    }
}

impl MoveSegment {
    fn apply(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        if let Some(stage) = file.stage_mut(self.stage) {
            match self.direction {
                MoveDirection::Right => stage.move_right(self.index),
                MoveDirection::Left => stage.move_left(self.index),
            };
        }
        clear(selection);
    }

    fn revert(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        if let Some(stage) = file.stage_mut(self.stage) {
            match self.direction {
                MoveDirection::Left => {
                    if let Some(prev) = self.index.checked_sub(1) {
                        stage.move_right(prev);
                    }
                }
                MoveDirection::Right => {
                    stage.move_left(self.index + 1);
                }
            }
        }
        clear(selection);
    }
}

impl StageEdit {
    fn remove(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        if file.remove(self.index).is_some() {
            clear(selection);
        }
    }

    fn restore(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        if self.index <= file.num_stages() {
            file.insert(self.index, self.stage.clone());
        }
        clear(selection);
    }
}

impl MoveStage {
    fn apply(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        match self.direction {
            MoveDirection::Right => file.move_right(self.index),
            MoveDirection::Left => file.move_left(self.index),
        };
        clear(selection);
    }

    fn revert(&self, file: &mut ObjectFile, selection: Option<&mut ObjectSet>) {
        match self.direction {
            MoveDirection::Left => {
                if let Some(prev) = self.index.checked_sub(1) {
                    file.move_right(prev);
                }
            }
            MoveDirection::Right => {
                file.move_left(self.index + 1);
            }
        }
        clear(selection);
    }
}
