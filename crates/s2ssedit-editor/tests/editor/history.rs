use crate::common::{bomb, file_with, ring, set, stage_objects};
use s2ssedit_core::{Geometry, ObjectKind, ObjectSet, SegmentFlags, Terminator};
use s2ssedit_editor::{EditCommand, EditorError, History};

#[test]
fn test_repeated_segment_edit_deletes_entry() {
    let mut file = file_with(1, &[]);
    let mut history = History::new();
    let old = SegmentFlags::default();
    let flipped = SegmentFlags { flip: true, ..old };

    history.do_action(&mut file, EditCommand::alter_segment(0, 0, old, flipped));
    assert_eq!(history.undo_count(), 1);

    history.do_action(&mut file, EditCommand::alter_segment(0, 0, flipped, flipped));
    assert_eq!(history.undo_count(), 0);
    assert!(file.stage(0).unwrap().segment(0).unwrap().flip());
}

#[test]
fn test_consecutive_segment_edits_collapse() {
    let mut file = file_with(2, &[]);
    let mut history = History::new();
    let original = SegmentFlags::default();
    let step1 = SegmentFlags {
        terminator: Terminator::Checkpoint,
        ..original
    };
    let step2 = SegmentFlags {
        geometry: Geometry::TurnThenDrop,
        ..step1
    };

    history.do_action(&mut file, EditCommand::alter_segment(0, 1, original, step1));
    history.do_action(&mut file, EditCommand::alter_segment(0, 1, step1, step2));
    assert_eq!(history.undo_count(), 1);
    assert_eq!(file.stage(0).unwrap().segment(1).unwrap().flags(), step2);

    let mut selection = ObjectSet::new();
    history.undo(&mut file, &mut selection).unwrap();
    assert_eq!(file.stage(0).unwrap().segment(1).unwrap().flags(), original);
}

#[test]
fn test_segment_edits_on_different_segments_stay_separate() {
    let mut file = file_with(2, &[]);
    let mut history = History::new();
    let old = SegmentFlags::default();
    let new = SegmentFlags { flip: true, ..old };
    history.do_action(&mut file, EditCommand::alter_segment(0, 0, old, new));
    history.do_action(&mut file, EditCommand::alter_segment(0, 1, old, new));
    assert_eq!(history.undo_count(), 2);
}

#[test]
fn test_move_there_and_back_cancels() {
    let a = set(&[ring(0, 1, 0x10), bomb(0, 2, 0x20)]);
    let b = set(&[ring(0, 5, 0x10), bomb(0, 6, 0x20)]);
    let mut file = file_with(1, &a.iter().copied().collect::<Vec<_>>());
    let before = file.clone();
    let mut history = History::new();

    history.do_action(&mut file, EditCommand::move_objects(0, a.clone(), b.clone()));
    assert_eq!(stage_objects(&file, 0), b);
    history.do_action(&mut file, EditCommand::move_objects(0, b, a));
    assert!(!history.can_undo());
    assert_eq!(file, before);
}

#[test]
fn test_move_chain_splices() {
    let a = set(&[ring(0, 1, 0x10)]);
    let b = set(&[ring(0, 2, 0x10)]);
    let c = set(&[ring(0, 3, 0x14)]);
    let mut file = file_with(1, &[ring(0, 1, 0x10)]);
    let before = file.clone();
    let mut history = History::new();

    history.do_action(&mut file, EditCommand::move_objects(0, a.clone(), b.clone()));
    history.do_action(&mut file, EditCommand::move_objects(0, b, c.clone()));
    assert_eq!(history.undo_count(), 1);
    assert_eq!(stage_objects(&file, 0), c);

    let mut selection = ObjectSet::new();
    history.undo(&mut file, &mut selection).unwrap();
    assert_eq!(file, before);
    assert_eq!(selection, a);
}

#[test]
fn test_retype_back_and_forth_cancels() {
    let rings = set(&[ring(0, 0, 0), ring(0, 1, 8)]);
    let bombs: ObjectSet = rings.iter().map(|o| o.with_kind(ObjectKind::Bomb)).collect();
    let mut file = file_with(1, &rings.iter().copied().collect::<Vec<_>>());
    let before = file.clone();
    let mut history = History::new();

    history.do_action(&mut file, EditCommand::alter_selection(0, ObjectKind::Bomb, rings.clone()));
    history.do_action(&mut file, EditCommand::alter_selection(0, ObjectKind::Ring, bombs));
    assert_eq!(history.undo_count(), 0);
    assert_eq!(file, before);
}

#[test]
fn test_retype_twice_merges() {
    let rings = set(&[ring(0, 0, 0)]);
    let bombs: ObjectSet = rings.iter().map(|o| o.with_kind(ObjectKind::Bomb)).collect();
    let mut file = file_with(1, &[ring(0, 0, 0)]);
    let before = file.clone();
    let mut history = History::new();

    history.do_action(&mut file, EditCommand::alter_selection(0, ObjectKind::Bomb, rings));
    history.do_action(&mut file, EditCommand::alter_selection(0, ObjectKind::Bomb, bombs));
    assert_eq!(history.undo_count(), 1);

    let mut selection = ObjectSet::new();
    history.undo(&mut file, &mut selection).unwrap();
    assert_eq!(file, before);
}

#[test]
fn test_insert_with_replace_never_merges() {
    let mut file = file_with(1, &[]);
    let mut history = History::new();
    let first = set(&[ring(0, 0, 0)]);
    history.do_action(&mut file, EditCommand::insert_objects_ex(0, ObjectSet::new(), first.clone()));
    history.do_action(&mut file, EditCommand::insert_objects_ex(0, first, set(&[ring(0, 1, 0)])));
    assert_eq!(history.undo_count(), 2);
}

#[test]
fn test_undo_redo_cycle() {
    let mut file = file_with(1, &[]);
    let before = file.clone();
    let mut history = History::new();
    let objects = set(&[ring(0, 3, 0x40)]);

    history.do_action(&mut file, EditCommand::insert_objects(0, objects.clone()));
    let after = file.clone();
    let mut selection = ObjectSet::new();

    history.undo(&mut file, &mut selection).unwrap();
    assert_eq!(file, before);
    assert!(selection.is_empty());
    assert!(history.can_redo());
    assert_eq!(history.peek_redo().map(EditCommand::name), Some("Insert objects"));

    history.redo(&mut file, &mut selection).unwrap();
    assert_eq!(file, after);
    assert_eq!(selection, objects);
    assert!(!history.can_redo());
}

#[test]
fn test_new_action_clears_redo() {
    let mut file = file_with(1, &[]);
    let mut history = History::new();
    let mut selection = ObjectSet::new();
    history.do_action(&mut file, EditCommand::insert_objects(0, set(&[ring(0, 0, 0)])));
    history.undo(&mut file, &mut selection).unwrap();
    assert_eq!(history.redo_count(), 1);
    history.do_action(&mut file, EditCommand::insert_objects(0, set(&[ring(0, 1, 0)])));
    assert_eq!(history.redo_count(), 0);
}

#[test]
fn test_empty_stacks() {
    let mut file = file_with(1, &[]);
    let mut history = History::new();
    let mut selection = ObjectSet::new();
    assert_eq!(
        history.undo(&mut file, &mut selection),
        Err(EditorError::NothingToUndo)
    );
    assert_eq!(
        history.redo(&mut file, &mut selection),
        Err(EditorError::NothingToRedo)
    );
}

#[test]
fn test_clear() {
    let mut file = file_with(1, &[]);
    let mut history = History::new();
    history.do_action(&mut file, EditCommand::insert_objects(0, set(&[ring(0, 0, 0)])));
    history.clear();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert!(history.peek_undo().is_none());
}
