use crate::common::{bomb, file_with, ring, set, stage_objects, stage_with};
use s2ssedit_core::{ObjectFile, ObjectKind, Stage, Terminator};
use s2ssedit_editor::{
    EditCommand, EditMode, EditorError, EditorSession, GridPoint, InsertMode, Nudge,
    PointerButton, SyncPhase,
};

fn at(pos: i32, angle: u8) -> GridPoint {
    GridPoint::new(pos, angle)
}

fn objects(session: &EditorSession) -> s2ssedit_core::ObjectSet {
    stage_objects(session.document(), session.current_stage())
}

#[test]
fn test_right_click_cycles_object() {
    let mut session = EditorSession::new(file_with(2, &[]));
    let point = at(3, 0x10);

    session.press(point, false);
    session.release(point, PointerButton::Secondary).unwrap();
    assert_eq!(objects(&session), set(&[ring(0, 3, 0x10)]));
    assert_eq!(session.selection(), &set(&[ring(0, 3, 0x10)]));

    session.press(point, false);
    session.release(point, PointerButton::Secondary).unwrap();
    let stored = session.document().stage(0).unwrap().segment(0).unwrap().get(3, 0x10);
    assert_eq!(stored, Some(ObjectKind::Bomb));

    session.cycle_object(point).unwrap();
    assert!(objects(&session).is_empty());
    assert_eq!(session.history().undo_count(), 3);

    for _ in 0..3 {
        session.undo().unwrap();
    }
    assert!(objects(&session).is_empty());
    assert_eq!(session.undo(), Err(EditorError::NothingToUndo));
}

#[test]
fn test_cycle_in_second_segment() {
    let mut session = EditorSession::new(file_with(2, &[]));
    session.cycle_object(at(30, 0x40)).unwrap();
    assert_eq!(objects(&session), set(&[ring(1, 6, 0x40)]));
}

#[test]
fn test_insert_replaces_and_undo_restores() {
    let mut session = EditorSession::new(file_with(1, &[bomb(0, 2, 0x00)]));
    let before = session.document().clone();
    session.set_mode(EditMode::InsertRing);

    session.press(at(2, 0x00), true);
    assert_eq!(session.insertion(), &set(&[ring(0, 2, 0x00)]));
    session.release(at(2, 0x00), PointerButton::Primary).unwrap();

    let stored = session.document().stage(0).unwrap().segment(0).unwrap().get(2, 0x00);
    assert_eq!(stored, Some(ObjectKind::Ring));
    assert!(session.insertion().is_empty());

    session.undo().unwrap();
    assert_eq!(session.document(), &before);
    assert!(session.selection().is_empty());

    session.redo().unwrap();
    let stored = session.document().stage(0).unwrap().segment(0).unwrap().get(2, 0x00);
    assert_eq!(stored, Some(ObjectKind::Ring));
}

#[test]
fn test_line_insertion_gesture() {
    let mut session = EditorSession::new(file_with(1, &[]));
    session.set_ring_mode(InsertMode::Line);
    session.set_mode(EditMode::InsertRing);

    session.press(at(0, 0), false);
    session.motion(at(4, 64), true);
    assert_eq!(session.insertion().len(), 5);
    session.release(at(4, 64), PointerButton::Primary).unwrap();

    assert_eq!(
        objects(&session),
        set(&[
            ring(0, 0, 0),
            ring(0, 1, 16),
            ring(0, 2, 32),
            ring(0, 3, 48),
            ring(0, 4, 64),
        ])
    );
    assert_eq!(session.history().undo_count(), 1);
}

#[test]
fn test_bomb_mode_inserts_bombs() {
    let mut session = EditorSession::new(file_with(1, &[]));
    session.set_mode(EditMode::InsertBomb);
    session.press(at(7, 0x20), false);
    session.release(at(7, 0x20), PointerButton::Primary).unwrap();
    assert_eq!(objects(&session), set(&[bomb(0, 7, 0x20)]));
    let stored = session.document().stage(0).unwrap().segment(0).unwrap().get(7, 0x20);
    assert_eq!(stored, Some(ObjectKind::Bomb));

    session.press(at(7, 0x20), false);
    session.release(at(7, 0x20), PointerButton::Secondary).unwrap();
    assert!(objects(&session).is_empty());
}

#[test]
fn test_paste_follows_scroll() {
    let mut session = EditorSession::new(file_with(2, &[ring(0, 1, 0x10)]));
    session.set_selection(set(&[ring(0, 1, 0x10)]));
    session.copy_objects().unwrap();

    session.goto_segment(1);
    assert_eq!(session.scroll(), 24);
    session.paste_objects().unwrap();
    assert_eq!(session.selection(), &set(&[ring(1, 1, 0x10)]));
    assert_eq!(objects(&session), set(&[ring(0, 1, 0x10), ring(1, 1, 0x10)]));

    session.set_scroll(100);
    assert_eq!(session.scroll(), 47);
    session.paste_objects().unwrap();
    assert!(objects(&session).contains(&ring(1, 23, 0x10)));
}

#[test]
fn test_cut_then_paste() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 4, 0x20), bomb(0, 5, 0x20)]));
    let before = session.document().clone();
    session.set_selection(set(&[ring(0, 4, 0x20), bomb(0, 5, 0x20)]));
    session.cut_objects().unwrap();
    assert!(objects(&session).is_empty());
    assert!(session.selection().is_empty());
    assert!(session.status().can_paste_objects);

    session.paste_objects().unwrap();
    assert_eq!(session.document(), &before);
}

#[test]
fn test_object_ops_need_selection_or_clipboard() {
    let mut session = EditorSession::new(file_with(1, &[]));
    assert_eq!(session.delete_selection(), Err(EditorError::NothingSelected));
    assert_eq!(session.copy_objects(), Err(EditorError::NothingSelected));
    assert_eq!(session.paste_objects(), Err(EditorError::EmptyClipboard));
    assert_eq!(session.move_selection(4, 0), Err(EditorError::NothingSelected));
    assert_eq!(session.begin_drag(), Err(EditorError::NothingSelected));
}

#[test]
fn test_keyboard_move_steps_over_objects() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 5, 0x10), ring(0, 5, 0x14)]));
    let before = session.document().clone();
    session.set_selection(set(&[ring(0, 5, 0x10)]));

    session.move_selection(4, 0).unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 5, 0x18)]));
    assert_eq!(objects(&session), set(&[ring(0, 5, 0x14), ring(0, 5, 0x18)]));

    session.move_selection(-4, 0).unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 5, 0x10)]));
    assert_eq!(session.document(), &before);
    assert!(!session.can_undo());
}

#[test]
fn test_keyboard_move_wraps_rows_and_angles() {
    let mut session = EditorSession::new(file_with(1, &[bomb(0, 0, 0xfe)]));
    session.set_selection(set(&[bomb(0, 0, 0xfe)]));
    session.move_selection(4, -1).unwrap();
    assert_eq!(session.selection(), &set(&[bomb(0, 63, 0x02)]));
    let kinds: Vec<_> = session.selection().iter().map(|o| o.kind()).collect();
    assert_eq!(kinds, vec![ObjectKind::Bomb]);
}

#[test]
fn test_nudge_uses_grid_step() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 5, 0x10)]));
    session.set_selection(set(&[ring(0, 5, 0x10)]));

    session.nudge_selection(Nudge::Right).unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 5, 0x14)]));
    session.nudge_selection(Nudge::Down).unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 6, 0x14)]));

    session.set_snap_to_grid(false);
    session.nudge_selection(Nudge::Left).unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 6, 0x13)]));
    session.nudge_selection(Nudge::Up).unwrap();
    assert_eq!(objects(&session), set(&[ring(0, 5, 0x13)]));
}

#[test]
fn test_retype_selection() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 0, 0), ring(0, 1, 0)]));
    session.set_selection(set(&[ring(0, 0, 0), ring(0, 1, 0)]));
    session.set_selection_kind(ObjectKind::Bomb).unwrap();
    assert!(session.selection().iter().all(|o| o.kind() == ObjectKind::Bomb));
    let segment = session.document().stage(0).unwrap().segment(0).unwrap();
    assert_eq!(segment.num_bombs(), 2);

    session.set_selection_kind(ObjectKind::Ring).unwrap();
    assert!(!session.can_undo());
}

#[test]
fn test_box_selection_toggles() {
    let mut session = EditorSession::new(file_with(
        1,
        &[ring(0, 1, 0x00), ring(0, 2, 0x00), ring(0, 3, 0x80)],
    ));

    session.press(at(0, 0xf0), false);
    session.motion(at(4, 0x10), true);
    assert_eq!(session.hot(), &set(&[ring(0, 1, 0x00), ring(0, 2, 0x00)]));
    session.release(at(4, 0x10), PointerButton::Primary).unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 1, 0x00), ring(0, 2, 0x00)]));
    assert!(session.hot().is_empty());

    session.press(at(2, 0xf0), true);
    session.motion(at(2, 0x10), true);
    session.release(at(2, 0x10), PointerButton::Primary).unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 1, 0x00)]));
}

#[test]
fn test_click_selects_object() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 1, 0x00), ring(0, 2, 0x00)]));
    session.press(at(1, 0x00), false);
    session.release(at(1, 0x00), PointerButton::Primary).unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 1, 0x00)]));

    session.press(at(2, 0x00), true);
    session.release(at(2, 0x00), PointerButton::Primary).unwrap();
    assert_eq!(session.selection().len(), 2);

    session.press(at(10, 0x00), false);
    assert!(session.selection().is_empty());
}

#[test]
fn test_delete_mode() {
    let mut session = EditorSession::new(file_with(
        1,
        &[ring(0, 1, 0x00), ring(0, 2, 0x00), ring(0, 8, 0x00)],
    ));
    session.set_mode(EditMode::Delete);

    session.press(at(8, 0x00), false);
    session.release(at(8, 0x00), PointerButton::Primary).unwrap();
    assert_eq!(objects(&session), set(&[ring(0, 1, 0x00), ring(0, 2, 0x00)]));

    session.press(at(0, 0xf0), false);
    session.motion(at(3, 0x10), true);
    session.release(at(3, 0x10), PointerButton::Primary).unwrap();
    assert!(objects(&session).is_empty());
}

#[test]
fn test_drag_and_drop_moves_selection() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 2, 0x00), bomb(0, 3, 0x00)]));
    let before = session.document().clone();

    session.press(at(2, 0x00), false);
    session.press(at(3, 0x00), true);
    assert_eq!(session.selection().len(), 2);

    session.press(at(2, 0x00), false);
    assert_eq!(session.selection().len(), 2);
    session.begin_drag().unwrap();
    assert!(session.is_dragging());

    session.drag_motion(at(5, 0x08));
    assert_eq!(session.insertion(), &set(&[ring(0, 5, 0x08), bomb(0, 6, 0x08)]));
    let payload = session.drag_payload().unwrap();
    assert_eq!(payload.len(), 8);

    session.drop_payload(&payload).unwrap();
    assert!(!session.is_dragging());
    assert_eq!(session.history().undo_count(), 1);
    assert_eq!(session.history().peek_undo().map(EditCommand::name), Some("Move objects"));
    assert_eq!(objects(&session), set(&[ring(0, 5, 0x08), bomb(0, 6, 0x08)]));
    let stored = session.document().stage(0).unwrap().segment(0).unwrap().get(6, 0x08);
    assert_eq!(stored, Some(ObjectKind::Bomb));

    session.undo().unwrap();
    assert_eq!(session.document(), &before);
}

#[test]
fn test_drop_in_place_records_nothing() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 2, 0x00)]));
    session.press(at(2, 0x00), false);
    session.begin_drag().unwrap();
    session.drag_motion(at(2, 0x00));
    let payload = session.drag_payload().unwrap();
    session.drop_payload(&payload).unwrap();
    assert!(!session.can_undo());
}

#[test]
fn test_drop_rejects_bad_payload() {
    let mut session = EditorSession::new(file_with(1, &[]));
    assert_eq!(
        session.drop_payload(&[0, 0, 0]),
        Err(EditorError::MalformedPayload { len: 3 })
    );
}

#[test]
fn test_stage_operations() {
    let a = stage_with(1, &[ring(0, 0, 0)]);
    let b = stage_with(2, &[]);
    let mut session = EditorSession::new(ObjectFile::from_stages(vec![a.clone(), b.clone()]));
    let before = session.document().clone();

    session.copy_stage().unwrap();
    session.paste_stage().unwrap();
    assert_eq!(session.current_stage(), 1);
    assert_eq!(session.document().stages(), &[a.clone(), a.clone(), b.clone()]);

    session.swap_stage_next().unwrap();
    assert_eq!(session.current_stage(), 2);
    assert_eq!(session.document().stages(), &[a.clone(), b.clone(), a.clone()]);
    assert_eq!(
        session.swap_stage_next(),
        Err(EditorError::AtBoundary {
            what: "stage",
            edge: "last"
        })
    );

    session.delete_stage().unwrap();
    assert_eq!(session.current_stage(), 1);
    assert_eq!(session.document().num_stages(), 2);

    for _ in 0..3 {
        session.undo().unwrap();
        assert!(session.current_stage() < session.document().num_stages());
    }
    assert_eq!(session.document(), &before);
}

#[test]
fn test_stage_navigation() {
    let stages = vec![stage_with(1, &[]), stage_with(3, &[]), stage_with(2, &[])];
    let mut session = EditorSession::new(ObjectFile::from_stages(stages));
    assert!(!session.previous_stage());
    assert!(session.next_stage());
    session.last_segment();
    assert_eq!(session.current_segment(), 2);

    session.last_stage();
    assert_eq!(session.current_stage(), 2);
    assert_eq!(session.current_segment(), 1);
    assert!(!session.next_stage());

    session.first_stage();
    assert_eq!(session.current_stage(), 0);
    assert_eq!(session.current_segment(), 0);

    assert_eq!(
        session.goto_stage(7),
        Err(EditorError::StageOutOfRange { index: 7, count: 3 })
    );
    session.goto_stage(1).unwrap();
    assert_eq!(session.current_stage(), 1);
}

#[test]
fn test_cut_and_insert_stage() {
    let mut session = EditorSession::new(ObjectFile::from_stages(vec![stage_with(1, &[])]));
    session.cut_stage().unwrap();
    assert!(session.document().is_empty());
    assert_eq!(session.status().current_stage, None);
    assert_eq!(session.copy_stage(), Err(EditorError::NoStage));

    session.paste_stage().unwrap();
    assert_eq!(session.document().num_stages(), 1);
    session.insert_stage_before();
    assert_eq!(session.document().num_stages(), 2);
    assert_eq!(session.document().stage(0), Some(&Stage::new()));
    session.append_stage();
    assert_eq!(session.current_stage(), 2);
}

#[test]
fn test_segment_operations() {
    let mut session = EditorSession::new(file_with(2, &[ring(0, 1, 0)]));
    let before = session.document().clone();

    session.append_segment().unwrap();
    assert_eq!(session.current_segment(), 2);
    assert_eq!(session.scroll(), 48);

    session.insert_segment_before().unwrap();
    assert_eq!(session.position_index().num_segments(), 4);
    assert_eq!(session.current_segment(), 2);

    session.delete_segment().unwrap();
    assert_eq!(session.position_index().num_segments(), 3);

    session.first_segment();
    assert_eq!(
        session.swap_segment_previous(),
        Err(EditorError::AtBoundary {
            what: "segment",
            edge: "first"
        })
    );
    session.swap_segment_next().unwrap();
    assert_eq!(session.current_segment(), 1);
    assert_eq!(objects(&session), set(&[ring(1, 1, 0)]));

    while session.can_undo() {
        session.undo().unwrap();
    }
    assert_eq!(session.document(), &before);
}

#[test]
fn test_cut_paste_segment() {
    let mut session = EditorSession::new(file_with(2, &[ring(0, 1, 0)]));
    let before = session.document().clone();
    session.cut_segment().unwrap();
    assert_eq!(session.position_index().num_segments(), 1);
    assert!(objects(&session).is_empty());

    session.paste_segment().unwrap();
    assert_eq!(session.document(), &before);

    session.copy_segment().unwrap();
    session.paste_segment().unwrap();
    assert_eq!(objects(&session), set(&[ring(0, 1, 0), ring(1, 1, 0)]));
}

#[test]
fn test_select_segment_bounds() {
    let mut session = EditorSession::new(file_with(2, &[]));
    assert_eq!(
        session.select_segment(2),
        Err(EditorError::SegmentOutOfRange { index: 2, count: 2 })
    );
    session.select_segment(1).unwrap();
    assert_eq!(session.scroll(), 24);
    session.set_scroll(3);
    assert_eq!(session.current_segment(), 0);
}

#[test]
fn test_empty_document() {
    let mut session = EditorSession::new(ObjectFile::new());
    let status = session.status();
    assert_eq!(status.current_stage, None);
    assert_eq!(status.current_segment, None);
    assert_eq!(session.append_segment(), Err(EditorError::NoStage));

    session.append_stage();
    session.append_segment().unwrap();
    session.cycle_object(at(0, 0)).unwrap();
    assert_eq!(objects(&session), set(&[ring(0, 0, 0)]));
}

#[test]
fn test_segment_flags_and_sync_guard() {
    let mut session = EditorSession::new(file_with(2, &[]));
    session.set_flip(true).unwrap();
    session.set_terminator(Terminator::Checkpoint).unwrap();
    assert_eq!(session.history().undo_count(), 1);

    let status = session
        .sync_with(|s, status| {
            assert_eq!(s.phase(), SyncPhase::Syncing);
            assert!(status.segment_flags.unwrap().flip);
            s.set_flip(false).unwrap();
            s.set_terminator(Terminator::ChaosEmerald).unwrap();
            assert!(s.sync_with(|_, _| panic!("nested refresh ran")).is_none());
        })
        .unwrap();

    assert_eq!(session.phase(), SyncPhase::Idle);
    let flags = session.status().segment_flags.unwrap();
    assert!(flags.flip);
    assert_eq!(flags.terminator, Terminator::Checkpoint);
    assert_eq!(status.segment_flags, Some(flags));
    assert_eq!(session.history().undo_count(), 1);

    session.undo().unwrap();
    assert_eq!(session.status().segment_flags.unwrap().terminator, Terminator::NormalSegment);
}

#[test]
fn test_status_snapshot() {
    let stages = vec![
        stage_with(2, &[ring(0, 0, 0), bomb(0, 1, 0)]),
        stage_with(1, &[]),
    ];
    let mut session = EditorSession::new(ObjectFile::from_stages(stages));
    let status = session.status();
    assert_eq!(status.num_stages, 2);
    assert_eq!(status.current_stage, Some(0));
    assert_eq!(status.num_segments, 2);
    assert_eq!(status.end_pos, 48);
    assert!(status.has_next_stage);
    assert!(!status.has_previous_stage);
    assert!(status.has_next_segment);
    assert!(!status.can_undo);
    assert!(!status.can_paste_stage);

    let stats = status.segment_stats.unwrap();
    assert_eq!(stats.rings, 1);
    assert_eq!(stats.bombs, 1);
    assert!(!stats.over_limit);

    session.copy_segment().unwrap();
    assert!(session.status().can_paste_segment);
}

#[test]
fn test_mode_switch_clears_transient_sets() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 0, 0)]));
    session.set_selection(set(&[ring(0, 0, 0)]));
    session.set_mode(EditMode::InsertBomb);
    assert!(session.selection().is_empty());
    assert_eq!(session.mode(), EditMode::InsertBomb);
    assert_eq!(EditMode::Delete.next(), EditMode::Select);
    assert_eq!(EditMode::Select.previous(), EditMode::Delete);
}

#[test]
fn test_undo_outside_select_mode_clears_selection() {
    let mut session = EditorSession::new(file_with(1, &[ring(0, 0, 0)]));
    session.set_selection(set(&[ring(0, 0, 0)]));
    session.delete_selection().unwrap();
    session.set_mode(EditMode::Delete);
    session.undo().unwrap();
    assert!(session.selection().is_empty());
    assert_eq!(objects(&session), set(&[ring(0, 0, 0)]));

    session.set_mode(EditMode::Select);
    session.redo().unwrap();
    session.undo().unwrap();
    assert_eq!(session.selection(), &set(&[ring(0, 0, 0)]));
}

#[test]
fn test_replace_document_resets() {
    let mut session = EditorSession::new(file_with(3, &[]));
    session.cycle_object(at(50, 0)).unwrap();
    session.goto_segment(2);
    session.replace_document(file_with(1, &[]));
    assert!(!session.can_undo());
    assert_eq!(session.current_stage(), 0);
    assert_eq!(session.current_segment(), 0);
    assert_eq!(session.scroll(), 0);
    assert!(session.selection().is_empty());
}
