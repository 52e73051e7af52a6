#![allow(dead_code)]

use s2ssedit_core::{Object, ObjectFile, ObjectKind, ObjectSet, Segment, Stage};

pub fn ring(segment: usize, position: u8, angle: u8) -> Object {
    Object::new(segment, position, angle, ObjectKind::Ring)
}

pub fn bomb(segment: usize, position: u8, angle: u8) -> Object {
    Object::new(segment, position, angle, ObjectKind::Bomb)
}

pub fn set(objects: &[Object]) -> ObjectSet {
    objects.iter().copied().collect()
}

/// A stage of `segments` segments holding `objects`.
pub fn stage_with(segments: usize, objects: &[Object]) -> Stage {
    let mut stage = Stage::from_segments(vec![Segment::new(); segments]);
    for obj in objects {
        stage
            .segment_mut(obj.segment())
            .unwrap()
            .update(obj.position(), obj.angle(), obj.kind(), true);
    }
    stage
}

/// A one-stage file.
pub fn file_with(segments: usize, objects: &[Object]) -> ObjectFile {
    ObjectFile::from_stages(vec![stage_with(segments, objects)])
}

/// Every object stored in a stage.
pub fn stage_objects(file: &ObjectFile, stage: usize) -> ObjectSet {
    file.stage(stage)
        .map(|s| {
            s.segments()
                .iter()
                .enumerate()
                .flat_map(|(i, seg)| seg.objects(i))
                .collect()
        })
        .unwrap_or_default()
}
