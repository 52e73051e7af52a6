//! Byte payload used to carry objects through the clipboard and drag-and-drop.
//!
//! Each object is a 4-byte record: segment, angle, row position, kind byte.

use crate::error::{EditorError, EditorResult};
use s2ssedit_core::{Object, ObjectKind, ObjectSet};

/// MIME-like type name the payload is tagged with.
pub const PAYLOAD_TYPE: &str = "SpecialStageObjects";

const RECORD_SIZE: usize = 4;

/// Encodes objects in set order.
///
/// Segment indices above 255 do not fit in a record and are truncated; a
/// stage never has that many segments in practice.
pub fn encode_payload(objects: &ObjectSet) -> Vec<u8> {
    let mut out = Vec::with_capacity(objects.len() * RECORD_SIZE);
    for obj in objects {
        if obj.segment() > usize::from(u8::MAX) {
            tracing::warn!(segment = obj.segment(), "segment index truncated in payload");
        }
        out.extend_from_slice(&[
            obj.segment() as u8,
            obj.angle(),
            obj.position(),
            obj.kind().bits(),
        ]);
    }
    out
}

/// Decodes a payload produced by [`encode_payload`].
pub fn decode_payload(data: &[u8]) -> EditorResult<ObjectSet> {
    if data.len() % RECORD_SIZE != 0 {
        return Err(EditorError::MalformedPayload { len: data.len() });
    }
    data.chunks_exact(RECORD_SIZE)
        .map(|record| {
            let kind = match record[3] {
                0x00 => ObjectKind::Ring,
                0x40 => ObjectKind::Bomb,
                other => return Err(EditorError::InvalidObjectKind(other)),
            };
            Ok(Object::new(
                usize::from(record[0]),
                record[2],
                record[1],
                kind,
            ))
        })
        .collect()
}
