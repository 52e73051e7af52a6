use crate::common::stage_with;
use proptest::prelude::*;
use s2ssedit_editor::PositionIndex;

proptest! {
    #[test]
    fn test_index_is_monotonic(segments in 0usize..12) {
        let index = PositionIndex::from_stage(&stage_with(segments, &[]));
        let starts = index.segment_starts();
        prop_assert_eq!(starts.len(), segments);
        prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));

        for p in 0..index.end_pos() {
            let i = index.find_segment(p);
            prop_assert!(i < segments);
            let next = starts.get(i + 1).copied().unwrap_or(index.end_pos());
            prop_assert!(starts[i] <= p && p < next);
            let (seg, pos) = index.locate(p).unwrap();
            prop_assert_eq!(index.flatten(seg, pos), Some(p));
        }
        prop_assert_eq!(index.find_segment(index.end_pos()), segments);
        prop_assert_eq!(index.find_segment(-1), segments);
    }
}

#[test]
fn test_segment_boundaries() {
    let index = PositionIndex::from_stage(&stage_with(3, &[]));
    assert_eq!(index.segment_starts(), &[0, 24, 48]);
    assert_eq!(index.end_pos(), 72);
    assert_eq!(index.locate(23), Some((0, 23)));
    assert_eq!(index.locate(24), Some((1, 0)));
    assert_eq!(index.locate(71), Some((2, 23)));
    assert_eq!(index.locate(72), None);
    assert_eq!(index.flatten(3, 0), None);
}

#[test]
fn test_empty_stage() {
    let index = PositionIndex::from_stage(&stage_with(0, &[]));
    assert_eq!(index.end_pos(), 0);
    assert_eq!(index.find_segment(0), 0);
    assert_eq!(index.locate(0), None);
}
