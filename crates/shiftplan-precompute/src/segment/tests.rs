//! Tests for the temporal indexer.

use shiftplan_config::{MidnightPolicy, PlannerConfig};
use shiftplan_core::{SchedulingInput, ShiftplanError};
use shiftplan_test::builders::{employee, shift, window};
use shiftplan_test::calendar::day;
use shiftplan_test::scenarios::{mixed_week, window_inside_shift};

use super::*;

fn bounds(segments: &[Segment]) -> Vec<(u32, u32)> {
    segments
        .iter()
        .map(|s| (s.interval.start_minute, s.interval.end_minute))
        .collect()
}

fn guards(shifts: Vec<shiftplan_core::Shift>) -> SchedulingInput {
    SchedulingInput::new(vec![employee("g1", &["guard"])], shifts)
}

// ============================================================================
// Coverage completeness
// ============================================================================

#[test]
fn test_window_cuts_shift_into_three() {
    let index = index_segments(&window_inside_shift(), &PlannerConfig::default()).unwrap();
    let cook = index.group("cook", day(0));

    assert_eq!(
        bounds(cook),
        vec![(360, 480), (480, 600), (600, 840), (840, 1320)]
    );
    assert!(cook[1].covering_windows.contains("rush"));
    assert!(cook[0].covering_windows.is_empty());
    assert!(cook[1].covering_shifts.contains("early"));
    assert!(cook[3].covering_shifts.contains("late"));
    assert!(!cook[3].covering_shifts.contains("early"));
}

#[test]
fn test_segments_tile_group_without_gaps_or_overlaps() {
    let index = index_segments(&mixed_week(), &PlannerConfig::default()).unwrap();
    for group in &index.groups {
        for pair in group.segments.windows(2) {
            assert!(
                pair[0].interval.abs_end() <= pair[1].interval.abs_start(),
                "{} overlaps {}",
                pair[0].id,
                pair[1].id
            );
        }
    }

    // cook day 0: shifts 06-14, 14-22 and window 11-15 cover 06-22 exactly
    let cook = index.group("cook", day(0));
    let covered: u32 = cook.iter().map(Segment::minutes).sum();
    assert_eq!(covered, 16 * 60);
    assert_eq!(cook.first().unwrap().interval.start_minute, 360);
    assert_eq!(cook.last().unwrap().interval.end_minute, 1320);
}

#[test]
fn test_gap_between_shifts_is_not_a_segment() {
    let input = guards(vec![
        shift("a", 0, "06:00", "10:00", "guard"),
        shift("b", 0, "12:00", "16:00", "guard"),
    ]);
    let index = index_segments(&input, &PlannerConfig::default()).unwrap();
    assert_eq!(bounds(index.group("guard", day(0))), vec![(360, 600), (720, 960)]);
}

#[test]
fn test_covering_shift_must_contain_segment() {
    let input = guards(vec![
        shift("long", 0, "06:00", "18:00", "guard"),
        shift("short", 0, "10:00", "14:00", "guard"),
    ]);
    let index = index_segments(&input, &PlannerConfig::default()).unwrap();
    let segs = index.group("guard", day(0));
    assert_eq!(bounds(segs), vec![(360, 600), (600, 840), (840, 1080)]);
    assert_eq!(segs[0].covering_shifts.len(), 1);
    assert_eq!(segs[1].covering_shifts.len(), 2);
    assert_eq!(segs[2].covering_shifts.len(), 1);
}

#[test]
fn test_window_without_shift_yields_uncoverable_segment() {
    let input = SchedulingInput::new(
        vec![employee("e1", &["cook"])],
        vec![shift("s1", 0, "06:00", "14:00", "cook")],
    )
    .with_windows(vec![window("dawn", 0, "04:00", "05:00", "cook", 1)]);
    let index = index_segments(&input, &PlannerConfig::default()).unwrap();
    let segs = index.group("cook", day(0));
    assert_eq!(bounds(segs), vec![(240, 300), (360, 840)]);
    assert!(segs[0].is_uncoverable());
    assert!(!segs[1].is_uncoverable());
}

// ============================================================================
// Midnight handling
// ============================================================================

#[test]
fn test_split_keeps_overnight_tail() {
    let input = guards(vec![shift("n", 0, "22:00", "06:00", "guard")]);
    let index = index_segments(&input, &PlannerConfig::default()).unwrap();

    assert_eq!(bounds(index.group("guard", day(0))), vec![(1320, 1440)]);
    assert_eq!(bounds(index.group("guard", day(1))), vec![(0, 360)]);
    let total: u32 = index.iter().map(Segment::minutes).sum();
    assert_eq!(total, 480);
}

#[test]
fn test_split_tail_meets_next_day_shift() {
    let input = guards(vec![
        shift("n", 0, "22:00", "06:00", "guard"),
        shift("early", 1, "04:00", "12:00", "guard"),
    ]);
    let index = index_segments(&input, &PlannerConfig::default()).unwrap();
    let next = index.group("guard", day(1));
    assert_eq!(bounds(next), vec![(0, 240), (240, 360), (360, 720)]);
    assert_eq!(next[1].covering_shifts.len(), 2);
}

#[test]
fn test_extend_keeps_interval_on_start_day() {
    let config = PlannerConfig::new().with_midnight_policy(MidnightPolicy::Extend);
    let input = guards(vec![shift("n", 0, "22:00", "06:00", "guard")])
        .with_windows(vec![window("w", 0, "23:30", "03:00", "guard", 2)]);
    let index = index_segments(&input, &config).unwrap();

    assert!(index.group("guard", day(1)).is_empty());
    let segs = index.group("guard", day(0));
    assert_eq!(segs.len(), 3);
    assert_eq!(segs[1].interval.start_minute, 1410);
    assert_eq!(segs[1].interval.end_minute, 1620);

    // the last slice starts after midnight and is re-anchored
    assert_eq!(segs[2].interval.day, day(1));
    assert_eq!((segs[2].interval.start_minute, segs[2].interval.end_minute), (180, 360));
    assert_eq!(segs[2].id, "guard/2025-10-06/1620-1800");
}

#[test]
fn test_extend_keeps_next_day_window_with_overnight_shift() {
    let config = PlannerConfig::new().with_midnight_policy(MidnightPolicy::Extend);
    let input = guards(vec![
        shift("n", 0, "22:00", "06:00", "guard"),
        shift("late", 1, "14:00", "22:00", "guard"),
    ])
    .with_windows(vec![window("dawn", 1, "02:00", "04:00", "guard", 1)]);
    let index = index_segments(&input, &config).unwrap();

    let segs = index.group("guard", day(0));
    assert_eq!(segs.len(), 3);
    let dawn = &segs[1];
    assert_eq!(dawn.id, "guard/2025-10-06/1560-1680");
    assert_eq!(dawn.interval.day, day(1));
    assert_eq!((dawn.interval.start_minute, dawn.interval.end_minute), (120, 240));
    assert!(dawn.covering_shifts.contains("n"));
    assert!(dawn.covering_windows.contains("dawn"));
    assert!(!index.iter().any(Segment::is_uncoverable));

    // not chained to the night shift, so it keeps its own day
    assert_eq!(bounds(index.group("guard", day(1))), vec![(840, 1320)]);
}

#[test]
fn test_extend_segments_never_share_time() {
    let config = PlannerConfig::new().with_midnight_policy(MidnightPolicy::Extend);
    let input = guards(vec![
        shift("n0", 0, "22:00", "06:00", "guard"),
        shift("n1", 1, "04:00", "12:00", "guard"),
        shift("n2", 1, "22:00", "06:00", "guard"),
    ])
    .with_windows(vec![window("w", 2, "01:00", "02:00", "guard", 2)]);
    let index = index_segments(&input, &config).unwrap();

    let segments: Vec<&Segment> = index.iter().collect();
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            assert!(!a.interval.overlaps(&b.interval), "{} overlaps {}", a.id, b.id);
        }
    }
    let total: u32 = segments.iter().map(|s| s.minutes()).sum();
    assert_eq!(total, 8 * 60 + 6 * 60 + 8 * 60);
}

// ============================================================================
// Thresholds and determinism
// ============================================================================

#[test]
fn test_hard_threshold_fails() {
    let input = guards(vec![
        shift("a", 0, "00:00", "02:00", "guard"),
        shift("b", 0, "04:00", "06:00", "guard"),
        shift("c", 0, "08:00", "10:00", "guard"),
    ]);
    let config = PlannerConfig::new().with_segment_thresholds(1, 2);
    match index_segments(&input, &config) {
        Err(ShiftplanError::SegmentExplosion { count, limit, role, .. }) => {
            assert_eq!((count, limit), (3, 2));
            assert_eq!(role, "guard");
        }
        other => panic!("expected segment explosion, got {other:?}"),
    }
}

#[test]
fn test_warning_threshold_is_not_fatal() {
    let input = guards(vec![
        shift("a", 0, "00:00", "02:00", "guard"),
        shift("b", 0, "04:00", "06:00", "guard"),
    ]);
    let config = PlannerConfig::new().with_segment_thresholds(1, 10);
    assert_eq!(index_segments(&input, &config).unwrap().len(), 2);
}

#[test]
fn test_input_order_does_not_matter() {
    let input = mixed_week();
    let mut reversed = input.clone();
    reversed.shifts.reverse();
    reversed.windows.reverse();

    let config = PlannerConfig::default();
    assert_eq!(
        index_segments(&input, &config).unwrap(),
        index_segments(&reversed, &config).unwrap()
    );
}

#[test]
fn test_unknown_group_is_empty() {
    let index = index_segments(&window_inside_shift(), &PlannerConfig::default()).unwrap();
    assert!(index.group("cook", day(5)).is_empty());
    assert!(index.group("pilot", day(0)).is_empty());
}
