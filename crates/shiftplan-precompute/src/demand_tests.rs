//! Tests for demand aggregation.

use shiftplan_config::{PlannerConfig, SkillAggregation};
use shiftplan_core::{SchedulingInput, ShiftplanError, SkillRequirements};
use shiftplan_test::builders::{employee, shift, window};
use shiftplan_test::calendar::day;
use shiftplan_test::scenarios::window_inside_shift;

use super::*;
use crate::segment::index_segments;

fn aggregated(input: &SchedulingInput, config: &PlannerConfig) -> Result<SegmentIndex> {
    let mut index = index_segments(input, config)?;
    aggregate_demand(&mut index, input, config)?;
    Ok(index)
}

fn cooks(shifts: Vec<Shift>) -> SchedulingInput {
    SchedulingInput::new(vec![employee("e1", &["cook"])], shifts)
}

#[test]
fn test_window_precedence_over_shift_demand() {
    let index = aggregated(&window_inside_shift(), &PlannerConfig::default()).unwrap();
    let segs = index.group("cook", day(0));
    let demands: Vec<u32> = segs.iter().map(|s| s.demand).collect();
    assert_eq!(demands, vec![1, 3, 1, 1]);

    assert_eq!(segs[1].source, DemandSource::Windows);
    assert_eq!(
        segs[0].source,
        DemandSource::Shift {
            shift_id: "early".to_string()
        }
    );
    assert_eq!(
        segs[3].source,
        DemandSource::Shift {
            shift_id: "late".to_string()
        }
    );
}

#[test]
fn test_shift_only_segment_uses_own_demand() {
    let input = cooks(vec![shift("s1", 0, "06:00", "14:00", "cook").with_demand(2)]);
    let index = aggregated(&input, &PlannerConfig::default()).unwrap();
    let segs = index.group("cook", day(0));
    assert_eq!(segs.len(), 1);
    assert_eq!(segs[0].demand, 2);
    assert_eq!(segs[0].demand_minutes(), 960);
}

#[test]
fn test_fallback_picks_lowest_id_declaring_demand() {
    let input = cooks(vec![
        shift("a", 0, "06:00", "14:00", "cook"),
        shift("c", 0, "06:00", "14:00", "cook").with_demand(1),
        shift("b", 0, "06:00", "14:00", "cook")
            .with_demand(3)
            .with_skills(SkillRequirements::from_pairs([("knife", 1)])),
    ]);
    let index = aggregated(&input, &PlannerConfig::default()).unwrap();
    let seg = &index.group("cook", day(0))[0];
    assert_eq!(seg.covering_shifts.len(), 3);
    assert_eq!(seg.demand, 3);
    assert_eq!(seg.skills.get("knife"), 1);
    assert_eq!(
        seg.source,
        DemandSource::Shift {
            shift_id: "b".to_string()
        }
    );
}

#[test]
fn test_no_declared_demand_is_zero() {
    let input = cooks(vec![shift("s1", 0, "06:00", "14:00", "cook")]);
    let index = aggregated(&input, &PlannerConfig::default()).unwrap();
    let seg = &index.group("cook", day(0))[0];
    assert_eq!(seg.demand, 0);
    assert_eq!(seg.source, DemandSource::Unspecified);
}

#[test]
fn test_overlapping_windows_take_max_headcount() {
    let forklift = |n| SkillRequirements::from_pairs([("forklift", n)]);
    let input = cooks(vec![shift("s1", 0, "06:00", "14:00", "cook").with_demand(1)])
        .with_windows(vec![
            window("w1", 0, "08:00", "12:00", "cook", 2).with_skills(forklift(1)),
            window("w2", 0, "10:00", "12:00", "cook", 4).with_skills(forklift(2)),
        ]);

    let max = aggregated(&input, &PlannerConfig::default()).unwrap();
    let overlap = &max.group("cook", day(0))[2];
    assert_eq!(
        (overlap.interval.start_minute, overlap.interval.end_minute),
        (600, 720)
    );
    assert_eq!(overlap.demand, 4);
    assert_eq!(overlap.skills.get("forklift"), 2);

    let summed = aggregated(
        &input,
        &PlannerConfig::new().with_skill_aggregation(SkillAggregation::Sum),
    )
    .unwrap();
    let overlap = &summed.group("cook", day(0))[2];
    assert_eq!(overlap.demand, 4);
    assert_eq!(overlap.skills.get("forklift"), 3);
}

#[test]
fn test_uncoverable_window_warns_by_default() {
    let input = cooks(vec![shift("s1", 0, "06:00", "14:00", "cook")])
        .with_windows(vec![window("dawn", 0, "04:00", "05:00", "cook", 2)]);
    let index = aggregated(&input, &PlannerConfig::default()).unwrap();
    let dawn = &index.group("cook", day(0))[0];
    assert!(dawn.is_uncoverable());
    assert_eq!(dawn.demand, 2);
}

#[test]
fn test_uncoverable_window_fails_when_strict() {
    let input = cooks(vec![shift("s1", 0, "06:00", "14:00", "cook")])
        .with_windows(vec![window("dawn", 0, "04:00", "05:00", "cook", 2)]);
    let config = PlannerConfig::new().with_strict_windows(true);
    match aggregated(&input, &config) {
        Err(ShiftplanError::UncoverableWindow {
            window,
            start,
            end,
            ..
        }) => {
            assert_eq!(window, "dawn");
            assert_eq!((start, end), (240, 300));
        }
        other => panic!("expected uncoverable window, got {other:?}"),
    }
}

#[test]
fn test_total_demand_minutes() {
    let index = aggregated(&window_inside_shift(), &PlannerConfig::default()).unwrap();
    // 120*1 + 120*3 + 240*1 + 480*1
    assert_eq!(index.demand_minutes(), 120 + 360 + 240 + 480);
}
