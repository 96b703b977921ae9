//! Integration tests for the precomputation pipeline.
//!
//! These run [`Planner::prepare`] and [`Planner::sweep`] on the shared
//! scenarios and check the stages line up with each other.

use shiftplan::precompute::DemandSource;
use shiftplan::prelude::*;
use shiftplan::{ConstraintFamily, PreparedRun, ShiftplanError};
use shiftplan_test::builders::{employee, shift, window};
use shiftplan_test::calendar::day;
use shiftplan_test::scenarios::{
    eleven_hour_rest, mixed_week, night_week, rest_pair, window_inside_shift,
};

fn prepare(input: &SchedulingInput) -> PreparedRun {
    Planner::new(PlannerConfig::default()).prepare(input).unwrap()
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_rejects_fractional_coverage() {
    let mut config = PlannerConfig::default();
    config.coverage.shift_integrity = false;
    let err = Planner::new(config)
        .prepare(&window_inside_shift())
        .unwrap_err();
    assert!(matches!(err, ShiftplanError::Config(_)));
}

#[test]
fn test_rejects_unknown_role() {
    let input = SchedulingInput::new(
        vec![employee("e1", &["cook"])],
        vec![shift("s1", 0, "06:00", "14:00", "baker")],
    );
    let err = Planner::new(PlannerConfig::default())
        .prepare(&input)
        .unwrap_err();
    assert!(matches!(err, ShiftplanError::UnknownReference { .. }));
}

#[test]
fn test_loaded_zero_length_shift_stops_the_run() {
    let json = r#"{
        "employees": [{"id": "e1", "name": "Eve", "roles": ["cook"]}],
        "shifts": [{
            "id": "s1",
            "interval": {"day": "2025-10-06", "start_minute": 600, "end_minute": 600},
            "role": "cook",
            "own_demand": 1
        }]
    }"#;
    let input: SchedulingInput = serde_json::from_str(json).unwrap();
    let err = Planner::new(PlannerConfig::default())
        .prepare(&input)
        .unwrap_err();
    assert!(matches!(err, ShiftplanError::MalformedInterval { .. }));
}

// ============================================================================
// Stages
// ============================================================================

#[test]
fn test_window_inside_shift_pipeline() {
    let run = prepare(&window_inside_shift());

    let rush: Vec<_> = run
        .segments
        .iter()
        .filter(|s| s.source == DemandSource::Windows)
        .collect();
    assert_eq!(rush.len(), 1);
    assert_eq!(rush[0].demand, 3);
    assert_eq!(rush[0].minutes(), 120);

    assert_eq!(run.eligibility.len(), 4);
    assert_eq!(run.problem.assignment_count(), 4);
    assert!(run.weights.is_enabled(PenaltyTier::UnmetWindow));
}

#[test]
fn test_cross_midnight_shift_keeps_its_tail() {
    let input = SchedulingInput::new(
        vec![employee("g1", &["guard"])],
        vec![shift("n", 0, "22:00", "06:00", "guard").with_demand(1)],
    );

    let run = prepare(&input);
    let head: u32 = run.segments.group("guard", day(0)).iter().map(|s| s.minutes()).sum();
    let tail: u32 = run.segments.group("guard", day(1)).iter().map(|s| s.minutes()).sum();
    assert_eq!(head, 120);
    assert_eq!(tail, 360);
    assert!(run
        .segments
        .iter()
        .all(|s| s.covering_shifts.contains("n") && s.demand == 1));

    let extended = Planner::new(PlannerConfig::new().with_midnight_policy(MidnightPolicy::Extend))
        .prepare(&input)
        .unwrap();
    let whole: u32 = extended.segments.group("guard", day(0)).iter().map(|s| s.minutes()).sum();
    assert_eq!(whole, 480);
    assert!(extended.segments.group("guard", day(1)).is_empty());
}

#[test]
fn test_window_in_overnight_tail_is_covered_under_both_policies() {
    let input = SchedulingInput::new(
        vec![employee("g1", &["guard"])],
        vec![shift("n", 0, "22:00", "06:00", "guard")],
    )
    .with_windows(vec![window("dawn", 1, "02:00", "04:00", "guard", 1)]);

    for policy in [MidnightPolicy::Split, MidnightPolicy::Extend] {
        let config = PlannerConfig::new()
            .with_midnight_policy(policy)
            .with_strict_windows(true);
        let run = Planner::new(config).prepare(&input).unwrap();
        let dawn: Vec<_> = run
            .segments
            .iter()
            .filter(|s| s.covering_windows.contains("dawn"))
            .collect();
        assert_eq!(dawn.len(), 1, "{policy:?}");
        assert!(dawn[0].covering_shifts.contains("n"), "{policy:?}");
        assert_eq!(dawn[0].demand, 1);
    }
}

#[test]
fn test_rest_pair_becomes_one_row() {
    let run = Planner::new(eleven_hour_rest()).prepare(&rest_pair()).unwrap();
    assert_eq!(run.conflicts.len(), 1);
    assert_eq!(run.conflicts.pairs[0].first, "A");
    assert_eq!(run.conflicts.pairs[0].second, "B");
    assert_eq!(run.problem.family(ConstraintFamily::Rest).count(), 1);
}

#[test]
fn test_night_conflicts_are_not_duplicated() {
    let run = prepare(&night_week());

    // six adjacent night pairs, each shared by both guards
    assert_eq!(run.conflicts.len(), 6);
    assert!(run.conflicts.pairs.iter().all(|p| p.consecutive_nights));
    assert_eq!(
        run.problem.family(ConstraintFamily::ConsecutiveNights).count(),
        12
    );
}

#[test]
fn test_lexicographic_weights_dominate() {
    let run = prepare(&mixed_week());
    let entries = &run.weights.entries;
    for (k, higher) in entries.iter().enumerate() {
        let lower_total: f64 = entries[k + 1..]
            .iter()
            .map(|e| e.per_minute * e.bound_minutes as f64)
            .sum();
        assert!(
            higher.per_minute > lower_total,
            "{} does not dominate lower tiers",
            higher.tier
        );
    }
}

#[test]
fn test_strict_checked_weights_fail() {
    let config = PlannerConfig::new()
        .with_weight_mode(WeightMode::Checked)
        .with_strict_objective(true);
    let err = Planner::new(config)
        .prepare(&window_inside_shift())
        .unwrap_err();
    assert!(matches!(err, ShiftplanError::WeightDominanceViolation { .. }));
}

#[test]
fn test_uncoverable_window_is_fatal_only_when_strict() {
    let input = SchedulingInput::new(
        vec![employee("e1", &["cook"])],
        vec![shift("s1", 0, "06:00", "14:00", "cook")],
    )
    .with_windows(vec![window("late-rush", 0, "18:00", "20:00", "cook", 1)]);

    assert!(Planner::new(PlannerConfig::default()).prepare(&input).is_ok());
    let err = Planner::new(PlannerConfig::new().with_strict_windows(true))
        .prepare(&input)
        .unwrap_err();
    assert!(matches!(err, ShiftplanError::UncoverableWindow { .. }));
}

// ============================================================================
// Determinism and sweeps
// ============================================================================

#[test]
fn test_identical_inputs_give_identical_problems() {
    let first = prepare(&mixed_week()).problem.to_canonical_json().unwrap();
    let second = prepare(&mixed_week()).problem.to_canonical_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sweep_keeps_config_order() {
    let input = window_inside_shift();
    let configs = vec![
        PlannerConfig::default(),
        PlannerConfig::new().with_weight(PenaltyTier::Fairness, 0.0),
        PlannerConfig::new()
            .with_weight_mode(WeightMode::Checked)
            .with_strict_objective(true),
        PlannerConfig::default(),
    ];

    let runs = Planner::sweep(&input, &configs);
    assert_eq!(runs.len(), 4);

    let first = runs[0].as_ref().unwrap();
    let second = runs[1].as_ref().unwrap();
    assert!(first.weights.is_enabled(PenaltyTier::Fairness));
    assert!(!second.weights.is_enabled(PenaltyTier::Fairness));
    assert!(runs[2].is_err());

    let last = runs[3].as_ref().unwrap();
    assert_eq!(
        first.problem.to_canonical_json().unwrap(),
        last.problem.to_canonical_json().unwrap()
    );
}

#[test]
fn test_problem_json_parses() {
    let json = prepare(&window_inside_shift())
        .problem
        .to_canonical_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["variables"].as_array().is_some_and(|v| !v.is_empty()));
}
