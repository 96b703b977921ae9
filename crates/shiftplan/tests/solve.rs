//! Integration tests for solving through the planner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use shiftplan::prelude::*;
use shiftplan::{EngineOutcome, ProblemDescription, ShiftplanError};
use shiftplan_test::scenarios::{eleven_hour_rest, mixed_week, rest_pair, window_inside_shift};

fn not_cancelled() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

/// Finds the optimum, then keeps working until told to stop.
struct Lingering;

impl SolverEngine for Lingering {
    fn name(&self) -> &str {
        "lingering"
    }

    fn solve(&self, problem: &ProblemDescription, context: &SolveContext) -> EngineOutcome {
        let _ = ExhaustiveEngine::new().solve(problem, context);
        while !context.should_stop() {
            thread::sleep(Duration::from_millis(5));
        }
        EngineOutcome::Stopped
    }
}

/// Never reports anything.
struct Silent;

impl SolverEngine for Silent {
    fn name(&self) -> &str {
        "silent"
    }

    fn solve(&self, _problem: &ProblemDescription, context: &SolveContext) -> EngineOutcome {
        while !context.should_stop() {
            thread::sleep(Duration::from_millis(5));
        }
        EngineOutcome::Stopped
    }
}

/// Claims every problem is infeasible without naming a core.
struct Pessimist;

impl SolverEngine for Pessimist {
    fn name(&self) -> &str {
        "pessimist"
    }

    fn solve(&self, _problem: &ProblemDescription, _context: &SolveContext) -> EngineOutcome {
        EngineOutcome::Infeasible { core: Vec::new() }
    }
}

fn short_limit() -> PlannerConfig {
    PlannerConfig::new().with_time_limit_secs(1)
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_window_inside_shift_plan() {
    let plan = Planner::new(PlannerConfig::default())
        .solve(
            &window_inside_shift(),
            Arc::new(ExhaustiveEngine::new()),
            not_cancelled(),
        )
        .unwrap();

    assert_eq!(plan.status, PlanStatus::Optimal);
    assert!(plan.is_optimal());
    assert!(plan.assignments.contains("e1", "early"));
    assert!(plan.assignments.contains("e2", "early"));

    // three needed in the rush, two available
    let window = plan.breakdown.get(PenaltyTier::UnmetWindow).unwrap();
    assert!(window.minutes >= 120);
    assert_eq!(plan.breakdown.dominant().unwrap().tier, PenaltyTier::UnmetWindow);
    assert!((plan.breakdown.total - plan.objective).abs() <= 1e-6 * plan.objective);
}

#[test]
fn test_rest_pair_assigns_one_shift() {
    let plan = Planner::new(eleven_hour_rest())
        .solve(&rest_pair(), Arc::new(ExhaustiveEngine::new()), not_cancelled())
        .unwrap();

    assert_eq!(plan.assignments.len(), 1);
    assert_eq!(plan.assignments.shifts_of("e1").count(), 1);
}

#[test]
fn test_mixed_week_respects_eligibility() {
    let input = mixed_week();
    let plan = Planner::new(PlannerConfig::default())
        .solve(&input, Arc::new(ExhaustiveEngine::new()), not_cancelled())
        .unwrap();

    // bob marked himself unavailable, dee is off on the afternoon of day 1
    assert!(!plan.assignments.contains("bob", "c-d1-am"));
    assert!(!plan.assignments.contains("dee", "p-d1-am"));
    for assignment in plan.assignments.iter() {
        let employee = input.employee(&assignment.employee).unwrap();
        let shift = input.shift(&assignment.shift).unwrap();
        assert!(employee.has_role(&shift.role));
    }
}

#[test]
fn test_solves_are_repeatable() {
    let planner = Planner::new(PlannerConfig::default());
    let first = planner
        .solve(&mixed_week(), Arc::new(ExhaustiveEngine::new()), not_cancelled())
        .unwrap();
    let second = planner
        .solve(&mixed_week(), Arc::new(ExhaustiveEngine::new()), not_cancelled())
        .unwrap();
    assert_eq!(first.assignments, second.assignments);
    assert_eq!(first.breakdown, second.breakdown);
}

// ============================================================================
// Timeouts, cancellation and infeasibility
// ============================================================================

#[test]
fn test_timeout_returns_incumbent_plan() {
    let plan = Planner::new(short_limit())
        .solve(&window_inside_shift(), Arc::new(Lingering), not_cancelled())
        .unwrap();

    assert_eq!(plan.status, PlanStatus::TimedOut);
    assert!(!plan.is_optimal());
    assert!(plan.assignments.contains("e1", "early"));
    assert!(plan.elapsed >= Duration::from_secs(1));
}

#[test]
fn test_unbounded_time_limit_still_solves() {
    let plan = Planner::new(PlannerConfig::new().with_time_limit_secs(u64::MAX))
        .solve(
            &window_inside_shift(),
            Arc::new(ExhaustiveEngine::new()),
            not_cancelled(),
        )
        .unwrap();
    assert_eq!(plan.status, PlanStatus::Optimal);
}

#[test]
fn test_timeout_without_incumbent_is_an_error() {
    let err = Planner::new(short_limit())
        .solve(&window_inside_shift(), Arc::new(Silent), not_cancelled())
        .unwrap_err();

    assert!(err.is_recoverable());
    assert!(matches!(
        err,
        ShiftplanError::SolverTimeout {
            has_incumbent: false,
            ..
        }
    ));
}

#[test]
fn test_cancel_stops_the_run() {
    let cancel = not_cancelled();
    let flag = Arc::clone(&cancel);
    let trigger = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        flag.store(true, Ordering::SeqCst);
    });

    let started = Instant::now();
    let err = Planner::new(PlannerConfig::default())
        .solve(&window_inside_shift(), Arc::new(Silent), cancel)
        .unwrap_err();
    trigger.join().unwrap();

    assert!(matches!(err, ShiftplanError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_infeasible_names_dominant_family() {
    let err = Planner::new(PlannerConfig::default())
        .solve(&window_inside_shift(), Arc::new(Pessimist), not_cancelled())
        .unwrap_err();

    assert!(!err.is_recoverable());
    match err {
        ShiftplanError::SolverInfeasible { dominant_family } => {
            assert_eq!(dominant_family, "rest");
        }
        other => panic!("expected infeasibility, got {other:?}"),
    }
}
