//! End-to-end planning pipeline.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use shiftplan_config::PlannerConfig;
use shiftplan_core::{Result, SchedulingInput};
use shiftplan_model::{
    build_problem, cost_breakdown, extract, solve, AssignmentSet, CostBreakdown,
    ProblemDescription, Solution, SolveOutcome, SolverEngine,
};
use shiftplan_precompute::{
    aggregate_demand, analyze_conflicts, index_segments, normalize_weights, ConflictSet,
    Eligibility, PenaltyBounds, SegmentIndex, WeightTable,
};
use tracing::{info, warn};

/// Solve budget used when the configuration sets none.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);

/// Everything the precomputation stages produced for one input and config.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub segments: SegmentIndex,
    pub conflicts: ConflictSet,
    pub weights: WeightTable,
    pub eligibility: Eligibility,
    pub problem: Arc<ProblemDescription>,
}

/// How a plan was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible, optimality not proven.
    Feasible,
    /// Best incumbent when the time limit ran out.
    TimedOut,
}

/// Result of a successful planning run.
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub status: PlanStatus,
    pub assignments: AssignmentSet,
    pub breakdown: CostBreakdown,
    pub objective: f64,
    pub elapsed: Duration,
}

impl PlanResult {
    pub fn is_optimal(&self) -> bool {
        self.status == PlanStatus::Optimal
    }
}

/// Runs the pipeline for one configuration.
///
/// # Examples
///
/// ```
/// use shiftplan::prelude::*;
///
/// let input = SchedulingInput::new(
///     vec![Employee::new("e1", "Eve").with_roles(["cook"])],
///     vec![Shift::parse("s1", "2025-10-06", "06:00", "14:00", "cook")
///         .unwrap()
///         .with_demand(1)],
/// );
/// let run = Planner::new(PlannerConfig::default()).prepare(&input).unwrap();
/// assert_eq!(run.problem.assignment_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Validates `input` and runs every precomputation stage up to the
    /// problem description.
    ///
    /// # Errors
    ///
    /// Returns the first validation, segment or weight error encountered.
    pub fn prepare(&self, input: &SchedulingInput) -> Result<PreparedRun> {
        let config = &self.config;
        config.validate()?;
        input.validate()?;

        let mut segments = index_segments(input, config)?;
        aggregate_demand(&mut segments, input, config)?;
        let eligibility = Eligibility::build(input);
        let conflicts = analyze_conflicts(input, &eligibility, config)?;
        let bounds = PenaltyBounds::compute(&segments, input, &eligibility, config);
        let weights = normalize_weights(config, &bounds)?;
        let problem = build_problem(&segments, &conflicts, &weights, &eligibility, input, config)?;

        Ok(PreparedRun {
            segments,
            conflicts,
            weights,
            eligibility,
            problem: Arc::new(problem),
        })
    }

    /// Prepares `input` and solves it with `engine`.
    ///
    /// A timeout with an incumbent still yields a plan with
    /// [`PlanStatus::TimedOut`].
    ///
    /// # Errors
    ///
    /// - [`SolverTimeout`](shiftplan_core::ShiftplanError::SolverTimeout) when
    ///   the budget ran out with nothing to show
    /// - [`SolverInfeasible`](shiftplan_core::ShiftplanError::SolverInfeasible)
    ///   when the engine proved infeasibility
    /// - [`Cancelled`](shiftplan_core::ShiftplanError::Cancelled) when `cancel`
    ///   was set
    pub fn solve(
        &self,
        input: &SchedulingInput,
        engine: Arc<dyn SolverEngine>,
        cancel: Arc<AtomicBool>,
    ) -> Result<PlanResult> {
        let started = Instant::now();
        let run = self.prepare(input)?;
        let time_limit = self.config.solver.time_limit().unwrap_or(DEFAULT_TIME_LIMIT);

        let outcome = solve(engine, Arc::clone(&run.problem), time_limit, cancel);
        let (solution, status) = match outcome {
            SolveOutcome::Solved {
                solution, optimal, ..
            } => {
                let status = if optimal {
                    PlanStatus::Optimal
                } else {
                    PlanStatus::Feasible
                };
                (solution, status)
            }
            SolveOutcome::TimedOut {
                best: Some(solution),
                elapsed,
            } => {
                warn!(
                    event = "plan_from_incumbent",
                    elapsed_ms = elapsed.as_millis() as u64,
                    objective = solution.objective,
                );
                (solution, PlanStatus::TimedOut)
            }
            // every remaining outcome maps to an error
            other => other
                .into_result()
                .map(|solution| (solution, PlanStatus::Feasible))?,
        };

        self.finish(&run, solution, status, started)
    }

    fn finish(
        &self,
        run: &PreparedRun,
        solution: Solution,
        status: PlanStatus,
        started: Instant,
    ) -> Result<PlanResult> {
        let assignments = extract(&run.problem, &solution)?;
        let breakdown = cost_breakdown(&run.problem, &run.weights, &solution);

        info!(
            event = "plan_ready",
            status = ?status,
            assignments = assignments.len(),
            objective = solution.objective,
            dominant_tier = breakdown.dominant().map(|t| t.tier.as_str()).unwrap_or("none"),
        );

        Ok(PlanResult {
            status,
            assignments,
            breakdown,
            objective: solution.objective,
            elapsed: started.elapsed(),
        })
    }

    /// Prepares `input` once per configuration, in parallel.
    ///
    /// Results come back in the order of `configs`.
    pub fn sweep(input: &SchedulingInput, configs: &[PlannerConfig]) -> Vec<Result<PreparedRun>> {
        info!(event = "sweep_start", runs = configs.len());
        configs
            .par_iter()
            .map(|config| Planner::new(config.clone()).prepare(input))
            .collect()
    }
}
