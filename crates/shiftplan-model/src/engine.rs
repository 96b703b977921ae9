//! Solving engine interface.
//!
//! The core never searches for solutions itself. A [`SolverEngine`] receives
//! the problem description and a [`SolveContext`] carrying the deadline, a
//! stop flag and a channel for improving incumbents. An engine that has to
//! stop early returns [`EngineOutcome::Stopped`]; what it found so far has
//! already gone out as incumbents.
//!
//! [`ExhaustiveEngine`] enumerates every assignment and is only usable on
//! small problems; it serves as a reference for tests and tiny inputs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::Sender;
use tracing::debug;

use crate::problem::{ProblemDescription, Relation, Solution, VarId};

/// What an engine reports back.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// Proven optimal.
    Optimal(Solution),
    /// Feasible, optimality not proven.
    Feasible(Solution),
    /// Proven infeasible; `core` lists indices of conflicting constraints,
    /// empty when the engine cannot tell.
    Infeasible { core: Vec<usize> },
    /// Stopped through the context before finishing.
    Stopped,
    /// The engine failed on its own.
    Failed(String),
}

/// Limits and channels of one engine call.
#[derive(Debug, Clone)]
pub struct SolveContext {
    deadline: Option<Instant>,
    stop: Arc<AtomicBool>,
    incumbents: Sender<Solution>,
}

impl SolveContext {
    /// `deadline` is `None` when the budget is too large to fall on a
    /// representable instant.
    pub fn new(
        deadline: Option<Instant>,
        stop: Arc<AtomicBool>,
        incumbents: Sender<Solution>,
    ) -> Self {
        Self {
            deadline,
            stop,
            incumbents,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the engine must stop: deadline passed, cancelled or timed out.
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Publishes an improving solution. Ignored once nobody listens.
    pub fn report(&self, solution: Solution) {
        let _ = self.incumbents.send(solution);
    }
}

/// A solving engine the model boundary can hand problems to.
pub trait SolverEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Solves `problem`, checking [`SolveContext::should_stop`] regularly.
    fn solve(&self, problem: &ProblemDescription, context: &SolveContext) -> EngineOutcome;
}

/// Enumerates all assignments; slack variables follow from their constraint.
#[derive(Debug, Clone)]
pub struct ExhaustiveEngine {
    max_assignments: usize,
}

impl ExhaustiveEngine {
    /// Largest number of assignment variables accepted by default.
    pub const DEFAULT_MAX_ASSIGNMENTS: usize = 20;

    pub fn new() -> Self {
        Self {
            max_assignments: Self::DEFAULT_MAX_ASSIGNMENTS,
        }
    }

    pub fn with_max_assignments(mut self, max: usize) -> Self {
        self.max_assignments = max;
        self
    }
}

impl Default for ExhaustiveEngine {
    fn default() -> Self {
        Self::new()
    }
}

const STOP_CHECK_INTERVAL: u64 = 1024;

impl SolverEngine for ExhaustiveEngine {
    fn name(&self) -> &str {
        "exhaustive"
    }

    fn solve(&self, problem: &ProblemDescription, context: &SolveContext) -> EngineOutcome {
        let decisions: Vec<VarId> = problem
            .variables
            .iter()
            .filter(|v| v.is_assignment())
            .map(|v| v.id)
            .collect();
        if decisions.len() > self.max_assignments.min(62) {
            return EngineOutcome::Failed(format!(
                "{} assignment variables exceed the exhaustive limit of {}",
                decisions.len(),
                self.max_assignments
            ));
        }

        let mut best: Option<Solution> = None;
        let mut fewest_violations: Option<Vec<usize>> = None;
        let mut values = vec![0i64; problem.variables.len()];

        for mask in 0u64..(1u64 << decisions.len()) {
            if mask % STOP_CHECK_INTERVAL == 0 && context.should_stop() {
                debug!(
                    event = "exhaustive_stopped",
                    visited = mask,
                    has_incumbent = best.is_some(),
                );
                return EngineOutcome::Stopped;
            }

            for (bit, &var) in decisions.iter().enumerate() {
                values[var] = ((mask >> bit) & 1) as i64;
            }
            settle_slack(problem, &mut values);

            let violated = problem.violations(&values);
            if !violated.is_empty() {
                if fewest_violations
                    .as_ref()
                    .map_or(true, |f| violated.len() < f.len())
                {
                    fewest_violations = Some(violated);
                }
                continue;
            }

            let objective = problem.objective_value(&values);
            if best.as_ref().map_or(true, |b| objective < b.objective) {
                let solution = Solution {
                    values: values.clone(),
                    objective,
                };
                context.report(solution.clone());
                best = Some(solution);
            }
        }

        match best {
            Some(solution) => EngineOutcome::Optimal(solution),
            None => EngineOutcome::Infeasible {
                core: fewest_violations.unwrap_or_default(),
            },
        }
    }
}

/// Sets each slack variable to the smallest in-bounds value its constraint
/// allows given the current assignment values.
pub(crate) fn settle_slack(problem: &ProblemDescription, values: &mut [i64]) {
    for var in &problem.variables {
        if var.slack_of.is_some() {
            values[var.id] = var.lower;
        }
    }

    for (index, constraint) in problem.constraints.iter().enumerate() {
        let mut fixed = 0i64;
        let mut slack = Vec::new();
        for term in &constraint.terms {
            let owned = problem
                .variables
                .get(term.var)
                .is_some_and(|v| v.slack_of == Some(index));
            if owned {
                slack.push(*term);
            } else {
                fixed += term.coef * values[term.var];
            }
        }
        if slack.is_empty() {
            continue;
        }

        // what the slack terms must contribute
        let residual = constraint.rhs - fixed;
        for term in slack {
            let needed = match (constraint.relation, term.coef.signum()) {
                (Relation::Ge, 1) | (Relation::Eq, 1) => residual.max(0),
                (Relation::Le, -1) | (Relation::Eq, -1) => (-residual).max(0),
                _ => 0,
            };
            if let Some(bounds) = problem.variables.get(term.var) {
                values[term.var] = needed.clamp(bounds.lower, bounds.upper);
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
