//! Timed hand-off to a solving engine.
//!
//! The engine runs on its own thread. The caller waits on a result channel
//! with the deadline as the bound, collecting incumbents as they arrive and
//! polling the cancel flag. When the deadline passes or the run is cancelled
//! the engine is told to stop and the caller returns without waiting for it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, select, Receiver};
use shiftplan_core::{Result, ShiftplanError};
use tracing::{info, warn};

use crate::engine::{EngineOutcome, SolveContext, SolverEngine};
use crate::extract::InfeasibilityReport;
use crate::problem::{ProblemDescription, Solution};

/// How often the cancel flag is polled while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of a timed engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The engine returned a solution in time.
    Solved {
        solution: Solution,
        optimal: bool,
        elapsed: Duration,
    },
    /// The budget ran out; `best` is the last incumbent, if any.
    TimedOut {
        best: Option<Solution>,
        elapsed: Duration,
    },
    /// The engine proved the problem infeasible.
    Infeasible(InfeasibilityReport),
    /// The caller cancelled the run.
    Cancelled,
    /// The engine failed or vanished.
    Failed(String),
}

impl SolveOutcome {
    /// Best solution known, proven or not.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Solved { solution, .. } => Some(solution),
            SolveOutcome::TimedOut { best, .. } => best.as_ref(),
            _ => None,
        }
    }

    /// Maps every outcome except [`SolveOutcome::Solved`] to its error.
    pub fn into_result(self) -> Result<Solution> {
        match self {
            SolveOutcome::Solved { solution, .. } => Ok(solution),
            SolveOutcome::TimedOut { best, elapsed } => Err(ShiftplanError::SolverTimeout {
                elapsed_ms: elapsed.as_millis() as u64,
                has_incumbent: best.is_some(),
            }),
            SolveOutcome::Infeasible(report) => Err(ShiftplanError::SolverInfeasible {
                dominant_family: report.dominant_label(),
            }),
            SolveOutcome::Cancelled => Err(ShiftplanError::Cancelled),
            SolveOutcome::Failed(reason) => Err(ShiftplanError::Engine(reason)),
        }
    }
}

/// Runs `engine` on `problem` for at most `time_limit`.
///
/// Setting `cancel` aborts the wait and tells the engine to stop. A timeout
/// is reported as [`SolveOutcome::TimedOut`] and never as infeasibility,
/// including when the engine hands back an unproven solution after the
/// budget ran out. A limit too large for the clock means no deadline.
pub fn solve(
    engine: Arc<dyn SolverEngine>,
    problem: Arc<ProblemDescription>,
    time_limit: Duration,
    cancel: Arc<AtomicBool>,
) -> SolveOutcome {
    let started = Instant::now();
    let deadline = started.checked_add(time_limit);

    if cancel.load(Ordering::SeqCst) {
        return SolveOutcome::Cancelled;
    }

    let stop = Arc::new(AtomicBool::new(false));
    let (result_tx, result_rx) = channel::bounded::<EngineOutcome>(1);
    let (incumbent_tx, incumbent_rx) = channel::unbounded::<Solution>();
    let context = SolveContext::new(deadline, Arc::clone(&stop), incumbent_tx);

    info!(
        event = "solve_start",
        engine = engine.name(),
        variables = problem.variables.len(),
        constraints = problem.constraints.len(),
        time_limit_ms = time_limit.as_millis() as u64,
    );

    let worker = {
        let problem = Arc::clone(&problem);
        let engine = Arc::clone(&engine);
        thread::Builder::new()
            .name("shiftplan-engine".to_string())
            .spawn(move || {
                let outcome = engine.solve(&problem, &context);
                let _ = result_tx.send(outcome);
            })
    };
    if let Err(err) = worker {
        return SolveOutcome::Failed(format!("failed to start engine thread: {err}"));
    }

    let mut best: Option<Solution> = None;
    let closed: Receiver<Solution> = channel::never();
    let mut incumbents_open = true;

    loop {
        let incumbents = if incumbents_open { &incumbent_rx } else { &closed };
        select! {
            recv(result_rx) -> msg => {
                for solution in incumbent_rx.try_iter() {
                    keep_better(&mut best, solution);
                }
                let budget_spent =
                    stop.load(Ordering::SeqCst) || deadline.is_some_and(|d| Instant::now() >= d);
                let outcome = match msg {
                    Ok(outcome) => finish(outcome, best, &problem, started, &cancel, budget_spent),
                    Err(_) => SolveOutcome::Failed("engine thread exited without a result".to_string()),
                };
                log_outcome(&outcome, started);
                return outcome;
            }
            recv(incumbents) -> msg => match msg {
                Ok(solution) => keep_better(&mut best, solution),
                Err(_) => incumbents_open = false,
            },
            default(POLL_INTERVAL) => {}
        }

        if cancel.load(Ordering::SeqCst) {
            stop.store(true, Ordering::SeqCst);
            log_outcome(&SolveOutcome::Cancelled, started);
            return SolveOutcome::Cancelled;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            stop.store(true, Ordering::SeqCst);
            for solution in incumbent_rx.try_iter() {
                keep_better(&mut best, solution);
            }
            let outcome = SolveOutcome::TimedOut {
                best,
                elapsed: started.elapsed(),
            };
            log_outcome(&outcome, started);
            return outcome;
        }
    }
}

fn keep_better(best: &mut Option<Solution>, candidate: Solution) {
    if best
        .as_ref()
        .map_or(true, |b| candidate.objective < b.objective)
    {
        *best = Some(candidate);
    }
}

fn finish(
    outcome: EngineOutcome,
    best: Option<Solution>,
    problem: &ProblemDescription,
    started: Instant,
    cancel: &AtomicBool,
    budget_spent: bool,
) -> SolveOutcome {
    let elapsed = started.elapsed();
    match outcome {
        EngineOutcome::Feasible(solution) if budget_spent => {
            let mut best = best;
            keep_better(&mut best, solution);
            SolveOutcome::TimedOut { best, elapsed }
        }
        EngineOutcome::Optimal(solution) => SolveOutcome::Solved {
            solution,
            optimal: true,
            elapsed,
        },
        EngineOutcome::Feasible(solution) => SolveOutcome::Solved {
            solution,
            optimal: false,
            elapsed,
        },
        EngineOutcome::Infeasible { core } => {
            SolveOutcome::Infeasible(InfeasibilityReport::from_core(problem, &core))
        }
        EngineOutcome::Stopped if cancel.load(Ordering::SeqCst) => SolveOutcome::Cancelled,
        EngineOutcome::Stopped => SolveOutcome::TimedOut { best, elapsed },
        EngineOutcome::Failed(reason) => SolveOutcome::Failed(reason),
    }
}

fn log_outcome(outcome: &SolveOutcome, started: Instant) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match outcome {
        SolveOutcome::Solved {
            solution, optimal, ..
        } => info!(
            event = "solve_end",
            status = if *optimal { "optimal" } else { "feasible" },
            objective = solution.objective,
            elapsed_ms,
        ),
        SolveOutcome::TimedOut { best, .. } => warn!(
            event = "solve_timeout",
            has_incumbent = best.is_some(),
            elapsed_ms,
        ),
        SolveOutcome::Infeasible(report) => warn!(
            event = "solve_infeasible",
            dominant_family = %report.dominant_label(),
            elapsed_ms,
        ),
        SolveOutcome::Cancelled => info!(event = "solve_cancelled", elapsed_ms),
        SolveOutcome::Failed(reason) => warn!(event = "solve_failed", reason = %reason, elapsed_ms),
    }
}

#[cfg(test)]
#[path = "solve_tests.rs"]
mod tests;
