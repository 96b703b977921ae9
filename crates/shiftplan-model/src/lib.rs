//! Model boundary of shiftplan.
//!
//! Packages the precomputed segments, conflicts and weights into a
//! [`ProblemDescription`], hands it to a [`SolverEngine`] under a time limit
//! and reads the result back as assignments and a per-tier cost breakdown.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use shiftplan_model::{solve, ExhaustiveEngine, ProblemDescription, SolveOutcome};
//!
//! let problem = Arc::new(ProblemDescription::default());
//! let outcome = solve(
//!     Arc::new(ExhaustiveEngine::new()),
//!     problem,
//!     Duration::from_secs(1),
//!     Arc::new(AtomicBool::new(false)),
//! );
//! assert!(matches!(outcome, SolveOutcome::Solved { optimal: true, .. }));
//! ```

pub mod builder;
pub mod engine;
pub mod extract;
pub mod problem;
pub mod solve;

pub use builder::build_problem;
pub use engine::{EngineOutcome, ExhaustiveEngine, SolveContext, SolverEngine};
pub use extract::{
    cost_breakdown, extract, Assignment, AssignmentSet, CostBreakdown, InfeasibilityReport,
    TierCost,
};
pub use problem::{
    Constraint, ConstraintFamily, ObjectiveTerm, ProblemDescription, Relation, Solution, Term,
    VarId, Variable, VariableKind,
};
pub use solve::{solve, SolveOutcome};
