//! shiftplan - Temporal decomposition and constraint formulation for shift
//! scheduling.
//!
//! Turns employees, shifts and coverage windows into a lexicographically
//! weighted constraint problem, hands it to a solving engine and reads the
//! plan back.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! use shiftplan::prelude::*;
//!
//! let input = SchedulingInput::new(
//!     vec![Employee::new("e1", "Eve").with_roles(["cook"])],
//!     vec![Shift::parse("early", "2025-10-06", "06:00", "14:00", "cook")
//!         .unwrap()
//!         .with_demand(1)],
//! );
//!
//! let plan = Planner::new(PlannerConfig::default())
//!     .solve(&input, Arc::new(ExhaustiveEngine::new()), Arc::new(AtomicBool::new(false)))
//!     .unwrap();
//! assert!(plan.assignments.contains("e1", "early"));
//! ```

// Domain and errors
pub use shiftplan_core::{
    Availability, Employee, EmployeeId, EmployeeKind, PenaltyTier, Preference, Result,
    SchedulingInput, Shift, ShiftId, ShiftplanError, SkillRequirements, TimeInterval, TimeOff,
    Window,
};

// Configuration
pub use shiftplan_config::{
    ConfigError, MidnightPolicy, PlannerConfig, SkillAggregation, WeightMode,
};

// Precomputation stages
pub use shiftplan_precompute as precompute;

// Model boundary
pub use shiftplan_model::{
    Assignment, AssignmentSet, ConstraintFamily, CostBreakdown, EngineOutcome, ExhaustiveEngine,
    InfeasibilityReport, ProblemDescription, Solution, SolveContext, SolveOutcome, SolverEngine,
    TierCost,
};

pub mod console;

mod planner;
pub use planner::{PlanResult, PlanStatus, Planner, PreparedRun, DEFAULT_TIME_LIMIT};

pub mod prelude {
    pub use super::{
        Availability, Employee, EmployeeKind, Preference, SchedulingInput, Shift,
        SkillRequirements, TimeOff, Window,
    };
    pub use super::{MidnightPolicy, PenaltyTier, PlannerConfig, SkillAggregation, WeightMode};
    pub use super::{ExhaustiveEngine, SolveContext, SolverEngine};
    pub use super::{PlanResult, PlanStatus, Planner};
}
