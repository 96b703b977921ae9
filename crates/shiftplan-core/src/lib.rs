//! shiftplan Core - Core types for shift scheduling formulation
//!
//! This crate provides the fundamental abstractions for shiftplan:
//! - Normalized time intervals (cross-midnight aware)
//! - Scheduling entities: employees, shifts, coverage windows, calendars
//! - Input validation with referential integrity checks
//! - Penalty tiers shared by configuration and the model boundary

pub mod domain;
pub mod error;
pub mod tier;
pub mod time;

#[cfg(test)]
mod time_tests;

pub use domain::{
    Availability, Employee, EmployeeId, EmployeeKind, Preference, RoleId, SchedulingInput, Shift,
    ShiftId, SkillId, SkillRequirements, TimeOff, Window, WindowId,
};
pub use error::{Result, ShiftplanError};
pub use tier::PenaltyTier;
pub use time::{iso_week, parse_day, parse_hhmm, TimeInterval, MINUTES_PER_DAY};
