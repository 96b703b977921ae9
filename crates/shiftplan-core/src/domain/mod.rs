//! Scheduling domain entities.
//!
//! All entities are built once per run from validated input and never mutated
//! by the formulation pipeline. Collections use ordered containers so every
//! derived structure iterates deterministically.

mod calendar;
mod employee;
mod input;
mod shift;
mod skill;


pub use calendar::{Availability, Preference, TimeOff};
pub use employee::{Employee, EmployeeKind};
pub use input::SchedulingInput;
pub use shift::{Shift, Window};
pub use skill::SkillRequirements;

/// Identifier of an employee.
pub type EmployeeId = String;
/// Identifier of a shift.
pub type ShiftId = String;
/// Identifier of a coverage window.
pub type WindowId = String;
/// Identifier of a role.
pub type RoleId = String;
/// Identifier of a skill.
pub type SkillId = String;
