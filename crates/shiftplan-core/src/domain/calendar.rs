use serde::{Deserialize, Serialize};

use super::{EmployeeId, ShiftId};
use crate::time::TimeInterval;

/// Explicit availability of an employee for one shift.
///
/// Pairs without an entry count as available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub employee_id: EmployeeId,
    pub shift_id: ShiftId,
    pub available: bool,
}

impl Availability {
    pub fn new(employee_id: impl Into<EmployeeId>, shift_id: impl Into<ShiftId>, available: bool) -> Self {
        Self {
            employee_id: employee_id.into(),
            shift_id: shift_id.into(),
            available,
        }
    }
}

/// A period during which an employee cannot work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOff {
    pub employee_id: EmployeeId,
    pub interval: TimeInterval,
}

impl TimeOff {
    pub fn new(employee_id: impl Into<EmployeeId>, interval: TimeInterval) -> Self {
        Self {
            employee_id: employee_id.into(),
            interval,
        }
    }
}

/// An employee's liking for a shift; negative scores ask to avoid it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub employee_id: EmployeeId,
    pub shift_id: ShiftId,
    pub score: i32,
}

impl Preference {
    pub fn new(employee_id: impl Into<EmployeeId>, shift_id: impl Into<ShiftId>, score: i32) -> Self {
        Self {
            employee_id: employee_id.into(),
            shift_id: shift_id.into(),
            score,
        }
    }
}
