use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::{Availability, Employee, Preference, RoleId, Shift, TimeOff, Window};
use crate::error::{Result, ShiftplanError};

/// The complete entity snapshot of one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulingInput {
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub windows: Vec<Window>,
    #[serde(default)]
    pub availability: Vec<Availability>,
    #[serde(default)]
    pub time_off: Vec<TimeOff>,
    #[serde(default)]
    pub preferences: Vec<Preference>,
}

impl SchedulingInput {
    pub fn new(employees: Vec<Employee>, shifts: Vec<Shift>) -> Self {
        Self {
            employees,
            shifts,
            ..Self::default()
        }
    }

    pub fn with_windows(mut self, windows: Vec<Window>) -> Self {
        self.windows = windows;
        self
    }

    pub fn with_availability(mut self, availability: Vec<Availability>) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_time_off(mut self, time_off: Vec<TimeOff>) -> Self {
        self.time_off = time_off;
        self
    }

    pub fn with_preferences(mut self, preferences: Vec<Preference>) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn shift(&self, id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }

    /// Roles held by at least one employee or used by at least one shift.
    pub fn known_roles(&self) -> BTreeSet<&RoleId> {
        self.employees
            .iter()
            .flat_map(|e| e.roles.iter())
            .chain(self.shifts.iter().map(|s| &s.role))
            .collect()
    }

    /// Checks referential integrity, failing on the first violation.
    ///
    /// Checks:
    /// 1. No duplicate employee, shift or window ids
    /// 2. Every shift role is held by at least one employee
    /// 3. Every window role is a known role
    /// 4. Availability, time-off and preference entries reference existing
    ///    employees and shifts
    /// 5. No availability pair is given twice
    /// 6. Contract hours are finite and non-negative
    /// 7. Every shift, window and time-off interval is normalized
    pub fn validate(&self) -> Result<()> {
        let mut employee_ids = HashSet::new();
        for employee in &self.employees {
            if !employee_ids.insert(employee.id.as_str()) {
                return Err(ShiftplanError::DuplicateId {
                    kind: "employee",
                    id: employee.id.clone(),
                });
            }
            for (label, hours) in [
                ("min_rest_hours", employee.min_rest_hours),
                ("max_week_hours", employee.max_week_hours),
                ("max_overtime_hours", employee.max_overtime_hours),
            ] {
                if let Some(h) = hours {
                    if !h.is_finite() || h < 0.0 {
                        return Err(ShiftplanError::InvalidInput(format!(
                            "employee {}: {label} must be a non-negative number, got {h}",
                            employee.id
                        )));
                    }
                }
            }
        }

        let employee_roles: HashSet<&str> = self
            .employees
            .iter()
            .flat_map(|e| e.roles.iter().map(String::as_str))
            .collect();

        let mut shift_ids = HashSet::new();
        for shift in &self.shifts {
            shift.interval.check(&format!("shift {}", shift.id))?;
            if !shift_ids.insert(shift.id.as_str()) {
                return Err(ShiftplanError::DuplicateId {
                    kind: "shift",
                    id: shift.id.clone(),
                });
            }
            if !employee_roles.contains(shift.role.as_str()) {
                return Err(ShiftplanError::unknown(
                    format!("shift {}", shift.id),
                    "role",
                    &shift.role,
                ));
            }
        }

        let known_roles = self.known_roles();
        let mut window_ids = HashSet::new();
        for window in &self.windows {
            window.interval.check(&format!("window {}", window.id))?;
            if !window_ids.insert(window.id.as_str()) {
                return Err(ShiftplanError::DuplicateId {
                    kind: "window",
                    id: window.id.clone(),
                });
            }
            if !known_roles.contains(&window.role) {
                return Err(ShiftplanError::unknown(
                    format!("window {}", window.id),
                    "role",
                    &window.role,
                ));
            }
        }

        let mut pairs = HashSet::new();
        for entry in &self.availability {
            self.check_pair("availability", &employee_ids, &shift_ids, &entry.employee_id, &entry.shift_id)?;
            if !pairs.insert((entry.employee_id.as_str(), entry.shift_id.as_str())) {
                return Err(ShiftplanError::DuplicateId {
                    kind: "availability pair",
                    id: format!("{}/{}", entry.employee_id, entry.shift_id),
                });
            }
        }

        for entry in &self.preferences {
            self.check_pair("preference", &employee_ids, &shift_ids, &entry.employee_id, &entry.shift_id)?;
        }

        for entry in &self.time_off {
            entry
                .interval
                .check(&format!("time off for {}", entry.employee_id))?;
            if !employee_ids.contains(entry.employee_id.as_str()) {
                return Err(ShiftplanError::unknown("time off", "employee", &entry.employee_id));
            }
        }

        Ok(())
    }

    fn check_pair(
        &self,
        entity: &str,
        employee_ids: &HashSet<&str>,
        shift_ids: &HashSet<&str>,
        employee_id: &str,
        shift_id: &str,
    ) -> Result<()> {
        if !employee_ids.contains(employee_id) {
            return Err(ShiftplanError::unknown(entity, "employee", employee_id));
        }
        if !shift_ids.contains(shift_id) {
            return Err(ShiftplanError::unknown(entity, "shift", shift_id));
        }
        Ok(())
    }
}
