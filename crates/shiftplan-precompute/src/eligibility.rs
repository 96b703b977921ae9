//! Employee/shift eligibility mask.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use shiftplan_core::{EmployeeId, SchedulingInput, ShiftId};
use tracing::debug;

/// The set of employee/shift pairs that may become assignments.
///
/// A pair is eligible iff the employee holds the shift's role, no explicit
/// availability entry marks the pair unavailable and no time-off interval of
/// the employee overlaps the shift. Missing availability entries count as
/// available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    by_employee: BTreeMap<EmployeeId, BTreeSet<ShiftId>>,
    by_shift: BTreeMap<ShiftId, BTreeSet<EmployeeId>>,
}

impl Eligibility {
    pub fn build(input: &SchedulingInput) -> Self {
        let unavailable: HashMap<(&str, &str), bool> = input
            .availability
            .iter()
            .map(|a| ((a.employee_id.as_str(), a.shift_id.as_str()), a.available))
            .collect();

        let mut eligibility = Self::default();
        for employee in &input.employees {
            let time_off: Vec<_> = input
                .time_off
                .iter()
                .filter(|t| t.employee_id == employee.id)
                .collect();

            for shift in &input.shifts {
                if !employee.has_role(&shift.role) {
                    continue;
                }
                let key = (employee.id.as_str(), shift.id.as_str());
                if unavailable.get(&key) == Some(&false) {
                    continue;
                }
                if time_off.iter().any(|t| t.interval.overlaps(&shift.interval)) {
                    continue;
                }
                eligibility.insert(&employee.id, &shift.id);
            }
        }

        debug!(
            event = "eligibility_built",
            pairs = eligibility.len(),
            employees = input.employees.len(),
            shifts = input.shifts.len(),
        );
        eligibility
    }

    fn insert(&mut self, employee: &str, shift: &str) {
        self.by_employee
            .entry(employee.to_string())
            .or_default()
            .insert(shift.to_string());
        self.by_shift
            .entry(shift.to_string())
            .or_default()
            .insert(employee.to_string());
    }

    pub fn is_eligible(&self, employee: &str, shift: &str) -> bool {
        self.by_employee
            .get(employee)
            .is_some_and(|shifts| shifts.contains(shift))
    }

    /// Shifts the employee may take, in id order.
    pub fn shifts_of(&self, employee: &str) -> impl Iterator<Item = &ShiftId> {
        self.by_employee.get(employee).into_iter().flatten()
    }

    /// Employees who may take the shift, in id order.
    pub fn employees_for(&self, shift: &str) -> impl Iterator<Item = &EmployeeId> {
        self.by_shift.get(shift).into_iter().flatten()
    }

    /// Employees with at least one eligible shift, in id order.
    pub fn active_employees(&self) -> impl Iterator<Item = &EmployeeId> {
        self.by_employee.keys()
    }

    /// All eligible pairs ordered by employee then shift.
    pub fn pairs(&self) -> impl Iterator<Item = (&EmployeeId, &ShiftId)> {
        self.by_employee
            .iter()
            .flat_map(|(e, shifts)| shifts.iter().map(move |s| (e, s)))
    }

    pub fn len(&self) -> usize {
        self.by_employee.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_employee.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiftplan_core::{Availability, TimeOff};
    use shiftplan_test::builders::{employee, interval, shift};
    use shiftplan_test::scenarios::mixed_week;

    #[test]
    fn test_role_match_required() {
        let input = SchedulingInput::new(
            vec![employee("e1", &["cook"]), employee("e2", &["porter"])],
            vec![shift("s1", 0, "06:00", "14:00", "cook")],
        );
        let elig = Eligibility::build(&input);
        assert!(elig.is_eligible("e1", "s1"));
        assert!(!elig.is_eligible("e2", "s1"));
        assert_eq!(elig.len(), 1);
    }

    #[test]
    fn test_missing_availability_means_available() {
        let input = SchedulingInput::new(
            vec![employee("e1", &["cook"])],
            vec![
                shift("s1", 0, "06:00", "14:00", "cook"),
                shift("s2", 1, "06:00", "14:00", "cook"),
                shift("s3", 2, "06:00", "14:00", "cook"),
            ],
        )
        .with_availability(vec![
            Availability::new("e1", "s1", false),
            Availability::new("e1", "s2", true),
        ]);
        let elig = Eligibility::build(&input);
        let shifts: Vec<&str> = elig.shifts_of("e1").map(String::as_str).collect();
        assert_eq!(shifts, vec!["s2", "s3"]);
    }

    #[test]
    fn test_time_off_blocks_overlapping_overnight_shift() {
        let input = SchedulingInput::new(
            vec![employee("e1", &["guard"])],
            vec![
                shift("night", 0, "22:00", "06:00", "guard"),
                shift("day", 1, "08:00", "16:00", "guard"),
            ],
        )
        .with_time_off(vec![TimeOff::new("e1", interval(1, "05:00", "07:00"))]);
        let elig = Eligibility::build(&input);
        assert!(!elig.is_eligible("e1", "night"));
        assert!(elig.is_eligible("e1", "day"));
    }

    #[test]
    fn test_pairs_are_ordered() {
        let elig = Eligibility::build(&mixed_week());
        let pairs: Vec<(String, String)> = elig
            .pairs()
            .map(|(e, s)| (e.clone(), s.clone()))
            .collect();
        let mut sorted = pairs.clone();
        sorted.sort();
        assert_eq!(pairs, sorted);
        assert!(!elig.is_eligible("bob", "c-d1-am"));
        assert!(!elig.is_eligible("dee", "p-d1-am"));
        assert!(elig.is_eligible("dee", "p-d1-night"));
    }
}
