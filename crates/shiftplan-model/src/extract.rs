//! Reading engine output back into scheduling terms.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shiftplan_core::{EmployeeId, PenaltyTier, Result, ShiftId, ShiftplanError};
use shiftplan_precompute::WeightTable;

use crate::problem::{ConstraintFamily, ProblemDescription, Solution};

/// One employee working one whole shift.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assignment {
    pub employee: EmployeeId,
    pub shift: ShiftId,
}

/// Assignments of a solution, ordered by employee then shift.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSet {
    assignments: Vec<Assignment>,
}

impl AssignmentSet {
    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn contains(&self, employee: &str, shift: &str) -> bool {
        self.assignments
            .iter()
            .any(|a| a.employee == employee && a.shift == shift)
    }

    /// Shifts worked by an employee.
    pub fn shifts_of<'a>(&'a self, employee: &'a str) -> impl Iterator<Item = &'a ShiftId> {
        self.assignments
            .iter()
            .filter(move |a| a.employee == employee)
            .map(|a| &a.shift)
    }

    /// Employees working a shift.
    pub fn staff_of<'a>(&'a self, shift: &'a str) -> impl Iterator<Item = &'a EmployeeId> {
        self.assignments
            .iter()
            .filter(move |a| a.shift == shift)
            .map(|a| &a.employee)
    }
}

/// Reads the assignments a solution switches on.
///
/// # Errors
///
/// Returns [`ShiftplanError::Engine`] when the solution does not match the
/// problem's variable count.
pub fn extract(problem: &ProblemDescription, solution: &Solution) -> Result<AssignmentSet> {
    if solution.values.len() != problem.variables.len() {
        return Err(ShiftplanError::Engine(format!(
            "solution has {} values for {} variables",
            solution.values.len(),
            problem.variables.len()
        )));
    }
    let mut assignments: Vec<Assignment> = problem
        .assignments()
        .filter(|(var, _, _)| solution.value(*var) > 0)
        .map(|(_, employee, shift)| Assignment {
            employee: employee.clone(),
            shift: shift.clone(),
        })
        .collect();
    assignments.sort();
    Ok(AssignmentSet { assignments })
}

/// Violated minutes and weighted cost of one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCost {
    pub tier: PenaltyTier,
    pub minutes: u64,
    pub cost: f64,
}

/// Per-tier cost of a solution, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub tiers: Vec<TierCost>,
    pub total: f64,
}

impl CostBreakdown {
    pub fn get(&self, tier: PenaltyTier) -> Option<&TierCost> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Tier with the highest cost; `None` when nothing costs anything.
    pub fn dominant(&self) -> Option<&TierCost> {
        self.tiers
            .iter()
            .filter(|t| t.cost > 0.0)
            .fold(None, |best: Option<&TierCost>, t| match best {
                Some(b) if b.cost >= t.cost => Some(b),
                _ => Some(t),
            })
    }
}

/// Sums the objective of a solution per tier.
///
/// Every enabled tier of `weights` appears, in priority order, even at zero.
pub fn cost_breakdown(
    problem: &ProblemDescription,
    weights: &WeightTable,
    solution: &Solution,
) -> CostBreakdown {
    let mut sums: BTreeMap<PenaltyTier, (u64, f64)> = BTreeMap::new();
    for term in &problem.objective {
        let units = solution.value(term.var).max(0);
        let entry = sums.entry(term.tier).or_insert((0, 0.0));
        entry.0 += units as u64 * term.minutes_per_unit;
        entry.1 += units as f64 * term.coefficient;
    }

    let tiers: Vec<TierCost> = weights
        .iter()
        .map(|w| {
            let (minutes, cost) = sums.get(&w.tier).copied().unwrap_or((0, 0.0));
            TierCost {
                tier: w.tier,
                minutes,
                cost,
            }
        })
        .collect();
    let total = tiers.iter().map(|t| t.cost).sum();
    CostBreakdown { tiers, total }
}

/// Which constraint families an infeasible problem runs into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfeasibilityReport {
    /// Constraint count per family.
    pub families: BTreeMap<ConstraintFamily, usize>,
    pub dominant: Option<ConstraintFamily>,
    /// Names of the constraints counted.
    pub constraints: Vec<String>,
}

impl InfeasibilityReport {
    /// Counts the constraints of an engine's conflicting core.
    ///
    /// With an empty core every hard constraint is counted instead.
    pub fn from_core(problem: &ProblemDescription, core: &[usize]) -> Self {
        let picked: Vec<_> = if core.is_empty() {
            problem
                .constraints
                .iter()
                .filter(|c| c.family.is_hard())
                .collect()
        } else {
            core.iter()
                .filter_map(|&i| problem.constraints.get(i))
                .collect()
        };

        let mut families: BTreeMap<ConstraintFamily, usize> = BTreeMap::new();
        for constraint in &picked {
            *families.entry(constraint.family).or_insert(0) += 1;
        }
        // ties go to the family listed first
        let dominant = families
            .iter()
            .fold(None, |best: Option<(ConstraintFamily, usize)>, (&f, &n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((f, n)),
            })
            .map(|(f, _)| f);

        Self {
            families,
            dominant,
            constraints: picked.iter().map(|c| c.name.clone()).collect(),
        }
    }

    pub fn dominant_label(&self) -> String {
        self.dominant
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
