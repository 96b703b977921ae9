//! Declarative problem description handed to a solving engine.
//!
//! A [`ProblemDescription`] is plain data: bounded integer variables, linear
//! constraints over them and a weighted objective. Engines read it; nothing
//! in it refers back to the pipeline that built it.

use std::fmt;

use serde::{Deserialize, Serialize};
use shiftplan_core::{EmployeeId, PenaltyTier, Result, ShiftId, SkillId};

/// Index of a variable in [`ProblemDescription::variables`].
pub type VarId = usize;

/// What a variable stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableKind {
    /// 1 when the employee works the whole shift.
    Assignment { employee: EmployeeId, shift: ShiftId },
    /// Headcount missing from a segment.
    Shortfall { segment: String },
    /// Headcount beyond a segment's demand.
    Overstaff { segment: String },
    /// Missing holders of one skill in a segment.
    SkillShortfall { segment: String, skill: SkillId },
    /// Headcount missing from a shift's own demand.
    ShiftShortfall { shift: ShiftId },
    /// Minutes beyond contractual hours in one ISO week.
    Overtime {
        employee: EmployeeId,
        iso_year: i32,
        iso_week: u32,
    },
    /// Assigned minutes above the even share.
    WorkloadOver { employee: EmployeeId },
    /// Assigned minutes below the even share.
    WorkloadUnder { employee: EmployeeId },
}

/// A bounded integer decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VarId,
    pub name: String,
    pub kind: VariableKind,
    pub lower: i64,
    pub upper: i64,
    /// Constraint this variable is the slack of, if any.
    ///
    /// Given the assignment variables, a slack variable is fixed by its
    /// constraint at the smallest value that satisfies it.
    pub slack_of: Option<usize>,
}

impl Variable {
    #[inline]
    pub fn is_assignment(&self) -> bool {
        matches!(self.kind, VariableKind::Assignment { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

impl Relation {
    fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Relation::Le => lhs <= rhs,
            Relation::Ge => lhs >= rhs,
            Relation::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "==",
        })
    }
}

/// Group of constraints generated by one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    /// Segment headcount against demand.
    Coverage,
    /// Segment skill holders against skill demand.
    Skill,
    /// Shift headcount against the shift's own demand.
    ShiftDemand,
    /// No employee works both shifts of a rest conflict.
    Rest,
    /// No employee works night shifts on nearby days.
    ConsecutiveNights,
    /// Night shifts per employee per ISO week.
    NightCap,
    /// Shifts per employee per start day.
    DailyLimit,
    /// Weekly minutes within contractual hours plus overtime.
    Hours,
    /// Total overtime across all employees.
    OvertimeCap,
    /// Assigned minutes against the even share.
    Workload,
}

impl ConstraintFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintFamily::Coverage => "coverage",
            ConstraintFamily::Skill => "skill",
            ConstraintFamily::ShiftDemand => "shift_demand",
            ConstraintFamily::Rest => "rest",
            ConstraintFamily::ConsecutiveNights => "consecutive_nights",
            ConstraintFamily::NightCap => "night_cap",
            ConstraintFamily::DailyLimit => "daily_limit",
            ConstraintFamily::Hours => "hours",
            ConstraintFamily::OvertimeCap => "overtime_cap",
            ConstraintFamily::Workload => "workload",
        }
    }

    /// Whether constraints of this family can make a problem infeasible.
    ///
    /// Soft families carry slack variables that absorb any shortfall.
    pub fn is_hard(&self) -> bool {
        !matches!(
            self,
            ConstraintFamily::Coverage
                | ConstraintFamily::Skill
                | ConstraintFamily::ShiftDemand
                | ConstraintFamily::Workload
        )
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub var: VarId,
    pub coef: i64,
}

/// `Σ coef·var  relation  rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub family: ConstraintFamily,
    pub terms: Vec<Term>,
    pub relation: Relation,
    pub rhs: i64,
}

impl Constraint {
    pub fn lhs(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|t| t.coef * values.get(t.var).copied().unwrap_or(0))
            .sum()
    }

    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        self.relation.holds(self.lhs(values), self.rhs)
    }
}

/// One weighted term of the objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveTerm {
    pub var: VarId,
    pub tier: PenaltyTier,
    /// Penalty minutes per unit of the variable.
    pub minutes_per_unit: u64,
    /// Objective cost per unit of the variable.
    pub coefficient: f64,
}

/// Values for every variable of a problem, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub values: Vec<i64>,
    pub objective: f64,
}

impl Solution {
    pub fn value(&self, var: VarId) -> i64 {
        self.values.get(var).copied().unwrap_or(0)
    }
}

/// Variables, constraints and objective of one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemDescription {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    pub objective: Vec<ObjectiveTerm>,
}

impl ProblemDescription {
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Assignment variables with their employee and shift, in id order.
    pub fn assignments(&self) -> impl Iterator<Item = (VarId, &EmployeeId, &ShiftId)> {
        self.variables.iter().filter_map(|v| match &v.kind {
            VariableKind::Assignment { employee, shift } => Some((v.id, employee, shift)),
            _ => None,
        })
    }

    pub fn assignment_var(&self, employee: &str, shift: &str) -> Option<VarId> {
        self.assignments()
            .find(|(_, e, s)| e.as_str() == employee && s.as_str() == shift)
            .map(|(id, _, _)| id)
    }

    pub fn assignment_count(&self) -> usize {
        self.variables.iter().filter(|v| v.is_assignment()).count()
    }

    /// Constraints of one family.
    pub fn family(&self, family: ConstraintFamily) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    pub fn objective_value(&self, values: &[i64]) -> f64 {
        self.objective
            .iter()
            .map(|t| t.coefficient * values.get(t.var).copied().unwrap_or(0) as f64)
            .sum()
    }

    /// Indices of constraints the values break.
    pub fn violations(&self, values: &[i64]) -> Vec<usize> {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_satisfied(values))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether the values respect every bound and constraint.
    pub fn is_feasible(&self, values: &[i64]) -> bool {
        values.len() == self.variables.len()
            && self
                .variables
                .iter()
                .zip(values)
                .all(|(v, &x)| v.lower <= x && x <= v.upper)
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// Serializes to JSON. Identical problems give identical strings.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub(crate) fn add_variable(
        &mut self,
        name: String,
        kind: VariableKind,
        lower: i64,
        upper: i64,
    ) -> VarId {
        let id = self.variables.len();
        self.variables.push(Variable {
            id,
            name,
            kind,
            lower,
            upper,
            slack_of: None,
        });
        id
    }

    pub(crate) fn add_constraint(&mut self, constraint: Constraint) -> usize {
        let index = self.constraints.len();
        for term in &constraint.terms {
            if let Some(var) = self.variables.get_mut(term.var) {
                if !var.is_assignment() && var.slack_of.is_none() {
                    var.slack_of = Some(index);
                }
            }
        }
        self.constraints.push(constraint);
        index
    }
}
