use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{EmployeeId, RoleId, SkillId};

/// Contract type of an employee.
///
/// Carried through for reporting. Every kind gets the same rules and
/// defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeKind {
    #[default]
    Standard,
    Intern,
    External,
}

/// An employee who can be assigned to shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub kind: EmployeeKind,
    pub roles: BTreeSet<RoleId>,
    #[serde(default)]
    pub skills: BTreeSet<SkillId>,
    /// Minimum rest between two shifts; `None` uses the global default.
    #[serde(default)]
    pub min_rest_hours: Option<f64>,
    /// Contractual weekly hours; `None` uses the configured default.
    #[serde(default)]
    pub max_week_hours: Option<f64>,
    /// Overtime ceiling per week; `None` uses the configured default.
    #[serde(default)]
    pub max_overtime_hours: Option<f64>,
}

impl Employee {
    pub fn new(id: impl Into<EmployeeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: EmployeeKind::Standard,
            roles: BTreeSet::new(),
            skills: BTreeSet::new(),
            min_rest_hours: None,
            max_week_hours: None,
            max_overtime_hours: None,
        }
    }

    pub fn with_kind(mut self, kind: EmployeeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<RoleId>>) -> Self {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = impl Into<SkillId>>) -> Self {
        self.skills.extend(skills.into_iter().map(Into::into));
        self
    }

    pub fn with_min_rest_hours(mut self, hours: f64) -> Self {
        self.min_rest_hours = Some(hours);
        self
    }

    pub fn with_max_week_hours(mut self, hours: f64) -> Self {
        self.max_week_hours = Some(hours);
        self
    }

    pub fn with_max_overtime_hours(mut self, hours: f64) -> Self {
        self.max_overtime_hours = Some(hours);
        self
    }

    #[inline]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    #[inline]
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }
}
