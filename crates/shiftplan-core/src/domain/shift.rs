use serde::{Deserialize, Serialize};

use super::{RoleId, ShiftId, SkillRequirements, WindowId};
use crate::error::Result;
use crate::time::TimeInterval;

/// An indivisible assignable block of time tied to a role.
///
/// Assigning an employee always covers the whole interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub interval: TimeInterval,
    pub role: RoleId,
    /// Headcount the shift asks for when no window covers its time.
    #[serde(default)]
    pub own_demand: Option<u32>,
    /// Skill mix the shift asks for when no window covers its time.
    #[serde(default)]
    pub own_skills: Option<SkillRequirements>,
}

impl Shift {
    pub fn new(id: impl Into<ShiftId>, interval: TimeInterval, role: impl Into<RoleId>) -> Self {
        Self {
            id: id.into(),
            interval,
            role: role.into(),
            own_demand: None,
            own_skills: None,
        }
    }

    /// Builds a shift from `YYYY-MM-DD` and `HH:MM` strings.
    pub fn parse(
        id: impl Into<ShiftId>,
        day: &str,
        start: &str,
        end: &str,
        role: impl Into<RoleId>,
    ) -> Result<Self> {
        let id = id.into();
        let interval = TimeInterval::parse(&format!("shift {id}"), day, start, end)?;
        Ok(Self::new(id, interval, role))
    }

    pub fn with_demand(mut self, demand: u32) -> Self {
        self.own_demand = Some(demand);
        self
    }

    pub fn with_skills(mut self, skills: SkillRequirements) -> Self {
        self.own_skills = Some(skills);
        self
    }

    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.interval.duration_minutes()
    }
}

/// A coverage requirement independent of shift boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    pub interval: TimeInterval,
    pub role: RoleId,
    pub demand: u32,
    #[serde(default)]
    pub skills: SkillRequirements,
}

impl Window {
    pub fn new(
        id: impl Into<WindowId>,
        interval: TimeInterval,
        role: impl Into<RoleId>,
        demand: u32,
    ) -> Self {
        Self {
            id: id.into(),
            interval,
            role: role.into(),
            demand,
            skills: SkillRequirements::new(),
        }
    }

    /// Builds a window from `YYYY-MM-DD` and `HH:MM` strings.
    pub fn parse(
        id: impl Into<WindowId>,
        day: &str,
        start: &str,
        end: &str,
        role: impl Into<RoleId>,
        demand: u32,
    ) -> Result<Self> {
        let id = id.into();
        let interval = TimeInterval::parse(&format!("window {id}"), day, start, end)?;
        Ok(Self::new(id, interval, role, demand))
    }

    pub fn with_skills(mut self, skills: SkillRequirements) -> Self {
        self.skills = skills;
        self
    }
}
