//! Penalty tiers of the lexicographic objective.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShiftplanError;

/// A soft-penalty family of the objective.
///
/// Every tier is measured in person-minutes; the weight table decides how
/// tiers trade off against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyTier {
    /// Segment shortfall where demand comes from coverage windows.
    UnmetWindow,
    /// Segment shortfall where demand falls back to a shift's own demand.
    UnmetDemand,
    /// Per-skill shortfall within a segment.
    UnmetSkill,
    /// Shift-level shortfall against a shift's own demand.
    UnmetShift,
    /// Staff beyond segment demand.
    Overstaff,
    /// Minutes beyond contractual weekly hours.
    Overtime,
    /// Deviation from an even workload share.
    Fairness,
    /// Assignments an employee asked to avoid.
    Preferences,
}

impl PenaltyTier {
    /// All tiers in default priority order.
    pub const ALL: [PenaltyTier; 8] = [
        PenaltyTier::UnmetWindow,
        PenaltyTier::UnmetDemand,
        PenaltyTier::UnmetSkill,
        PenaltyTier::UnmetShift,
        PenaltyTier::Overstaff,
        PenaltyTier::Overtime,
        PenaltyTier::Fairness,
        PenaltyTier::Preferences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PenaltyTier::UnmetWindow => "unmet_window",
            PenaltyTier::UnmetDemand => "unmet_demand",
            PenaltyTier::UnmetSkill => "unmet_skill",
            PenaltyTier::UnmetShift => "unmet_shift",
            PenaltyTier::Overstaff => "overstaff",
            PenaltyTier::Overtime => "overtime",
            PenaltyTier::Fairness => "fairness",
            PenaltyTier::Preferences => "preferences",
        }
    }
}

impl fmt::Display for PenaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PenaltyTier {
    type Err = ShiftplanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        PenaltyTier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == key)
            .ok_or_else(|| ShiftplanError::Config(format!("unknown penalty tier '{s}'")))
    }
}
