use std::collections::btree_map;
use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SkillId;
use crate::error::ShiftplanError;

/// Required headcount per skill.
///
/// Parsed once at the input boundary; the formulation pipeline only ever
/// sees this typed map. Zero counts are dropped on insertion.
///
/// # Example
///
/// ```
/// use shiftplan_core::SkillRequirements;
///
/// let short: SkillRequirements = "forklift=1, first_aid=2".parse().unwrap();
/// let json: SkillRequirements = r#"{"forklift": 1, "first_aid": 2}"#.parse().unwrap();
/// assert_eq!(short, json);
/// assert_eq!(short.get("first_aid"), 2);
/// assert!("forklift=-1".parse::<SkillRequirements>().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillRequirements(BTreeMap<SkillId, u32>);

impl SkillRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates requirements from `(skill, count)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<SkillId>,
    {
        let mut reqs = Self::new();
        for (skill, count) in pairs {
            reqs.insert(skill, count);
        }
        reqs
    }

    /// Sets the count for a skill; zero removes it.
    pub fn insert(&mut self, skill: impl Into<SkillId>, count: u32) {
        let skill = skill.into();
        if count == 0 {
            self.0.remove(&skill);
        } else {
            self.0.insert(skill, count);
        }
    }

    /// Returns the count for a skill (0 when absent).
    pub fn get(&self, skill: &str) -> u32 {
        self.0.get(skill).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, SkillId, u32> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Sum of all per-skill counts.
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    /// Folds `other` in, keeping the larger count per skill.
    pub fn merge_max(&mut self, other: &Self) {
        for (skill, &count) in other.iter() {
            let entry = self.0.entry(skill.clone()).or_insert(0);
            *entry = (*entry).max(count);
        }
    }

    /// Folds `other` in, adding counts per skill.
    pub fn merge_sum(&mut self, other: &Self) {
        for (skill, &count) in other.iter() {
            *self.0.entry(skill.clone()).or_insert(0) += count;
        }
    }
}

impl<'a> IntoIterator for &'a SkillRequirements {
    type Item = (&'a SkillId, &'a u32);
    type IntoIter = btree_map::Iter<'a, SkillId, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for SkillRequirements {
    type Err = ShiftplanError;

    /// Accepts `skill=count` lists separated by `,`, `;` or `|`, or a JSON
    /// object of skill to count. An empty string means no requirement.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Ok(Self::new());
        }

        if text.starts_with('{') {
            let raw: BTreeMap<String, i64> = serde_json::from_str(text).map_err(|e| {
                ShiftplanError::InvalidInput(format!("skill requirements '{text}': {e}"))
            })?;
            let mut reqs = Self::new();
            for (skill, count) in raw {
                reqs.insert(skill.trim(), checked_count(&skill, count)?);
            }
            return Ok(reqs);
        }

        let mut reqs = Self::new();
        for item in text.split([',', ';', '|']) {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (skill, count) = item.split_once(['=', ':']).ok_or_else(|| {
                ShiftplanError::InvalidInput(format!("skill requirement '{item}' is not skill=count"))
            })?;
            let skill = skill.trim();
            if skill.is_empty() {
                return Err(ShiftplanError::InvalidInput(format!(
                    "skill requirement '{item}' has an empty skill name"
                )));
            }
            let count: i64 = count.trim().parse().map_err(|_| {
                ShiftplanError::InvalidInput(format!("skill requirement '{item}' has a non-integer count"))
            })?;
            reqs.insert(skill, checked_count(skill, count)?);
        }
        Ok(reqs)
    }
}

fn checked_count(skill: &str, count: i64) -> Result<u32, ShiftplanError> {
    u32::try_from(count).map_err(|_| {
        ShiftplanError::InvalidInput(format!("skill '{skill}' has invalid count {count}"))
    })
}
