//! Objective weight normalizer.
//!
//! Per-hour tier weights become per-minute weights. Every tier is measured
//! in person-minutes, so [`PenaltyBounds`] can bound the worst total penalty
//! of each tier and the normalizer can check, or enforce, that one minute of
//! a higher tier outweighs everything a lower tier can accumulate.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shiftplan_config::{hours_to_minutes, PlannerConfig, WeightMode};
use shiftplan_core::{iso_week, EmployeeId, PenaltyTier, Result, SchedulingInput, ShiftplanError};
use tracing::{debug, info, warn};

use crate::eligibility::Eligibility;
use crate::segment::{DemandSource, SegmentIndex};

/// Worst-case penalty minutes per tier for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyBounds {
    minutes: BTreeMap<PenaltyTier, u64>,
}

impl PenaltyBounds {
    /// Bounds every tier from the aggregated segments and the eligible pairs.
    pub fn compute(
        index: &SegmentIndex,
        input: &SchedulingInput,
        eligibility: &Eligibility,
        config: &PlannerConfig,
    ) -> Self {
        let mut bounds = Self::default();

        for segment in index.iter() {
            let minutes = u64::from(segment.minutes());
            match segment.source {
                DemandSource::Windows => {
                    bounds.add(PenaltyTier::UnmetWindow, segment.demand_minutes())
                }
                DemandSource::Shift { .. } => {
                    bounds.add(PenaltyTier::UnmetDemand, segment.demand_minutes())
                }
                DemandSource::Unspecified => {}
            }
            bounds.add(
                PenaltyTier::UnmetSkill,
                u64::from(segment.skills.total()) * minutes,
            );

            let staff = segment
                .covering_shifts
                .iter()
                .flat_map(|s| eligibility.employees_for(s))
                .collect::<BTreeSet<_>>()
                .len() as u64;
            bounds.add(
                PenaltyTier::Overstaff,
                staff.saturating_sub(u64::from(segment.demand)) * minutes,
            );
        }

        for shift in &input.shifts {
            if let Some(demand) = shift.own_demand {
                bounds.add(
                    PenaltyTier::UnmetShift,
                    u64::from(demand) * u64::from(shift.duration_minutes()),
                );
            }
        }

        // overtime is bounded in cost-weighted minutes
        let factors = overtime_factors(input, config);
        let costliest = factors.values().copied().fold(0.0, f64::max);
        let mut overtime = 0u64;
        for employee in &input.employees {
            let hours = employee
                .max_overtime_hours
                .unwrap_or(config.hours.max_overtime);
            let weeks = eligibility
                .shifts_of(&employee.id)
                .filter_map(|id| input.shift(id))
                .map(|s| iso_week(s.interval.day))
                .collect::<BTreeSet<_>>()
                .len() as u64;
            let factor = factors.get(&employee.id).copied().unwrap_or(1.0);
            let minutes = u64::from(hours_to_minutes(hours)) * weeks;
            overtime += (minutes as f64 * factor).ceil() as u64;
        }
        if let Some(cap) = config.hours.global_overtime_cap {
            let cap = f64::from(hours_to_minutes(cap)) * costliest;
            overtime = overtime.min(cap.ceil() as u64);
        }
        bounds.add(PenaltyTier::Overtime, overtime);

        let target = fairness_target(index, eligibility);
        for employee in eligibility.active_employees() {
            let possible = possible_minutes(employee, input, eligibility);
            bounds.add(
                PenaltyTier::Fairness,
                target.max(possible.saturating_sub(target)),
            );
        }

        for pref in input.preferences.iter().filter(|p| p.score < 0) {
            if !eligibility.is_eligible(&pref.employee_id, &pref.shift_id) {
                continue;
            }
            if let Some(shift) = input.shift(&pref.shift_id) {
                bounds.add(
                    PenaltyTier::Preferences,
                    u64::from(pref.score.unsigned_abs()) * u64::from(shift.duration_minutes()),
                );
            }
        }

        bounds
    }

    fn add(&mut self, tier: PenaltyTier, minutes: u64) {
        *self.minutes.entry(tier).or_insert(0) += minutes;
    }

    /// Worst-case penalty minutes of a tier.
    pub fn get(&self, tier: PenaltyTier) -> u64 {
        self.minutes.get(&tier).copied().unwrap_or(0)
    }

    /// Overrides the bound of one tier.
    pub fn with(mut self, tier: PenaltyTier, minutes: u64) -> Self {
        self.minutes.insert(tier, minutes);
        self
    }
}

/// Overtime price of each employee relative to the cheapest.
///
/// Each employee's multiplier comes from the cheapest of their roles listed
/// in `hours.overtime_costs`. Multipliers are divided by the smallest positive
/// one, so a priced overtime minute never weighs less than the tier weight.
pub fn overtime_factors(
    input: &SchedulingInput,
    config: &PlannerConfig,
) -> BTreeMap<EmployeeId, f64> {
    let costs: Vec<(&EmployeeId, f64)> = input
        .employees
        .iter()
        .map(|e| (&e.id, config.hours.overtime_cost(&e.roles)))
        .collect();
    let cheapest = costs
        .iter()
        .map(|(_, cost)| *cost)
        .filter(|cost| *cost > 0.0)
        .reduce(f64::min)
        .unwrap_or(1.0);
    costs
        .into_iter()
        .map(|(id, cost)| (id.clone(), cost / cheapest))
        .collect()
}

/// Even share of demanded minutes per active employee, rounded.
pub fn fairness_target(index: &SegmentIndex, eligibility: &Eligibility) -> u64 {
    let active = eligibility.active_employees().count() as u64;
    if active == 0 {
        return 0;
    }
    (index.demand_minutes() + active / 2) / active
}

fn possible_minutes(employee: &str, input: &SchedulingInput, eligibility: &Eligibility) -> u64 {
    eligibility
        .shifts_of(employee)
        .filter_map(|id| input.shift(id))
        .map(|s| u64::from(s.duration_minutes()))
        .sum()
}

/// One enabled tier of the objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub tier: PenaltyTier,
    pub per_hour: f64,
    /// Effective weight of one penalty minute.
    pub per_minute: f64,
    pub bound_minutes: u64,
}

/// A pair of adjacent tiers whose separation does not hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominanceViolation {
    pub higher: PenaltyTier,
    pub lower: PenaltyTier,
    pub detail: String,
}

impl From<&DominanceViolation> for ShiftplanError {
    fn from(v: &DominanceViolation) -> Self {
        ShiftplanError::WeightDominanceViolation {
            higher: v.higher.to_string(),
            lower: v.lower.to_string(),
            detail: v.detail.clone(),
        }
    }
}

/// Enabled tiers in priority order with their per-minute weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    pub mode: WeightMode,
    pub entries: Vec<WeightEntry>,
    pub violations: Vec<DominanceViolation>,
}

impl WeightTable {
    pub fn entry(&self, tier: PenaltyTier) -> Option<&WeightEntry> {
        self.entries.iter().find(|e| e.tier == tier)
    }

    /// Per-minute weight of a tier, `None` when the tier is disabled.
    pub fn weight(&self, tier: PenaltyTier) -> Option<f64> {
        self.entry(tier).map(|e| e.per_minute)
    }

    pub fn is_enabled(&self, tier: PenaltyTier) -> bool {
        self.entry(tier).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightEntry> {
        self.entries.iter()
    }
}

/// Builds the weight table.
///
/// Tiers with a zero per-hour weight are dropped. In
/// [`WeightMode::Lexicographic`] each weight is lifted above the worst case
/// of all lower tiers; [`WeightMode::Checked`] keeps the weights and verifies
/// separation; [`WeightMode::Blended`] keeps them unchecked.
///
/// # Errors
///
/// With `objective.strict`, returns
/// [`ShiftplanError::WeightDominanceViolation`] for the first violation.
/// Otherwise violations are logged and kept in the table.
pub fn normalize_weights(config: &PlannerConfig, bounds: &PenaltyBounds) -> Result<WeightTable> {
    let objective = &config.objective;
    let mut entries: Vec<WeightEntry> = Vec::new();
    for tier in objective.resolved_priority() {
        let per_hour = config.penalties.per_hour(tier);
        if per_hour <= 0.0 {
            debug!(event = "tier_disabled", tier = %tier);
            continue;
        }
        entries.push(WeightEntry {
            tier,
            per_hour,
            per_minute: per_hour / 60.0,
            bound_minutes: bounds.get(tier),
        });
    }

    let violations = match objective.mode {
        WeightMode::Lexicographic => {
            lift(&mut entries);
            check_ratio(&entries, objective.max_weight_ratio)
        }
        WeightMode::Checked => check_separation(&entries, objective.tolerance),
        WeightMode::Blended => Vec::new(),
    };

    if let Some(first) = violations.first() {
        if objective.strict {
            return Err(first.into());
        }
        for v in &violations {
            warn!(
                event = "weight_dominance_violation",
                higher = %v.higher,
                lower = %v.lower,
                detail = %v.detail,
            );
        }
    }

    info!(
        event = "weights_normalized",
        mode = ?objective.mode,
        tiers = entries.len(),
        violations = violations.len(),
    );

    Ok(WeightTable {
        mode: objective.mode,
        entries,
        violations,
    })
}

/// Lifts weights bottom-up so each exceeds the worst case of all lower tiers
/// and the weight of the next tier.
fn lift(entries: &mut [WeightEntry]) {
    let mut lower_total = 0.0;
    let mut next = 0.0_f64;
    for entry in entries.iter_mut().rev() {
        let base = entry.per_minute;
        entry.per_minute = base + next.max(lower_total);
        lower_total += entry.per_minute * entry.bound_minutes as f64;
        next = entry.per_minute;
        debug!(
            event = "weight_lifted",
            tier = %entry.tier,
            base = base,
            lifted = entry.per_minute,
        );
    }
}

fn check_ratio(entries: &[WeightEntry], max_ratio: f64) -> Vec<DominanceViolation> {
    let (Some(highest), Some(lowest)) = (entries.first(), entries.last()) else {
        return Vec::new();
    };
    let ratio = highest.per_minute / lowest.per_minute;
    if ratio > max_ratio {
        vec![DominanceViolation {
            higher: highest.tier,
            lower: lowest.tier,
            detail: format!(
                "weight ratio {ratio:.3e} exceeds max_weight_ratio {max_ratio:.3e}"
            ),
        }]
    } else {
        Vec::new()
    }
}

fn check_separation(entries: &[WeightEntry], tolerance: f64) -> Vec<DominanceViolation> {
    entries
        .windows(2)
        .filter_map(|pair| {
            let (higher, lower) = (&pair[0], &pair[1]);
            let worst = lower.per_minute * lower.bound_minutes.max(1) as f64;
            if worst < higher.per_minute * (1.0 + tolerance) {
                None
            } else {
                Some(DominanceViolation {
                    higher: higher.tier,
                    lower: lower.tier,
                    detail: format!(
                        "worst-case {} penalty {worst:.4} is not below one minute of {} ({:.4})",
                        lower.tier, higher.tier, higher.per_minute
                    ),
                })
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "weights_tests.rs"]
mod tests;
