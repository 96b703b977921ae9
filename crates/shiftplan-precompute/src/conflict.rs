//! Conflict analyzer.
//!
//! Produces the shift pairs that no single employee may both work: pairs
//! whose gap is shorter than the rest rule of some employee eligible for
//! both, and pairs of night shifts on nearby calendar days. Night shifts are
//! also grouped by ISO week for the weekly night cap.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shiftplan_config::{hours_to_minutes, PlannerConfig};
use shiftplan_core::{
    iso_week, EmployeeId, Result, SchedulingInput, Shift, ShiftId, TimeInterval, MINUTES_PER_DAY,
};
use tracing::info;

use crate::eligibility::Eligibility;

/// An ordered shift pair; `first` starts no later than `second`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictPair {
    pub first: ShiftId,
    pub second: ShiftId,
    /// `second.start - first.end`; negative when the shifts overlap.
    pub gap_minutes: i64,
    /// Both are night shifts starting within the night spacing.
    pub consecutive_nights: bool,
}

/// Night shifts starting in one ISO week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightWeek {
    pub iso_year: i32,
    pub iso_week: u32,
    pub shifts: BTreeSet<ShiftId>,
}

/// Output of [`analyze_conflicts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSet {
    pub pairs: Vec<ConflictPair>,
    pub night_shifts: BTreeSet<ShiftId>,
    pub night_weeks: Vec<NightWeek>,
    pub max_nights_per_week: u32,
    /// Effective minimum rest per employee.
    pub rest_minutes: BTreeMap<EmployeeId, u32>,
}

impl ConflictSet {
    /// Effective minimum rest of an employee; zero for unknown ids.
    pub fn rest_of(&self, employee: &str) -> u32 {
        self.rest_minutes.get(employee).copied().unwrap_or(0)
    }

    /// Whether `pair` forbids `employee` from working both shifts.
    pub fn applies_to(&self, pair: &ConflictPair, employee: &str) -> bool {
        pair.consecutive_nights || pair.gap_minutes < i64::from(self.rest_of(employee))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Whether a shift counts as a night shift.
///
/// A shift is a night shift when it reaches midnight or starts inside the
/// night window `(start, end)`, which wraps past midnight when `start > end`.
/// Ending exactly at 24:00 counts as reaching midnight.
pub fn is_night(interval: &TimeInterval, (start, end): (u32, u32)) -> bool {
    if interval.end_minute >= MINUTES_PER_DAY {
        return true;
    }
    let minute = interval.start_minute;
    if start > end {
        minute >= start || minute < end
    } else {
        minute >= start && minute < end.min(MINUTES_PER_DAY)
    }
}

/// Derives rest and night conflicts over all shifts.
///
/// Shifts are visited in `(start, id)` order and each pair is emitted at
/// most once, first-starting shift first. A pair is only emitted when at
/// least one employee is eligible for both shifts.
///
/// # Errors
///
/// Returns [`ShiftplanError::Config`](shiftplan_core::ShiftplanError::Config)
/// for a malformed night window.
pub fn analyze_conflicts(
    input: &SchedulingInput,
    eligibility: &Eligibility,
    config: &PlannerConfig,
) -> Result<ConflictSet> {
    let window = config.nights.window()?;
    let global_rest = config.rest.min_minutes();
    let spacing = i64::from(config.nights.spacing_days);

    let rest_minutes: BTreeMap<EmployeeId, u32> = input
        .employees
        .iter()
        .map(|e| {
            let rest = e.min_rest_hours.map(hours_to_minutes).unwrap_or(global_rest);
            (e.id.clone(), rest)
        })
        .collect();
    let max_rest = i64::from(rest_minutes.values().copied().max().unwrap_or(global_rest));

    let mut order: Vec<&Shift> = input.shifts.iter().collect();
    order.sort_by(|a, b| {
        (a.interval.abs_start(), &a.id).cmp(&(b.interval.abs_start(), &b.id))
    });
    let night: Vec<bool> = order.iter().map(|s| is_night(&s.interval, window)).collect();

    let mut pairs = Vec::new();
    for (i, a) in order.iter().enumerate() {
        for (j, b) in order.iter().enumerate().skip(i + 1) {
            let gap = b.interval.abs_start() - a.interval.abs_end();
            let day_diff = (b.interval.day - a.interval.day).num_days();
            if gap >= max_rest && day_diff > spacing {
                break;
            }

            let Some(shared_rest) = eligibility
                .employees_for(&a.id)
                .filter(|e| eligibility.is_eligible(e, &b.id))
                .map(|e| rest_minutes.get(e).copied().unwrap_or(global_rest))
                .max()
            else {
                continue;
            };

            let consecutive_nights = night[i] && night[j] && (1..=spacing).contains(&day_diff);
            if gap < i64::from(shared_rest) || consecutive_nights {
                pairs.push(ConflictPair {
                    first: a.id.clone(),
                    second: b.id.clone(),
                    gap_minutes: gap,
                    consecutive_nights,
                });
            }
        }
    }

    let mut night_shifts = BTreeSet::new();
    let mut weeks: BTreeMap<(i32, u32), BTreeSet<ShiftId>> = BTreeMap::new();
    for (shift, &flag) in order.iter().zip(&night) {
        if !flag {
            continue;
        }
        night_shifts.insert(shift.id.clone());
        weeks
            .entry(iso_week(shift.interval.day))
            .or_default()
            .insert(shift.id.clone());
    }
    let night_weeks: Vec<NightWeek> = weeks
        .into_iter()
        .map(|((iso_year, iso_week), shifts)| NightWeek {
            iso_year,
            iso_week,
            shifts,
        })
        .collect();

    info!(
        event = "conflicts_analyzed",
        pairs = pairs.len(),
        night_shifts = night_shifts.len(),
        night_weeks = night_weeks.len(),
        max_rest_minutes = max_rest,
    );

    Ok(ConflictSet {
        pairs,
        night_shifts,
        night_weeks,
        max_nights_per_week: config.nights.max_per_week,
        rest_minutes,
    })
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
