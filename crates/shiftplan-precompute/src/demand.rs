//! Demand aggregator.
//!
//! Windows take precedence: a segment covered by windows asks for the largest
//! window headcount, with skill counts combined per the configured
//! [`SkillAggregation`]. A segment with no window falls back to the own
//! demand of its covering shifts, taking the lowest shift id that declares
//! one.

use std::collections::HashMap;

use shiftplan_config::{PlannerConfig, SkillAggregation};
use shiftplan_core::{Result, SchedulingInput, Shift, ShiftplanError, SkillRequirements, Window};
use tracing::{info, warn};

use crate::segment::{DemandSource, Segment, SegmentIndex};

/// Fills in demand, skills and demand source of every segment.
///
/// # Errors
///
/// With `segments.strict_windows`, returns
/// [`ShiftplanError::UncoverableWindow`] for the first window segment that no
/// shift covers. Otherwise such segments are logged and left to the
/// shortfall penalty.
pub fn aggregate_demand(
    index: &mut SegmentIndex,
    input: &SchedulingInput,
    config: &PlannerConfig,
) -> Result<()> {
    let shifts: HashMap<&str, &Shift> = input.shifts.iter().map(|s| (s.id.as_str(), s)).collect();
    let windows: HashMap<&str, &Window> =
        input.windows.iter().map(|w| (w.id.as_str(), w)).collect();
    let aggregation = config.skills.aggregation;

    let mut uncoverable = 0usize;
    for segment in index.iter_mut() {
        if segment.covering_windows.is_empty() {
            from_shifts(segment, &shifts);
        } else {
            from_windows(segment, &windows, aggregation);
        }

        if segment.is_uncoverable() {
            uncoverable += 1;
            let window = segment
                .covering_windows
                .iter()
                .next()
                .cloned()
                .unwrap_or_default();
            if config.segments.strict_windows {
                return Err(ShiftplanError::UncoverableWindow {
                    window,
                    day: segment.interval.day.to_string(),
                    start: segment.interval.start_minute,
                    end: segment.interval.end_minute,
                });
            }
            warn!(
                event = "uncoverable_window",
                window = %window,
                segment = %segment.id,
                demand = segment.demand,
            );
        }
    }

    info!(
        event = "demand_aggregated",
        segments = index.len(),
        demand_minutes = index.demand_minutes(),
        uncoverable = uncoverable,
    );
    Ok(())
}

fn from_windows(segment: &mut Segment, windows: &HashMap<&str, &Window>, aggregation: SkillAggregation) {
    let mut demand = 0;
    let mut skills = SkillRequirements::new();
    for window in segment
        .covering_windows
        .iter()
        .filter_map(|id| windows.get(id.as_str()))
    {
        demand = demand.max(window.demand);
        match aggregation {
            SkillAggregation::Max => skills.merge_max(&window.skills),
            SkillAggregation::Sum => skills.merge_sum(&window.skills),
        }
    }
    segment.demand = demand;
    segment.skills = skills;
    segment.source = DemandSource::Windows;
}

fn from_shifts(segment: &mut Segment, shifts: &HashMap<&str, &Shift>) {
    // covering_shifts iterates in id order, so the first match is the lowest id
    let owner = segment
        .covering_shifts
        .iter()
        .filter_map(|id| shifts.get(id.as_str()))
        .find(|s| s.own_demand.is_some());

    match owner {
        Some(shift) => {
            segment.demand = shift.own_demand.unwrap_or(0);
            segment.skills = shift.own_skills.clone().unwrap_or_default();
            segment.source = DemandSource::Shift {
                shift_id: shift.id.clone(),
            };
        }
        None => {
            segment.demand = 0;
            segment.skills = SkillRequirements::new();
            segment.source = DemandSource::Unspecified;
        }
    }
}

#[cfg(test)]
#[path = "demand_tests.rs"]
mod tests;
