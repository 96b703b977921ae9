//! Temporal indexer.
//!
//! Shift and window intervals are grouped by `(role, day)`. Within a group
//! every interval bound becomes a cut point; consecutive cut points delimit
//! candidate segments, and a candidate is kept only when some shift or window
//! of the group is active over it. Adjacent candidates with the same covering
//! shifts and windows are merged, so the result is the smallest set of
//! pairwise disjoint segments whose union equals the union of the group's
//! intervals.
//!
//! Demand fields start out empty; [`aggregate_demand`](crate::aggregate_demand)
//! fills them in.

mod indexer;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use shiftplan_core::{RoleId, ShiftId, SkillRequirements, TimeInterval, WindowId, MINUTES_PER_DAY};

pub use indexer::index_segments;

/// Where a segment's demand comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandSource {
    /// One or more coverage windows cover the segment.
    Windows,
    /// No window applies; the covering shift's own demand is used.
    Shift { shift_id: ShiftId },
    /// No window applies and no covering shift declares a demand.
    #[default]
    Unspecified,
}

/// An atomic time slice of one role on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Stable identifier, `role/day/start-end` in group-day minutes.
    pub id: String,
    pub role: RoleId,
    pub interval: TimeInterval,
    /// Required headcount.
    pub demand: u32,
    pub skills: SkillRequirements,
    pub source: DemandSource,
    pub covering_shifts: BTreeSet<ShiftId>,
    pub covering_windows: BTreeSet<WindowId>,
}

impl Segment {
    /// Creates a segment of the `(role, day)` group over `[start, end)` in
    /// that day's minutes. Slices starting past midnight are re-anchored on
    /// the day they start.
    pub(crate) fn new(
        role: &str,
        day: NaiveDate,
        (start, end): (u32, u32),
        covering_shifts: BTreeSet<ShiftId>,
        covering_windows: BTreeSet<WindowId>,
    ) -> Self {
        let offset = start / MINUTES_PER_DAY;
        let interval = TimeInterval {
            day: day + Duration::days(i64::from(offset)),
            start_minute: start - offset * MINUTES_PER_DAY,
            end_minute: end - offset * MINUTES_PER_DAY,
        };
        Self {
            id: format!("{role}/{day}/{start:04}-{end:04}"),
            role: role.to_string(),
            interval,
            demand: 0,
            skills: SkillRequirements::new(),
            source: DemandSource::Unspecified,
            covering_shifts,
            covering_windows,
        }
    }

    #[inline]
    pub fn minutes(&self) -> u32 {
        self.interval.duration_minutes()
    }

    /// Demand in person-minutes.
    pub fn demand_minutes(&self) -> u64 {
        u64::from(self.demand) * u64::from(self.minutes())
    }

    /// Whether a window covers the segment but no shift could staff it.
    pub fn is_uncoverable(&self) -> bool {
        !self.covering_windows.is_empty() && self.covering_shifts.is_empty()
    }
}

/// All segments of one `(role, day)` group, ordered by start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentGroup {
    pub role: RoleId,
    pub day: NaiveDate,
    pub segments: Vec<Segment>,
}

/// Segments of every group, ordered by role then day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentIndex {
    pub groups: Vec<SegmentGroup>,
}

impl SegmentIndex {
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.groups.iter().flat_map(|g| g.segments.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Segment> {
        self.groups.iter_mut().flat_map(|g| g.segments.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.segments.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.segments.is_empty())
    }

    /// Segments of one group, empty when the group does not exist.
    pub fn group(&self, role: &str, day: NaiveDate) -> &[Segment] {
        self.groups
            .binary_search_by(|g| (g.role.as_str(), g.day).cmp(&(role, day)))
            .map(|i| self.groups[i].segments.as_slice())
            .unwrap_or(&[])
    }

    /// Total demand in person-minutes across all segments.
    pub fn demand_minutes(&self) -> u64 {
        self.iter().map(Segment::demand_minutes).sum()
    }
}
