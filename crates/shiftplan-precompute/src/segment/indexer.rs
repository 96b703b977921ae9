use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use shiftplan_config::{MidnightPolicy, PlannerConfig};
use shiftplan_core::time::day_origin;
use shiftplan_core::{Result, SchedulingInput, ShiftplanError, TimeInterval};
use tracing::{debug, error, info, warn};

use super::{Segment, SegmentGroup, SegmentIndex};

#[derive(Debug, Clone, Copy)]
enum Cover<'a> {
    Shift(&'a str),
    Window(&'a str),
}

/// One interval placed into a `(role, day)` group, in that day's minutes.
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    start: u32,
    end: u32,
    cover: Cover<'a>,
}

type Groups<'a> = BTreeMap<(&'a str, NaiveDate), Vec<Piece<'a>>>;

/// A shift or window interval before it is placed into a group.
#[derive(Debug, Clone, Copy)]
struct Entry<'a> {
    role: &'a str,
    interval: &'a TimeInterval,
    cover: Cover<'a>,
}

/// Builds the segment index of all shifts and windows.
///
/// # Errors
///
/// Returns [`ShiftplanError::SegmentExplosion`] when a group exceeds
/// `segments.hard_threshold`.
pub fn index_segments(input: &SchedulingInput, config: &PlannerConfig) -> Result<SegmentIndex> {
    let entries: Vec<Entry<'_>> = input
        .shifts
        .iter()
        .map(|shift| Entry {
            role: &shift.role,
            interval: &shift.interval,
            cover: Cover::Shift(&shift.id),
        })
        .chain(input.windows.iter().map(|window| Entry {
            role: &window.role,
            interval: &window.interval,
            cover: Cover::Window(&window.id),
        }))
        .collect();

    let mut groups: Groups<'_> = BTreeMap::new();
    match config.segments.midnight_policy {
        MidnightPolicy::Split => place_split(&mut groups, &entries),
        MidnightPolicy::Extend => place_extended(&mut groups, &entries),
    }

    let warn_threshold = config.segments.warn_threshold;
    let hard_threshold = config.segments.hard_threshold;
    let mut index = SegmentIndex::default();

    for ((role, day), pieces) in groups {
        let segments = sweep(role, day, &pieces);
        let count = segments.len();

        if count > hard_threshold {
            error!(
                event = "segment_explosion",
                role = role,
                day = %day,
                segments = count,
                limit = hard_threshold,
            );
            return Err(ShiftplanError::SegmentExplosion {
                role: role.to_string(),
                day: day.to_string(),
                count,
                limit: hard_threshold,
            });
        }
        if count > warn_threshold {
            warn!(
                event = "segment_threshold",
                role = role,
                day = %day,
                segments = count,
                threshold = warn_threshold,
            );
        }
        debug!(
            event = "segment_group",
            role = role,
            day = %day,
            intervals = pieces.len(),
            segments = count,
        );

        index.groups.push(SegmentGroup {
            role: role.to_string(),
            day,
            segments,
        });
    }

    info!(
        event = "segments_indexed",
        groups = index.groups.len(),
        segments = index.len(),
    );
    Ok(index)
}

fn push<'a>(
    groups: &mut Groups<'a>,
    role: &'a str,
    day: NaiveDate,
    (start, end): (u32, u32),
    cover: Cover<'a>,
) {
    groups
        .entry((role, day))
        .or_default()
        .push(Piece { start, end, cover });
}

/// Puts the part of each overnight interval after midnight into the next
/// day's group.
fn place_split<'a>(groups: &mut Groups<'a>, entries: &[Entry<'a>]) {
    for entry in entries {
        let (head, tail) = entry.interval.split_at_midnight();
        for iv in std::iter::once(head).chain(tail) {
            push(groups, entry.role, iv.day, (iv.start_minute, iv.end_minute), entry.cover);
        }
    }
}

/// Keeps every interval whole.
///
/// Intervals of one role chained together by overlap all go to the group of
/// the earliest one, so an overnight shift and the next-day windows it
/// overlaps are swept together. Chains never share time, so segments of
/// different groups stay disjoint.
fn place_extended<'a>(groups: &mut Groups<'a>, entries: &[Entry<'a>]) {
    let mut ordered: Vec<&Entry<'a>> = entries.iter().collect();
    ordered.sort_by_key(|e| (e.role, e.interval.abs_start(), e.interval.abs_end()));

    // (role, anchor day, absolute end of the chain so far)
    let mut chain: Option<(&str, NaiveDate, i64)> = None;
    for entry in ordered {
        let iv = entry.interval;
        let (anchor, chain_end) = match chain {
            Some((role, anchor, end)) if role == entry.role && iv.abs_start() < end => {
                (anchor, end.max(iv.abs_end()))
            }
            _ => (iv.day, iv.abs_end()),
        };
        chain = Some((entry.role, anchor, chain_end));

        // anchor is never after iv.day, so both offsets are non-negative
        let origin = day_origin(anchor);
        let start = (iv.abs_start() - origin) as u32;
        let end = (iv.abs_end() - origin) as u32;
        push(groups, entry.role, anchor, (start, end), entry.cover);
    }
}

struct Candidate<'a> {
    start: u32,
    end: u32,
    shifts: BTreeSet<&'a str>,
    windows: BTreeSet<&'a str>,
}

/// Sweeps the cut points of one group, tracking which intervals are active.
fn sweep<'a>(role: &str, day: NaiveDate, pieces: &[Piece<'a>]) -> Vec<Segment> {
    // cut point -> (intervals ending there, intervals starting there)
    let mut events: BTreeMap<u32, (Vec<Cover<'a>>, Vec<Cover<'a>>)> = BTreeMap::new();
    for piece in pieces {
        events.entry(piece.start).or_default().1.push(piece.cover);
        events.entry(piece.end).or_default().0.push(piece.cover);
    }
    let cuts: Vec<u32> = events.keys().copied().collect();

    let mut active_shifts: BTreeMap<&'a str, u32> = BTreeMap::new();
    let mut active_windows: BTreeMap<&'a str, u32> = BTreeMap::new();
    let mut candidates: Vec<Candidate<'a>> = Vec::new();

    for (i, (ending, starting)) in events.values().enumerate() {
        for &cover in ending {
            match cover {
                Cover::Shift(id) => release(&mut active_shifts, id),
                Cover::Window(id) => release(&mut active_windows, id),
            }
        }
        for &cover in starting {
            match cover {
                Cover::Shift(id) => *active_shifts.entry(id).or_insert(0) += 1,
                Cover::Window(id) => *active_windows.entry(id).or_insert(0) += 1,
            }
        }

        let Some(&end) = cuts.get(i + 1) else {
            break;
        };
        if active_shifts.is_empty() && active_windows.is_empty() {
            continue;
        }

        let start = cuts[i];
        let shifts: BTreeSet<&str> = active_shifts.keys().copied().collect();
        let windows: BTreeSet<&str> = active_windows.keys().copied().collect();

        if let Some(last) = candidates.last_mut() {
            if last.end == start && last.shifts == shifts && last.windows == windows {
                last.end = end;
                continue;
            }
        }
        candidates.push(Candidate {
            start,
            end,
            shifts,
            windows,
        });
    }

    candidates
        .into_iter()
        .map(|c| {
            Segment::new(
                role,
                day,
                (c.start, c.end),
                c.shifts.into_iter().map(str::to_string).collect(),
                c.windows.into_iter().map(str::to_string).collect(),
            )
        })
        .collect()
}

fn release(active: &mut BTreeMap<&str, u32>, id: &str) {
    if let Some(count) = active.get_mut(id) {
        *count -= 1;
        if *count == 0 {
            active.remove(id);
        }
    }
}
