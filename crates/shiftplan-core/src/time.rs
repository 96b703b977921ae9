//! Time normalization.
//!
//! Raw calendar entries arrive as a day plus a start and end time of day.
//! [`TimeInterval`] canonicalizes them into minutes from the start of `day`:
//! an end at or before the start is read as crossing midnight, so the
//! normalized `end_minute` may exceed [`MINUTES_PER_DAY`].
//!
//! Absolute positions (`abs_start`, `abs_end`) count minutes since the common
//! era and are what gap and overlap arithmetic uses across days.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShiftplanError};

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Parses `HH:MM` or `HH:MM:SS` into minutes since midnight.
///
/// `24:00` maps to 1440 and marks the end of the day. Seconds are rounded to
/// the nearest minute.
///
/// # Example
///
/// ```
/// use shiftplan_core::parse_hhmm;
///
/// assert_eq!(parse_hhmm("06:30").unwrap(), 390);
/// assert_eq!(parse_hhmm("24:00").unwrap(), 1440);
/// assert!(parse_hhmm("25:00").is_err());
/// ```
pub fn parse_hhmm(text: &str) -> Result<u32> {
    let text = text.trim();
    if text == "24:00" || text == "24:00:00" {
        return Ok(MINUTES_PER_DAY);
    }

    let bad = || ShiftplanError::malformed(text, "expected HH:MM");
    let mut parts = text.split(':');
    let hours: u32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let minutes: u32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let seconds: u32 = match parts.next() {
        Some(s) => s.parse().map_err(|_| bad())?,
        None => 0,
    };
    if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 59 {
        return Err(bad());
    }

    let total = hours * 60 + minutes + (seconds + 30) / 60;
    if total > MINUTES_PER_DAY {
        return Err(bad());
    }
    Ok(total)
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_day(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| ShiftplanError::malformed(text, "expected YYYY-MM-DD"))
}

/// A normalized time interval anchored to a calendar day.
///
/// Invariant: `start_minute < MINUTES_PER_DAY` and `end_minute > start_minute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeInterval {
    pub day: NaiveDate,
    pub start_minute: u32,
    pub end_minute: u32,
}

impl TimeInterval {
    /// Normalizes raw time-of-day bounds into an interval.
    ///
    /// If `end <= start` the interval crosses midnight and 1440 is added to
    /// `end`. Equal bounds are rejected as zero-length.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use shiftplan_core::TimeInterval;
    ///
    /// let day = NaiveDate::from_ymd_opt(2025, 10, 7).unwrap();
    /// let night = TimeInterval::new(day, 22 * 60, 6 * 60).unwrap();
    /// assert_eq!(night.end_minute, 1800);
    /// assert_eq!(night.duration_minutes(), 480);
    /// assert!(night.crosses_midnight());
    /// ```
    pub fn new(day: NaiveDate, start: u32, end: u32) -> Result<Self> {
        Self::normalize("interval", day, start, end)
    }

    /// Like [`TimeInterval::new`], naming `entity` in any error.
    pub fn normalize(entity: &str, day: NaiveDate, start: u32, end: u32) -> Result<Self> {
        if start >= MINUTES_PER_DAY {
            return Err(ShiftplanError::malformed(
                entity,
                format!("start minute {start} outside [0, {MINUTES_PER_DAY})"),
            ));
        }
        if end > MINUTES_PER_DAY {
            return Err(ShiftplanError::malformed(
                entity,
                format!("end minute {end} outside [0, {MINUTES_PER_DAY}]"),
            ));
        }
        if end == start {
            return Err(ShiftplanError::malformed(entity, "zero-length interval"));
        }
        let end_minute = if end < start { end + MINUTES_PER_DAY } else { end };
        Ok(Self {
            day,
            start_minute: start,
            end_minute,
        })
    }

    /// Rechecks the normalized invariant on an interval built field by field.
    ///
    /// Requires `start_minute < 1440` and
    /// `start_minute < end_minute <= start_minute + 1440`.
    pub fn check(&self, entity: &str) -> Result<()> {
        if self.start_minute >= MINUTES_PER_DAY {
            return Err(ShiftplanError::malformed(
                entity,
                format!(
                    "start minute {} outside [0, {MINUTES_PER_DAY})",
                    self.start_minute
                ),
            ));
        }
        if self.end_minute <= self.start_minute {
            return Err(ShiftplanError::malformed(
                entity,
                format!(
                    "end minute {} not after start minute {}",
                    self.end_minute, self.start_minute
                ),
            ));
        }
        if self.end_minute > self.start_minute + MINUTES_PER_DAY {
            return Err(ShiftplanError::malformed(entity, "interval longer than one day"));
        }
        Ok(())
    }

    /// Parses and normalizes `YYYY-MM-DD`, `HH:MM`, `HH:MM` strings.
    pub fn parse(entity: &str, day: &str, start: &str, end: &str) -> Result<Self> {
        let day = parse_day(day)?;
        let start = parse_hhmm(start)?;
        let end = parse_hhmm(end)?;
        Self::normalize(entity, day, start, end)
    }

    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_minute - self.start_minute
    }

    /// Whether the interval runs past the end of its start day.
    #[inline]
    pub fn crosses_midnight(&self) -> bool {
        self.end_minute > MINUTES_PER_DAY
    }

    /// Absolute start in minutes since the common era.
    #[inline]
    pub fn abs_start(&self) -> i64 {
        day_origin(self.day) + i64::from(self.start_minute)
    }

    /// Absolute end in minutes since the common era.
    #[inline]
    pub fn abs_end(&self) -> i64 {
        day_origin(self.day) + i64::from(self.end_minute)
    }

    /// Whether two intervals share any instant (half-open).
    pub fn overlaps(&self, other: &Self) -> bool {
        self.abs_start() < other.abs_end() && other.abs_start() < self.abs_end()
    }

    /// Whether `other` lies entirely within this interval.
    pub fn contains(&self, other: &Self) -> bool {
        self.abs_start() <= other.abs_start() && other.abs_end() <= self.abs_end()
    }

    /// Splits an overnight interval into its start-day head and next-day tail.
    ///
    /// Intervals that end at or before midnight return no tail.
    pub fn split_at_midnight(&self) -> (Self, Option<Self>) {
        if !self.crosses_midnight() {
            return (*self, None);
        }
        let head = Self {
            day: self.day,
            start_minute: self.start_minute,
            end_minute: MINUTES_PER_DAY,
        };
        let tail = Self {
            day: self.day + Duration::days(1),
            start_minute: 0,
            end_minute: self.end_minute - MINUTES_PER_DAY,
        };
        (head, Some(tail))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.end_minute % MINUTES_PER_DAY;
        write!(
            f,
            "{} {:02}:{:02}-{:02}:{:02}",
            self.day,
            self.start_minute / 60,
            self.start_minute % 60,
            end / 60,
            end % 60
        )?;
        if self.crosses_midnight() {
            write!(f, "(+1)")?;
        }
        Ok(())
    }
}

/// Minutes since the common era at midnight of `day`.
#[inline]
pub fn day_origin(day: NaiveDate) -> i64 {
    i64::from(day.num_days_from_ce()) * i64::from(MINUTES_PER_DAY)
}

/// ISO `(year, week)` of `day`.
#[inline]
pub fn iso_week(day: NaiveDate) -> (i32, u32) {
    let week = day.iso_week();
    (week.year(), week.week())
}
