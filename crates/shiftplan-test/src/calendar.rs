//! Fixed planning calendar.
//!
//! All fixtures are anchored to the week starting Monday 2025-10-06 so ISO
//! week boundaries are predictable in tests.

use chrono::{Duration, NaiveDate};
use shiftplan_core::parse_day;

/// First day of the fixture week (a Monday).
pub const DAY0: &str = "2025-10-06";

/// Returns the date `offset` days after [`DAY0`].
pub fn day(offset: i64) -> NaiveDate {
    parse_day(DAY0).expect("fixture anchor date is valid") + Duration::days(offset)
}

/// Returns the `YYYY-MM-DD` text of [`day`].
pub fn day_str(offset: i64) -> String {
    day(offset).format("%Y-%m-%d").to_string()
}
