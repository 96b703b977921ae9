//! Terse entity constructors.
//!
//! Times are `HH:MM` strings and days are offsets from
//! [`DAY0`](crate::calendar::DAY0). Builders panic on malformed fixtures.
//!
//! # Example
//!
//! ```
//! use shiftplan_test::builders::{employee, shift, window};
//!
//! let ann = employee("ann", &["cook"]);
//! let early = shift("s1", 0, "06:00", "14:00", "cook").with_demand(1);
//! let rush = window("w1", 0, "08:00", "10:00", "cook", 3);
//! assert!(ann.has_role("cook"));
//! assert_eq!(early.duration_minutes(), 480);
//! assert_eq!(rush.demand, 3);
//! ```

use shiftplan_core::{Employee, Shift, TimeInterval, Window};

use crate::calendar::day_str;

/// Creates an employee holding `roles`, named after the id.
pub fn employee(id: &str, roles: &[&str]) -> Employee {
    Employee::new(id, id.to_uppercase()).with_roles(roles.iter().copied())
}

/// Creates a shift on day `offset`.
pub fn shift(id: &str, offset: i64, start: &str, end: &str, role: &str) -> Shift {
    Shift::parse(id, &day_str(offset), start, end, role).expect("fixture shift is well formed")
}

/// Creates a coverage window on day `offset`.
pub fn window(id: &str, offset: i64, start: &str, end: &str, role: &str, demand: u32) -> Window {
    Window::parse(id, &day_str(offset), start, end, role, demand)
        .expect("fixture window is well formed")
}

/// Creates a bare interval on day `offset`.
pub fn interval(offset: i64, start: &str, end: &str) -> TimeInterval {
    TimeInterval::parse("fixture", &day_str(offset), start, end)
        .expect("fixture interval is well formed")
}
