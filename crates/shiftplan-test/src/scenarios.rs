//! Canned scheduling inputs shared by unit and integration tests.

use shiftplan_config::PlannerConfig;
use shiftplan_core::{Availability, Preference, SchedulingInput, SkillRequirements, TimeOff};

use crate::builders::{employee, interval, shift, window};

/// One cook role, an early and a late shift, and a rush window of three
/// people inside the early shift. Only two cooks exist, so the window can
/// never be fully staffed.
pub fn window_inside_shift() -> SchedulingInput {
    SchedulingInput::new(
        vec![employee("e1", &["cook"]), employee("e2", &["cook"])],
        vec![
            shift("early", 0, "06:00", "14:00", "cook").with_demand(1),
            shift("late", 0, "14:00", "22:00", "cook").with_demand(1),
        ],
    )
    .with_windows(vec![window("rush", 0, "08:00", "10:00", "cook", 3)])
}

/// Two shifts half an hour apart, one employee.
pub fn rest_pair() -> SchedulingInput {
    SchedulingInput::new(
        vec![employee("e1", &["cook"])],
        vec![
            shift("A", 0, "06:00", "14:00", "cook").with_demand(1),
            shift("B", 0, "14:30", "22:00", "cook").with_demand(1),
        ],
    )
}

/// Configuration with an eleven hour rest rule.
pub fn eleven_hour_rest() -> PlannerConfig {
    PlannerConfig::new().with_min_rest_hours(11.0)
}

/// Seven consecutive 22:00-06:00 guard nights and two guards.
pub fn night_week() -> SchedulingInput {
    let nights = (0..7)
        .map(|d| shift(&format!("n{d}"), d, "22:00", "06:00", "guard").with_demand(1))
        .collect();
    SchedulingInput::new(
        vec![employee("g1", &["guard"]), employee("g2", &["guard"])],
        nights,
    )
}

/// A two-day, two-role input touching every entity kind.
pub fn mixed_week() -> SchedulingInput {
    let forklift = SkillRequirements::from_pairs([("forklift", 1)]);
    SchedulingInput::new(
        vec![
            employee("ann", &["cook"]).with_skills(["haccp"]),
            employee("bob", &["cook", "porter"]).with_min_rest_hours(12.0),
            employee("cid", &["porter"])
                .with_skills(["forklift"])
                .with_max_week_hours(16.0)
                .with_max_overtime_hours(4.0),
            employee("dee", &["porter"]).with_kind(shiftplan_core::EmployeeKind::External),
        ],
        vec![
            shift("c-d0-am", 0, "06:00", "14:00", "cook").with_demand(1),
            shift("c-d0-pm", 0, "14:00", "22:00", "cook").with_demand(1),
            shift("c-d1-am", 1, "06:00", "14:00", "cook").with_demand(1),
            shift("p-d0-night", 0, "22:00", "06:00", "porter").with_demand(1),
            shift("p-d1-am", 1, "07:00", "15:00", "porter")
                .with_demand(2)
                .with_skills(forklift.clone()),
            shift("p-d1-night", 1, "22:00", "06:00", "porter"),
        ],
    )
    .with_windows(vec![
        window("cook-lunch", 0, "11:00", "15:00", "cook", 2)
            .with_skills(SkillRequirements::from_pairs([("haccp", 1)])),
        window("porter-dawn", 1, "05:00", "09:00", "porter", 2).with_skills(forklift),
    ])
    .with_availability(vec![
        Availability::new("bob", "c-d1-am", false),
        Availability::new("ann", "c-d0-pm", true),
    ])
    .with_time_off(vec![TimeOff::new("dee", interval(1, "12:00", "18:00"))])
    .with_preferences(vec![
        Preference::new("ann", "c-d0-pm", -2),
        Preference::new("cid", "p-d1-am", 1),
    ])
}
