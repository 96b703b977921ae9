//! Tests for time parsing and interval normalization.

use chrono::NaiveDate;

use crate::error::ShiftplanError;
use crate::time::{parse_day, parse_hhmm, TimeInterval, MINUTES_PER_DAY};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
}

#[test]
fn test_parse_hhmm_valid() {
    assert_eq!(parse_hhmm("00:00").unwrap(), 0);
    assert_eq!(parse_hhmm("08:15").unwrap(), 495);
    assert_eq!(parse_hhmm(" 23:59 ").unwrap(), 1439);
    assert_eq!(parse_hhmm("24:00:00").unwrap(), MINUTES_PER_DAY);
    assert_eq!(parse_hhmm("10:00:40").unwrap(), 601);
}

#[test]
fn test_parse_hhmm_invalid() {
    for text in ["", "8", "24:30", "12:60", "ab:cd", "10:00:00:00", "-1:00"] {
        assert!(parse_hhmm(text).is_err(), "{text:?} should be rejected");
    }
}

#[test]
fn test_parse_day() {
    assert_eq!(parse_day("2025-10-07").unwrap(), day(7));
    assert!(parse_day("07/10/2025").is_err());
}

#[test]
fn test_same_day_interval() {
    let iv = TimeInterval::new(day(7), 360, 840).unwrap();
    assert_eq!(iv.duration_minutes(), 480);
    assert!(!iv.crosses_midnight());
    assert_eq!(iv.split_at_midnight(), (iv, None));
}

#[test]
fn test_cross_midnight_interval() {
    let iv = TimeInterval::parse("S_NIGHT", "2025-10-07", "22:00", "06:00").unwrap();
    assert_eq!(iv.start_minute, 1320);
    assert_eq!(iv.end_minute, 1800);
    assert_eq!(iv.duration_minutes(), 480);
    assert!(iv.crosses_midnight());
    assert_eq!(iv.abs_end() - iv.abs_start(), 480);
}

#[test]
fn test_end_at_midnight_does_not_cross() {
    let iv = TimeInterval::parse("S", "2025-10-07", "16:00", "24:00").unwrap();
    assert_eq!(iv.end_minute, MINUTES_PER_DAY);
    assert!(!iv.crosses_midnight());

    let also = TimeInterval::parse("S", "2025-10-07", "16:00", "00:00").unwrap();
    assert_eq!(also.end_minute, MINUTES_PER_DAY);
}

#[test]
fn test_zero_length_rejected() {
    let err = TimeInterval::new(day(7), 600, 600).unwrap_err();
    assert!(matches!(err, ShiftplanError::MalformedInterval { .. }));
}

#[test]
fn test_out_of_range_rejected() {
    assert!(TimeInterval::new(day(7), 1440, 60).is_err());
    assert!(TimeInterval::new(day(7), 60, 1441).is_err());
}

#[test]
fn test_split_keeps_overnight_tail() {
    let iv = TimeInterval::new(day(7), 1320, 360).unwrap();
    let (head, tail) = iv.split_at_midnight();
    let tail = tail.unwrap();

    assert_eq!(head.day, day(7));
    assert_eq!((head.start_minute, head.end_minute), (1320, 1440));
    assert_eq!(tail.day, day(8));
    assert_eq!((tail.start_minute, tail.end_minute), (0, 360));
    assert_eq!(head.duration_minutes() + tail.duration_minutes(), 480);
    assert_eq!(head.abs_end(), tail.abs_start());
    assert_eq!(tail.abs_end(), iv.abs_end());
}

#[test]
fn test_overlap_across_days() {
    let night = TimeInterval::new(day(7), 1320, 360).unwrap();
    let early = TimeInterval::new(day(8), 300, 600).unwrap();
    let late = TimeInterval::new(day(8), 360, 600).unwrap();

    assert!(night.overlaps(&early));
    assert!(!night.overlaps(&late));
}

#[test]
fn test_display() {
    let iv = TimeInterval::new(day(7), 1320, 360).unwrap();
    assert_eq!(iv.to_string(), "2025-10-07 22:00-06:00(+1)");
}

#[test]
fn test_check_accepts_normalized_intervals() {
    assert!(TimeInterval::new(day(7), 1320, 360).unwrap().check("n").is_ok());
    assert!(TimeInterval::new(day(7), 0, 1440).unwrap().check("d").is_ok());
}

#[test]
fn test_check_rejects_field_built_intervals() {
    let zero = TimeInterval {
        day: day(7),
        start_minute: 600,
        end_minute: 600,
    };
    let inverted = TimeInterval {
        end_minute: 300,
        ..zero
    };
    let too_long = TimeInterval {
        end_minute: 600 + MINUTES_PER_DAY + 1,
        ..zero
    };
    let late_start = TimeInterval {
        start_minute: MINUTES_PER_DAY,
        end_minute: MINUTES_PER_DAY + 60,
        ..zero
    };

    for interval in [zero, inverted, too_long, late_start] {
        assert!(matches!(
            interval.check("shift s1"),
            Err(ShiftplanError::MalformedInterval { .. })
        ));
    }
}
