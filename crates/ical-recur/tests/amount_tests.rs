//! Tests for DURATION parsing, rendering and ordering.

use chrono::TimeDelta;
use ical_recur::{Amount, CalendarPeriod, RecurError, Temporal};

fn a(s: &str) -> Amount {
    Amount::parse(s).expect("valid duration")
}

#[test]
fn date_only_durations_are_calendar_amounts() {
    assert_eq!(a("P1D"), Amount::Calendar(CalendarPeriod::of_days(1)));
    assert_eq!(a("P2W"), Amount::Calendar(CalendarPeriod::of_days(14)));
    assert_eq!(a("-P3D"), Amount::Calendar(CalendarPeriod::of_days(-3)));
    assert_eq!(a("P1Y2M"), Amount::Calendar(CalendarPeriod::new(1, 2, 0).unwrap()));
}

#[test]
fn time_bearing_durations_are_exact() {
    assert_eq!(a("PT1H30M"), Amount::Exact(TimeDelta::minutes(90)));
    assert_eq!(a("P1DT12H"), Amount::Exact(TimeDelta::hours(36)));
    assert_eq!(a("-PT15M"), Amount::Exact(TimeDelta::minutes(-15)));
    assert_eq!(a("+PT10S"), Amount::Exact(TimeDelta::seconds(10)));
}

#[test]
fn malformed_durations_are_rejected() {
    for bad in ["", "P", "PT", "1D", "P1H", "PT1D", "P1DT", "P1.5D", "PXD", "P1D2D"] {
        assert!(
            matches!(Amount::parse(bad), Err(RecurError::InvalidDuration(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn rendering_prefers_weeks() {
    assert_eq!(a("P14D").to_string(), "P2W");
    assert_eq!(a("P10D").to_string(), "P10D");
    assert_eq!(a("PT168H").to_string(), "P1W");
    assert_eq!(a("PT25H").to_string(), "P1DT1H");
    assert_eq!(a("PT90M").to_string(), "PT1H30M");
    assert_eq!(a("-PT15M").to_string(), "-PT15M");
}

#[test]
fn zero_amounts_render_per_kind() {
    assert_eq!(Amount::Exact(TimeDelta::zero()).to_string(), "PT0S");
    assert_eq!(Amount::Calendar(CalendarPeriod::default()).to_string(), "P0D");
}

#[test]
fn months_render_as_days_from_the_seed() {
    let february = Temporal::parse("20240201").unwrap();
    let january = Temporal::parse("20240101").unwrap();
    let non_leap_february = Temporal::parse("20230201").unwrap();
    assert_eq!(a("P1M").to_string_with_seed(&february), "P29D");
    assert_eq!(a("P1M").to_string_with_seed(&january), "P31D");
    assert_eq!(a("P1M").to_string_with_seed(&non_leap_february), "P4W");
    assert_eq!(a("P2M").to_string_with_seed(&january), "P60D");
    assert_eq!(a("P1Y").to_string_with_seed(&january), "P366D");
    assert_eq!(a("-P1M").to_string_with_seed(&january), "-P31D");
    assert_eq!(a("P1M").to_string(), "P31D");
}

#[test]
fn between_dates_counts_days() {
    let start = Temporal::parse("20240101").unwrap();
    let end = Temporal::parse("20240108").unwrap();
    assert_eq!(Amount::between(&start, &end), a("P7D"));
    let start = Temporal::parse("20240101T090000Z").unwrap();
    let end = Temporal::parse("20240101T103000Z").unwrap();
    assert_eq!(Amount::between(&start, &end), a("PT1H30M"));
}

#[test]
fn ordering_puts_negatives_first_and_calendar_above_exact() {
    let mut amounts = vec![a("P1D"), a("-P2D"), a("PT1H"), a("-PT1H"), a("P1W"), a("PT0S")];
    amounts.sort();
    let rendered: Vec<String> = amounts.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["-P2D", "-PT1H", "PT0S", "PT1H", "P1D", "P1W"]);
}

#[test]
fn calendar_magnitude_is_lexicographic() {
    assert!(a("P1M") > a("P40D"));
    assert!(a("P1Y") > a("P13M"));
    assert!(a("-P1M") < a("-P40D"));
}
