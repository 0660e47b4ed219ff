//! Tests for recurrence set calculation (DTSTART + RRULE + RDATE − EXDATE − EXRULE).

use ical_recur::{Amount, Period, PeriodList, RDate, Recur, RecurringComponent, Temporal};

fn t(s: &str) -> Temporal {
    Temporal::parse(s).expect("valid temporal")
}

fn p(s: &str) -> Period {
    s.parse().expect("valid period")
}

fn starts(set: &PeriodList) -> Vec<String> {
    set.iter().map(|period| period.start().to_string()).collect()
}

#[test]
fn duration_prefers_duration_then_end_then_due() {
    let start = t("20240101T090000Z");
    let with_duration = RecurringComponent::new(start.clone())
        .with_end(t("20240101T120000Z"))
        .with_duration(Amount::parse("PT1H").unwrap());
    assert_eq!(with_duration.effective_duration(), Amount::parse("PT1H").unwrap());

    let with_end = RecurringComponent::new(start.clone()).with_end(t("20240101T103000Z"));
    assert_eq!(with_end.effective_duration(), Amount::parse("PT1H30M").unwrap());

    let with_due = RecurringComponent::new(start.clone()).with_due(t("20240101T100000Z"));
    assert_eq!(with_due.effective_duration(), Amount::parse("PT1H").unwrap());

    assert!(RecurringComponent::new(start).effective_duration().is_zero());
    assert_eq!(
        RecurringComponent::new(t("20240101")).with_end(t("20240103")).effective_duration(),
        Amount::parse("P2D").unwrap()
    );
}

#[test]
fn rrule_instances_carry_the_duration() {
    let component = RecurringComponent::new(t("20240101T090000Z"))
        .with_duration(Amount::parse("PT1H").unwrap())
        .with_rrule(Recur::parse("FREQ=DAILY;COUNT=5").unwrap());
    let set = component
        .calculate_recurrence_set(&p("20240102T000000Z/20240104T000000Z"))
        .unwrap();
    assert_eq!(
        set.to_string(),
        "20240102T090000Z/PT1H,20240103T090000Z/PT1H"
    );
}

#[test]
fn instance_in_progress_at_window_start_is_included() {
    let component = RecurringComponent::new(t("20240101T090000Z"))
        .with_end(t("20240101T110000Z"))
        .with_rrule(Recur::parse("FREQ=DAILY").unwrap());
    let set = component
        .calculate_recurrence_set(&p("20240102T100000Z/20240102T120000Z"))
        .unwrap();
    assert_eq!(starts(&set), ["20240102T090000Z"]);
}

#[test]
fn without_rrule_only_dtstart_counts() {
    let component = RecurringComponent::new(t("20240101T090000Z")).with_end(t("20240101T100000Z"));
    let inside = component
        .calculate_recurrence_set(&p("20240101T000000Z/P1D"))
        .unwrap();
    assert_eq!(inside.to_string(), "20240101T090000Z/20240101T100000Z");
    let outside = component
        .calculate_recurrence_set(&p("20240102T000000Z/P1D"))
        .unwrap();
    assert!(outside.is_empty());
}

#[test]
fn rdates_are_added() {
    let component = RecurringComponent::new(t("20240101T090000Z"))
        .with_duration(Amount::parse("PT30M").unwrap())
        .with_rdate(t("20240105T140000Z"))
        .with_rdate(RDate::Period(p("20240106T080000Z/PT2H")))
        .with_rdate(t("20240301T090000Z"));
    let set = component
        .calculate_recurrence_set(&p("20240101T000000Z/20240131T000000Z"))
        .unwrap();
    assert_eq!(
        set.to_string(),
        "20240101T090000Z/PT30M,20240105T140000Z/PT30M,20240106T080000Z/PT2H"
    );
}

#[test]
fn exdates_remove_matching_starts() {
    let component = RecurringComponent::new(t("20240101T090000Z"))
        .with_rrule(Recur::parse("FREQ=DAILY;COUNT=5").unwrap())
        .with_exdate(t("20240102T090000Z"))
        .with_exdate(t("20240104"));
    let set = component
        .calculate_recurrence_set(&p("20240101T000000Z/20240110T000000Z"))
        .unwrap();
    assert_eq!(
        starts(&set),
        ["20240101T090000Z", "20240103T090000Z", "20240105T090000Z"]
    );
}

#[test]
fn exdate_at_a_different_time_does_not_match() {
    let component = RecurringComponent::new(t("20240101T090000Z"))
        .with_rrule(Recur::parse("FREQ=DAILY;COUNT=2").unwrap())
        .with_exdate(t("20240102T100000Z"));
    let set = component
        .calculate_recurrence_set(&p("20240101T000000Z/20240110T000000Z"))
        .unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn exrule_removes_generated_instances() {
    let component = RecurringComponent::new(t("20240101T090000Z"))
        .with_duration(Amount::parse("PT1H").unwrap())
        .with_rrule(Recur::parse("FREQ=DAILY").unwrap())
        .with_exrule(Recur::parse("EXRULE:FREQ=WEEKLY;BYDAY=SA,SU").unwrap());
    let set = component
        .calculate_recurrence_set(&p("20240101T000000Z/20240114T235959Z"))
        .unwrap();
    assert_eq!(set.len(), 10);
    assert!(starts(&set).iter().all(|s| !s.starts_with("20240106") && !s.starts_with("20240107")));
}

#[test]
fn all_day_recurrence() {
    let component = RecurringComponent::new(t("20240101"))
        .with_end(t("20240102"))
        .with_rrule(Recur::parse("FREQ=WEEKLY;COUNT=3").unwrap());
    let set = component
        .calculate_recurrence_set(&p("20240101/20240201"))
        .unwrap();
    assert_eq!(set.to_string(), "20240101/P1D,20240108/P1D,20240115/P1D");
}
