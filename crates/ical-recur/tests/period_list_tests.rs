//! Tests for period set normalisation, union and subtraction.

use ical_recur::PeriodList;

fn list(s: &str) -> PeriodList {
    s.parse().expect("valid period list")
}

#[test]
fn normalise_merges_overlapping_and_adjacent_periods() {
    // Days 1–3, 2–5 and 6 (whole days): 2–5 overlaps 1–3, and day 6 starts
    // where 2–5 ends.
    let periods = list(
        "20240101T000000Z/20240104T000000Z,\
         20240102T000000Z/20240106T000000Z,\
         20240106T000000Z/20240107T000000Z",
    );
    assert_eq!(periods.normalise().to_string(), "20240101T000000Z/20240107T000000Z");
}

#[test]
fn normalise_absorbs_contained_and_empty_periods() {
    let periods = list(
        "20240101T090000Z/20240101T170000Z,\
         20240101T100000Z/20240101T110000Z,\
         20240101T200000Z/PT0S",
    );
    assert_eq!(periods.normalise().to_string(), "20240101T090000Z/20240101T170000Z");
}

#[test]
fn normalise_keeps_disjoint_periods() {
    let periods = list("20240101T090000Z/PT1H,20240101T120000Z/PT1H");
    assert_eq!(periods.normalise(), periods);
    assert_eq!(periods.normalise().len(), 2);
}

#[test]
fn normalise_leaves_date_periods_alone() {
    let periods = list("20240101/20240105,20240103/20240108");
    assert_eq!(periods.normalise(), periods);
}

#[test]
fn normalise_is_idempotent() {
    let periods = list(
        "20240101T090000Z/PT2H,20240101T100000Z/PT2H,20240101T150000Z/PT1H,20240101T160000Z/PT1H",
    );
    let once = periods.normalise();
    assert_eq!(once.to_string(), "20240101T090000Z/20240101T120000Z,20240101T150000Z/20240101T170000Z");
    assert_eq!(once.normalise(), once);
}

#[test]
fn add_is_union_then_normalise() {
    let morning = list("20240101T090000Z/PT2H");
    let overlap = list("20240101T100000Z/PT2H,20240101T140000Z/PT1H");
    assert_eq!(
        morning.add(&overlap).to_string(),
        "20240101T090000Z/20240101T120000Z,20240101T140000Z/PT1H"
    );
}

#[test]
fn subtract_applies_each_subtraction() {
    let day = list("20240101T080000Z/20240101T180000Z");
    let meetings = list("20240101T090000Z/PT1H,20240101T120000Z/PT30M,20240101T170000Z/PT2H");
    assert_eq!(
        day.subtract(&meetings).to_string(),
        "20240101T080000Z/20240101T090000Z,\
         20240101T100000Z/20240101T120000Z,\
         20240101T123000Z/20240101T170000Z"
    );
}

#[test]
fn subtract_removes_equal_date_periods() {
    let days = list("20240101/P1D,20240102/P1D");
    let removed = days.subtract(&list("20240101/P1D"));
    assert_eq!(removed.to_string(), "20240102/P1D");
}

#[test]
fn empty_list_round_trips() {
    let empty = list("");
    assert!(empty.is_empty());
    assert_eq!(empty.normalise(), empty);
    assert_eq!(empty.to_string(), "");
}

#[test]
fn insert_and_remove_keep_the_set_ordered() {
    let mut periods = list("20240103T090000Z/PT1H");
    let earlier: ical_recur::Period = "20240101T090000Z/PT1H".parse().unwrap();
    assert!(periods.insert(earlier.clone()));
    assert!(!periods.insert(earlier.clone()));
    assert_eq!(periods.first(), Some(&earlier));
    assert!(periods.remove(&earlier));
    assert!(!periods.remove(&earlier));
    assert_eq!(periods.to_string(), "20240103T090000Z/PT1H");
}
