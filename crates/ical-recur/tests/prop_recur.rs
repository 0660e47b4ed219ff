//! Property-based tests for rule expansion and period algebra using proptest.
//!
//! These tests verify invariants that should hold for *any* valid input, not
//! just the specific examples in `rfc5545_vectors.rs`. Plain rules are also
//! checked against the `rrule` crate as an independent oracle.

use chrono::Utc;
use chrono_tz::Tz;
use ical_recur::{
    parse_zone, Frequency, Period, PeriodList, Recur, Temporal, TemporalComparator, WeekDay,
};
use proptest::prelude::*;
use rrule::RRuleSet;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_freq() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("DAILY"), Just("WEEKLY"), Just("MONTHLY"), Just("YEARLY")]
}

fn arb_interval() -> impl Strategy<Value = u32> {
    1u32..=4
}

fn arb_count() -> impl Strategy<Value = u32> {
    1u32..=40
}

fn arb_byday() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("MO"),
        Just("TU"),
        Just("WE"),
        Just("TH"),
        Just("FR"),
        Just("SA"),
        Just("SU"),
    ]
}

fn arb_timezone() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("UTC"),
        Just("America/New_York"),
        Just("Europe/London"),
        Just("Asia/Tokyo"),
        Just("Australia/Sydney"),
    ]
}

/// A floating seed in 2025–2027. Day is capped at 28 so every month has it.
fn arb_seed() -> impl Strategy<Value = String> {
    (2025u32..=2027, 1u32..=12, 1u32..=28, 0u32..=23, 0u32..=59)
        .prop_map(|(y, m, d, h, min)| format!("{y:04}{m:02}{d:02}T{h:02}{min:02}00"))
}

/// An optional extra rule part that keeps the rule valid for any frequency.
fn arb_extra_part() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        arb_byday().prop_map(|d| format!(";BYDAY={d}")),
        (arb_byday(), arb_byday()).prop_map(|(a, b)| format!(";BYDAY={a},{b}")),
        (1i32..=28).prop_map(|d| format!(";BYMONTHDAY={d}")),
        (1u32..=12).prop_map(|m| format!(";BYMONTH={m}")),
        (0u32..=23, 0u32..=23).prop_map(|(a, b)| format!(";BYHOUR={a},{b}")),
    ]
}

/// A UTC period starting within a two-day span, up to six hours long.
fn arb_period() -> impl Strategy<Value = Period> {
    (0i64..48 * 4, 0i64..=24).prop_map(|(start_quarter, length_quarters)| {
        let base = Temporal::parse("20250101T000000Z").unwrap();
        let start = base
            .plus(&chrono::TimeDelta::minutes(start_quarter * 15).into())
            .unwrap();
        let end = start
            .plus(&chrono::TimeDelta::minutes(length_quarters * 15).into())
            .unwrap();
        Period::new(start, end).unwrap()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

fn zoned(seed: &str, tz: &str) -> Temporal {
    Temporal::parse_in_zone(seed, parse_zone(tz).unwrap()).unwrap()
}

fn far_future() -> Temporal {
    Temporal::parse("25000101T000000Z").unwrap()
}

// ---------------------------------------------------------------------------
// Property 1: expansion is strictly increasing
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_strictly_increasing(
        freq in arb_freq(),
        interval in arb_interval(),
        count in arb_count(),
        extra in arb_extra_part(),
        seed in arb_seed(),
        tz in arb_timezone(),
    ) {
        let rule = format!("FREQ={freq};INTERVAL={interval};COUNT={count}{extra}");
        let recur = Recur::parse(&rule).unwrap();
        let seed = zoned(&seed, tz);
        let dates = recur.dates(&seed, &seed, &far_future(), None);
        let cmp = TemporalComparator::for_seed(&seed);

        prop_assert!(dates.len() <= count as usize, "{rule}: {} > COUNT", dates.len());
        for pair in dates.windows(2) {
            prop_assert!(cmp.is_before(&pair[0], &pair[1]), "{rule}: {} !< {}", pair[0], pair[1]);
        }
        for date in &dates {
            prop_assert!(!cmp.is_before(date, &seed), "{rule}: {date} precedes the seed");
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: plain rules produce exactly COUNT occurrences
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn count_is_exact_for_plain_rules(
        freq in arb_freq(),
        interval in arb_interval(),
        count in arb_count(),
        seed in arb_seed(),
        tz in arb_timezone(),
    ) {
        let recur = Recur::parse(&format!("FREQ={freq};INTERVAL={interval};COUNT={count}")).unwrap();
        let seed = zoned(&seed, tz);
        let dates = recur.dates(&seed, &seed, &far_future(), None);
        prop_assert_eq!(dates.len(), count as usize);
        prop_assert_eq!(&dates[0], &seed);
    }
}

// ---------------------------------------------------------------------------
// Property 3: plain UTC rules agree with the rrule crate
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn matches_rrule_crate(
        freq in arb_freq(),
        interval in arb_interval(),
        count in arb_count(),
        seed in arb_seed(),
    ) {
        let rule = format!("FREQ={freq};INTERVAL={interval};COUNT={count}");
        let utc_seed = format!("{seed}Z");

        let oracle: RRuleSet = format!("DTSTART:{utc_seed}\nRRULE:{rule}").parse().unwrap();
        let expected: Vec<chrono::DateTime<Utc>> = oracle
            .all(100)
            .dates
            .iter()
            .map(|d| d.with_timezone(&Utc))
            .collect();

        let seed = Temporal::parse(&utc_seed).unwrap();
        let actual: Vec<chrono::DateTime<Utc>> = Recur::parse(&rule)
            .unwrap()
            .dates(&seed, &seed, &far_future(), None)
            .iter()
            .map(|d| d.to_utc(&Tz::UTC))
            .collect();

        prop_assert_eq!(actual, expected);
    }
}

// ---------------------------------------------------------------------------
// Property 4: a narrower window is a filter of the wider one
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn window_is_a_filter(
        freq in arb_freq(),
        interval in arb_interval(),
        extra in arb_extra_part(),
        seed in arb_seed(),
        offset_days in 0i64..=1500,
    ) {
        let recur = Recur::parse(&format!("FREQ={freq};INTERVAL={interval}{extra}")).unwrap();
        let seed = Temporal::parse(&format!("{seed}Z")).unwrap();
        let end = seed.plus(&chrono::TimeDelta::days(2000).into()).unwrap();
        let start = seed.plus(&chrono::TimeDelta::days(offset_days).into()).unwrap();

        let full = recur.dates(&seed, &seed, &end, None);
        let narrow = recur.dates(&seed, &start, &end, None);
        let expected: Vec<Temporal> = full.into_iter().filter(|d| *d >= start).collect();
        prop_assert_eq!(narrow, expected);
    }
}

// ---------------------------------------------------------------------------
// Property 5: rule text round-trips
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn rule_text_round_trips(
        interval in proptest::option::of(1u32..=10),
        count in proptest::option::of(1u32..=100),
        months in proptest::collection::vec(1u32..=12, 0..3),
        month_days in proptest::collection::vec(prop_oneof![1i32..=31, -31i32..=-1], 0..3),
        days in proptest::collection::vec((0u32..7, -5i32..=5), 0..3),
        set_pos in proptest::collection::vec(prop_oneof![1i32..=10, -10i32..=-1], 0..2),
        until in proptest::option::of((arb_seed(), arb_timezone())),
    ) {
        let weekdays = [
            chrono::Weekday::Mon,
            chrono::Weekday::Tue,
            chrono::Weekday::Wed,
            chrono::Weekday::Thu,
            chrono::Weekday::Fri,
            chrono::Weekday::Sat,
            chrono::Weekday::Sun,
        ];
        let mut builder = Recur::builder()
            .frequency(Frequency::Monthly)
            .month_list(months)
            .month_day_list(month_days)
            .day_list(days.into_iter().map(|(d, n)| WeekDay::new(weekdays[d as usize], n)))
            .set_pos_list(set_pos);
        if let Some(interval) = interval {
            builder = builder.interval(interval);
        }
        if let Some(count) = count {
            builder = builder.count(count);
        }
        if let Some((local, tz)) = until {
            builder = builder.until(zoned(&local, tz));
        }
        let recur = builder.build().unwrap();
        let reparsed = Recur::parse(&recur.to_string()).unwrap();
        prop_assert_eq!(reparsed, recur);
    }
}

// ---------------------------------------------------------------------------
// Property 6: normalisation is idempotent and leaves no touching periods
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn normalise_is_idempotent_and_disjoint(periods in proptest::collection::vec(arb_period(), 0..12)) {
        let list: PeriodList = periods.into_iter().collect();
        let once = list.normalise();
        prop_assert_eq!(once.normalise(), once.clone());

        let merged: Vec<&Period> = once.iter().collect();
        for pair in merged.windows(2) {
            prop_assert!(!pair[0].intersects(pair[1]), "{} overlaps {}", pair[0], pair[1]);
            prop_assert!(!pair[0].adjacent(pair[1]), "{} touches {}", pair[0], pair[1]);
        }
        for period in &once {
            prop_assert!(!period.is_empty());
        }
        for original in &list {
            if !original.is_empty() {
                prop_assert!(
                    once.iter().any(|p| p.contains(original)),
                    "{original} lost by normalisation"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 7: subtraction leaves nothing overlapping what was removed
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn subtraction_removes_overlap(
        periods in proptest::collection::vec(arb_period(), 1..8),
        holes in proptest::collection::vec(arb_period(), 1..4),
    ) {
        let list: PeriodList = periods.into_iter().collect();
        let holes: PeriodList = holes.into_iter().collect();
        let remaining = list.subtract(&holes);
        for piece in &remaining {
            for hole in &holes {
                prop_assert!(
                    !piece.intersects(hole) || piece.is_empty(),
                    "{piece} still overlaps {hole}"
                );
            }
            prop_assert!(list.iter().any(|p| p.contains(piece)), "{piece} came from nowhere");
        }
    }
}

// ---------------------------------------------------------------------------
// Property 8: subtraction plus the overlap recovers the original coverage
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn subtract_then_union_with_overlap_recovers_coverage(a in arb_period(), b in arb_period()) {
        let mut recovered = a.subtract(&b);
        if a.intersects(&b) {
            let start = std::cmp::max(a.start(), b.start()).clone();
            let end = std::cmp::min(a.end(), b.end()).clone();
            recovered = recovered.add(&PeriodList::from(Period::new(start, end).unwrap()));
        }
        prop_assert_eq!(recovered.normalise(), PeriodList::from(a.clone()).normalise());
    }

    #[test]
    fn add_encloses_both_periods(a in arb_period(), b in arb_period()) {
        let span = a.add(Some(&b));
        prop_assert!(span.contains(&a), "{span} does not contain {a}");
        prop_assert!(span.contains(&b), "{span} does not contain {b}");
        prop_assert_eq!(span.start(), std::cmp::min(a.start(), b.start()));
        prop_assert_eq!(span.end(), std::cmp::max(a.end(), b.end()));
    }
}
