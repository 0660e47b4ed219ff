//! Cross-representation ordering of [`Temporal`] values.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::temporal::{truncate_to_seconds, Temporal};

/// Granularity at which two temporals are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonUnit {
    #[default]
    Seconds,
    Days,
}

/// Orders temporals of any representation against each other.
///
/// Dates and floating values are read in `default_zone`. Instants are compared
/// at whole-second precision, or by civil date in `default_zone` when the unit
/// is [`ComparisonUnit::Days`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalComparator {
    default_zone: Tz,
    unit: ComparisonUnit,
}

impl Default for TemporalComparator {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl TemporalComparator {
    pub fn new(default_zone: Tz) -> Self {
        Self::with_unit(default_zone, ComparisonUnit::Seconds)
    }

    pub fn with_unit(default_zone: Tz, unit: ComparisonUnit) -> Self {
        Self { default_zone, unit }
    }

    /// The comparator an expansion seeded with `seed` uses: the seed's zone
    /// (UTC otherwise), and day granularity for date seeds.
    pub fn for_seed(seed: &Temporal) -> Self {
        let unit = if seed.is_date_time_precision() {
            ComparisonUnit::Seconds
        } else {
            ComparisonUnit::Days
        };
        Self::with_unit(seed.zone().unwrap_or(Tz::UTC), unit)
    }

    pub fn default_zone(&self) -> Tz {
        self.default_zone
    }

    pub fn unit(&self) -> ComparisonUnit {
        self.unit
    }

    pub fn compare(&self, a: &Temporal, b: &Temporal) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }

    pub fn is_before(&self, a: &Temporal, b: &Temporal) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    pub fn is_after(&self, a: &Temporal, b: &Temporal) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    pub fn equal(&self, a: &Temporal, b: &Temporal) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    pub fn min<'a>(&self, a: &'a Temporal, b: &'a Temporal) -> &'a Temporal {
        if self.is_after(a, b) {
            b
        } else {
            a
        }
    }

    pub fn max<'a>(&self, a: &'a Temporal, b: &'a Temporal) -> &'a Temporal {
        if self.is_before(a, b) {
            b
        } else {
            a
        }
    }

    fn key(&self, value: &Temporal) -> NaiveDateTime {
        match self.unit {
            ComparisonUnit::Seconds => truncate_to_seconds(value.to_utc(&self.default_zone).naive_utc()),
            ComparisonUnit::Days => self.civil_date(value).and_time(NaiveTime::MIN),
        }
    }

    fn civil_date(&self, value: &Temporal) -> NaiveDate {
        match value {
            Temporal::Date(date) => *date,
            Temporal::Floating(local) => local.date(),
            Temporal::Utc(dt) => dt.with_timezone(&self.default_zone).date_naive(),
            Temporal::Zoned(dt) => dt
                .with_timezone(&Utc)
                .with_timezone(&self.default_zone)
                .date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Temporal {
        Temporal::parse(s).unwrap()
    }

    #[test]
    fn floating_reads_in_default_zone() {
        let ny: Tz = "America/New_York".parse().unwrap();
        let cmp = TemporalComparator::new(ny);
        // 09:00 New York (EST) is 14:00 UTC.
        assert!(cmp.equal(&t("20240115T090000"), &t("20240115T140000Z")));
        assert!(TemporalComparator::default().is_before(&t("20240115T090000"), &t("20240115T140000Z")));
    }

    #[test]
    fn date_reads_as_midnight() {
        let cmp = TemporalComparator::default();
        assert!(cmp.equal(&t("20240115"), &t("20240115T000000Z")));
        assert!(cmp.is_before(&t("20240115"), &t("20240115T000001")));
    }

    #[test]
    fn day_unit_ignores_time_of_day() {
        let cmp = TemporalComparator::with_unit(Tz::UTC, ComparisonUnit::Days);
        assert!(cmp.equal(&t("20240115"), &t("20240115T235959Z")));
        assert!(cmp.is_after(&t("20240116T000000"), &t("20240115")));
    }

    #[test]
    fn seed_comparator_follows_seed() {
        let zoned = Temporal::parse_in_zone("20240115T090000", "Europe/Paris".parse().unwrap()).unwrap();
        let cmp = TemporalComparator::for_seed(&zoned);
        assert_eq!(cmp.default_zone().name(), "Europe/Paris");
        assert_eq!(cmp.unit(), ComparisonUnit::Seconds);
        assert_eq!(TemporalComparator::for_seed(&t("20240115")).unit(), ComparisonUnit::Days);
    }
}
