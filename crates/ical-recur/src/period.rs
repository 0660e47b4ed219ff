//! PERIOD values: a start and either an end or a duration.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::amount::Amount;
use crate::comparator::TemporalComparator;
use crate::error::{RecurError, Result};
use crate::period_list::PeriodList;
use crate::temporal::Temporal;

/// A span of time with inclusive bounds.
///
/// When built from a duration the end is computed eagerly and the duration is
/// kept for formatting; otherwise the duration is derived on demand.
#[derive(Debug, Clone)]
pub struct Period {
    start: Temporal,
    end: Temporal,
    duration: Option<Amount>,
}

impl Period {
    /// # Errors
    /// Returns [`RecurError::InvalidPeriod`] if `end` is before `start`.
    pub fn new(start: Temporal, end: Temporal) -> Result<Self> {
        if comparator_for(&start).is_before(&end, &start) {
            return Err(RecurError::InvalidPeriod(format!("{end} is before {start}")));
        }
        Ok(Self::span(start, end))
    }

    /// # Errors
    /// Returns [`RecurError::InvalidPeriod`] for negative durations.
    pub fn with_duration(start: Temporal, duration: Amount) -> Result<Self> {
        if duration.is_negative() {
            return Err(RecurError::InvalidPeriod(format!("negative duration {duration}")));
        }
        let end = start.plus(&duration)?;
        Ok(Self {
            start,
            end,
            duration: Some(duration),
        })
    }

    /// Parse `start/end` or `start/duration` and bind floating times to `zone`.
    pub fn parse_in_zone(value: &str, zone: Tz) -> Result<Self> {
        let period = value.parse::<Period>()?;
        Ok(Self {
            start: period.start.in_zone(zone),
            end: period.end.in_zone(zone),
            duration: period.duration,
        })
    }

    pub(crate) fn span(start: Temporal, end: Temporal) -> Self {
        Self {
            start,
            end,
            duration: None,
        }
    }

    pub fn start(&self) -> &Temporal {
        &self.start
    }

    pub fn end(&self) -> &Temporal {
        &self.end
    }

    /// The duration this period was built with, or the one between its
    /// bounds.
    pub fn duration(&self) -> Amount {
        self.duration
            .unwrap_or_else(|| Amount::between(&self.start, &self.end))
    }

    pub fn is_date_time_precision(&self) -> bool {
        self.start.is_date_time_precision()
    }

    /// Zero length. Date periods are empty when both bounds fall on the same
    /// day.
    pub fn is_empty(&self) -> bool {
        if self.is_date_time_precision() {
            self.comparator().equal(&self.start, &self.end)
        } else {
            self.start.date() == self.end.date()
        }
    }

    /// `instant` equals a bound or falls strictly between them.
    pub fn includes(&self, instant: &Temporal) -> bool {
        let cmp = self.comparator();
        !cmp.is_before(instant, &self.start) && !cmp.is_after(instant, &self.end)
    }

    /// Equal periods, or strictly overlapping ones. Periods that merely touch
    /// do not intersect.
    pub fn intersects(&self, other: &Period) -> bool {
        let cmp = self.comparator();
        (cmp.equal(&self.start, &other.start) && cmp.equal(&self.end, &other.end))
            || (cmp.is_before(&self.start, &other.end) && cmp.is_before(&other.start, &self.end))
    }

    pub fn contains(&self, other: &Period) -> bool {
        let cmp = self.comparator();
        !cmp.is_after(&self.start, &other.start) && !cmp.is_before(&self.end, &other.end)
    }

    /// One period ends exactly where the other starts.
    pub fn adjacent(&self, other: &Period) -> bool {
        let cmp = self.comparator();
        cmp.equal(&self.end, &other.start) || cmp.equal(&other.end, &self.start)
    }

    /// Smallest period covering both; `None` returns a copy of `self`.
    pub fn add(&self, other: Option<&Period>) -> Period {
        let Some(other) = other else {
            return self.clone();
        };
        let cmp = self.comparator();
        Period::span(
            cmp.min(&self.start, &other.start).clone(),
            cmp.max(&self.end, &other.end).clone(),
        )
    }

    /// The parts of `self` not covered by `other`.
    ///
    /// Date periods and disjoint periods come back unchanged.
    pub fn subtract(&self, other: &Period) -> PeriodList {
        let mut result = PeriodList::new();
        if !self.is_date_time_precision() || !self.intersects(other) {
            result.insert(self.clone());
            return result;
        }
        if other.contains(self) {
            return result;
        }
        let cmp = self.comparator();
        if !cmp.is_after(&other.start, &self.start) {
            result.insert(Period::span(other.end.clone(), self.end.clone()));
        } else if !cmp.is_before(&other.end, &self.end) {
            result.insert(Period::span(self.start.clone(), other.start.clone()));
        } else {
            result.insert(Period::span(self.start.clone(), other.start.clone()));
            result.insert(Period::span(other.end.clone(), self.end.clone()));
        }
        result
    }

    fn comparator(&self) -> TemporalComparator {
        comparator_for(&self.start)
    }
}

fn comparator_for(start: &Temporal) -> TemporalComparator {
    TemporalComparator::new(start.zone().unwrap_or(Tz::UTC))
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
            .then_with(|| self.duration().cmp(&other.duration()))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(Ord::cmp(self, other))
    }
}

impl PartialEq for Period {
    fn eq(&self, other: &Self) -> bool {
        Ord::cmp(self, other) == Ordering::Equal
    }
}

impl Eq for Period {}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.duration {
            Some(duration) => write!(f, "{}/{}", self.start, duration.to_string_with_seed(&self.start)),
            None => write!(f, "{}/{}", self.start, self.end),
        }
    }
}

impl FromStr for Period {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, rest) = s
            .split_once('/')
            .ok_or_else(|| RecurError::InvalidPeriod(format!("missing '/' in '{s}'")))?;
        let start = Temporal::parse(start)?;
        let is_duration = rest.trim_start_matches(['+', '-']).starts_with('P');
        if is_duration {
            Period::with_duration(start, Amount::parse(rest)?)
        } else {
            Period::new(start, Temporal::parse(rest)?)
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn duration_form_keeps_duration_for_display() {
        let period = p("20240101T090000Z/PT1H30M");
        assert_eq!(period.end().to_string(), "20240101T103000Z");
        assert_eq!(period.to_string(), "20240101T090000Z/PT1H30M");
    }

    #[test]
    fn derived_duration_is_exact() {
        let period = p("20240101T090000Z/20240101T100000Z");
        assert_eq!(period.duration().to_string(), "PT1H");
    }

    #[test]
    fn ordering_breaks_ties_on_end() {
        let short = p("20240101T090000Z/20240101T100000Z");
        let long = p("20240101T090000Z/20240101T110000Z");
        assert!(short < long);
    }
}
