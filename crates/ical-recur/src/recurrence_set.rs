//! Recurrence sets: DTSTART, RRULE, RDATE, EXDATE and EXRULE combined into
//! the concrete instances of a component (RFC 5545 §3.8.5).

use std::cmp::Ordering;

use crate::amount::Amount;
use crate::comparator::TemporalComparator;
use crate::error::Result;
use crate::period::Period;
use crate::period_list::PeriodList;
use crate::recur::Recur;
use crate::temporal::Temporal;

/// An RDATE value: a single date/date-time or an explicit period.
#[derive(Debug, Clone, PartialEq)]
pub enum RDate {
    Instant(Temporal),
    Period(Period),
}

impl From<Temporal> for RDate {
    fn from(value: Temporal) -> Self {
        RDate::Instant(value)
    }
}

impl From<Period> for RDate {
    fn from(value: Period) -> Self {
        RDate::Period(value)
    }
}

/// The recurrence-relevant properties of a VEVENT, VTODO or VJOURNAL.
#[derive(Debug, Clone)]
pub struct RecurringComponent {
    dtstart: Temporal,
    dtend: Option<Temporal>,
    due: Option<Temporal>,
    duration: Option<Amount>,
    rdates: Vec<RDate>,
    rrules: Vec<Recur>,
    exdates: Vec<Temporal>,
    exrules: Vec<Recur>,
}

impl RecurringComponent {
    pub fn new(dtstart: Temporal) -> Self {
        Self {
            dtstart,
            dtend: None,
            due: None,
            duration: None,
            rdates: Vec::new(),
            rrules: Vec::new(),
            exdates: Vec::new(),
            exrules: Vec::new(),
        }
    }

    pub fn with_end(mut self, dtend: Temporal) -> Self {
        self.dtend = Some(dtend);
        self
    }

    pub fn with_due(mut self, due: Temporal) -> Self {
        self.due = Some(due);
        self
    }

    pub fn with_duration(mut self, duration: Amount) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_rdate(mut self, rdate: impl Into<RDate>) -> Self {
        self.rdates.push(rdate.into());
        self
    }

    pub fn with_rrule(mut self, rule: Recur) -> Self {
        self.rrules.push(rule);
        self
    }

    pub fn with_exdate(mut self, exdate: Temporal) -> Self {
        self.exdates.push(exdate);
        self
    }

    pub fn with_exrule(mut self, rule: Recur) -> Self {
        self.exrules.push(rule);
        self
    }

    pub fn dtstart(&self) -> &Temporal {
        &self.dtstart
    }

    /// DURATION if present, else DTEND − DTSTART, else DUE − DTSTART, else
    /// zero.
    pub fn effective_duration(&self) -> Amount {
        if let Some(duration) = self.duration {
            return duration;
        }
        self.dtend
            .as_ref()
            .or(self.due.as_ref())
            .map_or_else(
                || Amount::zero_for(&self.dtstart),
                |end| Amount::between(&self.dtstart, end),
            )
    }

    /// Instances of this component overlapping `period`.
    ///
    /// RDATE periods are kept when they intersect the window, RDATE instants
    /// when they fall inside it. RRULE occurrences are searched from one
    /// duration before the window so instances already in progress are
    /// found. Without an RRULE, the DTSTART instance counts when it
    /// intersects the window. EXDATE and EXRULE matches are then removed by
    /// start time.
    ///
    /// # Errors
    /// Fails only when an instance end cannot be represented.
    pub fn calculate_recurrence_set(&self, period: &Period) -> Result<PeriodList> {
        let duration = self.effective_duration();
        let mut set = PeriodList::new();

        for rdate in &self.rdates {
            match rdate {
                RDate::Period(rdate) if period.intersects(rdate) => {
                    set.insert(rdate.clone());
                }
                RDate::Instant(start) if period.includes(start) => {
                    set.insert(Period::with_duration(start.clone(), duration)?);
                }
                _ => {}
            }
        }

        let search_start = period.start().minus(&duration)?;
        if self.rrules.is_empty() {
            let first = match &self.dtend {
                Some(end) if self.duration.is_none() => Period::new(self.dtstart.clone(), end.clone())?,
                _ => Period::with_duration(self.dtstart.clone(), duration)?,
            };
            if period.intersects(&first) {
                set.insert(first);
            }
        } else {
            for rule in &self.rrules {
                for start in rule.dates(&self.dtstart, &search_start, period.end(), None) {
                    set.insert(Period::with_duration(start, duration)?);
                }
            }
        }

        if !self.exdates.is_empty() {
            set.retain(|instance| !self.exdates.iter().any(|ex| excludes(ex, instance.start())));
        }
        if !self.exrules.is_empty() {
            let excluded: Vec<Temporal> = self
                .exrules
                .iter()
                .flat_map(|rule| rule.dates(&self.dtstart, &search_start, period.end(), None))
                .collect();
            set.retain(|instance| !excluded.iter().any(|ex| excludes(ex, instance.start())));
        }

        tracing::debug!(
            dtstart = %self.dtstart,
            window = %period,
            instances = set.len(),
            "calculated recurrence set"
        );
        Ok(set)
    }
}

/// EXDATE dates match any instance starting on that civil date; date-times
/// match the exact start.
fn excludes(exclusion: &Temporal, start: &Temporal) -> bool {
    match exclusion {
        Temporal::Date(date) => start.date() == *date,
        _ => TemporalComparator::for_seed(start).compare(exclusion, start) == Ordering::Equal,
    }
}
