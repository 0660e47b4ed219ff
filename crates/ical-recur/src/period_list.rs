//! Ordered sets of periods with union, subtraction and normalisation.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{RecurError, Result};
use crate::period::Period;

/// A sorted, duplicate-free set of periods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodList {
    periods: BTreeSet<Period>,
}

impl PeriodList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, period: Period) -> bool {
        self.periods.insert(period)
    }

    pub fn remove(&mut self, period: &Period) -> bool {
        self.periods.remove(period)
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Period> {
        self.periods.iter()
    }

    pub fn first(&self) -> Option<&Period> {
        self.periods.first()
    }

    pub fn retain(&mut self, keep: impl FnMut(&Period) -> bool) {
        self.periods.retain(keep);
    }

    /// Merge overlapping, adjacent and contained periods and drop empty ones.
    ///
    /// Date periods pass through untouched. Returns a clone when nothing
    /// merges.
    pub fn normalise(&self) -> PeriodList {
        let mut normalised = PeriodList::new();
        let mut previous: Option<Period> = None;
        let mut merged = false;

        for period in &self.periods {
            if !period.is_date_time_precision() {
                normalised.insert(period.clone());
                continue;
            }
            previous = if period.is_empty() {
                merged = true;
                previous
            } else {
                match previous {
                    Some(prev) if prev.contains(period) => {
                        merged = true;
                        Some(prev)
                    }
                    Some(prev) if prev.intersects(period) || prev.adjacent(period) => {
                        merged = true;
                        Some(prev.add(Some(period)))
                    }
                    Some(prev) => {
                        normalised.insert(prev);
                        Some(period.clone())
                    }
                    None => Some(period.clone()),
                }
            };
        }
        if let Some(prev) = previous {
            normalised.insert(prev);
        }

        if merged {
            normalised
        } else {
            self.clone()
        }
    }

    /// Union followed by normalisation.
    pub fn add(&self, other: &PeriodList) -> PeriodList {
        let mut union = self.clone();
        union.periods.extend(other.periods.iter().cloned());
        union.normalise()
    }

    /// Remove every period of `subtractions` from every member, one
    /// subtraction at a time. A date period equal to a subtraction is removed
    /// outright.
    pub fn subtract(&self, subtractions: &PeriodList) -> PeriodList {
        let mut result = self.clone();
        for subtraction in &subtractions.periods {
            let mut next = PeriodList::new();
            for period in &result.periods {
                if !period.is_date_time_precision() && period == subtraction {
                    continue;
                }
                next.periods.extend(period.subtract(subtraction).periods);
            }
            result = next;
        }
        result
    }
}

impl FromIterator<Period> for PeriodList {
    fn from_iter<I: IntoIterator<Item = Period>>(iter: I) -> Self {
        Self {
            periods: iter.into_iter().collect(),
        }
    }
}

impl Extend<Period> for PeriodList {
    fn extend<I: IntoIterator<Item = Period>>(&mut self, iter: I) {
        self.periods.extend(iter);
    }
}

impl From<Period> for PeriodList {
    fn from(period: Period) -> Self {
        std::iter::once(period).collect()
    }
}

impl IntoIterator for PeriodList {
    type Item = Period;
    type IntoIter = btree_set::IntoIter<Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.into_iter()
    }
}

impl<'a> IntoIterator for &'a PeriodList {
    type Item = &'a Period;
    type IntoIter = btree_set::Iter<'a, Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}

impl fmt::Display for PeriodList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, period) in self.periods.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{period}")?;
        }
        Ok(())
    }
}

impl FromStr for PeriodList {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl Serialize for PeriodList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.periods)
    }
}
