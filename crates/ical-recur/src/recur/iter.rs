//! Walking a rule from its seed.
//!
//! Every increment moves the seed forward by `k × INTERVAL` frequency units
//! (computed from the seed each time, so month-end clamping never
//! accumulates) and runs the BYxxx pipeline on the result. [`Occurrences`]
//! yields the surviving candidates lazily, in ascending order.
//!
//! Sub-daily rules on a zoned seed step in UTC instead, so an hour repeated
//! by a fall-back transition is walked twice and a skipped one not at all.

use std::collections::VecDeque;

use chrono::{
    Datelike, FixedOffset, LocalResult, Months, NaiveDateTime, Offset, TimeDelta, TimeZone,
};
use chrono_tz::Tz;

use super::{Frequency, Recur};
use crate::comparator::TemporalComparator;
use crate::period::Period;
use crate::temporal::Temporal;

impl Recur {
    /// Occurrences of this rule seeded at `seed` that fall in `[start, end]`,
    /// at most `max_count` of them (`None` for no limit).
    pub fn dates(
        &self,
        seed: &Temporal,
        start: &Temporal,
        end: &Temporal,
        max_count: Option<usize>,
    ) -> Vec<Temporal> {
        let occurrences = self.iter(seed, start, end);
        match max_count {
            Some(limit) => occurrences.take(limit).collect(),
            None => occurrences.collect(),
        }
    }

    /// [`Recur::dates`] over the bounds of `period`.
    pub fn dates_in(&self, seed: &Temporal, period: &Period, max_count: Option<usize>) -> Vec<Temporal> {
        self.dates(seed, period.start(), period.end(), max_count)
    }

    /// Lazy occurrences in `[start, end]`.
    pub fn iter(&self, seed: &Temporal, start: &Temporal, end: &Temporal) -> Occurrences<'_> {
        Occurrences::new(self, seed, Some(start.clone()), Some(end.clone()))
    }

    /// Lazy occurrences from `seed` on, with no window. Unbounded rules
    /// produce an unbounded iterator.
    pub fn occurrences(&self, seed: &Temporal) -> Occurrences<'_> {
        Occurrences::new(self, seed, None, None)
    }

    /// The first occurrence strictly after `after`, if the rule has one.
    pub fn next_date(&self, seed: &Temporal, after: &Temporal) -> Option<Temporal> {
        let cmp = TemporalComparator::for_seed(seed);
        Occurrences::new(self, seed, Some(after.clone()), None).find(|date| cmp.is_after(date, after))
    }

    /// Candidates for the single increment starting at `period_seed`, sorted
    /// and before any window, COUNT or UNTIL filtering.
    pub fn candidates(&self, root_seed: &Temporal, period_seed: &Temporal) -> Vec<Temporal> {
        let period = period_seed.civil_in_frame_of(root_seed);
        let offset = match (period_seed, root_seed) {
            (Temporal::Zoned(dt), Temporal::Zoned(_)) if self.frequency < Frequency::Daily => {
                Some(dt.offset().fix())
            }
            _ => None,
        };
        self.wrap_candidates(root_seed, period, offset)
    }

    /// `offset` picks between the two readings of a civil time repeated by a
    /// fall-back transition; without it the policy's choice stands.
    fn wrap_candidates(
        &self,
        root_seed: &Temporal,
        period: NaiveDateTime,
        offset: Option<FixedOffset>,
    ) -> Vec<Temporal> {
        let civil = self.expand_civil(
            root_seed.naive_local(),
            period,
            !root_seed.is_date_time_precision(),
        );
        let cmp = TemporalComparator::for_seed(root_seed);
        let mut candidates: Vec<Temporal> = civil
            .into_iter()
            .filter_map(|local| self.resolve(root_seed, local, offset))
            .collect();
        candidates.sort_by(|a, b| cmp.compare(a, b));
        candidates.dedup_by(|a, b| cmp.equal(a, b));
        candidates
    }

    fn resolve(
        &self,
        root_seed: &Temporal,
        local: NaiveDateTime,
        offset: Option<FixedOffset>,
    ) -> Option<Temporal> {
        if let (Some(offset), Temporal::Zoned(seed)) = (offset, root_seed) {
            let zone = seed.timezone();
            if let LocalResult::Ambiguous(earlier, later) = zone.from_local_datetime(&local) {
                let chosen = if later.offset().fix() == offset { later } else { earlier };
                return Some(Temporal::Zoned(chosen));
            }
        }
        root_seed.with_civil(local, self.config.dst_policy)
    }

    /// The zone to step through in UTC, for sub-daily rules on a zoned seed.
    fn utc_walk_zone(&self, seed: &Temporal) -> Option<Tz> {
        match seed {
            Temporal::Zoned(dt) if self.frequency < Frequency::Daily => Some(dt.timezone()),
            _ => None,
        }
    }

    /// The seed moved forward by `k` intervals, in the frame it was given in.
    fn period_seed(&self, seed: NaiveDateTime, k: u64) -> Option<NaiveDateTime> {
        let steps = i64::try_from(k.checked_mul(u64::from(self.effective_interval()))?).ok()?;
        let delta = match self.frequency {
            Frequency::Secondly => TimeDelta::try_seconds(steps)?,
            Frequency::Minutely => TimeDelta::try_minutes(steps)?,
            Frequency::Hourly => TimeDelta::try_hours(steps)?,
            Frequency::Daily => TimeDelta::try_days(steps)?,
            Frequency::Weekly => TimeDelta::try_weeks(steps)?,
            Frequency::Monthly => {
                return seed.checked_add_months(Months::new(u32::try_from(steps).ok()?));
            }
            Frequency::Yearly => {
                let months = u32::try_from(steps.checked_mul(12)?).ok()?;
                return seed.checked_add_months(Months::new(months));
            }
        };
        seed.checked_add_signed(delta)
    }

    /// Number of increments that can be skipped outright because their
    /// successor still starts before `target`.
    fn increments_before(&self, seed: NaiveDateTime, target: NaiveDateTime) -> u64 {
        if target <= seed {
            return 0;
        }
        let elapsed = target - seed;
        let months = i64::from(target.year() - seed.year()) * 12 + i64::from(target.month())
            - i64::from(seed.month());
        let units = match self.frequency {
            Frequency::Secondly => elapsed.num_seconds(),
            Frequency::Minutely => elapsed.num_minutes(),
            Frequency::Hourly => elapsed.num_hours(),
            Frequency::Daily => elapsed.num_days(),
            Frequency::Weekly => elapsed.num_weeks(),
            Frequency::Monthly => months,
            Frequency::Yearly => months / 12,
        };
        let mut k = u64::try_from(units / i64::from(self.effective_interval()) - 2).unwrap_or(0);
        while self
            .period_seed(seed, k + 1)
            .is_some_and(|next| next < target)
        {
            k += 1;
        }
        k
    }

    fn exceeds_until(&self, candidate: &Temporal, cmp: &TemporalComparator) -> bool {
        match &self.until {
            None => false,
            Some(Temporal::Date(until)) => candidate.date() > *until,
            Some(until) => cmp.is_after(candidate, until),
        }
    }
}

/// Lazy, ascending occurrences of a rule.
///
/// Built by [`Recur::iter`] and friends. Not restartable: each call starts a
/// fresh walk from the seed.
#[derive(Debug)]
pub struct Occurrences<'a> {
    recur: &'a Recur,
    seed: Temporal,
    seed_civil: NaiveDateTime,
    /// Set when `seed_civil` and the increments are UTC rather than civil.
    utc_walk: Option<Tz>,
    start: Option<Temporal>,
    end: Option<Temporal>,
    cmp: TemporalComparator,
    increment: u64,
    buffer: VecDeque<Temporal>,
    /// Occurrences consumed toward COUNT, including out-of-window ones.
    counted: u64,
    empty_increments: u32,
    last_candidate: Option<Temporal>,
    /// Latest candidate counted toward COUNT; nothing at or before it is
    /// counted again.
    last_counted: Option<Temporal>,
    done: bool,
}

impl<'a> Occurrences<'a> {
    fn new(recur: &'a Recur, seed: &Temporal, start: Option<Temporal>, end: Option<Temporal>) -> Self {
        let utc_walk = recur.utc_walk_zone(seed);
        let frame = |value: &Temporal| match utc_walk {
            Some(zone) => value.to_utc(&zone).naive_utc(),
            None => value.civil_in_frame_of(seed),
        };
        let seed_civil = frame(seed);
        let increment = match (&start, recur.count) {
            (Some(start), None) => recur.increments_before(seed_civil, frame(start)),
            _ => 0,
        };
        Self {
            recur,
            seed: seed.clone(),
            seed_civil,
            utc_walk,
            start,
            end,
            cmp: TemporalComparator::for_seed(seed),
            increment,
            buffer: VecDeque::new(),
            counted: 0,
            empty_increments: 0,
            last_candidate: None,
            last_counted: None,
            done: false,
        }
    }

    fn count_reached(&self) -> bool {
        self.recur
            .count
            .is_some_and(|count| self.counted >= u64::from(count))
    }

    fn past_end(&self, candidate: &Temporal) -> bool {
        self.end
            .as_ref()
            .is_some_and(|end| self.cmp.is_after(candidate, end))
    }

    fn before_start(&self, candidate: &Temporal) -> bool {
        self.start
            .as_ref()
            .is_some_and(|start| self.cmp.is_before(candidate, start))
    }

    /// Expand one increment into the buffer, or mark the walk finished.
    fn advance(&mut self) {
        if let Some(last) = &self.last_candidate {
            if self.recur.exceeds_until(last, &self.cmp) || self.past_end(last) {
                self.done = true;
                return;
            }
        }
        if self.count_reached() {
            self.done = true;
            return;
        }
        let Some(period) = self.recur.period_seed(self.seed_civil, self.increment) else {
            self.done = true;
            return;
        };
        self.increment += 1;

        let (period, offset) = match self.utc_walk {
            Some(zone) => {
                let local = zone.from_utc_datetime(&period);
                (local.naive_local(), Some(local.offset().fix()))
            }
            None => (period, None),
        };
        let candidates = self.recur.wrap_candidates(&self.seed, period, offset);
        tracing::trace!(
            increment = self.increment,
            period = %period,
            candidates = candidates.len(),
            "expanded recurrence increment"
        );
        if candidates.is_empty() {
            self.empty_increments += 1;
            if let Some(limit) = self.recur.config.increment_guard() {
                if self.empty_increments >= limit {
                    tracing::debug!(
                        rule = %self.recur,
                        limit,
                        "no candidates in consecutive increments; stopping expansion"
                    );
                    self.done = true;
                }
            }
            return;
        }
        self.empty_increments = 0;

        for candidate in candidates {
            self.last_candidate = Some(candidate.clone());
            if self.cmp.is_before(&candidate, &self.seed) {
                continue;
            }
            if let Some(last) = &self.last_counted {
                if !self.cmp.is_after(&candidate, last) {
                    continue;
                }
            }
            if self.before_start(&candidate) || self.past_end(&candidate) {
                self.counted += 1;
                self.last_counted = Some(candidate);
                continue;
            }
            if self.count_reached() {
                break;
            }
            if !self.recur.exceeds_until(&candidate, &self.cmp) {
                self.counted += 1;
                self.last_counted = Some(candidate.clone());
                self.buffer.push_back(candidate);
            }
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(date) = self.buffer.pop_front() {
                return Some(date);
            }
            if self.done {
                return None;
            }
            self.advance();
        }
    }
}
