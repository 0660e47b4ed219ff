//! DURATION values.
//!
//! RFC 5545 durations come in two flavours that behave differently under
//! arithmetic: nominal calendar amounts (`P1D`, `P2W`, and the ISO 8601
//! `P1Y2M` forms) move civil fields, while amounts with a time component
//! (`PT1H30M`, `P1DT12H`) are elapsed time. [`Amount`] keeps them apart.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, TimeDelta};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::error::{RecurError, Result};
use crate::temporal::{add_calendar, Temporal};

const SECONDS_PER_DAY: i64 = 86_400;

/// A calendar amount of years, months and days, all sharing one sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CalendarPeriod {
    years: i32,
    months: i32,
    days: i32,
}

impl CalendarPeriod {
    /// # Errors
    /// Returns [`RecurError::InvalidDuration`] when the components disagree
    /// in sign.
    pub fn new(years: i32, months: i32, days: i32) -> Result<Self> {
        let positive = years > 0 || months > 0 || days > 0;
        let negative = years < 0 || months < 0 || days < 0;
        if positive && negative {
            return Err(RecurError::InvalidDuration(format!(
                "mixed signs in {years}Y{months}M{days}D"
            )));
        }
        Ok(Self { years, months, days })
    }

    pub fn of_days(days: i32) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn years(&self) -> i32 {
        self.years
    }

    pub fn months(&self) -> i32 {
        self.months
    }

    pub fn days(&self) -> i32 {
        self.days
    }

    pub(crate) fn total_months(&self) -> i64 {
        i64::from(self.years) * 12 + i64::from(self.months)
    }

    pub fn is_negative(&self) -> bool {
        self.years < 0 || self.months < 0 || self.days < 0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    pub fn negated(&self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            days: -self.days,
        }
    }
}

/// A DURATION: nominal calendar amount or exact elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Amount {
    Calendar(CalendarPeriod),
    Exact(TimeDelta),
}

impl Amount {
    /// Parse the calendar grammar `[+-]P[nY][nM][nW][nD]` first, then the
    /// time-bearing grammar `[+-]P[nD][T[nH][nM][nS]]`.
    ///
    /// # Errors
    /// Returns [`RecurError::InvalidDuration`] if neither grammar matches.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || RecurError::InvalidDuration(value.to_string());
        let (negative, rest) = match value.as_bytes().first() {
            Some(b'-') => (true, &value[1..]),
            Some(b'+') => (false, &value[1..]),
            _ => (false, value),
        };
        let body = rest.strip_prefix('P').ok_or_else(invalid)?;
        if body.is_empty() {
            return Err(invalid());
        }
        let sign = if negative { -1 } else { 1 };

        if let Some([years, months, weeks, days]) = components(body, "YMWD") {
            let days = weeks
                .checked_mul(7)
                .and_then(|w| w.checked_add(days))
                .ok_or_else(invalid)?;
            let narrow = |n: i64| i32::try_from(n * sign).map_err(|_| invalid());
            return Ok(Amount::Calendar(CalendarPeriod {
                years: narrow(years)?,
                months: narrow(months)?,
                days: narrow(days)?,
            }));
        }

        let (date_part, time_part) = match body.split_once('T') {
            Some((_, "")) => return Err(invalid()),
            Some((date, time)) => (date, time),
            None => (body, ""),
        };
        let [days] = components(date_part, "D").ok_or_else(invalid)?;
        let [hours, minutes, seconds] = components(time_part, "HMS").ok_or_else(invalid)?;
        let total = days
            .checked_mul(SECONDS_PER_DAY)
            .and_then(|d| d.checked_add(hours.checked_mul(3600)?))
            .and_then(|d| d.checked_add(minutes.checked_mul(60)?))
            .and_then(|d| d.checked_add(seconds))
            .ok_or_else(invalid)?;
        TimeDelta::try_seconds(total * sign)
            .map(Amount::Exact)
            .ok_or_else(invalid)
    }

    /// The zero amount matching `temporal`'s precision.
    pub fn zero_for(temporal: &Temporal) -> Self {
        if temporal.is_date_time_precision() {
            Amount::Exact(TimeDelta::zero())
        } else {
            Amount::Calendar(CalendarPeriod::default())
        }
    }

    /// The amount separating two temporals: whole days between two dates,
    /// exact elapsed time otherwise.
    pub fn between(start: &Temporal, end: &Temporal) -> Self {
        if let (Temporal::Date(from), Temporal::Date(to)) = (start, end) {
            let days = (*to - *from).num_days();
            return Amount::Calendar(CalendarPeriod::of_days(
                i32::try_from(days).unwrap_or(if days < 0 { i32::MIN } else { i32::MAX }),
            ));
        }
        let zone = start.zone().or_else(|| end.zone()).unwrap_or(Tz::UTC);
        Amount::Exact(end.to_utc(&zone) - start.to_utc(&zone))
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Amount::Calendar(period) => period.is_negative(),
            Amount::Exact(delta) => *delta < TimeDelta::zero(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Amount::Calendar(period) => period.is_zero(),
            Amount::Exact(delta) => delta.is_zero(),
        }
    }

    pub fn negated(&self) -> Self {
        match self {
            Amount::Calendar(period) => Amount::Calendar(period.negated()),
            Amount::Exact(delta) => Amount::Exact(-*delta),
        }
    }

    /// Render relative to `seed`.
    ///
    /// Calendar amounts with years or months have no fixed length, so they are
    /// measured from `seed` in days. Day counts divisible by seven render as
    /// weeks.
    pub fn to_string_with_seed(&self, seed: &Temporal) -> String {
        let mut out = String::new();
        if self.is_negative() {
            out.push('-');
        }
        out.push('P');
        match self.abs() {
            Amount::Calendar(period) => {
                let days = if period.years != 0 || period.months != 0 {
                    add_calendar(seed.naive_local(), &period)
                        .map_or(0, |end| (end - seed.naive_local()).num_days())
                } else {
                    i64::from(period.days)
                };
                if days != 0 && days % 7 == 0 {
                    out.push_str(&format!("{}W", days / 7));
                } else {
                    out.push_str(&format!("{days}D"));
                }
            }
            Amount::Exact(delta) => {
                let total = delta.num_seconds();
                let (days, rem) = (total / SECONDS_PER_DAY, total % SECONDS_PER_DAY);
                if total == 0 {
                    out.push_str("T0S");
                } else if rem == 0 && days % 7 == 0 {
                    out.push_str(&format!("{}W", days / 7));
                } else {
                    if days > 0 {
                        out.push_str(&format!("{days}D"));
                    }
                    if rem > 0 {
                        out.push('T');
                        let (hours, minutes, seconds) = (rem / 3600, rem % 3600 / 60, rem % 60);
                        if hours > 0 {
                            out.push_str(&format!("{hours}H"));
                        }
                        if minutes > 0 {
                            out.push_str(&format!("{minutes}M"));
                        }
                        if seconds > 0 {
                            out.push_str(&format!("{seconds}S"));
                        }
                    }
                }
            }
        }
        out
    }

    fn abs(&self) -> Self {
        if self.is_negative() {
            self.negated()
        } else {
            *self
        }
    }

    /// Seed used by [`Display`](fmt::Display).
    fn display_seed() -> Temporal {
        Temporal::Date(NaiveDate::default())
    }
}

/// Split `body` into numbers tagged by `designators`, in that order, each at
/// most once. Returns `None` on any other character.
fn components<const N: usize>(body: &str, designators: &str) -> Option<[i64; N]> {
    let mut values = [0i64; N];
    let mut next = 0;
    let mut digits = String::new();
    for c in body.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if digits.is_empty() {
            return None;
        }
        let slot = designators[next..].find(c)? + next;
        values[slot] = digits.parse().ok()?;
        digits.clear();
        next = slot + 1;
    }
    digits.is_empty().then_some(values)
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        let magnitude = match (self.abs(), other.abs()) {
            (Amount::Calendar(a), Amount::Calendar(b)) => {
                (a.years, a.months, a.days).cmp(&(b.years, b.months, b.days))
            }
            (Amount::Exact(a), Amount::Exact(b)) => a.cmp(&b),
            (Amount::Calendar(_), Amount::Exact(_)) => Ordering::Greater,
            (Amount::Exact(_), Amount::Calendar(_)) => Ordering::Less,
        };
        if self.is_negative() {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_seed(&Self::display_seed()))
    }
}

impl FromStr for Amount {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        Amount::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<TimeDelta> for Amount {
    fn from(delta: TimeDelta) -> Self {
        Amount::Exact(delta)
    }
}

impl From<CalendarPeriod> for Amount {
    fn from(period: CalendarPeriod) -> Self {
        Amount::Calendar(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_respect_designator_order() {
        assert_eq!(components::<4>("1Y2M3W4D", "YMWD"), Some([1, 2, 3, 4]));
        assert_eq!(components::<4>("2D", "YMWD"), Some([0, 0, 0, 2]));
        assert_eq!(components::<4>("2D1Y", "YMWD"), None);
        assert_eq!(components::<4>("Y", "YMWD"), None);
        assert_eq!(components::<4>("12", "YMWD"), None);
        assert_eq!(components::<3>("", "HMS"), Some([0, 0, 0]));
    }

    #[test]
    fn mixed_sign_calendar_is_rejected() {
        assert!(CalendarPeriod::new(1, -1, 0).is_err());
        assert!(CalendarPeriod::new(-1, -2, 0).is_ok());
    }

    #[test]
    fn display_seed_is_epoch() {
        assert_eq!(Amount::display_seed().to_string(), "19700101");
    }
}
