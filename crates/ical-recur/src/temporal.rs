//! Temporal values: the four shapes an iCalendar DATE / DATE-TIME can take.
//!
//! A [`Temporal`] is one of
//!
//! - [`Temporal::Date`] — a calendar date with no time (`19970714`)
//! - [`Temporal::Floating`] — local civil time with no zone (`19970714T133000`)
//! - [`Temporal::Utc`] — an absolute instant (`19970714T173000Z`)
//! - [`Temporal::Zoned`] — local civil time bound to an IANA zone (`TZID=...`)
//!
//! Values are immutable. Parsing is eager; there is no cached state.
//!
//! Ordering across variants goes through the instant each value denotes, with
//! floating values and dates read as UTC. Callers that need a different
//! reading of floating time use [`TemporalComparator`](crate::TemporalComparator).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::format::{self, Fixed, Item, Numeric, Pad, Parsed};
use chrono::{
    DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

use crate::amount::{Amount, CalendarPeriod};
use crate::dst::DstPolicy;
use crate::error::{RecurError, Result};

pub(crate) const DATE_FORMAT: &str = "%Y%m%d";
pub(crate) const FLOATING_FORMAT: &str = "%Y%m%dT%H%M%S";
pub(crate) const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const MINUTE_FORMAT: &str = "%Y%m%dT%H%M";

const DATE_FIELDS: [(Numeric, usize); 3] =
    [(Numeric::Year, 4), (Numeric::Month, 2), (Numeric::Day, 2)];
const TIME_FIELDS: [(Numeric, usize); 3] =
    [(Numeric::Hour, 2), (Numeric::Minute, 2), (Numeric::Second, 2)];

/// A DATE or DATE-TIME value in one of its four representations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Temporal {
    Date(NaiveDate),
    Floating(NaiveDateTime),
    Utc(DateTime<Utc>),
    Zoned(DateTime<Tz>),
}

/// Resolve an IANA zone identifier.
///
/// # Errors
/// Returns [`RecurError::InvalidTimezone`] for unknown identifiers.
pub fn parse_zone(id: &str) -> Result<Tz> {
    id.trim()
        .parse::<Tz>()
        .map_err(|_| RecurError::InvalidTimezone(id.to_string()))
}

impl Temporal {
    /// Parse using the best matching pattern: UTC, numeric offset, floating,
    /// then date. Values with a numeric offset become UTC instants.
    ///
    /// # Errors
    /// Returns [`RecurError::InvalidTemporal`] with the position where
    /// matching failed.
    pub fn parse(value: &str) -> Result<Self> {
        Self::parse_with(value, false)
    }

    /// Parse like [`Temporal::parse`]; when `relaxed` is set and strict
    /// matching fails, accept minute-precision times and ignore trailing data.
    pub fn parse_with(value: &str, relaxed: bool) -> Result<Self> {
        match parse_strict(value) {
            Ok(parsed) => Ok(parsed),
            Err(err) if relaxed => match parse_loose(value) {
                Some(parsed) => {
                    tracing::debug!(value, parsed = %parsed, "accepted date-time in relaxed mode");
                    Ok(parsed)
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    /// Parse a floating date-time and bind it to `zone`.
    ///
    /// Dates stay dates and UTC values stay UTC: only local civil time takes a
    /// zone. Local times inside a DST gap move forward by the gap length.
    pub fn parse_in_zone(value: &str, zone: Tz) -> Result<Self> {
        Ok(Self::parse(value)?.in_zone(zone))
    }

    /// Bind a floating value to `zone`; other variants are returned unchanged.
    pub fn in_zone(self, zone: Tz) -> Self {
        match self {
            Temporal::Floating(local) => DstPolicy::ShiftForward
                .resolve(&zone, local)
                .map_or(Temporal::Floating(local), Temporal::Zoned),
            other => other,
        }
    }

    /// Canonical string form. Zoned values render their local civil time; the
    /// zone itself travels separately as a TZID.
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Render as seen from `zone`.
    ///
    /// Floating values never take an offset, UTC values always carry `Z`, and
    /// dates always use the eight-digit form.
    pub fn format_in_zone(&self, zone: Tz) -> String {
        match self {
            Temporal::Zoned(dt) => dt.with_timezone(&zone).format(FLOATING_FORMAT).to_string(),
            other => other.to_string(),
        }
    }

    /// True for dates and floating date-times.
    pub fn is_floating(&self) -> bool {
        matches!(self, Temporal::Date(_) | Temporal::Floating(_))
    }

    /// True for UTC instants and values zoned in UTC itself.
    pub fn is_utc(&self) -> bool {
        match self {
            Temporal::Utc(_) => true,
            Temporal::Zoned(dt) => matches!(dt.timezone(), Tz::UTC | Tz::Etc__UTC | Tz::Etc__Zulu),
            _ => false,
        }
    }

    pub fn is_date_time_precision(&self) -> bool {
        !matches!(self, Temporal::Date(_))
    }

    /// The zone of a zoned value.
    pub fn zone(&self) -> Option<Tz> {
        match self {
            Temporal::Zoned(dt) => Some(dt.timezone()),
            _ => None,
        }
    }

    /// Civil date: local for zoned values, UTC for instants.
    pub fn date(&self) -> NaiveDate {
        self.naive_local().date()
    }

    /// Civil date-time in the value's own frame; dates read as midnight.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Temporal::Date(date) => date.and_time(NaiveTime::MIN),
            Temporal::Floating(local) => *local,
            Temporal::Utc(dt) => dt.naive_utc(),
            Temporal::Zoned(dt) => dt.naive_local(),
        }
    }

    /// The instant this value denotes, reading dates and floating values in
    /// `default_zone`.
    pub fn to_utc(&self, default_zone: &Tz) -> DateTime<Utc> {
        match self {
            Temporal::Utc(dt) => *dt,
            Temporal::Zoned(dt) => dt.with_timezone(&Utc),
            floating => DstPolicy::ShiftForward
                .resolve(default_zone, floating.naive_local())
                .map_or_else(
                    || floating.naive_local().and_utc(),
                    |dt| dt.with_timezone(&Utc),
                ),
        }
    }

    /// Express this value as civil time in the frame of `seed`.
    pub(crate) fn civil_in_frame_of(&self, seed: &Temporal) -> NaiveDateTime {
        match seed {
            Temporal::Date(_) => self.date().and_time(NaiveTime::MIN),
            Temporal::Floating(_) => self.naive_local(),
            Temporal::Utc(_) => self.to_utc(&Tz::UTC).naive_utc(),
            Temporal::Zoned(seed_dt) => {
                let zone = seed_dt.timezone();
                self.to_utc(&zone).with_timezone(&zone).naive_local()
            }
        }
    }

    /// Rebuild a value of the same kind as `self` from civil time.
    ///
    /// Returns `None` when a zoned value lands in a DST gap and `policy`
    /// drops such times.
    pub(crate) fn with_civil(&self, local: NaiveDateTime, policy: DstPolicy) -> Option<Temporal> {
        match self {
            Temporal::Date(_) => Some(Temporal::Date(local.date())),
            Temporal::Floating(_) => Some(Temporal::Floating(local)),
            Temporal::Utc(_) => Some(Temporal::Utc(local.and_utc())),
            Temporal::Zoned(dt) => policy.resolve(&dt.timezone(), local).map(Temporal::Zoned),
        }
    }

    /// Add an amount.
    ///
    /// Calendar amounts move civil fields (zoned values are re-resolved in
    /// their zone); exact amounts add elapsed time. Dates only take the whole
    /// days of an exact amount.
    ///
    /// # Errors
    /// Returns [`RecurError::InvalidDuration`] if the result leaves chrono's
    /// representable range.
    pub fn plus(&self, amount: &Amount) -> Result<Temporal> {
        let overflow = || RecurError::InvalidDuration(format!("{self} + {amount} is out of range"));
        match amount {
            Amount::Calendar(period) => {
                let local = add_calendar(self.naive_local(), period).ok_or_else(overflow)?;
                match self {
                    Temporal::Zoned(dt) => Ok(Temporal::Zoned(
                        DstPolicy::ShiftForward
                            .resolve(&dt.timezone(), local)
                            .ok_or_else(overflow)?,
                    )),
                    other => other.with_civil(local, DstPolicy::ShiftForward).ok_or_else(overflow),
                }
            }
            Amount::Exact(delta) => match self {
                Temporal::Date(date) => TimeDelta::try_days(delta.num_days())
                    .and_then(|days| date.checked_add_signed(days))
                    .map(Temporal::Date)
                    .ok_or_else(overflow),
                Temporal::Floating(local) => local
                    .checked_add_signed(*delta)
                    .map(Temporal::Floating)
                    .ok_or_else(overflow),
                Temporal::Utc(dt) => dt
                    .checked_add_signed(*delta)
                    .map(Temporal::Utc)
                    .ok_or_else(overflow),
                Temporal::Zoned(dt) => dt
                    .clone()
                    .checked_add_signed(*delta)
                    .map(Temporal::Zoned)
                    .ok_or_else(overflow),
            },
        }
    }

    /// Subtract an amount; see [`Temporal::plus`].
    pub fn minus(&self, amount: &Amount) -> Result<Temporal> {
        self.plus(&amount.negated())
    }

    fn rank(&self) -> u8 {
        match self {
            Temporal::Date(_) => 0,
            Temporal::Floating(_) => 1,
            Temporal::Utc(_) => 2,
            Temporal::Zoned(_) => 3,
        }
    }
}

/// Apply the months and days of a calendar period to civil time.
pub(crate) fn add_calendar(local: NaiveDateTime, period: &CalendarPeriod) -> Option<NaiveDateTime> {
    let months = period.total_months();
    let shifted = if months >= 0 {
        local.checked_add_months(Months::new(u32::try_from(months).ok()?))?
    } else {
        local.checked_sub_months(Months::new(u32::try_from(-months).ok()?))?
    };
    shifted.checked_add_signed(TimeDelta::try_days(i64::from(period.days()))?)
}

impl Ord for Temporal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_utc(&Tz::UTC)
            .cmp(&other.to_utc(&Tz::UTC))
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

impl PartialOrd for Temporal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Temporal::Floating(local) => write!(f, "{}", local.format(FLOATING_FORMAT)),
            Temporal::Utc(dt) => write!(f, "{}", dt.format(UTC_FORMAT)),
            Temporal::Zoned(dt) => write!(f, "{}", dt.format(FLOATING_FORMAT)),
        }
    }
}

impl FromStr for Temporal {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        Temporal::parse(s)
    }
}

impl Serialize for Temporal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<NaiveDate> for Temporal {
    fn from(date: NaiveDate) -> Self {
        Temporal::Date(date)
    }
}

impl From<NaiveDateTime> for Temporal {
    fn from(local: NaiveDateTime) -> Self {
        Temporal::Floating(local)
    }
}

impl From<DateTime<Utc>> for Temporal {
    fn from(dt: DateTime<Utc>) -> Self {
        Temporal::Utc(dt)
    }
}

impl From<DateTime<Tz>> for Temporal {
    fn from(dt: DateTime<Tz>) -> Self {
        Temporal::Zoned(dt)
    }
}

// ── parsing ─────────────────────────────────────────────────────────────────

fn invalid(value: &str, position: usize) -> RecurError {
    RecurError::InvalidTemporal {
        value: value.to_string(),
        position,
    }
}

fn parse_strict(value: &str) -> Result<Temporal> {
    let fail = |position| invalid(value, position);
    let mut parsed = Parsed::new();
    let rest = fixed_width(value, value, &mut parsed, &DATE_FIELDS).map_err(fail)?;
    let date = parsed.to_naive_date().map_err(|_| fail(6))?;
    let Some(time_part) = rest.strip_prefix('T') else {
        return if rest.is_empty() {
            Ok(Temporal::Date(date))
        } else {
            Err(fail(8))
        };
    };
    let rest = fixed_width(value, time_part, &mut parsed, &TIME_FIELDS).map_err(fail)?;
    let time = parsed
        .to_naive_time()
        .ok()
        .filter(|time| time.nanosecond() < 1_000_000_000)
        .ok_or_else(|| fail(13))?;
    let local = date.and_time(time);
    match rest {
        "" => Ok(Temporal::Floating(local)),
        "Z" => Ok(Temporal::Utc(local.and_utc())),
        _ if rest.starts_with('Z') => Err(fail(16)),
        _ => {
            let seconds = utc_offset(rest).ok_or_else(|| fail(15))?;
            local
                .checked_sub_signed(TimeDelta::seconds(i64::from(seconds)))
                .map(|utc| Temporal::Utc(utc.and_utc()))
                .ok_or_else(|| fail(15))
        }
    }
}

/// Parse `fields` from the start of `input` (a suffix of `value`) into
/// `parsed`. Each field must be exactly its width in ASCII digits.
///
/// Returns the unparsed remainder, or the position in `value` of the first
/// field that failed.
fn fixed_width<'a>(
    value: &str,
    mut input: &'a str,
    parsed: &mut Parsed,
    fields: &[(Numeric, usize)],
) -> std::result::Result<&'a str, usize> {
    for (numeric, width) in fields {
        let position = value.len() - input.len();
        let item = Item::Numeric(numeric.clone(), Pad::Zero);
        let rest = format::parse_and_remainder(parsed, input, std::iter::once(item))
            .map_err(|_| position)?;
        let taken = &input[..input.len() - rest.len()];
        if taken.len() != *width || !taken.bytes().all(|b| b.is_ascii_digit()) {
            return Err(position);
        }
        input = rest;
    }
    Ok(input)
}

/// `+hhmm` or `+hhmmss`, in seconds east of UTC.
fn utc_offset(suffix: &str) -> Option<i32> {
    let mut parsed = Parsed::new();
    let offset_item = [Item::Fixed(Fixed::TimezoneOffset)];
    let rest = format::parse_and_remainder(&mut parsed, suffix, offset_item.iter()).ok()?;
    if suffix.len() - rest.len() != 5 {
        return None;
    }
    let hours_minutes = parsed.offset()?.abs();
    let seconds = if rest.is_empty() {
        0
    } else {
        let mut extra = Parsed::new();
        let tail = fixed_width(rest, rest, &mut extra, &[(Numeric::Second, 2)]).ok()?;
        if !tail.is_empty() {
            return None;
        }
        i32::try_from(extra.second()?).ok()?
    };
    let total = hours_minutes + seconds;
    Some(if suffix.starts_with('-') { -total } else { total })
}

/// Fallbacks for relaxed mode: full or minute precision with anything after
/// it ignored (a leading `Z` still marks UTC), then a bare date prefix.
fn parse_loose(value: &str) -> Option<Temporal> {
    [FLOATING_FORMAT, MINUTE_FORMAT]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_and_remainder(value, format).ok())
        .map(|(local, rest)| {
            if rest.starts_with('Z') {
                Temporal::Utc(local.and_utc())
            } else {
                Temporal::Floating(local)
            }
        })
        .or_else(|| {
            NaiveDate::parse_and_remainder(value, DATE_FORMAT)
                .ok()
                .map(|(date, _)| Temporal::Date(date))
        })
}

/// Days in the month of `year`/`month`.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Days in `year`.
pub(crate) fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Civil time with seconds and sub-seconds dropped to whole seconds.
pub(crate) fn truncate_to_seconds(local: NaiveDateTime) -> NaiveDateTime {
    local.with_nanosecond(0).unwrap_or(local)
}
