//! RECUR values (RFC 5545 §3.3.10, with the RFC 7529 RSCALE/SKIP extension).
//!
//! A [`Recur`] is parsed from or built into an immutable rule. Expansion lives
//! in [`transform`] (one step of the BYxxx pipeline per rule part) and
//! [`iter`] (walking frequency increments from a seed).

pub mod iter;
pub mod transform;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::RecurConfig;
use crate::error::{RecurError, Result};
use crate::temporal::Temporal;

pub use iter::Occurrences;

/// FREQ values, from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Secondly => "SECONDLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Hourly => "HOURLY",
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SECONDLY" => Ok(Frequency::Secondly),
            "MINUTELY" => Ok(Frequency::Minutely),
            "HOURLY" => Ok(Frequency::Hourly),
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(RecurError::InvalidRule(format!("unknown FREQ '{other}'"))),
        }
    }
}

/// Two-letter iCalendar weekday code.
pub fn day_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Parse a two-letter iCalendar weekday code.
pub fn parse_day(code: &str) -> Result<Weekday> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(RecurError::InvalidRule(format!("unknown weekday '{other}'"))),
    }
}

/// A BYDAY entry: a weekday with an optional ordinal (`-1FR`, `2MO`).
///
/// An offset of zero means every such weekday in the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekDay {
    day: Weekday,
    offset: i32,
}

impl WeekDay {
    pub fn new(day: Weekday, offset: i32) -> Self {
        Self { day, offset }
    }

    pub fn every(day: Weekday) -> Self {
        Self::new(day, 0)
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset != 0 {
            write!(f, "{}", self.offset)?;
        }
        f.write_str(day_code(self.day))
    }
}

impl FromStr for WeekDay {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s.len().saturating_sub(2);
        let (offset, code) = s
            .is_char_boundary(split)
            .then(|| s.split_at(split))
            .ok_or_else(|| RecurError::InvalidRule(format!("invalid BYDAY value '{s}'")))?;
        let offset = if offset.is_empty() {
            0
        } else {
            offset
                .parse()
                .map_err(|_| RecurError::InvalidRule(format!("invalid BYDAY value '{s}'")))?
        };
        Ok(Self::new(parse_day(code)?, offset))
    }
}

/// RFC 7529 SKIP: what to do with a generated date that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Skip {
    #[default]
    Omit,
    Backward,
    Forward,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Skip::Omit => "OMIT",
            Skip::Backward => "BACKWARD",
            Skip::Forward => "FORWARD",
        })
    }
}

impl FromStr for Skip {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OMIT" => Ok(Skip::Omit),
            "BACKWARD" => Ok(Skip::Backward),
            "FORWARD" => Ok(Skip::Forward),
            other => Err(RecurError::InvalidRule(format!("unknown SKIP '{other}'"))),
        }
    }
}

/// RFC 7529 RSCALE calendar systems.
///
/// Only scales sharing the ISO month and week structure are accepted; their
/// year numbering differs but recurrence arithmetic does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RScale {
    Gregorian,
    Iso8601,
    Japanese,
    Buddhist,
    Roc,
}

impl RScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            RScale::Gregorian => "GREGORIAN",
            RScale::Iso8601 => "ISO8601",
            RScale::Japanese => "JAPANESE",
            RScale::Buddhist => "BUDDHIST",
            RScale::Roc => "ROC",
        }
    }

    pub fn months_in_year(&self) -> i64 {
        12
    }

    pub fn max_month_days(&self) -> i64 {
        31
    }

    pub fn max_year_days(&self) -> i64 {
        366
    }

    pub fn max_weeks(&self) -> i64 {
        53
    }
}

impl fmt::Display for RScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RScale {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GREGORIAN" => Ok(RScale::Gregorian),
            "ISO8601" => Ok(RScale::Iso8601),
            "JAPANESE" => Ok(RScale::Japanese),
            "BUDDHIST" => Ok(RScale::Buddhist),
            "ROC" => Ok(RScale::Roc),
            other => Err(RecurError::UnsupportedScale(other.to_string())),
        }
    }
}

/// An immutable recurrence rule.
///
/// Equality covers every rule part. The configuration the rule was built with
/// is not part of its identity.
#[derive(Debug, Clone)]
pub struct Recur {
    frequency: Frequency,
    interval: Option<u32>,
    count: Option<u32>,
    until: Option<Temporal>,
    week_start: Option<Weekday>,
    rscale: Option<RScale>,
    skip: Option<Skip>,
    month_list: Vec<u32>,
    week_no_list: Vec<i32>,
    year_day_list: Vec<i32>,
    month_day_list: Vec<i32>,
    day_list: Vec<WeekDay>,
    hour_list: Vec<u32>,
    minute_list: Vec<u32>,
    second_list: Vec<u32>,
    set_pos_list: Vec<i32>,
    experimental_values: BTreeMap<String, String>,
    config: RecurConfig,
}

impl PartialEq for Recur {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency
            && self.interval == other.interval
            && self.count == other.count
            && self.until == other.until
            && self.week_start == other.week_start
            && self.rscale == other.rscale
            && self.skip == other.skip
            && self.month_list == other.month_list
            && self.week_no_list == other.week_no_list
            && self.year_day_list == other.year_day_list
            && self.month_day_list == other.month_day_list
            && self.day_list == other.day_list
            && self.hour_list == other.hour_list
            && self.minute_list == other.minute_list
            && self.second_list == other.second_list
            && self.set_pos_list == other.set_pos_list
            && self.experimental_values == other.experimental_values
    }
}

impl Eq for Recur {}

impl Recur {
    pub fn builder() -> RecurBuilder {
        RecurBuilder::default()
    }

    /// Parse with the default configuration.
    ///
    /// # Errors
    /// See [`Recur::parse_with`].
    pub fn parse(value: &str) -> Result<Self> {
        Self::parse_with(value, &RecurConfig::default())
    }

    /// Parse `FREQ=...;BYxxx=...` text, with or without an `RRULE:` or
    /// `EXRULE:` prefix. Keys are case-insensitive, empty tokens are ignored,
    /// and a repeated COUNT or UNTIL replaces the earlier terminator.
    ///
    /// # Errors
    /// - [`RecurError::InvalidRule`] for a missing FREQ, malformed tokens, or
    ///   unknown parts when `config.tolerate_unknown_parts` is off
    /// - [`RecurError::OutOfRange`] for BYxxx values outside their range
    /// - [`RecurError::UnsupportedScale`] for an unknown RSCALE
    /// - [`RecurError::InvalidTemporal`] for a malformed UNTIL
    pub fn parse_with(value: &str, config: &RecurConfig) -> Result<Self> {
        let value = value.trim();
        let body = ["RRULE:", "EXRULE:"]
            .iter()
            .find_map(|prefix| {
                value
                    .get(..prefix.len())
                    .filter(|head| head.eq_ignore_ascii_case(prefix))
                    .map(|_| &value[prefix.len()..])
            })
            .unwrap_or(value);

        let mut builder = RecurBuilder::default().config(config.clone());
        for token in body.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let (key, val) = token
                .split_once('=')
                .ok_or_else(|| RecurError::InvalidRule(format!("expected NAME=VALUE, got '{token}'")))?;
            let key = key.trim().to_ascii_uppercase();
            builder = match key.as_str() {
                "FREQ" => builder.frequency(val.parse()?),
                "UNTIL" => builder.until(Temporal::parse_with(val.trim(), config.relaxed_parsing)?),
                "COUNT" => builder.count(parse_number("COUNT", val)?),
                "INTERVAL" => builder.interval(parse_number("INTERVAL", val)?),
                "WKST" => builder.week_start(parse_day(val)?),
                "RSCALE" => builder.rscale(val.parse()?),
                "SKIP" => builder.skip(val.parse()?),
                "BYSECOND" => builder.second_list(parse_list("BYSECOND", val)?),
                "BYMINUTE" => builder.minute_list(parse_list("BYMINUTE", val)?),
                "BYHOUR" => builder.hour_list(parse_list("BYHOUR", val)?),
                "BYDAY" => builder.day_list(parse_list("BYDAY", val)?),
                "BYMONTHDAY" => builder.month_day_list(parse_list("BYMONTHDAY", val)?),
                "BYYEARDAY" => builder.year_day_list(parse_list("BYYEARDAY", val)?),
                "BYWEEKNO" => builder.week_no_list(parse_list("BYWEEKNO", val)?),
                "BYMONTH" => builder.month_list(parse_months(val)?),
                "BYSETPOS" => builder.set_pos_list(parse_list("BYSETPOS", val)?),
                name if name.starts_with("X-") => builder.experimental_value(name, val),
                name if config.tolerate_unknown_parts => {
                    tracing::debug!(part = name, value = val, "keeping unrecognised rule part");
                    builder.experimental_value(name, val)
                }
                name => {
                    return Err(RecurError::InvalidRule(format!("unrecognised rule part '{name}'")));
                }
            };
        }
        builder.build()
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// INTERVAL as written; `None` when absent.
    pub fn interval(&self) -> Option<u32> {
        self.interval
    }

    /// INTERVAL, defaulting to 1.
    pub fn effective_interval(&self) -> u32 {
        self.interval.unwrap_or(1)
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn until(&self) -> Option<&Temporal> {
        self.until.as_ref()
    }

    pub fn week_start(&self) -> Option<Weekday> {
        self.week_start
    }

    /// WKST, defaulting to Monday.
    pub fn effective_week_start(&self) -> Weekday {
        self.week_start.unwrap_or(Weekday::Mon)
    }

    pub fn rscale(&self) -> Option<RScale> {
        self.rscale
    }

    pub fn skip(&self) -> Option<Skip> {
        self.skip
    }

    pub fn month_list(&self) -> &[u32] {
        &self.month_list
    }

    pub fn week_no_list(&self) -> &[i32] {
        &self.week_no_list
    }

    pub fn year_day_list(&self) -> &[i32] {
        &self.year_day_list
    }

    pub fn month_day_list(&self) -> &[i32] {
        &self.month_day_list
    }

    pub fn day_list(&self) -> &[WeekDay] {
        &self.day_list
    }

    pub fn hour_list(&self) -> &[u32] {
        &self.hour_list
    }

    pub fn minute_list(&self) -> &[u32] {
        &self.minute_list
    }

    pub fn second_list(&self) -> &[u32] {
        &self.second_list
    }

    pub fn set_pos_list(&self) -> &[i32] {
        &self.set_pos_list
    }

    pub fn experimental_values(&self) -> &BTreeMap<String, String> {
        &self.experimental_values
    }

    pub fn config(&self) -> &RecurConfig {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        let scale = self.rscale.unwrap_or(RScale::Gregorian);
        check_unsigned("BYSECOND", &self.second_list, 0, 60)?;
        check_unsigned("BYMINUTE", &self.minute_list, 0, 59)?;
        check_unsigned("BYHOUR", &self.hour_list, 0, 23)?;
        check_unsigned("BYMONTH", &self.month_list, 1, scale.months_in_year())?;
        check_signed("BYMONTHDAY", &self.month_day_list, scale.max_month_days())?;
        check_signed("BYYEARDAY", &self.year_day_list, scale.max_year_days())?;
        check_signed("BYWEEKNO", &self.week_no_list, scale.max_weeks())?;
        check_signed("BYSETPOS", &self.set_pos_list, scale.max_year_days())?;
        let offsets: Vec<i32> = self
            .day_list
            .iter()
            .map(WeekDay::offset)
            .filter(|offset| *offset != 0)
            .collect();
        check_signed("BYDAY", &offsets, scale.max_weeks())?;
        if let Some(interval) = self.interval {
            check_unsigned("INTERVAL", &[interval], 1, i64::from(u32::MAX))?;
        }
        if let Some(count) = self.count {
            check_unsigned("COUNT", &[count], 1, i64::from(u32::MAX))?;
        }
        if self.skip.is_some() && self.rscale.is_none() {
            return Err(RecurError::InvalidRule("SKIP requires RSCALE".into()));
        }
        Ok(())
    }
}

fn check_unsigned(part: &'static str, values: &[u32], min: i64, max: i64) -> Result<()> {
    match values.iter().map(|v| i64::from(*v)).find(|v| *v < min || *v > max) {
        Some(value) => Err(RecurError::OutOfRange {
            part,
            value,
            range: format!("{min}..={max}"),
        }),
        None => Ok(()),
    }
}

fn check_signed(part: &'static str, values: &[i32], max: i64) -> Result<()> {
    match values
        .iter()
        .map(|v| i64::from(*v))
        .find(|v| *v == 0 || v.abs() > max)
    {
        Some(value) => Err(RecurError::OutOfRange {
            part,
            value,
            range: format!("-{max}..=-1 or 1..={max}"),
        }),
        None => Ok(()),
    }
}

fn parse_number(part: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| RecurError::InvalidRule(format!("{part}: invalid number '{value}'")))
}

fn parse_list<T: FromStr>(part: &str, value: &str) -> Result<Vec<T>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse()
                .map_err(|_| RecurError::InvalidRule(format!("{part}: invalid value '{item}'")))
        })
        .collect()
}

/// BYMONTH values. Leap months (`5L`) only exist in lunisolar scales.
fn parse_months(value: &str) -> Result<Vec<u32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.strip_suffix(['L', 'l']) {
            Some(month) => Err(RecurError::OutOfRange {
                part: "BYMONTH",
                value: month.parse().unwrap_or(0),
                range: "no leap months in supported scales".into(),
            }),
            None => parse_number("BYMONTH", item),
        })
        .collect()
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Recur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(rscale) = self.rscale {
            parts.push(format!("RSCALE={rscale}"));
        }
        parts.push(format!("FREQ={}", self.frequency));
        if let Some(week_start) = self.week_start {
            parts.push(format!("WKST={}", day_code(week_start)));
        }
        if let Some(until) = &self.until {
            parts.push(format!("UNTIL={until}"));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(interval) = self.interval {
            parts.push(format!("INTERVAL={interval}"));
        }
        let lists = [
            ("BYMONTH", join(&self.month_list)),
            ("BYWEEKNO", join(&self.week_no_list)),
            ("BYYEARDAY", join(&self.year_day_list)),
            ("BYMONTHDAY", join(&self.month_day_list)),
            ("BYDAY", join(&self.day_list)),
            ("BYHOUR", join(&self.hour_list)),
            ("BYMINUTE", join(&self.minute_list)),
            ("BYSECOND", join(&self.second_list)),
            ("BYSETPOS", join(&self.set_pos_list)),
        ];
        for (name, values) in lists {
            if !values.is_empty() {
                parts.push(format!("{name}={values}"));
            }
        }
        if let Some(skip) = self.skip {
            parts.push(format!("SKIP={skip}"));
        }
        for (name, value) in &self.experimental_values {
            parts.push(format!("{name}={value}"));
        }
        f.write_str(&parts.join(";"))
    }
}

impl FromStr for Recur {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self> {
        Recur::parse(s)
    }
}

impl Serialize for Recur {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Recur {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Fluent construction of a [`Recur`].
///
/// COUNT and UNTIL are mutually exclusive: setting one clears the other.
#[derive(Debug, Clone, Default)]
pub struct RecurBuilder {
    frequency: Option<Frequency>,
    interval: Option<u32>,
    count: Option<u32>,
    until: Option<Temporal>,
    week_start: Option<Weekday>,
    rscale: Option<RScale>,
    skip: Option<Skip>,
    month_list: Vec<u32>,
    week_no_list: Vec<i32>,
    year_day_list: Vec<i32>,
    month_day_list: Vec<i32>,
    day_list: Vec<WeekDay>,
    hour_list: Vec<u32>,
    minute_list: Vec<u32>,
    second_list: Vec<u32>,
    set_pos_list: Vec<i32>,
    experimental_values: BTreeMap<String, String>,
    config: RecurConfig,
}

impl RecurBuilder {
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self.until = None;
        self
    }

    /// A zoned UNTIL is stored as its UTC instant, the only zoned form the
    /// rule text can carry.
    pub fn until(mut self, until: Temporal) -> Self {
        self.until = Some(match until {
            Temporal::Zoned(dt) => Temporal::Utc(dt.with_timezone(&Utc)),
            other => other,
        });
        self.count = None;
        self
    }

    pub fn week_start(mut self, day: Weekday) -> Self {
        self.week_start = Some(day);
        self
    }

    pub fn rscale(mut self, rscale: RScale) -> Self {
        self.rscale = Some(rscale);
        self
    }

    pub fn skip(mut self, skip: Skip) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn month_list(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.month_list = months.into_iter().collect();
        self
    }

    pub fn week_no_list(mut self, weeks: impl IntoIterator<Item = i32>) -> Self {
        self.week_no_list = weeks.into_iter().collect();
        self
    }

    pub fn year_day_list(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.year_day_list = days.into_iter().collect();
        self
    }

    pub fn month_day_list(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.month_day_list = days.into_iter().collect();
        self
    }

    pub fn day_list(mut self, days: impl IntoIterator<Item = WeekDay>) -> Self {
        self.day_list = days.into_iter().collect();
        self
    }

    pub fn hour_list(mut self, hours: impl IntoIterator<Item = u32>) -> Self {
        self.hour_list = hours.into_iter().collect();
        self
    }

    pub fn minute_list(mut self, minutes: impl IntoIterator<Item = u32>) -> Self {
        self.minute_list = minutes.into_iter().collect();
        self
    }

    pub fn second_list(mut self, seconds: impl IntoIterator<Item = u32>) -> Self {
        self.second_list = seconds.into_iter().collect();
        self
    }

    pub fn set_pos_list(mut self, positions: impl IntoIterator<Item = i32>) -> Self {
        self.set_pos_list = positions.into_iter().collect();
        self
    }

    pub fn experimental_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.experimental_values.insert(name.into(), value.into());
        self
    }

    pub fn config(mut self, config: RecurConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    /// [`RecurError::InvalidRule`] without a frequency, or any range error
    /// listed on [`Recur::parse_with`].
    pub fn build(self) -> Result<Recur> {
        let frequency = self
            .frequency
            .ok_or_else(|| RecurError::InvalidRule("FREQ is required".into()))?;
        let recur = Recur {
            frequency,
            interval: self.interval,
            count: self.count,
            until: self.until,
            week_start: self.week_start,
            rscale: self.rscale,
            skip: self.skip,
            month_list: self.month_list,
            week_no_list: self.week_no_list,
            year_day_list: self.year_day_list,
            month_day_list: self.month_day_list,
            day_list: self.day_list,
            hour_list: self.hour_list,
            minute_list: self.minute_list,
            second_list: self.second_list,
            set_pos_list: self.set_pos_list,
            experimental_values: self.experimental_values,
            config: self.config,
        };
        recur.validate()?;
        Ok(recur)
    }
}

impl From<&Recur> for RecurBuilder {
    fn from(recur: &Recur) -> Self {
        Self {
            frequency: Some(recur.frequency),
            interval: recur.interval,
            count: recur.count,
            until: recur.until.clone(),
            week_start: recur.week_start,
            rscale: recur.rscale,
            skip: recur.skip,
            month_list: recur.month_list.clone(),
            week_no_list: recur.week_no_list.clone(),
            year_day_list: recur.year_day_list.clone(),
            month_day_list: recur.month_day_list.clone(),
            day_list: recur.day_list.clone(),
            hour_list: recur.hour_list.clone(),
            minute_list: recur.minute_list.clone(),
            second_list: recur.second_list.clone(),
            set_pos_list: recur.set_pos_list.clone(),
            experimental_values: recur.experimental_values.clone(),
            config: recur.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_with_offsets() {
        assert_eq!("-1FR".parse::<WeekDay>().unwrap(), WeekDay::new(Weekday::Fri, -1));
        assert_eq!("+2mo".parse::<WeekDay>().unwrap(), WeekDay::new(Weekday::Mon, 2));
        assert_eq!("SU".parse::<WeekDay>().unwrap(), WeekDay::every(Weekday::Sun));
        assert_eq!(WeekDay::new(Weekday::Tue, 3).to_string(), "3TU");
        assert!("X".parse::<WeekDay>().is_err());
        assert!("1XX".parse::<WeekDay>().is_err());
    }

    #[test]
    fn frequencies_order_finest_first() {
        assert!(Frequency::Secondly < Frequency::Daily);
        assert!(Frequency::Monthly < Frequency::Yearly);
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
    }

    #[test]
    fn signed_range_excludes_zero() {
        assert!(check_signed("BYMONTHDAY", &[0], 31).is_err());
        assert!(check_signed("BYMONTHDAY", &[-31, 31], 31).is_ok());
        assert!(check_signed("BYMONTHDAY", &[32], 31).is_err());
    }

    #[test]
    fn builder_from_rule_round_trips() {
        let recur = Recur::parse("FREQ=MONTHLY;BYDAY=-1FR;COUNT=3").unwrap();
        let rebuilt = RecurBuilder::from(&recur).build().unwrap();
        assert_eq!(rebuilt, recur);
        let changed = RecurBuilder::from(&recur)
            .until(Temporal::parse("20250101").unwrap())
            .build()
            .unwrap();
        assert_eq!(changed.count(), None);
    }
}
