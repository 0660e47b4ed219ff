//! The BYxxx pipeline.
//!
//! Each rule part is a [`Transformer`] over civil date-times that either
//! expands every input into several outputs or limits the inputs to those
//! matching. Which one depends on the frequency and on which other parts are
//! present (RFC 5545 §3.3.10, the table following "BYxxx rule parts").
//!
//! All arithmetic happens in the seed's civil frame; zones are attached by the
//! caller afterwards.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

use super::{Frequency, Recur, Skip, WeekDay};
use crate::temporal::{days_in_month, days_in_year};

/// One stage of candidate generation.
pub trait Transformer {
    fn transform(&self, dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime>;
}

impl Recur {
    /// Run the full pipeline for one frequency increment.
    ///
    /// `root` is the rule's seed (source of implicit BYMONTHDAY and BYDAY
    /// values); `period` is the seed moved forward by some number of
    /// intervals. Time-of-day parts are skipped when `date_only` is set.
    pub(crate) fn expand_civil(
        &self,
        root: NaiveDateTime,
        period: NaiveDateTime,
        date_only: bool,
    ) -> Vec<NaiveDateTime> {
        let frequency = self.frequency;
        let week_start = self.effective_week_start();
        let implicit_month_day;
        let month_days: &[i32] = if self.needs_implicit_month_day() {
            implicit_month_day = [root.day() as i32];
            &implicit_month_day
        } else {
            &self.month_day_list
        };
        let implicit_day;
        let days: &[WeekDay] = if self.needs_implicit_day() {
            implicit_day = [WeekDay::every(root.weekday())];
            &implicit_day
        } else {
            &self.day_list
        };

        let mut stages: Vec<Box<dyn Transformer + '_>> = Vec::new();
        if !self.month_list.is_empty() {
            stages.push(Box::new(ByMonthRule {
                months: &self.month_list,
                frequency,
            }));
        }
        if !self.week_no_list.is_empty() {
            stages.push(Box::new(ByWeekNoRule {
                weeks: &self.week_no_list,
                frequency,
                week_start,
                by_month: !self.month_list.is_empty(),
            }));
        }
        if !self.year_day_list.is_empty() {
            stages.push(Box::new(ByYearDayRule {
                days: &self.year_day_list,
                expand: frequency == Frequency::Yearly && self.week_no_list.is_empty(),
                by_month: !self.month_list.is_empty(),
            }));
        }
        if !month_days.is_empty() {
            let expand = matches!(frequency, Frequency::Monthly | Frequency::Yearly)
                && self.week_no_list.is_empty()
                && self.year_day_list.is_empty();
            stages.push(Box::new(ByMonthDayRule {
                days: month_days,
                expand,
                whole_year: frequency == Frequency::Yearly
                    && self.month_list.is_empty()
                    && !self.month_day_list.is_empty(),
                skip: self.skip.unwrap_or_default(),
            }));
        }
        if !days.is_empty() {
            stages.push(Box::new(ByDayRule {
                days,
                scope: self.day_scope(),
                week_start,
                months: &self.month_list,
            }));
        }
        if !date_only {
            let time_parts = [
                (TimeField::Hour, &self.hour_list, Frequency::Daily),
                (TimeField::Minute, &self.minute_list, Frequency::Hourly),
                (TimeField::Second, &self.second_list, Frequency::Minutely),
            ];
            for (field, values, expand_from) in time_parts {
                if !values.is_empty() {
                    stages.push(Box::new(TimeRule {
                        field,
                        values,
                        expand: frequency >= expand_from,
                    }));
                }
            }
        }

        let mut dates = stages
            .iter()
            .fold(vec![period], |dates, stage| sorted(stage.transform(dates)));
        dates = sorted(dates);
        if !self.set_pos_list.is_empty() {
            dates = BySetPosRule {
                positions: &self.set_pos_list,
            }
            .transform(dates);
        }
        dates
    }

    /// MONTHLY without BYDAY, or YEARLY with nothing else fixing the day,
    /// repeats on the seed's day of the month.
    fn needs_implicit_month_day(&self) -> bool {
        if !self.month_day_list.is_empty() {
            return false;
        }
        match self.frequency {
            Frequency::Monthly => self.day_list.is_empty(),
            Frequency::Yearly => {
                self.year_day_list.is_empty()
                    && self.week_no_list.is_empty()
                    && self.day_list.is_empty()
            }
            _ => false,
        }
    }

    /// WEEKLY, or YEARLY by week number, repeats on the seed's weekday.
    fn needs_implicit_day(&self) -> bool {
        if !self.day_list.is_empty() {
            return false;
        }
        match self.frequency {
            Frequency::Weekly => true,
            Frequency::Yearly => {
                !self.week_no_list.is_empty()
                    && self.year_day_list.is_empty()
                    && self.month_day_list.is_empty()
            }
            _ => false,
        }
    }

    fn day_scope(&self) -> DayScope {
        match self.frequency {
            Frequency::Secondly | Frequency::Minutely | Frequency::Hourly | Frequency::Daily => {
                DayScope::Weekday
            }
            Frequency::Weekly => DayScope::ExpandWeek,
            Frequency::Monthly if !self.month_day_list.is_empty() => DayScope::LimitMonth,
            Frequency::Monthly => DayScope::ExpandMonth,
            Frequency::Yearly => {
                if !self.year_day_list.is_empty() || !self.month_day_list.is_empty() {
                    if self.month_list.is_empty() {
                        DayScope::LimitYear
                    } else {
                        DayScope::LimitMonth
                    }
                } else if !self.week_no_list.is_empty() {
                    DayScope::Weekday
                } else if !self.month_list.is_empty() {
                    DayScope::ExpandMonth
                } else {
                    DayScope::ExpandYear
                }
            }
        }
    }
}

fn sorted(mut dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Zero-based position of `day` in a week starting on `week_start`.
fn week_position(day: Weekday, week_start: Weekday) -> i64 {
    i64::from((7 + day.num_days_from_monday() - week_start.num_days_from_monday()) % 7)
}

/// First day of week 1: the first week with at least four days in `year`.
fn first_week_start(year: i32, week_start: Weekday) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = week_position(jan1.weekday(), week_start);
    if offset <= 3 {
        jan1.checked_sub_signed(Duration::days(offset))
    } else {
        jan1.checked_add_signed(Duration::days(7 - offset))
    }
}

fn weeks_in_year(year: i32, week_start: Weekday) -> Option<i64> {
    let start = first_week_start(year, week_start)?;
    let next = first_week_start(year + 1, week_start)?;
    Some((next - start).num_days() / 7)
}

/// Week-numbering year and week number of `date`.
pub(crate) fn week_of(date: NaiveDate, week_start: Weekday) -> Option<(i32, i64)> {
    let year = date.year();
    let start = first_week_start(year, week_start)?;
    if date < start {
        let previous = first_week_start(year - 1, week_start)?;
        return Some((year - 1, (date - previous).num_days() / 7 + 1));
    }
    if date >= first_week_start(year + 1, week_start)? {
        return Some((year + 1, 1));
    }
    Some((year, (date - start).num_days() / 7 + 1))
}

fn matches_signed(list: &[i32], value: i64, length: i64) -> bool {
    list.iter()
        .map(|v| i64::from(*v))
        .any(|v| v == value || v == value - length - 1)
}

fn month_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = date.with_day(1)?;
    let last = date.with_day(days_in_month(date.year(), date.month()))?;
    Some((first, last))
}

fn year_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
        NaiveDate::from_ymd_opt(date.year(), 12, 31)?,
    ))
}

/// Dates matching `weekday` in `[first, last]`: all of them for a zero
/// offset, otherwise the nth from the start (or from the end when negative).
fn weekdays_between(first: NaiveDate, last: NaiveDate, weekday: &WeekDay) -> Vec<NaiveDate> {
    let lead = week_position(weekday.day(), first.weekday());
    let all: Vec<NaiveDate> = first
        .checked_add_signed(Duration::days(lead))
        .into_iter()
        .flat_map(|start| start.iter_weeks())
        .take_while(|date| *date <= last)
        .collect();
    match weekday.offset() {
        0 => all,
        n if n > 0 => all.get(n as usize - 1).copied().into_iter().collect(),
        n => all
            .len()
            .checked_sub(n.unsigned_abs() as usize)
            .and_then(|i| all.get(i).copied())
            .into_iter()
            .collect(),
    }
}

/// BYMONTH: expand across months for YEARLY, limit otherwise.
pub(crate) struct ByMonthRule<'a> {
    pub months: &'a [u32],
    pub frequency: Frequency,
}

impl Transformer for ByMonthRule<'_> {
    fn transform(&self, dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        if self.frequency != Frequency::Yearly {
            return dates
                .into_iter()
                .filter(|date| self.months.contains(&date.month()))
                .collect();
        }
        dates
            .into_iter()
            .flat_map(|date| {
                self.months.iter().filter_map(move |&month| {
                    let day = date.day().min(days_in_month(date.year(), month));
                    NaiveDate::from_ymd_opt(date.year(), month, day).map(|d| d.and_time(date.time()))
                })
            })
            .collect()
    }
}

/// BYWEEKNO: expand to every day of the listed weeks for YEARLY, limit
/// otherwise.
pub(crate) struct ByWeekNoRule<'a> {
    pub weeks: &'a [i32],
    pub frequency: Frequency,
    pub week_start: Weekday,
    /// Inputs stand for a month chosen by BYMONTH; keep only that month.
    pub by_month: bool,
}

impl ByWeekNoRule<'_> {
    fn matches(&self, date: NaiveDate) -> bool {
        week_of(date, self.week_start)
            .and_then(|(year, week)| Some((week, weeks_in_year(year, self.week_start)?)))
            .is_some_and(|(week, total)| matches_signed(self.weeks, week, total))
    }
}

impl Transformer for ByWeekNoRule<'_> {
    fn transform(&self, dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        if self.frequency != Frequency::Yearly {
            return dates.into_iter().filter(|d| self.matches(d.date())).collect();
        }
        let mut out = Vec::new();
        for input in dates {
            let Some((first, last)) = year_bounds(input.date()) else {
                continue;
            };
            out.extend(
                first
                    .iter_days()
                    .take_while(|day| *day <= last)
                    .filter(|day| !self.by_month || day.month() == input.month())
                    .filter(|day| self.matches(*day))
                    .map(|day| day.and_time(input.time())),
            );
        }
        out
    }
}

/// BYYEARDAY: expand for YEARLY (unless week numbers already fixed the day),
/// limit otherwise.
pub(crate) struct ByYearDayRule<'a> {
    pub days: &'a [i32],
    pub expand: bool,
    pub by_month: bool,
}

impl Transformer for ByYearDayRule<'_> {
    fn transform(&self, dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        if !self.expand {
            return dates
                .into_iter()
                .filter(|date| {
                    let length = i64::from(days_in_year(date.year()));
                    matches_signed(self.days, i64::from(date.ordinal()), length)
                })
                .collect();
        }
        let mut out = Vec::new();
        for input in dates {
            let year = input.year();
            let length = days_in_year(year) as i32;
            for &day in self.days {
                let ordinal = if day > 0 { day } else { length + day + 1 };
                let Some(date) = u32::try_from(ordinal)
                    .ok()
                    .and_then(|ordinal| NaiveDate::from_yo_opt(year, ordinal))
                else {
                    continue;
                };
                if !self.by_month || date.month() == input.month() {
                    out.push(date.and_time(input.time()));
                }
            }
        }
        out
    }
}

/// BYMONTHDAY: expand within the month for MONTHLY and YEARLY, limit
/// otherwise. Invalid days follow the SKIP policy.
pub(crate) struct ByMonthDayRule<'a> {
    pub days: &'a [i32],
    pub expand: bool,
    /// YEARLY without BYMONTH: every month of the year.
    pub whole_year: bool,
    pub skip: Skip,
}

impl ByMonthDayRule<'_> {
    fn resolve(&self, year: i32, month: u32, day: i32) -> Option<NaiveDate> {
        let length = days_in_month(year, month) as i32;
        let actual = if day > 0 { day } else { length + day + 1 };
        if (1..=length).contains(&actual) {
            return NaiveDate::from_ymd_opt(year, month, actual as u32);
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        match (self.skip, actual > length) {
            (Skip::Omit, _) => None,
            (Skip::Forward, true) => first.checked_add_months(chrono::Months::new(1)),
            (Skip::Forward, false) => Some(first),
            (Skip::Backward, true) => NaiveDate::from_ymd_opt(year, month, length as u32),
            (Skip::Backward, false) => first.pred_opt(),
        }
    }
}

impl Transformer for ByMonthDayRule<'_> {
    fn transform(&self, dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        if !self.expand {
            return dates
                .into_iter()
                .filter(|date| {
                    let length = i64::from(days_in_month(date.year(), date.month()));
                    matches_signed(self.days, i64::from(date.day()), length)
                })
                .collect();
        }
        let mut out = Vec::new();
        for input in dates {
            let months = if self.whole_year {
                1..=12
            } else {
                input.month()..=input.month()
            };
            for month in months {
                out.extend(
                    self.days
                        .iter()
                        .filter_map(|&day| self.resolve(input.year(), month, day))
                        .map(|date| date.and_time(input.time())),
                );
            }
        }
        out
    }
}

/// How BYDAY acts for a given frequency and set of sibling parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayScope {
    /// Keep inputs on a listed weekday; ordinals are ignored.
    Weekday,
    /// Keep inputs that are the nth such weekday of their month.
    LimitMonth,
    /// Keep inputs that are the nth such weekday of their year.
    LimitYear,
    ExpandWeek,
    ExpandMonth,
    ExpandYear,
}

pub(crate) struct ByDayRule<'a> {
    pub days: &'a [WeekDay],
    pub scope: DayScope,
    pub week_start: Weekday,
    /// BYMONTH values; weekly expansion drops days outside them.
    pub months: &'a [u32],
}

impl ByDayRule<'_> {
    fn limit(&self, date: NaiveDate, bounds: Option<(NaiveDate, NaiveDate)>) -> bool {
        let Some((first, last)) = bounds else {
            return false;
        };
        self.days
            .iter()
            .filter(|wd| wd.day() == date.weekday())
            .any(|wd| weekdays_between(first, last, wd).contains(&date))
    }

    fn expand_in(&self, input: NaiveDateTime, bounds: Option<(NaiveDate, NaiveDate)>) -> Vec<NaiveDateTime> {
        let Some((first, last)) = bounds else {
            return Vec::new();
        };
        self.days
            .iter()
            .flat_map(|wd| weekdays_between(first, last, wd))
            .map(|date| date.and_time(input.time()))
            .collect()
    }
}

impl Transformer for ByDayRule<'_> {
    fn transform(&self, dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        match self.scope {
            DayScope::Weekday => dates
                .into_iter()
                .filter(|date| self.days.iter().any(|wd| wd.day() == date.weekday()))
                .collect(),
            DayScope::LimitMonth => dates
                .into_iter()
                .filter(|date| self.limit(date.date(), month_bounds(date.date())))
                .collect(),
            DayScope::LimitYear => dates
                .into_iter()
                .filter(|date| self.limit(date.date(), year_bounds(date.date())))
                .collect(),
            DayScope::ExpandWeek => {
                let (days, months, week_start) = (self.days, self.months, self.week_start);
                dates
                    .into_iter()
                    .flat_map(move |input| {
                        let lead = Duration::days(week_position(input.weekday(), week_start));
                        input
                            .date()
                            .checked_sub_signed(lead)
                            .into_iter()
                            .flat_map(move |start| {
                                days.iter().filter_map(move |wd| {
                                    let offset = Duration::days(week_position(wd.day(), week_start));
                                    start.checked_add_signed(offset)
                                })
                            })
                            .filter(move |date| months.is_empty() || months.contains(&date.month()))
                            .map(move |date| date.and_time(input.time()))
                    })
                    .collect()
            }
            DayScope::ExpandMonth => dates
                .into_iter()
                .flat_map(|input| self.expand_in(input, month_bounds(input.date())))
                .collect(),
            DayScope::ExpandYear => dates
                .into_iter()
                .flat_map(|input| self.expand_in(input, year_bounds(input.date())))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeField {
    Hour,
    Minute,
    Second,
}

/// BYHOUR, BYMINUTE and BYSECOND: expand when the frequency is coarser than
/// the field, limit otherwise.
pub(crate) struct TimeRule<'a> {
    pub field: TimeField,
    pub values: &'a [u32],
    pub expand: bool,
}

impl TimeRule<'_> {
    fn get(&self, date: &NaiveDateTime) -> u32 {
        match self.field {
            TimeField::Hour => date.hour(),
            TimeField::Minute => date.minute(),
            TimeField::Second => date.second(),
        }
    }

    fn set(&self, date: &NaiveDateTime, value: u32) -> Option<NaiveDateTime> {
        match self.field {
            TimeField::Hour => date.with_hour(value),
            TimeField::Minute => date.with_minute(value),
            TimeField::Second => date.with_second(value),
        }
    }
}

impl Transformer for TimeRule<'_> {
    fn transform(&self, dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        if self.expand {
            dates
                .iter()
                .flat_map(|date| self.values.iter().filter_map(move |&v| self.set(date, v)))
                .collect()
        } else {
            dates
                .into_iter()
                .filter(|date| self.values.contains(&self.get(date)))
                .collect()
        }
    }
}

/// BYSETPOS: pick 1-based positions (negative from the end) out of one
/// increment's sorted candidates.
pub(crate) struct BySetPosRule<'a> {
    pub positions: &'a [i32],
}

impl Transformer for BySetPosRule<'_> {
    fn transform(&self, dates: Vec<NaiveDateTime>) -> Vec<NaiveDateTime> {
        let len = dates.len();
        let picked = self
            .positions
            .iter()
            .filter_map(|&pos| {
                let index = if pos > 0 {
                    pos as usize - 1
                } else {
                    len.checked_sub(pos.unsigned_abs() as usize)?
                };
                dates.get(index).copied()
            })
            .collect();
        sorted(picked)
    }
}
