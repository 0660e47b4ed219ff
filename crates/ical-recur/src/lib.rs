//! # ical-recur
//!
//! iCalendar (RFC 5545) recurrence: RRULE parsing and expansion, PERIOD
//! algebra, and recurrence set calculation, with the RFC 7529 RSCALE/SKIP
//! extension for ISO-structured calendar scales.
//!
//! Expansion is deterministic: the same rule, seed and window always yield the
//! same sorted instances. Zoned seeds are expanded in local civil time and
//! re-attached to their zone under a configurable DST policy.
//!
//! ## Modules
//!
//! - [`temporal`] — DATE / DATE-TIME values in their four shapes
//! - [`comparator`] — ordering across those shapes
//! - [`amount`] — DURATION values (calendar vs exact)
//! - [`period`] / [`period_list`] — PERIOD values and sets of them
//! - [`recur`] — RECUR rules, the BYxxx pipeline and occurrence iteration
//! - [`recurrence_set`] — DTSTART + RRULE + RDATE − EXDATE − EXRULE
//! - [`freebusy`] — free time from recurrence sets
//! - [`dst`] — DST gap policies
//! - [`config`] — engine tunables
//! - [`error`] — Error types

pub mod amount;
pub mod comparator;
pub mod config;
pub mod dst;
pub mod error;
pub mod freebusy;
pub mod period;
pub mod period_list;
pub mod recur;
pub mod recurrence_set;
pub mod temporal;

pub use amount::{Amount, CalendarPeriod};
pub use comparator::{ComparisonUnit, TemporalComparator};
pub use config::{RecurConfig, DEFAULT_MAX_INCREMENT_COUNT};
pub use dst::DstPolicy;
pub use error::{RecurError, Result};
pub use freebusy::{find_first_free_slot, find_free_slots, free_periods, FreeSlot};
pub use period::Period;
pub use period_list::PeriodList;
pub use recur::{Frequency, Occurrences, RScale, Recur, RecurBuilder, Skip, WeekDay};
pub use recurrence_set::{RDate, RecurringComponent};
pub use temporal::{parse_zone, Temporal};
