//! DST transition policies for zoned recurrence candidates.
//!
//! Candidates are generated in local civil time and re-attached to the seed's
//! zone afterwards. Ambiguous local times (the repeated hour when clocks fall
//! back) always resolve to the earlier offset; this policy decides what happens
//! to local times that do not exist at all.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for candidates that fall into a DST gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop instances that fall in the gap (e.g., 2:30 AM during spring forward).
    Skip,
    /// Move the instance later by the length of the gap, keeping the elapsed
    /// time since the last valid local time.
    #[default]
    ShiftForward,
}

impl DstPolicy {
    /// Attach `local` to `tz` according to this policy.
    ///
    /// Returns `None` only under [`DstPolicy::Skip`] for a non-existent time.
    pub fn resolve(self, tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => match self {
                DstPolicy::Skip => {
                    tracing::warn!(%local, zone = %tz.name(), "dropping candidate in DST gap");
                    None
                }
                DstPolicy::ShiftForward => Some(shift_past_gap(tz, local)),
            },
        }
    }
}

/// Read `local` with the offset in force just before the gap.
fn shift_past_gap(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    // No zone in the database has a gap longer than a day.
    let before = local - TimeDelta::days(1);
    let offset = match tz.from_local_datetime(&before) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.offset().fix(),
        LocalResult::None => tz.offset_from_utc_datetime(&before).fix(),
    };
    let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    tz.from_utc_datetime(&utc)
}
