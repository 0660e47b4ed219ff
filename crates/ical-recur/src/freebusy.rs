//! Free/busy time from recurrence sets.
//!
//! Busy time is the normalised union of every component's instances inside a
//! window; free time is the window minus that union.

use chrono::TimeDelta;
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::Result;
use crate::period::Period;
use crate::period_list::PeriodList;
use crate::recurrence_set::RecurringComponent;
use crate::temporal::Temporal;

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeSlot {
    pub start: Temporal,
    pub end: Temporal,
    pub duration_minutes: i64,
}

impl FreeSlot {
    fn from_period(period: &Period) -> Self {
        let zone = period.start().zone().unwrap_or(Tz::UTC);
        let elapsed: TimeDelta = period.end().to_utc(&zone) - period.start().to_utc(&zone);
        Self {
            start: period.start().clone(),
            end: period.end().clone(),
            duration_minutes: elapsed.num_minutes(),
        }
    }
}

/// Normalised union of the instances of `components` overlapping `window`.
pub fn busy_periods(components: &[RecurringComponent], window: &Period) -> Result<PeriodList> {
    let mut busy = PeriodList::new();
    for component in components {
        busy.extend(component.calculate_recurrence_set(window)?);
    }
    Ok(busy.normalise())
}

/// The parts of `window` not covered by `busy`.
pub fn free_periods(busy: &PeriodList, window: &Period) -> PeriodList {
    PeriodList::from(window.clone()).subtract(&busy.normalise())
}

/// Free slots within `window`, sorted by start time.
pub fn find_free_slots(busy: &PeriodList, window: &Period) -> Vec<FreeSlot> {
    free_periods(busy, window)
        .iter()
        .map(FreeSlot::from_period)
        .collect()
}

/// The first free slot of at least `min_duration_minutes` within `window`.
pub fn find_first_free_slot(
    busy: &PeriodList,
    window: &Period,
    min_duration_minutes: i64,
) -> Option<FreeSlot> {
    find_free_slots(busy, window)
        .into_iter()
        .find(|slot| slot.duration_minutes >= min_duration_minutes)
}
