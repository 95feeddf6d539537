use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::Schedule;

/// Fixed period schedule.
///
/// Triggers fall on whole multiples of the period since the Unix epoch, so every
/// manager using the same period flushes at the same instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    period_millis: i64,
}

impl Interval {
    /// Trigger every `period`, rounded down to whole milliseconds (at least one).
    pub fn every(period: Duration) -> Self {
        let period_millis = i64::try_from(period.as_millis()).unwrap_or(i64::MAX);
        Self {
            period_millis: period_millis.max(1),
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_millis as u64)
    }
}

impl Schedule for Interval {
    fn next_trigger(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let slot = after.timestamp_millis().div_euclid(self.period_millis);
        let next = slot
            .checked_add(1)
            .and_then(|slot| slot.checked_mul(self.period_millis));

        next.and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
