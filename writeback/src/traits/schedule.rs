use chrono::{DateTime, Utc};

/// Decides when the next batch of pending mutations is flushed.
///
/// Implementations must be deterministic: the same reference instant always
/// yields the same trigger.
pub trait Schedule: Send + Sync {
    /// The first trigger instant strictly after `after`.
    fn next_trigger(&self, after: DateTime<Utc>) -> DateTime<Utc>;
}

// Allows plugging in any evaluator, e.g. a cron expression parser
impl<F> Schedule for F
where
    F: Fn(DateTime<Utc>) -> DateTime<Utc> + Send + Sync,
{
    fn next_trigger(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        self(after)
    }
}
