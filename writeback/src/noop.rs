use crate::{CacheObject, Error, Operation, PersistenceMonitor};

/// A monitor that ignores every notification.
/// Substituted when no monitor is configured.
#[derive(Default, Debug)]
pub struct Noop;

impl<T> PersistenceMonitor<T> for Noop
where
    T: CacheObject,
{
    fn notify(
        &self,
        _operation: Operation,
        _id: &T::Id,
        _object: Option<&T>,
        _error: Option<&Error>,
    ) {
    }
}
