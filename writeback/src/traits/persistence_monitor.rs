use super::CacheObject;
use crate::{element::Operation, Error};

/// Listener notified once for every attempted store write.
pub trait PersistenceMonitor<T>: Send + Sync
where
    T: CacheObject,
{
    /// `error` is set when the store rejected the write.
    fn notify(&self, operation: Operation, id: &T::Id, object: Option<&T>, error: Option<&Error>);
}
