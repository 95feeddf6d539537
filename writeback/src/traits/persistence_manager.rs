use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use super::{CacheObject, IntoRaw, PersistenceMonitor};
use crate::{element::PersistenceElement, statistics::Statistics, Result};

/// A persistence strategy.
///
/// Decides when mutations of cached objects reach the backing store, and answers
/// reads in a way that is consistent with mutations it has already accepted.
#[async_trait]
pub trait PersistenceManager<T>: Send + Sync
where
    T: CacheObject,
{
    /// Name of this manager, used in logs and errors.
    fn name(&self) -> &str;

    /// Get an object by id.
    async fn get_instance(&self, id: &T::Id) -> Result<Option<T>>;

    /// Get the ids of all objects whose index matches `index_value`.
    async fn get_identities(
        &self,
        index_name: &str,
        index_value: &T::Index,
    ) -> Result<HashMap<T::Id, T::Index>>;

    /// Get all objects whose index matches `index_value`.
    async fn get_instances(&self, index_name: &str, index_value: &T::Index) -> Result<Vec<T>>;

    /// Persist a new object.
    async fn create_instance<O>(&self, object: O) -> Result<PersistenceElement<T>>
    where
        O: IntoRaw<T> + Send;

    /// Persist changes to an existing object.
    async fn update_instance<O>(&self, object: O) -> Result<PersistenceElement<T>>
    where
        O: IntoRaw<T> + Send;

    /// Remove an object.
    async fn delete_instance(&self, id: T::Id) -> Result<PersistenceElement<T>>;

    /// The monitor notified of every attempted write.
    fn monitor(&self) -> &Arc<dyn PersistenceMonitor<T>>;

    /// Number of mutations accepted but not yet attempted against the store.
    fn wait_size(&self) -> usize;

    /// Snapshot of the operation counters.
    fn statistics(&self) -> Statistics;

    fn created_count(&self) -> u64 {
        self.statistics().created
    }

    fn updated_count(&self) -> u64 {
        self.statistics().updated
    }

    fn deleted_count(&self) -> u64 {
        self.statistics().deleted
    }

    fn failed_count(&self) -> u64 {
        self.statistics().failed
    }
}
