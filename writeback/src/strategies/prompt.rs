use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::error;

use crate::{
    statistics::{Counters, Statistics},
    Accessor, CacheObject, Error, IntoRaw, PersistenceElement, PersistenceManager,
    PersistenceMonitor, Result,
};

/// Write-through persistence strategy.
///
/// Every mutation is written to the store before the call returns. Store failures
/// are logged, counted and reported to the monitor, but not returned to the caller:
/// the returned element describes the write that was attempted.
pub struct PromptPersistenceManager<T>
where
    T: CacheObject,
{
    name: String,
    accessor: Arc<dyn Accessor<T>>,
    monitor: Arc<dyn PersistenceMonitor<T>>,
    /// Shared for reads, exclusive for writes.
    lock: RwLock<()>,
    counters: Counters,
}

impl<T> PromptPersistenceManager<T>
where
    T: CacheObject,
{
    pub(crate) fn new(
        name: String,
        accessor: Arc<dyn Accessor<T>>,
        monitor: Arc<dyn PersistenceMonitor<T>>,
    ) -> Self {
        Self {
            name,
            accessor,
            monitor,
            lock: RwLock::new(()),
            counters: Counters::default(),
        }
    }

    async fn persist(&self, element: PersistenceElement<T>) -> Result<PersistenceElement<T>> {
        let error = {
            // Exclusive for the whole write, so writers of the same object serialize
            let _guard = self.lock.write().await;
            match super::apply(self.accessor.as_ref(), &element).await {
                Ok(()) => {
                    self.counters.succeeded(element.operation());
                    None
                }
                Err(source) => {
                    error!(
                        manager = %self.name,
                        operation = %element.operation(),
                        id = ?element.id(),
                        error = %source,
                        "Failed to persist element"
                    );
                    self.counters.failed();
                    Some(Error::Store(source))
                }
            }
        };

        self.monitor.notify(
            element.operation(),
            element.id(),
            element.object(),
            error.as_ref(),
        );
        Ok(element)
    }
}

#[async_trait]
impl<T> PersistenceManager<T> for PromptPersistenceManager<T>
where
    T: CacheObject,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_instance(&self, id: &T::Id) -> Result<Option<T>> {
        let _guard = self.lock.read().await;
        self.accessor.get(id).await.map_err(Error::Store)
    }

    async fn get_identities(
        &self,
        index_name: &str,
        index_value: &T::Index,
    ) -> Result<HashMap<T::Id, T::Index>> {
        let _guard = self.lock.read().await;
        self.accessor
            .query_identities(index_name, index_value)
            .await
            .map_err(Error::Store)
    }

    async fn get_instances(&self, index_name: &str, index_value: &T::Index) -> Result<Vec<T>> {
        let _guard = self.lock.read().await;
        self.accessor
            .query_instances(index_name, index_value)
            .await
            .map_err(Error::Store)
    }

    async fn create_instance<O>(&self, object: O) -> Result<PersistenceElement<T>>
    where
        O: IntoRaw<T> + Send,
    {
        self.persist(PersistenceElement::create(object.into_raw()))
            .await
    }

    async fn update_instance<O>(&self, object: O) -> Result<PersistenceElement<T>>
    where
        O: IntoRaw<T> + Send,
    {
        self.persist(PersistenceElement::update(object.into_raw()))
            .await
    }

    async fn delete_instance(&self, id: T::Id) -> Result<PersistenceElement<T>> {
        self.persist(PersistenceElement::delete(id)).await
    }

    fn monitor(&self) -> &Arc<dyn PersistenceMonitor<T>> {
        &self.monitor
    }

    fn wait_size(&self) -> usize {
        0
    }

    fn statistics(&self) -> Statistics {
        self.counters.snapshot()
    }
}
