use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    statistics::Statistics, CacheObject, IntoRaw, PersistenceElement, PersistenceManager,
    PersistenceMonitor, PromptPersistenceManager, Result, ScheduledPersistenceManager,
};

/// The persistence strategy configured for a cache.
pub enum Persistence<T>
where
    T: CacheObject,
{
    Prompt(PromptPersistenceManager<T>),
    Scheduled(ScheduledPersistenceManager<T>),
}

macro_rules! dispatch {
    ($self:ident, $manager:ident => $call:expr) => {
        match $self {
            Persistence::Prompt($manager) => $call,
            Persistence::Scheduled($manager) => $call,
        }
    };
}

impl<T> Persistence<T>
where
    T: CacheObject,
{
    /// Write out everything pending. A no-op for write-through persistence.
    pub async fn flush(&self) {
        if let Persistence::Scheduled(manager) = self {
            manager.flush().await;
        }
    }

    /// Wait until the background worker, if any, has drained and terminated.
    pub async fn join(&self) {
        if let Persistence::Scheduled(manager) = self {
            manager.join().await;
        }
    }
}

#[async_trait]
impl<T> PersistenceManager<T> for Persistence<T>
where
    T: CacheObject,
{
    fn name(&self) -> &str {
        dispatch!(self, manager => manager.name())
    }

    async fn get_instance(&self, id: &T::Id) -> Result<Option<T>> {
        dispatch!(self, manager => manager.get_instance(id).await)
    }

    async fn get_identities(
        &self,
        index_name: &str,
        index_value: &T::Index,
    ) -> Result<HashMap<T::Id, T::Index>> {
        dispatch!(self, manager => manager.get_identities(index_name, index_value).await)
    }

    async fn get_instances(&self, index_name: &str, index_value: &T::Index) -> Result<Vec<T>> {
        dispatch!(self, manager => manager.get_instances(index_name, index_value).await)
    }

    async fn create_instance<O>(&self, object: O) -> Result<PersistenceElement<T>>
    where
        O: IntoRaw<T> + Send,
    {
        dispatch!(self, manager => manager.create_instance(object).await)
    }

    async fn update_instance<O>(&self, object: O) -> Result<PersistenceElement<T>>
    where
        O: IntoRaw<T> + Send,
    {
        dispatch!(self, manager => manager.update_instance(object).await)
    }

    async fn delete_instance(&self, id: T::Id) -> Result<PersistenceElement<T>> {
        dispatch!(self, manager => manager.delete_instance(id).await)
    }

    fn monitor(&self) -> &Arc<dyn PersistenceMonitor<T>> {
        dispatch!(self, manager => manager.monitor())
    }

    fn wait_size(&self) -> usize {
        dispatch!(self, manager => manager.wait_size())
    }

    fn statistics(&self) -> Statistics {
        dispatch!(self, manager => manager.statistics())
    }
}
