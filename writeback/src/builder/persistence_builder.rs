use std::sync::Arc;

use tracing::debug;

use crate::{
    element::RecreatePolicy, lifecycle::LifecycleHandle, noop::Noop, Accessor, CacheObject,
    Persistence, PersistenceMonitor, PromptPersistenceManager, Result, Schedule,
    ScheduledPersistenceManager,
};

use super::Error;

/// Which persistence strategy to build.
pub enum PersistenceStrategy {
    /// Write through on every mutation.
    Prompt,
    /// Write back in batches, whenever the schedule triggers.
    Scheduled(Box<dyn Schedule>),
}

impl PersistenceStrategy {
    pub fn scheduled(schedule: impl Schedule + 'static) -> Self {
        PersistenceStrategy::Scheduled(Box::new(schedule))
    }
}

/// A builder for persistence managers.
///
/// # Examples
/// ```
/// use std::{sync::Arc, time::Duration};
/// use writeback::{Interval, Lifecycle, PersistenceBuilder, PersistenceStrategy};
/// # use writeback::{Accessor, CacheObject, StoreError};
/// # use std::collections::HashMap;
/// # #[derive(Clone)]
/// # struct User { id: u64 }
/// # impl CacheObject for User {
/// #     type Id = u64;
/// #     type Index = String;
/// #     fn id(&self) -> u64 { self.id }
/// # }
/// # struct Users;
/// # #[async_trait::async_trait]
/// # impl Accessor<User> for Users {
/// #     async fn get(&self, _: &u64) -> Result<Option<User>, StoreError> { Ok(None) }
/// #     async fn create(&self, _: &User) -> Result<(), StoreError> { Ok(()) }
/// #     async fn update(&self, _: &User) -> Result<(), StoreError> { Ok(()) }
/// #     async fn delete(&self, _: &u64) -> Result<(), StoreError> { Ok(()) }
/// #     async fn query_identities(&self, _: &str, _: &String) -> Result<HashMap<u64, String>, StoreError> { Ok(HashMap::new()) }
/// #     async fn query_instances(&self, _: &str, _: &String) -> Result<Vec<User>, StoreError> { Ok(vec![]) }
/// # }
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let lifecycle = Lifecycle::new();
///     let persistence = PersistenceBuilder::<User>::new("users")
///         .with_accessor(Arc::new(Users))
///         .with_lifecycle(lifecycle.handle())
///         .build(PersistenceStrategy::scheduled(Interval::every(Duration::from_secs(5))))
///         .await
///         .unwrap();
///     lifecycle.start();
/// #   drop(persistence);
/// }
/// ```
pub struct PersistenceBuilder<T>
where
    T: CacheObject,
{
    name: String,
    accessor: Option<Arc<dyn Accessor<T>>>,
    monitor: Option<Arc<dyn PersistenceMonitor<T>>>,
    lifecycle: Option<LifecycleHandle>,
    recreate_policy: RecreatePolicy,
}

struct Parts<T>
where
    T: CacheObject,
{
    name: String,
    accessor: Arc<dyn Accessor<T>>,
    monitor: Arc<dyn PersistenceMonitor<T>>,
    lifecycle: Option<LifecycleHandle>,
}

impl<T> PersistenceBuilder<T>
where
    T: CacheObject,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accessor: None,
            monitor: None,
            lifecycle: None,
            recreate_policy: RecreatePolicy::default(),
        }
    }

    /// Set the backing store accessor (required)
    pub fn with_accessor<A>(mut self, accessor: Arc<A>) -> Self
    where
        A: Accessor<T> + 'static,
    {
        let accessor: Arc<dyn Accessor<T>> = accessor;
        self.accessor = Some(accessor);
        self
    }

    /// Set the monitor notified of every attempted write
    pub fn with_monitor<M>(mut self, monitor: Arc<M>) -> Self
    where
        M: PersistenceMonitor<T> + 'static,
    {
        let monitor: Arc<dyn PersistenceMonitor<T>> = monitor;
        self.monitor = Some(monitor);
        self
    }

    /// Set the lifecycle of the owning cache (required for scheduled persistence)
    pub fn with_lifecycle(mut self, lifecycle: LifecycleHandle) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Set how a create following a pending delete is merged
    pub fn with_recreate_policy(mut self, recreate_policy: RecreatePolicy) -> Self {
        self.recreate_policy = recreate_policy;
        self
    }

    /// Build a write-through manager.
    pub fn build_prompt(self) -> Result<PromptPersistenceManager<T>> {
        let parts = self.into_parts()?;
        debug!(manager = %parts.name, "Building prompt persistence manager");
        Ok(PromptPersistenceManager::new(
            parts.name,
            parts.accessor,
            parts.monitor,
        ))
    }

    /// Build a write-back manager and spawn its worker.
    pub async fn build_scheduled(
        self,
        schedule: impl Schedule + 'static,
    ) -> Result<ScheduledPersistenceManager<T>> {
        self.build_scheduled_boxed(Box::new(schedule))
    }

    /// Build the manager selected by `strategy`.
    pub async fn build(self, strategy: PersistenceStrategy) -> Result<Persistence<T>> {
        match strategy {
            PersistenceStrategy::Prompt => self.build_prompt().map(Persistence::Prompt),
            PersistenceStrategy::Scheduled(schedule) => self
                .build_scheduled_boxed(schedule)
                .map(Persistence::Scheduled),
        }
    }

    fn build_scheduled_boxed(
        self,
        schedule: Box<dyn Schedule>,
    ) -> Result<ScheduledPersistenceManager<T>> {
        let recreate_policy = self.recreate_policy;
        let parts = self.into_parts()?;
        let lifecycle = parts
            .lifecycle
            .ok_or_else(|| Error::MissingLifecycle(parts.name.clone()))?;
        debug!(manager = %parts.name, ?recreate_policy, "Building scheduled persistence manager");
        Ok(ScheduledPersistenceManager::spawn(
            parts.name,
            parts.accessor,
            parts.monitor,
            schedule,
            lifecycle,
            recreate_policy,
        ))
    }

    fn into_parts(self) -> std::result::Result<Parts<T>, Error> {
        let accessor = self
            .accessor
            .ok_or_else(|| Error::MissingAccessor(self.name.clone()))?;

        Ok(Parts {
            name: self.name,
            accessor,
            monitor: self.monitor.unwrap_or_else(|| Arc::new(Noop)),
            lifecycle: self.lifecycle,
        })
    }
}
