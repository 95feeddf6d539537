use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{
    sync::{watch, Mutex, Notify, RwLock},
    task::JoinHandle,
};
use tracing::{debug, error, info};

use crate::{
    element::RecreatePolicy,
    lifecycle::LifecycleHandle,
    statistics::{Counters, Statistics},
    Accessor, CacheObject, Error, IntoRaw, PersistenceElement, PersistenceManager,
    PersistenceMonitor, Result, Schedule,
};

type Batch<T> = HashMap<<T as CacheObject>::Id, PersistenceElement<T>>;

/// The two buffers of pending mutations.
struct Tables<T>
where
    T: CacheObject,
{
    /// Mutations accepted since the last swap, at most one per id.
    pending: Batch<T>,
    /// The batch currently being written. Kept readable until the flush ends.
    flushing: Arc<Batch<T>>,
}

impl<T> Tables<T>
where
    T: CacheObject,
{
    fn lookup(&self, id: &T::Id) -> Option<&PersistenceElement<T>> {
        self.pending.get(id).or_else(|| self.flushing.get(id))
    }

    /// Every element not yet in the store, oldest first.
    fn overlay(&self) -> impl Iterator<Item = &PersistenceElement<T>> {
        self.flushing.values().chain(self.pending.values())
    }
}

struct Shared<T>
where
    T: CacheObject,
{
    name: String,
    accessor: Arc<dyn Accessor<T>>,
    monitor: Arc<dyn PersistenceMonitor<T>>,
    schedule: Box<dyn Schedule>,
    lifecycle: LifecycleHandle,
    recreate_policy: RecreatePolicy,
    /// Readers take the shared side; mutations and the swap the exclusive side.
    tables: RwLock<Tables<T>>,
    /// Accepted elements whose write has not been attempted yet, pending or
    /// swapped out. Unchanged by the swap itself.
    waiting: AtomicUsize,
    /// Number of swaps performed.
    generation: AtomicU64,
    wake: Notify,
    counters: Counters,
}

/// Write-back persistence strategy.
///
/// Mutations are merged into a pending table and written in batches by a
/// dedicated worker task, whenever the configured [Schedule] triggers. Reads
/// overlay the not yet written mutations on top of the store.
///
/// Once the lifecycle is stopped the worker drains the pending table and exits.
pub struct ScheduledPersistenceManager<T>
where
    T: CacheObject,
{
    shared: Arc<Shared<T>>,
    completed: watch::Receiver<u64>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T> ScheduledPersistenceManager<T>
where
    T: CacheObject,
{
    /// Create the manager and spawn its worker on the current tokio runtime.
    pub(crate) fn spawn(
        name: String,
        accessor: Arc<dyn Accessor<T>>,
        monitor: Arc<dyn PersistenceMonitor<T>>,
        schedule: Box<dyn Schedule>,
        lifecycle: LifecycleHandle,
        recreate_policy: RecreatePolicy,
    ) -> Self {
        let shared = Arc::new(Shared {
            name,
            accessor,
            monitor,
            schedule,
            lifecycle,
            recreate_policy,
            tables: RwLock::new(Tables {
                pending: HashMap::new(),
                flushing: Arc::default(),
            }),
            waiting: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            wake: Notify::new(),
            counters: Counters::default(),
        });

        let (completed_tx, completed) = watch::channel(0);
        let worker = tokio::spawn(Arc::clone(&shared).run(completed_tx));

        Self {
            shared,
            completed,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Make the worker flush right away instead of waiting for the next trigger.
    pub fn wake(&self) {
        self.shared.wake.notify_one();
    }

    /// Flush now, and wait until every mutation accepted before this call has
    /// been attempted against the store.
    ///
    /// Returns immediately if the worker has already terminated.
    pub async fn flush(&self) {
        let target = self.shared.generation.load(Ordering::Acquire) + 1;
        self.wake();

        let mut completed = self.completed.clone();
        _ = completed.wait_for(|generation| *generation >= target).await;
    }

    /// Wait for the worker to terminate. It does so once the lifecycle is
    /// stopped and every pending mutation has been attempted.
    pub async fn join(&self) {
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };
        if let Err(err) = worker.await {
            error!(manager = %self.shared.name, error = %err, "Persistence worker panicked");
        }
    }

    async fn persist(&self, element: PersistenceElement<T>) -> Result<PersistenceElement<T>> {
        let shared = &self.shared;
        let mut tables = shared.tables.write().await;
        // Checked under the lock, so nothing slips in after the worker's last look
        super::admit(&shared.name, &shared.lifecycle, &element)?;

        match tables.pending.entry(element.id().clone()) {
            Entry::Vacant(entry) => {
                entry.insert(element.clone());
                shared.waiting.fetch_add(1, Ordering::AcqRel);
            }
            Entry::Occupied(mut entry) => {
                if let Err(err) = entry
                    .get_mut()
                    .merge(element.clone(), shared.recreate_policy)
                {
                    error!(manager = %shared.name, error = %err, "Failed to merge element");
                    shared.counters.failed();
                    return Err(err);
                }
                if entry.get().is_ignore() {
                    entry.remove();
                    shared.waiting.fetch_sub(1, Ordering::AcqRel);
                }
            }
        }

        Ok(element)
    }
}

impl<T> Shared<T>
where
    T: CacheObject,
{
    async fn run(self: Arc<Self>, completed: watch::Sender<u64>) {
        let mut lifecycle = self.lifecycle.clone();
        info!(manager = %self.name, "Persistence worker started");

        loop {
            if lifecycle.is_stopped() {
                // Stopped is final and mutations check it under the lock
                if self.tables.read().await.pending.is_empty() {
                    break;
                }
            } else {
                self.wait_for_trigger(&mut lifecycle).await;
            }

            let (generation, batch) = self.switch().await;
            debug!(manager = %self.name, generation, size = batch.len(), "Flush started");
            self.flush(&batch).await;
            self.tables.write().await.flushing = Arc::default();
            debug!(manager = %self.name, generation, size = batch.len(), "Flush finished");

            completed.send_replace(generation);
        }

        info!(manager = %self.name, "Persistence worker stopped");
    }

    async fn wait_for_trigger(&self, lifecycle: &mut LifecycleHandle) {
        let trigger = self.schedule.next_trigger(Utc::now());
        debug!(manager = %self.name, %trigger, "Next flush scheduled");
        let delay = (trigger - Utc::now()).to_std().unwrap_or_default();

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return,
                _ = self.wake.notified() => {
                    debug!(manager = %self.name, "Flush requested");
                    return;
                }
                _ = lifecycle.changed() => {
                    if lifecycle.is_stopped() {
                        debug!(manager = %self.name, "Stop requested, flushing");
                        return;
                    }
                }
            }
        }
    }

    /// Detach the pending table and start a fresh one.
    async fn switch(&self) -> (u64, Arc<Batch<T>>) {
        let mut tables = self.tables.write().await;
        let batch = Arc::new(std::mem::take(&mut tables.pending));
        tables.flushing = Arc::clone(&batch);

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        (generation, batch)
    }

    async fn flush(&self, batch: &Batch<T>) {
        for element in batch.values() {
            if element.is_ignore() {
                // Ignored elements are dropped at merge time
                error!(
                    manager = %self.name,
                    operation = %element.operation(),
                    id = ?element.id(),
                    "Ignored element reached the flush"
                );
                self.waiting.fetch_sub(1, Ordering::AcqRel);
                continue;
            }

            let error = match super::apply(self.accessor.as_ref(), element).await {
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
            };
            self.waiting.fetch_sub(1, Ordering::AcqRel);

            self.monitor.notify(
                element.operation(),
                element.id(),
                element.object(),
                error.as_ref(),
            );
        }
    }
}

#[async_trait]
impl<T> PersistenceManager<T> for ScheduledPersistenceManager<T>
where
    T: CacheObject,
{
    fn name(&self) -> &str {
        &self.shared.name
    }

    async fn get_instance(&self, id: &T::Id) -> Result<Option<T>> {
        let tables = self.shared.tables.read().await;
        if let Some(element) = tables.lookup(id) {
            return Ok(element.object().cloned());
        }
        self.shared.accessor.get(id).await.map_err(Error::Store)
    }

    async fn get_identities(
        &self,
        index_name: &str,
        index_value: &T::Index,
    ) -> Result<HashMap<T::Id, T::Index>> {
        let tables = self.shared.tables.read().await;
        let mut identities = self
            .shared
            .accessor
            .query_identities(index_name, index_value)
            .await
            .map_err(Error::Store)?;

        for element in tables.overlay() {
            let value = element
                .object()
                .and_then(|object| object.index_value(index_name));
            match value {
                Some(value) if value == *index_value => {
                    identities.insert(element.id().clone(), value);
                }
                _ => {
                    identities.remove(element.id());
                }
            }
        }
        Ok(identities)
    }

    async fn get_instances(&self, index_name: &str, index_value: &T::Index) -> Result<Vec<T>> {
        let tables = self.shared.tables.read().await;
        let stored = self
            .shared
            .accessor
            .query_instances(index_name, index_value)
            .await
            .map_err(Error::Store)?;

        let mut instances: HashMap<T::Id, T> = stored
            .into_iter()
            .map(|object| (object.id(), object))
            .collect();

        for element in tables.overlay() {
            match element.object() {
                Some(object) if object.index_value(index_name).as_ref() == Some(index_value) => {
                    instances.insert(element.id().clone(), object.clone());
                }
                _ => {
                    instances.remove(element.id());
                }
            }
        }
        Ok(instances.into_values().collect())
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
        &self.shared.monitor
    }

    fn wait_size(&self) -> usize {
        self.shared.waiting.load(Ordering::Acquire)
    }

    fn statistics(&self) -> Statistics {
        self.shared.counters.snapshot()
    }
}
