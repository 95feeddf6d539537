use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::{Accessor, CacheObject, Error, IntoRaw, Operation, PersistenceMonitor, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u32,
    pub owner: String,
    pub value: String,
}

impl CacheObject for Item {
    type Id = u32;
    type Index = String;

    fn id(&self) -> u32 {
        self.id
    }

    fn index_value(&self, index_name: &str) -> Option<String> {
        match index_name {
            "owner" => Some(self.owner.clone()),
            _ => None,
        }
    }
}

pub fn item(id: u32, owner: &str, value: &str) -> Item {
    Item {
        id,
        owner: owner.to_string(),
        value: value.to_string(),
    }
}

/// A decorated [Item], as a cache proxy would hand it out.
pub struct Tracked(pub Item);

impl IntoRaw<Item> for Tracked {
    fn into_raw(self) -> Item {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(Item),
    Update(Item),
    Delete(u32),
}

/// In-memory store recording every write attempt.
#[derive(Default)]
pub struct MemoryAccessor {
    rows: Mutex<HashMap<u32, Item>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<u32>>,
}

impl MemoryAccessor {
    pub fn with_rows(items: impl IntoIterator<Item = Item>) -> Self {
        let accessor = Self::default();
        accessor
            .rows
            .lock()
            .unwrap()
            .extend(items.into_iter().map(|item| (item.id, item)));
        accessor
    }

    /// Make every write touching `id` fail.
    pub fn fail_on(&self, id: u32) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn row(&self, id: u32) -> Option<Item> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn record(&self, call: Call, id: u32) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&id) {
            return Err(format!("store refused row {id}").into());
        }
        Ok(())
    }
}

#[async_trait]
impl Accessor<Item> for MemoryAccessor {
    async fn get(&self, id: &u32) -> Result<Option<Item>, StoreError> {
        Ok(self.row(*id))
    }

    async fn create(&self, object: &Item) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.record(Call::Create(object.clone()), object.id)?;
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&object.id) {
            return Err(format!("row {} already exists", object.id).into());
        }
        rows.insert(object.id, object.clone());
        Ok(())
    }

    async fn update(&self, object: &Item) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.record(Call::Update(object.clone()), object.id)?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&object.id) {
            Some(row) => {
                *row = object.clone();
                Ok(())
            }
            None => Err(format!("row {} does not exist", object.id).into()),
        }
    }

    async fn delete(&self, id: &u32) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.record(Call::Delete(*id), *id)?;
        self.rows.lock().unwrap().remove(id);
        Ok(())
    }

    async fn query_identities(
        &self,
        index_name: &str,
        index_value: &String,
    ) -> Result<HashMap<u32, String>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter_map(|item| {
                item.index_value(index_name)
                    .filter(|value| value == index_value)
                    .map(|value| (item.id, value))
            })
            .collect())
    }

    async fn query_instances(
        &self,
        index_name: &str,
        index_value: &String,
    ) -> Result<Vec<Item>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|item| item.index_value(index_name).as_ref() == Some(index_value))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub operation: Operation,
    pub id: u32,
    pub object: Option<Item>,
    pub failed: bool,
}

#[derive(Default)]
pub struct RecordingMonitor {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingMonitor {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl PersistenceMonitor<Item> for RecordingMonitor {
    fn notify(&self, operation: Operation, id: &u32, object: Option<&Item>, error: Option<&Error>) {
        self.notifications.lock().unwrap().push(Notification {
            operation,
            id: *id,
            object: object.cloned(),
            failed: error.is_some(),
        });
    }
}

/// Sorted copy of a query result, for order-independent comparisons.
pub fn sorted(mut items: Vec<Item>) -> Vec<Item> {
    items.sort_by_key(|item| item.id);
    items
}
