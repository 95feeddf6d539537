use std::collections::HashMap;

use async_trait::async_trait;

use super::CacheObject;
use crate::StoreError;

/// Access to the backing store of one kind of cache object.
#[async_trait]
pub trait Accessor<T>: Send + Sync
where
    T: CacheObject,
{
    /// Load an object by id.
    async fn get(&self, id: &T::Id) -> Result<Option<T>, StoreError>;

    /// Insert a new row for the object.
    async fn create(&self, object: &T) -> Result<(), StoreError>;

    /// Overwrite the existing row of the object.
    async fn update(&self, object: &T) -> Result<(), StoreError>;

    /// Remove the row with the given id.
    async fn delete(&self, id: &T::Id) -> Result<(), StoreError>;

    /// Ids (and their index value) of all rows whose index matches `index_value`.
    async fn query_identities(
        &self,
        index_name: &str,
        index_value: &T::Index,
    ) -> Result<HashMap<T::Id, T::Index>, StoreError>;

    /// All rows whose index matches `index_value`.
    async fn query_instances(
        &self,
        index_name: &str,
        index_value: &T::Index,
    ) -> Result<Vec<T>, StoreError>;
}
