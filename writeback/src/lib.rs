//! # writeback
//!
//! `writeback` is the persistence layer of an object cache: it decides *when* and *how* mutations of cached objects reach a durable backing store, while keeping reads consistent with mutations that have not been written yet.
//!
//! The library offers two persistence strategies:
//!
//! * **Prompt**: Every create, update and delete is written through to the store before the call returns. Reads go straight to the store.
//! * **Scheduled**: Mutations are merged into a pending table, one element per object, and written in batches by a background worker whenever a [Schedule] triggers. Creating and then deleting an object before the next flush never touches the store. Reads overlay the pending mutations on top of what the store returns.
//!
//! The backing store itself is abstracted by the [Accessor] trait, and every attempted write is reported to an optional [PersistenceMonitor].
//!
//! ## Lifecycle
//!
//! A cache owns a [Lifecycle] and hands a read-only [LifecycleHandle] to its scheduled persistence manager. Mutations are only accepted while the lifecycle is started. Once stopped, the scheduled worker drains everything still pending and terminates.
//!
//! ## Usage
//!
//! ```
//! use std::{collections::HashMap, sync::{Arc, Mutex}, time::Duration};
//! use writeback::{
//!     Accessor, CacheObject, Interval, Lifecycle, PersistenceBuilder, PersistenceManager,
//!     StoreError,
//! };
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! impl CacheObject for User {
//!     type Id = u64;
//!     type Index = String;
//!
//!     fn id(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Users(Mutex<HashMap<u64, User>>);
//!
//! #[async_trait::async_trait]
//! impl Accessor<User> for Users {
//!     async fn get(&self, id: &u64) -> Result<Option<User>, StoreError> {
//!         Ok(self.0.lock().unwrap().get(id).cloned())
//!     }
//!     async fn create(&self, user: &User) -> Result<(), StoreError> {
//!         self.0.lock().unwrap().insert(user.id, user.clone());
//!         Ok(())
//!     }
//!     async fn update(&self, user: &User) -> Result<(), StoreError> {
//!         self.create(user).await
//!     }
//!     async fn delete(&self, id: &u64) -> Result<(), StoreError> {
//!         self.0.lock().unwrap().remove(id);
//!         Ok(())
//!     }
//!     async fn query_identities(&self, _: &str, _: &String) -> Result<HashMap<u64, String>, StoreError> {
//!         Ok(HashMap::new())
//!     }
//!     async fn query_instances(&self, _: &str, _: &String) -> Result<Vec<User>, StoreError> {
//!         Ok(vec![])
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let lifecycle = Lifecycle::new();
//!     let users = Arc::new(Users::default());
//!     let manager = PersistenceBuilder::<User>::new("users")
//!         .with_accessor(users.clone())
//!         .with_lifecycle(lifecycle.handle())
//!         .build_scheduled(Interval::every(Duration::from_secs(5)))
//!         .await
//!         .unwrap();
//!     lifecycle.start();
//!
//!     let user = User { id: 1, name: "alice".into() };
//!     manager.create_instance(user.clone()).await.unwrap();
//!     assert_eq!(manager.get_instance(&1).await.unwrap(), Some(user));
//!     assert_eq!(manager.wait_size(), 1);
//!
//!     lifecycle.stop();
//!     manager.join().await;
//!     assert_eq!(manager.created_count(), 1);
//! }
//! ```
//!
//! ## License
//!
//! writeback is licensed under the MIT license.
//!

#[cfg(test)]
mod test_utils;

mod builder;
mod element;
mod error;
mod interval;
mod lifecycle;
mod macros;
mod noop;
mod persistence;
mod statistics;
mod strategies;
mod traits;

pub(crate) use error::Result;

// Export basic types
pub use builder::{Error as BuildError, PersistenceBuilder, PersistenceStrategy};
pub use element::{Operation, PersistenceElement, RecreatePolicy};
pub use error::{Error, StoreError};
pub use interval::Interval;
pub use lifecycle::{CacheState, Lifecycle, LifecycleHandle};
pub use noop::Noop;
pub use persistence::Persistence;
pub use statistics::Statistics;
pub use strategies::{PromptPersistenceManager, ScheduledPersistenceManager};
pub use traits::{Accessor, CacheObject, IntoRaw, PersistenceManager, PersistenceMonitor, Schedule};

// README doctests
#[doc = include_str!("../../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
