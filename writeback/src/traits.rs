mod accessor;
mod cache_object;
mod persistence_manager;
mod persistence_monitor;
mod schedule;

pub use accessor::Accessor;
pub use cache_object::{CacheObject, IntoRaw};
pub use persistence_manager::PersistenceManager;
pub use persistence_monitor::PersistenceMonitor;
pub use schedule::Schedule;
