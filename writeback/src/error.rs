use crate::{element::Operation, lifecycle::CacheState};

/// An error raised by a backing store [Accessor](crate::Accessor).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BuildError(#[from] crate::builder::Error),
    #[error("Persistence strategy '{name}' is {state}, rejecting {operation} of {id}.")]
    Rejected {
        name: String,
        state: CacheState,
        operation: Operation,
        id: String,
    },
    #[error("Cannot apply {incoming} of {id} on top of a pending {pending}.")]
    Conflict {
        id: String,
        pending: Operation,
        incoming: Operation,
    },
    #[error("Store error: {0}")]
    Store(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;
