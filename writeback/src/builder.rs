mod persistence_builder;

pub use persistence_builder::{PersistenceBuilder, PersistenceStrategy};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No accessor configured for persistence manager '{0}'.")]
    MissingAccessor(String),
    #[error("No lifecycle configured for persistence manager '{0}'.")]
    MissingLifecycle(String),
}
