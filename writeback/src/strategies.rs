mod prompt;
mod scheduled;

pub use prompt::PromptPersistenceManager;
pub use scheduled::ScheduledPersistenceManager;

use tracing::error;

use crate::{
    lifecycle::{CacheState, LifecycleHandle},
    Accessor, CacheObject, Error, Operation, PersistenceElement,
    Result, StoreError,
};

/// Refuse mutations unless the cache is started.
fn admit<T>(name: &str, lifecycle: &LifecycleHandle, element: &PersistenceElement<T>) -> Result<()>
where
    T: CacheObject,
{
    let state = lifecycle.state();
    if state == CacheState::Started {
        return Ok(());
    }

    error!(
        manager = name,
        %state,
        operation = %element.operation(),
        id = ?element.id(),
        "Rejecting element, persistence is not started"
    );
    Err(Error::Rejected {
        name: name.to_string(),
        state,
        operation: element.operation(),
        id: format!("{:?}", element.id()),
    })
}

/// Perform the store write an element stands for.
async fn apply<T>(
    accessor: &dyn Accessor<T>,
    element: &PersistenceElement<T>,
) -> std::result::Result<(), StoreError>
where
    T: CacheObject,
{
    match (element.operation(), element.object()) {
        (Operation::Create, Some(object)) => accessor.create(object).await,
        (Operation::Update, Some(object)) => accessor.update(object).await,
        (Operation::Delete, _) => accessor.delete(element.id()).await,
        (operation, None) => Err(format!("{operation} of {:?} carries no object", element.id()).into()),
    }
}
