use std::fmt;

use crate::{CacheObject, Error, Result};

/// The kind of store write a mutation results in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// How a create arriving for a key with a pending delete is merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecreatePolicy {
    /// The store still holds the row, so the recreation is written as an update.
    #[default]
    AsUpdate,
    /// Refuse the create until the delete has been flushed.
    Reject,
}

/// A mutation of a single cache object, waiting to be written to the store.
#[derive(Debug, Clone)]
pub struct PersistenceElement<T>
where
    T: CacheObject,
{
    operation: Operation,
    id: T::Id,
    object: Option<T>,
    ignore: bool,
}

impl<T> PersistenceElement<T>
where
    T: CacheObject,
{
    pub fn create(object: T) -> Self {
        Self::with_object(Operation::Create, object)
    }

    pub fn update(object: T) -> Self {
        Self::with_object(Operation::Update, object)
    }

    pub fn delete(id: T::Id) -> Self {
        Self {
            operation: Operation::Delete,
            id,
            object: None,
            ignore: false,
        }
    }

    fn with_object(operation: Operation, object: T) -> Self {
        Self {
            operation,
            id: object.id(),
            object: Some(object),
            ignore: false,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn id(&self) -> &T::Id {
        &self.id
    }

    /// The object snapshot, absent for deletes and for ignored elements.
    pub fn object(&self) -> Option<&T> {
        self.object.as_ref()
    }

    pub fn into_object(self) -> Option<T> {
        self.object
    }

    /// Whether the net effect of the merged mutations is a no-op.
    pub fn is_ignore(&self) -> bool {
        self.ignore
    }

    /// Fold a newer mutation of the same object into this one.
    ///
    /// On error the element is left untouched.
    pub(crate) fn merge(&mut self, incoming: Self, policy: RecreatePolicy) -> Result<()> {
        use Operation::*;

        let operation = match (self.operation, incoming.operation) {
            (Create, Create) | (Create, Update) => Create,
            (Create, Delete) => {
                self.ignore = true;
                Create
            }
            (Update, Update) => Update,
            (Update, Delete) | (Delete, Delete) => Delete,
            (Delete, Create) if policy == RecreatePolicy::AsUpdate => Update,
            (pending, incoming) => {
                return Err(Error::Conflict {
                    id: format!("{:?}", self.id),
                    pending,
                    incoming,
                })
            }
        };

        self.operation = operation;
        self.object = incoming.object;
        Ok(())
    }
}
