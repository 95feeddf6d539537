use std::{fmt::Debug, hash::Hash};

/// An object held by a cache and persisted through a backing store.
///
/// The identity must be stable for the lifetime of the object.
/// Two objects with the same id refer to the same stored row.
pub trait CacheObject: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Debug + Send + Sync + 'static;
    type Index: PartialEq + Clone + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Extract the value of the named index, if the object carries it.
    fn index_value(&self, index_name: &str) -> Option<Self::Index> {
        _ = index_name;
        None
    }
}

/// Unwrap a possibly decorated cache object into the raw object that is persisted.
pub trait IntoRaw<T> {
    fn into_raw(self) -> T;
}

// Raw objects unwrap to themselves
impl<T> IntoRaw<T> for T
where
    T: CacheObject,
{
    fn into_raw(self) -> T {
        self
    }
}
