use std::sync::atomic::{AtomicU64, Ordering};

use crate::element::Operation;

/// Point-in-time copy of a manager's operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub failed: u64,
}

/// Monotonic counters, written from guarded sections and read without locking.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    created: AtomicU64,
    updated: AtomicU64,
    deleted: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    pub fn succeeded(&self, operation: Operation) {
        let counter = match operation {
            Operation::Create => &self.created,
            Operation::Update => &self.updated,
            Operation::Delete => &self.deleted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Statistics {
        Statistics {
            created: self.created.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            deleted: self.deleted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
