use std::fmt;

use tokio::sync::watch;

/// Lifecycle of a cache, as seen by its persistence strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheState {
    #[default]
    Created,
    Started,
    Stopped,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheState::Created => "CREATED",
            CacheState::Started => "STARTED",
            CacheState::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// The lifecycle cell owned by a cache.
///
/// Persistence strategies only ever see it through a [LifecycleHandle].
#[derive(Debug)]
pub struct Lifecycle {
    sender: watch::Sender<CacheState>,
}

impl Lifecycle {
    /// Create a new lifecycle in the [CacheState::Created] state.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(CacheState::Created);
        Self { sender }
    }

    /// Move to [CacheState::Started]. Has no effect once stopped.
    pub fn start(&self) {
        self.sender.send_if_modified(|state| {
            let created = *state == CacheState::Created;
            if created {
                *state = CacheState::Started;
            }
            created
        });
    }

    pub fn stop(&self) {
        self.sender.send_replace(CacheState::Stopped);
    }

    pub fn state(&self) -> CacheState {
        *self.sender.borrow()
    }

    /// A read-only view on this lifecycle.
    pub fn handle(&self) -> LifecycleHandle {
        LifecycleHandle {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view on a [Lifecycle].
///
/// Once the owning [Lifecycle] is dropped the handle reports [CacheState::Stopped].
#[derive(Debug, Clone)]
pub struct LifecycleHandle {
    receiver: watch::Receiver<CacheState>,
}

impl LifecycleHandle {
    pub fn state(&self) -> CacheState {
        if self.receiver.has_changed().is_err() {
            return CacheState::Stopped;
        }
        *self.receiver.borrow()
    }

    pub fn is_started(&self) -> bool {
        self.state() == CacheState::Started
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == CacheState::Stopped
    }

    /// Resolves on the next state transition, or right away once the owner is
    /// gone (which reads as [CacheState::Stopped]).
    pub(crate) async fn changed(&mut self) {
        _ = self.receiver.changed().await;
    }
}
