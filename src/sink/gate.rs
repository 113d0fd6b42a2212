use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of simultaneously in-flight writer calls.
///
/// One slot is held per dispatch task for the full duration of its writer
/// call. Shutdown uses `drain` to take every slot without giving them back,
/// which can only complete once all outstanding tasks have released theirs.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One occupied gate slot. Dropping it releases the slot, which each
/// dispatch task does exactly once, after its writer call returns.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait until a slot is free, then occupy it.
    pub async fn acquire(&self) -> GatePermit {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("gate semaphore closed");
        GatePermit { _permit: permit }
    }

    /// Take every slot and keep them. Completes only once no task holds a
    /// slot; afterwards the gate admits nothing, which is the point: the
    /// process is shutting down.
    pub async fn drain(&self) {
        let permits = self
            .semaphore
            .acquire_many(self.capacity as u32)
            .await
            .expect("gate semaphore closed");
        permits.forget();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
