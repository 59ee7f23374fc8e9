//! Per-account serialisation for vhost writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Hands out one lock per account key.
///
/// Holding an account's slot keeps a second assign or clear on the same
/// account from interleaving its metadata write and propagation fan-out.
/// Different accounts never contend. A slot lives only while some caller
/// holds or waits on it, so the map never outgrows the number of accounts
/// with an operation in flight.
#[derive(Debug, Default)]
pub(crate) struct AccountGuards {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AccountGuards {
    /// Runs `work` while holding the lock for `key`.
    pub(crate) fn with_lock<R>(&self, key: &str, work: impl FnOnce() -> R) -> R {
        let slot = self.acquire(key);
        let result = {
            let _held = slot.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };
        self.release(key, slot);
        result
    }

    fn acquire(&self, key: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.to_owned()).or_default())
    }

    // Clones are only taken and dropped under the map lock, so the count
    // read here cannot change underneath us.
    fn release(&self, key: &str, slot: Arc<Mutex<()>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        drop(slot);
        if slots
            .get(key)
            .is_some_and(|remaining| Arc::strong_count(remaining) == 1)
        {
            slots.remove(key);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
