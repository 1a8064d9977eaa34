//! Per-key writer exclusion for the file cache.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, PoisonError};

use super::CacheKey;

/// Set of keys currently being written. Writers of different keys never wait
/// on each other.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

impl KeyLocks {
    /// Blocks until no other writer holds `key`.
    pub(crate) fn acquire(&self, key: &CacheKey) -> KeyGuard<'_> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while held.contains(key.as_str()) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.insert(key.as_str().to_string());
        KeyGuard {
            locks: self,
            key: key.as_str().to_string(),
        }
    }
}

/// Releases the key on drop.
pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.key);
        self.locks.released.notify_all();
    }
}
