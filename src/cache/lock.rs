//! Per-key read/write lock registry
//!
//! One `tokio::sync::RwLock` per entry path, created on first use and kept for
//! the life of the registry. The outer map is only locked long enough to look up
//! or insert a handle, so waiting on one key never blocks access to another.
//! Guards are owned and release their key when dropped, including on error paths.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

pub type KeyReadGuard = OwnedRwLockReadGuard<()>;
pub type KeyWriteGuard = OwnedRwLockWriteGuard<()>;

#[derive(Default)]
pub struct KeyLockRegistry {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl KeyLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, id: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(id) {
            return Arc::clone(lock);
        }
        let lock = Arc::new(RwLock::new(()));
        locks.insert(id.to_string(), Arc::clone(&lock));
        lock
    }

    /// Acquire a shared lock on `id`, waiting for any writer to finish
    pub async fn read(&self, id: &str) -> KeyReadGuard {
        self.handle(id).read_owned().await
    }

    /// Acquire an exclusive lock on `id`, waiting for all readers and writers
    pub async fn write(&self, id: &str) -> KeyWriteGuard {
        self.handle(id).write_owned().await
    }

    /// Number of distinct identifiers that have been locked so far
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
