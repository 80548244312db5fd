//! Per-item write serialization
//!
//! Read-modify-write sequences on one item (price edits, apply, cancel) hold
//! that item's guard; different items never contend.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Guard proving the holder is the only writer of one item
pub type ItemGuard = OwnedMutexGuard<()>;

#[derive(Clone, Default)]
pub struct ItemLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl ItemLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `item_id`
    pub async fn lock(&self, item_id: &str) -> ItemGuard {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(item_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
