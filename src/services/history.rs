//! History ledger (read side)
//!
//! Rows are only ever appended by `PricingStore` price writes issued from the
//! catalog; this component exposes them and never writes.

use std::sync::Arc;

use crate::error::PricingResult;
use crate::models::history::HistoryEntry;
use crate::store::PricingStore;

/// Upper bound applied when a caller asks for more rows than this
pub const MAX_HISTORY_LIMIT: u64 = 10_000;

#[derive(Clone)]
pub struct HistoryLedger {
    store: Arc<dyn PricingStore>,
}

impl HistoryLedger {
    pub fn new(store: Arc<dyn PricingStore>) -> Self {
        Self { store }
    }

    /// Entries newest first, optionally for one item
    pub async fn entries(&self, item_id: Option<&str>, limit: Option<u64>) -> PricingResult<Vec<HistoryEntry>> {
        let limit = limit.map(|l| l.min(MAX_HISTORY_LIMIT));
        self.store.list_history(item_id, limit).await
    }
}
