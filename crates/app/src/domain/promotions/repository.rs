//! In-memory promotion rows, keyed by uppercased code.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::domain::promotions::records::PromotionRecord;

#[derive(Debug, Clone, Default)]
pub(crate) struct MemPromotionsRepository {
    rows: Arc<RwLock<FxHashMap<String, PromotionRecord>>>,
}

impl MemPromotionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a record under its code. Returns `false` when the code is
    /// already taken.
    pub(crate) async fn insert(&self, record: PromotionRecord) -> bool {
        let mut rows = self.rows.write().await;

        if rows.contains_key(&record.code) {
            return false;
        }

        rows.insert(record.code.clone(), record);

        true
    }

    pub(crate) async fn get(&self, code: &str) -> Option<PromotionRecord> {
        self.rows.read().await.get(code).cloned()
    }
}
