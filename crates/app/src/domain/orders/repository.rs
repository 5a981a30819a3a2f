//! In-memory order rows.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::domain::{
    carts::records::CartOwner,
    orders::records::{OrderRecord, OrderUuid},
};

#[derive(Debug, Clone, Default)]
pub(crate) struct MemOrdersRepository {
    rows: Arc<RwLock<FxHashMap<OrderUuid, OrderRecord>>>,
}

impl MemOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn insert(&self, order: OrderRecord) {
        self.rows.write().await.insert(order.uuid, order);
    }

    pub(crate) async fn get(&self, order: OrderUuid) -> Option<OrderRecord> {
        self.rows.read().await.get(&order).cloned()
    }

    pub(crate) async fn list_by_owner(&self, owner: CartOwner) -> Vec<OrderRecord> {
        let mut orders: Vec<OrderRecord> = self
            .rows
            .read()
            .await
            .values()
            .filter(|order| order.owner == owner)
            .cloned()
            .collect();

        orders.sort_by_key(|order| order.created_at);

        orders
    }

    /// Runs `f` against the order row under the write lock, so guarded
    /// transitions are check-and-set, not read-then-write.
    pub(crate) async fn update<R, F>(&self, order: OrderUuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut OrderRecord) -> R + Send,
    {
        let mut rows = self.rows.write().await;

        rows.get_mut(&order).map(f)
    }
}
