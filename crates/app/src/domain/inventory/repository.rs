//! In-memory size rows.
//!
//! Each size has its own mutex: a ledger operation is one critical section
//! on one row, so operations on different sizes never contend and two
//! concurrent operations on the same size serialize. The outer lock only
//! guards the map structure and is never held across a row lock.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, RwLock};

use crate::domain::inventory::records::{ReservationUuid, SizeRecord, SizeSeed, SizeUuid};

/// One size's counters plus its live reservations, keyed by reservation id.
///
/// Keeping the reservations as a map is what makes `release` idempotent: a
/// token whose id is no longer present is simply ignored.
#[derive(Debug)]
pub(crate) struct SizeRow {
    pub record: SizeRecord,
    pub reservations: FxHashMap<ReservationUuid, u32>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemSizeRows {
    rows: Arc<RwLock<FxHashMap<SizeUuid, Arc<Mutex<SizeRow>>>>>,
}

impl MemSizeRows {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn row(&self, size: SizeUuid) -> Option<Arc<Mutex<SizeRow>>> {
        self.rows.read().await.get(&size).cloned()
    }

    /// Insert or update a size from catalog data, preserving reservation
    /// state on update.
    pub(crate) async fn upsert(&self, seed: SizeSeed) {
        let existing = self.row(seed.uuid).await;

        match existing {
            Some(row) => {
                let mut row = row.lock().await;
                let reserved_quantity = row.record.reserved_quantity;

                row.record = SizeRecord {
                    uuid: seed.uuid,
                    product_uuid: seed.product_uuid,
                    size_ml: seed.size_ml,
                    price: seed.price,
                    sale_price: seed.sale_price,
                    stock_quantity: seed.stock_quantity,
                    reserved_quantity,
                    low_stock_threshold: seed.low_stock_threshold,
                    sku: seed.sku,
                    is_active: seed.is_active,
                };
            }
            None => {
                let row = SizeRow {
                    record: SizeRecord {
                        uuid: seed.uuid,
                        product_uuid: seed.product_uuid,
                        size_ml: seed.size_ml,
                        price: seed.price,
                        sale_price: seed.sale_price,
                        stock_quantity: seed.stock_quantity,
                        reserved_quantity: 0,
                        low_stock_threshold: seed.low_stock_threshold,
                        sku: seed.sku,
                        is_active: seed.is_active,
                    },
                    reservations: FxHashMap::default(),
                };

                self.rows
                    .write()
                    .await
                    .insert(seed.uuid, Arc::new(Mutex::new(row)));
            }
        }
    }
}
