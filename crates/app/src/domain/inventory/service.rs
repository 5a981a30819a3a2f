//! Inventory ledger service.

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::domain::inventory::{
    errors::LedgerError,
    records::{ReservationToken, ReservationUuid, SizeRecord, SizeSeed, SizeUuid},
    repository::MemSizeRows,
};

#[derive(Debug, Clone, Default)]
pub struct MemInventoryLedger {
    rows: MemSizeRows,
}

impl MemInventoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: MemSizeRows::new(),
        }
    }
}

#[async_trait]
impl InventoryLedger for MemInventoryLedger {
    async fn reserve(
        &self,
        size: SizeUuid,
        quantity: u32,
    ) -> Result<ReservationToken, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity);
        }

        let row = self.rows.row(size).await.ok_or(LedgerError::UnknownSize)?;
        let mut row = row.lock().await;

        if !row.record.is_active {
            return Err(LedgerError::InactiveSize);
        }

        let sellable = row.record.sellable();

        if sellable < quantity {
            return Err(LedgerError::InsufficientStock {
                available: sellable,
            });
        }

        row.record.reserved_quantity += quantity;

        let token = ReservationToken {
            uuid: ReservationUuid::new(),
            size_uuid: size,
            quantity,
        };

        row.reservations.insert(token.uuid, quantity);

        debug!(size_uuid = %size, quantity, "reserved stock");

        Ok(token)
    }

    async fn adjust(
        &self,
        token: ReservationToken,
        new_quantity: u32,
    ) -> Result<ReservationToken, LedgerError> {
        if new_quantity == 0 {
            return Err(LedgerError::InvalidQuantity);
        }

        let row = self
            .rows
            .row(token.size_uuid)
            .await
            .ok_or(LedgerError::UnknownSize)?;
        let mut row = row.lock().await;

        let current = *row
            .reservations
            .get(&token.uuid)
            .ok_or(LedgerError::UnknownReservation)?;

        if new_quantity > current {
            let delta = new_quantity - current;

            if !row.record.is_active {
                return Err(LedgerError::InactiveSize);
            }

            let sellable = row.record.sellable();

            if sellable < delta {
                return Err(LedgerError::InsufficientStock {
                    available: current + sellable,
                });
            }

            row.record.reserved_quantity += delta;
        } else {
            row.record.reserved_quantity -= current - new_quantity;
        }

        row.reservations.insert(token.uuid, new_quantity);

        Ok(ReservationToken {
            quantity: new_quantity,
            ..token
        })
    }

    async fn release(&self, token: ReservationToken) {
        let Some(row) = self.rows.row(token.size_uuid).await else {
            return;
        };

        let mut row = row.lock().await;

        if let Some(quantity) = row.reservations.remove(&token.uuid) {
            row.record.reserved_quantity = row.record.reserved_quantity.saturating_sub(quantity);

            debug!(size_uuid = %token.size_uuid, quantity, "released reservation");
        }
    }

    async fn commit(&self, token: ReservationToken) -> Result<(), LedgerError> {
        let row = self
            .rows
            .row(token.size_uuid)
            .await
            .ok_or(LedgerError::UnknownSize)?;
        let mut row = row.lock().await;

        let quantity = *row
            .reservations
            .get(&token.uuid)
            .ok_or(LedgerError::UnknownReservation)?;

        if row.record.stock_quantity < quantity || row.record.reserved_quantity < quantity {
            return Err(LedgerError::StockUnavailable);
        }

        row.reservations.remove(&token.uuid);
        row.record.stock_quantity -= quantity;
        row.record.reserved_quantity -= quantity;

        debug!(size_uuid = %token.size_uuid, quantity, "committed reservation");

        Ok(())
    }

    async fn verify(&self, token: ReservationToken) -> Result<(), LedgerError> {
        let row = self
            .rows
            .row(token.size_uuid)
            .await
            .ok_or(LedgerError::UnknownSize)?;
        let row = row.lock().await;

        let quantity = *row
            .reservations
            .get(&token.uuid)
            .ok_or(LedgerError::UnknownReservation)?;

        if !row.record.is_active {
            return Err(LedgerError::InactiveSize);
        }

        if row.record.stock_quantity < quantity {
            return Err(LedgerError::StockUnavailable);
        }

        Ok(())
    }

    async fn upsert_size(&self, seed: SizeSeed) {
        self.rows.upsert(seed).await;
    }

    async fn set_size_active(&self, size: SizeUuid, active: bool) -> Result<(), LedgerError> {
        let row = self.rows.row(size).await.ok_or(LedgerError::UnknownSize)?;

        row.lock().await.record.is_active = active;

        Ok(())
    }

    async fn size_snapshot(&self, size: SizeUuid) -> Result<SizeRecord, LedgerError> {
        let row = self.rows.row(size).await.ok_or(LedgerError::UnknownSize)?;
        let row = row.lock().await;

        Ok(row.record.clone())
    }
}

#[automock]
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Atomically claims `quantity` sellable units of a size.
    ///
    /// Fails with [`LedgerError::InsufficientStock`] without side effects
    /// when sellable stock is short; never retried automatically.
    async fn reserve(
        &self,
        size: SizeUuid,
        quantity: u32,
    ) -> Result<ReservationToken, LedgerError>;

    /// Changes a live reservation's quantity up or down, validating growth
    /// against sellable stock with the same atomic check as `reserve`.
    /// Returns the updated token; on failure the reservation is unchanged.
    async fn adjust(
        &self,
        token: ReservationToken,
        new_quantity: u32,
    ) -> Result<ReservationToken, LedgerError>;

    /// Returns a reservation's units to sellable stock. Idempotent:
    /// releasing a token that is no longer live is a no-op.
    async fn release(&self, token: ReservationToken);

    /// Irreversibly converts a reservation into a sale, decrementing both
    /// stock and reserved counters.
    async fn commit(&self, token: ReservationToken) -> Result<(), LedgerError>;

    /// Read-only check that a reservation is still live, its size active and
    /// its quantity committable. The checkout pre-check.
    async fn verify(&self, token: ReservationToken) -> Result<(), LedgerError>;

    /// Catalog contract: create or update a size. Updates preserve
    /// reservation state; see [`SizeSeed`] for the stock-correction case.
    async fn upsert_size(&self, seed: SizeSeed);

    /// Catalog contract: flip a size's sellable flag.
    async fn set_size_active(&self, size: SizeUuid, active: bool) -> Result<(), LedgerError>;

    /// A point-in-time copy of a size's record, counters included.
    async fn size_snapshot(&self, size: SizeUuid) -> Result<SizeRecord, LedgerError>;
}
