//! Inventory records

use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Marker for product identifiers. Products are owned by the external
/// catalog; the ledger only ever refers to them.
#[derive(Debug, Clone, Copy)]
pub struct Product;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Size UUID
pub type SizeUuid = TypedUuid<SizeRecord>;

/// A sellable unit: one bottle size of one product.
///
/// Counters are mutated only by the ledger. The invariant
/// `reserved_quantity <= stock_quantity` holds at every operation boundary;
/// see [`SizeSeed`] for the one external exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRecord {
    pub uuid: SizeUuid,
    pub product_uuid: ProductUuid,
    pub size_ml: u32,
    /// List price in minor units.
    pub price: u64,
    /// Discounted price, when the size is on sale.
    pub sale_price: Option<u64>,
    pub stock_quantity: u32,
    pub reserved_quantity: u32,
    pub low_stock_threshold: u32,
    pub sku: String,
    pub is_active: bool,
}

impl SizeRecord {
    /// Units available for new reservations.
    #[must_use]
    pub fn sellable(&self) -> u32 {
        self.stock_quantity.saturating_sub(self.reserved_quantity)
    }

    /// The price a cart line snapshots at add time.
    #[must_use]
    pub fn effective_price(&self) -> u64 {
        self.sale_price.unwrap_or(self.price)
    }

    /// Whether sellable stock has dropped to the low-stock threshold.
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.sellable() <= self.low_stock_threshold
    }
}

/// Catalog-supplied size data for [`upsert_size`].
///
/// An upsert may shrink `stock_quantity` below outstanding reservations (a
/// manual stock correction). The ledger does not clamp `reserved_quantity`
/// in that case: reservations drain through release, and commits fail the
/// defensive [`LedgerError::StockUnavailable`] check.
///
/// [`upsert_size`]: super::InventoryLedger::upsert_size
/// [`LedgerError::StockUnavailable`]: super::LedgerError::StockUnavailable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSeed {
    pub uuid: SizeUuid,
    pub product_uuid: ProductUuid,
    pub size_ml: u32,
    pub price: u64,
    pub sale_price: Option<u64>,
    pub stock_quantity: u32,
    pub low_stock_threshold: u32,
    pub sku: String,
    pub is_active: bool,
}

/// Reservation UUID
pub type ReservationUuid = TypedUuid<ReservationToken>;

/// A claim of `quantity` units of one size, pending commit or release.
///
/// The token is a value; the ledger's own bookkeeping decides whether it is
/// still live, which is what makes `release` idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationToken {
    pub uuid: ReservationUuid,
    pub size_uuid: SizeUuid,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(stock: u32, reserved: u32) -> SizeRecord {
        SizeRecord {
            uuid: SizeUuid::new(),
            product_uuid: ProductUuid::new(),
            size_ml: 50,
            price: 89_00,
            sale_price: None,
            stock_quantity: stock,
            reserved_quantity: reserved,
            low_stock_threshold: 3,
            sku: "NOIR-50".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn sellable_is_stock_minus_reserved() {
        assert_eq!(size(5, 2).sellable(), 3);
        assert_eq!(size(5, 5).sellable(), 0);
    }

    #[test]
    fn sellable_saturates_when_stock_corrected_below_reservations() {
        assert_eq!(size(1, 4).sellable(), 0);
    }

    #[test]
    fn effective_price_prefers_sale_price() {
        let mut record = size(5, 0);

        assert_eq!(record.effective_price(), 89_00);

        record.sale_price = Some(69_00);

        assert_eq!(record.effective_price(), 69_00);
    }

    #[test]
    fn low_stock_tracks_sellable_not_raw_stock() {
        // 5 in stock but 3 reserved leaves 2 sellable, under the threshold.
        assert!(size(5, 3).is_low_stock());
        assert!(!size(5, 1).is_low_stock());
    }
}
