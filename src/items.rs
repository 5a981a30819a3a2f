//! Line items

use serde::{Deserialize, Serialize};

/// A priced cart line: the unit price snapshotted when the line entered the
/// cart, and the quantity held by its reservation.
///
/// Prices are minor units (cents). The engine never re-fetches a price from
/// the catalog; the snapshot is what keeps a cart's totals stable for the
/// lifetime of its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unit price in minor units, as snapshotted at add time.
    pub unit_price: u64,
    /// Units held by this line's reservation.
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item from a snapshotted unit price and a quantity.
    #[must_use]
    pub const fn new(unit_price: u64, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// The line's extended price, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}
