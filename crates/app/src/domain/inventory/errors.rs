//! Inventory ledger errors.

use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The requested quantity exceeds what the caller can still obtain.
    ///
    /// For `reserve`, `available` is the size's sellable stock; for `adjust`,
    /// it is the largest total quantity the reservation could be set to
    /// (current quantity plus sellable stock).
    #[error("insufficient stock; {available} available")]
    InsufficientStock { available: u32 },

    /// The size is no longer sellable.
    #[error("size is inactive")]
    InactiveSize,

    /// No size with this id has been seeded by the catalog.
    #[error("unknown size")]
    UnknownSize,

    /// The reservation is not live (already released, committed or expired).
    #[error("unknown reservation")]
    UnknownReservation,

    /// Quantities must be at least one; a zero reservation is a release.
    #[error("quantity must be at least one")]
    InvalidQuantity,

    /// Committing would break the ledger invariant. Only reachable when an
    /// external stock correction shrank `stock_quantity` below outstanding
    /// reservations.
    #[error("stock no longer available to commit")]
    StockUnavailable,
}
