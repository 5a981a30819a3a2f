//! Carts service errors.

use thiserror::Error;

use crate::domain::inventory::LedgerError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartsServiceError {
    #[error("cart not found")]
    NotFound,

    #[error("cart item not found")]
    ItemNotFound,

    /// Ledger failures pass through unchanged; the API boundary maps them
    /// to the specific cart line they concern.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Pricing(#[from] flacon::pricing::PricingError),
}
