//! Order and checkout errors.

use thiserror::Error;

use crate::domain::{
    carts::records::CartItemUuid,
    inventory::{LedgerError, records::SizeUuid},
    orders::status::{OrderStatus, PaymentStatus},
};

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("invalid order status transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: OrderStatus, to: OrderStatus },

    #[error("invalid payment status transition: {from:?} -> {to:?}")]
    InvalidPaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

/// A cart line whose availability changed between cart time and checkout
/// time. The storefront lists these in the blocking retry modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLine {
    pub item_uuid: CartItemUuid,
    pub size_uuid: SizeUuid,
    pub reason: LedgerError,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart not found")]
    CartNotFound,

    #[error("cart is empty")]
    EmptyCart,

    /// The pre-check (or, exceptionally, a commit) found lines that are no
    /// longer sellable. The cart and its reservations are untouched; the
    /// user may retry after adjusting.
    #[error("checkout failed: cart line availability changed")]
    CheckoutFailed { lines: Vec<FailedLine> },

    #[error(transparent)]
    Pricing(#[from] flacon::pricing::PricingError),
}
