//! Order status machines

use serde::{Deserialize, Serialize};

/// Lifecycle of an order. Created as `Pending`; `Cancelled` is reachable
/// before shipment, `Refunded` from any post-payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Whether the machine permits moving from `self` to `to`.
    #[must_use]
    pub fn can_transition(self, to: Self) -> bool {
        use OrderStatus::{Cancelled, Delivered, Pending, Processing, Refunded, Shipped};

        matches!(
            (self, to),
            (Pending, Processing | Cancelled)
                | (Processing, Shipped | Cancelled | Refunded)
                | (Shipped, Delivered | Refunded)
                | (Delivered, Refunded)
        )
    }

    /// States with no outgoing transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }
}

/// Payment state, driven by the external payment service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Paid) | (Self::Paid, Self::Refunded)
        )
    }
}

/// Fulfillment state, which follows the shipped/delivered order transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentStatus {
    Unfulfilled,
    Shipped,
    Delivered,
}
