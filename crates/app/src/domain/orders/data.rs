//! Checkout data

use flacon::shipping::ShippingMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The pricing inputs supplied at checkout time. Totals are always
/// recomputed server-side from these; client-side numbers are never
/// trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutInputs {
    pub promotion_code: Option<String>,
    pub shipping: Option<ShippingMethod>,
    /// Externally supplied tax rate, e.g. `0.08`; jurisdiction logic is out
    /// of scope.
    pub tax_rate: Decimal,
}
