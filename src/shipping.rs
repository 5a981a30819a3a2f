//! Shipping methods

use serde::{Deserialize, Serialize};

/// A flat-cost shipping method with an optional free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    /// Flat cost in minor units.
    pub cost: u64,
    /// Subtotal (minor units) at or above which shipping is waived.
    pub free_threshold: Option<u64>,
}

impl ShippingMethod {
    /// The shipping cost charged for a cart with the given subtotal.
    #[must_use]
    pub fn cost_for(&self, subtotal: u64) -> u64 {
        match self.free_threshold {
            Some(threshold) if subtotal >= threshold => 0,
            _ => self.cost,
        }
    }
}
