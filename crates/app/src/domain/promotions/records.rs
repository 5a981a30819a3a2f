//! Promotion records

use flacon::promotions::{DiscountKind, Promotion};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored promotion rule. Codes are kept uppercase; lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    pub code: String,
    pub discount: DiscountKind,
    pub min_order_total: u64,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub created_at: Timestamp,
}

impl PromotionRecord {
    /// The pure rule the pricing engine evaluates.
    #[must_use]
    pub fn to_rule(&self) -> Promotion {
        Promotion {
            code: self.code.clone(),
            discount: self.discount,
            min_order_total: self.min_order_total,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        }
    }
}
