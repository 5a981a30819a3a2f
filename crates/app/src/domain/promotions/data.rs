//! Promotion data

use flacon::promotions::DiscountKind;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// New Promotion Data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPromotion {
    pub code: String,
    pub discount: DiscountKind,
    pub min_order_total: u64,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}
