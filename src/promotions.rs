//! Promotions

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

/// The discount a promotion grants once it qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    /// A percentage of the cart subtotal, e.g. `10` for 10% off.
    Percentage(Decimal),
    /// A fixed amount in minor units.
    Fixed(u64),
}

/// A stateless promotion rule.
///
/// Applying a promotion is a pure function of the rule, the cart subtotal and
/// a supplied "now"; re-evaluating after every cart change is what keeps
/// discounts from going stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    /// The code customers enter, matched case-insensitively by the registry.
    pub code: String,
    /// What the promotion grants.
    pub discount: DiscountKind,
    /// Minimum cart subtotal (minor units) for the promotion to qualify.
    pub min_order_total: u64,
    /// Start of the validity window (inclusive).
    pub starts_at: Timestamp,
    /// End of the validity window (exclusive).
    pub ends_at: Timestamp,
}

/// Why a present promotion did not apply. Non-fatal: totals are still
/// produced, just without a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InapplicableReason {
    /// No promotion is registered under the supplied code.
    UnknownCode,
    /// The validity window has not opened yet.
    NotStarted,
    /// The validity window has closed.
    Expired,
    /// The cart subtotal is below the promotion's minimum.
    BelowMinimum {
        /// The subtotal the promotion requires, in minor units.
        required: u64,
    },
}

impl Promotion {
    /// Checks whether this promotion applies to the given subtotal at `now`.
    ///
    /// # Errors
    ///
    /// Returns the [`InapplicableReason`] when the validity window or the
    /// minimum-subtotal threshold disqualifies the promotion.
    pub fn eligibility(&self, subtotal: u64, now: Timestamp) -> Result<(), InapplicableReason> {
        if now < self.starts_at {
            return Err(InapplicableReason::NotStarted);
        }

        if now >= self.ends_at {
            return Err(InapplicableReason::Expired);
        }

        if subtotal < self.min_order_total {
            return Err(InapplicableReason::BelowMinimum {
                required: self.min_order_total,
            });
        }

        Ok(())
    }

    /// The discount this promotion grants on `subtotal`, clamped to
    /// `[0, subtotal]`. Eligibility is checked separately.
    #[must_use]
    pub fn discount_amount(&self, subtotal: u64) -> u64 {
        let raw = match self.discount {
            DiscountKind::Percentage(percent) => percentage_of(subtotal, percent),
            DiscountKind::Fixed(amount) => amount,
        };

        raw.min(subtotal)
    }
}

/// `percent`% of `subtotal`, rounded half-up to minor units. Negative or
/// non-convertible results collapse to zero.
fn percentage_of(subtotal: u64, percent: Decimal) -> u64 {
    let amount = (Decimal::from(subtotal) * percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    amount.to_u64().unwrap_or(0)
}
