//! Cart pricing

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    items::LineItem,
    promotions::{InapplicableReason, Promotion},
    shipping::ShippingMethod,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A line total or the cart total overflowed the minor-unit range.
    #[error("cart totals overflowed")]
    Overflow,

    /// The supplied tax rate was negative.
    #[error("tax rate must be non-negative")]
    InvalidTaxRate,
}

/// What became of the promotion supplied to [`price_cart`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionOutcome {
    /// No promotion was supplied.
    None,
    /// The promotion qualified and its discount is in the totals.
    Applied {
        /// The applied promotion's code.
        code: String,
    },
    /// The promotion was supplied but did not qualify; totals carry no
    /// discount. Callers decide whether to surface the reason.
    Inapplicable {
        /// The rejected promotion's code.
        code: String,
        /// Why it did not qualify.
        reason: InapplicableReason,
    },
}

/// The monetary breakdown of a priced cart, all in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of `unit_price × quantity` over all lines.
    pub subtotal: u64,
    /// Promotion discount, clamped to `[0, subtotal]`.
    pub discount_amount: u64,
    /// Tax on `subtotal − discount_amount` at the supplied rate.
    pub tax_amount: u64,
    /// Shipping cost after any free-shipping waiver.
    pub shipping_cost: u64,
    /// `subtotal − discount_amount + tax_amount + shipping_cost`.
    pub total: u64,
    /// What became of the supplied promotion.
    pub promotion: PromotionOutcome,
}

/// Sums the extended prices of `items`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when a line or the sum overflows.
pub fn subtotal(items: &[LineItem]) -> Result<u64, PricingError> {
    items.iter().try_fold(0_u64, |acc, item| {
        let line = item.line_total().ok_or(PricingError::Overflow)?;

        acc.checked_add(line).ok_or(PricingError::Overflow)
    })
}

/// Prices a cart snapshot.
///
/// Pure and deterministic: identical inputs, including `now`, always produce
/// identical [`Totals`]. The promotion validity window is the only
/// time-dependent input, and it is checked against `now`, never a clock.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] on minor-unit overflow and
/// [`PricingError::InvalidTaxRate`] when `tax_rate` is negative. An
/// inapplicable promotion is not an error; see [`PromotionOutcome`].
pub fn price_cart(
    items: &[LineItem],
    promotion: Option<&Promotion>,
    shipping: Option<&ShippingMethod>,
    tax_rate: Decimal,
    now: Timestamp,
) -> Result<Totals, PricingError> {
    if tax_rate < Decimal::ZERO {
        return Err(PricingError::InvalidTaxRate);
    }

    let subtotal = subtotal(items)?;

    let (discount_amount, promotion) = match promotion {
        None => (0, PromotionOutcome::None),
        Some(promo) => match promo.eligibility(subtotal, now) {
            Ok(()) => (
                promo.discount_amount(subtotal),
                PromotionOutcome::Applied {
                    code: promo.code.clone(),
                },
            ),
            Err(reason) => (
                0,
                PromotionOutcome::Inapplicable {
                    code: promo.code.clone(),
                    reason,
                },
            ),
        },
    };

    let discounted = subtotal.saturating_sub(discount_amount);
    let tax_amount = tax_on(discounted, tax_rate);
    let shipping_cost = shipping.map_or(0, |method| method.cost_for(subtotal));

    let total = discounted
        .checked_add(tax_amount)
        .and_then(|t| t.checked_add(shipping_cost))
        .ok_or(PricingError::Overflow)?;

    Ok(Totals {
        subtotal,
        discount_amount,
        tax_amount,
        shipping_cost,
        total,
        promotion,
    })
}

/// Tax on `amount` at `rate` (e.g. `0.08` for 8%), rounded half-up.
fn tax_on(amount: u64, rate: Decimal) -> u64 {
    let tax = (Decimal::from(amount) * rate)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    tax.to_u64().unwrap_or(0)
}
