//! End-to-end pricing behaviour: determinism, clamping and the combined
//! discount/tax/shipping interaction.

use flacon::{
    items::LineItem,
    pricing::{PromotionOutcome, price_cart},
    promotions::{DiscountKind, Promotion},
    shipping::ShippingMethod,
};
use jiff::Timestamp;
use rust_decimal::dec;
use testresult::TestResult;

fn save10() -> TestResult<Promotion> {
    Ok(Promotion {
        code: "SAVE10".to_string(),
        discount: DiscountKind::Percentage(dec!(10)),
        min_order_total: 0,
        starts_at: "2026-01-01T00:00:00Z".parse()?,
        ends_at: "2027-01-01T00:00:00Z".parse()?,
    })
}

#[test]
fn ten_percent_off_hundred_with_tax_and_free_shipping() -> TestResult {
    let items = [LineItem::new(25_00, 2), LineItem::new(50_00, 1)];
    let shipping = ShippingMethod {
        cost: 6_50,
        free_threshold: Some(75_00),
    };
    let now: Timestamp = "2026-06-01T00:00:00Z".parse()?;

    let totals = price_cart(&items, Some(&save10()?), Some(&shipping), dec!(0.08), now)?;

    assert_eq!(totals.subtotal, 100_00);
    assert_eq!(totals.discount_amount, 10_00);
    assert_eq!(totals.tax_amount, 7_20);
    assert_eq!(totals.shipping_cost, 0);
    assert_eq!(totals.total, 97_20);
    assert_eq!(
        totals.promotion,
        PromotionOutcome::Applied {
            code: "SAVE10".to_string()
        }
    );

    Ok(())
}

#[test]
fn pricing_is_deterministic_for_identical_inputs() -> TestResult {
    let items = [LineItem::new(19_99, 3), LineItem::new(7_25, 1)];
    let shipping = ShippingMethod {
        cost: 4_99,
        free_threshold: Some(50_00),
    };
    let now: Timestamp = "2026-06-01T00:00:00Z".parse()?;

    let first = price_cart(&items, Some(&save10()?), Some(&shipping), dec!(0.0825), now)?;
    let second = price_cart(&items, Some(&save10()?), Some(&shipping), dec!(0.0825), now)?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn discount_never_exceeds_subtotal() -> TestResult {
    let now: Timestamp = "2026-06-01T00:00:00Z".parse()?;

    let oversized = Promotion {
        code: "HUGE".to_string(),
        discount: DiscountKind::Fixed(1_000_00),
        ..save10()?
    };

    for subtotal in [0_u64, 1, 99, 10_00, 999_99] {
        let items = [LineItem::new(subtotal, 1)];

        let totals = price_cart(&items, Some(&oversized), None, dec!(0), now)?;

        assert!(
            totals.discount_amount <= totals.subtotal,
            "discount {} exceeded subtotal {}",
            totals.discount_amount,
            totals.subtotal
        );
        assert_eq!(totals.total, totals.subtotal - totals.discount_amount);
    }

    Ok(())
}

#[test]
fn expired_promotion_leaves_totals_undiscounted() -> TestResult {
    let items = [LineItem::new(100_00, 1)];
    let after_window: Timestamp = "2027-06-01T00:00:00Z".parse()?;

    let totals = price_cart(&items, Some(&save10()?), None, dec!(0.08), after_window)?;

    assert_eq!(totals.discount_amount, 0);
    assert_eq!(totals.tax_amount, 8_00);
    assert_eq!(totals.total, 108_00);

    Ok(())
}
