//! Checkout coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use flacon::{
    items::LineItem,
    pricing::{PromotionOutcome, Totals, price_cart},
    promotions::InapplicableReason,
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, info, warn};

use crate::domain::{
    carts::{MemCartsRepository, records::CartUuid},
    inventory::InventoryLedger,
    orders::{
        data::CheckoutInputs,
        errors::{CheckoutError, FailedLine},
        records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid},
        repository::MemOrdersRepository,
        status::{FulfillmentStatus, OrderStatus, PaymentStatus},
    },
    promotions::{PromotionsService, ResolvedPromotion, resolve_promotion},
};

#[derive(Clone)]
pub struct MemCheckoutService {
    ledger: Arc<dyn InventoryLedger>,
    promotions: Arc<dyn PromotionsService>,
    carts: MemCartsRepository,
    orders: MemOrdersRepository,
}

impl MemCheckoutService {
    #[must_use]
    pub(crate) fn new(
        ledger: Arc<dyn InventoryLedger>,
        promotions: Arc<dyn PromotionsService>,
        carts: MemCartsRepository,
        orders: MemOrdersRepository,
    ) -> Self {
        Self {
            ledger,
            promotions,
            carts,
            orders,
        }
    }

    /// Authoritative totals for the cart at checkout time.
    async fn price(
        &self,
        items: &[LineItem],
        inputs: &CheckoutInputs,
        now: Timestamp,
    ) -> Result<Totals, CheckoutError> {
        let resolved =
            resolve_promotion(self.promotions.as_ref(), inputs.promotion_code.as_deref()).await;

        let (rule, unknown) = match resolved {
            ResolvedPromotion::None => (None, None),
            ResolvedPromotion::Rule(rule) => (Some(rule), None),
            ResolvedPromotion::Unknown(code) => (None, Some(code)),
        };

        let mut totals = price_cart(
            items,
            rule.as_ref(),
            inputs.shipping.as_ref(),
            inputs.tax_rate,
            now,
        )?;

        if let Some(code) = unknown {
            totals.promotion = PromotionOutcome::Inapplicable {
                code,
                reason: InapplicableReason::UnknownCode,
            };
        }

        Ok(totals)
    }
}

#[async_trait]
impl CheckoutService for MemCheckoutService {
    #[tracing::instrument(
        name = "orders.service.checkout",
        skip(self, inputs),
        fields(
            cart_uuid = %cart,
            order_uuid = tracing::field::Empty,
            total_amount = tracing::field::Empty,
            line_count = tracing::field::Empty
        ),
        err
    )]
    async fn checkout(
        &self,
        cart: CartUuid,
        inputs: CheckoutInputs,
        now: Timestamp,
    ) -> Result<OrderRecord, CheckoutError> {
        let record = self
            .carts
            .get(cart)
            .await
            .ok_or(CheckoutError::CartNotFound)?;

        if record.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let span = Span::current();

        span.record("line_count", record.items.len());

        // Pre-check pass: every reservation must still be live, its size
        // active and its quantity committable. A failure here aborts with
        // zero ledger mutation, which is what makes checkout atomic without
        // a multi-row transaction.
        let mut failed = Vec::new();

        for item in &record.items {
            if let Err(reason) = self.ledger.verify(item.reservation).await {
                failed.push(FailedLine {
                    item_uuid: item.uuid,
                    size_uuid: item.size_uuid,
                    reason,
                });
            }
        }

        if !failed.is_empty() {
            return Err(CheckoutError::CheckoutFailed { lines: failed });
        }

        let lines: Vec<LineItem> = record
            .items
            .iter()
            .map(|item| LineItem::new(item.unit_price, item.quantity))
            .collect();

        let totals = self.price(&lines, &inputs, now).await?;

        // Commit pass. The pre-check makes failures here unreachable unless
        // an external stock correction lands in the window between the two
        // passes; commits already made are irreversible and stand, the
        // failing line keeps its reservation, and the caller retries.
        for item in &record.items {
            if let Err(reason) = self.ledger.commit(item.reservation).await {
                warn!(
                    cart_item_uuid = %item.uuid,
                    size_uuid = %item.size_uuid,
                    %reason,
                    "commit failed after successful pre-check"
                );

                return Err(CheckoutError::CheckoutFailed {
                    lines: vec![FailedLine {
                        item_uuid: item.uuid,
                        size_uuid: item.size_uuid,
                        reason,
                    }],
                });
            }
        }

        let promotion_code = match &totals.promotion {
            PromotionOutcome::Applied { code } => Some(code.clone()),
            PromotionOutcome::None | PromotionOutcome::Inapplicable { .. } => None,
        };

        let order = OrderRecord {
            uuid: OrderUuid::new(),
            owner: record.owner,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            fulfillment_status: FulfillmentStatus::Unfulfilled,
            subtotal: totals.subtotal,
            discount_amount: totals.discount_amount,
            tax_amount: totals.tax_amount,
            shipping_cost: totals.shipping_cost,
            total_amount: totals.total,
            promotion_code,
            items: record
                .items
                .iter()
                .map(|item| OrderItemRecord {
                    uuid: OrderItemUuid::new(),
                    product_uuid: item.product_uuid,
                    size_uuid: item.size_uuid,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    options: item.options,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };

        self.orders.insert(order.clone()).await;

        // The cart's reservations were converted, not released: delete the
        // rows without touching the ledger.
        self.carts.remove_cart(cart).await;

        span.record("order_uuid", tracing::field::display(order.uuid));
        span.record("total_amount", order.total_amount);

        info!(order_uuid = %order.uuid, "checkout completed");

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Atomically converts a priced cart into a `Pending` order.
    ///
    /// On any failure the cart and its reservations are left untouched and
    /// the caller may retry; see [`CheckoutError::CheckoutFailed`] for the
    /// per-line detail the storefront surfaces.
    async fn checkout(
        &self,
        cart: CartUuid,
        inputs: CheckoutInputs,
        now: Timestamp,
    ) -> Result<OrderRecord, CheckoutError>;
}
