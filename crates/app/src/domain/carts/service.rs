//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use flacon::{
    pricing::{PromotionOutcome, Totals},
    promotions::InapplicableReason,
    shipping::ShippingMethod,
};
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    domain::{
        carts::{
            data::{MergeLine, MergeReport, NewCartItem},
            errors::CartsServiceError,
            records::{
                CartItemRecord, CartItemUuid, CartOwner, CartRecord, CartUuid, ItemOptions,
                SessionUuid, UserUuid,
            },
            repository::MemCartsRepository,
        },
        inventory::{InventoryLedger, LedgerError},
        promotions::{PromotionsService, ResolvedPromotion, resolve_promotion},
    },
    settings::CartSettings,
};

#[derive(Clone)]
pub struct MemCartsService {
    ledger: Arc<dyn InventoryLedger>,
    promotions: Arc<dyn PromotionsService>,
    repository: MemCartsRepository,
    settings: CartSettings,
}

impl MemCartsService {
    #[must_use]
    pub fn new(
        ledger: Arc<dyn InventoryLedger>,
        promotions: Arc<dyn PromotionsService>,
        repository: MemCartsRepository,
        settings: CartSettings,
    ) -> Self {
        Self {
            ledger,
            promotions,
            repository,
            settings,
        }
    }

    /// Fold a guest line into an existing user line by growing the user
    /// line's reservation, clamped to what the ledger can still grant.
    /// Returns the quantity gained.
    async fn fold_into_line(
        &self,
        user_cart: CartUuid,
        line: CartItemRecord,
        requested: u32,
        now: Timestamp,
    ) -> u32 {
        let base = line.quantity;
        let mut target = base.saturating_add(requested);

        loop {
            match self.ledger.adjust(line.reservation, target).await {
                Ok(token) => {
                    let updated = CartItemRecord {
                        quantity: target,
                        reservation: token,
                        ..line
                    };

                    self.repository.upsert_item(user_cart, updated, now).await;

                    break target - base;
                }
                Err(LedgerError::InsufficientStock { available }) => {
                    if available <= base {
                        break 0;
                    }

                    // Retry at the quantity the ledger said was achievable;
                    // a concurrent claim may shrink it again.
                    target = available;
                }
                Err(_) => break 0,
            }
        }
    }
}

#[async_trait]
impl CartsService for MemCartsService {
    async fn get_cart(&self, owner: CartOwner) -> Result<CartRecord, CartsServiceError> {
        self.repository
            .get_by_owner(owner)
            .await
            .ok_or(CartsServiceError::NotFound)
    }

    async fn find_cart(&self, cart: CartUuid) -> Result<CartRecord, CartsServiceError> {
        self.repository
            .get(cart)
            .await
            .ok_or(CartsServiceError::NotFound)
    }

    async fn add_item(
        &self,
        owner: CartOwner,
        item: NewCartItem,
        now: Timestamp,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if item.quantity == 0 {
            return Err(LedgerError::InvalidQuantity.into());
        }

        let cart = self.repository.get_or_create(owner, now).await;

        if let Some(line) = cart.line_for(item.size_uuid, item.options) {
            let target = line.quantity.saturating_add(item.quantity);
            let token = self.ledger.adjust(line.reservation, target).await?;

            let updated = CartItemRecord {
                quantity: target,
                reservation: token,
                ..line.clone()
            };

            self.repository
                .upsert_item(cart.uuid, updated.clone(), now)
                .await;

            return Ok(updated);
        }

        // Snapshot the price before reserving so a failed lookup cannot
        // leave a stray reservation behind.
        let snapshot = self.ledger.size_snapshot(item.size_uuid).await?;
        let token = self.ledger.reserve(item.size_uuid, item.quantity).await?;

        let record = CartItemRecord {
            uuid: CartItemUuid::new(),
            product_uuid: snapshot.product_uuid,
            size_uuid: item.size_uuid,
            quantity: item.quantity,
            unit_price: snapshot.effective_price(),
            options: item.options,
            reservation: token,
            added_at: now,
        };

        if !self
            .repository
            .upsert_item(cart.uuid, record.clone(), now)
            .await
        {
            // The cart expired between creation and insert; undo the claim.
            self.ledger.release(token).await;

            return Err(CartsServiceError::NotFound);
        }

        Ok(record)
    }

    async fn update_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        new_quantity: u32,
        now: Timestamp,
    ) -> Result<CartItemRecord, CartsServiceError> {
        let record = self
            .repository
            .get(cart)
            .await
            .ok_or(CartsServiceError::NotFound)?;

        let line = record.item(item).ok_or(CartsServiceError::ItemNotFound)?;

        if line.quantity == new_quantity {
            return Ok(line.clone());
        }

        // On failure the reservation, and therefore the line, is unchanged.
        let token = self.ledger.adjust(line.reservation, new_quantity).await?;

        let updated = CartItemRecord {
            quantity: new_quantity,
            reservation: token,
            ..line.clone()
        };

        self.repository
            .upsert_item(cart, updated.clone(), now)
            .await;

        Ok(updated)
    }

    async fn update_item_options(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        options: ItemOptions,
        now: Timestamp,
    ) -> Result<CartItemRecord, CartsServiceError> {
        let record = self
            .repository
            .get(cart)
            .await
            .ok_or(CartsServiceError::NotFound)?;

        let line = record
            .item(item)
            .ok_or(CartsServiceError::ItemNotFound)?
            .clone();

        if line.options == options {
            return Ok(line);
        }

        // Changing options may collide with an existing line for the same
        // size; fold the two together rather than keeping duplicate rows.
        if let Some(other) = record.line_for(line.size_uuid, options) {
            let target = other.quantity.saturating_add(line.quantity);
            let token = self.ledger.adjust(other.reservation, target).await?;

            let merged = CartItemRecord {
                quantity: target,
                reservation: token,
                ..other.clone()
            };

            self.ledger.release(line.reservation).await;
            self.repository.remove_item(cart, item, now).await;
            self.repository
                .upsert_item(cart, merged.clone(), now)
                .await;

            return Ok(merged);
        }

        let updated = CartItemRecord { options, ..line };

        self.repository
            .upsert_item(cart, updated.clone(), now)
            .await;

        Ok(updated)
    }

    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        now: Timestamp,
    ) -> Result<(), CartsServiceError> {
        let record = self
            .repository
            .get(cart)
            .await
            .ok_or(CartsServiceError::NotFound)?;

        let line = record.item(item).ok_or(CartsServiceError::ItemNotFound)?;

        // Release before delete: if we stop between the two, the surviving
        // row still names a token the ledger treats as released, and release
        // is idempotent.
        self.ledger.release(line.reservation).await;
        self.repository.remove_item(cart, item, now).await;

        Ok(())
    }

    #[tracing::instrument(
        name = "carts.service.merge_guest_cart",
        skip(self),
        fields(session_uuid = %session, user_uuid = %user),
        err
    )]
    async fn merge_guest_cart(
        &self,
        session: SessionUuid,
        user: UserUuid,
        now: Timestamp,
    ) -> Result<MergeReport, CartsServiceError> {
        let Some(guest) = self
            .repository
            .get_by_owner(CartOwner::Session(session))
            .await
        else {
            return Ok(MergeReport::default());
        };

        let user_cart = self
            .repository
            .get_or_create(CartOwner::User(user), now)
            .await;

        let mut report = MergeReport::default();

        for guest_item in guest.items {
            let requested = guest_item.quantity;

            let current = self
                .repository
                .get(user_cart.uuid)
                .await
                .ok_or(CartsServiceError::NotFound)?;

            let granted = match current.line_for(guest_item.size_uuid, guest_item.options) {
                // No matching line: the item moves wholesale, reservation
                // token unchanged.
                None => {
                    self.repository
                        .upsert_item(user_cart.uuid, guest_item.clone(), now)
                        .await;

                    requested
                }
                Some(line) => {
                    let granted = self
                        .fold_into_line(user_cart.uuid, line.clone(), requested, now)
                        .await;

                    self.ledger.release(guest_item.reservation).await;

                    granted
                }
            };

            report.lines.push(MergeLine {
                size_uuid: guest_item.size_uuid,
                options: guest_item.options,
                requested,
                granted,
            });
        }

        self.repository.remove_cart(guest.uuid).await;

        info!(
            lines = report.lines.len(),
            shortfalls = report.shortfalls().count(),
            "merged guest cart"
        );

        Ok(report)
    }

    async fn expire_idle_carts(&self, now: Timestamp) -> usize {
        let expired = self
            .repository
            .take_idle(now, self.settings.idle_ttl)
            .await;

        for cart in &expired {
            for item in &cart.items {
                // Idempotent: racing a user-initiated release is harmless.
                self.ledger.release(item.reservation).await;
            }
        }

        if expired.is_empty() {
            return 0;
        }

        info!(count = expired.len(), "expired idle carts");

        expired.len()
    }

    async fn price_cart(
        &self,
        cart: CartUuid,
        promotion_code: Option<String>,
        shipping: Option<ShippingMethod>,
        tax_rate: Decimal,
        now: Timestamp,
    ) -> Result<Totals, CartsServiceError> {
        let record = self
            .repository
            .get(cart)
            .await
            .ok_or(CartsServiceError::NotFound)?;

        let items: Vec<flacon::items::LineItem> = record
            .items
            .iter()
            .map(|item| flacon::items::LineItem::new(item.unit_price, item.quantity))
            .collect();

        let resolved =
            resolve_promotion(self.promotions.as_ref(), promotion_code.as_deref()).await;

        let (rule, unknown) = match resolved {
            ResolvedPromotion::None => (None, None),
            ResolvedPromotion::Rule(rule) => (Some(rule), None),
            ResolvedPromotion::Unknown(code) => {
                warn!(code = %code, "unknown promotion code");

                (None, Some(code))
            }
        };

        let mut totals = flacon::pricing::price_cart(
            &items,
            rule.as_ref(),
            shipping.as_ref(),
            tax_rate,
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

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The owner's current cart.
    async fn get_cart(&self, owner: CartOwner) -> Result<CartRecord, CartsServiceError>;

    /// A cart by id.
    async fn find_cart(&self, cart: CartUuid) -> Result<CartRecord, CartsServiceError>;

    /// Adds an item to the owner's cart, creating the cart on first add.
    /// An existing line for the same size and options grows instead of
    /// duplicating; either way the quantity is backed by a reservation.
    async fn add_item(
        &self,
        owner: CartOwner,
        item: NewCartItem,
        now: Timestamp,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Changes a line's quantity. On failure the line is left unchanged.
    async fn update_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        new_quantity: u32,
        now: Timestamp,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Changes a line's options, folding into an existing line with the
    /// same size and target options when one exists.
    async fn update_item_options(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        options: ItemOptions,
        now: Timestamp,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Removes a line, releasing its reservation first.
    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        now: Timestamp,
    ) -> Result<(), CartsServiceError>;

    /// Folds a session's guest cart into the user's cart on login; see
    /// [`MergeReport`] for what the storefront shows about shortfalls.
    async fn merge_guest_cart(
        &self,
        session: SessionUuid,
        user: UserUuid,
        now: Timestamp,
    ) -> Result<MergeReport, CartsServiceError>;

    /// Background sweep: releases and deletes carts idle past the TTL.
    /// Returns how many carts were reclaimed.
    async fn expire_idle_carts(&self, now: Timestamp) -> usize;

    /// Prices the cart's current snapshot through the engine.
    async fn price_cart(
        &self,
        cart: CartUuid,
        promotion_code: Option<String>,
        shipping: Option<ShippingMethod>,
        tax_rate: Decimal,
        now: Timestamp,
    ) -> Result<Totals, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use flacon::promotions::DiscountKind;
    use rust_decimal::dec;
    use testresult::TestResult;

    use crate::{
        domain::inventory::{
            MockInventoryLedger,
            records::{ProductUuid, SizeRecord, SizeSeed, SizeUuid},
        },
        domain::promotions::MemPromotionsService,
        test::TestContext,
    };

    use super::*;

    fn new_item(size: SizeUuid, quantity: u32) -> NewCartItem {
        NewCartItem {
            product_uuid: ProductUuid::new(),
            size_uuid: size,
            quantity,
            options: ItemOptions::default(),
        }
    }

    fn gift_wrapped(size: SizeUuid, quantity: u32) -> NewCartItem {
        NewCartItem {
            options: ItemOptions {
                gift_wrap: true,
                sample_included: false,
            },
            ..new_item(size, quantity)
        }
    }

    #[tokio::test]
    async fn add_item_reserves_stock_and_snapshots_price() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        let item = ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await?;

        assert_eq!(item.quantity, 2);
        assert_eq!(item.unit_price, 100_00);
        assert_eq!(item.reservation.quantity, 2);

        let snapshot = ctx.ledger.size_snapshot(size).await?;

        assert_eq!(snapshot.reserved_quantity, 2);
        assert_eq!(snapshot.sellable(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn first_add_creates_the_cart() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());

        let result = ctx.carts.get_cart(owner).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound before first add, got {result:?}"
        );

        let size = ctx.seed_size(5, 100_00).await;

        ctx.carts.add_item(owner, new_item(size, 1), ctx.now).await?;

        let cart = ctx.carts.get_cart(owner).await?;

        assert_eq!(cart.owner, owner);
        assert_eq!(cart.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn same_size_and_options_grow_one_line() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await?;
        ctx.carts.add_item(owner, new_item(size, 1), ctx.now).await?;

        let cart = ctx.carts.get_cart(owner).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(ctx.ledger.size_snapshot(size).await?.reserved_quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn distinct_options_keep_separate_lines() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await?;
        ctx.carts
            .add_item(owner, gift_wrapped(size, 1), ctx.now)
            .await?;

        let cart = ctx.carts.get_cart(owner).await?;

        assert_eq!(cart.items.len(), 2);
        assert_eq!(ctx.ledger.size_snapshot(size).await?.reserved_quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_is_surfaced_with_availability() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(1, 100_00).await;

        let result = ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Ledger(
                    LedgerError::InsufficientStock { available: 1 }
                ))
            ),
            "expected InsufficientStock with 1 available, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn inactive_size_cannot_be_added() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        ctx.ledger.set_size_active(size, false).await?;

        let result = ctx.carts.add_item(owner, new_item(size, 1), ctx.now).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Ledger(LedgerError::InactiveSize))
            ),
            "expected InactiveSize, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        let result = ctx.carts.add_item(owner, new_item(size, 0), ctx.now).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Ledger(LedgerError::InvalidQuantity))
            ),
            "expected InvalidQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unit_price_snapshot_survives_catalog_price_change() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        ctx.carts.add_item(owner, new_item(size, 1), ctx.now).await?;

        // Catalog raises the price after the line was created.
        let snapshot = ctx.ledger.size_snapshot(size).await?;

        ctx.ledger
            .upsert_size(SizeSeed {
                uuid: snapshot.uuid,
                product_uuid: snapshot.product_uuid,
                size_ml: snapshot.size_ml,
                price: 120_00,
                sale_price: None,
                stock_quantity: snapshot.stock_quantity,
                low_stock_threshold: snapshot.low_stock_threshold,
                sku: snapshot.sku,
                is_active: true,
            })
            .await;

        let cart = ctx.carts.get_cart(owner).await?;
        let totals = ctx
            .carts
            .price_cart(cart.uuid, None, None, dec!(0), ctx.now)
            .await?;

        assert_eq!(totals.subtotal, 100_00);

        Ok(())
    }

    #[tokio::test]
    async fn failed_update_leaves_the_line_unchanged() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(3, 100_00).await;

        let item = ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await?;
        let cart = ctx.carts.get_cart(owner).await?;

        let result = ctx
            .carts
            .update_item(cart.uuid, item.uuid, 10, ctx.now)
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Ledger(
                    LedgerError::InsufficientStock { available: 3 }
                ))
            ),
            "expected InsufficientStock with 3 available, got {result:?}"
        );

        let cart = ctx.carts.get_cart(owner).await?;

        assert_eq!(cart.items[0].quantity, 2);

        let updated = ctx
            .carts
            .update_item(cart.uuid, item.uuid, 3, ctx.now)
            .await?;

        assert_eq!(updated.quantity, 3);
        assert_eq!(ctx.ledger.size_snapshot(size).await?.sellable(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_releases_its_reservation() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        let item = ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await?;
        let cart = ctx.carts.get_cart(owner).await?;

        ctx.carts.remove_item(cart.uuid, item.uuid, ctx.now).await?;

        let snapshot = ctx.ledger.size_snapshot(size).await?;

        assert_eq!(snapshot.reserved_quantity, 0);
        assert_eq!(snapshot.sellable(), 5);
        assert!(ctx.carts.get_cart(owner).await?.items.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn changing_options_folds_into_the_matching_line() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        let plain = ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await?;

        ctx.carts
            .add_item(owner, gift_wrapped(size, 1), ctx.now)
            .await?;

        let cart = ctx.carts.get_cart(owner).await?;
        let wrapped_options = ItemOptions {
            gift_wrap: true,
            sample_included: false,
        };

        let merged = ctx
            .carts
            .update_item_options(cart.uuid, plain.uuid, wrapped_options, ctx.now)
            .await?;

        assert_eq!(merged.quantity, 3);
        assert_eq!(merged.options, wrapped_options);

        let cart = ctx.carts.get_cart(owner).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(ctx.ledger.size_snapshot(size).await?.reserved_quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn merge_moves_unmatched_lines_with_token_unchanged() -> TestResult {
        let ctx = TestContext::new();
        let session = SessionUuid::new();
        let user = UserUuid::new();
        let size = ctx.seed_size(5, 100_00).await;

        let guest_item = ctx
            .carts
            .add_item(CartOwner::Session(session), new_item(size, 2), ctx.now)
            .await?;

        let report = ctx.carts.merge_guest_cart(session, user, ctx.now).await?;

        assert_eq!(report.lines.len(), 1);
        assert!(report.lines[0].fully_merged());

        let cart = ctx.carts.get_cart(CartOwner::User(user)).await?;

        // The line moved wholesale: same reservation, no ledger churn.
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].reservation.uuid, guest_item.reservation.uuid);
        assert_eq!(ctx.ledger.size_snapshot(size).await?.reserved_quantity, 2);

        let result = ctx.carts.get_cart(CartOwner::Session(session)).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected the guest cart to be gone, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn merge_sums_matching_lines_clamped_to_stock() -> TestResult {
        let ctx = TestContext::new();
        let session = SessionUuid::new();
        let user = UserUuid::new();
        let size = ctx.seed_size(5, 100_00).await;

        ctx.carts
            .add_item(CartOwner::User(user), new_item(size, 2), ctx.now)
            .await?;
        ctx.carts
            .add_item(CartOwner::Session(session), new_item(size, 2), ctx.now)
            .await?;

        // Both reservations are live, so only 1 unit is still sellable and
        // the merge can grow the user line to 3, not 4.
        let report = ctx.carts.merge_guest_cart(session, user, ctx.now).await?;

        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].requested, 2);
        assert_eq!(report.lines[0].granted, 1);
        assert_eq!(report.shortfalls().count(), 1);

        let cart = ctx.carts.get_cart(CartOwner::User(user)).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);

        let snapshot = ctx.ledger.size_snapshot(size).await?;

        assert_eq!(snapshot.reserved_quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn merge_without_a_guest_cart_is_empty() -> TestResult {
        let ctx = TestContext::new();

        let report = ctx
            .carts
            .merge_guest_cart(SessionUuid::new(), UserUuid::new(), ctx.now)
            .await?;

        assert!(report.lines.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn idle_carts_are_swept_and_their_stock_freed() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await?;

        // Under the default two-hour TTL the cart survives the first sweep.
        assert_eq!(ctx.carts.expire_idle_carts(ctx.later(60)).await, 0);
        assert_eq!(ctx.carts.expire_idle_carts(ctx.later(121)).await, 1);

        let snapshot = ctx.ledger.size_snapshot(size).await?;

        assert_eq!(snapshot.reserved_quantity, 0);
        assert_eq!(snapshot.sellable(), 5);

        let result = ctx.carts.get_cart(owner).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected the expired cart to be gone, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn activity_resets_the_idle_clock() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        ctx.carts.add_item(owner, new_item(size, 1), ctx.now).await?;
        ctx.carts
            .add_item(owner, new_item(size, 1), ctx.later(90))
            .await?;

        // 121 minutes after creation but only 31 after the last touch.
        assert_eq!(ctx.carts.expire_idle_carts(ctx.later(121)).await, 0);
        assert!(ctx.carts.get_cart(owner).await.is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn price_cart_applies_promotion_shipping_and_tax() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        ctx.seed_promotion("SAVE10", DiscountKind::Percentage(dec!(10)), 0)
            .await;
        ctx.carts.add_item(owner, new_item(size, 1), ctx.now).await?;

        let cart = ctx.carts.get_cart(owner).await?;

        let totals = ctx
            .carts
            .price_cart(
                cart.uuid,
                Some("save10".to_string()),
                Some(ShippingMethod {
                    cost: 6_50,
                    free_threshold: Some(75_00),
                }),
                dec!(0.08),
                ctx.now,
            )
            .await?;

        assert_eq!(totals.subtotal, 100_00);
        assert_eq!(totals.discount_amount, 10_00);
        assert_eq!(totals.tax_amount, 7_20);
        assert_eq!(totals.shipping_cost, 0);
        assert_eq!(totals.total, 97_20);
        assert!(matches!(
            totals.promotion,
            PromotionOutcome::Applied { ref code } if code == "SAVE10"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn unknown_promotion_code_is_reported_not_fatal() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, 100_00).await;

        ctx.carts.add_item(owner, new_item(size, 1), ctx.now).await?;

        let cart = ctx.carts.get_cart(owner).await?;

        let totals = ctx
            .carts
            .price_cart(cart.uuid, Some("nope".to_string()), None, dec!(0), ctx.now)
            .await?;

        assert_eq!(totals.discount_amount, 0);
        assert_eq!(totals.total, 100_00);
        assert!(
            matches!(
                totals.promotion,
                PromotionOutcome::Inapplicable {
                    ref code,
                    reason: InapplicableReason::UnknownCode,
                } if code == "NOPE"
            ),
            "expected Inapplicable(NOPE), got {:?}",
            totals.promotion
        );

        Ok(())
    }

    #[tokio::test]
    async fn pricing_overflow_is_surfaced() -> TestResult {
        let ctx = TestContext::new();
        let owner = CartOwner::User(UserUuid::new());
        let size = ctx.seed_size(5, u64::MAX).await;

        ctx.carts.add_item(owner, new_item(size, 2), ctx.now).await?;

        let cart = ctx.carts.get_cart(owner).await?;

        let result = ctx
            .carts
            .price_cart(cart.uuid, None, None, dec!(0), ctx.now)
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Pricing(
                    flacon::pricing::PricingError::Overflow
                ))
            ),
            "expected Overflow, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn ledger_failures_propagate_through_the_service() -> TestResult {
        let size = SizeUuid::new();
        let record = SizeRecord {
            uuid: size,
            product_uuid: ProductUuid::new(),
            size_ml: 50,
            price: 100_00,
            sale_price: None,
            stock_quantity: 0,
            reserved_quantity: 0,
            low_stock_threshold: 2,
            sku: "VET-50".to_string(),
            is_active: true,
        };

        let mut ledger = MockInventoryLedger::new();

        ledger
            .expect_size_snapshot()
            .returning(move |_| Ok(record.clone()));
        ledger
            .expect_reserve()
            .returning(|_, _| Err(LedgerError::InsufficientStock { available: 0 }));

        let service = MemCartsService::new(
            Arc::new(ledger),
            Arc::new(MemPromotionsService::new()),
            MemCartsRepository::new(),
            CartSettings::default(),
        );

        let result = service
            .add_item(
                CartOwner::User(UserUuid::new()),
                new_item(size, 1),
                "2026-06-01T00:00:00Z".parse()?,
            )
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Ledger(
                    LedgerError::InsufficientStock { available: 0 }
                ))
            ),
            "expected InsufficientStock, got {result:?}"
        );

        Ok(())
    }
}
