//! App Context

use std::sync::Arc;

use crate::{
    domain::{
        carts::{CartsService, MemCartsRepository, MemCartsService},
        inventory::{InventoryLedger, MemInventoryLedger},
        orders::{
            CheckoutService, MemCheckoutService, MemOrdersRepository, MemOrdersService,
            OrdersService,
        },
        promotions::{MemPromotionsService, PromotionsService},
    },
    settings::CartSettings,
};

/// The wired storefront core, handed to the API layer.
#[derive(Clone)]
pub struct AppContext {
    pub ledger: Arc<dyn InventoryLedger>,
    pub carts: Arc<dyn CartsService>,
    pub promotions: Arc<dyn PromotionsService>,
    pub orders: Arc<dyn OrdersService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build an application context over in-memory stores.
    #[must_use]
    pub fn in_memory(settings: CartSettings) -> Self {
        let ledger: Arc<dyn InventoryLedger> = Arc::new(MemInventoryLedger::new());
        let promotions: Arc<dyn PromotionsService> = Arc::new(MemPromotionsService::new());
        let carts_repository = MemCartsRepository::new();
        let orders_repository = MemOrdersRepository::new();

        Self {
            carts: Arc::new(MemCartsService::new(
                Arc::clone(&ledger),
                Arc::clone(&promotions),
                carts_repository.clone(),
                settings,
            )),
            checkout: Arc::new(MemCheckoutService::new(
                Arc::clone(&ledger),
                Arc::clone(&promotions),
                carts_repository,
                orders_repository.clone(),
            )),
            orders: Arc::new(MemOrdersService::new(orders_repository)),
            ledger,
            promotions,
        }
    }
}
