//! In-memory cart rows.
//!
//! One lock over the whole table is fine here: a cart has a single logical
//! owner, so contention is structural rather than semantic, and no ledger
//! call ever happens while the lock is held.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::domain::carts::records::{CartItemRecord, CartItemUuid, CartOwner, CartRecord, CartUuid};

#[derive(Debug, Default)]
struct CartsState {
    carts: FxHashMap<CartUuid, CartRecord>,
    by_owner: FxHashMap<CartOwner, CartUuid>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemCartsRepository {
    state: Arc<RwLock<CartsState>>,
}

impl MemCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn get(&self, cart: CartUuid) -> Option<CartRecord> {
        self.state.read().await.carts.get(&cart).cloned()
    }

    pub(crate) async fn get_by_owner(&self, owner: CartOwner) -> Option<CartRecord> {
        let state = self.state.read().await;
        let uuid = state.by_owner.get(&owner)?;

        state.carts.get(uuid).cloned()
    }

    /// The owner's cart, created empty if they have none yet. Carts exist
    /// lazily, from the first add onwards.
    pub(crate) async fn get_or_create(&self, owner: CartOwner, now: Timestamp) -> CartRecord {
        let mut state = self.state.write().await;

        if let Some(uuid) = state.by_owner.get(&owner)
            && let Some(cart) = state.carts.get(uuid)
        {
            return cart.clone();
        }

        let cart = CartRecord {
            uuid: CartUuid::new(),
            owner,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        state.by_owner.insert(owner, cart.uuid);
        state.carts.insert(cart.uuid, cart.clone());

        cart
    }

    /// Replaces the line with the same id, or appends it. Bumps the cart's
    /// `updated_at`. Returns `false` when the cart no longer exists.
    pub(crate) async fn upsert_item(
        &self,
        cart: CartUuid,
        item: CartItemRecord,
        now: Timestamp,
    ) -> bool {
        let mut state = self.state.write().await;

        let Some(cart) = state.carts.get_mut(&cart) else {
            return false;
        };

        match cart.items.iter_mut().find(|line| line.uuid == item.uuid) {
            Some(line) => *line = item,
            None => cart.items.push(item),
        }

        cart.updated_at = now;

        true
    }

    pub(crate) async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        now: Timestamp,
    ) -> Option<CartItemRecord> {
        let mut state = self.state.write().await;
        let cart = state.carts.get_mut(&cart)?;

        let index = cart.items.iter().position(|line| line.uuid == item)?;
        let removed = cart.items.remove(index);

        cart.updated_at = now;

        Some(removed)
    }

    pub(crate) async fn remove_cart(&self, cart: CartUuid) -> Option<CartRecord> {
        let mut state = self.state.write().await;
        let removed = state.carts.remove(&cart)?;

        state.by_owner.remove(&removed.owner);

        Some(removed)
    }

    /// Removes and returns every cart idle for at least `ttl` as of `now`.
    pub(crate) async fn take_idle(&self, now: Timestamp, ttl: SignedDuration) -> Vec<CartRecord> {
        let mut state = self.state.write().await;

        let idle: Vec<CartUuid> = state
            .carts
            .values()
            .filter(|cart| now.duration_since(cart.updated_at) >= ttl)
            .map(|cart| cart.uuid)
            .collect();

        idle.into_iter()
            .filter_map(|uuid| {
                let cart = state.carts.remove(&uuid)?;

                state.by_owner.remove(&cart.owner);

                Some(cart)
            })
            .collect()
    }
}
