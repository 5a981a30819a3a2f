//! Stateful domain services for the Flacon storefront core: the inventory
//! ledger, the cart store, the promotions registry and the checkout
//! coordinator.

pub mod context;
pub mod domain;
pub mod settings;

#[cfg(test)]
mod test;

pub mod uuids;
