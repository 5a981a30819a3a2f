//! Domain modules

pub mod carts;
pub mod inventory;
pub mod orders;
pub mod promotions;
