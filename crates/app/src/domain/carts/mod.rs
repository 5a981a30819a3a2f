//! Cart Store
//!
//! Owns cart and cart-item rows. Every quantity an item displays is backed
//! by a live ledger reservation, and every quantity change routes through
//! the ledger; the item row's existence is the durable record that its
//! reservation is outstanding.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;

pub(crate) use repository::MemCartsRepository;
