//! Promotions registry
//!
//! Stores promotion rules keyed by code. The rules themselves are pure
//! [`flacon::promotions::Promotion`] values; applying one to a cart is the
//! engine's job and is re-evaluated on every pricing call.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::PromotionsServiceError;
pub use service::*;
