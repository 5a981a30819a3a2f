//! Orders
//!
//! The checkout coordinator converts a priced cart into an immutable order,
//! and the orders service guards the status transitions the fulfillment
//! service drives afterwards.

pub mod checkout;
pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;
pub mod status;

pub use checkout::*;
pub use errors::{CheckoutError, OrdersServiceError};
pub use service::*;

pub(crate) use repository::MemOrdersRepository;
