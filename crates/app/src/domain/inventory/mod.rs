//! Inventory Ledger
//!
//! The single owner of per-size stock and reservation counters. Every
//! quantity a cart displays is backed by a reservation here; nothing else in
//! the system mutates `stock_quantity` or `reserved_quantity`.

pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::LedgerError;
pub use service::*;
