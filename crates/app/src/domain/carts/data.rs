//! Cart data

use serde::{Deserialize, Serialize};

use crate::domain::{
    carts::records::ItemOptions,
    inventory::records::{ProductUuid, SizeUuid},
};

/// New Cart Item Data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub size_uuid: SizeUuid,
    pub quantity: u32,
    pub options: ItemOptions,
}

/// The per-line outcome of a guest-cart merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeLine {
    pub size_uuid: SizeUuid,
    pub options: ItemOptions,
    /// Quantity the guest cart held.
    pub requested: u32,
    /// Quantity the user cart gained, clamped to sellable stock.
    pub granted: u32,
}

impl MergeLine {
    /// Whether the full guest quantity made it into the user cart.
    #[must_use]
    pub fn fully_merged(&self) -> bool {
        self.granted == self.requested
    }
}

/// What happened to each guest line during a merge. Lines that could not
/// fully merge are what the storefront shows the user after login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub lines: Vec<MergeLine>,
}

impl MergeReport {
    /// Lines whose quantity was reduced or dropped.
    pub fn shortfalls(&self) -> impl Iterator<Item = &MergeLine> {
        self.lines.iter().filter(|line| !line.fully_merged())
    }
}
