//! Cart records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::inventory::records::{ProductUuid, ReservationToken, SizeUuid},
    uuids::TypedUuid,
};

/// Marker for authenticated user identifiers, issued by the auth service.
#[derive(Debug, Clone, Copy)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Marker for anonymous session identifiers.
#[derive(Debug, Clone, Copy)]
pub struct Session;

/// Session UUID
pub type SessionUuid = TypedUuid<Session>;

/// Who a cart belongs to: an authenticated user or an anonymous session,
/// mutually exclusive until a guest cart merges on login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartOwner {
    User(UserUuid),
    Session(SessionUuid),
}

/// Per-line options. Lines with the same size but different options are
/// distinct cart rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemOptions {
    pub gift_wrap: bool,
    pub sample_included: bool,
}

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub owner: CartOwner,
    pub items: Vec<CartItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    /// The line matching a size/options pair, if any. Add and merge fold
    /// into this line instead of creating a duplicate row.
    #[must_use]
    pub fn line_for(&self, size: SizeUuid, options: ItemOptions) -> Option<&CartItemRecord> {
        self.items
            .iter()
            .find(|item| item.size_uuid == size && item.options == options)
    }

    /// The line with the given id, if any.
    #[must_use]
    pub fn item(&self, item: CartItemUuid) -> Option<&CartItemRecord> {
        self.items.iter().find(|candidate| candidate.uuid == item)
    }
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// CartItem Record
///
/// `unit_price` is snapshotted when the line is created and never
/// re-fetched; `reservation` is the line's live claim on its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub size_uuid: SizeUuid,
    pub quantity: u32,
    pub unit_price: u64,
    pub options: ItemOptions,
    pub reservation: ReservationToken,
    pub added_at: Timestamp,
}
