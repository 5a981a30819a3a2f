//! Order records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        carts::records::{CartOwner, ItemOptions},
        inventory::records::{ProductUuid, SizeUuid},
        orders::status::{FulfillmentStatus, OrderStatus, PaymentStatus},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
///
/// Created exactly once by checkout and never deleted; status transitions
/// are the only mutation path afterwards. The monetary fields are the
/// authoritative totals snapshot taken at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub owner: CartOwner,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub subtotal: u64,
    pub discount_amount: u64,
    pub tax_amount: u64,
    pub shipping_cost: u64,
    pub total_amount: u64,
    pub promotion_code: Option<String>,
    pub items: Vec<OrderItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// OrderItem Record — a cart line frozen at checkout: size, quantity and
/// unit price locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub size_uuid: SizeUuid,
    pub quantity: u32,
    pub unit_price: u64,
    pub options: ItemOptions,
}
