//! Flacon
//!
//! Flacon is the pricing and promotion engine of a fragrance storefront: pure
//! computation over snapshots of cart lines, promotion rules and shipping
//! methods. All stateful concerns (inventory reservations, carts, checkout)
//! live in `flacon-app`.

pub mod items;
pub mod pricing;
pub mod promotions;
pub mod shipping;
