//! Cart settings

use jiff::SignedDuration;
use serde::Deserialize;

/// Tunables owned by the cart store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CartSettings {
    /// How long a cart may sit untouched before the idle sweep releases its
    /// reservations and deletes it.
    pub idle_ttl: SignedDuration,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            idle_ttl: SignedDuration::from_hours(2),
        }
    }
}
