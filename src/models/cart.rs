//! Cart contents and price math.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::Product;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u64,
    pub product: Product,
    pub quantity: u32,
    // the API has used both names for the creation timestamp
    #[serde(default, alias = "added_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CartItem {
    pub fn product_total(&self) -> u64 {
        self.product.price * u64::from(self.quantity)
    }
}

/// Order summary over a set of cart items. Shipping is charged per
/// product line, not per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    pub product_total: u64,
    pub shipping_total: u64,
    pub grand_total: u64,
}

impl CartTotals {
    pub fn of<'a>(items: impl IntoIterator<Item = &'a CartItem>) -> Self {
        let mut totals = CartTotals::default();
        for item in items {
            totals.product_total += item.product_total();
            totals.shipping_total += item.product.shipping_fee;
        }
        totals.grand_total = totals.product_total + totals.shipping_total;
        totals
    }

    /// Totals over the items whose ids were selected.
    pub fn of_selected(items: &[CartItem], selected: &[u64]) -> Self {
        Self::of(items.iter().filter(|item| selected.contains(&item.id)))
    }
}
