//! Shops and their inventories.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};

use crate::entities::{NpcId, ShopId};

/// One inventory line in a shop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopStock {
    pub quantity: u32,
    /// Fixed at creation; multiplies the global market price at this shop.
    pub local_price_modifier: f32,
}

/// A shop operating in a settlement.
///
/// Closed shops stay addressable (their records persist) but take no part
/// in supply aggregation or restocking, and never reopen.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    /// Name of the owning settlement.
    pub settlement: String,
    pub kind: String,
    pub owner: Option<NpcId>,
    pub inventory: HashMap<String, ShopStock>,
    pub open: bool,
    pub reputation: f32,
}

impl Shop {
    pub fn new(id: ShopId, name: &str, settlement: &str, kind: &str, owner: Option<NpcId>) -> Self {
        Self {
            id,
            name: name.to_string(),
            settlement: settlement.to_string(),
            kind: kind.to_string(),
            owner,
            inventory: HashMap::new(),
            open: true,
            reputation: 50.0,
        }
    }

    pub fn stock(&self, item: &str) -> Option<&ShopStock> {
        self.inventory.get(item)
    }

    /// Whether the shop can fill an order of `quantity` units.
    pub fn has_stock(&self, item: &str, quantity: u32) -> bool {
        self.inventory
            .get(item)
            .map(|stock| stock.quantity >= quantity)
            .unwrap_or(false)
    }
}
