//! Item catalog for the market.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// Trade good categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Food,
    Weapon,
    Consumable,
    Material,
    Book,
    Trophy,
}

impl ItemCategory {
    /// Baseline demand for goods of this category, before population scaling.
    pub fn base_demand(&self) -> f32 {
        match self {
            ItemCategory::Food => 50.0,
            ItemCategory::Weapon => 20.0,
            ItemCategory::Consumable => 30.0,
            ItemCategory::Material => 15.0,
            ItemCategory::Book => 10.0,
            _ => 25.0,
        }
    }
}

/// How hard an item is to come by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

/// A trade good, keyed by its unique name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub category: ItemCategory,
    pub base_price: f32,
    pub rarity: Rarity,
    pub description: String,
    pub properties: HashMap<String, String>,
}

impl Item {
    pub fn new(name: &str, category: ItemCategory, base_price: f32, rarity: Rarity) -> Self {
        Self {
            name: name.to_string(),
            category,
            base_price,
            rarity,
            description: String::new(),
            properties: HashMap::new(),
        }
    }

    fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// The fixed catalog every market starts from.
    pub fn base_catalog() -> Vec<Item> {
        vec![
            Item::new("Bread", ItemCategory::Food, 5.0, Rarity::Common)
                .describe("A fresh loaf, staple of every table."),
            Item::new("Iron Sword", ItemCategory::Weapon, 50.0, Rarity::Common)
                .describe("Plain but dependable sidearm."),
            Item::new("Health Potion", ItemCategory::Consumable, 25.0, Rarity::Common)
                .describe("Knits minor wounds in moments."),
            Item::new("Magic Staff", ItemCategory::Weapon, 150.0, Rarity::Uncommon)
                .describe("A focus for practitioners of the arts."),
            Item::new("Dragon Scale", ItemCategory::Material, 500.0, Rarity::Rare)
                .describe("Shed scale, prized by armorers."),
            Item::new("Ancient Tome", ItemCategory::Book, 200.0, Rarity::Uncommon)
                .describe("Brittle pages in a dead script."),
            Item::new("Goblin Ear", ItemCategory::Trophy, 10.0, Rarity::Common)
                .describe("Grisly proof of a bounty claimed."),
            Item::new("Spider Silk", ItemCategory::Material, 30.0, Rarity::Common)
                .describe("Stronger than any woven thread."),
            Item::new("Demon Horn", ItemCategory::Material, 100.0, Rarity::Uncommon)
                .describe("Still warm to the touch."),
            Item::new("Vampire Fang", ItemCategory::Material, 75.0, Rarity::Uncommon)
                .describe("An alchemical reagent of ill repute."),
        ]
    }
}
