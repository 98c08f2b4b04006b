//! Market economy: item catalog, global prices, and per-settlement shops.
//!
//! Prices drift with supply and demand read from the demographic registry;
//! shops restock stochastically and close for good when their settlement
//! falls on hard times.

pub mod item;
pub mod shop;

use std::collections::HashMap;
use rand::Rng;

pub use item::{Item, ItemCategory, Rarity};
pub use shop::{Shop, ShopStock};

use crate::config::SimulationConfig;
use crate::entities::{IdGenerator, NpcId, ShopId};
use crate::events::{EventCategory, SimulationEvent};
use crate::world::WorldState;

/// Minimum price-change magnitude worth announcing.
const PRICE_DEAD_BAND: f32 = 0.1;

/// Restock probability per inventory line per tick.
const RESTOCK_CHANCE: f64 = 0.3;

/// Maximum units a shop holds of one item.
const MAX_STOCK: u32 = 50;

/// Prosperity below which shops risk closing.
const HARDSHIP_PROSPERITY: i32 = 30;

/// Closure probability per tick for shops in struggling settlements.
const HARDSHIP_CLOSURE_CHANCE: f64 = 0.1;

/// The market: catalog, prices, and shops.
pub struct EconomyEngine {
    pub items: HashMap<String, Item>,
    /// Catalog order, for deterministic price sweeps.
    item_names: Vec<String>,
    pub market_prices: HashMap<String, f32>,
    pub shops: HashMap<ShopId, Shop>,
    shop_ids: IdGenerator,

    supply_demand_influence: f32,
    price_fluctuation_rate: f32,
}

impl EconomyEngine {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut items = HashMap::new();
        let mut item_names = Vec::new();
        let mut market_prices = HashMap::new();
        for item in Item::base_catalog() {
            item_names.push(item.name.clone());
            market_prices.insert(item.name.clone(), item.base_price);
            items.insert(item.name.clone(), item);
        }
        Self {
            items,
            item_names,
            market_prices,
            shops: HashMap::new(),
            shop_ids: IdGenerator::new(),
            supply_demand_influence: config.supply_demand_influence,
            price_fluctuation_rate: config.price_fluctuation_rate,
        }
    }

    // === Bootstrap ===

    /// Open the starter shops for every settlement: a general store plus
    /// the trades of the dominant race.
    pub fn create_shops(&mut self, world: &mut WorldState, rng: &mut impl Rng) {
        for name in world.settlement_names() {
            let race = match world.settlement(&name) {
                Some(s) => s.dominant_race.clone(),
                None => continue,
            };
            self.create_shop(world, "General Store", &name, "General",
                &["Bread", "Health Potion", "Iron Sword"], rng);
            match race.as_str() {
                "Human" => {
                    self.create_shop(world, "Blacksmith", &name, "Weapons",
                        &["Iron Sword", "Magic Staff"], rng);
                    self.create_shop(world, "Alchemist", &name, "Potions",
                        &["Health Potion", "Ancient Tome"], rng);
                }
                "Goblin" => {
                    self.create_shop(world, "Scrap Trader", &name, "Materials",
                        &["Goblin Ear", "Spider Silk"], rng);
                }
                "Spider" => {
                    self.create_shop(world, "Silk Weaver", &name, "Textiles",
                        &["Spider Silk"], rng);
                }
                "Demon" => {
                    self.create_shop(world, "Dark Merchant", &name, "Dark Items",
                        &["Demon Horn", "Magic Staff"], rng);
                }
                "Vampire" => {
                    self.create_shop(world, "Blood Bank", &name, "Vampire Goods",
                        &["Vampire Fang", "Ancient Tome"], rng);
                }
                _ => {}
            }
        }
    }

    fn create_shop(
        &mut self,
        world: &mut WorldState,
        name: &str,
        settlement: &str,
        kind: &str,
        stocked: &[&str],
        rng: &mut impl Rng,
    ) -> ShopId {
        let id = ShopId(self.shop_ids.next_id());
        let owner = Self::pick_owner(world, settlement, rng);
        let mut shop = Shop::new(id, name, settlement, kind, owner);
        for item in stocked {
            shop.inventory.insert(
                item.to_string(),
                ShopStock {
                    quantity: rng.gen_range(5..20),
                    local_price_modifier: 1.0 + rng.gen_range(-0.5..0.5) * 0.4,
                },
            );
        }
        self.shops.insert(id, shop);
        world.notify(SimulationEvent::ShopOpened {
            shop: id,
            settlement: settlement.to_string(),
        });
        id
    }

    /// A random living local, preferring anyone in the trade.
    fn pick_owner(world: &WorldState, settlement: &str, rng: &mut impl Rng) -> Option<NpcId> {
        let locals = world.npcs_in_settlement(settlement);
        if locals.is_empty() {
            return None;
        }
        let merchants: Vec<NpcId> = locals
            .iter()
            .filter(|npc| {
                npc.profession.contains("Merchant") || npc.profession.contains("Trader")
            })
            .map(|npc| npc.id)
            .collect();
        if !merchants.is_empty() {
            return Some(merchants[rng.gen_range(0..merchants.len())]);
        }
        Some(locals[rng.gen_range(0..locals.len())].id)
    }

    // === Price loop ===

    /// Recompute every market price from current supply and demand.
    ///
    /// Changes below the dead-band are discarded without notification.
    pub fn update_market_prices(&mut self, world: &mut WorldState, rng: &mut impl Rng) {
        let population = world.total_population();
        for name in self.item_names.clone() {
            let Some(old_price) = self.market_prices.get(&name).copied() else {
                continue;
            };
            let new_price = self.compute_price(&name, old_price, population, rng);
            if (new_price - old_price).abs() > PRICE_DEAD_BAND {
                self.market_prices.insert(name.clone(), new_price);
                world.notify(SimulationEvent::PriceChanged {
                    item: name,
                    old: old_price,
                    new: new_price,
                });
            }
        }
    }

    fn compute_price(
        &self,
        item_name: &str,
        current: f32,
        population: usize,
        rng: &mut impl Rng,
    ) -> f32 {
        let Some(item) = self.items.get(item_name) else {
            return current;
        };

        let supply = self.total_supply(item_name) as f32;
        let demand = item.category.base_demand() * (population as f32 / 100.0);

        let ratio = demand / supply.max(1.0);
        let price_modifier = 1.0 + (ratio - 1.0) * self.supply_demand_influence;
        let random_factor = 1.0 + rng.gen_range(-0.5..0.5) * self.price_fluctuation_rate;

        let new_price = current * price_modifier * random_factor;
        new_price.clamp(item.base_price * 0.3, item.base_price * 3.0)
    }

    /// Units of an item held across all open shops.
    pub fn total_supply(&self, item: &str) -> u32 {
        self.shops
            .values()
            .filter(|shop| shop.open)
            .filter_map(|shop| shop.stock(item))
            .map(|stock| stock.quantity)
            .sum()
    }

    // === Restock loop ===

    /// Restock open shops and close ones stranded in struggling settlements.
    pub fn update_shop_inventories(&mut self, world: &mut WorldState, rng: &mut impl Rng) {
        let mut shop_ids: Vec<ShopId> = self.shops.keys().copied().collect();
        shop_ids.sort();

        let mut to_close = Vec::new();
        for id in shop_ids {
            let Some(shop) = self.shops.get_mut(&id) else { continue };
            if !shop.open {
                continue;
            }

            let mut lines: Vec<String> = shop.inventory.keys().cloned().collect();
            lines.sort();
            for line in lines {
                if rng.gen_bool(RESTOCK_CHANCE) {
                    if let Some(stock) = shop.inventory.get_mut(&line) {
                        stock.quantity = (stock.quantity + rng.gen_range(1..=4)).min(MAX_STOCK);
                    }
                }
            }

            let struggling = world
                .settlement(&shop.settlement)
                .map(|s| s.prosperity < HARDSHIP_PROSPERITY)
                .unwrap_or(false);
            if struggling && rng.gen_bool(HARDSHIP_CLOSURE_CHANCE) {
                to_close.push(id);
            }
        }

        for id in to_close {
            self.close_shop(world, id, "Economic hardship");
        }
    }

    // === Mutation entry points ===

    /// Permanently close a shop. Closed shops never reopen.
    pub fn close_shop(&mut self, world: &mut WorldState, id: ShopId, reason: &str) -> bool {
        let Some(shop) = self.shops.get_mut(&id) else {
            return false;
        };
        if !shop.open {
            return false;
        }
        shop.open = false;
        log::info!("shop {} in {} closed: {}", shop.name, shop.settlement, reason);
        let description = format!(
            "{} in {} has closed due to {}.",
            shop.name, shop.settlement, reason
        );
        world.record_event(EventCategory::Shop, description);
        world.notify(SimulationEvent::ShopClosed {
            shop: id,
            reason: reason.to_string(),
        });
        true
    }

    /// Buy `quantity` of an item from a shop.
    ///
    /// Succeeds only when the shop is open and fully stocked; a successful
    /// trade nudges the shop's reputation up. Failure mutates nothing.
    pub fn purchase(&mut self, shop_id: ShopId, item: &str, quantity: u32) -> bool {
        let Some(shop) = self.shops.get_mut(&shop_id) else {
            return false;
        };
        if !shop.open || !shop.has_stock(item, quantity) {
            return false;
        }
        if let Some(stock) = shop.inventory.get_mut(item) {
            stock.quantity -= quantity;
        }
        shop.reputation += 0.1;
        true
    }

    // === Queries ===

    /// Global market price for an item (0 for unknown items).
    pub fn price(&self, item: &str) -> f32 {
        self.market_prices.get(item).copied().unwrap_or(0.0)
    }

    /// Effective price at a specific shop: global price times the shop's
    /// local modifier. Falls back to the global price when the shop does
    /// not carry the item.
    pub fn price_at(&self, shop_id: ShopId, item: &str) -> f32 {
        let base = self.price(item);
        self.shops
            .get(&shop_id)
            .and_then(|shop| shop.stock(item))
            .map(|stock| base * stock.local_price_modifier)
            .unwrap_or(base)
    }

    pub fn shop(&self, id: ShopId) -> Option<&Shop> {
        self.shops.get(&id)
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    /// Open shops operating in a settlement.
    pub fn shops_in_settlement(&self, settlement: &str) -> Vec<&Shop> {
        let mut shops: Vec<&Shop> = self
            .shops
            .values()
            .filter(|shop| shop.open && shop.settlement == settlement)
            .collect();
        shops.sort_by_key(|shop| shop.id);
        shops
    }

    /// Every item in the catalog, in catalog order.
    pub fn available_items(&self) -> Vec<&Item> {
        self.item_names
            .iter()
            .filter_map(|name| self.items.get(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::entities::npc::{Gender, Npc};
    use crate::entities::settlement::Settlement;

    fn test_world(settlement: &str, prosperity: i32, population: u32) -> WorldState {
        let mut world = WorldState::new();
        let mut s = Settlement::new(settlement.to_string(), "Human".to_string(), (0.0, 0.0));
        s.prosperity = prosperity;
        world.settlements.insert(settlement.to_string(), s);
        for _ in 0..population {
            let id = world.next_npc_id();
            let npc = Npc::new(
                id,
                format!("Villager {}", id.0),
                "Human".to_string(),
                30,
                Gender::Male,
                settlement.to_string(),
                world.date,
            );
            world.insert_npc(npc);
        }
        world
    }

    fn engine_with_rates(fluctuation: f32, influence: f32) -> EconomyEngine {
        let config = SimulationConfig {
            price_fluctuation_rate: fluctuation,
            supply_demand_influence: influence,
            ..SimulationConfig::default()
        };
        EconomyEngine::new(&config)
    }

    fn add_shop(engine: &mut EconomyEngine, settlement: &str, item: &str, quantity: u32) -> ShopId {
        let id = ShopId(engine.shop_ids.next_id());
        let mut shop = Shop::new(id, "Test Shop", settlement, "General", None);
        shop.inventory.insert(
            item.to_string(),
            ShopStock { quantity, local_price_modifier: 1.0 },
        );
        engine.shops.insert(id, shop);
        id
    }

    #[test]
    fn test_supply_demand_price_formula() {
        // basePrice=50 Food item, price=50, supply=10, population=100:
        // ratio = 5, modifier = 1.8, no random noise => exactly 90.
        let mut engine = engine_with_rates(0.0, 0.2);
        let grain = Item::new("Grain", ItemCategory::Food, 50.0, Rarity::Common);
        engine.item_names.push(grain.name.clone());
        engine.market_prices.insert(grain.name.clone(), 50.0);
        engine.items.insert(grain.name.clone(), grain);
        add_shop(&mut engine, "New Haven", "Grain", 10);

        let mut world = test_world("New Haven", 80, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        engine.update_market_prices(&mut world, &mut rng);

        let price = engine.price("Grain");
        assert!((price - 90.0).abs() < 1e-3, "price was {}", price);
    }

    #[test]
    fn test_prices_always_clamped() {
        let mut engine = engine_with_rates(0.1, 0.2);
        let mut world = test_world("New Haven", 80, 500);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            engine.update_market_prices(&mut world, &mut rng);
        }
        for item in engine.available_items() {
            let price = engine.price(&item.name);
            assert!(
                price >= item.base_price * 0.3 - 1e-3 && price <= item.base_price * 3.0 + 1e-3,
                "{} priced at {} outside [{}, {}]",
                item.name, price, item.base_price * 0.3, item.base_price * 3.0
            );
        }
    }

    #[test]
    fn test_dead_band_suppresses_notification() {
        // Supply 50 vs demand 50 => ratio 1, no noise: price unchanged,
        // so no PriceChanged should be raised for the item.
        let mut engine = engine_with_rates(0.0, 0.2);
        let grain = Item::new("Grain", ItemCategory::Food, 50.0, Rarity::Common);
        engine.item_names.push(grain.name.clone());
        engine.market_prices.insert(grain.name.clone(), 50.0);
        engine.items.insert(grain.name.clone(), grain);
        add_shop(&mut engine, "New Haven", "Grain", 50);

        let mut world = test_world("New Haven", 80, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        world.take_notifications();
        engine.update_market_prices(&mut world, &mut rng);

        let changed: Vec<_> = world
            .take_notifications()
            .into_iter()
            .filter(|n| matches!(n, SimulationEvent::PriceChanged { item, .. } if item == "Grain"))
            .collect();
        assert!(changed.is_empty());
        assert_eq!(engine.price("Grain"), 50.0);
    }

    #[test]
    fn test_closed_shops_excluded_from_supply() {
        let mut engine = engine_with_rates(0.1, 0.2);
        let mut world = test_world("New Haven", 80, 10);
        let a = add_shop(&mut engine, "New Haven", "Bread", 10);
        add_shop(&mut engine, "New Haven", "Bread", 7);

        assert_eq!(engine.total_supply("Bread"), 17);
        assert!(engine.close_shop(&mut world, a, "Economic hardship"));
        assert_eq!(engine.total_supply("Bread"), 7);

        // Still addressable, but permanently closed.
        assert!(!engine.shop(a).unwrap().open);
        assert!(!engine.close_shop(&mut world, a, "again"));
    }

    #[test]
    fn test_restock_caps_at_max() {
        let mut engine = engine_with_rates(0.1, 0.2);
        let mut world = test_world("New Haven", 80, 10);
        let id = add_shop(&mut engine, "New Haven", "Bread", 49);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            engine.update_shop_inventories(&mut world, &mut rng);
        }
        let quantity = engine.shop(id).unwrap().stock("Bread").unwrap().quantity;
        assert_eq!(quantity, MAX_STOCK);
    }

    #[test]
    fn test_purchase() {
        let mut engine = engine_with_rates(0.1, 0.2);
        let mut world = test_world("New Haven", 80, 10);
        let id = add_shop(&mut engine, "New Haven", "Bread", 10);

        assert!(engine.purchase(id, "Bread", 4));
        let shop = engine.shop(id).unwrap();
        assert_eq!(shop.stock("Bread").unwrap().quantity, 6);
        assert!((shop.reputation - 50.1).abs() < 1e-4);

        // Too large an order: nothing changes.
        assert!(!engine.purchase(id, "Bread", 7));
        assert_eq!(engine.shop(id).unwrap().stock("Bread").unwrap().quantity, 6);

        // Unknown item, unknown shop, closed shop.
        assert!(!engine.purchase(id, "Dragon Scale", 1));
        assert!(!engine.purchase(ShopId(999), "Bread", 1));
        engine.close_shop(&mut world, id, "test");
        assert!(!engine.purchase(id, "Bread", 1));
    }

    #[test]
    fn test_price_at_applies_local_modifier() {
        let mut engine = engine_with_rates(0.1, 0.2);
        let id = add_shop(&mut engine, "New Haven", "Bread", 10);
        engine
            .shops
            .get_mut(&id)
            .unwrap()
            .inventory
            .get_mut("Bread")
            .unwrap()
            .local_price_modifier = 1.2;
        assert!((engine.price_at(id, "Bread") - 5.0 * 1.2).abs() < 1e-4);
        // Item the shop does not carry: global price.
        assert_eq!(engine.price_at(id, "Iron Sword"), 50.0);
    }

    #[test]
    fn test_hardship_closure_rate() {
        // 400 shops in a prosperity-20 settlement, one tick: roughly 10%
        // should close. Allow a generous statistical band.
        let mut engine = engine_with_rates(0.1, 0.2);
        let mut world = test_world("Bleakmoor", 20, 10);
        for _ in 0..400 {
            add_shop(&mut engine, "Bleakmoor", "Bread", 10);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        engine.update_shop_inventories(&mut world, &mut rng);

        let closed = engine.shops.values().filter(|s| !s.open).count();
        assert!(
            (20..=60).contains(&closed),
            "expected roughly 40 closures out of 400, got {}",
            closed
        );
    }

    #[test]
    fn test_prosperous_settlement_shops_stay_open() {
        let mut engine = engine_with_rates(0.1, 0.2);
        let mut world = test_world("New Haven", 80, 10);
        for _ in 0..50 {
            add_shop(&mut engine, "New Haven", "Bread", 10);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..20 {
            engine.update_shop_inventories(&mut world, &mut rng);
        }
        assert!(engine.shops.values().all(|s| s.open));
    }

    #[test]
    fn test_create_shops_per_race() {
        let config = SimulationConfig::default();
        let mut engine = EconomyEngine::new(&config);
        let mut world = test_world("New Haven", 80, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        engine.create_shops(&mut world, &mut rng);

        let shops = engine.shops_in_settlement("New Haven");
        let names: Vec<&str> = shops.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"General Store"));
        assert!(names.contains(&"Blacksmith"));
        assert!(names.contains(&"Alchemist"));

        // Starter stock in range, local modifier in [0.8, 1.2].
        for shop in shops {
            for stock in shop.inventory.values() {
                assert!((5..20).contains(&stock.quantity));
                assert!((0.8..=1.2).contains(&stock.local_price_modifier));
            }
            assert!(shop.owner.is_some());
        }
    }
}
