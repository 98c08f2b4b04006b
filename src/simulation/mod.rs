//! The simulation root: world state, engines, and the cooperative scheduler.
//!
//! One `Simulation` instance owns everything; components receive it by
//! reference rather than reaching for a global. All engines run as
//! non-overlapping callbacks driven from [`Simulation::update`], so the
//! registry only ever has a single writer.

pub mod growth;
pub mod lifecycle;
pub mod random_events;
pub mod setup;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SimulationConfig;
use crate::data::GameData;
use crate::economy::{EconomyEngine, Item, Shop};
use crate::entities::{NpcId, ShopId};
use crate::entities::npc::{DeathCause, Npc};
use crate::entities::settlement::Settlement;
use crate::events::{EventBus, SimulationEvent, SubscriberId, WorldEvent};
use crate::time::WorldDate;
use crate::world::WorldState;

/// A complete living world: demographics, settlements, and economy,
/// advanced by periodic ticks.
pub struct Simulation {
    pub config: SimulationConfig,
    pub data: GameData,
    pub world: WorldState,
    pub economy: EconomyEngine,
    bus: EventBus,
    rng: ChaCha8Rng,

    // Interval accumulators for the three periodic callbacks.
    day_elapsed: f32,
    tick_elapsed: f32,
    economy_elapsed: f32,
}

impl Simulation {
    /// Bootstrap a world from a master seed and configuration.
    pub fn new(seed: u64, config: SimulationConfig) -> Self {
        Self::with_data(seed, config, GameData::defaults())
    }

    /// Bootstrap with custom game data.
    pub fn with_data(seed: u64, config: SimulationConfig, data: GameData) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut world = WorldState::new();
        setup::initialize_world(&mut world, &data, &mut rng);
        let mut economy = EconomyEngine::new(&config);
        economy.create_shops(&mut world, &mut rng);
        // Nobody can have subscribed during bootstrap.
        world.take_notifications();

        Self {
            config,
            data,
            world,
            economy,
            bus: EventBus::new(),
            rng,
            day_elapsed: 0.0,
            tick_elapsed: 0.0,
            economy_elapsed: 0.0,
        }
    }

    // === Scheduler ===

    /// Advance the scheduler by a slice of real time, firing any periodic
    /// callbacks that have come due. Ticks run synchronously and to
    /// completion before this returns.
    pub fn update(&mut self, delta_seconds: f32) {
        let day_period = self.config.day_period();
        self.day_elapsed += delta_seconds;
        while self.day_elapsed >= day_period {
            self.day_elapsed -= day_period;
            self.advance_day();
        }

        self.tick_elapsed += delta_seconds;
        while self.tick_elapsed >= self.config.simulation_tick_interval {
            self.tick_elapsed -= self.config.simulation_tick_interval;
            self.simulation_tick();
        }

        self.economy_elapsed += delta_seconds;
        while self.economy_elapsed >= self.config.price_update_interval {
            self.economy_elapsed -= self.config.price_update_interval;
            self.economy_tick();
        }
    }

    /// Advance the calendar one day. On year rollover the yearly batch
    /// (demographics, then settlement growth) runs before the new day is
    /// announced.
    pub fn advance_day(&mut self) {
        let rolled = self.world.date.advance(self.config.days_per_year);
        if rolled {
            let year = self.world.date.year;
            log::info!("=== Year {} has begun ===", year);
            lifecycle::run_yearly(&mut self.world, &self.data, &mut self.rng);
            growth::run_yearly(&mut self.world, &mut self.rng);
            self.world.notify(SimulationEvent::YearPassed { year });
        }
        let date = self.world.date;
        self.world.notify(SimulationEvent::DayPassed {
            day: date.day,
            year: date.year,
        });
        self.dispatch();
    }

    /// One stochastic tick: a possible world event plus settlement
    /// micro-updates.
    pub fn simulation_tick(&mut self) {
        random_events::roll(&mut self.world, &self.data, &mut self.rng);
        growth::detect_ghost_towns(&mut self.world);
        self.dispatch();
    }

    /// One economy tick: price recomputation, then restock and closures.
    pub fn economy_tick(&mut self) {
        self.economy.update_market_prices(&mut self.world, &mut self.rng);
        self.economy.update_shop_inventories(&mut self.world, &mut self.rng);
        self.dispatch();
    }

    /// Deliver queued notifications, in the order they were raised.
    fn dispatch(&mut self) {
        for event in self.world.take_notifications() {
            self.bus.publish(&event);
        }
    }

    // === Subscriptions ===

    pub fn subscribe(&mut self, subscriber: Box<dyn FnMut(&SimulationEvent)>) -> SubscriberId {
        self.bus.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    // === Calendar ===

    pub fn date(&self) -> WorldDate {
        self.world.date
    }

    /// Display-only fraction of the current day elapsed. Never
    /// authoritative.
    pub fn day_progress(&self) -> f32 {
        (self.day_elapsed / self.config.day_period()).clamp(0.0, 1.0)
    }

    // === Queries ===

    pub fn total_population(&self) -> usize {
        self.world.total_population()
    }

    pub fn population_by_race(&self) -> std::collections::HashMap<String, usize> {
        self.world.population_by_race()
    }

    pub fn is_world_destroyed(&self) -> bool {
        self.world.is_world_destroyed()
    }

    pub fn npcs_in_settlement(&self, name: &str) -> Vec<&Npc> {
        self.world.npcs_in_settlement(name)
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.world.npc(id)
    }

    pub fn settlement(&self, name: &str) -> Option<&Settlement> {
        self.world.settlement(name)
    }

    pub fn shop(&self, id: ShopId) -> Option<&Shop> {
        self.economy.shop(id)
    }

    pub fn item(&self, name: &str) -> Option<&Item> {
        self.economy.item(name)
    }

    /// The journal of recent world events, oldest first.
    pub fn recent_events(&self) -> impl Iterator<Item = &WorldEvent> {
        self.world.event_log.iter()
    }

    // === Mutation entry points for external callers ===

    /// Buy from a shop (e.g. the player). See [`EconomyEngine::purchase`].
    pub fn purchase_item(&mut self, shop: ShopId, item: &str, quantity: u32) -> bool {
        self.economy.purchase(shop, item, quantity)
    }

    /// Close a shop for good.
    pub fn close_shop(&mut self, shop: ShopId, reason: &str) -> bool {
        let closed = self.economy.close_shop(&mut self.world, shop, reason);
        self.dispatch();
        closed
    }

    /// Kill an NPC on behalf of an external system (combat, scripting).
    pub fn kill_npc(&mut self, npc: NpcId, cause: DeathCause) -> bool {
        let killed = self.world.kill_npc(npc, cause);
        self.dispatch();
        killed
    }
}
