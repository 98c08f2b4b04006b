//! Settlement growth: prosperity, construction, trade routes, ghost towns.

use rand::Rng;

use crate::entities::settlement::{Building, BuildingKind};
use crate::events::EventCategory;
use crate::world::WorldState;

const PROSPERITY_GROWTH_THRESHOLD: i32 = 70;
const PROSPERITY_GROWTH_CHANCE: f64 = 0.3;

const CONSTRUCTION_CHANCE: f64 = 0.4;
const RESIDENTS_PER_BUILDING: usize = 5;

const TRADE_ROUTE_THRESHOLD: i32 = 80;
const TRADE_ROUTE_CHANCE: f64 = 0.2;
const MAX_TRADE_ROUTES: usize = 3;

/// Yearly growth pass over every settlement.
pub fn run_yearly(world: &mut WorldState, rng: &mut impl Rng) {
    for name in world.settlement_names() {
        grow_prosperity(world, &name, rng);
        construct_building(world, &name, rng);
        establish_trade_route(world, &name, rng);
    }
}

fn grow_prosperity(world: &mut WorldState, name: &str, rng: &mut impl Rng) {
    let Some(settlement) = world.settlement_mut(name) else { return };
    if settlement.prosperity > PROSPERITY_GROWTH_THRESHOLD
        && rng.gen_bool(PROSPERITY_GROWTH_CHANCE)
    {
        settlement.adjust_prosperity(rng.gen_range(1..=4));
    }
}

fn construct_building(world: &mut WorldState, name: &str, rng: &mut impl Rng) {
    let kind = {
        let Some(settlement) = world.settlement_mut(name) else { return };
        let crowded =
            settlement.population as usize > settlement.buildings.len() * RESIDENTS_PER_BUILDING;
        if !crowded || !rng.gen_bool(CONSTRUCTION_CHANCE) {
            return;
        }
        let kinds = BuildingKind::constructible();
        let kind = kinds[rng.gen_range(0..kinds.len())];
        settlement.buildings.push(Building::new(kind));
        kind
    };
    world.record_event(
        EventCategory::Construction,
        format!("A new {} was built in {}!", kind, name),
    );
}

fn establish_trade_route(world: &mut WorldState, name: &str, rng: &mut impl Rng) {
    let eligible = world
        .settlement(name)
        .map(|s| s.prosperity > TRADE_ROUTE_THRESHOLD && s.trade_routes.len() < MAX_TRADE_ROUTES)
        .unwrap_or(false);
    if !eligible || !rng.gen_bool(TRADE_ROUTE_CHANCE) {
        return;
    }

    let partners: Vec<String> = world
        .settlement_names()
        .into_iter()
        .filter(|candidate| {
            candidate != name
                && !world
                    .settlement(name)
                    .map(|s| s.has_trade_route_to(candidate))
                    .unwrap_or(true)
        })
        .collect();
    if partners.is_empty() {
        return;
    }
    let partner = partners[rng.gen_range(0..partners.len())].clone();

    if let Some(settlement) = world.settlement_mut(name) {
        settlement.trade_routes.push(partner.clone());
    }
    if let Some(settlement) = world.settlement_mut(&partner) {
        settlement.trade_routes.push(name.to_string());
    }
    world.record_event(
        EventCategory::TradeRoute,
        format!("Trade route established between {} and {}!", name, partner),
    );
}

/// Per-tick check for settlements that have emptied out.
///
/// The transition to zero population is journaled exactly once; a
/// settlement that repopulates arms the notification again.
pub fn detect_ghost_towns(world: &mut WorldState) {
    let mut newly_abandoned = Vec::new();
    for name in world.settlement_names() {
        let Some(settlement) = world.settlement_mut(&name) else { continue };
        if settlement.population == 0 {
            if !settlement.abandoned {
                settlement.abandoned = true;
                newly_abandoned.push(name);
            }
        } else if settlement.abandoned {
            settlement.abandoned = false;
        }
    }
    for name in newly_abandoned {
        world.record_event(
            EventCategory::GhostTown,
            format!("{} has become a ghost town - completely abandoned!", name),
        );
    }
}
