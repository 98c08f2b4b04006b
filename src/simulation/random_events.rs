//! Stochastic world events rolled on each simulation tick.
//!
//! At most one event fires per tick. Raids and plagues kill; festivals and
//! discoveries enrich; merchants and heroes are flavor for the journal.

use rand::Rng;

use crate::data::GameData;
use crate::entities::NpcId;
use crate::entities::npc::{DeathCause, Gender};
use crate::events::{EventCategory, WorldEvent};
use crate::naming::NameGenerator;
use crate::world::WorldState;

/// Chance that any event fires on a given tick.
const EVENT_CHANCE: f64 = 0.1;

/// The kinds of event the generator can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RandomEventKind {
    Raid,
    Festival,
    Plague,
    Discovery,
    Merchant,
    Hero,
}

impl RandomEventKind {
    pub const ALL: [RandomEventKind; 6] = [
        RandomEventKind::Raid,
        RandomEventKind::Festival,
        RandomEventKind::Plague,
        RandomEventKind::Discovery,
        RandomEventKind::Merchant,
        RandomEventKind::Hero,
    ];
}

/// Roll for a world event this tick and execute it if one fires.
pub fn roll(world: &mut WorldState, data: &GameData, rng: &mut impl Rng) {
    if !rng.gen_bool(EVENT_CHANCE) {
        return;
    }
    let kind = RandomEventKind::ALL[rng.gen_range(0..RandomEventKind::ALL.len())];
    execute(world, data, kind, rng);
}

/// Execute one event of the given kind. Every branch journals exactly one
/// world event.
pub(crate) fn execute(
    world: &mut WorldState,
    data: &GameData,
    kind: RandomEventKind,
    rng: &mut impl Rng,
) {
    match kind {
        RandomEventKind::Raid => raid(world, rng),
        RandomEventKind::Festival => festival(world, rng),
        RandomEventKind::Plague => plague(world, rng),
        RandomEventKind::Discovery => discovery(world, rng),
        RandomEventKind::Merchant => merchant(world),
        RandomEventKind::Hero => hero(world, data, rng),
    }
}

fn pick_settlement(world: &WorldState, rng: &mut impl Rng) -> Option<String> {
    let names = world.settlement_names();
    if names.is_empty() {
        return None;
    }
    Some(names[rng.gen_range(0..names.len())].clone())
}

fn raid(world: &mut WorldState, rng: &mut impl Rng) {
    let Some(name) = pick_settlement(world, rng) else { return };
    let population = world.settlement(&name).map(|s| s.population).unwrap_or(0);
    let cap = (population / 10).max(1);
    let casualties = rng.gen_range(1..=cap);
    let killed = kill_random_members(world, &name, casualties, DeathCause::Violence, rng);
    if let Some(settlement) = world.settlement_mut(&name) {
        settlement.adjust_prosperity(-rng.gen_range(10..=30));
    }
    let event = WorldEvent::new(
        EventCategory::Raid,
        world.date,
        format!("{} was raided! {} casualties reported.", name, killed),
    )
    .with_payload("settlement", name)
    .with_payload("casualties", killed.to_string());
    world.record(event);
}

fn festival(world: &mut WorldState, rng: &mut impl Rng) {
    let Some(name) = pick_settlement(world, rng) else { return };
    if let Some(settlement) = world.settlement_mut(&name) {
        settlement.adjust_prosperity(rng.gen_range(5..=15));
    }
    world.record_event(
        EventCategory::Festival,
        format!("{} is hosting a grand festival! Prosperity increases.", name),
    );
}

fn plague(world: &mut WorldState, rng: &mut impl Rng) {
    let Some(name) = pick_settlement(world, rng) else { return };
    let population = world.settlement(&name).map(|s| s.population).unwrap_or(0);
    let cap = (population / 5).max(2);
    let casualties = rng.gen_range(2..=cap);
    let killed = kill_random_members(world, &name, casualties, DeathCause::Plague, rng);
    let event = WorldEvent::new(
        EventCategory::Plague,
        world.date,
        format!("A plague strikes {}! {} have perished.", name, killed),
    )
    .with_payload("settlement", name)
    .with_payload("casualties", killed.to_string());
    world.record(event);
}

fn discovery(world: &mut WorldState, rng: &mut impl Rng) {
    let Some(name) = pick_settlement(world, rng) else { return };
    if let Some(settlement) = world.settlement_mut(&name) {
        settlement.adjust_prosperity(rng.gen_range(15..=25));
    }
    world.record_event(
        EventCategory::Discovery,
        format!("{} discovered valuable resources! Great prosperity follows.", name),
    );
}

fn merchant(world: &mut WorldState) {
    world.record_event(
        EventCategory::Merchant,
        "A traveling merchant caravan has arrived, bringing exotic goods!",
    );
}

fn hero(world: &mut WorldState, data: &GameData, rng: &mut impl Rng) {
    let gender = Gender::roll(rng);
    let name = NameGenerator::generate(data, "Human", gender, rng);
    world.record_event(
        EventCategory::Hero,
        format!(
            "A hero named {} has emerged, tales of their deeds spread far and wide!",
            name
        ),
    );
}

/// Kill up to `count` random living members of a settlement. Returns how
/// many actually died.
pub(crate) fn kill_random_members(
    world: &mut WorldState,
    settlement: &str,
    count: u32,
    cause: DeathCause,
    rng: &mut impl Rng,
) -> u32 {
    let mut living: Vec<NpcId> = world.living_member_ids(settlement);
    let target = count.min(living.len() as u32);
    let mut killed = 0;
    for _ in 0..target {
        if living.is_empty() {
            break;
        }
        let victim = living.swap_remove(rng.gen_range(0..living.len()));
        if world.kill_npc(victim, cause) {
            killed += 1;
        }
    }
    killed
}
