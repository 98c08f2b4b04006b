//! World bootstrap: founding settlements and the initial population.

use rand::Rng;

use crate::data::GameData;
use crate::entities::NpcId;
use crate::entities::npc::{Gender, Npc};
use crate::entities::settlement::{Building, BuildingKind, Settlement};
use crate::naming::NameGenerator;
use crate::world::WorldState;

/// Personality traits an adult may start with.
const STARTING_TRAITS: &[&str] = &[
    "Brave", "Cowardly", "Greedy", "Generous", "Aggressive", "Peaceful",
    "Intelligent", "Simple", "Charismatic", "Reclusive", "Loyal", "Treacherous",
];

/// The founding settlements: name, dominant race, map position.
const SETTLEMENT_SEEDS: &[(&str, &str, (f32, f32))] = &[
    ("New Haven", "Human", (0.0, 0.0)),
    ("Goblin Warren", "Goblin", (-150.0, 100.0)),
    ("Spider Sanctuary", "Spider", (150.0, 150.0)),
    ("Infernal Citadel", "Demon", (100.0, -200.0)),
    ("Moonlight Manor", "Vampire", (250.0, 50.0)),
];

/// Populate an empty world with its founding settlements and inhabitants.
pub fn initialize_world(world: &mut WorldState, data: &GameData, rng: &mut impl Rng) {
    create_settlements(world, rng);
    create_population(world, data, rng);
    log::info!(
        "created initial population: {} NPCs across {} settlements",
        world.total_population(),
        world.settlements.len()
    );
}

fn create_settlements(world: &mut WorldState, rng: &mut impl Rng) {
    for (name, race, position) in SETTLEMENT_SEEDS {
        let mut settlement = Settlement::new(name.to_string(), race.to_string(), *position);
        settlement.prosperity = rng.gen_range(50..100);
        settlement.defense = rng.gen_range(20..80);
        settlement.buildings = vec![
            Building::new(BuildingKind::Inn),
            Building::new(BuildingKind::Market),
            Building::new(BuildingKind::GuardPost),
        ];
        world.settlements.insert(name.to_string(), settlement);
    }
}

fn create_population(world: &mut WorldState, data: &GameData, rng: &mut impl Rng) {
    for race in data.race_names.clone() {
        let count = match data.race(&race) {
            Some(template) => {
                let [lo, hi] = template.initial_population;
                rng.gen_range(lo..hi)
            }
            None => 10,
        };
        for _ in 0..count {
            create_random_npc(world, data, &race, true, rng);
        }
    }
}

/// Create an NPC of a race and file it in one of that race's settlements.
///
/// Initial inhabitants spawn as adults; everyone else starts at age 0.
pub(crate) fn create_random_npc(
    world: &mut WorldState,
    data: &GameData,
    race: &str,
    initial: bool,
    rng: &mut impl Rng,
) -> NpcId {
    let gender = Gender::roll(rng);
    let name = NameGenerator::generate(data, race, gender, rng);
    let age = if initial { rng.gen_range(18..60) } else { 0 };
    let settlement = pick_settlement_for_race(world, race, rng);

    let id = world.next_npc_id();
    let mut npc = Npc::new(id, name, race.to_string(), age, gender, settlement, world.date);

    match data.race(race) {
        Some(template) => {
            for (stat, base) in &template.base_stats {
                npc.set_stat(stat, base + rng.gen_range(-3..=3));
            }
            if !template.professions.is_empty() {
                npc.profession =
                    template.professions[rng.gen_range(0..template.professions.len())].clone();
            }
        }
        None => log::warn!("no race template for {}, spawning bare NPC", race),
    }
    if npc.profession.is_empty() {
        npc.profession = "Wanderer".to_string();
    }

    let trait_rolls = rng.gen_range(2..5);
    for _ in 0..trait_rolls {
        npc.add_trait(STARTING_TRAITS[rng.gen_range(0..STARTING_TRAITS.len())]);
    }

    world.insert_npc(npc)
}

/// A random settlement dominated by the given race, falling back to any
/// settlement, then to the wilderness for a world with none at all.
fn pick_settlement_for_race(world: &WorldState, race: &str, rng: &mut impl Rng) -> String {
    let mut homes: Vec<&str> = world
        .settlements
        .values()
        .filter(|s| s.dominant_race == race)
        .map(|s| s.name.as_str())
        .collect();
    homes.sort();
    if !homes.is_empty() {
        return homes[rng.gen_range(0..homes.len())].to_string();
    }
    world
        .settlement_names()
        .into_iter()
        .next()
        .unwrap_or_else(|| "Wilderness".to_string())
}
