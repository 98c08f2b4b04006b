//! Yearly demographic batch: aging, marriages, births, evolution.
//!
//! Runs once per year rollover, in a fixed order. Every step is
//! best-effort: candidates that disappeared or never existed are skipped.

use rand::Rng;

use crate::data::GameData;
use crate::entities::NpcId;
use crate::entities::npc::{DeathCause, Gender, Npc, RelationshipStatus};
use crate::events::{EventCategory, SimulationEvent};
use crate::naming::NameGenerator;
use crate::world::WorldState;

/// Youngest age at which an NPC may marry.
pub const MIN_MARRIAGE_AGE: u32 = 18;

/// Youngest age at which an NPC may take an evolution form.
pub const EVOLUTION_MIN_AGE: u32 = 25;

const OLD_AGE_DEATH_CHANCE: f64 = 0.3;
const MARRIAGE_SEARCH_CHANCE: f64 = 0.2;
const BIRTH_CHANCE: f64 = 0.3;
const EVOLUTION_CHANCE: f64 = 0.1;
const TRAIT_INHERIT_CHANCE: f64 = 0.5;
const NOVEL_TRAIT_CHANCE: f64 = 0.3;

/// Traits a newborn can gain beyond its inheritance.
const NOVEL_TRAITS: &[&str] = &[
    "Ambitious", "Creative", "Stubborn", "Curious", "Patient", "Impulsive",
];

/// Run the full yearly batch.
pub fn run_yearly(world: &mut WorldState, data: &GameData, rng: &mut impl Rng) {
    step_aging(world, data, rng);
    step_marriages(world, rng);
    step_births(world, data, rng);
    step_evolution(world, data, rng);
}

/// Age every living NPC by one year and roll old-age deaths.
///
/// An NPC exactly at its race's maximum age is safe; each year strictly
/// past it is an independent death roll.
fn step_aging(world: &mut WorldState, data: &GameData, rng: &mut impl Rng) {
    for id in world.living_npc_ids() {
        let (age, race) = match world.npc_mut(id) {
            Some(npc) => {
                npc.age += 1;
                (npc.age, npc.race.clone())
            }
            None => continue,
        };
        if age > data.max_age(&race) && rng.gen_bool(OLD_AGE_DEATH_CHANCE) {
            world.kill_npc(id, DeathCause::OldAge);
        }
    }
}

/// Roll marriage searches for every eligible single.
fn step_marriages(world: &mut WorldState, rng: &mut impl Rng) {
    let candidates = marriage_candidates(world);
    for id in candidates {
        // Re-check live state: an earlier marriage in this pass may have
        // claimed this candidate.
        let (race, home) = match world.npc(id) {
            Some(npc) if npc.alive && npc.is_single() => {
                (npc.race.clone(), npc.settlement.clone())
            }
            _ => continue,
        };
        if !rng.gen_bool(MARRIAGE_SEARCH_CHANCE) {
            continue;
        }

        let mut partners: Vec<NpcId> = world
            .npcs
            .values()
            .filter(|p| {
                p.id != id
                    && p.alive
                    && p.is_single()
                    && p.age >= MIN_MARRIAGE_AGE
                    && p.race == race
                    && p.settlement == home
            })
            .map(|p| p.id)
            .collect();
        partners.sort();
        if partners.is_empty() {
            continue;
        }
        let partner = partners[rng.gen_range(0..partners.len())];
        marry_pair(world, id, partner);
    }
}

fn marriage_candidates(world: &WorldState) -> Vec<NpcId> {
    let mut ids: Vec<NpcId> = world
        .npcs
        .values()
        .filter(|npc| npc.alive && npc.is_single() && npc.age >= MIN_MARRIAGE_AGE)
        .map(|npc| npc.id)
        .collect();
    ids.sort();
    ids
}

/// Marry two NPCs: mutual spouse references and a single journal entry.
pub(crate) fn marry_pair(world: &mut WorldState, a: NpcId, b: NpcId) {
    let (name_a, home) = match world.npc(a) {
        Some(npc) => (npc.name.clone(), npc.settlement.clone()),
        None => return,
    };
    let name_b = match world.npc(b) {
        Some(npc) => npc.name.clone(),
        None => return,
    };
    if let Some(npc) = world.npc_mut(a) {
        npc.relationship_status = RelationshipStatus::Married;
        npc.spouse = Some(b);
    }
    if let Some(npc) = world.npc_mut(b) {
        npc.relationship_status = RelationshipStatus::Married;
        npc.spouse = Some(a);
    }
    world.record_event(
        EventCategory::Marriage,
        format!("{} and {} got married in {}!", name_a, name_b, home),
    );
}

/// Roll births, visiting each couple exactly once.
fn step_births(world: &mut WorldState, data: &GameData, rng: &mut impl Rng) {
    for (a, b) in canonical_couples(world) {
        if rng.gen_bool(BIRTH_CHANCE) {
            spawn_child(world, data, a, b, rng);
        }
    }
}

/// Married pairs with both spouses alive, each represented once with the
/// smaller id first.
fn canonical_couples(world: &WorldState) -> Vec<(NpcId, NpcId)> {
    let mut couples = Vec::new();
    for id in world.living_npc_ids() {
        let Some(npc) = world.npc(id) else { continue };
        if npc.relationship_status != RelationshipStatus::Married {
            continue;
        }
        let Some(spouse) = npc.spouse else { continue };
        if spouse <= id {
            continue;
        }
        let spouse_ok = world
            .npc(spouse)
            .map(|s| s.alive && s.relationship_status == RelationshipStatus::Married)
            .unwrap_or(false);
        if spouse_ok {
            couples.push((id, spouse));
        }
    }
    couples
}

/// Create a child of two parents and file it in the family and settlement.
pub(crate) fn spawn_child(
    world: &mut WorldState,
    data: &GameData,
    parent_a: NpcId,
    parent_b: NpcId,
    rng: &mut impl Rng,
) -> Option<NpcId> {
    let (race, home, name_a, stats_a, traits_a) = {
        let parent = world.npc(parent_a)?;
        (
            parent.race.clone(),
            parent.settlement.clone(),
            parent.name.clone(),
            parent.stats.clone(),
            parent.personality_traits.clone(),
        )
    };
    let (name_b, stats_b, traits_b) = {
        let parent = world.npc(parent_b)?;
        (
            parent.name.clone(),
            parent.stats.clone(),
            parent.personality_traits.clone(),
        )
    };

    let gender = Gender::roll(rng);
    let name = NameGenerator::generate(data, &race, gender, rng);
    let id = world.next_npc_id();
    let mut child = Npc::new(id, name, race, 0, gender, home.clone(), world.date);
    child.profession = "Child".to_string();
    child.parents = Some((parent_a, parent_b));

    // Stats: mean of the parents' matching stats plus a small offset,
    // never below 1.
    let mut stat_names: Vec<&String> = stats_a.keys().collect();
    stat_names.sort();
    for stat in stat_names {
        let a_value = stats_a[stat];
        let b_value = stats_b.get(stat).copied().unwrap_or(a_value);
        let value = (a_value + b_value) / 2 + rng.gen_range(-2..=2);
        child.set_stat(stat, value.max(1));
    }

    // Traits: each parental trait inherited independently, plus sometimes
    // one the parents never had.
    let mut inheritance: Vec<&String> = Vec::new();
    for t in traits_a.iter().chain(traits_b.iter()) {
        if !inheritance.contains(&t) {
            inheritance.push(t);
        }
    }
    for t in inheritance {
        if rng.gen_bool(TRAIT_INHERIT_CHANCE) {
            child.add_trait(t);
        }
    }
    if rng.gen_bool(NOVEL_TRAIT_CHANCE) {
        child.add_trait(NOVEL_TRAITS[rng.gen_range(0..NOVEL_TRAITS.len())]);
    }

    let child_id = world.insert_npc(child);
    if let Some(parent) = world.npc_mut(parent_a) {
        parent.add_child(child_id);
    }
    if let Some(parent) = world.npc_mut(parent_b) {
        parent.add_child(child_id);
    }

    world.record_event(
        EventCategory::Birth,
        format!("{} and {} had a child in {}!", name_a, name_b, home),
    );
    world.notify(SimulationEvent::NpcBorn {
        npc: child_id,
        parents: (parent_a, parent_b),
    });
    Some(child_id)
}

/// Roll evolution-form assignment for mature members of evolving races.
fn step_evolution(world: &mut WorldState, data: &GameData, rng: &mut impl Rng) {
    for id in world.living_npc_ids() {
        let race = match world.npc(id) {
            Some(npc) if npc.age >= EVOLUTION_MIN_AGE && npc.evolution_form.is_none() => {
                npc.race.clone()
            }
            _ => continue,
        };
        let Some(template) = data.race(&race) else { continue };
        if !template.can_evolve || template.evolution_forms.is_empty() {
            continue;
        }
        if !rng.gen_bool(EVOLUTION_CHANCE) {
            continue;
        }
        let form =
            template.evolution_forms[rng.gen_range(0..template.evolution_forms.len())].clone();
        let description = match world.npc_mut(id) {
            Some(npc) => {
                npc.evolution_form = Some(form.clone());
                npc.name = format!("{} the {}", npc.name, form);
                format!("{} evolved into a {}!", npc.name, form)
            }
            None => continue,
        };
        world.record_event(EventCategory::Evolution, description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::entities::settlement::Settlement;

    fn empty_world(settlement: &str, race: &str) -> WorldState {
        let mut world = WorldState::new();
        world.settlements.insert(
            settlement.to_string(),
            Settlement::new(settlement.to_string(), race.to_string(), (0.0, 0.0)),
        );
        world
    }

    fn spawn(world: &mut WorldState, settlement: &str, race: &str, age: u32) -> NpcId {
        let id = world.next_npc_id();
        let mut npc = Npc::new(
            id,
            format!("{} {}", race, id.0),
            race.to_string(),
            age,
            Gender::Male,
            settlement.to_string(),
            world.date,
        );
        npc.set_stat("Strength", 10);
        npc.set_stat("Intelligence", 8);
        npc.add_trait("Brave");
        world.insert_npc(npc)
    }

    #[test]
    fn test_npc_at_max_age_threshold_is_safe() {
        let data = GameData::defaults();
        // A human aging to exactly 80 must survive every seed: the old-age
        // roll only applies strictly past the threshold.
        for seed in 0..40 {
            let mut world = empty_world("New Haven", "Human");
            let id = spawn(&mut world, "New Haven", "Human", 79);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            step_aging(&mut world, &data, &mut rng);
            let npc = world.npc(id).unwrap();
            assert_eq!(npc.age, 80);
            assert!(npc.alive, "died at the threshold with seed {}", seed);
        }
    }

    #[test]
    fn test_npc_past_max_age_faces_death_rolls() {
        let data = GameData::defaults();
        // One year past the threshold the 30% roll applies; across 40 seeds
        // at least one must die.
        let mut any_died = false;
        for seed in 0..40 {
            let mut world = empty_world("New Haven", "Human");
            let id = spawn(&mut world, "New Haven", "Human", 80);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            step_aging(&mut world, &data, &mut rng);
            let npc = world.npc(id).unwrap();
            if !npc.alive {
                assert_eq!(npc.died.unwrap().1, DeathCause::OldAge);
                any_died = true;
            }
        }
        assert!(any_died);
    }

    #[test]
    fn test_marry_pair_mutual_references() {
        let mut world = empty_world("New Haven", "Human");
        let a = spawn(&mut world, "New Haven", "Human", 20);
        let b = spawn(&mut world, "New Haven", "Human", 20);
        let before = world.event_log.len();

        marry_pair(&mut world, a, b);

        let npc_a = world.npc(a).unwrap();
        let npc_b = world.npc(b).unwrap();
        assert_eq!(npc_a.relationship_status, RelationshipStatus::Married);
        assert_eq!(npc_b.relationship_status, RelationshipStatus::Married);
        assert_eq!(npc_a.spouse, Some(b));
        assert_eq!(npc_b.spouse, Some(a));
        assert_eq!(world.event_log.len(), before + 1);
        assert_eq!(world.event_log.latest().unwrap().category, EventCategory::Marriage);
    }

    #[test]
    fn test_step_marriages_no_double_marriage() {
        let mut world = empty_world("New Haven", "Human");
        for _ in 0..20 {
            spawn(&mut world, "New Haven", "Human", 25);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..20 {
            step_marriages(&mut world, &mut rng);
        }

        let married: Vec<&Npc> = world
            .npcs
            .values()
            .filter(|n| n.relationship_status == RelationshipStatus::Married)
            .collect();
        assert!(!married.is_empty(), "nobody married across 20 years");
        for npc in married {
            assert!(npc.age >= MIN_MARRIAGE_AGE);
            let spouse = world.npc(npc.spouse.unwrap()).unwrap();
            assert_eq!(spouse.spouse, Some(npc.id), "asymmetric marriage");
            assert_eq!(spouse.race, npc.race);
            assert_eq!(spouse.settlement, npc.settlement);
        }
    }

    #[test]
    fn test_marriage_without_partner_is_noop() {
        // A lone single rolls the search but finds nobody.
        let mut world = empty_world("New Haven", "Human");
        spawn(&mut world, "New Haven", "Human", 30);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            step_marriages(&mut world, &mut rng);
        }
        assert!(world.npcs.values().all(|n| n.is_single()));
        assert!(world.event_log.is_empty());
    }

    #[test]
    fn test_spawn_child() {
        let data = GameData::defaults();
        let mut world = empty_world("New Haven", "Human");
        let a = spawn(&mut world, "New Haven", "Human", 25);
        let b = spawn(&mut world, "New Haven", "Human", 24);
        marry_pair(&mut world, a, b);
        let pop_before = world.settlement("New Haven").unwrap().population;
        world.take_notifications();

        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let child_id = spawn_child(&mut world, &data, a, b, &mut rng).unwrap();

        let child = world.npc(child_id).unwrap();
        assert_eq!(child.age, 0);
        assert!(child.alive);
        assert_eq!(child.race, "Human");
        assert_eq!(child.settlement, "New Haven");
        assert_eq!(child.parents, Some((a, b)));
        assert_eq!(child.profession, "Child");
        assert!(child.stats.values().all(|v| *v >= 1));

        assert_eq!(
            world.settlement("New Haven").unwrap().population,
            pop_before + 1
        );
        assert!(world.npc(a).unwrap().children.contains(&child_id));
        assert!(world.npc(b).unwrap().children.contains(&child_id));
        assert_eq!(world.event_log.latest().unwrap().category, EventCategory::Birth);
        assert!(world.take_notifications().iter().any(|n| matches!(
            n,
            SimulationEvent::NpcBorn { npc, parents } if *npc == child_id && *parents == (a, b)
        )));
    }

    #[test]
    fn test_child_stats_near_parent_mean() {
        let data = GameData::defaults();
        let mut world = empty_world("New Haven", "Human");
        let a = spawn(&mut world, "New Haven", "Human", 25);
        let b = spawn(&mut world, "New Haven", "Human", 24);
        world.npc_mut(a).unwrap().set_stat("Strength", 14);
        world.npc_mut(b).unwrap().set_stat("Strength", 10);
        marry_pair(&mut world, a, b);

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let child_id = spawn_child(&mut world, &data, a, b, &mut rng).unwrap();
        let strength = world.npc(child_id).unwrap().stat("Strength");
        assert!((10..=14).contains(&strength), "strength {} outside mean +/- 2", strength);
    }

    #[test]
    fn test_each_couple_visited_once_per_year() {
        let data = GameData::defaults();
        let mut world = empty_world("New Haven", "Human");
        let a = spawn(&mut world, "New Haven", "Human", 25);
        let b = spawn(&mut world, "New Haven", "Human", 24);
        marry_pair(&mut world, a, b);

        // At a 30% chance per couple per year, 100 years of a single couple
        // should produce roughly 30 children; a double-visit bug would
        // produce roughly 60.
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for _ in 0..100 {
            step_births(&mut world, &data, &mut rng);
        }
        let children = world.npc(a).unwrap().children.len();
        assert!((15..=45).contains(&children), "{} children over 100 years", children);
        assert_eq!(
            world.npc(a).unwrap().children,
            world.npc(b).unwrap().children
        );
    }

    #[test]
    fn test_widowed_couple_produces_no_children() {
        let data = GameData::defaults();
        let mut world = empty_world("New Haven", "Human");
        let a = spawn(&mut world, "New Haven", "Human", 25);
        let b = spawn(&mut world, "New Haven", "Human", 24);
        marry_pair(&mut world, a, b);
        world.kill_npc(b, DeathCause::Plague);

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..50 {
            step_births(&mut world, &data, &mut rng);
        }
        assert!(world.npc(a).unwrap().children.is_empty());
    }

    #[test]
    fn test_evolution_renames_and_logs() {
        let data = GameData::defaults();
        let mut world = empty_world("Goblin Warren", "Goblin");
        let id = spawn(&mut world, "Goblin Warren", "Goblin", 30);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..100 {
            step_evolution(&mut world, &data, &mut rng);
            if world.npc(id).unwrap().evolution_form.is_some() {
                break;
            }
        }

        let npc = world.npc(id).unwrap();
        let form = npc.evolution_form.clone().expect("goblin never evolved");
        let goblin = data.race("Goblin").unwrap();
        assert!(goblin.evolution_forms.contains(&form));
        assert!(npc.name.ends_with(&format!("the {}", form)));
        assert_eq!(world.event_log.latest().unwrap().category, EventCategory::Evolution);

        // Already evolved: never rolls again.
        let name = npc.name.clone();
        for _ in 0..50 {
            step_evolution(&mut world, &data, &mut rng);
        }
        assert_eq!(world.npc(id).unwrap().name, name);
    }

    #[test]
    fn test_base_race_never_evolves() {
        let data = GameData::defaults();
        let mut world = empty_world("New Haven", "Human");
        let id = spawn(&mut world, "New Haven", "Human", 40);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        for _ in 0..200 {
            step_evolution(&mut world, &data, &mut rng);
        }
        assert!(world.npc(id).unwrap().evolution_form.is_none());
    }

    #[test]
    fn test_underage_npcs_never_marry() {
        let mut world = empty_world("New Haven", "Human");
        for _ in 0..10 {
            spawn(&mut world, "New Haven", "Human", 17);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            step_marriages(&mut world, &mut rng);
        }
        assert!(world.npcs.values().all(|n| n.is_single()));
    }
}
