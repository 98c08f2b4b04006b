//! NPC records: identity, family, traits, and lifecycle state.

use std::collections::HashMap;
use std::fmt;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::entities::NpcId;
use crate::time::WorldDate;

/// Biological gender, used for name generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Draw a gender uniformly.
    pub fn roll(rng: &mut impl Rng) -> Self {
        if rng.gen_bool(0.5) { Gender::Male } else { Gender::Female }
    }
}

/// Marital state. Widowed NPCs remain `Married` to the deceased spouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipStatus {
    Single,
    Married,
}

/// How an NPC died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Violence,
    Plague,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathCause::OldAge => write!(f, "Old Age"),
            DeathCause::Violence => write!(f, "Violence"),
            DeathCause::Plague => write!(f, "Plague"),
        }
    }
}

/// A single inhabitant of the world.
///
/// NPCs are never deleted: death only clears the `alive` flag and fills in
/// the death record, so lineage queries keep working.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    pub race: String,
    pub age: u32,
    pub gender: Gender,
    pub stats: HashMap<String, i32>,
    pub profession: String,

    /// Name of the settlement this NPC belongs to.
    pub settlement: String,

    // Family
    pub relationship_status: RelationshipStatus,
    pub spouse: Option<NpcId>,
    pub parents: Option<(NpcId, NpcId)>,
    pub children: Vec<NpcId>,

    pub personality_traits: Vec<String>,

    /// Evolution form gained later in life, if any.
    pub evolution_form: Option<String>,

    pub alive: bool,
    pub born: WorldDate,
    pub died: Option<(WorldDate, DeathCause)>,
}

impl Npc {
    pub fn new(
        id: NpcId,
        name: String,
        race: String,
        age: u32,
        gender: Gender,
        settlement: String,
        born: WorldDate,
    ) -> Self {
        Self {
            id,
            name,
            race,
            age,
            gender,
            stats: HashMap::new(),
            profession: String::new(),
            settlement,
            relationship_status: RelationshipStatus::Single,
            spouse: None,
            parents: None,
            children: Vec::new(),
            personality_traits: Vec::new(),
            evolution_form: None,
            alive: true,
            born,
            died: None,
        }
    }

    /// Kill this NPC, recording when and why.
    pub fn kill(&mut self, date: WorldDate, cause: DeathCause) {
        self.alive = false;
        self.died = Some((date, cause));
    }

    pub fn is_single(&self) -> bool {
        self.relationship_status == RelationshipStatus::Single
    }

    /// Get a stat value (0 if absent).
    pub fn stat(&self, name: &str) -> i32 {
        self.stats.get(name).copied().unwrap_or(0)
    }

    pub fn set_stat(&mut self, name: &str, value: i32) {
        self.stats.insert(name.to_string(), value);
    }

    pub fn modify_stat(&mut self, name: &str, delta: i32) {
        *self.stats.entry(name.to_string()).or_insert(0) += delta;
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.personality_traits.iter().any(|t| t == name)
    }

    /// Add a personality trait if not already present.
    pub fn add_trait(&mut self, name: &str) {
        if !self.has_trait(name) {
            self.personality_traits.push(name.to_string());
        }
    }

    /// Years lived: current age while alive, age at death afterwards.
    pub fn lifespan(&self) -> u32 {
        match self.died {
            Some((date, _)) => date.year.saturating_sub(self.born.year),
            None => self.age,
        }
    }

    /// Append a child reference (children lists are append-only).
    pub fn add_child(&mut self, child: NpcId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }
}
