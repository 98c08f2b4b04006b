//! Settlement records and building catalog.

use std::collections::HashMap;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::entities::NpcId;

/// Building kinds that can exist in a settlement.
///
/// The first three are founding structures every settlement starts with;
/// the rest are constructed as the settlement grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Inn,
    Market,
    GuardPost,
    House,
    Shop,
    Temple,
    Workshop,
    Tavern,
    Library,
    Barracks,
}

impl BuildingKind {
    /// Kinds eligible for growth-driven construction.
    pub fn constructible() -> &'static [BuildingKind] {
        &[
            BuildingKind::House,
            BuildingKind::Shop,
            BuildingKind::Temple,
            BuildingKind::Workshop,
            BuildingKind::Tavern,
            BuildingKind::Library,
            BuildingKind::Barracks,
        ]
    }

    /// Fixed function label for this kind.
    pub fn function(&self) -> &'static str {
        match self {
            BuildingKind::Inn => "Rest",
            BuildingKind::Market => "Trade",
            BuildingKind::GuardPost => "Defense",
            BuildingKind::House => "Housing",
            BuildingKind::Shop => "Commerce",
            BuildingKind::Temple => "Religion",
            BuildingKind::Workshop => "Crafting",
            BuildingKind::Tavern => "Social",
            BuildingKind::Library => "Knowledge",
            BuildingKind::Barracks => "Defense",
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildingKind::GuardPost => write!(f, "Guard Post"),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A constructed building.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub level: u32,
}

impl Building {
    pub fn new(kind: BuildingKind) -> Self {
        Self { kind, level: 1 }
    }
}

/// A settlement on the world map, keyed by its unique name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settlement {
    pub name: String,
    pub position: (f32, f32),
    pub dominant_race: String,

    /// Count of living members. Maintained incrementally on every birth,
    /// death, and insertion; must always equal the number of `members`
    /// that are alive.
    pub population: u32,

    /// Wealth level, clamped at zero.
    pub prosperity: i32,
    pub defense: i32,

    /// Every NPC ever filed here, dead or alive.
    pub members: Vec<NpcId>,
    pub buildings: Vec<Building>,

    /// Names of settlements linked by trade.
    pub trade_routes: Vec<String>,

    pub resources: HashMap<String, i32>,
    pub allies: Vec<String>,
    pub enemies: Vec<String>,

    /// Set while the settlement sits at zero population, so the ghost-town
    /// transition is logged exactly once per depopulation.
    pub abandoned: bool,
}

impl Settlement {
    pub fn new(name: String, dominant_race: String, position: (f32, f32)) -> Self {
        Self {
            name,
            position,
            dominant_race,
            population: 0,
            prosperity: 0,
            defense: 0,
            members: Vec::new(),
            buildings: Vec::new(),
            trade_routes: Vec::new(),
            resources: HashMap::new(),
            allies: Vec::new(),
            enemies: Vec::new(),
            abandoned: false,
        }
    }

    /// Adjust prosperity, flooring at zero.
    pub fn adjust_prosperity(&mut self, delta: i32) {
        self.prosperity = (self.prosperity + delta).max(0);
    }

    pub fn has_trade_route_to(&self, other: &str) -> bool {
        self.trade_routes.iter().any(|r| r == other)
    }
}
