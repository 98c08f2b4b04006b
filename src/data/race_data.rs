//! Race template data loaded from JSON.

use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// A race definition loaded from data files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaceTemplate {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub can_evolve: bool,
    /// Age past which old-age death rolls begin.
    pub max_age: u32,
    /// Bootstrap population range `[min, max)` for this race.
    pub initial_population: [u32; 2],
    pub base_stats: HashMap<String, i32>,
    #[serde(default)]
    pub starting_skills: Vec<String>,
    #[serde(default)]
    pub professions: Vec<String>,
    /// Evolution forms members of this race may grow into. Empty for
    /// base races that advance through professions instead.
    #[serde(default)]
    pub evolution_forms: Vec<String>,
}

/// Container for deserializing the races JSON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RacesFile {
    pub races: Vec<RaceTemplate>,
}
