//! Data-driven game data registry.
//!
//! Loads race templates and name pools from JSON data files. Defaults are
//! embedded in the binary via `include_str!`; an optional directory can
//! override them at load time.

pub mod race_data;
pub mod name_data;

use std::collections::HashMap;
use std::path::Path;

pub use race_data::{RaceTemplate, RacesFile};
pub use name_data::{NamePool, NamesFile};

// Embedded default data files
const DEFAULT_RACES_JSON: &str = include_str!("../../data/defaults/races.json");
const DEFAULT_NAMES_JSON: &str = include_str!("../../data/defaults/names.json");

/// Old-age threshold used for races with no template entry.
pub const DEFAULT_MAX_AGE: u32 = 70;

/// Read-only game data registry, loaded once at startup.
#[derive(Clone, Debug)]
pub struct GameData {
    /// Race definitions keyed by name (e.g. "Human", "Goblin").
    pub races: HashMap<String, RaceTemplate>,
    /// Ordered list of race names (for iteration in deterministic order).
    pub race_names: Vec<String>,
    /// Name pools keyed by race name.
    pub name_pools: HashMap<String, NamePool>,
}

impl GameData {
    /// Load from embedded defaults compiled into the binary.
    pub fn defaults() -> Self {
        let races_file: RacesFile = serde_json::from_str(DEFAULT_RACES_JSON)
            .expect("Failed to parse embedded races.json");
        let names_file: NamesFile = serde_json::from_str(DEFAULT_NAMES_JSON)
            .expect("Failed to parse embedded names.json");

        let mut races = HashMap::new();
        let mut race_names = Vec::new();
        for race in races_file.races {
            race_names.push(race.name.clone());
            races.insert(race.name.clone(), race);
        }

        Self {
            races,
            race_names,
            name_pools: names_file.pools,
        }
    }

    /// Load from a directory, merging with embedded defaults.
    ///
    /// Files in the directory override the corresponding default data.
    /// Missing or unparseable files fall back to defaults.
    pub fn load_from(dir: &Path) -> Self {
        let mut data = Self::defaults();

        let races_path = dir.join("races.json");
        if races_path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&races_path) {
                match serde_json::from_str::<RacesFile>(&contents) {
                    Ok(races_file) => {
                        for race in races_file.races {
                            if !data.races.contains_key(&race.name) {
                                data.race_names.push(race.name.clone());
                            }
                            data.races.insert(race.name.clone(), race);
                        }
                    }
                    Err(e) => log::warn!("failed to parse {}: {}", races_path.display(), e),
                }
            }
        }

        let names_path = dir.join("names.json");
        if names_path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&names_path) {
                match serde_json::from_str::<NamesFile>(&contents) {
                    Ok(names_file) => {
                        for (race, pool) in names_file.pools {
                            data.name_pools.insert(race, pool);
                        }
                    }
                    Err(e) => log::warn!("failed to parse {}: {}", names_path.display(), e),
                }
            }
        }

        data
    }

    /// Look up a race template by name.
    pub fn race(&self, name: &str) -> Option<&RaceTemplate> {
        self.races.get(name)
    }

    /// Old-age threshold for a race. Unknown races get a default.
    pub fn max_age(&self, race: &str) -> u32 {
        self.races.get(race).map(|r| r.max_age).unwrap_or(DEFAULT_MAX_AGE)
    }

    /// Name pool for a race, falling back to the Human pool.
    pub fn name_pool(&self, race: &str) -> Option<&NamePool> {
        self.name_pools.get(race).or_else(|| self.name_pools.get("Human"))
    }
}
