//! Name generation from race name pools.

use rand::Rng;

use crate::data::GameData;
use crate::entities::npc::Gender;

/// Name generator that produces display names from a race's pools.
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a display name for a race and gender.
    ///
    /// Unknown races fall back to the Human pools; with no pools at all the
    /// generator degrades to a placeholder rather than failing.
    pub fn generate(data: &GameData, race: &str, gender: Gender, rng: &mut impl Rng) -> String {
        let Some(pool) = data.name_pool(race) else {
            return "Nameless Wanderer".to_string();
        };

        let given = match gender {
            Gender::Female if !pool.female.is_empty() => {
                &pool.female[rng.gen_range(0..pool.female.len())]
            }
            _ if !pool.male.is_empty() => &pool.male[rng.gen_range(0..pool.male.len())],
            _ => return "Nameless Wanderer".to_string(),
        };

        if pool.surnames.is_empty() {
            return given.clone();
        }
        let surname = &pool.surnames[rng.gen_range(0..pool.surnames.len())];
        format!("{} {}", given, surname)
    }
}
