//! Name pool data loaded from JSON.

use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Given-name and surname pools for one race.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NamePool {
    pub male: Vec<String>,
    pub female: Vec<String>,
    pub surnames: Vec<String>,
}

/// Container for deserializing the names JSON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamesFile {
    pub pools: HashMap<String, NamePool>,
}
