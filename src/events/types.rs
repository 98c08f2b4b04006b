//! World event records.

use std::collections::HashMap;
use serde::{Serialize, Deserialize};

use crate::time::WorldDate;

/// Categories of journal-worthy happenings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Raid,
    Festival,
    Plague,
    Discovery,
    Merchant,
    Hero,
    Marriage,
    Birth,
    Evolution,
    Construction,
    TradeRoute,
    GhostTown,
    Shop,
}

/// One entry in the world event journal. Immutable once recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldEvent {
    pub description: String,
    pub day: u32,
    pub year: u32,
    /// Wall-clock time the event was recorded, for display.
    pub timestamp: String,
    pub category: EventCategory,
    pub payload: HashMap<String, String>,
}

impl WorldEvent {
    pub fn new(category: EventCategory, date: WorldDate, description: String) -> Self {
        Self {
            description,
            day: date.day,
            year: date.year,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            category,
            payload: HashMap::new(),
        }
    }

    /// Attach a payload entry.
    pub fn with_payload(mut self, key: &str, value: impl Into<String>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_date() {
        let event = WorldEvent::new(
            EventCategory::Festival,
            WorldDate::new(42, 3),
            "A feast in Testville".to_string(),
        );
        assert_eq!(event.day, 42);
        assert_eq!(event.year, 3);
        assert!(!event.timestamp.is_empty());
    }

    #[test]
    fn test_event_payload() {
        let event = WorldEvent::new(
            EventCategory::Raid,
            WorldDate::origin(),
            "Raid!".to_string(),
        )
        .with_payload("settlement", "New Haven")
        .with_payload("casualties", "3");
        assert_eq!(event.payload.get("casualties").map(String::as_str), Some("3"));
    }
}
