//! The demographic registry: master store for NPCs and settlements.
//!
//! All mutation funnels through the methods here so that the settlement
//! population counters stay in step with the member lists, one increment
//! or decrement per event, never by rescanning.

use std::collections::HashMap;

use crate::entities::{IdGenerator, NpcId};
use crate::entities::npc::{DeathCause, Npc};
use crate::entities::settlement::Settlement;
use crate::events::{EventCategory, EventLog, SimulationEvent, WorldEvent};
use crate::time::WorldDate;

/// The live world: every NPC and settlement, the current date, and the
/// bounded event journal.
pub struct WorldState {
    pub date: WorldDate,
    pub npcs: HashMap<NpcId, Npc>,
    pub settlements: HashMap<String, Settlement>,
    pub event_log: EventLog,

    /// Notifications raised since the last dispatch, in order.
    outbox: Vec<SimulationEvent>,
    npc_ids: IdGenerator,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            date: WorldDate::origin(),
            npcs: HashMap::new(),
            settlements: HashMap::new(),
            event_log: EventLog::new(),
            outbox: Vec::new(),
            npc_ids: IdGenerator::new(),
        }
    }

    pub fn next_npc_id(&mut self) -> NpcId {
        NpcId(self.npc_ids.next_id())
    }

    /// File an NPC into the registry and its settlement.
    ///
    /// Membership and the population counter are updated together; an NPC
    /// whose settlement does not exist is kept but counted nowhere.
    pub fn insert_npc(&mut self, npc: Npc) -> NpcId {
        let id = npc.id;
        if let Some(settlement) = self.settlements.get_mut(&npc.settlement) {
            settlement.members.push(id);
            if npc.alive {
                settlement.population += 1;
            }
        }
        self.npcs.insert(id, npc);
        id
    }

    /// Kill an NPC: flag it dead, stamp the death record, and decrement its
    /// settlement's population exactly once. The record itself is retained.
    ///
    /// Returns `false` for unknown or already-dead NPCs.
    pub fn kill_npc(&mut self, id: NpcId, cause: DeathCause) -> bool {
        let date = self.date;
        let Some(npc) = self.npcs.get_mut(&id) else {
            return false;
        };
        if !npc.alive {
            return false;
        }
        npc.kill(date, cause);
        log::debug!("{} died ({})", npc.name, cause);
        let home = npc.settlement.clone();
        if let Some(settlement) = self.settlements.get_mut(&home) {
            settlement.population = settlement.population.saturating_sub(1);
        }
        self.outbox.push(SimulationEvent::NpcDied { npc: id, cause });
        true
    }

    /// Append a world event to the bounded journal and notify subscribers.
    pub fn record(&mut self, event: WorldEvent) {
        log::info!("[world event] {}", event.description);
        self.outbox.push(SimulationEvent::WorldEventLogged {
            description: event.description.clone(),
        });
        self.event_log.record(event);
    }

    /// Convenience wrapper around [`WorldState::record`] for plain events.
    pub fn record_event(&mut self, category: EventCategory, description: impl Into<String>) {
        self.record(WorldEvent::new(category, self.date, description.into()));
    }

    /// Queue a notification for the next dispatch.
    pub(crate) fn notify(&mut self, event: SimulationEvent) {
        self.outbox.push(event);
    }

    /// Drain all queued notifications, oldest first.
    pub(crate) fn take_notifications(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.outbox)
    }

    // === Read-only queries ===

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(&id)
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.get_mut(&id)
    }

    pub fn settlement(&self, name: &str) -> Option<&Settlement> {
        self.settlements.get(name)
    }

    pub fn settlement_mut(&mut self, name: &str) -> Option<&mut Settlement> {
        self.settlements.get_mut(name)
    }

    /// Settlement names in deterministic (sorted) order.
    pub fn settlement_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.settlements.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of living NPCs in the whole world.
    pub fn total_population(&self) -> usize {
        self.npcs.values().filter(|npc| npc.alive).count()
    }

    /// Living NPC counts grouped by race.
    pub fn population_by_race(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for npc in self.npcs.values().filter(|npc| npc.alive) {
            *counts.entry(npc.race.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// The world counts as destroyed once nobody is left alive.
    pub fn is_world_destroyed(&self) -> bool {
        self.total_population() == 0
    }

    /// Living NPCs filed in a settlement. Unknown settlements yield nothing.
    pub fn npcs_in_settlement(&self, name: &str) -> Vec<&Npc> {
        let Some(settlement) = self.settlements.get(name) else {
            return Vec::new();
        };
        settlement
            .members
            .iter()
            .filter_map(|id| self.npcs.get(id))
            .filter(|npc| npc.alive)
            .collect()
    }

    /// Ids of living members of a settlement, in membership order.
    pub fn living_member_ids(&self, name: &str) -> Vec<NpcId> {
        self.npcs_in_settlement(name).iter().map(|npc| npc.id).collect()
    }

    /// Living NPC ids across the world in ascending id order, for
    /// deterministic batch iteration.
    pub fn living_npc_ids(&self) -> Vec<NpcId> {
        let mut ids: Vec<NpcId> = self
            .npcs
            .values()
            .filter(|npc| npc.alive)
            .map(|npc| npc.id)
            .collect();
        ids.sort();
        ids
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}
