//! Typed publish/subscribe registry for simulation notifications.
//!
//! Delivery is synchronous within the tick that raised the notification.
//! Mutation code buffers notifications on the world state; the simulation
//! root drains the buffer through this bus after each engine pass, so
//! subscribers only ever observe completed state changes.

use crate::entities::{NpcId, ShopId};
use crate::entities::npc::DeathCause;

/// Notifications published to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationEvent {
    DayPassed { day: u32, year: u32 },
    YearPassed { year: u32 },
    NpcBorn { npc: NpcId, parents: (NpcId, NpcId) },
    NpcDied { npc: NpcId, cause: DeathCause },
    WorldEventLogged { description: String },
    ShopOpened { shop: ShopId, settlement: String },
    ShopClosed { shop: ShopId, reason: String },
    PriceChanged { item: String, old: f32, new: f32 },
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&SimulationEvent)>;

/// Synchronous event bus.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it is invoked for every published event.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver one event to every subscriber, in subscription order.
    pub fn publish(&mut self, event: &SimulationEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
