//! World events: the bounded journal and the notification bus.

pub mod bus;
pub mod log;
pub mod types;

pub use bus::{EventBus, SimulationEvent, SubscriberId};
pub use log::{EventLog, MAX_RECENT_EVENTS};
pub use types::{EventCategory, WorldEvent};
