//! Configuration for the world simulation.

use serde::{Serialize, Deserialize};

/// Tuning knobs for the simulation loop and economy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Multiplier applied to the passage of calendar time (1.0 = normal).
    pub time_scale: f32,

    /// Real seconds per game day (before `time_scale`).
    pub day_duration: f32,

    /// Days in one game year.
    pub days_per_year: u32,

    /// Seconds between stochastic world-event ticks.
    pub simulation_tick_interval: f32,

    /// Seconds between market price recomputations and shop restocks.
    pub price_update_interval: f32,

    /// Magnitude of random market noise applied to each price update.
    pub price_fluctuation_rate: f32,

    /// How strongly the supply/demand ratio pulls prices (0 = inert market).
    pub supply_demand_influence: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            day_duration: 120.0,
            days_per_year: 100,
            simulation_tick_interval: 5.0,
            price_update_interval: 10.0,
            price_fluctuation_rate: 0.1,
            supply_demand_influence: 0.2,
        }
    }
}

impl SimulationConfig {
    /// Real seconds per game day after time scaling.
    pub fn day_period(&self) -> f32 {
        self.day_duration / self.time_scale
    }
}
