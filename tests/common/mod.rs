//! Common test utilities

use combat_odds::simulation::SimulationReport;
use combat_odds::stats::DEFAULT_PERCENTILES;
use combat_odds::{run_simulation_seeded, SimulationParams};

/// Run a seeded simulation, panicking on invalid parameters
pub fn seeded(params: &SimulationParams, seed: u64) -> SimulationReport {
    run_simulation_seeded(params, seed, &DEFAULT_PERCENTILES).expect("valid parameters")
}
