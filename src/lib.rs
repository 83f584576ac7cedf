//! combat-odds - Monte Carlo combat resolution
//!
//! Estimates the damage distribution of a tabletop wargame attack sequence
//! (hit, wound, armor save, special save, multiple wounds) by simulating it
//! many times and aggregating the totals.

pub mod combat;
pub mod config;
pub mod simulation;
pub mod stats;

pub use combat::{DiceExpr, HitValue, SimulationParams};
pub use simulation::{
    run_simulation, run_simulation_seeded, run_simulation_with_statistics, SimulationError,
    SimulationReport, Simulator,
};
pub use stats::Statistics;
