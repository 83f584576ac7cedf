//! Simulation driver
//!
//! Runs the attack sequence once per trial and collects the totals. Callers
//! either take the raw totals or a report with statistics attached.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::combat::{simulate_trial, ParamError, SimulationParams};
use crate::stats::{Statistics, DEFAULT_PERCENTILES};

/// Errors raised before any trial runs
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid simulation parameters: {0}")]
    Params(#[from] ParamError),
}

/// Raw totals plus their statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Damage per trial, in trial order
    pub totals: Vec<u32>,
    pub statistics: Statistics,
    pub trial_count: u32,
    /// Wall time of the trial loop
    pub elapsed_ms: f64,
}

/// Validated parameters ready to run
#[derive(Debug, Clone)]
pub struct Simulator {
    params: SimulationParams,
}

impl Simulator {
    /// Validate parameters and create a simulator
    pub fn new(params: SimulationParams) -> Result<Self, SimulationError> {
        params.validate()?;

        if params.attacks.min() < 0 {
            warn!(
                "attack count '{}' can roll below zero; negative counts mean no attacks",
                params.attacks
            );
        }
        if params.multiple_wounds.min() < 0 {
            warn!(
                "multiple wounds '{}' can roll below zero; negative values deal no damage",
                params.multiple_wounds
            );
        }

        Ok(Self { params })
    }

    /// Get the parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Run every trial and return the totals
    pub fn run<R: Rng>(&self, rng: &mut R) -> Vec<u32> {
        self.run_timed(rng).0
    }

    /// Run every trial, also returning how long the loop took
    pub fn run_timed<R: Rng>(&self, rng: &mut R) -> (Vec<u32>, Duration) {
        let start = Instant::now();
        let totals: Vec<u32> = (0..self.params.trials)
            .map(|_| simulate_trial(&self.params, rng))
            .collect();
        let elapsed = start.elapsed();

        debug!("ran {} trials in {:?}", totals.len(), elapsed);
        (totals, elapsed)
    }

    /// Run every trial and aggregate the totals
    pub fn run_with_statistics<R: Rng>(
        &self,
        rng: &mut R,
        percentiles: &[f64],
    ) -> SimulationReport {
        let (totals, elapsed) = self.run_timed(rng);
        let statistics = Statistics::from_totals(&totals, percentiles);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        info!(
            "simulated {} trials in {:.1}ms: mean {:.2}, median {:.1}, max {}",
            totals.len(),
            elapsed_ms,
            statistics.mean,
            statistics.median,
            statistics.max
        );

        SimulationReport {
            trial_count: totals.len() as u32,
            totals,
            statistics,
            elapsed_ms,
        }
    }
}

/// Run a simulation with thread-local randomness and return raw totals
pub fn run_simulation(params: &SimulationParams) -> Result<Vec<u32>, SimulationError> {
    let simulator = Simulator::new(params.clone())?;
    Ok(simulator.run(&mut rand::rng()))
}

/// Run a simulation with thread-local randomness and summarize it
pub fn run_simulation_with_statistics(
    params: &SimulationParams,
) -> Result<SimulationReport, SimulationError> {
    let simulator = Simulator::new(params.clone())?;
    Ok(simulator.run_with_statistics(&mut rand::rng(), &DEFAULT_PERCENTILES))
}

/// Run a reproducible simulation from a seed and summarize it
pub fn run_simulation_seeded(
    params: &SimulationParams,
    seed: u64,
    percentiles: &[f64],
) -> Result<SimulationReport, SimulationError> {
    let simulator = Simulator::new(params.clone())?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(simulator.run_with_statistics(&mut rng, percentiles))
}
