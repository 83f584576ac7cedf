//! Layered configuration for the command-line runner
//!
//! Sources, later ones winning:
//! 1. Built-in defaults
//! 2. A TOML file (optional)
//! 3. `COMBAT_ODDS_*` environment variables, `__` separating nested keys
//!    (e.g. `COMBAT_ODDS_SIMULATION__TRIALS=5000`)
//! 4. Command-line overrides

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::{HitValue, SimulationParams};
use crate::stats::DEFAULT_PERCENTILES;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COMBAT_ODDS_";

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The attack sequence to simulate
    pub simulation: SimulationParams,
    /// Percentiles to report
    pub percentiles: Vec<f64>,
    /// Seed for reproducible runs (None = random)
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // 10 attacks hitting and wounding on 4+ with no saves
            simulation: SimulationParams::new(10, HitValue::Target(4), HitValue::Target(4)),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            seed: None,
        }
    }
}

impl Config {
    /// Build the figment for the given file and overrides
    pub fn figment<T: Serialize>(path: Option<&Path>, overrides: &T) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = path {
            debug!("loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::globals(overrides))
    }

    /// Load and validate the configuration
    pub fn load<T: Serialize>(path: Option<&Path>, overrides: &T) -> anyhow::Result<Self> {
        let config: Config = Self::figment(path, overrides).extract()?;
        config.simulation.validate()?;
        Ok(config)
    }
}
