//! Simulation parameters
//!
//! One immutable parameter set describes a full attack sequence. Only the
//! attack count and the hit/wound thresholds are required; everything else
//! defaults to "no effect".

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dice::{DiceError, DiceExpr};
use super::rolls::{HitValue, PhaseRerolls};

/// Default number of trials per simulation
pub const DEFAULT_TRIALS: u32 = 10_000;

/// Parameter validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("threshold {0} is out of range (expected 2-6, auto or none)")]
    ThresholdOutOfRange(i64),

    #[error("invalid threshold '{0}' (expected 2-6, auto or none)")]
    InvalidThreshold(String),

    #[error("{field}: {source}")]
    Dice {
        field: &'static str,
        #[source]
        source: DiceError,
    },

    #[error("trial count must be at least 1")]
    NoTrials,
}

/// Full configuration for one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of attacks, fixed or rolled once per trial
    pub attacks: DiceExpr,
    /// To-hit threshold
    pub to_hit: HitValue,
    /// To-wound threshold
    pub to_wound: HitValue,

    #[serde(default)]
    pub hit_rerolls: PhaseRerolls,
    #[serde(default)]
    pub wound_rerolls: PhaseRerolls,
    /// Defender's rerolls on armor saves
    #[serde(default)]
    pub armor_rerolls: PhaseRerolls,
    /// Defender's rerolls on special saves
    #[serde(default)]
    pub special_rerolls: PhaseRerolls,

    /// Armor save threshold
    #[serde(default = "no_save")]
    pub armor_save: HitValue,
    /// Added to the armor save threshold
    #[serde(default)]
    pub armor_piercing: i32,
    /// Ward-style save taken after armor, unaffected by armor piercing
    #[serde(default = "no_save")]
    pub special_save: HitValue,

    /// Natural 6 to hit wounds automatically
    #[serde(default)]
    pub poison: bool,
    /// Natural 5+ to hit wounds automatically
    #[serde(default)]
    pub poison_on_five: bool,
    /// Natural 6 to wound ignores all saves
    #[serde(default)]
    pub lethal_strike: bool,
    /// Natural 6 to hit scores one extra hit
    #[serde(default)]
    pub fury: bool,
    /// Each unsaved wound grants one extra attack, which cannot chain
    #[serde(default)]
    pub red_fury: bool,

    /// Damage per unsaved wound, rolled separately for each wound
    #[serde(default = "one_wound")]
    pub multiple_wounds: DiceExpr,
    /// Per-wound cap on `multiple_wounds` (none = unbounded)
    #[serde(default)]
    pub max_wounds_per_hit: Option<u32>,

    /// Number of trials
    #[serde(default = "default_trials")]
    pub trials: u32,
}

fn no_save() -> HitValue {
    HitValue::Never
}

fn one_wound() -> DiceExpr {
    DiceExpr::Fixed(1)
}

fn default_trials() -> u32 {
    DEFAULT_TRIALS
}

impl SimulationParams {
    /// Create parameters with every optional field at its default
    pub fn new(attacks: impl Into<DiceExpr>, to_hit: HitValue, to_wound: HitValue) -> Self {
        Self {
            attacks: attacks.into(),
            to_hit,
            to_wound,
            hit_rerolls: PhaseRerolls::default(),
            wound_rerolls: PhaseRerolls::default(),
            armor_rerolls: PhaseRerolls::default(),
            special_rerolls: PhaseRerolls::default(),
            armor_save: no_save(),
            armor_piercing: 0,
            special_save: no_save(),
            poison: false,
            poison_on_five: false,
            lethal_strike: false,
            fury: false,
            red_fury: false,
            multiple_wounds: one_wound(),
            max_wounds_per_hit: None,
            trials: DEFAULT_TRIALS,
        }
    }

    /// Create parameters whose attack count is dice notation
    pub fn with_attack_dice(
        attacks: &str,
        to_hit: HitValue,
        to_wound: HitValue,
    ) -> Result<Self, ParamError> {
        let attacks = DiceExpr::parse(attacks).map_err(|source| ParamError::Dice {
            field: "attacks",
            source,
        })?;
        Ok(Self::new(attacks, to_hit, to_wound))
    }

    /// Set the armor save and armor piercing
    pub fn with_armor(mut self, save: HitValue, piercing: i32) -> Self {
        self.armor_save = save;
        self.armor_piercing = piercing;
        self
    }

    /// Set the special (ward) save
    pub fn with_special_save(mut self, save: HitValue) -> Self {
        self.special_save = save;
        self
    }

    pub fn with_hit_rerolls(mut self, rerolls: PhaseRerolls) -> Self {
        self.hit_rerolls = rerolls;
        self
    }

    pub fn with_wound_rerolls(mut self, rerolls: PhaseRerolls) -> Self {
        self.wound_rerolls = rerolls;
        self
    }

    pub fn with_armor_rerolls(mut self, rerolls: PhaseRerolls) -> Self {
        self.armor_rerolls = rerolls;
        self
    }

    pub fn with_special_rerolls(mut self, rerolls: PhaseRerolls) -> Self {
        self.special_rerolls = rerolls;
        self
    }

    /// Set damage per unsaved wound and its per-wound cap
    pub fn with_multiple_wounds(mut self, wounds: impl Into<DiceExpr>, cap: Option<u32>) -> Self {
        self.multiple_wounds = wounds.into();
        self.max_wounds_per_hit = cap;
        self
    }

    /// Set the number of trials
    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    /// Check every threshold domain and the trial count
    pub fn validate(&self) -> Result<(), ParamError> {
        for threshold in [
            self.to_hit,
            self.to_wound,
            self.armor_save,
            self.special_save,
        ] {
            if let HitValue::Target(n) = threshold {
                if !threshold.is_valid() {
                    return Err(ParamError::ThresholdOutOfRange(n as i64));
                }
            }
        }

        if self.trials == 0 {
            return Err(ParamError::NoTrials);
        }

        Ok(())
    }
}
