//! Success thresholds and reroll policies
//!
//! Every roll-based phase (hit, wound, armor save, special save) tests a d6
//! against a `HitValue`, optionally rerolling it once under the phase's
//! reroll policies.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::dice::roll_d6;
use super::params::ParamError;

/// A success threshold for a roll-based phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ThresholdInput", into = "ThresholdInput")]
pub enum HitValue {
    /// Always succeeds, no roll needed
    Auto,
    /// Succeeds on a d6 roll of at least this value (2-6)
    Target(u8),
    /// Can never succeed
    Never,
}

impl HitValue {
    /// Lowest valid numeric threshold
    pub const MIN_TARGET: u8 = 2;
    /// Highest valid numeric threshold
    pub const MAX_TARGET: u8 = 6;

    /// Create a numeric threshold, rejecting anything outside 2-6
    pub fn target(value: u8) -> Result<Self, ParamError> {
        if (Self::MIN_TARGET..=Self::MAX_TARGET).contains(&value) {
            Ok(HitValue::Target(value))
        } else {
            Err(ParamError::ThresholdOutOfRange(value as i64))
        }
    }

    /// Whether this threshold is inside its domain
    pub fn is_valid(&self) -> bool {
        match self {
            HitValue::Target(n) => (Self::MIN_TARGET..=Self::MAX_TARGET).contains(n),
            HitValue::Auto | HitValue::Never => true,
        }
    }

    /// Parse "auto", "none", "4" or "4+"
    pub fn parse(input: &str) -> Result<Self, ParamError> {
        let s = input.trim().to_lowercase();
        match s.as_str() {
            "auto" => Ok(HitValue::Auto),
            "none" | "-" => Ok(HitValue::Never),
            _ => {
                let digits = s.strip_suffix('+').unwrap_or(&s);
                let value: i64 = digits
                    .parse()
                    .map_err(|_| ParamError::InvalidThreshold(input.to_string()))?;
                u8::try_from(value)
                    .map_err(|_| ParamError::ThresholdOutOfRange(value))
                    .and_then(HitValue::target)
            }
        }
    }
}

impl fmt::Display for HitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitValue::Auto => write!(f, "auto"),
            HitValue::Target(n) => write!(f, "{}+", n),
            HitValue::Never => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ThresholdInput {
    Number(i64),
    Text(String),
}

impl TryFrom<ThresholdInput> for HitValue {
    type Error = ParamError;

    fn try_from(input: ThresholdInput) -> Result<Self, Self::Error> {
        match input {
            ThresholdInput::Number(n) => u8::try_from(n)
                .map_err(|_| ParamError::ThresholdOutOfRange(n))
                .and_then(HitValue::target),
            ThresholdInput::Text(s) => HitValue::parse(&s),
        }
    }
}

impl From<HitValue> for ThresholdInput {
    fn from(value: HitValue) -> Self {
        match value {
            HitValue::Auto => ThresholdInput::Text("auto".to_string()),
            HitValue::Target(n) => ThresholdInput::Number(n as i64),
            HitValue::Never => ThresholdInput::Text("none".to_string()),
        }
    }
}

/// Which failed rolls may be rerolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FailedReroll {
    #[default]
    #[serde(rename = "none")]
    None,
    /// Only natural 1s
    #[serde(rename = "1s")]
    Ones,
    #[serde(rename = "all")]
    All,
}

/// Which successful rolls may be rerolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SuccessReroll {
    #[default]
    #[serde(rename = "none")]
    None,
    /// Only natural 6s
    #[serde(rename = "6s")]
    Sixes,
    #[serde(rename = "all")]
    All,
}

/// Both reroll axes for one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseRerolls {
    pub failed: FailedReroll,
    pub succeeded: SuccessReroll,
}

impl PhaseRerolls {
    /// Reroll failures according to `failed`, never successes
    pub fn failed(failed: FailedReroll) -> Self {
        Self {
            failed,
            succeeded: SuccessReroll::None,
        }
    }

    /// Reroll successes according to `succeeded`, never failures
    pub fn succeeded(succeeded: SuccessReroll) -> Self {
        Self {
            failed: FailedReroll::None,
            succeeded,
        }
    }
}

/// Check whether a roll meets the threshold
pub fn is_success(roll: u32, threshold: HitValue) -> bool {
    match threshold {
        HitValue::Auto => true,
        HitValue::Never => false,
        HitValue::Target(n) => roll >= n as u32,
    }
}

/// Check whether a roll is eligible for a reroll.
///
/// Only decides eligibility; the caller rerolls at most once and never
/// re-checks the new die.
pub fn should_reroll(
    roll: u32,
    threshold: HitValue,
    failed: FailedReroll,
    succeeded: SuccessReroll,
) -> bool {
    if is_success(roll, threshold) {
        match succeeded {
            SuccessReroll::All => true,
            SuccessReroll::Sixes => roll == 6,
            SuccessReroll::None => false,
        }
    } else {
        match failed {
            FailedReroll::All => true,
            FailedReroll::Ones => roll == 1,
            FailedReroll::None => false,
        }
    }
}

/// A d6 test after rerolls were applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOutcome {
    /// The first die rolled, before any reroll
    pub natural: u32,
    /// The die that counts
    pub result: u32,
    /// Whether `result` meets the threshold
    pub success: bool,
}

/// Roll a d6 against `threshold`, rerolling it at most once
pub fn roll_with_reroll<R: Rng>(
    rng: &mut R,
    threshold: HitValue,
    rerolls: PhaseRerolls,
) -> RollOutcome {
    let natural = roll_d6(rng);
    let result = if should_reroll(natural, threshold, rerolls.failed, rerolls.succeeded) {
        roll_d6(rng)
    } else {
        natural
    };

    RollOutcome {
        natural,
        result,
        success: is_success(result, threshold),
    }
}
