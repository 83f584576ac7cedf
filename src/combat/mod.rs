//! Combat resolution module
//!
//! Implements the attack sequence of a tabletop wargame:
//! - Dice rolling (e.g., "2d6+1", "d3")
//! - Success thresholds with `auto`/`none` sentinels and rerolls
//! - Hit, wound, armor save, special save and multiple-wounds phases
//! - Poison, lethal strike, fury and red fury

mod dice;
mod params;
mod rolls;
mod sequence;

pub use dice::{
    parse_dice_expression, roll_d3, roll_d6, roll_die, DiceError, DiceExpr, DiceRoll, Die,
};
pub use params::{ParamError, SimulationParams, DEFAULT_TRIALS};
pub use rolls::{
    is_success, roll_with_reroll, should_reroll, FailedReroll, HitValue, PhaseRerolls, RollOutcome,
    SuccessReroll,
};
pub use sequence::{run_pipeline, simulate_trial, PassOutcome};
