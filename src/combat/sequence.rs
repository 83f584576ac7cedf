//! Attack sequence resolution
//!
//! One trial runs the attacks through five ordered phases:
//!
//! 1. To hit: poison and fury trigger on the natural (pre-reroll) die
//! 2. To wound: poisoned hits skip the roll, a natural 6 may become lethal
//! 3. Armor save: modified by armor piercing, skipped by lethal wounds
//! 4. Special save: no armor piercing, skipped by lethal wounds
//! 5. Multiple wounds: rolled and capped per unsaved wound
//!
//! With red fury, every wound that survives both saves grants one more
//! attack, resolved in a second pass that does not grant further attacks.

use rand::Rng;

use super::dice::DiceExpr;
use super::params::SimulationParams;
use super::rolls::{roll_with_reroll, HitValue, PhaseRerolls};

/// Per-hit state carried between phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HitTracker {
    /// Produced by a poison trigger: wounds automatically
    poisoned: bool,
    /// Produced by a lethal strike: ignores both saves
    lethal: bool,
}

impl HitTracker {
    fn with_lethal(self) -> Self {
        Self {
            lethal: true,
            ..self
        }
    }
}

/// Result of testing one die in a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseRoll {
    /// Passed without rolling
    Automatic,
    /// Rolled and passed, with the natural die before any reroll
    Passed(u32),
    Failed,
}

impl PhaseRoll {
    fn natural(&self) -> Option<u32> {
        match self {
            PhaseRoll::Passed(natural) => Some(*natural),
            PhaseRoll::Automatic | PhaseRoll::Failed => None,
        }
    }
}

/// Test a threshold; `auto` and `none` never touch the dice
fn test_threshold<R: Rng>(
    rng: &mut R,
    threshold: HitValue,
    rerolls: PhaseRerolls,
) -> PhaseRoll {
    match threshold {
        HitValue::Auto => PhaseRoll::Automatic,
        HitValue::Never => PhaseRoll::Failed,
        HitValue::Target(_) => {
            let outcome = roll_with_reroll(rng, threshold, rerolls);
            if outcome.success {
                PhaseRoll::Passed(outcome.natural)
            } else {
                PhaseRoll::Failed
            }
        }
    }
}

/// Damage and surviving wounds from one pass through the phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Damage after multiple wounds
    pub damage: u32,
    /// Wounds that got through both saves, before multiple wounds
    pub unsaved_wounds: u32,
}

/// Evaluate a count expression, treating negative results as zero
fn evaluate_count<R: Rng>(expr: &DiceExpr, rng: &mut R) -> u32 {
    expr.evaluate(rng).max(0) as u32
}

/// Armor save after armor piercing; worse than 6+ cannot be saved
fn effective_armor_save(save: HitValue, piercing: i32) -> HitValue {
    match save {
        HitValue::Target(n) => {
            let effective = (n as i32 + piercing).min(7);
            if effective > 6 {
                HitValue::Never
            } else {
                HitValue::Target(effective.max(1) as u8)
            }
        }
        other => other,
    }
}

fn resolve_hits<R: Rng>(
    params: &SimulationParams,
    attacks: u32,
    rng: &mut R,
) -> Vec<HitTracker> {
    let mut hits = Vec::with_capacity(attacks as usize);

    for _ in 0..attacks {
        let roll = test_threshold(rng, params.to_hit, params.hit_rerolls);
        if roll == PhaseRoll::Failed {
            continue;
        }

        let natural = roll.natural();
        let poisoned = natural.is_some_and(|n| {
            (params.poison && n == 6) || (params.poison_on_five && n >= 5)
        });
        hits.push(HitTracker {
            poisoned,
            lethal: false,
        });

        // The extra hit is plain: no poison, no further fury
        if params.fury && natural == Some(6) {
            hits.push(HitTracker::default());
        }
    }

    hits
}

fn resolve_wounds<R: Rng>(
    params: &SimulationParams,
    hits: Vec<HitTracker>,
    rng: &mut R,
) -> Vec<HitTracker> {
    let mut wounds = Vec::with_capacity(hits.len());

    for hit in hits {
        if hit.poisoned {
            wounds.push(hit);
            continue;
        }

        match test_threshold(rng, params.to_wound, params.wound_rerolls) {
            PhaseRoll::Failed => {}
            PhaseRoll::Automatic => wounds.push(hit),
            PhaseRoll::Passed(natural) => {
                if params.lethal_strike && natural == 6 {
                    wounds.push(hit.with_lethal());
                } else {
                    wounds.push(hit);
                }
            }
        }
    }

    wounds
}

/// Shared by both save phases: a passed save removes the wound
fn resolve_save<R: Rng>(
    wounds: Vec<HitTracker>,
    save: HitValue,
    rerolls: PhaseRerolls,
    rng: &mut R,
) -> Vec<HitTracker> {
    wounds
        .into_iter()
        .filter(|wound| wound.lethal || test_threshold(rng, save, rerolls) == PhaseRoll::Failed)
        .collect()
}

fn resolve_armor_saves<R: Rng>(
    params: &SimulationParams,
    wounds: Vec<HitTracker>,
    rng: &mut R,
) -> Vec<HitTracker> {
    let save = effective_armor_save(params.armor_save, params.armor_piercing);
    resolve_save(wounds, save, params.armor_rerolls, rng)
}

fn resolve_special_saves<R: Rng>(
    params: &SimulationParams,
    wounds: Vec<HitTracker>,
    rng: &mut R,
) -> Vec<HitTracker> {
    resolve_save(wounds, params.special_save, params.special_rerolls, rng)
}

fn resolve_multiple_wounds<R: Rng>(
    params: &SimulationParams,
    unsaved: &[HitTracker],
    rng: &mut R,
) -> u32 {
    unsaved
        .iter()
        .map(|_| {
            let wounds = evaluate_count(&params.multiple_wounds, rng);
            match params.max_wounds_per_hit {
                Some(cap) => wounds.min(cap),
                None => wounds,
            }
        })
        .fold(0, u32::saturating_add)
}

/// Run `attacks` attacks through every phase once
pub fn run_pipeline<R: Rng>(
    params: &SimulationParams,
    attacks: u32,
    rng: &mut R,
) -> PassOutcome {
    let hits = resolve_hits(params, attacks, rng);
    let wounds = resolve_wounds(params, hits, rng);
    let wounds = resolve_armor_saves(params, wounds, rng);
    let unsaved = resolve_special_saves(params, wounds, rng);
    let damage = resolve_multiple_wounds(params, &unsaved, rng);

    PassOutcome {
        damage,
        unsaved_wounds: unsaved.len() as u32,
    }
}

/// Simulate one trial and return its total damage
pub fn simulate_trial<R: Rng>(params: &SimulationParams, rng: &mut R) -> u32 {
    let attacks = evaluate_count(&params.attacks, rng);
    let first = run_pipeline(params, attacks, rng);

    if !params.red_fury || first.unsaved_wounds == 0 {
        return first.damage;
    }

    let second = run_pipeline(params, first.unsaved_wounds, rng);
    first.damage.saturating_add(second.damage)
}
