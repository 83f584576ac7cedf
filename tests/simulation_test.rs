//! End-to-end simulation scenarios

mod common;

use combat_odds::combat::{
    parse_dice_expression, roll_d3, DiceExpr, FailedReroll, PhaseRerolls, SuccessReroll,
};
use combat_odds::{run_simulation, HitValue, SimulationParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::seeded;

fn four_plus(attacks: u32) -> SimulationParams {
    SimulationParams::new(attacks, HitValue::Target(4), HitValue::Target(4))
}

#[test]
fn test_dice_expression_range() {
    let mut rng = StdRng::seed_from_u64(1);
    for (expr, min, max) in [("2d6+3", 5, 15), ("3d3-1", 2, 8), ("d6", 1, 6), ("4", 4, 4)] {
        for _ in 0..300 {
            let value = parse_dice_expression(expr, &mut rng).unwrap();
            assert!((min..=max).contains(&value), "{} gave {}", expr, value);
        }
    }
    assert!(parse_dice_expression("2d10", &mut rng).is_err());
    assert!(parse_dice_expression("two dice", &mut rng).is_err());
}

#[test]
fn test_d3_produces_every_face() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut seen = [0u32; 3];
    for _ in 0..3000 {
        seen[roll_d3(&mut rng) as usize - 1] += 1;
    }
    assert!(seen.iter().all(|&count| count > 850), "{:?}", seen);
}

#[test]
fn test_totals_bounded_by_attacks() {
    let params = four_plus(8)
        .with_armor(HitValue::Target(5), 0)
        .with_trials(2000);
    let report = seeded(&params, 3);
    assert!(report.totals.iter().all(|&t| t <= 8));
}

#[test]
fn test_distribution_sums_to_one_hundred() {
    let params = SimulationParams::with_attack_dice("2d6", HitValue::Target(3), HitValue::Target(4))
        .unwrap()
        .with_multiple_wounds(DiceExpr::parse("d3").unwrap(), None)
        .with_trials(5000);
    let report = seeded(&params, 4);
    let dist = &report.statistics.distribution;

    let sum: f64 = dist.iter().map(|e| e.probability).sum();
    assert!((sum - 100.0).abs() < 0.01, "sum was {}", sum);
    assert!((dist.last().unwrap().cumulative - 100.0).abs() < 1e-9);
    assert!(dist.windows(2).all(|w| w[0].damage < w[1].damage));
    assert_eq!(
        dist.iter().map(|e| e.count).sum::<u32>(),
        report.trial_count
    );
}

#[test]
fn test_impossible_hits_deal_nothing() {
    let params = SimulationParams::new(20, HitValue::Never, HitValue::Auto).with_trials(1000);
    let totals = run_simulation(&params).unwrap();
    assert!(totals.iter().all(|&t| t == 0));
}

#[test]
fn test_automatic_hits_and_wounds_deal_attack_count() {
    let params = SimulationParams::new(6, HitValue::Auto, HitValue::Auto).with_trials(1000);
    let totals = run_simulation(&params).unwrap();
    assert!(totals.iter().all(|&t| t == 6));
}

#[test]
fn test_ten_attacks_on_fours() {
    let report = seeded(&four_plus(10).with_trials(5000), 5);
    let mean = report.statistics.mean;
    assert!((2.0..=3.0).contains(&mean), "mean was {}", mean);
}

#[test]
fn test_failed_rerolls_raise_mean() {
    let base = four_plus(10).with_trials(10_000);
    let base_mean = seeded(&base, 6).statistics.mean;

    for policy in [FailedReroll::Ones, FailedReroll::All] {
        let hits = base.clone().with_hit_rerolls(PhaseRerolls::failed(policy));
        let wounds = base.clone().with_wound_rerolls(PhaseRerolls::failed(policy));
        assert!(seeded(&hits, 7).statistics.mean > base_mean, "{:?} to hit", policy);
        assert!(seeded(&wounds, 8).statistics.mean > base_mean, "{:?} to wound", policy);
    }
}

#[test]
fn test_defender_rerolls_lower_mean() {
    let base = four_plus(10)
        .with_armor(HitValue::Target(4), 0)
        .with_trials(10_000);
    let base_mean = seeded(&base, 9).statistics.mean;
    let rerolled = base
        .clone()
        .with_armor_rerolls(PhaseRerolls::failed(FailedReroll::All));
    assert!(seeded(&rerolled, 10).statistics.mean < base_mean);
}

#[test]
fn test_success_reroll_of_sixes_is_neutral_in_range() {
    // Rerolling successful 6s can only swap a hit for a coin flip
    let base = four_plus(10).with_trials(10_000);
    let rerolled = base
        .clone()
        .with_hit_rerolls(PhaseRerolls::succeeded(SuccessReroll::Sixes));
    let mean = seeded(&rerolled, 11).statistics.mean;
    assert!((2.0..=2.5).contains(&mean), "mean was {}", mean);
}

#[test]
fn test_lethal_strike_beats_good_saves() {
    let base = SimulationParams::new(10, HitValue::Target(3), HitValue::Target(4))
        .with_armor(HitValue::Target(2), 0)
        .with_special_save(HitValue::Target(2))
        .with_trials(10_000);
    let mut lethal = base.clone();
    lethal.lethal_strike = true;

    let without = seeded(&base, 12).statistics.mean;
    let with = seeded(&lethal, 13).statistics.mean;
    assert!(with > without, "{} vs {}", with, without);
}

#[test]
fn test_d3_multiple_wounds() {
    let params = SimulationParams::new(1, HitValue::Auto, HitValue::Auto)
        .with_multiple_wounds(DiceExpr::parse("d3").unwrap(), Some(10))
        .with_trials(2000);
    let report = seeded(&params, 14);
    assert!(report.totals.iter().all(|t| (1..=3).contains(t)));
    assert_eq!(report.statistics.min, 1);
    assert_eq!(report.statistics.max, 3);
}

#[test]
fn test_multiple_wounds_cap() {
    let params = SimulationParams::new(1, HitValue::Auto, HitValue::Auto)
        .with_multiple_wounds(10, Some(3))
        .with_trials(500);
    let report = seeded(&params, 15);
    assert!(report.totals.iter().all(|&t| t == 3));
    assert_eq!(report.statistics.variance, 0.0);
}

#[test]
fn test_red_fury_without_survivors_adds_nothing() {
    let mut params = four_plus(10)
        .with_armor(HitValue::Auto, 0)
        .with_trials(500);
    params.red_fury = true;
    let report = seeded(&params, 16);
    assert!(report.totals.iter().all(|&t| t == 0));
}

#[test]
fn test_red_fury_increases_damage() {
    let base = four_plus(10).with_trials(10_000);
    let mut fury = base.clone();
    fury.red_fury = true;

    let base_mean = seeded(&base, 17).statistics.mean;
    let fury_mean = seeded(&fury, 18).statistics.mean;
    // Second pass adds roughly a quarter of the first pass
    assert!(fury_mean > base_mean * 1.15, "{} vs {}", fury_mean, base_mean);
    assert!(fury_mean < base_mean * 1.35, "{} vs {}", fury_mean, base_mean);
}

#[test]
fn test_rolled_attack_count_varies() {
    let params = SimulationParams::with_attack_dice("2d6", HitValue::Auto, HitValue::Auto)
        .unwrap()
        .with_trials(2000);
    let report = seeded(&params, 19);
    assert_eq!(report.statistics.min, 2);
    assert_eq!(report.statistics.max, 12);
    assert!((6.8..=7.2).contains(&report.statistics.mean));
}
