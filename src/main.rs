//! combat-odds - estimate damage distributions from the command line

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use combat_odds::combat::{DiceExpr, HitValue, SimulationParams};
use combat_odds::config::Config;
use combat_odds::simulation::{SimulationReport, Simulator};

/// Monte Carlo combat resolution
#[derive(Parser, Debug)]
#[command(
    name = "combat-odds",
    version,
    about = "Estimate the damage distribution of an attack sequence"
)]
struct Args {
    /// TOML file with a [simulation] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Attack count, e.g. 10 or 2d6
    #[arg(short, long, value_parser = parse_expr)]
    attacks: Option<DiceExpr>,

    /// To-hit threshold (2-6, auto, none)
    #[arg(long, value_parser = parse_threshold)]
    hit: Option<HitValue>,

    /// To-wound threshold (2-6, auto, none)
    #[arg(long, value_parser = parse_threshold)]
    wound: Option<HitValue>,

    /// Armor save threshold (2-6, auto, none)
    #[arg(long, value_parser = parse_threshold)]
    armor: Option<HitValue>,

    /// Armor piercing
    #[arg(long, allow_negative_numbers = true)]
    ap: Option<i32>,

    /// Special (ward) save threshold (2-6, auto, none)
    #[arg(long, value_parser = parse_threshold)]
    ward: Option<HitValue>,

    /// Damage per unsaved wound, e.g. 2 or d3
    #[arg(long, value_parser = parse_expr)]
    multiple_wounds: Option<DiceExpr>,

    /// Per-wound cap on multiple wounds
    #[arg(long)]
    cap: Option<u32>,

    /// Number of trials
    #[arg(short, long)]
    trials: Option<u32>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Percentile to report (can be specified multiple times)
    #[arg(long = "percentile")]
    percentiles: Vec<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Include per-trial totals in JSON output
    #[arg(long, requires = "json")]
    raw: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn parse_expr(s: &str) -> Result<DiceExpr, String> {
    DiceExpr::parse(s).map_err(|e| e.to_string())
}

fn parse_threshold(s: &str) -> Result<HitValue, String> {
    HitValue::parse(s).map_err(|e| e.to_string())
}

/// Command-line values layered over file and environment configuration
#[derive(Debug, Default, Serialize)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percentiles: Option<Vec<f64>>,
    simulation: SimulationOverrides,
}

#[derive(Debug, Default, Serialize)]
struct SimulationOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    attacks: Option<DiceExpr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_hit: Option<HitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_wound: Option<HitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    armor_save: Option<HitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    armor_piercing: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    special_save: Option<HitValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    multiple_wounds: Option<DiceExpr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_wounds_per_hit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trials: Option<u32>,
}

impl From<&Args> for Overrides {
    fn from(args: &Args) -> Self {
        Self {
            seed: args.seed,
            percentiles: (!args.percentiles.is_empty()).then(|| args.percentiles.clone()),
            simulation: SimulationOverrides {
                attacks: args.attacks.clone(),
                to_hit: args.hit,
                to_wound: args.wound,
                armor_save: args.armor,
                armor_piercing: args.ap,
                special_save: args.ward,
                multiple_wounds: args.multiple_wounds.clone(),
                max_wounds_per_hit: args.cap,
                trials: args.trials,
            },
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "combat_odds=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_report(params: &SimulationParams, report: &SimulationReport) {
    let stats = &report.statistics;

    println!(
        "{} attacks, hit {}, wound {}, armor {} (AP {}), ward {}, {} wounds per hit",
        params.attacks,
        params.to_hit,
        params.to_wound,
        params.armor_save,
        params.armor_piercing,
        params.special_save,
        params.multiple_wounds
    );
    println!("{} trials in {:.1}ms", report.trial_count, report.elapsed_ms);
    println!();
    println!("mean      {:>8.3}", stats.mean);
    println!("median    {:>8.3}", stats.median);
    println!("mode      {:>8}", stats.mode);
    println!("std dev   {:>8.3}", stats.std_dev);
    println!("min/max   {:>4}/{}", stats.min, stats.max);
    for p in &stats.percentiles {
        println!("p{:<8} {:>8.3}", p.percentile, p.value);
    }
    println!();
    println!("damage   exact   at most  at least");
    for entry in &stats.distribution {
        println!(
            "{:>6} {:>6.2}% {:>8.2}% {:>8.2}%",
            entry.damage,
            entry.probability,
            entry.cumulative,
            stats.probability_at_least(entry.damage)
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    if let Some(path) = &args.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    let overrides = Overrides::from(&args);
    let config = Config::load(args.config.as_deref(), &overrides)?;

    let simulator = Simulator::new(config.simulation)?;
    let report = match config.seed {
        Some(seed) => {
            use rand::SeedableRng;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            simulator.run_with_statistics(&mut rng, &config.percentiles)
        }
        None => simulator.run_with_statistics(&mut rand::rng(), &config.percentiles),
    };

    if args.json {
        let output = if args.raw {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string_pretty(&report.statistics)?
        };
        println!("{}", output);
    } else {
        print_report(simulator.params(), &report);
    }

    Ok(())
}
