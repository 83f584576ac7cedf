//! Statistics over per-trial damage totals
//!
//! Every function accepts an empty slice and returns zeros (or an empty
//! distribution) instead of NaN.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Percentiles reported when the caller does not choose any
pub const DEFAULT_PERCENTILES: [f64; 2] = [10.0, 90.0];

/// One row of the damage distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    /// Damage value
    pub damage: u32,
    /// Trials that dealt exactly this much damage
    pub count: u32,
    /// Percentage of trials dealing exactly this much
    pub probability: f64,
    /// Percentage of trials dealing at most this much
    pub cumulative: f64,
}

/// A requested percentile and its interpolated value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: f64,
}

/// Descriptive statistics for a set of trials
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub mode: u32,
    /// Population variance
    pub variance: f64,
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    pub percentiles: Vec<PercentileValue>,
    /// Ascending by damage
    pub distribution: Vec<DistributionEntry>,
}

impl Statistics {
    /// Aggregate raw trial totals
    pub fn from_totals(totals: &[u32], percentiles: &[f64]) -> Self {
        let mut sorted = totals.to_vec();
        sorted.sort_unstable();

        let variance = variance(totals);

        Self {
            mean: mean(totals),
            median: median(&sorted),
            mode: mode(totals),
            variance,
            std_dev: variance.sqrt(),
            min: sorted.first().copied().unwrap_or(0),
            max: sorted.last().copied().unwrap_or(0),
            percentiles: percentiles
                .iter()
                .map(|&p| PercentileValue {
                    percentile: p,
                    value: percentile(&sorted, p),
                })
                .collect(),
            distribution: distribution(totals),
        }
    }

    /// Look up a percentile computed by `from_totals`
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|entry| entry.percentile == p)
            .map(|entry| entry.value)
    }

    /// Percentage of trials that dealt at least `damage`
    pub fn probability_at_least(&self, damage: u32) -> f64 {
        let total: u32 = self.distribution.iter().map(|e| e.count).sum();
        if total == 0 {
            return 0.0;
        }
        let at_least: u32 = self
            .distribution
            .iter()
            .filter(|e| e.damage >= damage)
            .map(|e| e.count)
            .sum();
        at_least as f64 / total as f64 * 100.0
    }
}

/// Arithmetic mean
pub fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Population variance (divides by the number of values)
pub fn variance(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64
}

/// Most frequent value.
///
/// On a tie the value that reached the top count first, scanning in input
/// order, wins.
pub fn mode(values: &[u32]) -> u32 {
    let mut counts: HashMap<u32, u32> = HashMap::new();
    let mut best = 0;
    let mut best_count = 0;

    for &value in values {
        let count = counts.entry(value).or_insert(0);
        *count += 1;
        if *count > best_count {
            best_count = *count;
            best = value;
        }
    }

    best
}

/// Percentile of an ascending slice with linear interpolation between ranks.
///
/// The rank is `p / 100 * (n - 1)`; `p` is clamped to 0-100.
pub fn percentile(sorted: &[u32], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    sorted[lower] as f64 * (1.0 - weight) + sorted[upper] as f64 * weight
}

/// 50th percentile of an ascending slice
pub fn median(sorted: &[u32]) -> f64 {
    percentile(sorted, 50.0)
}

/// Exact and cumulative percentages per distinct value, ascending
pub fn distribution(values: &[u32]) -> Vec<DistributionEntry> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for &value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let total = values.len() as f64;
    let mut running = 0u32;

    counts
        .into_iter()
        .map(|(damage, count)| {
            running += count;
            DistributionEntry {
                damage,
                count,
                probability: count as f64 / total * 100.0,
                cumulative: running as f64 / total * 100.0,
            }
        })
        .collect()
}
