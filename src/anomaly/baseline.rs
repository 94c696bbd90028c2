use std::collections::BTreeMap;

use serde::Serialize;

use crate::ingest::types::Transaction;

/// Descriptive statistics for one category's amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBaseline {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub count: usize,
    pub iqr_lower_bound: f64,
    pub iqr_upper_bound: f64,
}

impl CategoryBaseline {
    /// Build a baseline from a non-empty set of amounts.
    /// Returns None for an empty slice.
    pub fn from_amounts(amounts: &[f64], iqr_multiplier: f64) -> Option<Self> {
        if amounts.is_empty() {
            return None;
        }

        let mut sorted = amounts.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;

        Some(Self {
            mean: mean(amounts),
            median: quantile(&sorted, 0.5),
            std_dev: sample_std_dev(amounts),
            count: amounts.len(),
            iqr_lower_bound: q1 - iqr_multiplier * iqr,
            iqr_upper_bound: q3 + iqr_multiplier * iqr,
        })
    }
}

/// Group transactions by category and compute a baseline for each group.
pub fn build_baselines(
    transactions: &[Transaction],
    iqr_multiplier: f64,
) -> BTreeMap<String, CategoryBaseline> {
    let mut amounts_by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for tx in transactions {
        amounts_by_category
            .entry(tx.category.as_str())
            .or_default()
            .push(tx.amount);
    }

    let baselines: BTreeMap<String, CategoryBaseline> = amounts_by_category
        .into_iter()
        .filter_map(|(category, amounts)| {
            CategoryBaseline::from_amounts(&amounts, iqr_multiplier)
                .map(|baseline| (category.to_string(), baseline))
        })
        .collect();

    for (category, baseline) in &baselines {
        tracing::debug!(
            category = %category,
            count = baseline.count,
            mean = baseline.mean,
            std_dev = baseline.std_dev,
            lower = baseline.iqr_lower_bound,
            upper = baseline.iqr_upper_bound,
            "Category baseline"
        );
    }

    baselines
}

/// Arithmetic mean as a running mean, so large finite inputs never overflow.
pub fn mean(values: &[f64]) -> f64 {
    values
        .iter()
        .enumerate()
        .fold(0.0, |m, (i, v)| m + (v - m) / (i + 1) as f64)
}

/// Unbiased (n - 1) standard deviation; 0 when fewer than two values.
/// Deviations are scaled by the largest one before squaring.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let scale = values.iter().map(|v| (v - m).abs()).fold(0.0, f64::max);
    if scale == 0.0 {
        return 0.0;
    }
    let sq_diff: f64 = values.iter().map(|v| ((v - m) / scale).powi(2)).sum();
    (sq_diff / (values.len() - 1) as f64).sqrt() * scale
}

/// Quantile of an ascending slice with linear interpolation between
/// the ranks around position (n - 1) * q.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = (n - 1) as f64 * q.clamp(0.0, 1.0);
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let fraction = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}
