use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::ingest::types::Transaction;

use super::baseline::{mean, sample_std_dev};
use super::rules::z_score;
use super::types::{Anomaly, AnomalyKind, AnomalyReason};

/// Number of transactions observed for one category on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCategoryCount {
    pub date: NaiveDate,
    pub category: String,
    pub count: usize,
}

/// Collapse transactions into one count per observed (date, category) pair,
/// ordered by date then category.
pub fn daily_category_counts(transactions: &[Transaction]) -> Vec<DailyCategoryCount> {
    let mut counts: BTreeMap<(NaiveDate, &str), usize> = BTreeMap::new();
    for tx in transactions {
        *counts.entry((tx.date, tx.category.as_str())).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((date, category), count)| DailyCategoryCount {
            date,
            category: category.to_string(),
            count,
        })
        .collect()
}

/// Mean and sample standard deviation of daily counts, per category.
fn count_baselines(counts: &[DailyCategoryCount]) -> BTreeMap<&str, (f64, f64)> {
    let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for day in counts {
        by_category
            .entry(day.category.as_str())
            .or_default()
            .push(day.count as f64);
    }

    by_category
        .into_iter()
        .map(|(category, values)| (category, (mean(&values), sample_std_dev(&values))))
        .collect()
}

/// Flag (date, category) pairs whose count deviates from the category's
/// typical daily count by more than `threshold` standard deviations.
///
/// All counts are aggregated before any day is scored.
pub fn detect_frequency_anomalies(transactions: &[Transaction], threshold: f64) -> Vec<Anomaly> {
    let counts = daily_category_counts(transactions);
    let baselines = count_baselines(&counts);

    let mut anomalies = Vec::new();
    for day in &counts {
        let Some(&(count_mean, count_std)) = baselines.get(day.category.as_str()) else {
            continue;
        };
        let z = z_score(day.count as f64, count_mean, count_std);

        if z.abs() > threshold {
            tracing::debug!(
                date = %day.date,
                category = %day.category,
                count = day.count,
                z_score = z,
                "Unusual daily transaction count"
            );
            anomalies.push(Anomaly {
                kind: AnomalyKind::Frequency,
                transaction_id: None,
                date: day.date,
                category: day.category.clone(),
                amount: None,
                reasons: vec![AnomalyReason::HighFrequency {
                    z_score: z,
                    threshold,
                }],
            });
        }
    }

    anomalies
}
