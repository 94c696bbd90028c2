use std::collections::BTreeMap;

use crate::ingest::types::Transaction;

use super::baseline::CategoryBaseline;
use super::types::{Anomaly, AnomalyKind, AnomalyReason};

/// Standard score of `value`. Defined as 0 when `std_dev` is 0, so a
/// zero-variance group never trips a z-score rule.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        0.0
    } else {
        (value - mean) / std_dev
    }
}

/// Check whether the amount is more than `threshold` standard deviations from the category mean.
pub fn check_z_score(
    amount: f64,
    baseline: &CategoryBaseline,
    threshold: f64,
) -> Option<AnomalyReason> {
    let z = z_score(amount, baseline.mean, baseline.std_dev);
    (z.abs() > threshold).then_some(AnomalyReason::ZScoreExceeded { threshold })
}

/// Check whether the amount falls strictly outside the category's IQR fences.
pub fn check_iqr_bounds(amount: f64, baseline: &CategoryBaseline) -> Option<AnomalyReason> {
    (amount < baseline.iqr_lower_bound || amount > baseline.iqr_upper_bound)
        .then_some(AnomalyReason::OutsideIqrBounds)
}

/// Score every transaction against its category baseline.
/// Both rules are evaluated independently; the z-score reason comes first.
pub fn detect_point_anomalies(
    transactions: &[Transaction],
    baselines: &BTreeMap<String, CategoryBaseline>,
    z_threshold: f64,
) -> eyre::Result<Vec<Anomaly>> {
    let mut anomalies = Vec::new();

    for tx in transactions {
        let baseline = baselines.get(&tx.category).ok_or_else(|| {
            eyre::eyre!(
                "No baseline for category '{}' (transaction {})",
                tx.category,
                tx.transaction_id
            )
        })?;

        let reasons: Vec<AnomalyReason> = [
            check_z_score(tx.amount, baseline, z_threshold),
            check_iqr_bounds(tx.amount, baseline),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !reasons.is_empty() {
            anomalies.push(Anomaly {
                kind: AnomalyKind::Point,
                transaction_id: Some(tx.transaction_id.clone()),
                date: tx.date,
                category: tx.category.clone(),
                amount: Some(tx.amount),
                reasons,
            });
        }
    }

    Ok(anomalies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::baseline::build_baselines;
    use chrono::NaiveDate;

    fn tx(id: &str, category: &str, amount: f64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            category: category.to_string(),
            amount,
        }
    }

    fn food_scenario() -> Vec<Transaction> {
        [20.0, 22.0, 21.0, 23.0, 5000.0]
            .iter()
            .enumerate()
            .map(|(i, amount)| tx(&format!("F{}", i + 1), "Food", *amount))
            .collect()
    }

    #[test]
    fn test_z_score_zero_when_no_variance() {
        assert_eq!(z_score(100.0, 5.0, 0.0), 0.0);
        assert_eq!(z_score(8.0, 5.0, 1.5), 2.0);
    }

    #[test]
    fn test_iqr_boundary_is_exclusive() {
        let baseline =
            CategoryBaseline::from_amounts(&[10.0, 20.0, 30.0, 40.0], 1.5).unwrap();
        assert_eq!(baseline.iqr_upper_bound, 55.0);
        assert!(check_iqr_bounds(55.0, &baseline).is_none());
        assert_eq!(
            check_iqr_bounds(56.0, &baseline),
            Some(AnomalyReason::OutsideIqrBounds)
        );
        assert_eq!(baseline.iqr_lower_bound, -5.0);
        assert!(check_iqr_bounds(-5.0, &baseline).is_none());
        assert!(check_iqr_bounds(-6.0, &baseline).is_some());
    }

    #[test]
    fn test_food_spike_flagged_by_iqr() {
        let transactions = food_scenario();
        let baselines = build_baselines(&transactions, 1.5);
        let anomalies = detect_point_anomalies(&transactions, &baselines, 3.0).unwrap();

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].transaction_id.as_deref(), Some("F5"));
        // With five points the largest attainable sample z-score is 4 / sqrt(5),
        // so only the IQR rule can fire at the default threshold.
        assert_eq!(anomalies[0].reasons, vec![AnomalyReason::OutsideIqrBounds]);
    }

    #[test]
    fn test_food_spike_flagged_by_both_rules() {
        let transactions = food_scenario();
        let baselines = build_baselines(&transactions, 1.5);
        let anomalies = detect_point_anomalies(&transactions, &baselines, 1.5).unwrap();

        assert_eq!(anomalies.len(), 1);
        assert_eq!(
            anomalies[0].reasons,
            vec![
                AnomalyReason::ZScoreExceeded { threshold: 1.5 },
                AnomalyReason::OutsideIqrBounds,
            ]
        );
        assert_eq!(anomalies[0].amount, Some(5000.0));
        assert_eq!(anomalies[0].kind, AnomalyKind::Point);
    }

    #[test]
    fn test_single_transaction_category_not_flagged() {
        let transactions = vec![tx("R1", "Rent", 1200.0)];
        let baselines = build_baselines(&transactions, 1.5);
        let anomalies = detect_point_anomalies(&transactions, &baselines, 3.0).unwrap();
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_collapsed_iqr_flags_any_deviation() {
        // Q1 == Q3, so the fences sit on the common amount.
        let mut transactions: Vec<Transaction> = (0..10)
            .map(|i| tx(&format!("U{}", i), "Utilities", 50.0))
            .collect();
        transactions.push(tx("U10", "Utilities", 51.0));
        let baselines = build_baselines(&transactions, 1.5);
        let anomalies = detect_point_anomalies(&transactions, &baselines, 100.0).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].reasons, vec![AnomalyReason::OutsideIqrBounds]);
    }

    #[test]
    fn test_missing_baseline_is_fatal() {
        let transactions = vec![tx("X1", "Travel", 10.0)];
        let err =
            detect_point_anomalies(&transactions, &BTreeMap::new(), 3.0).unwrap_err();
        assert!(err.to_string().contains("Travel"));
    }

    #[test]
    fn test_threshold_monotonicity() {
        let mut transactions = food_scenario();
        transactions.extend(
            [5.0, 7.0, 9.0, 11.0, 300.0, 13.0, 8.0]
                .iter()
                .enumerate()
                .map(|(i, amount)| tx(&format!("H{}", i), "Health", *amount)),
        );
        let baselines = build_baselines(&transactions, 1.5);

        let z_only_count = |threshold: f64| {
            detect_point_anomalies(&transactions, &baselines, threshold)
                .unwrap()
                .iter()
                .filter(|a| {
                    a.reasons
                        .iter()
                        .any(|r| matches!(r, AnomalyReason::ZScoreExceeded { .. }))
                })
                .count()
        };
        let total = |threshold: f64| {
            detect_point_anomalies(&transactions, &baselines, threshold)
                .unwrap()
                .len()
        };

        let thresholds = [0.5, 1.0, 1.5, 2.0, 3.0];
        for pair in thresholds.windows(2) {
            assert!(total(pair[1]) <= total(pair[0]));
            assert!(z_only_count(pair[1]) <= z_only_count(pair[0]));
        }
    }

    #[test]
    fn test_detection_is_idempotent() {
        let transactions = food_scenario();
        let baselines = build_baselines(&transactions, 1.5);
        let first = detect_point_anomalies(&transactions, &baselines, 1.5).unwrap();
        let second = detect_point_anomalies(&transactions, &baselines, 1.5).unwrap();
        assert_eq!(first, second);
    }
}
