use crate::config::AnomalyDetectionConfig;
use crate::ingest::types::Transaction;

use super::baseline::build_baselines;
use super::frequency::detect_frequency_anomalies;
use super::rules::detect_point_anomalies;
use super::types::Anomaly;

/// The anomaly detection engine. Runs the point and frequency detectors
/// against a sanitized batch of transactions.
pub struct AnomalyEngine {
    config: AnomalyDetectionConfig,
}

impl AnomalyEngine {
    pub fn new(config: AnomalyDetectionConfig) -> Self {
        Self { config }
    }

    /// Analyze a batch of transactions for anomalies.
    /// Point anomalies come first in input order, followed by frequency
    /// anomalies ordered by (date, category).
    pub fn analyze(&self, transactions: &[Transaction]) -> eyre::Result<Vec<Anomaly>> {
        if !self.config.enabled || transactions.is_empty() {
            return Ok(Vec::new());
        }

        let baselines = build_baselines(transactions, self.config.iqr_multiplier);
        tracing::debug!(categories = baselines.len(), "Category baselines built");

        let mut anomalies =
            detect_point_anomalies(transactions, &baselines, self.config.z_threshold)?;
        let point_count = anomalies.len();

        anomalies.extend(detect_frequency_anomalies(
            transactions,
            self.config.freq_threshold,
        ));

        tracing::info!(
            point = point_count,
            frequency = anomalies.len() - point_count,
            "Anomaly detection complete"
        );

        Ok(anomalies)
    }
}
