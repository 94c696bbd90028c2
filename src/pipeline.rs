use serde::Serialize;

use crate::anomaly::engine::AnomalyEngine;
use crate::anomaly::types::AnomalyKind;
use crate::config::Config;
use crate::ingest::sanitizer::{self, SanitizeSummary};
use crate::ingest::types::RawTransaction;
use crate::report::{self, ReportOutcome};

/// Counters describing one run of the detection pipeline.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PipelineSummary {
    pub sanitize: SanitizeSummary,
    pub transactions_analyzed: usize,
    pub point_anomalies: usize,
    pub frequency_anomalies: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub summary: PipelineSummary,
    pub outcome: ReportOutcome,
}

/// Orchestrates one batch run:
/// 1. Sanitize raw rows
/// 2. Build category baselines and run both detectors
/// 3. Build the report
pub struct DetectionPipeline {
    config: Config,
    engine: AnomalyEngine,
}

impl DetectionPipeline {
    pub fn new(config: Config) -> Self {
        let engine = AnomalyEngine::new(config.anomaly_detection.clone());
        Self { config, engine }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self, rows: &[RawTransaction]) -> eyre::Result<PipelineResult> {
        let batch = sanitizer::sanitize(rows, &self.config.ingest.date_format);
        if batch.transactions.is_empty() {
            tracing::warn!(
                rows = rows.len(),
                "No usable transactions after sanitization"
            );
        }

        let anomalies = self.engine.analyze(&batch.transactions)?;
        let point_anomalies = anomalies
            .iter()
            .filter(|a| a.kind == AnomalyKind::Point)
            .count();

        let summary = PipelineSummary {
            sanitize: batch.summary,
            transactions_analyzed: batch.transactions.len(),
            point_anomalies,
            frequency_anomalies: anomalies.len() - point_anomalies,
        };

        for anomaly in &anomalies {
            tracing::debug!(
                kind = anomaly.kind.as_str(),
                transaction_id = ?anomaly.transaction_id,
                category = %anomaly.category,
                reasons = %anomaly.reason_text(),
                "ANOMALY DETECTED"
            );
        }

        Ok(PipelineResult {
            summary,
            outcome: report::build_report(anomalies),
        })
    }
}
