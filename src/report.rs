use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::anomaly::types::Anomaly;
use crate::config::ReportFormat;

pub const NO_ANOMALIES_MESSAGE: &str = "No anomalies present.";

/// How many anomalies share one exact reason text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total: usize,
    pub reason_counts: Vec<ReasonCount>,
    pub anomalies: Vec<Anomaly>,
}

/// Result of report building. An empty detection result is a terminal,
/// successful outcome with no report body.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    NoAnomalies,
    Report(Report),
}

/// Tally reasons and wrap the anomaly list into a report.
pub fn build_report(anomalies: Vec<Anomaly>) -> ReportOutcome {
    if anomalies.is_empty() {
        return ReportOutcome::NoAnomalies;
    }

    ReportOutcome::Report(Report {
        total: anomalies.len(),
        reason_counts: tally_reasons(&anomalies),
        anomalies,
    })
}

/// Count anomalies per full reason text, most frequent first.
/// Ties keep the order in which the reason first appeared.
pub fn tally_reasons(anomalies: &[Anomaly]) -> Vec<ReasonCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<ReasonCount> = Vec::new();

    for anomaly in anomalies {
        let reason = anomaly.reason_text();
        match index.get(&reason) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(reason.clone(), counts.len());
                counts.push(ReasonCount { reason, count: 1 });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

impl ReportOutcome {
    pub fn anomaly_count(&self) -> usize {
        match self {
            Self::NoAnomalies => 0,
            Self::Report(report) => report.total,
        }
    }

    pub fn render(&self, format: ReportFormat) -> eyre::Result<String> {
        match format {
            ReportFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| eyre::eyre!("Failed to serialize report: {}", e)),
            ReportFormat::Text => Ok(match self {
                Self::NoAnomalies => NO_ANOMALIES_MESSAGE.to_string(),
                Self::Report(report) => report.render_text(),
            }),
        }
    }
}

impl Report {
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Anomaly Detection Report")?;
        writeln!(f, "{}", "=".repeat(30))?;
        writeln!(f)?;
        writeln!(f, "Total anomalies detected: {}", self.total)?;
        writeln!(f)?;

        writeln!(f, "Summary of reasons for anomalies:")?;
        let summary_rows: Vec<Vec<String>> = self
            .reason_counts
            .iter()
            .map(|rc| vec![rc.reason.clone(), rc.count.to_string()])
            .collect();
        f.write_str(&render_table(&["reason", "count"], &summary_rows))?;
        writeln!(f)?;

        writeln!(f, "Detailed list of anomalies:")?;
        let detail_rows: Vec<Vec<String>> = self
            .anomalies
            .iter()
            .map(|a| {
                vec![
                    a.transaction_id.clone().unwrap_or_else(|| "-".to_string()),
                    a.date.to_string(),
                    a.category.clone(),
                    a.amount
                        .map(|amount| format!("{:.2}", amount))
                        .unwrap_or_else(|| "-".to_string()),
                    a.reason_text(),
                ]
            })
            .collect();
        f.write_str(&render_table(
            &["transaction_id", "date", "category", "amount", "reason_for_anomaly"],
            &detail_rows,
        ))
    }
}

/// Left-aligned columns separated by two spaces. The last column is not padded.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| {
        let last = cells.len().saturating_sub(1);
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == last {
                    cell.to_string()
                } else {
                    format!("{:<width$}", cell, width = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        format!("{}\n", line)
    };

    let mut out = format_row(headers.to_vec());
    for row in rows {
        out.push_str(&format_row(row.iter().map(String::as_str).collect()));
    }
    out
}
