use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Types of anomalies the engine can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A single transaction whose amount is out of line with its category.
    Point,
    /// A (date, category) pair with an unusual number of transactions.
    Frequency,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Frequency => "frequency",
        }
    }
}

/// Why a rule fired. Rendered text is what the report tallies on.
#[derive(Debug, Clone, PartialEq)]
pub enum AnomalyReason {
    ZScoreExceeded { threshold: f64 },
    OutsideIqrBounds,
    HighFrequency { z_score: f64, threshold: f64 },
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZScoreExceeded { threshold } => write!(
                f,
                "Z-score exceeds threshold = {} standard deviations",
                threshold
            ),
            Self::OutsideIqrBounds => write!(f, "Amount outside IQR bounds"),
            // Worded as "high" even when the count is unusually low.
            Self::HighFrequency { z_score, threshold } => write!(
                f,
                "High frequency of transactions (Z-score {:.2}, threshold {})",
                z_score, threshold
            ),
        }
    }
}

impl Serialize for AnomalyReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A detected anomaly. Frequency anomalies carry no transaction id or amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub transaction_id: Option<String>,
    pub date: NaiveDate,
    pub category: String,
    pub amount: Option<f64>,
    pub reasons: Vec<AnomalyReason>,
}

impl Anomaly {
    /// All reasons joined with "; ", z-score reason first.
    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
