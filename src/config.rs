use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub anomaly_detection: AnomalyDetectionConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

// ============================================================
// Ingest Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// chrono format string used to validate the `date` column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

// ============================================================
// Anomaly Detection Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct AnomalyDetectionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,
    #[serde(default = "default_freq_threshold")]
    pub freq_threshold: f64,
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,
}

impl Default for AnomalyDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            z_threshold: default_z_threshold(),
            freq_threshold: default_freq_threshold(),
            iqr_multiplier: default_iqr_multiplier(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_z_threshold() -> f64 {
    3.0
}

fn default_freq_threshold() -> f64 {
    3.0
}

fn default_iqr_multiplier() -> f64 {
    1.5
}

// ============================================================
// Report Config
// ============================================================

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.ingest.date_format.trim().is_empty() {
            return Err(eyre::eyre!("ingest.date_format must not be empty"));
        }

        let detection = &self.anomaly_detection;
        for (name, value) in [
            ("z_threshold", detection.z_threshold),
            ("freq_threshold", detection.freq_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(eyre::eyre!(
                    "anomaly_detection.{} must be a positive number, got {}",
                    name,
                    value
                ));
            }
        }
        if !detection.iqr_multiplier.is_finite() || detection.iqr_multiplier < 0.0 {
            return Err(eyre::eyre!(
                "anomaly_detection.iqr_multiplier must be a non-negative number, got {}",
                detection.iqr_multiplier
            ));
        }
        Ok(())
    }
}
