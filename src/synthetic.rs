//! Synthetic ledger generator with injected anomalies.
//!
//! Produces the same CSV layout the loader consumes, so detection can be
//! exercised end to end without real data. Injections, by zero-based index `i`:
//! - `i % 50 == 0`: amount in 1000..5000
//! - `500 < i < 510`: date pinned to `start_date + (i - 500)` days
//! - `i % 70 == 0 && i != 0`: amount in 300..700

use std::io::Write;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub num_entries: usize,
    pub start_date: NaiveDate,
    pub day_span: i64,
    pub categories: Vec<String>,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            num_entries: 1050,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
            day_span: 200,
            categories: [
                "Food",
                "Utilities",
                "Entertainment",
                "Transport",
                "Health",
                "Shopping",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            seed: 42,
        }
    }
}

/// One generated ledger row, serialized with the loader's column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticRecord {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
}

pub fn generate(config: &SyntheticConfig) -> Vec<SyntheticRecord> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let day_span = config.day_span.max(1);

    (0..config.num_entries)
        .map(|i| {
            let mut date =
                config.start_date + chrono::Duration::days(rng.gen_range(0..day_span));
            let category = if config.categories.is_empty() {
                String::new()
            } else {
                config.categories[rng.gen_range(0..config.categories.len())].clone()
            };
            let mut amount: f64 = rng.gen_range(10.0..100.0);

            if i % 50 == 0 {
                amount = rng.gen_range(1000.0..5000.0);
            }
            if i > 500 && i < 510 {
                date = config.start_date + chrono::Duration::days((i - 500) as i64);
                amount = rng.gen_range(10.0..100.0);
            }
            if i % 70 == 0 && i != 0 {
                amount = rng.gen_range(300.0..700.0);
            }

            SyntheticRecord {
                transaction_id: format!("TRX{:04}", i + 1),
                date,
                category,
                amount: (amount * 100.0).round() / 100.0,
            }
        })
        .collect()
}

/// Write records as `transaction_id,date,category,amount` CSV with a header row.
pub fn write_csv<W: Write>(records: &[SyntheticRecord], out: W) -> eyre::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
