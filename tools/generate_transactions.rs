//! Synthetic Ledger Generator
//!
//! Writes a transaction CSV with injected amount and frequency anomalies.
//!
//! Usage: generate-transactions [output.csv] [seed]

use tracing_subscriber::EnvFilter;

use ledger_anomaly::synthetic::{generate, write_csv, SyntheticConfig};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let output_path = args
        .next()
        .unwrap_or_else(|| "transaction_data_with_anomalies.csv".to_string());

    let mut config = SyntheticConfig::default();
    if let Some(seed) = args.next() {
        config.seed = seed
            .parse()
            .map_err(|e| eyre::eyre!("Invalid seed '{}': {}", seed, e))?;
    }

    let records = generate(&config);
    let file = std::fs::File::create(&output_path)
        .map_err(|e| eyre::eyre!("Failed to create '{}': {}", output_path, e))?;
    write_csv(&records, file)?;

    tracing::info!(
        records = records.len(),
        seed = config.seed,
        path = %output_path,
        "Synthetic ledger written"
    );
    Ok(())
}
