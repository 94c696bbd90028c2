use tracing_subscriber::EnvFilter;

use ledger_anomaly::config::Config;
use ledger_anomaly::ingest::loader::load_transactions;
use ledger_anomaly::pipeline::DetectionPipeline;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so stdout carries only the report (set RUST_LOG to adjust)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let input_path = args.next().ok_or_else(|| {
        eyre::eyre!("Usage: ledger-anomaly <transactions.csv> [config.toml]")
    })?;

    let config = match args.next() {
        Some(config_path) => {
            let config = Config::load(&config_path)?;
            tracing::info!("Configuration loaded from {}", config_path);
            config
        }
        None => Config::default(),
    };
    tracing::info!(
        z_threshold = config.anomaly_detection.z_threshold,
        freq_threshold = config.anomaly_detection.freq_threshold,
        iqr_multiplier = config.anomaly_detection.iqr_multiplier,
        "Detection thresholds"
    );

    let rows = load_transactions(&input_path)?;

    let pipeline = DetectionPipeline::new(config);
    let result = pipeline.run(&rows)?;

    tracing::info!(
        analyzed = result.summary.transactions_analyzed,
        dropped = result.summary.sanitize.dropped(),
        imputed = result.summary.sanitize.imputed_amounts,
        point = result.summary.point_anomalies,
        frequency = result.summary.frequency_anomalies,
        "Run complete"
    );

    println!("{}", result.outcome.render(pipeline.config().report.format)?);
    Ok(())
}
