pub mod anomaly;
pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod synthetic;
