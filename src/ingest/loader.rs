use std::io::Read;

use super::types::RawTransaction;

const REQUIRED_COLUMNS: [&str; 4] = ["transaction_id", "date", "category", "amount"];

/// Load a transaction ledger CSV from disk.
/// Expected columns (any order, extra columns ignored): transaction_id, date, category, amount
pub fn load_transactions(path: &str) -> eyre::Result<Vec<RawTransaction>> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("Failed to open transactions CSV '{}': {}", path, e))?;
    let rows = load_transactions_from_reader(file)
        .map_err(|e| eyre::eyre!("Failed to load transactions CSV '{}': {}", path, e))?;
    tracing::info!(rows = rows.len(), path, "Loaded transaction ledger");
    Ok(rows)
}

/// Load a transaction ledger from any CSV byte source.
pub fn load_transactions_from_reader<R: Read>(source: R) -> eyre::Result<Vec<RawTransaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader.byte_headers()?.clone();
    let mut indices = [0usize; 4];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| std::str::from_utf8(h).map(str::trim) == Ok(column))
            .ok_or_else(|| eyre::eyre!("Missing required column '{}'", column))?;
    }
    let [id_idx, date_idx, category_idx, amount_idx] = indices;

    // Byte records so that a cell with invalid UTF-8 becomes a missing field
    // for that row instead of failing the whole load.
    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        let cell = |idx: usize| {
            record
                .get(idx)
                .and_then(|bytes| std::str::from_utf8(bytes).ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        rows.push(RawTransaction {
            transaction_id: cell(id_idx),
            date: cell(date_idx),
            category: cell(category_idx),
            amount: cell(amount_idx),
        });
    }

    tracing::debug!(rows = rows.len(), "Parsed ledger rows");
    Ok(rows)
}
