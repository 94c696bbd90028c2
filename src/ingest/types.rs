use chrono::NaiveDate;
use serde::Serialize;

/// A ledger row as read from the source, before any validation.
/// Empty cells are `None`; the amount is kept as text so that a malformed
/// number is a sanitization outcome rather than a load failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTransaction {
    pub transaction_id: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub amount: Option<String>,
}

impl RawTransaction {
    pub fn new(transaction_id: &str, date: &str, category: &str, amount: &str) -> Self {
        fn field(value: &str) -> Option<String> {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }

        Self {
            transaction_id: field(transaction_id),
            date: field(date),
            category: field(category),
            amount: field(amount),
        }
    }
}

/// A fully typed, sanitized transaction. `amount` is always >= 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
}
