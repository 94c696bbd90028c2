use chrono::NaiveDate;
use serde::Serialize;

use super::types::{RawTransaction, Transaction};

/// Counters describing what sanitization did to a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SanitizeSummary {
    pub rows_read: usize,
    pub dropped_incomplete: usize,
    pub dropped_bad_amount: usize,
    pub dropped_bad_date: usize,
    pub imputed_amounts: usize,
}

impl SanitizeSummary {
    pub fn dropped(&self) -> usize {
        self.dropped_incomplete + self.dropped_bad_amount + self.dropped_bad_date
    }
}

#[derive(Debug, Clone)]
pub struct SanitizedBatch {
    pub transactions: Vec<Transaction>,
    pub summary: SanitizeSummary,
}

/// A row that has every field present and a numeric amount, date still unchecked.
struct Candidate<'a> {
    transaction_id: &'a str,
    date: &'a str,
    category: &'a str,
    amount: f64,
}

/// Validate and normalize raw ledger rows.
///
/// Order is fixed: incomplete rows are dropped, amounts are parsed, negative
/// amounts are replaced by the mean of all non-negative amounts (computed
/// once, before date validation), and finally rows whose date does not parse
/// under `date_format` are dropped.
pub fn sanitize(rows: &[RawTransaction], date_format: &str) -> SanitizedBatch {
    let mut summary = SanitizeSummary {
        rows_read: rows.len(),
        ..Default::default()
    };

    let mut candidates = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(transaction_id), Some(date), Some(category), Some(amount)) = (
            row.transaction_id.as_deref(),
            row.date.as_deref(),
            row.category.as_deref(),
            row.amount.as_deref(),
        ) else {
            summary.dropped_incomplete += 1;
            continue;
        };

        match amount.parse::<f64>() {
            Ok(amount) if amount.is_finite() => candidates.push(Candidate {
                transaction_id,
                date,
                category,
                amount,
            }),
            _ => summary.dropped_bad_amount += 1,
        }
    }

    let imputation_mean = valid_amount_mean(&candidates);

    let mut transactions = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let amount = if candidate.amount < 0.0 {
            match imputation_mean {
                Some(mean) => {
                    summary.imputed_amounts += 1;
                    mean
                }
                None => {
                    summary.dropped_bad_amount += 1;
                    continue;
                }
            }
        } else {
            candidate.amount
        };

        let Ok(date) = NaiveDate::parse_from_str(candidate.date, date_format) else {
            summary.dropped_bad_date += 1;
            continue;
        };

        transactions.push(Transaction {
            transaction_id: candidate.transaction_id.to_string(),
            date,
            category: candidate.category.to_string(),
            amount,
        });
    }

    if summary.dropped() > 0 || summary.imputed_amounts > 0 {
        tracing::info!(
            kept = transactions.len(),
            dropped_incomplete = summary.dropped_incomplete,
            dropped_bad_amount = summary.dropped_bad_amount,
            dropped_bad_date = summary.dropped_bad_date,
            imputed = summary.imputed_amounts,
            "Sanitized ledger rows"
        );
    }

    SanitizedBatch {
        transactions,
        summary,
    }
}

/// Running mean of the non-negative amounts, or None when there are none.
/// Stays finite for any finite inputs.
fn valid_amount_mean(candidates: &[Candidate<'_>]) -> Option<f64> {
    let (mean, count) = candidates
        .iter()
        .filter(|c| c.amount >= 0.0)
        .fold((0.0_f64, 0usize), |(mean, count), c| {
            let count = count + 1;
            (mean + (c.amount - mean) / count as f64, count)
        });
    (count > 0).then_some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str = "%Y-%m-%d";

    fn raw(id: &str, date: &str, category: &str, amount: &str) -> RawTransaction {
        RawTransaction::new(id, date, category, amount)
    }

    #[test]
    fn test_clean_rows_pass_through() {
        let rows = vec![
            raw("T1", "2024-01-01", "Food", "10.5"),
            raw("T2", "2024-01-02", "Health", "0"),
        ];
        let batch = sanitize(&rows, FORMAT);
        assert_eq!(batch.transactions.len(), 2);
        assert_eq!(batch.transactions[0].amount, 10.5);
        assert_eq!(
            batch.transactions[1].date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(batch.summary.dropped(), 0);
    }

    #[test]
    fn test_incomplete_rows_dropped_not_imputed() {
        let rows = vec![
            raw("", "2024-01-01", "Food", "10"),
            raw("T2", "", "Food", "10"),
            raw("T3", "2024-01-01", "", "10"),
            raw("T4", "2024-01-01", "Food", ""),
            raw("T5", "2024-01-01", "Food", "10"),
        ];
        let batch = sanitize(&rows, FORMAT);
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.transactions[0].transaction_id, "T5");
        assert_eq!(batch.summary.dropped_incomplete, 4);
    }

    #[test]
    fn test_unparsable_amount_dropped() {
        let rows = vec![
            raw("T1", "2024-01-01", "Food", "abc"),
            raw("T2", "2024-01-01", "Food", "NaN"),
            raw("T3", "2024-01-01", "Food", "7"),
        ];
        let batch = sanitize(&rows, FORMAT);
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.summary.dropped_bad_amount, 2);
    }

    #[test]
    fn test_negative_amounts_replaced_by_global_mean() {
        let rows = vec![
            raw("T1", "2024-01-01", "Food", "10"),
            raw("T2", "2024-01-01", "Food", "-5"),
            raw("T3", "2024-01-01", "Health", "30"),
            raw("T4", "2024-01-02", "Health", "-100"),
        ];
        let batch = sanitize(&rows, FORMAT);
        assert_eq!(batch.summary.imputed_amounts, 2);
        let amounts: Vec<f64> = batch.transactions.iter().map(|t| t.amount).collect();
        // Mean of the valid subset only (10, 30), applied to both negatives.
        assert_eq!(amounts, vec![10.0, 20.0, 30.0, 20.0]);
    }

    #[test]
    fn test_imputation_mean_includes_rows_later_dropped_for_date() {
        let rows = vec![
            raw("T1", "2024-01-01", "Food", "10"),
            raw("T2", "not-a-date", "Food", "50"),
            raw("T3", "2024-01-03", "Food", "-1"),
        ];
        let batch = sanitize(&rows, FORMAT);
        assert_eq!(batch.summary.dropped_bad_date, 1);
        assert_eq!(batch.transactions.len(), 2);
        assert_eq!(batch.transactions[1].amount, 30.0);
    }

    #[test]
    fn test_imputed_amount_stays_finite_for_large_values() {
        let rows = vec![
            raw("T1", "2024-01-01", "Food", "1e308"),
            raw("T2", "2024-01-01", "Food", "1e308"),
            raw("T3", "2024-01-01", "Food", "-1"),
        ];
        let batch = sanitize(&rows, FORMAT);
        assert_eq!(batch.summary.imputed_amounts, 1);
        assert_eq!(batch.transactions.len(), 3);
        for tx in &batch.transactions {
            assert!(tx.amount.is_finite(), "{:?}", tx);
        }
        assert_eq!(batch.transactions[2].amount, 1e308);
    }

    #[test]
    fn test_all_negative_amounts_dropped() {
        let rows = vec![
            raw("T1", "2024-01-01", "Food", "-10"),
            raw("T2", "2024-01-01", "Food", "-20"),
        ];
        let batch = sanitize(&rows, FORMAT);
        assert!(batch.transactions.is_empty());
        assert_eq!(batch.summary.dropped_bad_amount, 2);
    }

    #[test]
    fn test_invalid_dates_dropped() {
        let rows = vec![
            raw("T1", "2024-02-30", "Food", "10"),
            raw("T2", "01/02/2024", "Food", "10"),
            raw("T3", "2024-02-29", "Food", "10"),
        ];
        let batch = sanitize(&rows, FORMAT);
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.transactions[0].transaction_id, "T3");
        assert_eq!(batch.summary.dropped_bad_date, 2);
    }

    #[test]
    fn test_custom_date_format() {
        let rows = vec![raw("T1", "01/02/2024", "Food", "10")];
        let batch = sanitize(&rows, "%d/%m/%Y");
        assert_eq!(
            batch.transactions[0].date,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_sanitized_invariants() {
        let rows = vec![
            raw("T1", "2024-01-01", "Food", "-3"),
            raw("T2", "2024-01-05", "Food", "4"),
            raw("T3", "bad", "Food", "-9"),
            raw("T4", "2024-01-07", "Food", "x"),
        ];
        let batch = sanitize(&rows, FORMAT);
        for tx in &batch.transactions {
            assert!(tx.amount >= 0.0 && tx.amount.is_finite());
            let rendered = tx.date.format(FORMAT).to_string();
            assert!(NaiveDate::parse_from_str(&rendered, FORMAT).is_ok());
        }
        assert_eq!(
            batch.summary.rows_read,
            batch.transactions.len() + batch.summary.dropped()
        );
    }

    #[test]
    fn test_empty_input() {
        let batch = sanitize(&[], FORMAT);
        assert!(batch.transactions.is_empty());
        assert_eq!(batch.summary, SanitizeSummary::default());
    }
}
