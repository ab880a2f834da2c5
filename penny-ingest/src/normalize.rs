//! Normalization of loose LLM records into validated transactions.
//!
//! Each record is handled independently: a malformed record is skipped
//! with a reason, never failing the batch. Missing fields get defaults so
//! a partially-filled record still produces a usable transaction.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use penny_core::{NewTransaction, TransactionType, TxSource};

use crate::reply::RawRecord;

const DEFAULT_DESCRIPTION: &str = "Unknown transaction";
const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Date-only formats tried against the token before the first space
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result for one record in a batch
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Accepted(NewTransaction),
    Skipped { index: usize, reason: String },
}

/// Per-record outcomes for one upload
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn accepted(&self) -> Vec<NewTransaction> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RecordOutcome::Accepted(tx) => Some(tx.clone()),
                RecordOutcome::Skipped { .. } => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> Vec<(usize, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                RecordOutcome::Skipped { index, reason } => Some((*index, reason.as_str())),
                RecordOutcome::Accepted(_) => None,
            })
            .collect()
    }

    pub fn accepted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RecordOutcome::Accepted(_)))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.accepted_count()
    }
}

/// Parse the supplied date string, trying each known format against the
/// token before the first space, then the full string as a datetime. Falls
/// back to `now` so an odd date never drops the record.
fn parse_date(raw: &str, now: NaiveDateTime) -> NaiveDateTime {
    let token = raw.split(' ').next().unwrap_or(raw);

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(token, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return dt;
            }
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FORMAT) {
        return dt;
    }

    log::debug!("unparseable date {raw:?}, falling back to current time");
    now
}

/// Build a validated transaction from one loose record, default-filling
/// every missing field. Amounts are stored as magnitudes.
pub fn normalize_record(raw: &RawRecord, now: NaiveDateTime) -> NewTransaction {
    let date = raw
        .date
        .as_deref()
        .map(|d| parse_date(d, now))
        .unwrap_or(now);

    let description = match raw.description.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    };

    let category = match raw.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    };

    let kind = raw
        .transaction_type
        .as_deref()
        .and_then(TransactionType::parse)
        .unwrap_or(TransactionType::Expense);

    NewTransaction {
        date,
        description,
        amount: raw.amount_f64().unwrap_or(0.0).abs(),
        category,
        kind,
        source: TxSource::BankStatement,
    }
}

/// Normalize a parsed reply into per-record outcomes. A record is skipped
/// when it does not decode as an object of the expected shape or carries
/// no usable field at all.
pub fn normalize_batch(records: &[Value], now: NaiveDateTime) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, value) in records.iter().enumerate() {
        let raw: RawRecord = match serde_json::from_value(value.clone()) {
            Ok(r) => r,
            Err(err) => {
                log::warn!("skipping record {index}: {err}");
                report.outcomes.push(RecordOutcome::Skipped {
                    index,
                    reason: format!("malformed record: {err}"),
                });
                continue;
            }
        };

        if raw.is_empty() {
            log::warn!("skipping record {index}: no usable fields");
            report.outcomes.push(RecordOutcome::Skipped {
                index,
                reason: "no usable fields".to_string(),
            });
            continue;
        }

        report
            .outcomes
            .push(RecordOutcome::Accepted(normalize_record(&raw, now)));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::LooseAmount;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_date_formats() {
        let cases = [
            ("2024-01-05", (2024, 1, 5)),
            ("01/05/2024", (2024, 1, 5)),
            ("2024-01-05 09:30:00", (2024, 1, 5)),
        ];
        for (raw, (y, m, d)) in cases {
            let parsed = parse_date(raw, now());
            let want = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            assert_eq!(parsed.date(), want, "for {raw:?}");
        }
    }

    #[test]
    fn test_dd_mm_yyyy_when_mm_dd_impossible() {
        // 25 can't be a month, so the %d/%m/%Y fallback applies
        let parsed = parse_date("25/01/2024", now());
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
    }

    #[test]
    fn test_unparseable_date_falls_back_to_now() {
        let raw = RawRecord {
            date: Some("sometime last week".to_string()),
            description: Some("Coffee".to_string()),
            amount: Some(LooseAmount::Num(4.5)),
            ..Default::default()
        };
        let tx = normalize_record(&raw, now());
        assert_eq!(tx.date, now());
        assert_eq!(tx.description, "Coffee");
    }

    #[test]
    fn test_negative_amount_stored_as_magnitude() {
        let raw = RawRecord {
            amount: Some(LooseAmount::Num(-88.20)),
            ..Default::default()
        };
        let tx = normalize_record(&raw, now());
        assert_eq!(tx.amount, 88.20);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let raw = RawRecord {
            amount: Some(LooseAmount::Num(10.0)),
            ..Default::default()
        };
        let tx = normalize_record(&raw, now());
        assert_eq!(tx.description, DEFAULT_DESCRIPTION);
        assert_eq!(tx.category, DEFAULT_CATEGORY);
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.source, TxSource::BankStatement);
    }

    #[test]
    fn test_unknown_type_defaults_to_expense() {
        let raw = RawRecord {
            amount: Some(LooseAmount::Num(10.0)),
            transaction_type: Some("refund".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize_record(&raw, now()).kind, TransactionType::Expense);
    }

    #[test]
    fn test_batch_skips_malformed_without_failing() {
        let records = vec![
            json!({"date": "2024-01-05", "description": "Coffee", "amount": 4.5,
                   "transaction_type": "expense", "category": "Food & Dining"}),
            json!("not an object"),
            json!({}),
            json!({"description": "Paycheck", "amount": "2500",
                   "transaction_type": "income"}),
        ];
        let report = normalize_batch(&records, now());
        assert_eq!(report.accepted_count(), 2);
        assert_eq!(report.skipped_count(), 2);

        let skipped = report.skipped();
        assert_eq!(skipped[0].0, 1);
        assert_eq!(skipped[1], (2, "no usable fields"));

        let accepted = report.accepted();
        assert_eq!(accepted[0].description, "Coffee");
        assert_eq!(accepted[1].kind, TransactionType::Income);
        assert_eq!(accepted[1].amount, 2500.0);
    }
}
