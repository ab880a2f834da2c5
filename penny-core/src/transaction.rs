//! Transaction record types shared across the pipeline

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of a transaction. The stored amount is always a non-negative
/// magnitude; the semantic sign lives here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Investment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Investment => "investment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            "investment" => Some(TransactionType::Investment),
            _ => None,
        }
    }
}

/// How a transaction entered the system
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TxSource {
    Manual,
    BankStatement,
}

impl TxSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxSource::Manual => "manual",
            TxSource::BankStatement => "bank_statement",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "manual" => Some(TxSource::Manual),
            "bank_statement" => Some(TxSource::BankStatement),
            _ => None,
        }
    }
}

/// A persisted transaction owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDateTime,
    pub description: String,
    /// Non-negative magnitude; direction is carried by `kind`
    pub amount: f64,
    pub category: String,
    #[serde(rename = "transaction_type")]
    pub kind: TransactionType,
    pub source: TxSource,
    pub created_at: NaiveDateTime,
}

/// A validated transaction that has not been persisted yet — the output of
/// the normalizer and of manual entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDateTime,
    pub description: String,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "transaction_type")]
    pub kind: TransactionType,
    pub source: TxSource,
}

impl NewTransaction {
    /// Clamp the amount to its magnitude. Callers that accept user or
    /// model-supplied signed values go through this before persisting.
    pub fn with_abs_amount(mut self) -> Self {
        self.amount = self.amount.abs();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip() {
        for t in [
            TransactionType::Income,
            TransactionType::Expense,
            TransactionType::Investment,
        ] {
            assert_eq!(TransactionType::parse(t.as_str()), Some(t));
        }
        assert_eq!(TransactionType::parse("transfer"), None);
    }

    #[test]
    fn test_type_serde_lowercase() {
        let json = serde_json::to_string(&TransactionType::Income).unwrap();
        assert_eq!(json, "\"income\"");
        let source = serde_json::to_string(&TxSource::BankStatement).unwrap();
        assert_eq!(source, "\"bank_statement\"");
    }

    #[test]
    fn test_abs_amount() {
        let tx = NewTransaction {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            description: "Coffee".to_string(),
            amount: -4.5,
            category: "Food & Dining".to_string(),
            kind: TransactionType::Expense,
            source: TxSource::BankStatement,
        };
        assert_eq!(tx.with_abs_amount().amount, 4.5);
    }
}
