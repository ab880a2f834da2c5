//! Aggregate totals over a user's transactions.
//!
//! Callers filter by user and period first; these functions only sum what
//! they are handed.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, TransactionType};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Period totals plus an expense breakdown by category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    pub total_investment: f64,
    /// Always `total_income - total_expense - total_investment`
    pub net_savings: f64,
    pub expense_by_category: BTreeMap<String, f64>,
}

/// Per-month totals inside a yearly summary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MonthTotals {
    pub income: f64,
    pub expense: f64,
    pub investment: f64,
}

/// A year bucketed by calendar month. `monthly` always carries all twelve
/// keys, zero-filled for months without transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearlySummary {
    pub monthly: BTreeMap<u32, MonthTotals>,
    pub totals: Summary,
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();

    for t in transactions {
        match t.kind {
            TransactionType::Income => summary.total_income += t.amount,
            TransactionType::Investment => summary.total_investment += t.amount,
            TransactionType::Expense => {
                summary.total_expense += t.amount;
                let category = if t.category.trim().is_empty() {
                    UNCATEGORIZED.to_string()
                } else {
                    t.category.clone()
                };
                *summary.expense_by_category.entry(category).or_insert(0.0) += t.amount;
            }
        }
    }

    summary.net_savings =
        summary.total_income - summary.total_expense - summary.total_investment;
    summary
}

pub fn yearly_summary(transactions: &[Transaction]) -> YearlySummary {
    let mut monthly: BTreeMap<u32, MonthTotals> =
        (1..=12).map(|m| (m, MonthTotals::default())).collect();

    for t in transactions {
        let month = t.date.month();
        let entry = monthly.entry(month).or_default();
        match t.kind {
            TransactionType::Income => entry.income += t.amount,
            TransactionType::Expense => entry.expense += t.amount,
            TransactionType::Investment => entry.investment += t.amount,
        }
    }

    YearlySummary {
        monthly,
        totals: summarize(transactions),
    }
}
