//! Financial context block handed to the chat assistant

use std::fmt::Write;

use crate::summary::{Summary, summarize};
use crate::transaction::Transaction;

/// Aggregate view of a user's finances, rendered into the chat system
/// prompt. Wraps the same totals the summary endpoints report.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialContext {
    pub summary: Summary,
}

impl FinancialContext {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            summary: summarize(transactions),
        }
    }

    /// True when any aggregate is non-zero. Drives the choice between the
    /// context-bearing and the generic chat template.
    pub fn has_activity(&self) -> bool {
        self.summary.total_income > 0.0
            || self.summary.total_expense > 0.0
            || self.summary.total_investment > 0.0
    }

    pub fn render(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        let _ = writeln!(out, "- Total Income: ${:.2}", s.total_income);
        let _ = writeln!(out, "- Total Expenses: ${:.2}", s.total_expense);
        let _ = writeln!(out, "- Total Investments: ${:.2}", s.total_investment);
        let _ = writeln!(out, "- Net Savings: ${:.2}", s.net_savings);

        if !s.expense_by_category.is_empty() {
            let _ = writeln!(out, "\nExpense Breakdown by Category:");
            for (category, amount) in &s.expense_by_category {
                let _ = writeln!(out, "- {category}: ${amount:.2}");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{TransactionType, TxSource};
    use chrono::NaiveDate;

    fn tx(amount: f64, kind: TransactionType, category: &str) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Transaction {
            id: 0,
            user_id: 1,
            date,
            description: "test".to_string(),
            amount,
            category: category.to_string(),
            kind,
            source: TxSource::Manual,
            created_at: date,
        }
    }

    #[test]
    fn test_no_activity_for_empty_set() {
        let ctx = FinancialContext::from_transactions(&[]);
        assert!(!ctx.has_activity());
    }

    #[test]
    fn test_render_includes_totals_and_breakdown() {
        let ctx = FinancialContext::from_transactions(&[
            tx(2500.0, TransactionType::Income, ""),
            tx(42.5, TransactionType::Expense, "Food & Dining"),
        ]);
        assert!(ctx.has_activity());
        let text = ctx.render();
        assert!(text.contains("- Total Income: $2500.00"));
        assert!(text.contains("- Net Savings: $2457.50"));
        assert!(text.contains("- Food & Dining: $42.50"));
    }
}
