//! penny-core: domain types, summary calculator, and chat context builder

pub mod context;
pub mod summary;
pub mod transaction;

pub use context::FinancialContext;
pub use summary::{MonthTotals, Summary, YearlySummary, summarize, yearly_summary};
pub use transaction::{NewTransaction, Transaction, TransactionType, TxSource};
