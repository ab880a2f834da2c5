//! penny-ingest: bank-statement ingestion. PDF text extraction, tolerant
//! parsing of the LLM's transaction reply, and normalization of loose
//! records into validated transactions.

pub mod normalize;
pub mod pdf;
pub mod reply;

pub use normalize::{BatchReport, RecordOutcome, normalize_batch, normalize_record};
pub use pdf::extract_pdf_text;
pub use reply::{RawRecord, parse_reply};
