//! penny-llm: hosted-LLM client plus the two uses the backend makes of it,
//! transaction extraction from sanitized statement text and the financial
//! chat responder.

pub mod client;
pub mod extract;
pub mod prompts;
pub mod respond;

pub use client::{AzureSection, Client, LlmConfig, Provider};
pub use extract::{MAX_INPUT_CHARS, extract_transactions};
pub use respond::respond;
