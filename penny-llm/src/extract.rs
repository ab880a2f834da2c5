//! Transaction extraction: sanitized statement text in, loose records out.

use serde_json::Value;

use crate::client::Client;
use crate::prompts::EXTRACTION_PROMPT;

/// Model input budget. Sanitized statement text beyond this is dropped.
pub const MAX_INPUT_CHARS: usize = 12_000;

/// Truncate on a character boundary at `max` chars
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Ask the model for the transactions in `sanitized_text`. Transport and
/// parse failures are logged and yield an empty list; this call never
/// fails the upload by itself.
pub async fn extract_transactions(client: &Client, sanitized_text: &str) -> Vec<Value> {
    let input = truncate_chars(sanitized_text, MAX_INPUT_CHARS);

    let reply = match client.chat(EXTRACTION_PROMPT, input).await {
        Ok(r) => r,
        Err(err) => {
            log::warn!("transaction extraction call failed: {err:#}");
            return Vec::new();
        }
    };

    penny_ingest::parse_reply(&reply)
}
