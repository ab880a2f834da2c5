//! Chat responder: context block + user message, one completion, reply
//! verbatim. No retries; errors surface to the caller.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use penny_core::FinancialContext;

use crate::client::Client;
use crate::prompts::{chat_system_prompt, generic_chat_prompt};

pub async fn respond(
    client: &Client,
    context: &FinancialContext,
    message: &str,
    today: NaiveDate,
) -> Result<String> {
    let system = if context.has_activity() {
        chat_system_prompt(today, &context.render())
    } else {
        generic_chat_prompt(today)
    };

    client
        .chat(&system, message)
        .await
        .context("generating chat response")
}
