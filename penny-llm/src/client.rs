//! Chat-completion client for OpenAI and Azure OpenAI endpoints.
//!
//! Constructed once from configuration by the entrypoint and passed to
//! whatever needs it; there is no process-wide singleton.

use anyhow::{Context, Result, bail};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Azure,
}

#[derive(Debug, Clone)]
pub struct AzureSection {
    pub deployment: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    /// Required when provider is Azure
    pub azure: Option<AzureSection>,
}

pub struct Client {
    http: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl Client {
    pub fn new(config: LlmConfig, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            api_key,
        }
    }

    /// One system-prompt + one user-message completion; returns the reply
    /// text with surrounding whitespace trimmed.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String> {
        match self.config.provider {
            Provider::OpenAI => self.openai_complete(system, user).await,
            Provider::Azure => self.azure_complete(system, user).await,
        }
    }

    async fn openai_complete(&self, system: &str, user: &str) -> Result<String> {
        let body = Req {
            model: Some(self.config.model.clone()),
            messages: messages_for(system, user),
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        read_reply(resp, "openai").await
    }

    async fn azure_complete(&self, system: &str, user: &str) -> Result<String> {
        let azure = self
            .config
            .azure
            .as_ref()
            .context("azure provider selected but [llm.azure] is not configured")?;

        // Azure routes by deployment, so the body carries no model name
        let body = Req {
            model: None,
            messages: messages_for(system, user),
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.base_url.trim_end_matches('/'),
            azure.deployment,
            azure.api_version
        );
        let resp = self
            .http
            .post(url)
            .header("api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .context("azure openai request")?;

        read_reply(resp, "azure openai").await
    }
}

#[derive(Serialize)]
struct Msg {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct Req {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<Msg>,
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

fn messages_for(system: &str, user: &str) -> Vec<Msg> {
    vec![
        Msg {
            role: "system",
            content: system.to_string(),
        },
        Msg {
            role: "user",
            content: user.to_string(),
        },
    ]
}

async fn read_reply(resp: reqwest::Response, provider: &str) -> Result<String> {
    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("{provider} error: {status} {txt}");
    }

    let out: Resp = resp
        .json()
        .await
        .with_context(|| format!("parse {provider} response"))?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = Req {
            model: Some("gpt-4o-mini".to_string()),
            messages: messages_for("be helpful", "hello"),
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_azure_body_omits_model() {
        let body = Req {
            model: None,
            messages: messages_for("s", "u"),
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("model").is_none());
    }
}
