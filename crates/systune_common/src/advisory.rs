//! Advisory backend client.
//!
//! Talks to an OpenAI-compatible chat completions endpoint. The
//! backend is a black box: one round trip, no retry, no offline
//! fallback. Any transport or payload problem surfaces as
//! [`SystuneError::AdvisoryUnavailable`] and ends the run before any
//! remediation is offered.

use crate::context::AdvisoryContext;
use crate::error::SystuneError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Advisory backend settings.
///
/// Resolved by the caller (config file plus environment) and injected
/// here; the client never reads ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// Base URL of the chat completions API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bearer token for the backend.
    #[serde(default)]
    pub api_key: String,

    /// Model identifier sent with each request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion token limit for the suggestion text.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for the advisory backend.
pub struct AdvisoryClient {
    client: reqwest::Client,
    config: AdvisoryConfig,
}

impl AdvisoryClient {
    pub fn new(config: AdvisoryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Request tuning suggestions for the bounded context.
    ///
    /// Returns the free-text suggestion body. The text is shown to the
    /// operator as-is; nothing in it is parsed or executed.
    pub async fn request_suggestions(
        &self,
        context: &AdvisoryContext,
        system_model: &str,
        apple_hint: bool,
    ) -> Result<String, SystuneError> {
        let prompt = build_prompt(context, system_model, apple_hint);
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                SystuneError::AdvisoryUnavailable(format!(
                    "cannot reach advisory backend: {}",
                    e
                ))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SystuneError::AdvisoryUnavailable(format!(
                "advisory backend returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            SystuneError::AdvisoryUnavailable(format!(
                "malformed advisory response: {}",
                e
            ))
        })?;

        let suggestion = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if suggestion.trim().is_empty() {
            return Err(SystuneError::AdvisoryUnavailable(
                "advisory response carried no suggestion text".to_string(),
            ));
        }

        Ok(suggestion)
    }
}

/// Assemble the advisory prompt.
///
/// Size is bounded because the context already is; the framing text
/// adds a small constant.
fn build_prompt(context: &AdvisoryContext, system_model: &str, apple_hint: bool) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are a Linux performance tuning assistant. Given the following \
         system details and logs, suggest optimizations:\n\n",
    );

    if !system_model.is_empty() {
        prompt.push_str(&format!("System model: {}\n\n", system_model));
    }

    if apple_hint {
        prompt.push_str(
            "This machine looks like Apple hardware running Linux. Pay \
             particular attention to Broadcom wireless firmware, swap \
             configuration, and fan control.\n\n",
        );
    }

    prompt.push_str("System Info:\n");
    prompt.push_str(&context.rendered);
    prompt.push_str("\n\nSystem Logs:\n");
    prompt.push_str(&context.log_excerpt);
    prompt.push_str(
        "\n\nReturn concise, actionable suggestions. If anything looks \
         critical or unstable, flag it clearly.",
    );

    prompt
}
