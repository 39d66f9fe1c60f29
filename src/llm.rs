// src/llm.rs
//! Chat-completion client for the Groq OpenAI-compatible endpoint.
//!
//! The one hard rule here: a bad upstream reply never crashes the session.
//! Transport failures and malformed response bodies come back as visible
//! diagnostic text the surface can show to the user.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl CompletionClient {
    pub fn new(cfg: &LlmConfig, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .expect("reqwest client");
        Self {
            http,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key,
        }
    }

    /// False when no API key was found at startup; callers check this before
    /// offering evaluation or chat.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// One completion round-trip. The returned string is either the model's
    /// reply or a diagnostic the caller can surface verbatim.
    pub async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> String {
        let Some(key) = self.api_key.as_deref() else {
            return "GROQ_API_KEY not set.".to_string();
        };

        let req = CompletionRequest {
            model: &self.model,
            messages,
            temperature,
        };

        let resp = match self
            .http
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return format!("Completion API call failed: {e}"),
        };

        let body: serde_json::Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => return format!("Completion API call failed: {e}"),
        };

        debug!(model = %self.model, "completion response received");
        extract_completion(&body)
    }
}

/// Pull `choices[0].message.content` out of a completion response. A body
/// without it is a recoverable, user-visible condition: the raw response is
/// echoed back for debugging instead of raising.
pub fn extract_completion(body: &serde_json::Value) -> String {
    match body
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
    {
        Some(content) => content.to_string(),
        None => format!(
            "Completion service did not return a valid completion.\n\nResponse:\n{body}"
        ),
    }
}
