//! Completion Client — the single point of entry for all remote model calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Groq API directly.
//! All completions MUST go through a `CompletionClient`.
//!
//! Two transports implement the same contract: `ChatSdkClient` (typed wire
//! structs) and `RawHttpClient` (untyped JSON bodies). The raw variant exists
//! because typed SDK-style clients have shown connection instability against
//! this endpoint; both must stay behaviorally interchangeable and are covered
//! by one shared contract test suite below.
//!
//! Model: llama-3.3-70b-versatile (hardcoded — do not make configurable to
//! prevent drift)

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// The model used for all completions.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything that can go wrong between us and the remote model.
/// Surfaced once to the caller and discarded; never persisted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportFailure {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("completion returned no content")]
    EmptyContent,

    #[error("unexpected transport error: {0}")]
    Unexpected(String),
}

impl TransportFailure {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportFailure::Timeout
        } else if e.is_connect() {
            TransportFailure::Connection(e.to_string())
        } else {
            TransportFailure::Unexpected(e.to_string())
        }
    }
}

/// Decoding parameters for one completion.
#[derive(Debug, Clone, Copy)]
pub struct DecodingConfig {
    pub temperature: f32,
    /// Forces `response_format: {"type": "json_object"}` on the request.
    pub json_mode: bool,
}

impl DecodingConfig {
    /// Judgment path: near-deterministic, forced JSON output.
    pub fn judgment() -> Self {
        Self {
            temperature: 0.1,
            json_mode: true,
        }
    }

    /// Rewrite path: generative, free-text output.
    pub fn rewrite() -> Self {
        Self {
            temperature: 0.7,
            json_mode: false,
        }
    }
}

/// One request/response cycle against the remote model.
///
/// The credential is carried per call — it lives only in session memory and
/// must never be logged.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        decoding: DecodingConfig,
        api_key: &str,
    ) -> Result<String, TransportFailure>;
}

/// Which `CompletionClient` implementation to run. Selected at startup via
/// the `LLM_TRANSPORT` env var.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Sdk,
    Http,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sdk" => Ok(Transport::Sdk),
            "http" => Ok(Transport::Http),
            other => Err(format!(
                "unknown transport '{other}' (expected 'sdk' or 'http')"
            )),
        }
    }
}

/// Constructs the configured transport behind the shared trait object.
pub fn build_client(transport: Transport, timeout: Duration) -> Arc<dyn CompletionClient> {
    match transport {
        Transport::Sdk => Arc::new(ChatSdkClient::new(timeout)),
        Transport::Http => Arc::new(RawHttpClient::new(timeout)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (SDK-style transport)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// ChatSdkClient — typed request/response structs
// ────────────────────────────────────────────────────────────────────────────

pub struct ChatSdkClient {
    client: Client,
    endpoint: String,
}

impl ChatSdkClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: GROQ_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(endpoint: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }
}

#[async_trait]
impl CompletionClient for ChatSdkClient {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        decoding: DecodingConfig,
        api_key: &str,
    ) -> Result<String, TransportFailure> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: decoding.temperature,
            response_format: decoding.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(TransportFailure::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            TransportFailure::Unexpected(format!("malformed completion payload: {e}"))
        })?;

        debug!("completion succeeded (sdk transport)");

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(TransportFailure::EmptyContent)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RawHttpClient — untyped JSON bodies, content dug out by hand
// ────────────────────────────────────────────────────────────────────────────

pub struct RawHttpClient {
    client: Client,
    endpoint: String,
}

impl RawHttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: GROQ_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(endpoint: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }
}

#[async_trait]
impl CompletionClient for RawHttpClient {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        decoding: DecodingConfig,
        api_key: &str,
    ) -> Result<String, TransportFailure> {
        let mut body = json!({
            "model": MODEL,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ],
            "temperature": decoding.temperature,
        });
        if decoding.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(TransportFailure::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await.map_err(|e| {
            TransportFailure::Unexpected(format!("malformed completion payload: {e}"))
        })?;

        debug!("completion succeeded (http transport)");

        payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(TransportFailure::EmptyContent)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared contract tests — every assertion runs against BOTH transports
// ────────────────────────────────────────────────────────────────────────────
