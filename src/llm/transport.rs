//! Wire-level access to an OpenAI-compatible chat-completions endpoint.
//!
//! [`ChatTransport`] is the seam between the feedback orchestrator and the
//! network: it performs exactly one request and reports the raw status and
//! body.  Status mapping, parsing and timeouts are the orchestrator's job.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// ChatRequest
// ---------------------------------------------------------------------------

/// One chat-completions request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_mode: bool,
}

impl ChatRequest {
    /// JSON body in the OpenAI chat-completions wire format.
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model":       self.model,
            "messages": [
                { "role": "system", "content": self.system },
                { "role": "user",   "content": self.user   }
            ],
            "stream":      false,
            "temperature": self.temperature,
            "max_tokens":  self.max_tokens
        });
        if self.json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }
        body
    }
}

// ---------------------------------------------------------------------------
// TransportResponse / TransportError
// ---------------------------------------------------------------------------

/// Raw HTTP outcome: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client-level timeout fired.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, or body-read failure.
    #[error("HTTP request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ChatTransport trait
// ---------------------------------------------------------------------------

/// Sends one chat-completions request.
///
/// Implementors must be `Send + Sync` so a generator holding one can be
/// shared across tasks.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<TransportResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// `reqwest`-backed transport posting to `{base_url}/v1/chat/completions`.
///
/// Non-2xx bodies are only ever shown as a bounded excerpt, so at most
/// `error_body_limit` bytes of them are read.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    error_body_limit: usize,
}

impl HttpTransport {
    /// Build a transport from config.
    ///
    /// The client timeout mirrors `config.timeout_secs`.  A default client is
    /// used if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint: chat_endpoint(&config.base_url),
            // A char is at most 4 bytes of UTF-8.
            error_body_limit: config.error_excerpt_chars.saturating_mul(4),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request.to_body())
            .send()
            .await?;

        let status = response.status();
        let body = if status.is_success() {
            response.text().await?
        } else {
            read_prefix(response, self.error_body_limit).await?
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Read at most `limit` bytes of the body and drop the rest.
async fn read_prefix(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<String, TransportError> {
    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit.saturating_sub(buf.len());
        if chunk.len() >= room {
            buf.extend_from_slice(&chunk[..room]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
