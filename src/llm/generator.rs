//! Core `FeedbackGenerator` trait and the `ApiFeedbackGenerator` orchestrator.
//!
//! `ApiFeedbackGenerator` turns a [`FeedbackRequest`] into [`TutorFeedback`]
//! with exactly one call to an OpenAI-compatible endpoint:
//!
//! ```text
//! no API key ───────────────────────────────▶ NotConfigured (no call)
//! build prompt ─▶ send (bounded by timeout) ─▶ Timeout / Exception
//!               ─▶ non-2xx status ───────────▶ Unauthorized / Forbidden /
//!                                              RateLimited / HttpError(n)
//!               ─▶ blank content ────────────▶ EmptyResponse
//!               ─▶ strict parse, recovery ───▶ ParseError
//!               ─▶ alias normalization ──────▶ TutorFeedback
//! ```
//!
//! There is no retry and no fallback: every failure is returned as a
//! [`FeedbackError`].  Dropping the returned future drops the in-flight HTTP
//! request with it.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::LlmConfig;
use crate::llm::error::{FeedbackError, FeedbackErrorCode};
use crate::llm::feedback::{FeedbackRequest, TutorFeedback};
use crate::llm::parse::{into_feedback, parse_payload, ParseStage};
use crate::llm::prompt::PromptBuilder;
use crate::llm::transport::{ChatRequest, ChatTransport, HttpTransport, TransportError};

// ---------------------------------------------------------------------------
// FeedbackGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for tutor-feedback generation.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn FeedbackGenerator>`).  An implementation must
/// never turn a failure into a success value.
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate(&self, request: &FeedbackRequest) -> Result<TutorFeedback, FeedbackError>;
}

// ---------------------------------------------------------------------------
// ApiFeedbackGenerator
// ---------------------------------------------------------------------------

/// Calls the configured model through a [`ChatTransport`].
///
/// All connection details come from the [`LlmConfig`] passed at
/// construction; the value is owned by whoever handles requests, not a
/// process-wide singleton.
pub struct ApiFeedbackGenerator<T: ChatTransport = HttpTransport> {
    transport: T,
    config: LlmConfig,
    prompt_builder: PromptBuilder,
    timeout: Duration,
}

impl ApiFeedbackGenerator<HttpTransport> {
    /// Build a generator backed by a `reqwest` transport.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::with_transport(config, HttpTransport::from_config(config))
    }
}

impl<T: ChatTransport> ApiFeedbackGenerator<T> {
    /// Build a generator over an arbitrary transport.
    pub fn with_transport(config: &LlmConfig, transport: T) -> Self {
        Self {
            transport,
            config: config.clone(),
            prompt_builder: PromptBuilder::new(&config.feedback_language),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `true` when an API key is present, i.e. a call would be attempted.
    pub fn is_configured(&self) -> bool {
        self.config.credential().is_some()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn try_generate(
        &self,
        request: &FeedbackRequest,
    ) -> Result<TutorFeedback, FeedbackError> {
        let api_key = self
            .config
            .credential()
            .ok_or_else(FeedbackError::not_configured)?;
        let cap = self.config.error_excerpt_chars;

        let (system, user) = self.prompt_builder.build_chat(request);
        log::debug!(
            "feedback: tier={} system={}B user={}B",
            request.tier,
            system.len(),
            user.len()
        );

        let chat = ChatRequest {
            model: self.config.model.clone(),
            system,
            user,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            json_mode: self.config.json_mode,
        };

        let sent = tokio::time::timeout(self.timeout, self.transport.send(api_key, &chat)).await;
        let response = match sent {
            Err(_elapsed) => return Err(FeedbackError::timeout(self.timeout)),
            Ok(Err(TransportError::Timeout)) => return Err(FeedbackError::timeout(self.timeout)),
            Ok(Err(TransportError::Request(msg))) => return Err(FeedbackError::exception(msg)),
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            return Err(FeedbackError::from_status(response.status, &response.body, cap));
        }

        let content = extract_content(&response.body, cap)?;

        let parsed = parse_payload(&content).map_err(|f| FeedbackError::parse(&f, &content, cap))?;
        if parsed.stage == ParseStage::Recovered {
            log::debug!("feedback: payload recovered from non-JSON wrapper");
        }

        into_feedback(&parsed.object, request.tier)
            .map_err(|reason| FeedbackError::invalid_payload(reason, &content, cap))
    }
}

#[async_trait]
impl<T: ChatTransport> FeedbackGenerator for ApiFeedbackGenerator<T> {
    async fn generate(&self, request: &FeedbackRequest) -> Result<TutorFeedback, FeedbackError> {
        let result = self.try_generate(request).await;
        if let Err(e) = &result {
            match e.code {
                FeedbackErrorCode::NotConfigured => log::debug!("feedback skipped: {e}"),
                _ => log::warn!("feedback generation failed: {e}"),
            }
        }
        result
    }
}

/// Pull `choices[0].message.content` out of a chat-completions body.
fn extract_content(body: &str, cap: usize) -> Result<String, FeedbackError> {
    if body.trim().is_empty() {
        return Err(FeedbackError::empty_response());
    }

    let envelope: Value = serde_json::from_str(body).map_err(|e| {
        FeedbackError::new(
            FeedbackErrorCode::ParseError,
            format!("response body is not JSON: {e}"),
        )
        .with_excerpt(body, cap)
    })?;

    let content = envelope["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or_default();

    if content.is_empty() {
        return Err(FeedbackError::empty_response());
    }
    Ok(content.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
