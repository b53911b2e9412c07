//! Closed error taxonomy for feedback generation.
//!
//! Every failure of the external model step is classified into exactly one
//! [`FeedbackErrorCode`] and returned to the caller as a [`FeedbackError`].
//! There is no fallback success value.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::llm::parse::ParseFailure;

// ---------------------------------------------------------------------------
// FeedbackErrorCode
// ---------------------------------------------------------------------------

/// Which step of feedback generation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackErrorCode {
    /// The model call exceeded the configured timeout.
    Timeout,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 429.
    RateLimited,
    /// Any other non-2xx HTTP status.
    HttpError(u16),
    /// 2xx response without usable text content.
    EmptyResponse,
    /// Neither the strict parse nor the recovery parse produced feedback.
    ParseError,
    /// No API key configured; no call was attempted.
    NotConfigured,
    /// Transport failure or any other unexpected failure.
    Exception,
}

impl FeedbackErrorCode {
    /// Map a non-success HTTP status to its code.
    ///
    /// ```
    /// use speaking_tutor::llm::FeedbackErrorCode;
    ///
    /// assert_eq!(FeedbackErrorCode::from_status(401), FeedbackErrorCode::Unauthorized);
    /// assert_eq!(FeedbackErrorCode::from_status(503), FeedbackErrorCode::HttpError(503));
    /// ```
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => FeedbackErrorCode::Unauthorized,
            403 => FeedbackErrorCode::Forbidden,
            429 => FeedbackErrorCode::RateLimited,
            other => FeedbackErrorCode::HttpError(other),
        }
    }

    /// Stable wire name used in the `tutorError.code` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackErrorCode::Timeout => "TIMEOUT",
            FeedbackErrorCode::Unauthorized => "UNAUTHORIZED",
            FeedbackErrorCode::Forbidden => "FORBIDDEN",
            FeedbackErrorCode::RateLimited => "RATE_LIMITED",
            FeedbackErrorCode::HttpError(_) => "HTTP_ERROR",
            FeedbackErrorCode::EmptyResponse => "EMPTY_RESPONSE",
            FeedbackErrorCode::ParseError => "PARSE_ERROR",
            FeedbackErrorCode::NotConfigured => "NOT_CONFIGURED",
            FeedbackErrorCode::Exception => "EXCEPTION",
        }
    }

    /// HTTP status carried by [`FeedbackErrorCode::HttpError`].
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FeedbackErrorCode::HttpError(status) => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for FeedbackErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status() {
            Some(status) => write!(f, "{} {}", self.as_str(), status),
            None => f.write_str(self.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// FeedbackError
// ---------------------------------------------------------------------------

/// A failed feedback generation, surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct FeedbackError {
    pub code: FeedbackErrorCode,
    pub message: String,
    /// Bounded excerpt of the offending body, when one exists.
    pub raw_excerpt: Option<String>,
}

impl FeedbackError {
    pub fn new(code: FeedbackErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            raw_excerpt: None,
        }
    }

    /// Attach a bounded excerpt of `raw` (at most `max_chars` characters).
    pub fn with_excerpt(mut self, raw: &str, max_chars: usize) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            self.raw_excerpt = Some(excerpt(trimmed, max_chars));
        }
        self
    }

    pub fn not_configured() -> Self {
        Self::new(
            FeedbackErrorCode::NotConfigured,
            "feedback model API key is not configured",
        )
    }

    pub fn timeout(limit: Duration) -> Self {
        Self::new(
            FeedbackErrorCode::Timeout,
            format!("feedback model did not respond within {} ms", limit.as_millis()),
        )
    }

    /// Non-success HTTP status, with a bounded excerpt of the error body.
    pub fn from_status(status: u16, body: &str, max_chars: usize) -> Self {
        Self::new(
            FeedbackErrorCode::from_status(status),
            format!("feedback model returned HTTP {status}"),
        )
        .with_excerpt(body, max_chars)
    }

    pub fn empty_response() -> Self {
        Self::new(
            FeedbackErrorCode::EmptyResponse,
            "feedback model returned no text content",
        )
    }

    /// Both parse stages failed on `raw`.
    pub fn parse(failure: &ParseFailure, raw: &str, max_chars: usize) -> Self {
        Self::new(FeedbackErrorCode::ParseError, failure.to_string()).with_excerpt(raw, max_chars)
    }

    /// The payload parsed but does not describe any feedback.
    pub fn invalid_payload(reason: impl Into<String>, raw: &str, max_chars: usize) -> Self {
        Self::new(FeedbackErrorCode::ParseError, reason).with_excerpt(raw, max_chars)
    }

    pub fn exception(message: impl Into<String>) -> Self {
        Self::new(FeedbackErrorCode::Exception, message)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First `max_chars` characters of `text`, with `…` appended when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = text[..cut].to_string();
            out.push('…');
            out
        }
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
