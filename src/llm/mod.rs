//! Tutor feedback from an external language model.
//!
//! This module provides:
//! * [`FeedbackGenerator`] — async trait implemented by all feedback backends.
//! * [`ApiFeedbackGenerator`] — OpenAI-compatible REST API backend.
//! * [`ChatTransport`] / [`HttpTransport`] — one HTTP round trip, nothing more.
//! * [`PromptBuilder`] — builds tier-constrained feedback prompts.
//! * [`parse`] — strict + recovery payload parsing and alias normalization.
//! * [`FeedbackError`] / [`FeedbackErrorCode`] — the closed failure taxonomy.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use speaking_tutor::config::AppConfig;
//! use speaking_tutor::llm::{ApiFeedbackGenerator, FeedbackGenerator, FeedbackRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = AppConfig::default();
//!     config.apply_env_overrides();
//!
//!     let generator = ApiFeedbackGenerator::from_config(&config.llm);
//!     let request = FeedbackRequest::new("케이크", "캐이크", vec!["케".into()], 67);
//!
//!     match generator.generate(&request).await {
//!         Ok(feedback) => println!("{}", feedback.comment),
//!         Err(e) => eprintln!("no feedback: {e}"),
//!     }
//! }
//! ```

pub mod error;
pub mod feedback;
pub mod generator;
pub mod parse;
pub mod prompt;
pub mod transport;

#[cfg(test)]
mod testing;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use error::{excerpt, FeedbackError, FeedbackErrorCode};
pub use feedback::{Correction, FeedbackRequest, TutorFeedback};
pub use generator::{ApiFeedbackGenerator, FeedbackGenerator};
pub use prompt::PromptBuilder;
pub use transport::{ChatRequest, ChatTransport, HttpTransport, TransportError, TransportResponse};
