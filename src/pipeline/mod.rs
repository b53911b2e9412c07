//! Request pipeline for spoken-language assessment.
//!
//! This module wires validation, the local comparison, feedback generation
//! and response assembly into a single request/reply step.
//!
//! # Architecture
//!
//! ```text
//! request body (JSON)
//!        │
//!        ▼
//! handle_request()
//!        │
//!        ├─ AssessRequest::from_json / validate      → 400 { ok:false, error }
//!        │
//!        └─ Assessor::assess
//!              ├─ assess::compare                     → Metrics, Diff, FeedbackTier
//!              ├─ FeedbackGenerator::generate         → TutorFeedback | FeedbackError
//!              └─ AssessmentResponse::assemble        → 200 { ok:true, … }
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use speaking_tutor::config::AppConfig;
//! use speaking_tutor::pipeline::{handle_request, Assessor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = AppConfig::default();
//!     config.apply_env_overrides();
//!     let assessor = Assessor::from_config(&config);
//!
//!     let reply = handle_request(
//!         &assessor,
//!         r#"{"targetText":"커피 주세요","transcriptText":"커피 줘요"}"#,
//!     )
//!     .await;
//!     println!("{} {}", reply.status, reply.body);
//! }
//! ```

pub mod request;
pub mod response;
pub mod runner;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use request::{AssessRequest, RequestError};
pub use response::{AssessmentResponse, Reply, TutorErrorView};
pub use runner::{handle_request, AssessError, Assessor};
