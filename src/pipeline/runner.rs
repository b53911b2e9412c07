//! Assessment runner — drives compare → feedback → response for one request.
//!
//! # Flow
//!
//! ```text
//! handle_request(body)
//!   └─▶ AssessRequest::from_json + validate      ── 400 on RequestError
//!   └─▶ Assessor::assess
//!         ├─ compare (inline, or spawn_blocking for large tables)
//!         ├─ FeedbackGenerator::generate          (spawned, abort-on-drop)
//!         └─ AssessmentResponse::assemble          ── 200 (tutor or tutorError)
//!   └─▶ AssessError                               ── 500
//! ```
//!
//! The runner holds no mutable state, so one [`Assessor`] can serve any
//! number of concurrent requests.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::assess::{compare, estimated_cells, Comparison};
use crate::config::{AppConfig, AssessmentConfig};
use crate::llm::{
    ApiFeedbackGenerator, FeedbackError, FeedbackGenerator, FeedbackRequest, TutorFeedback,
};

use super::request::AssessRequest;
use super::response::{AssessmentResponse, Reply};

// ---------------------------------------------------------------------------
// AssessError
// ---------------------------------------------------------------------------

/// Processing failures after a request passed validation.
#[derive(Debug, Error)]
pub enum AssessError {
    /// The blocking comparison task panicked or was cancelled.
    #[error("comparison task failed: {0}")]
    Comparison(String),

    #[error("failed to serialise response: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// AbortOnDrop
// ---------------------------------------------------------------------------

/// Aborts the wrapped task when dropped, so a cancelled request does not
/// leave its model call running.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

// ---------------------------------------------------------------------------
// Assessor
// ---------------------------------------------------------------------------

/// Runs assessments against a shared feedback generator.
///
/// ```rust,no_run
/// use speaking_tutor::config::AppConfig;
/// use speaking_tutor::pipeline::Assessor;
///
/// # async fn example() {
/// let assessor = Assessor::from_config(&AppConfig::default());
/// let response = assessor.assess("케이크", "캐이크").await.unwrap();
/// println!("{}% {:?}", response.score, response.tutor_error);
/// # }
/// ```
pub struct Assessor {
    generator: Arc<dyn FeedbackGenerator>,
    config: AssessmentConfig,
}

impl Assessor {
    /// Create an assessor.
    ///
    /// # Arguments
    ///
    /// * `generator` — feedback backend (e.g. `ApiFeedbackGenerator`).
    /// * `config`    — input limits and the blocking-offload threshold.
    pub fn new(generator: Arc<dyn FeedbackGenerator>, config: AssessmentConfig) -> Self {
        Self { generator, config }
    }

    /// Build an assessor backed by the HTTP feedback generator.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(ApiFeedbackGenerator::from_config(&config.llm)),
            config.assessment.clone(),
        )
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    /// Assess one target/transcript pair.
    ///
    /// A feedback failure is part of the response (`tutorError`), not an
    /// `Err`.  Dropping the returned future aborts the in-flight model call.
    pub async fn assess(
        &self,
        target: &str,
        transcript: &str,
    ) -> Result<AssessmentResponse, AssessError> {
        let comparison = self.compare(target, transcript).await?;

        let request = FeedbackRequest::new(
            target.trim(),
            transcript.trim(),
            comparison.diff.wrong_units.clone(),
            comparison.metrics.accuracy_percent,
        );
        let feedback = self.feedback(request).await;

        let response = AssessmentResponse::assemble(&comparison, feedback);
        log::info!(
            "assessment: accuracy={}% tier={} wrong_units={} tutor={}",
            response.score,
            response.tier,
            response.diff.wrong_units.len(),
            response
                .tutor_error
                .as_ref()
                .map_or("ok", |e| e.code)
        );
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    async fn compare(&self, target: &str, transcript: &str) -> Result<Comparison, AssessError> {
        let cells = estimated_cells(target, transcript);
        if cells <= self.config.blocking_threshold_cells {
            return Ok(compare(target, transcript));
        }

        log::debug!("runner: {cells} DP cells, comparing on blocking pool");
        let target = target.to_owned();
        let transcript = transcript.to_owned();
        tokio::task::spawn_blocking(move || compare(&target, &transcript))
            .await
            .map_err(|e| AssessError::Comparison(e.to_string()))
    }

    /// Run the generator on its own task so a panic surfaces as
    /// `Exception` instead of tearing down the request.
    async fn feedback(&self, request: FeedbackRequest) -> Result<TutorFeedback, FeedbackError> {
        let generator = Arc::clone(&self.generator);
        let mut task = AbortOnDrop(tokio::spawn(async move {
            generator.generate(&request).await
        }));

        match (&mut task.0).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => {
                log::error!("runner: feedback task panicked");
                Err(FeedbackError::exception("feedback generation panicked"))
            }
            Err(e) => Err(FeedbackError::exception(format!("feedback task failed: {e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request boundary
// ---------------------------------------------------------------------------

/// Validate a raw request body, assess it, and build the reply.
///
/// * 400 — the body failed validation; nothing was compared.
/// * 500 — processing failed after validation.
/// * 200 — otherwise, including when feedback generation failed.
pub async fn handle_request(assessor: &Assessor, body: &str) -> Reply {
    let request = match AssessRequest::from_json(body)
        .and_then(|r| r.validate(assessor.config().max_input_chars).map(|()| r))
    {
        Ok(request) => request,
        Err(e) => {
            log::debug!("runner: rejected request: {e}");
            return Reply::bad_request(&e);
        }
    };

    let reply = assessor
        .assess(&request.target_text, &request.transcript_text)
        .await
        .and_then(|response| Reply::ok(&response).map_err(AssessError::from));

    match reply {
        Ok(reply) => reply,
        Err(e) => {
            log::error!("runner: {e}");
            Reply::server_error(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
