use std::sync::Arc;

use tracing::{error, info, warn};

use quiz_core::model::{QuizId, SubmitReceipt};
use quiz_core::{PendingSubmission, QuizSession, SessionError, SessionPhase, SubmitRequest};

use crate::api::QuizApi;
use crate::config::AuthContext;
use crate::error::{FetchError, SubmitError};

/// Message shown when the quiz cannot be loaded for a reason other than 404.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load quiz";
pub const QUIZ_NOT_FOUND_MESSAGE: &str = "Quiz not found";

/// Connects a `QuizSession` to the backend.
///
/// Network failures never escape: they become state transitions on the
/// session with a displayable message.
#[derive(Clone)]
pub struct AttemptService {
    api: Arc<dyn QuizApi>,
    auth: AuthContext,
}

impl AttemptService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, auth: AuthContext) -> Self {
        Self { api, auth }
    }

    /// Fetch the quiz and return a session that is either active with its
    /// countdown running, or failed.
    pub async fn start(&self, quiz_id: QuizId) -> QuizSession {
        let mut session = QuizSession::new(quiz_id.clone());
        let outcome = match self.api.fetch_quiz(&self.auth, &quiz_id).await {
            Ok(quiz) => {
                info!(
                    quiz_id = %quiz_id,
                    questions = quiz.question_count(),
                    duration_minutes = quiz.duration_minutes(),
                    "quiz loaded"
                );
                session.load_succeeded(quiz)
            }
            Err(err) => {
                error!(quiz_id = %quiz_id, error = %err, "failed to load quiz");
                session.load_failed(load_failure_message(&err))
            }
        };
        if let Err(err) = outcome {
            error!(quiz_id = %quiz_id, error = %err, "session rejected load outcome");
        }
        session
    }

    /// Send a submission without touching any session.
    ///
    /// # Errors
    ///
    /// Returns the backend's `SubmitError` unchanged.
    pub async fn send(&self, pending: &PendingSubmission) -> Result<SubmitReceipt, SubmitError> {
        info!(
            quiz_id = %pending.quiz_id,
            answered = pending.payload.answered(),
            elapsed = pending.payload.time_spent,
            time_limit_exceeded = pending.payload.time_limit_exceeded,
            "submitting attempt"
        );
        self.api
            .submit_attempt(&self.auth, &pending.quiz_id, &pending.payload)
            .await
    }

    /// Apply a submission outcome to the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` if the session has no submission
    /// in flight.
    pub fn apply_outcome(
        session: &mut QuizSession,
        outcome: Result<SubmitReceipt, SubmitError>,
    ) -> Result<(), SessionError> {
        match outcome {
            Ok(receipt) => {
                info!(attempt_id = %receipt.attempt_id, "attempt submitted");
                session.submission_succeeded(receipt)
            }
            Err(err) => {
                warn!(quiz_id = %session.quiz_id(), error = %err, "submission failed");
                session.submission_failed(submit_failure_message(&err))
            }
        }
    }

    /// Send `pending` and apply the outcome, returning the resulting phase.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` if the session has no submission
    /// in flight.
    pub async fn submit(
        &self,
        session: &mut QuizSession,
        pending: PendingSubmission,
    ) -> Result<SessionPhase, SessionError> {
        let outcome = self.send(&pending).await;
        Self::apply_outcome(session, outcome)?;
        Ok(session.phase())
    }

    /// `request_submit`, sending straight away when no confirmation is needed.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the session.
    pub async fn request_submit(
        &self,
        session: &mut QuizSession,
    ) -> Result<SessionPhase, SessionError> {
        match session.request_submit()? {
            SubmitRequest::ConfirmationRequired { unanswered } => {
                info!(quiz_id = %session.quiz_id(), unanswered, "confirmation required");
                Ok(session.phase())
            }
            SubmitRequest::Submitting(pending) => self.submit(session, pending).await,
        }
    }

    /// `confirm_submit` followed by sending.
    ///
    /// # Errors
    ///
    /// Propagates `SessionError` from the session.
    pub async fn confirm_submit(
        &self,
        session: &mut QuizSession,
    ) -> Result<SessionPhase, SessionError> {
        let pending = session.confirm_submit()?;
        self.submit(session, pending).await
    }
}

#[must_use]
pub fn load_failure_message(err: &FetchError) -> String {
    match err {
        FetchError::NotFound => QUIZ_NOT_FOUND_MESSAGE.to_owned(),
        _ => LOAD_FAILED_MESSAGE.to_owned(),
    }
}

#[must_use]
pub fn submit_failure_message(err: &SubmitError) -> String {
    format!("Failed to submit quiz: {err}")
}
