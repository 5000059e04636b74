//! Boundary to the quiz backend.

mod http;
mod wire;

use async_trait::async_trait;

use quiz_core::model::{
    AttemptId, AttemptResult, AttemptSummary, HistoryPage, QuizDefinition, QuizId,
    SubmissionPayload, SubmitReceipt,
};

use crate::config::AuthContext;
use crate::error::{FetchError, SubmitError};

pub use http::HttpQuizApi;

/// Backend operations used while taking a quiz and reviewing results.
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn fetch_quiz(
        &self,
        auth: &AuthContext,
        quiz_id: &QuizId,
    ) -> Result<QuizDefinition, FetchError>;

    async fn submit_attempt(
        &self,
        auth: &AuthContext,
        quiz_id: &QuizId,
        payload: &SubmissionPayload,
    ) -> Result<SubmitReceipt, SubmitError>;

    async fn fetch_result(
        &self,
        auth: &AuthContext,
        attempt_id: &AttemptId,
    ) -> Result<AttemptResult, FetchError>;

    /// Attempts for one quiz, newest first.
    async fn fetch_attempts(
        &self,
        auth: &AuthContext,
        quiz_id: &QuizId,
    ) -> Result<Vec<AttemptSummary>, FetchError>;

    /// The user's attempts across all quizzes, newest first. `page` is 1-based.
    async fn fetch_history(
        &self,
        auth: &AuthContext,
        page: u32,
        limit: u32,
    ) -> Result<HistoryPage, FetchError>;
}
