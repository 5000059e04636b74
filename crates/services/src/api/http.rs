use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use quiz_core::model::{
    AttemptId, AttemptResult, AttemptSummary, HistoryPage, QuizDefinition, QuizId,
    SubmissionPayload, SubmitReceipt,
};

use super::QuizApi;
use super::wire::{AttemptsEnvelope, ErrorBody, HistoryEnvelope, QuizEnvelope, ResultEnvelope};
use crate::config::{ApiConfig, AuthContext};
use crate::error::{FetchError, SubmitError};

/// `QuizApi` over the backend's REST endpoints.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    base_url: Url,
}

impl HttpQuizApi {
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
        }
    }

    /// Base url joined with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn history_url(&self, page: u32, limit: u32) -> Url {
        let mut url = self.endpoint(&["api", "quiz-attempts", "history"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }

    fn authorized(request: RequestBuilder, auth: &AuthContext) -> RequestBuilder {
        match auth.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn error_message(response: Response) -> Option<String> {
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
    }

    fn fetch_status_error(status: StatusCode) -> FetchError {
        match status {
            StatusCode::NOT_FOUND => FetchError::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::Auth,
            other => FetchError::Network(format!("unexpected status {other}")),
        }
    }

    /// `message` is the backend's error body, if it sent one.
    fn submit_status_error(status: StatusCode, message: Option<String>) -> SubmitError {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                SubmitError::Validation(message.unwrap_or_else(|| status.to_string()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SubmitError::Auth,
            other => SubmitError::Network(format!("unexpected status {other}")),
        }
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn fetch_quiz(
        &self,
        auth: &AuthContext,
        quiz_id: &QuizId,
    ) -> Result<QuizDefinition, FetchError> {
        let url = self.endpoint(&["api", "quiz", quiz_id.as_str()]);
        let response = Self::authorized(self.client.get(url), auth).send().await?;

        if !response.status().is_success() {
            return Err(Self::fetch_status_error(response.status()));
        }

        let body: QuizEnvelope = response.json().await?;
        match (body.success, body.quiz) {
            (true, Some(quiz)) => Ok(quiz.into_domain()?),
            _ => Err(FetchError::NotFound),
        }
    }

    async fn submit_attempt(
        &self,
        auth: &AuthContext,
        quiz_id: &QuizId,
        payload: &SubmissionPayload,
    ) -> Result<SubmitReceipt, SubmitError> {
        let url = self.endpoint(&["api", "quiz-attempts", quiz_id.as_str(), "submit"]);
        let response = Self::authorized(self.client.post(url), auth)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(Self::submit_status_error(status, message));
        }

        let body: ResultEnvelope = response.json().await?;
        match (body.success, body.result) {
            (true, Some(result)) => Ok(result.into_receipt(quiz_id)),
            _ => Err(SubmitError::Rejected(
                body.message
                    .unwrap_or_else(|| "Failed to submit quiz".to_owned()),
            )),
        }
    }

    async fn fetch_result(
        &self,
        auth: &AuthContext,
        attempt_id: &AttemptId,
    ) -> Result<AttemptResult, FetchError> {
        let url = self.endpoint(&["api", "quiz-attempts", "result", attempt_id.as_str()]);
        let response = Self::authorized(self.client.get(url), auth).send().await?;

        if !response.status().is_success() {
            return Err(Self::fetch_status_error(response.status()));
        }

        let body: ResultEnvelope = response.json().await?;
        match (body.success, body.result) {
            (true, Some(result)) => Ok(result.into_domain(None)),
            _ => Err(FetchError::NotFound),
        }
    }

    async fn fetch_attempts(
        &self,
        auth: &AuthContext,
        quiz_id: &QuizId,
    ) -> Result<Vec<AttemptSummary>, FetchError> {
        let url = self.endpoint(&["api", "quiz-attempts", quiz_id.as_str(), "attempts"]);
        let response = Self::authorized(self.client.get(url), auth).send().await?;

        if !response.status().is_success() {
            return Err(Self::fetch_status_error(response.status()));
        }

        let body: AttemptsEnvelope = response.json().await?;
        if !body.success {
            return Err(FetchError::NotFound);
        }
        Ok(body.attempts.into_iter().map(Into::into).collect())
    }

    async fn fetch_history(
        &self,
        auth: &AuthContext,
        page: u32,
        limit: u32,
    ) -> Result<HistoryPage, FetchError> {
        let url = self.history_url(page, limit);
        let response = Self::authorized(self.client.get(url), auth).send().await?;

        if !response.status().is_success() {
            return Err(Self::fetch_status_error(response.status()));
        }

        let body: HistoryEnvelope = response.json().await?;
        if !body.success {
            return Err(FetchError::Network(
                body.message.unwrap_or_else(|| "Unknown error".to_owned()),
            ));
        }
        Ok(body.into_page(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path_and_encode_ids() {
        let config = ApiConfig::new("http://localhost:5000/backend").unwrap();
        let api = HttpQuizApi::new(&config);

        let url = api.endpoint(&["api", "quiz-attempts", "a b/c", "submit"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/backend/api/quiz-attempts/a%20b%2Fc/submit"
        );
    }

    #[test]
    fn status_codes_map_to_fetch_errors() {
        assert_eq!(
            HttpQuizApi::fetch_status_error(StatusCode::NOT_FOUND),
            FetchError::NotFound
        );
        assert_eq!(
            HttpQuizApi::fetch_status_error(StatusCode::FORBIDDEN),
            FetchError::Auth
        );
        assert!(matches!(
            HttpQuizApi::fetch_status_error(StatusCode::BAD_GATEWAY),
            FetchError::Network(_)
        ));
    }

    #[test]
    fn submit_validation_uses_body_message_or_status() {
        assert_eq!(
            HttpQuizApi::submit_status_error(
                StatusCode::BAD_REQUEST,
                Some("userAnswers is required".into())
            ),
            SubmitError::Validation("userAnswers is required".into())
        );
        assert_eq!(
            HttpQuizApi::submit_status_error(StatusCode::UNPROCESSABLE_ENTITY, None),
            SubmitError::Validation("422 Unprocessable Entity".into())
        );
    }

    #[test]
    fn submit_auth_and_other_statuses() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert_eq!(
                HttpQuizApi::submit_status_error(status, Some("expired".into())),
                SubmitError::Auth
            );
        }
        assert_eq!(
            HttpQuizApi::submit_status_error(StatusCode::INTERNAL_SERVER_ERROR, None),
            SubmitError::Network("unexpected status 500 Internal Server Error".into())
        );
    }

    #[test]
    fn history_endpoint_carries_paging_query() {
        let config = ApiConfig::new("http://localhost:5000").unwrap();
        let api = HttpQuizApi::new(&config);
        assert_eq!(
            api.history_url(2, 10).as_str(),
            "http://localhost:5000/api/quiz-attempts/history?page=2&limit=10"
        );
    }
}
