//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuizError;

/// Errors emitted while fetching quizzes and results.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FetchError {
    #[error("not found")]
    NotFound,
    #[error("not authorized")]
    Auth,
    #[error("network error: {0}")]
    Network(String),
    #[error(transparent)]
    InvalidQuiz(#[from] QuizError),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Errors emitted by the submission endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Validation(String),
    #[error("not authorized")]
    Auth,
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Rejected(String),
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Errors emitted while reading API configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API url {raw:?}: {source}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API url {raw:?} cannot be used as a base")]
    NotABase { raw: String },
}
