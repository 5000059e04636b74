#![forbid(unsafe_code)]

pub mod api;
pub mod attempts;
pub mod config;
pub mod error;
pub mod results;

pub use api::{HttpQuizApi, QuizApi};
pub use attempts::{AttemptCommand, AttemptOutcome, AttemptRunner, AttemptService};
pub use config::{ApiConfig, AuthContext};
pub use error::{ConfigError, FetchError, SubmitError};
pub use results::{
    HistoryFilter, HistoryStats, HistoryView, PerformanceInsights, ResultService, ResultView,
};
