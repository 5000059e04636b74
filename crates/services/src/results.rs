//! Result and history views: score bands, performance text, insights and
//! dashboard stats.

use std::sync::Arc;

use tracing::warn;

use quiz_core::model::{
    AttemptId, AttemptResult, AttemptSummary, HistoryEntry, HistoryPage, Pagination, Tone,
};
use quiz_core::time::format_duration;

use crate::api::QuizApi;
use crate::config::AuthContext;
use crate::error::FetchError;

#[must_use]
pub fn performance_text(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "Excellent! 🏆"
    } else if percentage >= 80.0 {
        "Great job! 🌟"
    } else if percentage >= 70.0 {
        "Good work! 👍"
    } else if percentage >= 60.0 {
        "Not bad! 📚"
    } else {
        "Keep practicing! 💪"
    }
}

/// Formats a percentage without trailing zeros, e.g. `80`, `66.67`.
#[must_use]
pub fn format_percentage(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_owned()
}

#[must_use]
pub fn share_text(result: &AttemptResult) -> String {
    format!(
        "I just scored {}% on \"{}\" quiz! 🎉",
        format_percentage(result.percentage),
        result.quiz.title
    )
}

/// Comparison of the current attempt against earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceInsights {
    pub best_score: f64,
    pub total_attempts: usize,
    /// Current score minus the previous attempt's score.
    pub improvement: f64,
}

impl PerformanceInsights {
    /// `attempts` are newest first, so `attempts[1]` is the previous one.
    /// Returns `None` for a first attempt.
    #[must_use]
    pub fn from_attempts(current: &AttemptResult, attempts: &[AttemptSummary]) -> Option<Self> {
        let previous = attempts.get(1)?;
        let best_score = attempts
            .iter()
            .map(|a| a.percentage)
            .fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            best_score,
            total_attempts: attempts.len(),
            improvement: current.percentage - previous.percentage,
        })
    }

    /// Signed label, e.g. `+15%` or `-5%`.
    #[must_use]
    pub fn improvement_label(&self) -> String {
        let sign = if self.improvement > 0.0 { "+" } else { "" };
        format!("{sign}{}%", format_percentage(self.improvement))
    }
}

/// One row of the attempt history table.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRowView {
    pub attempt_number: u32,
    pub percentage_label: String,
    pub tone: Tone,
    pub time_spent_label: String,
    pub completed_on: Option<String>,
}

impl From<&AttemptSummary> for AttemptRowView {
    fn from(attempt: &AttemptSummary) -> Self {
        Self {
            attempt_number: attempt.attempt_number,
            percentage_label: format!("{}%", format_percentage(attempt.percentage)),
            tone: Tone::for_score(attempt.percentage),
            time_spent_label: format_duration(attempt.time_spent_secs),
            completed_on: attempt
                .completed_at
                .map(|at| at.date_naive().format("%Y-%m-%d").to_string()),
        }
    }
}

/// Everything the result screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub result: AttemptResult,
    pub tone: Tone,
    pub performance: &'static str,
    pub time_spent_label: String,
    pub insights: Option<PerformanceInsights>,
    pub history: Vec<AttemptRowView>,
}

impl ResultView {
    #[must_use]
    pub fn new(result: AttemptResult, attempts: &[AttemptSummary]) -> Self {
        Self {
            tone: Tone::for_score(result.percentage),
            performance: performance_text(result.percentage),
            time_spent_label: format_duration(result.time_spent_secs),
            insights: PerformanceInsights::from_attempts(&result, attempts),
            history: attempts.iter().map(AttemptRowView::from).collect(),
            result,
        }
    }
}

/// Attempts per history page.
pub const HISTORY_PAGE_SIZE: u32 = 10;

/// Scores at or above this count as high scores in the history filter.
pub const HIGH_SCORE_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    HighScores,
}

impl HistoryFilter {
    #[must_use]
    pub fn keeps(self, entry: &HistoryEntry) -> bool {
        match self {
            Self::All => true,
            Self::HighScores => entry.percentage >= HIGH_SCORE_THRESHOLD,
        }
    }
}

/// Dashboard totals over the attempts on one history page.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub total_quizzes: usize,
    /// Mean percentage, rounded to a whole number.
    pub average_score: f64,
    pub high_score: f64,
    pub total_time_secs: u64,
}

impl HistoryStats {
    /// `None` for an empty page.
    #[must_use]
    pub fn from_entries(entries: &[HistoryEntry]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let sum: f64 = entries.iter().map(|e| e.percentage).sum();
        Some(Self {
            total_quizzes: entries.len(),
            average_score: (sum / entries.len() as f64).round(),
            high_score: entries
                .iter()
                .map(|e| e.percentage)
                .fold(f64::NEG_INFINITY, f64::max),
            total_time_secs: entries.iter().map(|e| u64::from(e.time_spent_secs)).sum(),
        })
    }

    #[must_use]
    pub fn average_tone(&self) -> Tone {
        Tone::for_score(self.average_score)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRowView {
    pub attempt_id: AttemptId,
    pub title: String,
    pub category: String,
    pub attempt_number: u32,
    pub percentage_label: String,
    pub tone: Tone,
    pub time_spent_label: String,
    pub completed_on: Option<String>,
}

impl From<&HistoryEntry> for HistoryRowView {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            attempt_id: entry.attempt_id.clone(),
            title: entry.quiz.title.clone(),
            category: entry.quiz.category.clone(),
            attempt_number: entry.attempt_number,
            percentage_label: format!("{}%", format_percentage(entry.percentage)),
            tone: Tone::for_score(entry.percentage),
            time_spent_label: format_duration(entry.time_spent_secs),
            completed_on: entry
                .completed_at
                .map(|at| at.date_naive().format("%Y-%m-%d").to_string()),
        }
    }
}

/// One page of the user's quiz history.
///
/// Stats cover the whole page; the filter only narrows `rows`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub stats: Option<HistoryStats>,
    pub rows: Vec<HistoryRowView>,
    pub pagination: Pagination,
    pub filter: HistoryFilter,
}

impl HistoryView {
    #[must_use]
    pub fn new(page: &HistoryPage, filter: HistoryFilter) -> Self {
        Self {
            stats: HistoryStats::from_entries(&page.entries),
            rows: page
                .entries
                .iter()
                .filter(|e| filter.keeps(e))
                .map(HistoryRowView::from)
                .collect(),
            pagination: page.pagination,
            filter,
        }
    }

    /// 1-based range of attempts shown, e.g. `(11, 20)` of page 2.
    #[must_use]
    pub fn showing(&self) -> (u32, u32) {
        let page = self.pagination.current_page.max(1);
        let first = (page - 1) * HISTORY_PAGE_SIZE + 1;
        let last = (page * HISTORY_PAGE_SIZE).min(self.pagination.total_attempts);
        (first.min(last), last)
    }
}

/// Loads results and attempt history.
#[derive(Clone)]
pub struct ResultService {
    api: Arc<dyn QuizApi>,
    auth: AuthContext,
}

impl ResultService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, auth: AuthContext) -> Self {
        Self { api, auth }
    }

    /// Build the view for a result the caller already has (e.g. just
    /// submitted). History is best effort.
    pub async fn view_for(&self, result: AttemptResult) -> ResultView {
        let attempts = self.history(&result).await;
        ResultView::new(result, &attempts)
    }

    /// Fetch a stored result and build its view.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the result itself cannot be fetched; a failed
    /// history fetch only drops the insights.
    pub async fn load(&self, attempt_id: &AttemptId) -> Result<ResultView, FetchError> {
        let result = self.api.fetch_result(&self.auth, attempt_id).await?;
        Ok(self.view_for(result).await)
    }

    /// Fetch one page of the user's history across all quizzes.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the page cannot be fetched.
    pub async fn load_history(
        &self,
        page: u32,
        filter: HistoryFilter,
    ) -> Result<HistoryView, FetchError> {
        let page = self
            .api
            .fetch_history(&self.auth, page.max(1), HISTORY_PAGE_SIZE)
            .await?;
        Ok(HistoryView::new(&page, filter))
    }

    async fn history(&self, result: &AttemptResult) -> Vec<AttemptSummary> {
        match self.api.fetch_attempts(&self.auth, &result.quiz.id).await {
            Ok(attempts) => attempts,
            Err(err) => {
                warn!(quiz_id = %result.quiz.id, error = %err, "failed to fetch attempt history");
                Vec::new()
            }
        }
    }
}
