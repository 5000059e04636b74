use chrono::{DateTime, Utc};

use crate::model::ids::{AttemptId, QuestionId, QuizId};

/// Minimal quiz reference carried by a graded result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRef {
    pub id: QuizId,
    pub title: String,
    pub category: String,
}

/// Grading of a single question within an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    pub user_answer: Option<String>,
    pub correct_answer: Option<String>,
    pub is_correct: bool,
    pub time_spent_secs: u32,
}

/// Graded attempt as returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    pub attempt_id: AttemptId,
    pub quiz: QuizRef,
    pub percentage: f64,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub time_spent_secs: u32,
    pub attempt_number: u32,
    pub detailed_results: Vec<QuestionOutcome>,
}

impl AttemptResult {
    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.total_questions.saturating_sub(self.correct_answers)
    }
}

/// Row of a user's attempt history for one quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptSummary {
    pub attempt_id: AttemptId,
    pub attempt_number: u32,
    pub percentage: f64,
    pub time_spent_secs: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

/// One attempt in the user's history across all quizzes.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub attempt_id: AttemptId,
    pub quiz: QuizRef,
    pub attempt_number: u32,
    pub percentage: f64,
    pub time_spent_secs: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Paging state reported alongside a history page. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_attempts: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub pagination: Pagination,
}

/// What the submission endpoint hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub attempt_id: AttemptId,
    pub result: AttemptResult,
}
