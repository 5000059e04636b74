//! JSON shapes used by the backend and their mapping into domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use quiz_core::model::{
    AttemptId, AttemptResult, AttemptSummary, DEFAULT_DURATION_MINUTES, HistoryEntry,
    HistoryPage, Pagination, Question, QuestionId, QuestionOutcome, QuizDefinition, QuizError,
    QuizId, QuizRef, SubmitReceipt,
};

#[derive(Debug, Deserialize)]
pub(crate) struct QuizEnvelope {
    #[serde(default)]
    pub success: bool,
    pub quiz: Option<QuizDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizDto {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    duration: Option<u32>,
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
struct QuestionDto {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(rename = "questionText")]
    question_text: Option<String>,
    question: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: Option<String>,
}

impl QuestionDto {
    /// `questionText` wins over the older `question` spelling unless empty.
    fn prompt(&mut self) -> String {
        [self.question_text.take(), self.question.take()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or_default()
    }
}

impl QuizDto {
    /// A missing or zero duration falls back to the default.
    pub fn into_domain(self) -> Result<QuizDefinition, QuizError> {
        let questions = self
            .questions
            .into_iter()
            .map(|mut q| {
                let prompt = q.prompt();
                Question::new(QuestionId::new(q.id), prompt, q.options, q.correct_answer)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let duration = self
            .duration
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_DURATION_MINUTES);
        QuizDefinition::new(
            QuizId::new(self.id),
            self.title,
            self.category,
            questions,
            duration,
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultEnvelope {
    #[serde(default)]
    pub success: bool,
    pub result: Option<ResultDto>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResultDto {
    attempt_id: String,
    quiz: Option<QuizRefDto>,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    correct_answers: u32,
    #[serde(default)]
    total_questions: u32,
    #[serde(default)]
    time_spent: u32,
    #[serde(default)]
    attempt_number: u32,
    #[serde(default)]
    detailed_results: Vec<OutcomeDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizRefDto {
    #[serde(alias = "_id", default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
}

impl From<QuizRefDto> for QuizRef {
    fn from(dto: QuizRefDto) -> Self {
        Self {
            id: QuizId::new(dto.id),
            title: dto.title,
            category: dto.category,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeDto {
    question_id: String,
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    user_answer: Option<String>,
    correct_answer: Option<String>,
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    time_spent: u32,
}

impl ResultDto {
    /// `quiz_id` fills in a quiz reference the backend left out.
    pub fn into_domain(self, quiz_id: Option<&QuizId>) -> AttemptResult {
        let quiz = match self.quiz {
            Some(q) if !q.id.is_empty() => q.into(),
            Some(q) => QuizRef {
                id: quiz_id.cloned().unwrap_or_else(|| QuizId::new("")),
                title: q.title,
                category: q.category,
            },
            None => QuizRef {
                id: quiz_id.cloned().unwrap_or_else(|| QuizId::new("")),
                title: String::new(),
                category: String::new(),
            },
        };

        AttemptResult {
            attempt_id: AttemptId::new(self.attempt_id),
            quiz,
            percentage: self.percentage,
            correct_answers: self.correct_answers,
            total_questions: self.total_questions,
            time_spent_secs: self.time_spent,
            attempt_number: self.attempt_number,
            detailed_results: self
                .detailed_results
                .into_iter()
                .map(|o| QuestionOutcome {
                    question_id: QuestionId::new(o.question_id),
                    question: o.question,
                    options: o.options,
                    user_answer: o.user_answer,
                    correct_answer: o.correct_answer,
                    is_correct: o.is_correct,
                    time_spent_secs: o.time_spent,
                })
                .collect(),
        }
    }

    pub fn into_receipt(self, quiz_id: &QuizId) -> SubmitReceipt {
        let result = self.into_domain(Some(quiz_id));
        SubmitReceipt {
            attempt_id: result.attempt_id.clone(),
            result,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub attempts: Vec<AttemptSummaryDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttemptSummaryDto {
    attempt_id: String,
    #[serde(default)]
    attempt_number: u32,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    time_spent: u32,
    completed_at: Option<DateTime<Utc>>,
}

impl From<AttemptSummaryDto> for AttemptSummary {
    fn from(dto: AttemptSummaryDto) -> Self {
        Self {
            attempt_id: AttemptId::new(dto.attempt_id),
            attempt_number: dto.attempt_number,
            percentage: dto.percentage,
            time_spent_secs: dto.time_spent,
            completed_at: dto.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub attempts: Vec<HistoryEntryDto>,
    pub pagination: Option<PaginationDto>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryEntryDto {
    attempt_id: String,
    #[serde(default)]
    quiz: Option<QuizRefDto>,
    #[serde(default)]
    attempt_number: u32,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    time_spent: u32,
    completed_at: Option<DateTime<Utc>>,
}

impl From<HistoryEntryDto> for HistoryEntry {
    fn from(dto: HistoryEntryDto) -> Self {
        Self {
            attempt_id: AttemptId::new(dto.attempt_id),
            quiz: dto.quiz.map_or_else(
                || QuizRef {
                    id: QuizId::new(""),
                    title: String::new(),
                    category: String::new(),
                },
                Into::into,
            ),
            attempt_number: dto.attempt_number,
            percentage: dto.percentage,
            time_spent_secs: dto.time_spent,
            completed_at: dto.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginationDto {
    #[serde(default)]
    current_page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_attempts: u32,
    #[serde(default)]
    has_next: bool,
    #[serde(default)]
    has_prev: bool,
}

impl HistoryEnvelope {
    /// A missing pagination block means everything fit on `page`.
    pub fn into_page(self, page: u32) -> HistoryPage {
        let entries: Vec<HistoryEntry> = self.attempts.into_iter().map(Into::into).collect();
        let pagination = match self.pagination {
            Some(p) => Pagination {
                current_page: if p.current_page == 0 { page } else { p.current_page },
                total_pages: p.total_pages,
                total_attempts: p.total_attempts,
                has_next: p.has_next,
                has_prev: p.has_prev,
            },
            None => Pagination {
                current_page: page,
                total_pages: 1,
                total_attempts: u32::try_from(entries.len()).unwrap_or(u32::MAX),
                has_next: false,
                has_prev: page > 1,
            },
        };
        HistoryPage {
            entries,
            pagination,
        }
    }
}

/// Error body the backend sends alongside 4xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}
