use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};

/// Duration applied when the backend omits one, in minutes.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {id} has no options")]
    NoOptions { id: QuestionId },

    #[error("question id {id} appears more than once")]
    DuplicateQuestion { id: QuestionId },

    #[error("quiz duration must be > 0 minutes")]
    InvalidDuration,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
///
/// Options are kept in the order the backend sent them; answers refer to the
/// option text rather than its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: Option<String>,
}

impl Question {
    /// Build a question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoOptions` when `options` is empty.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: Option<String>,
    ) -> Result<Self, QuizError> {
        if options.is_empty() {
            return Err(QuizError::NoOptions { id });
        }
        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            correct_answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Only present when the backend chose to expose it.
    #[must_use]
    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }

    #[must_use]
    pub fn offers(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A loaded quiz. Immutable for the lifetime of an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDefinition {
    id: QuizId,
    title: String,
    category: String,
    questions: Vec<Question>,
    duration_minutes: u32,
}

impl QuizDefinition {
    /// Build and validate a quiz definition.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty question list,
    /// `QuizError::DuplicateQuestion` when two questions share an id and
    /// `QuizError::InvalidDuration` for a zero duration.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        category: impl Into<String>,
        questions: Vec<Question>,
        duration_minutes: u32,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        if duration_minutes == 0 {
            return Err(QuizError::InvalidDuration);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(QuizError::DuplicateQuestion {
                    id: question.id().clone(),
                });
            }
        }

        Ok(Self {
            id,
            title: title.into(),
            category: category.into(),
            questions,
            duration_minutes,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Total countdown length for an attempt.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Prompt {id}"),
            vec!["A".into(), "B".into()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn rejects_question_without_options() {
        let err = Question::new(QuestionId::new("q1"), "?", Vec::new(), None).unwrap_err();
        assert_eq!(
            err,
            QuizError::NoOptions {
                id: QuestionId::new("q1")
            }
        );
    }

    #[test]
    fn rejects_empty_and_duplicate_quizzes() {
        let empty = QuizDefinition::new(QuizId::new("z"), "T", "C", Vec::new(), 1);
        assert_eq!(empty.unwrap_err(), QuizError::NoQuestions);

        let dup = QuizDefinition::new(
            QuizId::new("z"),
            "T",
            "C",
            vec![question("q1"), question("q1")],
            1,
        );
        assert!(matches!(
            dup.unwrap_err(),
            QuizError::DuplicateQuestion { .. }
        ));
    }

    #[test]
    fn duration_is_converted_to_seconds() {
        let quiz =
            QuizDefinition::new(QuizId::new("z"), "T", "C", vec![question("q1")], 2).unwrap();
        assert_eq!(quiz.duration_secs(), 120);
        assert!(quiz.question(&QuestionId::new("q1")).unwrap().offers("B"));
        assert!(!quiz.question_at(0).unwrap().offers("Z"));
    }
}
