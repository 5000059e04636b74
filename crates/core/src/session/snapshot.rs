use crate::model::{AttemptId, QuestionId, Tone};
use crate::time::format_clock;

use super::{QuizSession, SessionState};

/// Top-level phase of a session, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Active,
    Submitting,
    Completed,
    Failed,
}

impl SessionPhase {
    pub(super) fn of(state: &SessionState) -> Self {
        match state {
            SessionState::Loading => Self::Loading,
            SessionState::Active(_) => Self::Active,
            SessionState::Submitting { .. } => Self::Submitting,
            SessionState::Completed { .. } => Self::Completed,
            SessionState::Failed { .. } => Self::Failed,
        }
    }
}

/// One option as rendered, lettered A, B, C...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub label: char,
    pub text: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<OptionView>,
}

/// Render-ready copy of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub title: Option<String>,
    pub category: Option<String>,
    pub question_index: usize,
    pub question_count: usize,
    pub question: Option<QuestionView>,
    /// Answered flag per question, in quiz order.
    pub answered: Vec<bool>,
    pub answered_count: usize,
    pub unanswered_count: usize,
    pub remaining_secs: u32,
    pub elapsed_secs: u32,
    /// `m:ss`
    pub remaining_label: String,
    pub time_tone: Tone,
    pub progress: f64,
    pub is_first: bool,
    pub is_last: bool,
    pub confirmation_pending: Option<usize>,
    pub submitting: bool,
    pub error: Option<String>,
    pub attempt_id: Option<AttemptId>,
}

impl SessionSnapshot {
    fn empty(phase: SessionPhase) -> Self {
        Self {
            phase,
            title: None,
            category: None,
            question_index: 0,
            question_count: 0,
            question: None,
            answered: Vec::new(),
            answered_count: 0,
            unanswered_count: 0,
            remaining_secs: 0,
            elapsed_secs: 0,
            remaining_label: format_clock(0),
            time_tone: Tone::Danger,
            progress: 0.0,
            is_first: true,
            is_last: true,
            confirmation_pending: None,
            submitting: false,
            error: None,
            attempt_id: None,
        }
    }

    pub(super) fn capture(session: &QuizSession) -> Self {
        let phase = session.phase();
        match session.state() {
            SessionState::Loading => Self::empty(phase),
            SessionState::Failed { message } => Self {
                error: Some(message.clone()),
                ..Self::empty(phase)
            },
            SessionState::Completed { quiz, receipt } => Self {
                title: Some(quiz.title().to_owned()),
                category: Some(quiz.category().to_owned()),
                question_count: quiz.question_count(),
                attempt_id: Some(receipt.attempt_id.clone()),
                ..Self::empty(phase)
            },
            SessionState::Active(attempt) | SessionState::Submitting { attempt, .. } => {
                let quiz = attempt.quiz();
                let ledger = attempt.ledger();
                let navigator = attempt.navigator();
                let index = navigator.current();

                let question = quiz.question_at(index).map(|q| {
                    let selected = ledger.get(q.id()).map(|r| r.selected.as_str());
                    QuestionView {
                        id: q.id().clone(),
                        prompt: q.prompt().to_owned(),
                        options: q
                            .options()
                            .iter()
                            .zip('A'..)
                            .map(|(text, label)| OptionView {
                                label,
                                text: text.clone(),
                                selected: selected == Some(text.as_str()),
                            })
                            .collect(),
                    }
                });

                Self {
                    phase,
                    title: Some(quiz.title().to_owned()),
                    category: Some(quiz.category().to_owned()),
                    question_index: index,
                    question_count: quiz.question_count(),
                    question,
                    answered: quiz
                        .questions()
                        .iter()
                        .map(|q| ledger.is_answered(q.id()))
                        .collect(),
                    answered_count: ledger.answered_count(),
                    unanswered_count: attempt.unanswered_count(),
                    remaining_secs: attempt.remaining_secs(),
                    elapsed_secs: attempt.elapsed_secs(),
                    remaining_label: format_clock(attempt.remaining_secs()),
                    time_tone: Tone::for_remaining(attempt.remaining_secs(), quiz.duration_secs()),
                    progress: navigator.progress(),
                    is_first: navigator.is_first(),
                    is_last: navigator.is_last(),
                    confirmation_pending: attempt.confirmation_pending(),
                    submitting: matches!(phase, SessionPhase::Submitting),
                    error: attempt.error().map(str::to_owned),
                    attempt_id: None,
                }
            }
        }
    }
}
