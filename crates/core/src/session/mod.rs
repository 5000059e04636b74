//! Quiz-taking session state machine.
//!
//! `QuizSession` performs no I/O. Callers feed it the outcome of the quiz
//! fetch, one-second ticks and user actions, and send the
//! [`PendingSubmission`]s it hands out to the submission endpoint, reporting
//! the outcome back.

mod snapshot;

use std::fmt;
use std::mem;

use thiserror::Error;

use crate::ledger::AnswerLedger;
use crate::model::{
    QuestionId, QuizDefinition, QuizId, SubmissionPayload, SubmitReceipt,
};
use crate::navigator::{NavigationError, Navigator};
use crate::timer::{Countdown, TimerEvent, TimerHandle, Timers};

pub use snapshot::{OptionView, QuestionView, SessionPhase, SessionSnapshot};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Misuse of the session controller. Network failures are not errors here;
/// they become state transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is not loading")]
    NotLoading,
    #[error("no attempt in progress")]
    NotActive,
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("no submission in progress")]
    NotSubmitting,
    #[error("no submission is awaiting confirmation")]
    NoConfirmationPending,
    #[error("question {id} is not part of this quiz")]
    UnknownQuestion { id: QuestionId },
    #[error("question {id} does not offer option {option:?}")]
    OptionNotOffered { id: QuestionId, option: String },
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// Everything owned by an attempt once the quiz has loaded.
#[derive(Debug, Clone)]
pub struct ActiveAttempt {
    quiz: QuizDefinition,
    ledger: AnswerLedger,
    navigator: Navigator,
    remaining_secs: u32,
    elapsed_secs: u32,
    /// Unanswered count captured when confirmation was requested.
    confirmation: Option<usize>,
    error: Option<String>,
}

impl ActiveAttempt {
    fn new(quiz: QuizDefinition) -> Self {
        let navigator = Navigator::new(quiz.question_count());
        let remaining_secs = quiz.duration_secs();
        Self {
            quiz,
            ledger: AnswerLedger::new(),
            navigator,
            remaining_secs,
            elapsed_secs: 0,
            confirmation: None,
            error: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizDefinition {
        &self.quiz
    }

    #[must_use]
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.quiz
            .question_count()
            .saturating_sub(self.ledger.answered_count())
    }

    #[must_use]
    pub fn confirmation_pending(&self) -> Option<usize> {
        self.confirmation
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn build_payload(&self, time_limit_exceeded: bool) -> SubmissionPayload {
        SubmissionPayload {
            user_answers: self.ledger.to_submission_list(self.quiz.questions()),
            time_spent: self.elapsed_secs,
            time_limit_exceeded,
        }
    }
}

/// A submission snapshot ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub quiz_id: QuizId,
    pub payload: SubmissionPayload,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

pub enum SessionState {
    Loading,
    Active(ActiveAttempt),
    /// The attempt stays mutable while in flight; `submission` does not change.
    Submitting {
        attempt: ActiveAttempt,
        submission: PendingSubmission,
    },
    Completed {
        quiz: QuizDefinition,
        receipt: SubmitReceipt,
    },
    Failed {
        message: String,
    },
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("Loading"),
            Self::Active(attempt) => f
                .debug_struct("Active")
                .field("answered", &attempt.ledger.answered_count())
                .field("current", &attempt.navigator.current())
                .field("remaining_secs", &attempt.remaining_secs)
                .finish_non_exhaustive(),
            Self::Submitting { submission, .. } => f
                .debug_struct("Submitting")
                .field("answers", &submission.payload.answered())
                .field(
                    "time_limit_exceeded",
                    &submission.payload.time_limit_exceeded,
                )
                .finish_non_exhaustive(),
            Self::Completed { receipt, .. } => f
                .debug_struct("Completed")
                .field("attempt_id", &receipt.attempt_id)
                .finish_non_exhaustive(),
            Self::Failed { message } => {
                f.debug_struct("Failed").field("message", message).finish()
            }
        }
    }
}

/// Result of asking to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRequest {
    /// Some questions are unanswered; call `confirm_submit` or `cancel_submit`.
    ConfirmationRequired { unanswered: usize },
    /// Submission began; send this.
    Submitting(PendingSubmission),
}

/// Result of feeding one tick to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale handle or no running countdown.
    Ignored,
    Ticked { remaining_secs: u32 },
    /// Time ran out and a forced submission began; send this.
    Expired(PendingSubmission),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt, from loading to a graded result.
pub struct QuizSession {
    quiz_id: QuizId,
    state: SessionState,
    timers: Timers,
    timer: Option<TimerHandle>,
}

impl QuizSession {
    /// Create a session waiting for the quiz definition.
    #[must_use]
    pub fn new(quiz_id: QuizId) -> Self {
        Self {
            quiz_id,
            state: SessionState::Loading,
            timers: Timers::new(),
            timer: None,
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        SessionPhase::of(&self.state)
    }

    /// The attempt, while active or submitting.
    #[must_use]
    pub fn attempt(&self) -> Option<&ActiveAttempt> {
        match &self.state {
            SessionState::Active(attempt) | SessionState::Submitting { attempt, .. } => {
                Some(attempt)
            }
            _ => None,
        }
    }

    fn attempt_mut(&mut self) -> Option<&mut ActiveAttempt> {
        match &mut self.state {
            SessionState::Active(attempt) | SessionState::Submitting { attempt, .. } => {
                Some(attempt)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SessionState::Submitting { .. })
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            SessionState::Completed { .. } | SessionState::Failed { .. }
        )
    }

    /// Handle of the running countdown, if any. Periodic drivers tick this.
    #[must_use]
    pub fn timer_handle(&self) -> Option<TimerHandle> {
        self.timer.filter(|handle| self.timers.is_running(*handle))
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer_handle().is_some()
    }

    //
    // ─── LOADING ───────────────────────────────────────────────────────────────
    //

    /// Install the fetched quiz and start the countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoading` unless the session is loading.
    pub fn load_succeeded(&mut self, quiz: QuizDefinition) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Loading) {
            return Err(SessionError::NotLoading);
        }
        let attempt = ActiveAttempt::new(quiz);
        self.start_timer(Countdown::new(attempt.remaining_secs));
        self.state = SessionState::Active(attempt);
        Ok(())
    }

    /// Record a load failure. Terminal.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoading` unless the session is loading.
    pub fn load_failed(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Loading) {
            return Err(SessionError::NotLoading);
        }
        self.state = SessionState::Failed {
            message: message.into(),
        };
        Ok(())
    }

    //
    // ─── TIMER ─────────────────────────────────────────────────────────────────
    //

    /// Advance the countdown behind `handle` by one second.
    ///
    /// Expiry forces a submission with `time_limit_exceeded`, discarding any
    /// pending confirmation.
    pub fn tick(&mut self, handle: TimerHandle) -> TickOutcome {
        if self.timer != Some(handle) || !matches!(self.state, SessionState::Active(_)) {
            return TickOutcome::Ignored;
        }
        let Some(event) = self.timers.tick(handle) else {
            return TickOutcome::Ignored;
        };

        match event {
            TimerEvent::Tick { remaining, elapsed } => {
                if let Some(attempt) = self.attempt_mut() {
                    attempt.remaining_secs = remaining;
                    attempt.elapsed_secs = elapsed;
                }
                TickOutcome::Ticked {
                    remaining_secs: remaining,
                }
            }
            TimerEvent::Expired { elapsed } => {
                self.timer = None;
                if let Some(attempt) = self.attempt_mut() {
                    attempt.remaining_secs = 0;
                    attempt.elapsed_secs = elapsed;
                    attempt.confirmation = None;
                }
                match self.begin_submission(true) {
                    Ok(submission) => TickOutcome::Expired(submission),
                    Err(_) => TickOutcome::Ignored,
                }
            }
        }
    }

    /// Stop the countdown. Safe to call any number of times.
    pub fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.timers.stop(handle);
        }
    }

    /// Release everything tied to the view. The session keeps its state.
    pub fn teardown(&mut self) {
        self.stop_timer();
    }

    fn start_timer(&mut self, countdown: Countdown) {
        self.stop_timer();
        self.timer = Some(self.timers.insert(countdown));
    }

    //
    // ─── ANSWERS & NAVIGATION ──────────────────────────────────────────────────
    //

    /// Record `option` for `question_id` at the current elapsed time.
    ///
    /// Allowed while a submission is in flight; the in-flight payload is not
    /// affected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` before loading or after completion,
    /// `SessionError::UnknownQuestion` or `SessionError::OptionNotOffered` for
    /// answers that do not fit the quiz.
    pub fn select_answer(
        &mut self,
        question_id: &QuestionId,
        option: &str,
    ) -> Result<(), SessionError> {
        let attempt = self.attempt_mut().ok_or(SessionError::NotActive)?;
        let question = attempt
            .quiz
            .question(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion {
                id: question_id.clone(),
            })?;
        if !question.offers(option) {
            return Err(SessionError::OptionNotOffered {
                id: question_id.clone(),
                option: option.to_owned(),
            });
        }
        let elapsed = attempt.elapsed_secs;
        attempt.ledger.set_answer(question_id.clone(), option, elapsed);
        Ok(())
    }

    /// Select the option at `option_index` of the question on screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without an attempt and
    /// `SessionError::OptionNotOffered` for an index past the last option.
    pub fn select_current(&mut self, option_index: usize) -> Result<(), SessionError> {
        let attempt = self.attempt().ok_or(SessionError::NotActive)?;
        let Some(question) = attempt.quiz.question_at(attempt.navigator.current()) else {
            return Err(SessionError::NotActive);
        };
        let Some(option) = question.options().get(option_index) else {
            return Err(SessionError::OptionNotOffered {
                id: question.id().clone(),
                option: format!("#{option_index}"),
            });
        };
        let (id, option) = (question.id().clone(), option.clone());
        self.select_answer(&id, &option)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without an attempt.
    pub fn go_next(&mut self) -> Result<(), SessionError> {
        self.attempt_mut()
            .ok_or(SessionError::NotActive)?
            .navigator
            .next();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without an attempt.
    pub fn go_previous(&mut self) -> Result<(), SessionError> {
        self.attempt_mut()
            .ok_or(SessionError::NotActive)?
            .navigator
            .previous();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without an attempt and
    /// `SessionError::Navigation` for an out-of-range index.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.attempt_mut()
            .ok_or(SessionError::NotActive)?
            .navigator
            .jump_to(index)?;
        Ok(())
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    /// Ask to submit. Unanswered questions are counted now, not at load time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitting` while a submission is in
    /// flight and `SessionError::NotActive` outside an attempt.
    pub fn request_submit(&mut self) -> Result<SubmitRequest, SessionError> {
        let attempt = match &mut self.state {
            SessionState::Active(attempt) => attempt,
            SessionState::Submitting { .. } => return Err(SessionError::AlreadySubmitting),
            _ => return Err(SessionError::NotActive),
        };

        let unanswered = attempt.unanswered_count();
        if unanswered > 0 {
            attempt.confirmation = Some(unanswered);
            return Ok(SubmitRequest::ConfirmationRequired { unanswered });
        }

        self.begin_submission(false).map(SubmitRequest::Submitting)
    }

    /// Submit despite unanswered questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoConfirmationPending` unless `request_submit`
    /// asked for confirmation, and `SessionError::AlreadySubmitting` while a
    /// submission is in flight.
    pub fn confirm_submit(&mut self) -> Result<PendingSubmission, SessionError> {
        match &self.state {
            SessionState::Active(attempt) if attempt.confirmation.is_some() => {}
            SessionState::Active(_) => return Err(SessionError::NoConfirmationPending),
            SessionState::Submitting { .. } => return Err(SessionError::AlreadySubmitting),
            _ => return Err(SessionError::NotActive),
        }
        self.begin_submission(false)
    }

    /// Dismiss the confirmation prompt and keep answering.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoConfirmationPending` when nothing is pending.
    pub fn cancel_submit(&mut self) -> Result<(), SessionError> {
        match &mut self.state {
            SessionState::Active(attempt) => attempt
                .confirmation
                .take()
                .map(|_| ())
                .ok_or(SessionError::NoConfirmationPending),
            _ => Err(SessionError::NoConfirmationPending),
        }
    }

    /// The in-flight submission, if any.
    #[must_use]
    pub fn pending_submission(&self) -> Option<&PendingSubmission> {
        match &self.state {
            SessionState::Submitting { submission, .. } => Some(submission),
            _ => None,
        }
    }

    /// The backend accepted the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` when nothing is in flight.
    pub fn submission_succeeded(&mut self, receipt: SubmitReceipt) -> Result<(), SessionError> {
        if !self.is_submitting() {
            return Err(SessionError::NotSubmitting);
        }
        let SessionState::Submitting { attempt, .. } =
            mem::replace(&mut self.state, SessionState::Loading)
        else {
            return Err(SessionError::NotSubmitting);
        };
        self.stop_timer();
        self.state = SessionState::Completed {
            quiz: attempt.quiz,
            receipt,
        };
        Ok(())
    }

    /// The submission failed. Returns to the attempt with `message` shown and
    /// resumes the countdown if time remains.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` when nothing is in flight.
    pub fn submission_failed(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        if !self.is_submitting() {
            return Err(SessionError::NotSubmitting);
        }
        let SessionState::Submitting { mut attempt, .. } =
            mem::replace(&mut self.state, SessionState::Loading)
        else {
            return Err(SessionError::NotSubmitting);
        };
        attempt.error = Some(message.into());
        attempt.confirmation = None;
        if attempt.remaining_secs > 0 {
            self.start_timer(Countdown::resumed(
                attempt.remaining_secs,
                attempt.elapsed_secs,
            ));
        }
        self.state = SessionState::Active(attempt);
        Ok(())
    }

    fn begin_submission(
        &mut self,
        time_limit_exceeded: bool,
    ) -> Result<PendingSubmission, SessionError> {
        match &self.state {
            SessionState::Active(_) => {}
            SessionState::Submitting { .. } => return Err(SessionError::AlreadySubmitting),
            _ => return Err(SessionError::NotActive),
        }
        self.stop_timer();

        let SessionState::Active(mut attempt) =
            mem::replace(&mut self.state, SessionState::Loading)
        else {
            return Err(SessionError::NotActive);
        };
        attempt.confirmation = None;
        attempt.error = None;

        let submission = PendingSubmission {
            quiz_id: attempt.quiz.id().clone(),
            payload: attempt.build_payload(time_limit_exceeded),
        };
        self.state = SessionState::Submitting {
            attempt,
            submission: submission.clone(),
        };
        Ok(submission)
    }

    /// View of the session for rendering.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz_id)
            .field("state", &self.state)
            .field("timer", &self.timer)
            .finish()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttemptId, AttemptResult, Question, QuizRef};

    fn quiz(question_ids: &[&str], minutes: u32) -> QuizDefinition {
        let questions = question_ids
            .iter()
            .map(|id| {
                Question::new(
                    QuestionId::new(*id),
                    format!("Prompt {id}"),
                    vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    None,
                )
                .unwrap()
            })
            .collect();
        QuizDefinition::new(QuizId::new("quiz-1"), "Capitals", "Geography", questions, minutes)
            .unwrap()
    }

    fn loaded(question_ids: &[&str], minutes: u32) -> QuizSession {
        let mut session = QuizSession::new(QuizId::new("quiz-1"));
        session.load_succeeded(quiz(question_ids, minutes)).unwrap();
        session
    }

    fn tick_n(session: &mut QuizSession, n: u32) -> Vec<TickOutcome> {
        (0..n)
            .map(|_| match session.timer_handle() {
                Some(handle) => session.tick(handle),
                None => TickOutcome::Ignored,
            })
            .collect()
    }

    fn receipt(id: &str) -> SubmitReceipt {
        SubmitReceipt {
            attempt_id: AttemptId::new(id),
            result: AttemptResult {
                attempt_id: AttemptId::new(id),
                quiz: QuizRef {
                    id: QuizId::new("quiz-1"),
                    title: "Capitals".into(),
                    category: "Geography".into(),
                },
                percentage: 50.0,
                correct_answers: 1,
                total_questions: 2,
                time_spent_secs: 10,
                attempt_number: 1,
                detailed_results: Vec::new(),
            },
        }
    }

    fn q(id: &str) -> QuestionId {
        QuestionId::new(id)
    }

    #[test]
    fn load_starts_countdown_at_duration() {
        let session = loaded(&["q1"], 2);
        let attempt = session.attempt().unwrap();
        assert_eq!(attempt.remaining_secs(), 120);
        assert_eq!(attempt.elapsed_secs(), 0);
        assert!(session.is_timer_running());
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn load_failure_is_terminal() {
        let mut session = QuizSession::new(QuizId::new("missing"));
        session.load_failed("Quiz not found").unwrap();
        assert!(session.is_finished());
        assert_eq!(session.load_failed("again"), Err(SessionError::NotLoading));
        assert_eq!(session.go_next(), Err(SessionError::NotActive));
        assert!(!session.is_timer_running());
    }

    #[test]
    fn partial_answers_require_confirmation() {
        let mut session = loaded(&["q1", "q2", "q3"], 1);
        session.select_answer(&q("q3"), "C").unwrap();
        tick_n(&mut session, 4);
        session.select_answer(&q("q1"), "A").unwrap();

        let request = session.request_submit().unwrap();
        assert_eq!(request, SubmitRequest::ConfirmationRequired { unanswered: 1 });
        assert_eq!(session.attempt().unwrap().confirmation_pending(), Some(1));

        let pending = session.confirm_submit().unwrap();
        assert!(!pending.payload.time_limit_exceeded);
        let ids: Vec<&str> = pending
            .payload
            .user_answers
            .iter()
            .map(|a| a.question_id.as_str())
            .collect();
        assert_eq!(ids, vec!["q1", "q3"]);
        assert_eq!(pending.payload.user_answers[0].time_spent, 4);
        assert_eq!(pending.payload.user_answers[1].time_spent, 0);
        assert!(session.is_submitting());
        assert!(!session.is_timer_running());
    }

    #[test]
    fn unanswered_count_is_computed_at_request_time() {
        let mut session = loaded(&["q1", "q2"], 1);
        assert_eq!(
            session.request_submit().unwrap(),
            SubmitRequest::ConfirmationRequired { unanswered: 2 }
        );
        session.cancel_submit().unwrap();
        session.select_answer(&q("q2"), "B").unwrap();
        assert_eq!(
            session.request_submit().unwrap(),
            SubmitRequest::ConfirmationRequired { unanswered: 1 }
        );
    }

    #[test]
    fn fully_answered_submits_directly() {
        let mut session = loaded(&["q1", "q2"], 1);
        session.select_answer(&q("q1"), "A").unwrap();
        session.select_answer(&q("q2"), "B").unwrap();
        let request = session.request_submit().unwrap();
        assert!(matches!(request, SubmitRequest::Submitting(_)));
        assert_eq!(session.request_submit(), Err(SessionError::AlreadySubmitting));
        assert_eq!(session.confirm_submit(), Err(SessionError::AlreadySubmitting));
    }

    #[test]
    fn confirm_without_request_is_rejected() {
        let mut session = loaded(&["q1"], 1);
        assert_eq!(
            session.confirm_submit(),
            Err(SessionError::NoConfirmationPending)
        );
        assert_eq!(
            session.cancel_submit(),
            Err(SessionError::NoConfirmationPending)
        );
    }

    #[test]
    fn expiry_forces_submission_and_bypasses_confirmation() {
        let mut session = loaded(&["q1", "q2", "q3"], 1);
        session.request_submit().unwrap();

        let outcomes = tick_n(&mut session, 60);
        let expired: Vec<_> = outcomes
            .iter()
            .filter(|o| matches!(o, TickOutcome::Expired(_)))
            .collect();
        assert_eq!(expired.len(), 1);

        let TickOutcome::Expired(pending) = outcomes.last().unwrap() else {
            panic!("last tick should expire");
        };
        assert!(pending.payload.user_answers.is_empty());
        assert!(pending.payload.time_limit_exceeded);
        assert_eq!(pending.payload.time_spent, 60);
        assert!(session.is_submitting());

        // the countdown is gone; more ticks do nothing
        assert!(session.timer_handle().is_none());
        assert!(tick_n(&mut session, 3).iter().all(|o| *o == TickOutcome::Ignored));
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut session = loaded(&["q1"], 1);
        let stale = session.timer_handle().unwrap();
        session.select_answer(&q("q1"), "A").unwrap();
        session.request_submit().unwrap();
        session.submission_failed("offline").unwrap();

        let fresh = session.timer_handle().unwrap();
        assert_ne!(stale, fresh);
        assert_eq!(session.tick(stale), TickOutcome::Ignored);
        assert!(matches!(session.tick(fresh), TickOutcome::Ticked { .. }));
    }

    #[test]
    fn reselecting_overwrites_value_and_time() {
        let mut session = loaded(&["q1"], 1);
        session.select_answer(&q("q1"), "B").unwrap();
        tick_n(&mut session, 7);
        session.select_answer(&q("q1"), "D").unwrap();

        let SubmitRequest::Submitting(pending) = session.request_submit().unwrap() else {
            panic!("single question answered");
        };
        assert_eq!(pending.payload.user_answers.len(), 1);
        assert_eq!(pending.payload.user_answers[0].selected_answer, "D");
        assert_eq!(pending.payload.user_answers[0].time_spent, 7);
    }

    #[test]
    fn payload_is_frozen_while_in_flight() {
        let mut session = loaded(&["q1", "q2"], 1);
        session.select_answer(&q("q1"), "A").unwrap();
        session.request_submit().unwrap();
        let pending = session.confirm_submit().unwrap();

        session.select_answer(&q("q2"), "B").unwrap();
        session.select_answer(&q("q1"), "C").unwrap();
        session.go_next().unwrap();

        assert_eq!(session.pending_submission(), Some(&pending));
        assert_eq!(pending.payload.user_answers.len(), 1);
        assert_eq!(pending.payload.user_answers[0].selected_answer, "A");
    }

    #[test]
    fn failed_submission_returns_to_active_and_resumes() {
        let mut session = loaded(&["q1"], 1);
        tick_n(&mut session, 10);
        session.select_answer(&q("q1"), "A").unwrap();
        session.request_submit().unwrap();

        session.submission_failed("Failed to submit quiz").unwrap();
        assert_eq!(session.phase(), SessionPhase::Active);
        let attempt = session.attempt().unwrap();
        assert_eq!(attempt.error(), Some("Failed to submit quiz"));
        assert_eq!(attempt.remaining_secs(), 50);
        assert!(session.is_timer_running());

        tick_n(&mut session, 1);
        assert_eq!(session.attempt().unwrap().elapsed_secs(), 11);

        let SubmitRequest::Submitting(pending) = session.request_submit().unwrap() else {
            panic!("answered quiz should submit");
        };
        assert_eq!(pending.payload.time_spent, 11);
        assert!(session.attempt().unwrap().error().is_none());

        session.submission_succeeded(receipt("att-1")).unwrap();
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert!(!session.is_timer_running());
    }

    #[test]
    fn failed_timeout_submission_does_not_restart_timer() {
        let mut session = loaded(&["q1"], 1);
        tick_n(&mut session, 60);
        session.submission_failed("offline").unwrap();
        assert!(!session.is_timer_running());
        assert_eq!(session.attempt().unwrap().remaining_secs(), 0);

        let SubmitRequest::ConfirmationRequired { unanswered } = session.request_submit().unwrap()
        else {
            panic!("nothing answered");
        };
        assert_eq!(unanswered, 1);
    }

    #[test]
    fn outcome_without_submission_is_rejected() {
        let mut session = loaded(&["q1"], 1);
        assert_eq!(
            session.submission_succeeded(receipt("x")),
            Err(SessionError::NotSubmitting)
        );
        assert_eq!(
            session.submission_failed("x"),
            Err(SessionError::NotSubmitting)
        );
    }

    #[test]
    fn answers_are_validated_against_the_quiz() {
        let mut session = loaded(&["q1"], 1);
        assert!(matches!(
            session.select_answer(&q("zz"), "A"),
            Err(SessionError::UnknownQuestion { .. })
        ));
        assert!(matches!(
            session.select_answer(&q("q1"), "Z"),
            Err(SessionError::OptionNotOffered { .. })
        ));
        assert!(matches!(
            session.select_current(9),
            Err(SessionError::OptionNotOffered { .. })
        ));
        session.select_current(1).unwrap();
        assert_eq!(
            session.attempt().unwrap().ledger().get(&q("q1")).unwrap().selected,
            "B"
        );
    }

    #[test]
    fn next_on_last_question_does_not_submit() {
        let mut session = loaded(&["q1", "q2"], 1);
        session.go_next().unwrap();
        session.go_next().unwrap();
        assert_eq!(session.attempt().unwrap().navigator().current(), 1);
        assert_eq!(session.phase(), SessionPhase::Active);
        assert!(session.jump_to(5).is_err());
        session.jump_to(0).unwrap();
        session.go_previous().unwrap();
        assert_eq!(session.attempt().unwrap().navigator().current(), 0);
    }

    #[test]
    fn teardown_stops_timer_idempotently() {
        let mut session = loaded(&["q1"], 1);
        session.teardown();
        session.teardown();
        assert!(!session.is_timer_running());
        assert!(tick_n(&mut session, 2).iter().all(|o| *o == TickOutcome::Ignored));
    }
}
