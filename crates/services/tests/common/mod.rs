#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use quiz_core::model::{
    AttemptId, AttemptResult, AttemptSummary, HistoryEntry, HistoryPage, Pagination, Question,
    QuestionId, QuestionOutcome, QuizDefinition, QuizId, QuizRef, SubmissionPayload,
    SubmitReceipt,
};
use quiz_core::time::fixed_now;
use services::{AttemptService, AuthContext, FetchError, QuizApi, ResultService, SubmitError};

/// In-memory backend that grades submissions against the stored quizzes.
#[derive(Clone, Default)]
pub struct FakeQuizApi {
    quizzes: Arc<Mutex<HashMap<QuizId, QuizDefinition>>>,
    submissions: Arc<Mutex<Vec<(QuizId, SubmissionPayload)>>>,
    submit_failures: Arc<Mutex<VecDeque<SubmitError>>>,
    attempts: Arc<Mutex<Vec<AttemptResult>>>,
    submit_delay: Arc<Mutex<Option<Duration>>>,
    history_unavailable: Arc<Mutex<bool>>,
}

impl FakeQuizApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quiz(self, quiz: QuizDefinition) -> Self {
        self.quizzes
            .lock()
            .unwrap()
            .insert(quiz.id().clone(), quiz);
        self
    }

    /// The next submission fails with `err`; later ones succeed again.
    pub fn fail_next_submit(&self, err: SubmitError) {
        self.submit_failures.lock().unwrap().push_back(err);
    }

    pub fn delay_submits(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = Some(delay);
    }

    pub fn break_history(&self) {
        *self.history_unavailable.lock().unwrap() = true;
    }

    /// Every payload the backend received, including rejected ones.
    pub fn submissions(&self) -> Vec<(QuizId, SubmissionPayload)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn service(&self) -> AttemptService {
        AttemptService::new(Arc::new(self.clone()), AuthContext::anonymous())
    }

    pub fn results(&self) -> ResultService {
        ResultService::new(Arc::new(self.clone()), AuthContext::anonymous())
    }

    fn grade(&self, quiz: &QuizDefinition, payload: &SubmissionPayload) -> AttemptResult {
        let mut attempts = self.attempts.lock().unwrap();
        let attempt_number = attempts.iter().filter(|a| &a.quiz.id == quiz.id()).count() as u32 + 1;

        let detailed_results: Vec<QuestionOutcome> = quiz
            .questions()
            .iter()
            .map(|question| {
                let answer = payload
                    .user_answers
                    .iter()
                    .find(|a| &a.question_id == question.id());
                let user_answer = answer.map(|a| a.selected_answer.clone());
                QuestionOutcome {
                    question_id: question.id().clone(),
                    question: question.prompt().to_owned(),
                    options: question.options().to_vec(),
                    is_correct: user_answer.as_deref().is_some()
                        && user_answer.as_deref() == question.correct_answer(),
                    user_answer,
                    correct_answer: question.correct_answer().map(str::to_owned),
                    time_spent_secs: answer.map_or(0, |a| a.time_spent),
                }
            })
            .collect();

        let correct_answers = detailed_results.iter().filter(|r| r.is_correct).count() as u32;
        let total_questions = quiz.question_count() as u32;
        let result = AttemptResult {
            attempt_id: AttemptId::new(format!("attempt-{}", attempts.len() + 1)),
            quiz: QuizRef {
                id: quiz.id().clone(),
                title: quiz.title().to_owned(),
                category: quiz.category().to_owned(),
            },
            percentage: f64::from(correct_answers) * 100.0 / f64::from(total_questions),
            correct_answers,
            total_questions,
            time_spent_secs: payload.time_spent,
            attempt_number,
            detailed_results,
        };
        attempts.push(result.clone());
        result
    }
}

#[async_trait]
impl QuizApi for FakeQuizApi {
    async fn fetch_quiz(
        &self,
        _auth: &AuthContext,
        quiz_id: &QuizId,
    ) -> Result<QuizDefinition, FetchError> {
        self.quizzes
            .lock()
            .unwrap()
            .get(quiz_id)
            .cloned()
            .ok_or(FetchError::NotFound)
    }

    async fn submit_attempt(
        &self,
        _auth: &AuthContext,
        quiz_id: &QuizId,
        payload: &SubmissionPayload,
    ) -> Result<SubmitReceipt, SubmitError> {
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.submissions
            .lock()
            .unwrap()
            .push((quiz_id.clone(), payload.clone()));

        if let Some(err) = self.submit_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let quiz = self
            .quizzes
            .lock()
            .unwrap()
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| SubmitError::Rejected("Quiz not found".into()))?;
        let result = self.grade(&quiz, payload);
        Ok(SubmitReceipt {
            attempt_id: result.attempt_id.clone(),
            result,
        })
    }

    async fn fetch_result(
        &self,
        _auth: &AuthContext,
        attempt_id: &AttemptId,
    ) -> Result<AttemptResult, FetchError> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.attempt_id == attempt_id)
            .cloned()
            .ok_or(FetchError::NotFound)
    }

    async fn fetch_attempts(
        &self,
        _auth: &AuthContext,
        quiz_id: &QuizId,
    ) -> Result<Vec<AttemptSummary>, FetchError> {
        if *self.history_unavailable.lock().unwrap() {
            return Err(FetchError::Network("connection reset".into()));
        }
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|a| &a.quiz.id == quiz_id)
            .map(|a| AttemptSummary {
                attempt_id: a.attempt_id.clone(),
                attempt_number: a.attempt_number,
                percentage: a.percentage,
                time_spent_secs: a.time_spent_secs,
                completed_at: Some(fixed_now()),
            })
            .collect())
    }

    async fn fetch_history(
        &self,
        _auth: &AuthContext,
        page: u32,
        limit: u32,
    ) -> Result<HistoryPage, FetchError> {
        let attempts = self.attempts.lock().unwrap();
        let total = attempts.len() as u32;
        let skip = ((page.max(1) - 1) * limit) as usize;
        let entries = attempts
            .iter()
            .rev()
            .skip(skip)
            .take(limit as usize)
            .map(|a| HistoryEntry {
                attempt_id: a.attempt_id.clone(),
                quiz: a.quiz.clone(),
                attempt_number: a.attempt_number,
                percentage: a.percentage,
                time_spent_secs: a.time_spent_secs,
                completed_at: Some(fixed_now()),
            })
            .collect();
        Ok(HistoryPage {
            entries,
            pagination: Pagination {
                current_page: page,
                total_pages: total.div_ceil(limit),
                total_attempts: total,
                has_next: page * limit < total,
                has_prev: page > 1,
            },
        })
    }
}

/// Quiz with `count` questions `q1..`, options A-D and correct answer "B".
pub fn quiz_fixture(id: &str, count: usize, duration_minutes: u32) -> QuizDefinition {
    let questions = (1..=count)
        .map(|n| {
            Question::new(
                QuestionId::new(format!("q{n}")),
                format!("Question {n}?"),
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                Some("B".into()),
            )
            .unwrap()
        })
        .collect();
    QuizDefinition::new(QuizId::new(id), "Fixture Quiz", "General", questions, duration_minutes)
        .unwrap()
}
