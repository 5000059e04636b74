use std::collections::HashMap;

use crate::model::{AnswerRecord, Question, QuestionId, SubmittedAnswer};

/// Per-attempt store of answered questions.
///
/// One record per question; selecting again overwrites in place.
#[derive(Debug, Clone, Default)]
pub struct AnswerLedger {
    records: HashMap<QuestionId, AnswerRecord>,
}

impl AnswerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the answer for `question_id`.
    ///
    /// `elapsed_secs` is recorded as the question's time spent, even when the
    /// same option is selected again.
    pub fn set_answer(
        &mut self,
        question_id: QuestionId,
        option: impl Into<String>,
        elapsed_secs: u32,
    ) {
        self.records.insert(
            question_id,
            AnswerRecord {
                selected: option.into(),
                time_spent_secs: elapsed_secs,
            },
        );
    }

    #[must_use]
    pub fn get(&self, question_id: &QuestionId) -> Option<&AnswerRecord> {
        self.records.get(question_id)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.records.contains_key(question_id)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.records.len()
    }

    /// Answered questions in `questions` order, unanswered ones skipped.
    #[must_use]
    pub fn to_submission_list(&self, questions: &[Question]) -> Vec<SubmittedAnswer> {
        questions
            .iter()
            .filter_map(|question| {
                self.records.get(question.id()).map(|record| SubmittedAnswer {
                    question_id: question.id().clone(),
                    selected_answer: record.selected.clone(),
                    time_spent: record.time_spent_secs,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(ids: &[&str]) -> Vec<Question> {
        ids.iter()
            .map(|id| {
                Question::new(
                    QuestionId::new(*id),
                    "?",
                    vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    None,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn last_selection_wins_on_value_and_time() {
        let mut ledger = AnswerLedger::new();
        let q1 = QuestionId::new("q1");
        ledger.set_answer(q1.clone(), "B", 5);
        ledger.set_answer(q1.clone(), "D", 17);
        ledger.set_answer(q1.clone(), "D", 21);

        assert_eq!(ledger.answered_count(), 1);
        assert_eq!(
            ledger.get(&q1),
            Some(&AnswerRecord {
                selected: "D".into(),
                time_spent_secs: 21
            })
        );
    }

    #[test]
    fn submission_list_follows_question_order() {
        let qs = questions(&["q1", "q2", "q3", "q4"]);
        let mut ledger = AnswerLedger::new();
        ledger.set_answer(QuestionId::new("q4"), "A", 3);
        ledger.set_answer(QuestionId::new("q1"), "C", 9);
        ledger.set_answer(QuestionId::new("q3"), "B", 11);

        let list = ledger.to_submission_list(&qs);
        let ids: Vec<&str> = list.iter().map(|a| a.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q3", "q4"]);
        assert_eq!(list.len(), ledger.answered_count());
        assert_eq!(list[0].selected_answer, "C");
        assert_eq!(list[0].time_spent, 9);
    }

    #[test]
    fn unknown_question_is_absent() {
        let ledger = AnswerLedger::new();
        assert!(ledger.get(&QuestionId::new("nope")).is_none());
        assert!(ledger.to_submission_list(&questions(&["q1"])).is_empty());
    }
}
