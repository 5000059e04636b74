use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// The option a user picked for one question.
///
/// `time_spent_secs` is the attempt's elapsed time when the option was last
/// set, so reselecting overwrites both fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub selected: String,
    pub time_spent_secs: u32,
}

/// One entry of the submission body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub selected_answer: String,
    pub time_spent: u32,
}

/// Request body sent to the submission endpoint.
///
/// Unanswered questions are omitted, and `user_answers` follows the quiz's
/// question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub user_answers: Vec<SubmittedAnswer>,
    pub time_spent: u32,
    pub time_limit_exceeded: bool,
}

impl SubmissionPayload {
    #[must_use]
    pub fn answered(&self) -> usize {
        self.user_answers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_uses_backend_field_names() {
        let payload = SubmissionPayload {
            user_answers: vec![SubmittedAnswer {
                question_id: QuestionId::new("q1"),
                selected_answer: "Paris".into(),
                time_spent: 12,
            }],
            time_spent: 40,
            time_limit_exceeded: false,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "userAnswers": [
                    { "questionId": "q1", "selectedAnswer": "Paris", "timeSpent": 12 }
                ],
                "timeSpent": 40,
                "timeLimitExceeded": false
            })
        );
    }
}
