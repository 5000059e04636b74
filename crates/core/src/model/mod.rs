mod answer;
mod ids;
mod quiz;
mod result;
mod tone;

pub use ids::{AttemptId, QuestionId, QuizId};

pub use answer::{AnswerRecord, SubmissionPayload, SubmittedAnswer};
pub use quiz::{DEFAULT_DURATION_MINUTES, Question, QuizDefinition, QuizError};
pub use result::{
    AttemptResult, AttemptSummary, HistoryEntry, HistoryPage, Pagination, QuestionOutcome, QuizRef,
    SubmitReceipt,
};
pub use tone::Tone;
