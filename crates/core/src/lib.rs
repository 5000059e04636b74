#![forbid(unsafe_code)]

pub mod ledger;
pub mod model;
pub mod navigator;
pub mod session;
pub mod time;
pub mod timer;

pub use ledger::AnswerLedger;
pub use navigator::{NavigationError, Navigator};
pub use session::{
    ActiveAttempt, PendingSubmission, QuizSession, SessionError, SessionPhase, SessionSnapshot,
    SessionState, SubmitRequest, TickOutcome,
};
pub use timer::{Countdown, TimerEvent, TimerHandle, Timers};
