mod runner;
mod service;
mod ticker;

// Public API of the attempt subsystem.
pub use runner::{AttemptCommand, AttemptOutcome, AttemptRunner};
pub use service::{
    AttemptService, LOAD_FAILED_MESSAGE, QUIZ_NOT_FOUND_MESSAGE, load_failure_message,
    submit_failure_message,
};
pub use ticker::{TICK_PERIOD, Ticker};
