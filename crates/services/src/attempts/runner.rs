use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use quiz_core::model::{QuestionId, SubmitReceipt};
use quiz_core::{
    PendingSubmission, QuizSession, SessionError, SessionSnapshot, SessionState, SubmitRequest,
    TickOutcome, TimerHandle,
};

use super::service::AttemptService;
use super::ticker::{TICK_PERIOD, Ticker};
use crate::error::SubmitError;

/// User actions accepted while an attempt runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptCommand {
    Select { question_id: QuestionId, option: String },
    /// Select by option index on the question on screen.
    SelectCurrent(usize),
    Next,
    Previous,
    JumpTo(usize),
    RequestSubmit,
    ConfirmSubmit,
    CancelSubmit,
    Leave,
}

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Completed(SubmitReceipt),
    Failed(String),
    /// The user left (or the command channel closed) before completion.
    Abandoned,
}

/// Drives one `QuizSession`: owns its ticker, spawns submissions and
/// publishes a snapshot after every change.
pub struct AttemptRunner {
    service: AttemptService,
    session: QuizSession,
    ticker: Option<Ticker>,
    tick_period: Duration,
    ticks_tx: mpsc::UnboundedSender<TimerHandle>,
    ticks_rx: mpsc::UnboundedReceiver<TimerHandle>,
    submit_tx: mpsc::UnboundedSender<Result<SubmitReceipt, SubmitError>>,
    submit_rx: mpsc::UnboundedReceiver<Result<SubmitReceipt, SubmitError>>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl AttemptRunner {
    #[must_use]
    pub fn new(
        service: AttemptService,
        session: QuizSession,
    ) -> (Self, watch::Receiver<SessionSnapshot>) {
        let (snapshots, snapshot_rx) = watch::channel(session.snapshot());
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        let runner = Self {
            service,
            session,
            ticker: None,
            tick_period: TICK_PERIOD,
            ticks_tx,
            ticks_rx,
            submit_tx,
            submit_rx,
            snapshots,
        };
        (runner, snapshot_rx)
    }

    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Run until the attempt completes, fails to load, or the user leaves.
    ///
    /// The ticker is released on every exit path.
    pub async fn run(mut self, mut commands: mpsc::Receiver<AttemptCommand>) -> AttemptOutcome {
        loop {
            self.sync_ticker();
            self.publish();
            if let Some(outcome) = self.finished() {
                self.release();
                return outcome;
            }

            tokio::select! {
                Some(handle) = self.ticks_rx.recv() => self.on_tick(handle),
                Some(outcome) = self.submit_rx.recv() => self.on_submitted(outcome),
                command = commands.recv() => match command {
                    None | Some(AttemptCommand::Leave) => {
                        info!(quiz_id = %self.session.quiz_id(), "attempt abandoned");
                        self.release();
                        self.publish();
                        return AttemptOutcome::Abandoned;
                    }
                    Some(command) => self.on_command(command),
                },
            }
        }
    }

    fn finished(&self) -> Option<AttemptOutcome> {
        match self.session.state() {
            SessionState::Completed { receipt, .. } => {
                Some(AttemptOutcome::Completed(receipt.clone()))
            }
            SessionState::Failed { message } => Some(AttemptOutcome::Failed(message.clone())),
            _ => None,
        }
    }

    fn on_tick(&mut self, handle: TimerHandle) {
        match self.session.tick(handle) {
            TickOutcome::Ticked { remaining_secs } => {
                debug!(remaining_secs, "tick");
            }
            TickOutcome::Expired(pending) => {
                info!(quiz_id = %pending.quiz_id, "time is up, submitting");
                self.dispatch(pending);
            }
            TickOutcome::Ignored => debug!(?handle, "ignored stale tick"),
        }
    }

    fn on_command(&mut self, command: AttemptCommand) {
        let result = match command {
            AttemptCommand::Select {
                question_id,
                option,
            } => self.session.select_answer(&question_id, &option),
            AttemptCommand::SelectCurrent(index) => self.session.select_current(index),
            AttemptCommand::Next => self.session.go_next(),
            AttemptCommand::Previous => self.session.go_previous(),
            AttemptCommand::JumpTo(index) => self.session.jump_to(index),
            AttemptCommand::RequestSubmit => {
                self.session
                    .request_submit()
                    .map(|request| match request {
                        SubmitRequest::Submitting(pending) => self.dispatch(pending),
                        SubmitRequest::ConfirmationRequired { unanswered } => {
                            debug!(unanswered, "confirmation required");
                        }
                    })
            }
            AttemptCommand::ConfirmSubmit => {
                self.session.confirm_submit().map(|pending| self.dispatch(pending))
            }
            AttemptCommand::CancelSubmit => self.session.cancel_submit(),
            AttemptCommand::Leave => Ok(()),
        };

        if let Err(err) = result {
            log_rejected(&err);
        }
    }

    fn on_submitted(&mut self, outcome: Result<SubmitReceipt, SubmitError>) {
        if let Err(err) = AttemptService::apply_outcome(&mut self.session, outcome) {
            warn!(error = %err, "submission outcome without a submission in flight");
        }
    }

    /// Send `pending` on a separate task so commands keep flowing meanwhile.
    fn dispatch(&self, pending: PendingSubmission) {
        let service = self.service.clone();
        let tx = self.submit_tx.clone();
        tokio::spawn(async move {
            let outcome = service.send(&pending).await;
            if tx.send(outcome).is_err() {
                debug!(quiz_id = %pending.quiz_id, "attempt closed before submission finished");
            }
        });
    }

    /// Keep exactly one ticker, bound to the session's current timer handle.
    fn sync_ticker(&mut self) {
        let wanted = self.session.timer_handle();
        let current = self.ticker.as_ref().map(Ticker::handle);
        if wanted == current {
            return;
        }
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        if let Some(handle) = wanted {
            self.ticker = Some(Ticker::spawn(handle, self.tick_period, self.ticks_tx.clone()));
        }
    }

    fn release(&mut self) {
        self.session.teardown();
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}

fn log_rejected(err: &SessionError) {
    match err {
        SessionError::AlreadySubmitting => debug!("submission already in flight"),
        other => debug!(error = %other, "command rejected"),
    }
}
