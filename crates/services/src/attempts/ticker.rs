use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use quiz_core::TimerHandle;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Periodic task that sends `handle` once per period.
///
/// The task is aborted when the ticker is stopped or dropped.
#[derive(Debug)]
pub struct Ticker {
    handle: TimerHandle,
    task: JoinHandle<()>,
}

impl Ticker {
    /// Must be called from inside a tokio runtime. The first tick arrives one
    /// full period after spawning.
    #[must_use]
    pub fn spawn(handle: TimerHandle, period: Duration, tx: UnboundedSender<TimerHandle>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(handle).is_err() {
                    break;
                }
            }
        });
        Self { handle, task }
    }

    #[must_use]
    pub fn handle(&self) -> TimerHandle {
        self.handle
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
