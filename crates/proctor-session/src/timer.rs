//! The per-session countdown task.
//!
//! One spawned task per session delivers a `Tick` into the session's command
//! queue once per second. The countdown itself (remaining seconds, expiry
//! detection) lives in the state machine; this task is only the clock.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::session::Command;

/// Handle to the spawned ticker. Aborting it is how a completed session
/// guarantees no dangling tick fires after finalize.
pub(crate) struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    pub(crate) fn spawn(tx: mpsc::UnboundedSender<Command>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately; skip it so the budget
            // starts draining one full second after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Command::Tick).is_err() {
                    // Session actor is gone; nothing left to time.
                    break;
                }
            }
        });
        Self { handle }
    }

    pub(crate) fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
