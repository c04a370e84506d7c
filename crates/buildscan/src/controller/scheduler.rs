//! Interval-driven status polling.
//!
//! The loop fires a status fetch immediately and then once per period.
//! A tick does not wait for the previous fetch, so fetches may overlap and
//! finish out of order; `poll_once` guards each one with the job epoch.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

use super::{poll_once, Inner};

/// Owns a running poll loop. Dropping the handle aborts the loop together
/// with every fetch it still has in flight.
#[derive(Debug)]
pub(crate) struct PollHandle {
    epoch: u64,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn spawn(inner: Weak<Inner>, epoch: u64, period: Duration) -> Self {
        let task = tokio::spawn(run(inner, epoch, period));
        log::debug!("Poll scheduler armed for epoch {}", epoch);
        Self { epoch, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
        log::debug!("Poll scheduler for epoch {} stopped", self.epoch);
    }
}

async fn run(inner: Weak<Inner>, epoch: u64, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                if !inner.is_polling(epoch) {
                    break;
                }
                let span = tracing::debug_span!("poll", epoch);
                in_flight.spawn(
                    async move {
                        if let Err(e) = poll_once(&inner, epoch).await {
                            log::debug!("Poll tick ended with: {}", e);
                        }
                    }
                    .instrument(span),
                );
            }
            Some(joined) = in_flight.join_next() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        log::error!("Poll task panicked: {}", e);
                    }
                }
            }
        }
    }
}
