//! The aggregation barrier: waits for every dispatch of a cycle to settle.

use std::time::Duration;

use serde::Serialize;
use tokio::{task::JoinSet, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::DispatchOutcome;

/// How the dispatches of one cycle settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BarrierReport {
    /// Dispatches the barrier waited on.
    pub dispatched: usize,
    /// Dispatches whose batches were accumulated.
    pub delivered: usize,
    /// Dispatches whose batches arrived after the cycle ended.
    pub discarded: usize,
    /// Dispatches that failed, including panicked tasks.
    pub failed: usize,
    /// Dispatches aborted by the cycle deadline or by cancellation.
    pub aborted: usize,
}

impl BarrierReport {
    /// Dispatches that contributed nothing.
    pub fn vacuous(&self) -> usize {
        self.discarded + self.failed + self.aborted
    }

    /// Counts one settled dispatch.
    fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Delivered => self.delivered += 1,
            DispatchOutcome::Discarded => self.discarded += 1,
            DispatchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Result of [`await_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierOutcome {
    /// Every dispatch settled, or the deadline aborted the rest. Filtering may run.
    Completed(BarrierReport),
    /// The cycle was superseded. Nothing downstream may run.
    Cancelled(BarrierReport),
}

impl BarrierOutcome {
    /// The report, whichever way the barrier resolved.
    pub fn report(&self) -> &BarrierReport {
        match self {
            Self::Completed(report) | Self::Cancelled(report) => report,
        }
    }
}

/// Waits until every task in `dispatches` has settled.
///
/// Resolves early only in two cases. When `cancel` fires, the remaining tasks are aborted and
/// the outcome is [`BarrierOutcome::Cancelled`]. When `deadline` elapses, the remaining tasks are
/// aborted, counted as vacuous, and the outcome is still [`BarrierOutcome::Completed`].
pub async fn await_all(
    mut dispatches: JoinSet<DispatchOutcome>,
    cancel: &CancellationToken,
    deadline: Duration,
) -> BarrierOutcome {
    let mut report = BarrierReport {
        dispatched: dispatches.len(),
        ..BarrierReport::default()
    };
    let expired = sleep(deadline);
    tokio::pin!(expired);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                report.aborted = dispatches.len();
                dispatches.shutdown().await;
                return BarrierOutcome::Cancelled(report);
            }
            joined = dispatches.join_next() => match joined {
                None => return BarrierOutcome::Completed(report),
                Some(Ok(outcome)) => report.record(&outcome),
                Some(Err(error)) => {
                    warn!(%error, "dispatch task did not finish");
                    report.failed += 1;
                }
            },
            () = &mut expired => {
                report.aborted = dispatches.len();
                warn!(
                    aborted = report.aborted,
                    deadline_ms = deadline.as_millis(),
                    "cycle deadline elapsed, aborting unsettled dispatches"
                );
                dispatches.shutdown().await;
                return BarrierOutcome::Completed(report);
            }
        }
    }
}
