//! Simulated progress for the settlement sync.
//!
//! The sync endpoint is one slow call with no intermediate events, so while
//! it runs the controller publishes time-based stages on a watch channel.
//! Only the non-terminal stages are ever simulated; the controller publishes
//! `Completed` or `Failed` itself once the real response is in.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use palisade_core::sync_progress::{stage_for_elapsed, SyncStage};

/// Snapshot of sync progress as a UI should render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncProgress {
    pub stage: SyncStage,
    pub percent: u8,
    pub label: &'static str,
}

impl From<SyncStage> for SyncProgress {
    fn from(stage: SyncStage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            label: stage.label(),
        }
    }
}

impl Default for SyncProgress {
    fn default() -> Self {
        SyncStage::Connecting.into()
    }
}

/// How often the simulator re-evaluates the current stage.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Publish simulated stages until cancelled.
///
/// Runs as a task alongside the real sync call; the controller cancels and
/// joins it before publishing the terminal stage, so a stale simulated
/// stage can never overwrite the outcome.
pub(crate) async fn simulate(
    tx: Arc<watch::Sender<SyncProgress>>,
    expected_total: Duration,
    cancel: CancellationToken,
) {
    let started = tokio::time::Instant::now();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {
                let stage = stage_for_elapsed(started.elapsed(), expected_total);
                tx.send_replace(stage.into());
            }
        }
    }
}
