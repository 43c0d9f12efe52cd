//! Progress stages for the settlement data sync.
//!
//! The sync is a single slow call upstream; the UI shows staged progress
//! while it runs. The non-terminal stages here are client-simulated from
//! elapsed time. The terminal outcome (`Completed` / `Failed`) is
//! authoritative and comes only from the real response -- the simulator must
//! never produce it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stage of the settlement sync, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    Connecting,
    SyncingMembers,
    SyncingCitizens,
    Finalizing,
    Completed,
    Failed,
}

impl SyncStage {
    /// Fixed progress percentage shown for this stage.
    pub fn percent(self) -> u8 {
        match self {
            Self::Connecting => 10,
            Self::SyncingMembers => 35,
            Self::SyncingCitizens => 65,
            Self::Finalizing => 90,
            Self::Completed => 100,
            Self::Failed => 100,
        }
    }

    /// Human-readable label for this stage.
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting to settlement…",
            Self::SyncingMembers => "Syncing members…",
            Self::SyncingCitizens => "Syncing citizens…",
            Self::Finalizing => "Finalizing…",
            Self::Completed => "Completed",
            Self::Failed => "Sync failed",
        }
    }

    /// Whether this stage is a terminal outcome rather than a simulated
    /// in-progress stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The non-terminal stages, in the order the simulator walks them.
pub const SIMULATED_STAGES: [SyncStage; 4] = [
    SyncStage::Connecting,
    SyncStage::SyncingMembers,
    SyncStage::SyncingCitizens,
    SyncStage::Finalizing,
];

/// Expected total sync duration used to pace the simulator when the caller
/// has no better estimate.
pub const DEFAULT_EXPECTED_SYNC: Duration = Duration::from_secs(8);

/// Map elapsed time onto a simulated (non-terminal) stage.
///
/// The simulated stages are spread evenly across `expected_total`, and the
/// result saturates at `Finalizing` -- a sync that runs long simply sits on
/// the last simulated stage until the authoritative response arrives.
pub fn stage_for_elapsed(elapsed: Duration, expected_total: Duration) -> SyncStage {
    let n = SIMULATED_STAGES.len() as u32;
    let slot = expected_total / n;
    if slot.is_zero() {
        return SyncStage::Finalizing;
    }
    let idx = (elapsed.as_millis() / slot.as_millis()) as usize;
    SIMULATED_STAGES[idx.min(SIMULATED_STAGES.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_progress_with_time() {
        let total = Duration::from_secs(8);
        assert_eq!(stage_for_elapsed(Duration::ZERO, total), SyncStage::Connecting);
        assert_eq!(
            stage_for_elapsed(Duration::from_secs(3), total),
            SyncStage::SyncingMembers
        );
        assert_eq!(
            stage_for_elapsed(Duration::from_secs(5), total),
            SyncStage::SyncingCitizens
        );
        assert_eq!(
            stage_for_elapsed(Duration::from_secs(7), total),
            SyncStage::Finalizing
        );
    }

    #[test]
    fn simulator_never_reaches_a_terminal_stage() {
        let total = Duration::from_secs(8);
        for secs in 0..120 {
            let stage = stage_for_elapsed(Duration::from_secs(secs), total);
            assert!(!stage.is_terminal(), "at {secs}s got {stage:?}");
        }
    }

    #[test]
    fn overlong_sync_saturates_at_finalizing() {
        let total = Duration::from_secs(8);
        assert_eq!(
            stage_for_elapsed(Duration::from_secs(600), total),
            SyncStage::Finalizing
        );
    }

    #[test]
    fn zero_expected_total_is_safe() {
        assert_eq!(
            stage_for_elapsed(Duration::from_secs(1), Duration::ZERO),
            SyncStage::Finalizing
        );
    }

    #[test]
    fn percentages_are_monotonic() {
        let mut last = 0;
        for stage in SIMULATED_STAGES {
            assert!(stage.percent() > last);
            last = stage.percent();
        }
        assert_eq!(SyncStage::Completed.percent(), 100);
    }
}
