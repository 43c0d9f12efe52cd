//! Periodic treasury polling for the dashboard.
//!
//! Publishes the latest [`TreasurySummary`] on a watch channel. A fetch
//! failure keeps the previous value on display and is retried on the next
//! tick; shutdown goes through the returned [`CancellationToken`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use palisade_core::types::DbId;

use crate::api::{SettlementApi, TreasurySummary};

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Background poller for a settlement's treasury summary.
pub struct TreasuryPoller {
    api: Arc<dyn SettlementApi>,
    settlement_id: DbId,
    interval: Duration,
}

impl TreasuryPoller {
    pub fn new(api: Arc<dyn SettlementApi>, settlement_id: DbId) -> Self {
        Self {
            api,
            settlement_id,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start polling. The first fetch happens immediately; the receiver
    /// holds `None` until it lands.
    pub fn spawn(self) -> (watch::Receiver<Option<TreasurySummary>>, CancellationToken) {
        let (tx, rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            self.run(tx, token).await;
        });
        (rx, cancel)
    }

    async fn run(self, tx: watch::Sender<Option<TreasurySummary>>, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(settlement_id = self.settlement_id, "Treasury poller stopped");
                    return;
                }
                _ = ticker.tick() => {
                    match self.api.fetch_treasury_summary(self.settlement_id).await {
                        Ok(summary) => {
                            tx.send_replace(Some(summary));
                        }
                        Err(err) => {
                            // Keep showing the last good value.
                            tracing::warn!(
                                settlement_id = self.settlement_id,
                                error = %err,
                                "Treasury poll failed"
                            );
                        }
                    }
                }
            }
        }
    }
}
