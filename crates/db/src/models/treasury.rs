//! Treasury ledger models.

use palisade_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One append-only ledger row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreasuryEntry {
    pub id: DbId,
    pub settlement_id: DbId,
    pub delta: i64,
    pub balance_after: i64,
    pub reason: String,
    pub recorded_at: Timestamp,
}

/// DTO for appending a ledger entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTreasuryEntry {
    pub delta: i64,
    pub reason: Option<String>,
}

/// Dashboard summary: current balance plus movement over the last day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreasurySummary {
    pub balance: i64,
    pub delta_24h: i64,
    pub entry_count: i64,
}
