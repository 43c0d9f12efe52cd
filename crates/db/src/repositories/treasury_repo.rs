//! Repository for the append-only `treasury_entries` ledger.

use palisade_core::types::DbId;
use sqlx::PgPool;

use crate::models::treasury::{TreasuryEntry, TreasurySummary};

const COLUMNS: &str = "id, settlement_id, delta, balance_after, reason, recorded_at";

pub struct TreasuryRepo;

impl TreasuryRepo {
    /// Append a ledger entry. Appends for one settlement serialize on a row
    /// lock of the settlement itself, so each entry's `balance_after` builds
    /// on the committed predecessor rather than a stale read.
    pub async fn append(
        pool: &PgPool,
        settlement_id: DbId,
        delta: i64,
        reason: &str,
    ) -> Result<TreasuryEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SELECT id FROM settlements WHERE id = $1 FOR UPDATE")
            .bind(settlement_id)
            .execute(&mut *tx)
            .await?;
        let query = format!(
            "INSERT INTO treasury_entries (settlement_id, delta, balance_after, reason)
             VALUES (
                 $1,
                 $2,
                 COALESCE((SELECT balance_after FROM treasury_entries
                           WHERE settlement_id = $1
                           ORDER BY id DESC LIMIT 1), 0) + $2,
                 $3
             )
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TreasuryEntry>(&query)
            .bind(settlement_id)
            .bind(delta)
            .bind(reason)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// The most recent `limit` entries, newest first. Feeds the dashboard
    /// chart.
    pub async fn list_recent(
        pool: &PgPool,
        settlement_id: DbId,
        limit: i64,
    ) -> Result<Vec<TreasuryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM treasury_entries
             WHERE settlement_id = $1
             ORDER BY recorded_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, TreasuryEntry>(&query)
            .bind(settlement_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Current balance, 24-hour movement, and total entry count.
    pub async fn summary(
        pool: &PgPool,
        settlement_id: DbId,
    ) -> Result<TreasurySummary, sqlx::Error> {
        sqlx::query_as::<_, TreasurySummary>(
            "SELECT
                 COALESCE((SELECT balance_after FROM treasury_entries
                           WHERE settlement_id = $1
                           ORDER BY id DESC LIMIT 1), 0) AS balance,
                 COALESCE((SELECT SUM(delta) FROM treasury_entries
                           WHERE settlement_id = $1
                             AND recorded_at > NOW() - INTERVAL '24 hours'), 0)::BIGINT AS delta_24h,
                 (SELECT COUNT(*) FROM treasury_entries WHERE settlement_id = $1) AS entry_count",
        )
        .bind(settlement_id)
        .fetch_one(pool)
        .await
    }
}
