//! Repository for the `research_nodes` table.

use palisade_core::types::DbId;
use sqlx::PgPool;

use crate::models::research::ResearchNode;

const COLUMNS: &str = "id, settlement_id, name, tier, status, unlocked_at";

pub struct ResearchRepo;

impl ResearchRepo {
    /// Seed or refresh a node from game data. Completion status is local
    /// state and is preserved on conflict.
    pub async fn upsert(
        pool: &PgPool,
        settlement_id: DbId,
        name: &str,
        tier: i16,
    ) -> Result<ResearchNode, sqlx::Error> {
        let query = format!(
            "INSERT INTO research_nodes (settlement_id, name, tier)
             VALUES ($1, $2, $3)
             ON CONFLICT (settlement_id, name) DO UPDATE SET tier = EXCLUDED.tier
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResearchNode>(&query)
            .bind(settlement_id)
            .bind(name)
            .bind(tier)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ResearchNode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM research_nodes WHERE id = $1");
        sqlx::query_as::<_, ResearchNode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The full tree for a settlement, tier ascending then name.
    pub async fn list_by_settlement(
        pool: &PgPool,
        settlement_id: DbId,
    ) -> Result<Vec<ResearchNode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM research_nodes
             WHERE settlement_id = $1
             ORDER BY tier ASC, name ASC"
        );
        sqlx::query_as::<_, ResearchNode>(&query)
            .bind(settlement_id)
            .fetch_all(pool)
            .await
    }

    /// Unlock all locked nodes whose tier the settlement has reached.
    /// Called after a sync updates the settlement tier. Returns the number
    /// of nodes that became available.
    pub async fn refresh_availability(
        pool: &PgPool,
        settlement_id: DbId,
        settlement_tier: i16,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE research_nodes SET status = 'available', unlocked_at = NOW()
             WHERE settlement_id = $1 AND status = 'locked' AND tier <= $2",
        )
        .bind(settlement_id)
        .bind(settlement_tier)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark an available node completed. Conditional on status so a locked
    /// or already-completed node is not silently overwritten; returns
    /// `None` when the condition did not hold.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<Option<ResearchNode>, sqlx::Error> {
        let query = format!(
            "UPDATE research_nodes SET status = 'completed'
             WHERE id = $1 AND status = 'available'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResearchNode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
