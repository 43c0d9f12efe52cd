//! Repository for the `settlements` table.

use palisade_core::types::DbId;
use sqlx::PgPool;

use crate::models::settlement::{Settlement, UpsertSettlement};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, entity_id, name, tier, treasury, supplies, tiles, population, \
     leader_name, last_synced_at, created_at, updated_at";

/// CRUD and search operations for settlements.
pub struct SettlementRepo;

impl SettlementRepo {
    /// Insert a settlement or replace its game-data fields if the
    /// `entity_id` already exists. Sync never patches fields piecemeal.
    pub async fn upsert(pool: &PgPool, input: &UpsertSettlement) -> Result<Settlement, sqlx::Error> {
        let query = format!(
            "INSERT INTO settlements
                 (entity_id, name, tier, treasury, supplies, tiles, population, leader_name, last_synced_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
             ON CONFLICT (entity_id) DO UPDATE SET
                 name = EXCLUDED.name,
                 tier = EXCLUDED.tier,
                 treasury = EXCLUDED.treasury,
                 supplies = EXCLUDED.supplies,
                 tiles = EXCLUDED.tiles,
                 population = EXCLUDED.population,
                 leader_name = EXCLUDED.leader_name,
                 last_synced_at = NOW(),
                 updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Settlement>(&query)
            .bind(&input.entity_id)
            .bind(&input.name)
            .bind(input.tier)
            .bind(input.treasury)
            .bind(input.supplies)
            .bind(input.tiles)
            .bind(input.population)
            .bind(&input.leader_name)
            .fetch_one(pool)
            .await
    }

    /// Find a settlement by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Settlement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settlements WHERE id = $1");
        sqlx::query_as::<_, Settlement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a settlement by its game-assigned entity ID.
    pub async fn find_by_entity_id(
        pool: &PgPool,
        entity_id: &str,
    ) -> Result<Option<Settlement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settlements WHERE entity_id = $1");
        sqlx::query_as::<_, Settlement>(&query)
            .bind(entity_id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive name search, best matches (shortest names) first.
    pub async fn search_by_name(
        pool: &PgPool,
        query_text: &str,
        limit: i64,
    ) -> Result<Vec<Settlement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM settlements
             WHERE name ILIKE '%' || $1 || '%'
             ORDER BY LENGTH(name) ASC, name ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, Settlement>(&query)
            .bind(query_text)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
