//! Repository for the `invite_codes` table.
//!
//! At most one active code exists per settlement; replacing it is an upsert
//! keyed on `settlement_id` so regeneration atomically invalidates the
//! previous code.

use palisade_core::types::DbId;
use sqlx::PgPool;

use crate::models::invite_code::InviteCode;

const COLUMNS: &str = "id, settlement_id, code, created_at";

pub struct InviteCodeRepo;

impl InviteCodeRepo {
    /// The active code for a settlement, if one exists.
    pub async fn find_by_settlement(
        pool: &PgPool,
        settlement_id: DbId,
    ) -> Result<Option<InviteCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invite_codes WHERE settlement_id = $1");
        sqlx::query_as::<_, InviteCode>(&query)
            .bind(settlement_id)
            .fetch_optional(pool)
            .await
    }

    /// Look up a code (join flow: a visitor redeems a code).
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<InviteCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invite_codes WHERE code = $1");
        sqlx::query_as::<_, InviteCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Set the active code for a settlement, replacing any previous one.
    pub async fn replace(
        pool: &PgPool,
        settlement_id: DbId,
        code: &str,
    ) -> Result<InviteCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO invite_codes (settlement_id, code)
             VALUES ($1, $2)
             ON CONFLICT (settlement_id) DO UPDATE SET
                 code = EXCLUDED.code,
                 created_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InviteCode>(&query)
            .bind(settlement_id)
            .bind(code)
            .fetch_one(pool)
            .await
    }
}
