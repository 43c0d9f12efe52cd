//! Repository for the `characters` table, including the conditional claim.

use palisade_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::{Character, ClaimDetails, UpsertCharacter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, entity_id, settlement_id, name, skills, top_profession, total_level, \
     claimed_by_account, claimed_at, display_name, primary_profession, secondary_profession, \
     created_at, updated_at";

/// CRUD, claim, and directory operations for characters.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a character or refresh its game-data fields if the
    /// `entity_id` already exists. Claim fields are never touched by sync.
    pub async fn upsert(pool: &PgPool, input: &UpsertCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters
                 (entity_id, settlement_id, name, skills, top_profession, total_level)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (entity_id) DO UPDATE SET
                 settlement_id = EXCLUDED.settlement_id,
                 name = EXCLUDED.name,
                 skills = EXCLUDED.skills,
                 top_profession = EXCLUDED.top_profession,
                 total_level = EXCLUDED.total_level,
                 updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(&input.entity_id)
            .bind(input.settlement_id)
            .bind(&input.name)
            .bind(&input.skills)
            .bind(&input.top_profession)
            .bind(input.total_level)
            .fetch_one(pool)
            .await
    }

    /// Find a character by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List characters for a settlement, ordered by total level descending.
    /// With `unclaimed_only`, returns only claimable (ownerless) rows.
    pub async fn list_by_settlement(
        pool: &PgPool,
        settlement_id: DbId,
        unclaimed_only: bool,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE settlement_id = $1
               AND ($2 = FALSE OR claimed_by_account IS NULL)
             ORDER BY total_level DESC, name ASC"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(settlement_id)
            .bind(unclaimed_only)
            .fetch_all(pool)
            .await
    }

    /// List claimed characters for a settlement (the member directory).
    pub async fn list_members(
        pool: &PgPool,
        settlement_id: DbId,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE settlement_id = $1 AND claimed_by_account IS NOT NULL
             ORDER BY total_level DESC, name ASC"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(settlement_id)
            .fetch_all(pool)
            .await
    }

    /// The character currently claimed by an account, if any.
    pub async fn find_by_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE claimed_by_account = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Claim a character for an account.
    ///
    /// The `claimed_by_account IS NULL` condition makes the claim a
    /// compare-and-set: it succeeds only if no one owned the character at
    /// commit time. Returns `None` when the character was already claimed
    /// (or does not exist) -- the caller distinguishes the two.
    pub async fn claim(
        pool: &PgPool,
        character_id: DbId,
        account_id: DbId,
        details: &ClaimDetails,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                 claimed_by_account = $2,
                 claimed_at = NOW(),
                 display_name = $3,
                 primary_profession = $4,
                 secondary_profession = $5,
                 updated_at = NOW()
             WHERE id = $1 AND claimed_by_account IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(character_id)
            .bind(account_id)
            .bind(&details.display_name)
            .bind(&details.primary_profession)
            .bind(&details.secondary_profession)
            .fetch_optional(pool)
            .await
    }

    /// Release whatever character the account currently holds. Returns
    /// `true` if a claim was released.
    pub async fn release_by_account(pool: &PgPool, account_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE characters SET
                 claimed_by_account = NULL,
                 claimed_at = NULL,
                 display_name = NULL,
                 primary_profession = NULL,
                 secondary_profession = NULL,
                 updated_at = NOW()
             WHERE claimed_by_account = $1",
        )
        .bind(account_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Release every character the account holds except `keep`. Used after
    /// a successful switch so the old claim is dropped only once the new
    /// one is committed.
    pub async fn release_others(
        pool: &PgPool,
        account_id: DbId,
        keep: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE characters SET
                 claimed_by_account = NULL,
                 claimed_at = NULL,
                 display_name = NULL,
                 primary_profession = NULL,
                 secondary_profession = NULL,
                 updated_at = NOW()
             WHERE claimed_by_account = $1 AND id != $2",
        )
        .bind(account_id)
        .bind(keep)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
