//! Character entity model and DTOs.

use palisade_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A character row from the `characters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    /// Identifier assigned by the game.
    pub entity_id: String,
    pub settlement_id: DbId,
    pub name: String,
    /// Flat skill map from game data: `{ "Forestry": 30, ... }`.
    pub skills: serde_json::Value,
    pub top_profession: Option<String>,
    pub total_level: i64,
    /// Account that claimed this character; `None` means unclaimed.
    pub claimed_by_account: Option<DbId>,
    pub claimed_at: Option<Timestamp>,
    pub display_name: Option<String>,
    pub primary_profession: Option<String>,
    pub secondary_profession: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting or re-syncing a character from game data.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCharacter {
    pub entity_id: String,
    pub settlement_id: DbId,
    pub name: String,
    pub skills: serde_json::Value,
    pub top_profession: Option<String>,
    pub total_level: i64,
}

/// Optional claim-time fields supplied by the claiming user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimDetails {
    pub display_name: Option<String>,
    pub primary_profession: Option<String>,
    pub secondary_profession: Option<String>,
}
