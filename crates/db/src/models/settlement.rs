//! Settlement entity model and DTOs.

use palisade_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A settlement row from the `settlements` table.
///
/// Settlement rows are replaced wholesale by the sync service; nothing in
/// the application patches individual game-data fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Settlement {
    pub id: DbId,
    /// Identifier assigned by the game.
    pub entity_id: String,
    pub name: String,
    pub tier: i16,
    pub treasury: i64,
    pub supplies: i64,
    pub tiles: i32,
    pub population: i32,
    pub leader_name: String,
    pub last_synced_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting or re-syncing a settlement from game data.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSettlement {
    pub entity_id: String,
    pub name: String,
    pub tier: i16,
    pub treasury: i64,
    pub supplies: i64,
    pub tiles: i32,
    pub population: i32,
    pub leader_name: String,
}
