//! Invite code model.

use palisade_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// The single active invite code for a settlement.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InviteCode {
    pub id: DbId,
    pub settlement_id: DbId,
    pub code: String,
    pub created_at: Timestamp,
}
