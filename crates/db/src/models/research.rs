//! Research tree models.

use palisade_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A node in a settlement's research tree.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResearchNode {
    pub id: DbId,
    pub settlement_id: DbId,
    pub name: String,
    pub tier: i16,
    /// One of `locked`, `available`, `completed`.
    pub status: String,
    pub unlocked_at: Option<Timestamp>,
}
