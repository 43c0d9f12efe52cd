//! Settlement project models and DTOs.

use palisade_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A coordination project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub settlement_id: DbId,
    pub name: String,
    pub description: String,
    /// One of `planned`, `active`, `completed`, `cancelled`.
    pub status: String,
    pub required_tier: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub required_tier: Option<i16>,
}

/// DTO for updating a project. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// One contribution of items toward a project.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectContribution {
    pub id: DbId,
    pub project_id: DbId,
    pub character_id: DbId,
    pub item_name: String,
    pub quantity: i32,
    pub contributed_at: Timestamp,
}

/// DTO for recording a contribution.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContribution {
    pub character_id: DbId,
    pub item_name: String,
    pub quantity: i32,
}
