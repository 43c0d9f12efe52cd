//! Repository for settlement projects and their contributions.

use palisade_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{
    CreateContribution, CreateProject, Project, ProjectContribution, UpdateProject,
};

const COLUMNS: &str =
    "id, settlement_id, name, description, status, required_tier, created_at, updated_at";

const CONTRIBUTION_COLUMNS: &str =
    "id, project_id, character_id, item_name, quantity, contributed_at";

pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project for a settlement.
    pub async fn create(
        pool: &PgPool,
        settlement_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (settlement_id, name, description, required_tier)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, 1))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(settlement_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.required_tier)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects for a settlement, active first, then newest.
    pub async fn list_by_settlement(
        pool: &PgPool,
        settlement_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE settlement_id = $1
             ORDER BY (status = 'active') DESC, created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(settlement_id)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields are applied. Returns `None`
    /// if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 status = COALESCE($4, status),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Record a contribution toward a project.
    pub async fn add_contribution(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateContribution,
    ) -> Result<ProjectContribution, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_contributions (project_id, character_id, item_name, quantity)
             VALUES ($1, $2, $3, $4)
             RETURNING {CONTRIBUTION_COLUMNS}"
        );
        sqlx::query_as::<_, ProjectContribution>(&query)
            .bind(project_id)
            .bind(input.character_id)
            .bind(&input.item_name)
            .bind(input.quantity)
            .fetch_one(pool)
            .await
    }

    /// All contributions for a project, newest first.
    pub async fn list_contributions(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectContribution>, sqlx::Error> {
        let query = format!(
            "SELECT {CONTRIBUTION_COLUMNS} FROM project_contributions
             WHERE project_id = $1
             ORDER BY contributed_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectContribution>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
