//! Handlers for settlement coordination projects.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use palisade_core::error::CoreError;
use palisade_core::types::DbId;
use palisade_db::models::project::{CreateContribution, CreateProject, UpdateProject};
use palisade_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::settlement::ensure_settlement_exists;
use crate::middleware::auth::AuthAccount;
use crate::response::DataResponse;
use crate::state::AppState;

/// Statuses a project can be moved to by hand.
const VALID_STATUSES: [&str; 4] = ["planned", "active", "completed", "cancelled"];

// ---------------------------------------------------------------------------
// GET /settlements/{id}/projects
// ---------------------------------------------------------------------------

pub async fn list_by_settlement(
    State(state): State<AppState>,
    Path(settlement_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_settlement_exists(&state.pool, settlement_id).await?;

    let projects = ProjectRepo::list_by_settlement(&state.pool, settlement_id).await?;

    Ok(Json(DataResponse { data: projects }))
}

// ---------------------------------------------------------------------------
// POST /settlements/{id}/projects
// ---------------------------------------------------------------------------

/// Create a project for a settlement.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(settlement_id): Path<DbId>,
    Json(body): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    ensure_settlement_exists(&state.pool, settlement_id).await?;

    if body.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project name must not be empty".to_string(),
        )));
    }

    let project = ProjectRepo::create(&state.pool, settlement_id, &body).await?;

    tracing::info!(
        settlement_id,
        project_id = project.id,
        account_id = auth.account_id,
        "Project created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}
// ---------------------------------------------------------------------------

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id,
            })
        })?;

    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// PUT /projects/{id}
// ---------------------------------------------------------------------------

pub async fn update(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateProject>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &body.status {
        if !VALID_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Invalid project status '{status}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))));
        }
    }

    let project = ProjectRepo::update(&state.pool, id, &body)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id,
            })
        })?;

    tracing::info!(project_id = id, account_id = auth.account_id, "Project updated");

    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/contributions
// ---------------------------------------------------------------------------

pub async fn list_contributions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id,
            })
        })?;

    let contributions = ProjectRepo::list_contributions(&state.pool, id).await?;

    Ok(Json(DataResponse { data: contributions }))
}

// ---------------------------------------------------------------------------
// POST /projects/{id}/contributions
// ---------------------------------------------------------------------------

/// Record items contributed toward a project.
pub async fn add_contribution(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(id): Path<DbId>,
    Json(body): Json<CreateContribution>,
) -> AppResult<impl IntoResponse> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id,
            })
        })?;

    if body.quantity <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Contribution quantity must be positive".to_string(),
        )));
    }

    let contribution = ProjectRepo::add_contribution(&state.pool, id, &body).await?;

    tracing::info!(
        project_id = id,
        character_id = body.character_id,
        account_id = auth.account_id,
        quantity = body.quantity,
        "Contribution recorded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: contribution })))
}
