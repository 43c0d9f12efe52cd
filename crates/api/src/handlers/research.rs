//! Handlers for the research tree.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use palisade_core::error::CoreError;
use palisade_core::types::DbId;
use palisade_db::repositories::ResearchRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::settlement::ensure_settlement_exists;
use crate::middleware::auth::AuthAccount;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /settlements/{id}/research
// ---------------------------------------------------------------------------

/// The settlement's research tree, tier ascending.
pub async fn list_by_settlement(
    State(state): State<AppState>,
    Path(settlement_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_settlement_exists(&state.pool, settlement_id).await?;

    let nodes = ResearchRepo::list_by_settlement(&state.pool, settlement_id).await?;

    Ok(Json(DataResponse { data: nodes }))
}

// ---------------------------------------------------------------------------
// POST /research/{id}/complete
// ---------------------------------------------------------------------------

/// Mark an available research node completed.
///
/// Locked nodes (settlement tier too low) and already-completed nodes are
/// rejected rather than silently rewritten.
pub async fn complete(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let node = ResearchRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "ResearchNode",
                id,
            })
        })?;

    let completed = ResearchRepo::complete(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Research node '{}' is {} and cannot be completed",
            node.name, node.status
        )))
    })?;

    tracing::info!(
        research_id = id,
        account_id = auth.account_id,
        name = %completed.name,
        "Research node completed"
    );

    Ok(Json(DataResponse { data: completed }))
}
