//! Handlers for the treasury ledger.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use palisade_core::types::DbId;
use palisade_db::models::treasury::CreateTreasuryEntry;
use palisade_db::repositories::TreasuryRepo;

use crate::error::AppResult;
use crate::handlers::settlement::ensure_settlement_exists;
use crate::middleware::auth::AuthAccount;
use crate::query::clamp_limit;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of ledger rows returned for the chart.
const DEFAULT_LIMIT: i64 = 50;
/// Hard cap on ledger rows per request.
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// GET /settlements/{id}/treasury?limit=
// ---------------------------------------------------------------------------

/// Recent ledger entries, newest first. Polled by the dashboard chart.
pub async fn list_entries(
    State(state): State<AppState>,
    Path(settlement_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    ensure_settlement_exists(&state.pool, settlement_id).await?;

    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let entries = TreasuryRepo::list_recent(&state.pool, settlement_id, limit).await?;

    Ok(Json(DataResponse { data: entries }))
}

// ---------------------------------------------------------------------------
// GET /settlements/{id}/treasury/summary
// ---------------------------------------------------------------------------

/// Current balance and 24-hour movement.
pub async fn summary(
    State(state): State<AppState>,
    Path(settlement_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_settlement_exists(&state.pool, settlement_id).await?;

    let summary = TreasuryRepo::summary(&state.pool, settlement_id).await?;

    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// POST /settlements/{id}/treasury
// ---------------------------------------------------------------------------

/// Append a manual ledger entry (donations, purchases logged by officers).
pub async fn append_entry(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(settlement_id): Path<DbId>,
    Json(body): Json<CreateTreasuryEntry>,
) -> AppResult<impl IntoResponse> {
    ensure_settlement_exists(&state.pool, settlement_id).await?;

    let reason = body.reason.unwrap_or_default();
    let entry = TreasuryRepo::append(&state.pool, settlement_id, body.delta, &reason).await?;

    tracing::info!(
        settlement_id,
        account_id = auth.account_id,
        delta = body.delta,
        "Treasury entry appended"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}
