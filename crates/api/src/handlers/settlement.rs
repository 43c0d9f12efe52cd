//! Handlers for settlement search, lookup, and sync.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use palisade_core::error::CoreError;
use palisade_core::flow::MIN_SEARCH_QUERY_LEN;
use palisade_core::types::DbId;
use palisade_db::models::settlement::{Settlement, UpsertSettlement};
use palisade_db::repositories::SettlementRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthAccount;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::sync::{self, SyncMode};

/// Maximum settlements returned by one search.
const SEARCH_LIMIT: i64 = 20;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a settlement exists, returning the full row.
pub(crate) async fn ensure_settlement_exists(
    pool: &sqlx::PgPool,
    id: DbId,
) -> AppResult<Settlement> {
    SettlementRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Settlement",
                id,
            })
        })
}

// ---------------------------------------------------------------------------
// GET /settlements?q=
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Search settlements by name.
///
/// A query shorter than two characters returns an empty list without
/// touching the database or the game API. Known settlements are served
/// locally; when nothing matches, the game API is consulted and any
/// candidates it returns are upserted so the confirm step can reference
/// them by internal id.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();

    if query.chars().count() < MIN_SEARCH_QUERY_LEN {
        return Ok(Json(DataResponse {
            data: Vec::<Settlement>::new(),
        }));
    }

    let mut results = SettlementRepo::search_by_name(&state.pool, query, SEARCH_LIMIT).await?;

    if results.is_empty() {
        let candidates = state
            .game_client
            .search_settlements(query)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        for candidate in candidates.into_iter().take(SEARCH_LIMIT as usize) {
            let row = SettlementRepo::upsert(
                &state.pool,
                &UpsertSettlement {
                    entity_id: candidate.entity_id,
                    name: candidate.name,
                    tier: candidate.tier,
                    treasury: candidate.treasury,
                    supplies: candidate.supplies,
                    tiles: candidate.tiles,
                    population: candidate.population,
                    leader_name: candidate.leader_name,
                },
            )
            .await?;
            results.push(row);
        }

        tracing::debug!(query, count = results.len(), "Settlement search went upstream");
    }

    Ok(Json(DataResponse { data: results }))
}

// ---------------------------------------------------------------------------
// GET /settlements/{id}
// ---------------------------------------------------------------------------

/// Get a single settlement by ID.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let settlement = ensure_settlement_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: settlement }))
}

// ---------------------------------------------------------------------------
// POST /settlements/{id}/sync
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SyncParams {
    #[serde(default)]
    pub mode: SyncMode,
}

/// Run a data sync for a settlement against the game API.
///
/// Slow (multiple round-trips upstream); progress staging is the client's
/// concern, this endpoint only reports the authoritative outcome.
pub async fn sync(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(id): Path<DbId>,
    Query(params): Query<SyncParams>,
) -> AppResult<impl IntoResponse> {
    let settlement = ensure_settlement_exists(&state.pool, id).await?;

    let report =
        sync::sync_settlement(&state.pool, state.game_client.as_ref(), &settlement, params.mode)
            .await?;

    tracing::info!(
        settlement_id = id,
        account_id = auth.account_id,
        mode = ?params.mode,
        "Settlement synced"
    );

    Ok(Json(DataResponse { data: report }))
}
