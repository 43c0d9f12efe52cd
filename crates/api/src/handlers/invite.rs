//! Handlers for invite codes.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use palisade_core::invite_code::{format_invite_code, generate_invite_code, is_valid_invite_code};
use palisade_core::types::{DbId, Timestamp};
use palisade_db::models::invite_code::InviteCode;
use palisade_db::repositories::{InviteCodeRepo, SettlementRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::settlement::ensure_settlement_exists;
use crate::middleware::auth::AuthAccount;
use crate::response::DataResponse;
use crate::state::AppState;

/// Invite code with display formatting and settlement context attached.
#[derive(Debug, Serialize)]
pub struct InviteCodeView {
    pub code: String,
    pub formatted_code: String,
    pub created_at: Timestamp,
    pub settlement_id: DbId,
    pub settlement_name: String,
}

impl InviteCodeView {
    fn new(row: InviteCode, settlement_name: String) -> Self {
        Self {
            formatted_code: format_invite_code(&row.code),
            code: row.code,
            created_at: row.created_at,
            settlement_id: row.settlement_id,
            settlement_name,
        }
    }
}

// ---------------------------------------------------------------------------
// GET /settlements/{id}/invite-code
// ---------------------------------------------------------------------------

/// The settlement's active invite code, generating one on first fetch.
pub async fn get_current(
    State(state): State<AppState>,
    Path(settlement_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let settlement = ensure_settlement_exists(&state.pool, settlement_id).await?;

    let row = match InviteCodeRepo::find_by_settlement(&state.pool, settlement_id).await? {
        Some(row) => row,
        None => {
            let code = generate_invite_code();
            let row = InviteCodeRepo::replace(&state.pool, settlement_id, &code).await?;
            tracing::info!(settlement_id, "Invite code created on first fetch");
            row
        }
    };

    Ok(Json(DataResponse {
        data: InviteCodeView::new(row, settlement.name),
    }))
}

// ---------------------------------------------------------------------------
// POST /settlements/{id}/invite-code/regenerate
// ---------------------------------------------------------------------------

/// Replace the settlement's invite code, invalidating the previous one.
pub async fn regenerate(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(settlement_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let settlement = ensure_settlement_exists(&state.pool, settlement_id).await?;

    let code = generate_invite_code();
    let row = InviteCodeRepo::replace(&state.pool, settlement_id, &code).await?;

    tracing::info!(
        settlement_id,
        account_id = auth.account_id,
        "Invite code regenerated"
    );

    Ok(Json(DataResponse {
        data: InviteCodeView::new(row, settlement.name),
    }))
}

// ---------------------------------------------------------------------------
// GET /invites/{code}
// ---------------------------------------------------------------------------

/// Resolve an invite code to its settlement (the join flow's entry point).
pub async fn redeem(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let code = code.trim().replace('-', "").to_uppercase();

    if !is_valid_invite_code(&code) {
        return Err(AppError::BadRequest(
            "That is not a valid invite code".to_string(),
        ));
    }

    let row = InviteCodeRepo::find_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown or expired invite code".to_string()))?;

    let settlement = SettlementRepo::find_by_id(&state.pool, row.settlement_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(palisade_core::error::CoreError::NotFound {
                entity: "Settlement",
                id: row.settlement_id,
            })
        })?;

    Ok(Json(DataResponse { data: settlement }))
}
