//! Handlers for character directories, claiming, and switching.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use palisade_core::error::CoreError;
use palisade_core::types::DbId;
use palisade_db::models::character::{Character, ClaimDetails};
use palisade_db::models::settlement::Settlement;
use palisade_db::repositories::{CharacterRepo, SettlementRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::settlement::ensure_settlement_exists;
use crate::middleware::auth::AuthAccount;
use crate::response::DataResponse;
use crate::state::AppState;

/// Error message returned when a conditional claim finds no claimable row.
/// Clients surface this text verbatim.
const ALREADY_CLAIMED: &str = "Character not found or already claimed";

// ---------------------------------------------------------------------------
// GET /settlements/{id}/characters?unclaimed=true
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListCharactersParams {
    #[serde(default)]
    pub unclaimed: bool,
}

/// List a settlement's characters, optionally restricted to claimable ones.
pub async fn list_by_settlement(
    State(state): State<AppState>,
    Path(settlement_id): Path<DbId>,
    Query(params): Query<ListCharactersParams>,
) -> AppResult<impl IntoResponse> {
    ensure_settlement_exists(&state.pool, settlement_id).await?;

    let characters =
        CharacterRepo::list_by_settlement(&state.pool, settlement_id, params.unclaimed).await?;

    Ok(Json(DataResponse { data: characters }))
}

// ---------------------------------------------------------------------------
// GET /settlements/{id}/members
// ---------------------------------------------------------------------------

/// The member directory: claimed characters with their chosen professions.
pub async fn list_members(
    State(state): State<AppState>,
    Path(settlement_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_settlement_exists(&state.pool, settlement_id).await?;

    let members = CharacterRepo::list_members(&state.pool, settlement_id).await?;

    Ok(Json(DataResponse { data: members }))
}

// ---------------------------------------------------------------------------
// GET /characters/switch-candidates
// ---------------------------------------------------------------------------

/// Response for the switch-character flow: where the caller is now and
/// where they could go.
#[derive(Debug, Serialize)]
pub struct SwitchCandidates {
    pub settlement: Settlement,
    pub current_character: Character,
    pub available_characters: Vec<Character>,
}

/// Candidates the calling account could switch to, within its current
/// settlement.
pub async fn switch_candidates(
    State(state): State<AppState>,
    auth: AuthAccount,
) -> AppResult<impl IntoResponse> {
    let current = CharacterRepo::find_by_account(&state.pool, auth.account_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "You have not claimed a character yet".to_string(),
            ))
        })?;

    let settlement = SettlementRepo::find_by_id(&state.pool, current.settlement_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Settlement",
                id: current.settlement_id,
            })
        })?;

    let available =
        CharacterRepo::list_by_settlement(&state.pool, current.settlement_id, true).await?;

    Ok(Json(DataResponse {
        data: SwitchCandidates {
            settlement,
            current_character: current,
            available_characters: available,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /characters/{id}/claim
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ClaimRequest {
    #[validate(length(min = 1, max = 32))]
    pub display_name: Option<String>,
    pub primary_profession: Option<String>,
    pub secondary_profession: Option<String>,
}

/// Claim a character for the calling account.
///
/// The claim itself is a conditional update (`claimed_by_account IS NULL`),
/// so a character grabbed by someone else between fetch and commit fails
/// here with a 409 and the [`ALREADY_CLAIMED`] message. A successful claim
/// releases any character the account held before, which makes this the
/// commit step of the switch flow as well.
pub async fn claim(
    State(state): State<AppState>,
    auth: AuthAccount,
    Path(character_id): Path<DbId>,
    Json(body): Json<ClaimRequest>,
) -> AppResult<impl IntoResponse> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if let (Some(primary), Some(secondary)) = (&body.primary_profession, &body.secondary_profession)
    {
        if primary == secondary {
            return Err(AppError::Core(CoreError::Validation(
                "Primary and secondary professions must differ".to_string(),
            )));
        }
    }

    let details = ClaimDetails {
        display_name: body.display_name,
        primary_profession: body.primary_profession,
        secondary_profession: body.secondary_profession,
    };

    let claimed = CharacterRepo::claim(&state.pool, character_id, auth.account_id, &details)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict(ALREADY_CLAIMED.to_string())))?;

    // Only drop the previous claim once the new one is committed; a failed
    // switch must leave the current character untouched.
    let released = CharacterRepo::release_others(&state.pool, auth.account_id, claimed.id).await?;

    tracing::info!(
        character_id,
        account_id = auth.account_id,
        released_previous = released,
        "Character claimed"
    );

    Ok(Json(DataResponse { data: claimed }))
}

// ---------------------------------------------------------------------------
// POST /characters/release
// ---------------------------------------------------------------------------

/// Release whatever character the calling account currently holds.
pub async fn release(
    State(state): State<AppState>,
    auth: AuthAccount,
) -> AppResult<impl IntoResponse> {
    let released = CharacterRepo::release_by_account(&state.pool, auth.account_id).await?;

    tracing::info!(account_id = auth.account_id, released, "Claim released");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "released": released }),
    }))
}
