//! The collaborator seam: DTOs and the [`SettlementApi`] trait.
//!
//! The flow controller only ever talks to the service through this trait,
//! so tests substitute a recording mock and the transport can change
//! without touching flow logic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use palisade_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// Generic user-facing message for transport-level failures, where no
/// upstream error text exists to surface.
pub const GENERIC_RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors from the service, split by whether a structured response arrived.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The service answered with a structured rejection. The message is
    /// shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The request failed before a structured response was received
    /// (timeout, connection drop). Always retryable; shown as
    /// [`GENERIC_RETRY_MESSAGE`].
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ApiError {
    /// The message a UI should display for this error.
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Rejected(msg) => msg,
            ApiError::Transport(_) => GENERIC_RETRY_MESSAGE,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (mirror the service's response shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: DbId,
    pub entity_id: String,
    pub name: String,
    pub tier: i16,
    pub treasury: i64,
    pub supplies: i64,
    pub tiles: i32,
    pub population: i32,
    pub leader_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterCandidate {
    pub id: DbId,
    pub entity_id: String,
    pub settlement_id: DbId,
    pub name: String,
    #[serde(default)]
    pub skills: BTreeMap<String, i32>,
    pub top_profession: Option<String>,
    pub total_level: i64,
}

impl CharacterCandidate {
    /// Profession labels from the candidate's own skill set, highest level
    /// first (ties by name for a stable order).
    pub fn profession_options(&self) -> Vec<&str> {
        let mut entries: Vec<_> = self.skills.iter().collect();
        entries.sort_by(|(name_a, level_a), (name_b, level_b)| {
            level_b.cmp(level_a).then(name_a.cmp(name_b))
        });
        entries.into_iter().map(|(name, _)| name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCode {
    pub code: String,
    pub formatted_code: String,
    pub created_at: Timestamp,
    pub settlement_id: DbId,
    pub settlement_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchCandidates {
    pub settlement: Settlement,
    pub current_character: CharacterCandidate,
    pub available_characters: Vec<CharacterCandidate>,
}

/// Counts reported by a finished settlement sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub members_found: u32,
    pub members_added: u32,
    pub members_updated: u32,
    pub citizens_found: u32,
    pub duration_ms: u64,
}

/// Sync scope, mirroring the service's `mode` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    Full,
    MembersOnly,
}

impl SyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::MembersOnly => "members_only",
        }
    }
}

/// Payload for the claim commit.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimRequest {
    pub character_id: DbId,
    pub settlement_id: DbId,
    pub display_name: Option<String>,
    pub primary_profession: Option<String>,
    pub secondary_profession: Option<String>,
}

/// Treasury summary polled by the dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreasurySummary {
    pub balance: i64,
    pub delta_24h: i64,
    pub entry_count: i64,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Everything the flow controller and dashboard widgets need from the
/// service.
#[async_trait]
pub trait SettlementApi: Send + Sync {
    /// Free-text settlement search; the caller guarantees the query is at
    /// least two characters.
    async fn search_settlements(&self, query: &str) -> Result<Vec<Settlement>, ApiError>;

    /// Unclaimed characters for a settlement.
    async fn fetch_claimable_characters(
        &self,
        settlement_id: DbId,
    ) -> Result<Vec<CharacterCandidate>, ApiError>;

    /// Where the caller is now and which characters they could switch to.
    async fn fetch_switch_candidates(&self) -> Result<SwitchCandidates, ApiError>;

    /// Run a settlement data sync. Slow; the terminal outcome here is
    /// authoritative, whatever the progress simulator showed meanwhile.
    async fn sync_settlement(
        &self,
        settlement_id: DbId,
        mode: SyncMode,
    ) -> Result<SyncReport, ApiError>;

    /// Commit a claim. The service rejects it if the character gained an
    /// owner since it was listed.
    async fn commit_claim(&self, request: &ClaimRequest)
        -> Result<CharacterCandidate, ApiError>;

    /// The settlement's active invite code (created server-side on first
    /// fetch).
    async fn fetch_invite_code(&self, settlement_id: DbId) -> Result<InviteCode, ApiError>;

    /// Replace the settlement's invite code. The returned value is the new
    /// server-side truth; callers must never fabricate a code locally.
    async fn regenerate_invite_code(&self, settlement_id: DbId) -> Result<InviteCode, ApiError>;

    /// Current treasury summary, polled periodically by the dashboard.
    async fn fetch_treasury_summary(
        &self,
        settlement_id: DbId,
    ) -> Result<TreasurySummary, ApiError>;
}
