//! Reqwest-backed implementation of [`SettlementApi`].
//!
//! Decodes the service's `{ "data": ... }` envelope; a non-2xx response
//! with an `{ "error", "code" }` body becomes [`ApiError::Rejected`] with
//! the message intact, and anything that fails before a structured body
//! arrives (timeout included) becomes [`ApiError::Transport`].

use async_trait::async_trait;
use palisade_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::{
    ApiError, CharacterCandidate, ClaimRequest, InviteCode, SettlementApi, Settlement,
    SwitchCandidates, SyncMode, SyncReport, TreasurySummary,
};

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// HTTP client for the Palisade API.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpApi {
    /// `base_url` should include the `/api/v1` prefix.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    /// Attach a bearer token for the authenticated endpoints.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let envelope: DataEnvelope<T> = response
                .json()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            return Ok(envelope.data);
        }

        // A structured error body is an application-level rejection; a
        // body we cannot decode means the response never really arrived.
        match response.json::<ErrorEnvelope>().await {
            Ok(body) => Err(ApiError::Rejected(body.error)),
            Err(e) => Err(ApiError::Transport(format!("{status}: {e}"))),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(reqwest::Method::GET, path)).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&impl serde::Serialize>,
    ) -> Result<T, ApiError> {
        let mut builder = self.request(reqwest::Method::POST, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder).await
    }
}

#[async_trait]
impl SettlementApi for HttpApi {
    async fn search_settlements(&self, query: &str) -> Result<Vec<Settlement>, ApiError> {
        self.get(&format!("/settlements?q={}", urlencode(query))).await
    }

    async fn fetch_claimable_characters(
        &self,
        settlement_id: DbId,
    ) -> Result<Vec<CharacterCandidate>, ApiError> {
        self.get(&format!("/settlements/{settlement_id}/characters?unclaimed=true"))
            .await
    }

    async fn fetch_switch_candidates(&self) -> Result<SwitchCandidates, ApiError> {
        self.get("/characters/switch-candidates").await
    }

    async fn sync_settlement(
        &self,
        settlement_id: DbId,
        mode: SyncMode,
    ) -> Result<SyncReport, ApiError> {
        self.post::<SyncReport>(
            &format!("/settlements/{settlement_id}/sync?mode={}", mode.as_str()),
            None::<&()>,
        )
        .await
    }

    async fn commit_claim(
        &self,
        request: &ClaimRequest,
    ) -> Result<CharacterCandidate, ApiError> {
        self.post(&format!("/characters/{}/claim", request.character_id), Some(request))
            .await
    }

    async fn fetch_invite_code(&self, settlement_id: DbId) -> Result<InviteCode, ApiError> {
        self.get(&format!("/settlements/{settlement_id}/invite-code")).await
    }

    async fn regenerate_invite_code(&self, settlement_id: DbId) -> Result<InviteCode, ApiError> {
        self.post(
            &format!("/settlements/{settlement_id}/invite-code/regenerate"),
            None::<&()>,
        )
        .await
    }

    async fn fetch_treasury_summary(
        &self,
        settlement_id: DbId,
    ) -> Result<TreasurySummary, ApiError> {
        self.get(&format!("/settlements/{settlement_id}/treasury/summary"))
            .await
    }
}

/// Minimal percent-encoding for query values (space and reserved chars).
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
