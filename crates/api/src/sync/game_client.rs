//! Client for the game's public data API.
//!
//! The service never talks to the game directly from handlers; everything
//! goes through the [`GameDataClient`] trait so integration tests can
//! substitute a mock without network access.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;

/// Errors from the upstream game API.
#[derive(Debug, thiserror::Error)]
pub enum GameApiError {
    /// The request failed before a structured response was received.
    #[error("Game API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The game API answered with an error status or an unusable body.
    #[error("Game API rejected the request: {0}")]
    Upstream(String),
}

/// Settlement snapshot as reported by the game.
#[derive(Debug, Clone, Deserialize)]
pub struct GameSettlement {
    #[serde(rename = "entityId")]
    pub entity_id: String,
    pub name: String,
    pub tier: i16,
    pub treasury: i64,
    pub supplies: i64,
    pub tiles: i32,
    pub population: i32,
    #[serde(rename = "leaderName", default)]
    pub leader_name: String,
}

/// One inhabitant of a settlement as reported by the game. Members are the
/// subset of citizens with settlement permissions.
#[derive(Debug, Clone, Deserialize)]
pub struct GameCitizen {
    #[serde(rename = "entityId")]
    pub entity_id: String,
    pub name: String,
    #[serde(default)]
    pub skills: BTreeMap<String, i32>,
    #[serde(rename = "isMember", default)]
    pub is_member: bool,
}

/// Read access to the game's public data.
#[async_trait]
pub trait GameDataClient: Send + Sync {
    /// Free-text settlement search.
    async fn search_settlements(&self, query: &str) -> Result<Vec<GameSettlement>, GameApiError>;

    /// Current snapshot of one settlement.
    async fn fetch_settlement(&self, entity_id: &str) -> Result<GameSettlement, GameApiError>;

    /// Full citizen roster of a settlement, members included.
    async fn fetch_roster(&self, entity_id: &str) -> Result<Vec<GameCitizen>, GameApiError>;
}

/// Production [`GameDataClient`] over HTTP.
pub struct HttpGameClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGameClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GameApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GameApiError::Upstream(format!(
                "{status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GameDataClient for HttpGameClient {
    async fn search_settlements(&self, query: &str) -> Result<Vec<GameSettlement>, GameApiError> {
        #[derive(Deserialize)]
        struct SearchResponse {
            settlements: Vec<GameSettlement>,
        }
        let body: SearchResponse = self
            .get_json("/claims", &[("q", query)])
            .await?;
        Ok(body.settlements)
    }

    async fn fetch_settlement(&self, entity_id: &str) -> Result<GameSettlement, GameApiError> {
        #[derive(Deserialize)]
        struct ClaimResponse {
            claim: GameSettlement,
        }
        let body: ClaimResponse = self
            .get_json(&format!("/claims/{entity_id}"), &[])
            .await?;
        Ok(body.claim)
    }

    async fn fetch_roster(&self, entity_id: &str) -> Result<Vec<GameCitizen>, GameApiError> {
        #[derive(Deserialize)]
        struct RosterResponse {
            citizens: Vec<GameCitizen>,
        }
        let body: RosterResponse = self
            .get_json(&format!("/claims/{entity_id}/citizens"), &[])
            .await?;
        Ok(body.citizens)
    }
}
