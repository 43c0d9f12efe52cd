#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use async_trait::async_trait;
use palisade_api::auth::jwt::{generate_access_token, JwtConfig};
use palisade_api::config::ServerConfig;
use palisade_api::router::build_app_router;
use palisade_api::state::AppState;
use palisade_api::sync::{GameApiError, GameCitizen, GameDataClient, GameSettlement};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        game_api_base_url: "http://game-api.invalid".to_string(),
        jwt: test_jwt_config(),
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-do-not-use".to_string(),
        access_token_expiry_mins: 60,
    }
}

/// Bearer token for the given account, signed with the test secret.
pub fn auth_token(account_id: i64) -> String {
    generate_access_token(account_id, &test_jwt_config())
        .expect("test token generation must not fail")
}

// ---------------------------------------------------------------------------
// Mock game API
// ---------------------------------------------------------------------------

/// Scriptable [`GameDataClient`] for tests. Configure before building the
/// app; an empty mock answers every call with empty data.
#[derive(Default)]
pub struct MockGameClient {
    /// Settlements returned by every search.
    pub settlements: Vec<GameSettlement>,
    /// Citizen rosters keyed by settlement entity id.
    pub rosters: HashMap<String, Vec<GameCitizen>>,
    /// When set, every call fails with this upstream message.
    pub fail_with: Option<String>,
}

impl MockGameClient {
    fn check_failure(&self) -> Result<(), GameApiError> {
        match &self.fail_with {
            Some(message) => Err(GameApiError::Upstream(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GameDataClient for MockGameClient {
    async fn search_settlements(&self, query: &str) -> Result<Vec<GameSettlement>, GameApiError> {
        self.check_failure()?;
        let needle = query.to_lowercase();
        Ok(self
            .settlements
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn fetch_settlement(&self, entity_id: &str) -> Result<GameSettlement, GameApiError> {
        self.check_failure()?;
        self.settlements
            .iter()
            .find(|s| s.entity_id == entity_id)
            .cloned()
            .ok_or_else(|| GameApiError::Upstream(format!("404: unknown claim {entity_id}")))
    }

    async fn fetch_roster(&self, entity_id: &str) -> Result<Vec<GameCitizen>, GameApiError> {
        self.check_failure()?;
        Ok(self.rosters.get(entity_id).cloned().unwrap_or_default())
    }
}

/// A game-side settlement for seeding the mock.
pub fn game_settlement(entity_id: &str, name: &str, tier: i16) -> GameSettlement {
    GameSettlement {
        entity_id: entity_id.to_string(),
        name: name.to_string(),
        tier,
        treasury: 5000,
        supplies: 1200,
        tiles: 64,
        population: 18,
        leader_name: "Mira".to_string(),
    }
}

/// A game-side citizen for seeding the mock roster.
pub fn game_citizen(entity_id: &str, name: &str, is_member: bool) -> GameCitizen {
    GameCitizen {
        entity_id: entity_id.to_string(),
        name: name.to_string(),
        skills: [("Forestry".to_string(), 30), ("Mining".to_string(), 12)]
            .into_iter()
            .collect(),
        is_member,
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with the production middleware stack
/// and an empty mock game client.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_game(pool, MockGameClient::default())
}

/// Build the app with a scripted mock game client.
pub fn build_test_app_with_game(pool: PgPool, game: MockGameClient) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        game_client: Arc::new(game),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request construction");
    app.oneshot(request).await.expect("request must not error")
}

pub async fn post_json(
    app: Router,
    path: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request construction");
    app.oneshot(request).await.expect("request must not error")
}

/// POST with an empty body (auth-only endpoints like sync and regenerate).
pub async fn post_empty(app: Router, path: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("POST").uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::empty())
        .expect("request construction");
    app.oneshot(request).await.expect("request must not error")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body must be valid JSON")
}

/// Assert status and return the parsed body in one step.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert a settlement directly and return its id.
pub async fn seed_settlement(pool: &PgPool, entity_id: &str, name: &str) -> i64 {
    let row = palisade_db::repositories::SettlementRepo::upsert(
        pool,
        &palisade_db::models::settlement::UpsertSettlement {
            entity_id: entity_id.to_string(),
            name: name.to_string(),
            tier: 3,
            treasury: 5000,
            supplies: 1200,
            tiles: 64,
            population: 18,
            leader_name: "Mira".to_string(),
        },
    )
    .await
    .expect("settlement seed");
    row.id
}

/// Insert an unclaimed character directly and return its id.
pub async fn seed_character(pool: &PgPool, settlement_id: i64, entity_id: &str, name: &str) -> i64 {
    let row = palisade_db::repositories::CharacterRepo::upsert(
        pool,
        &palisade_db::models::character::UpsertCharacter {
            entity_id: entity_id.to_string(),
            settlement_id,
            name: name.to_string(),
            skills: serde_json::json!({ "Forestry": 30, "Mining": 12 }),
            top_profession: Some("Forestry".to_string()),
            total_level: 42,
        },
    )
    .await
    .expect("character seed");
    row.id
}
