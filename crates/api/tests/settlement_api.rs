//! Integration tests for settlement search, lookup, and sync.

mod common;

use axum::http::StatusCode;
use common::{
    auth_token, build_test_app, build_test_app_with_game, expect_json, game_citizen,
    game_settlement, get, post_empty, seed_settlement, MockGameClient,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn search_below_minimum_length_returns_empty_without_upstream(pool: PgPool) {
    // The mock would match, but a one-character query must not reach it.
    let mut game = MockGameClient::default();
    game.settlements.push(game_settlement("s-100", "Riverside", 3));
    let app = build_test_app_with_game(pool, game);

    let json = expect_json(get(app, "/api/v1/settlements?q=r").await, StatusCode::OK).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn search_minimum_length_counts_characters_not_bytes(pool: PgPool) {
    // A single CJK character is three bytes but still one character, so it
    // falls under the minimum like "r" does.
    let mut game = MockGameClient::default();
    game.settlements.push(game_settlement("s-100", "漢字町", 3));
    let app = build_test_app_with_game(pool, game);

    let json = expect_json(
        get(app, "/api/v1/settlements?q=%E6%BC%A2").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn search_serves_known_settlements_locally(pool: PgPool) {
    seed_settlement(&pool, "s-100", "Riverside").await;
    // Upstream failures must not matter when the answer is local.
    let game = MockGameClient {
        fail_with: Some("game api down".to_string()),
        ..Default::default()
    };
    let app = build_test_app_with_game(pool, game);

    let json = expect_json(get(app, "/api/v1/settlements?q=river").await, StatusCode::OK).await;
    let results = json["data"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Riverside");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn search_falls_back_upstream_and_stores_candidates(pool: PgPool) {
    let mut game = MockGameClient::default();
    game.settlements.push(game_settlement("s-200", "New Haven", 2));
    let app = build_test_app_with_game(pool.clone(), game);

    let json = expect_json(
        get(app.clone(), "/api/v1/settlements?q=haven").await,
        StatusCode::OK,
    )
    .await;
    let results = json["data"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["entity_id"], "s-200");

    // The candidate was upserted and is now addressable by internal id.
    let id = results[0]["id"].as_i64().unwrap();
    let json = expect_json(
        get(app, &format!("/api/v1/settlements/{id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["name"], "New Haven");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn search_upstream_failure_returns_502(pool: PgPool) {
    let game = MockGameClient {
        fail_with: Some("game api down".to_string()),
        ..Default::default()
    };
    let app = build_test_app_with_game(pool, game);

    let json = expect_json(
        get(app, "/api/v1/settlements?q=somewhere").await,
        StatusCode::BAD_GATEWAY,
    )
    .await;
    assert_eq!(json["code"], "SYNC_FAILED");
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_settlement_returns_404(pool: PgPool) {
    let app = build_test_app(pool);
    let json = expect_json(get(app, "/api/v1/settlements/999").await, StatusCode::NOT_FOUND).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn sync_requires_authentication(pool: PgPool) {
    let id = seed_settlement(&pool, "s-100", "Riverside").await;
    let app = build_test_app(pool);

    let response = post_empty(app, &format!("/api/v1/settlements/{id}/sync"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn full_sync_imports_members_and_reports_counts(pool: PgPool) {
    let id = seed_settlement(&pool, "s-100", "Riverside").await;

    let mut game = MockGameClient::default();
    game.settlements.push(game_settlement("s-100", "Riverside", 3));
    game.rosters.insert(
        "s-100".to_string(),
        vec![
            game_citizen("c-1", "Bram", true),
            game_citizen("c-2", "Wren", true),
            game_citizen("c-3", "Passerby", false),
        ],
    );
    let app = build_test_app_with_game(pool, game);
    let token = auth_token(1);

    let json = expect_json(
        post_empty(
            app.clone(),
            &format!("/api/v1/settlements/{id}/sync"),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(json["data"]["members_found"], 2);
    assert_eq!(json["data"]["members_added"], 2);
    assert_eq!(json["data"]["members_updated"], 0);
    assert_eq!(json["data"]["citizens_found"], 3);

    // Only members land in the character directory.
    let json = expect_json(
        get(app, &format!("/api/v1/settlements/{id}/characters")).await,
        StatusCode::OK,
    )
    .await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bram", "Wren"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn second_sync_updates_instead_of_adding(pool: PgPool) {
    let id = seed_settlement(&pool, "s-100", "Riverside").await;

    let mut game = MockGameClient::default();
    game.settlements.push(game_settlement("s-100", "Riverside", 3));
    game.rosters
        .insert("s-100".to_string(), vec![game_citizen("c-1", "Bram", true)]);
    let app = build_test_app_with_game(pool, game);
    let token = auth_token(1);

    let path = format!("/api/v1/settlements/{id}/sync");
    expect_json(post_empty(app.clone(), &path, Some(&token)).await, StatusCode::OK).await;
    let json = expect_json(post_empty(app, &path, Some(&token)).await, StatusCode::OK).await;

    assert_eq!(json["data"]["members_added"], 0);
    assert_eq!(json["data"]["members_updated"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sync_failure_surfaces_upstream_message(pool: PgPool) {
    let id = seed_settlement(&pool, "s-100", "Riverside").await;
    let game = MockGameClient {
        fail_with: Some("claim service maintenance".to_string()),
        ..Default::default()
    };
    let app = build_test_app_with_game(pool, game);
    let token = auth_token(1);

    let json = expect_json(
        post_empty(app, &format!("/api/v1/settlements/{id}/sync"), Some(&token)).await,
        StatusCode::BAD_GATEWAY,
    )
    .await;
    assert_eq!(json["code"], "SYNC_FAILED");
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("claim service maintenance"),
        "upstream message must survive verbatim, got: {}",
        json["error"]
    );
}
