//! Integration tests for projects, contributions, and the research tree.

mod common;

use axum::http::StatusCode;
use common::{
    auth_token, build_test_app, expect_json, get, post_json, seed_character, seed_settlement,
};
use palisade_db::repositories::ResearchRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn created_project_starts_planned(pool: PgPool) {
    let settlement_id = seed_settlement(&pool, "s-100", "Riverside").await;
    let app = build_test_app(pool);

    let json = expect_json(
        post_json(
            app,
            &format!("/api/v1/settlements/{settlement_id}/projects"),
            json!({ "name": "North wall", "description": "Palisade extension" }),
            Some(&auth_token(1)),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(json["data"]["name"], "North wall");
    assert_eq!(json["data"]["status"], "planned");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn blank_project_name_is_rejected(pool: PgPool) {
    let settlement_id = seed_settlement(&pool, "s-100", "Riverside").await;
    let app = build_test_app(pool);

    let json = expect_json(
        post_json(
            app,
            &format!("/api/v1/settlements/{settlement_id}/projects"),
            json!({ "name": "   " }),
            Some(&auth_token(1)),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_status_transition_is_rejected(pool: PgPool) {
    let settlement_id = seed_settlement(&pool, "s-100", "Riverside").await;
    let app = build_test_app(pool);
    let token = auth_token(1);

    let json = expect_json(
        post_json(
            app.clone(),
            &format!("/api/v1/settlements/{settlement_id}/projects"),
            json!({ "name": "North wall" }),
            Some(&token),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let project_id = json["data"]["id"].as_i64().unwrap();

    let request = axum::http::Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/projects/{project_id}"))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::from(
            json!({ "status": "abandoned" }).to_string(),
        ))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn contributions_accumulate_on_a_project(pool: PgPool) {
    let settlement_id = seed_settlement(&pool, "s-100", "Riverside").await;
    let character_id = seed_character(&pool, settlement_id, "c-1", "Bram").await;
    let app = build_test_app(pool);
    let token = auth_token(1);

    let json = expect_json(
        post_json(
            app.clone(),
            &format!("/api/v1/settlements/{settlement_id}/projects"),
            json!({ "name": "North wall" }),
            Some(&token),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let project_id = json["data"]["id"].as_i64().unwrap();

    let path = format!("/api/v1/projects/{project_id}/contributions");
    expect_json(
        post_json(
            app.clone(),
            &path,
            json!({ "character_id": character_id, "item_name": "Timber", "quantity": 40 }),
            Some(&token),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    // Zero and negative quantities are rejected.
    let json = expect_json(
        post_json(
            app.clone(),
            &path,
            json!({ "character_id": character_id, "item_name": "Timber", "quantity": 0 }),
            Some(&token),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let json = expect_json(get(app, &path).await, StatusCode::OK).await;
    let contributions = json["data"].as_array().unwrap();
    assert_eq!(contributions.len(), 1);
    assert_eq!(contributions[0]["item_name"], "Timber");
    assert_eq!(contributions[0]["quantity"], 40);
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn available_node_completes_and_locked_node_does_not(pool: PgPool) {
    let settlement_id = seed_settlement(&pool, "s-100", "Riverside").await;
    // Seeded settlement is tier 3: tier 2 unlocks, tier 5 stays locked.
    let low = ResearchRepo::upsert(&pool, settlement_id, "Masonry", 2)
        .await
        .unwrap();
    let high = ResearchRepo::upsert(&pool, settlement_id, "Siegecraft", 5)
        .await
        .unwrap();
    ResearchRepo::refresh_availability(&pool, settlement_id, 3)
        .await
        .unwrap();

    let app = build_test_app(pool);
    let token = auth_token(1);

    let json = expect_json(
        post_json(
            app.clone(),
            &format!("/api/v1/research/{}/complete", low.id),
            json!({}),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["status"], "completed");

    let json = expect_json(
        post_json(
            app.clone(),
            &format!("/api/v1/research/{}/complete", high.id),
            json!({}),
            Some(&token),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(json["error"].as_str().unwrap().contains("locked"));

    // Completing twice is also rejected.
    let json = expect_json(
        post_json(
            app.clone(),
            &format!("/api/v1/research/{}/complete", low.id),
            json!({}),
            Some(&token),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(json["error"].as_str().unwrap().contains("completed"));

    // The tree lists both nodes with their final statuses.
    let json = expect_json(
        get(app, &format!("/api/v1/settlements/{settlement_id}/research")).await,
        StatusCode::OK,
    )
    .await;
    let nodes = json["data"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["name"], "Masonry");
    assert_eq!(nodes[0]["status"], "completed");
    assert_eq!(nodes[1]["status"], "locked");
}
