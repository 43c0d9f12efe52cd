//! Health check handler.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// `GET /health` -- liveness plus a database round-trip.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_healthy = palisade_db::health_check(&state.pool).await.is_ok();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "db_healthy": db_healthy,
    }))
}
