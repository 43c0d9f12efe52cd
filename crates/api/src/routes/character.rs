//! Route definitions for character claiming and switching.
//!
//! Mounted at `/characters`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::character;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/switch-candidates", get(character::switch_candidates))
        .route("/{id}/claim", post(character::claim))
        .route("/release", post(character::release))
}
