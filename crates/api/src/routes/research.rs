//! Route definitions for research nodes outside the settlement scope.
//!
//! Mounted at `/research`.

use axum::routing::post;
use axum::Router;

use crate::handlers::research;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/complete", post(research::complete))
}
