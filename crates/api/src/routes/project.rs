//! Route definitions for projects outside the settlement scope.
//!
//! Mounted at `/projects`.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(project::get_by_id).put(project::update))
        .route(
            "/{id}/contributions",
            get(project::list_contributions).post(project::add_contribution),
        )
}
