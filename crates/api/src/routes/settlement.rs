//! Route definitions for settlement-scoped resources.
//!
//! Mounted at `/settlements`. Sub-resources (characters, members, invite
//! code, treasury, projects, research) hang off `/{id}`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{character, invite, project, research, settlement, treasury};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(settlement::search))
        .route("/{id}", get(settlement::get_by_id))
        .route("/{id}/sync", post(settlement::sync))
        .route("/{id}/characters", get(character::list_by_settlement))
        .route("/{id}/members", get(character::list_members))
        .route("/{id}/invite-code", get(invite::get_current))
        .route("/{id}/invite-code/regenerate", post(invite::regenerate))
        .route(
            "/{id}/treasury",
            get(treasury::list_entries).post(treasury::append_entry),
        )
        .route("/{id}/treasury/summary", get(treasury::summary))
        .route(
            "/{id}/projects",
            get(project::list_by_settlement).post(project::create),
        )
        .route("/{id}/research", get(research::list_by_settlement))
}
