pub mod character;
pub mod health;
pub mod project;
pub mod research;
pub mod settlement;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /settlements                                     search (?q=)
/// /settlements/{id}                                get
/// /settlements/{id}/sync                           sync (POST, auth)
/// /settlements/{id}/characters                     claimable directory (?unclaimed=)
/// /settlements/{id}/members                        member directory
/// /settlements/{id}/invite-code                    fetch current
/// /settlements/{id}/invite-code/regenerate         regenerate (POST, auth)
/// /settlements/{id}/treasury                       ledger list, append (POST, auth)
/// /settlements/{id}/treasury/summary               balance summary
/// /settlements/{id}/projects                       list, create (POST, auth)
/// /settlements/{id}/research                       research tree
///
/// /characters/switch-candidates                    switch flow data (auth)
/// /characters/{id}/claim                           commit claim (POST, auth)
/// /characters/release                              release claim (POST, auth)
///
/// /projects/{id}                                   get, update (PUT, auth)
/// /projects/{id}/contributions                     list, add (POST, auth)
///
/// /research/{id}/complete                          complete node (POST, auth)
///
/// /invites/{code}                                  resolve invite code
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/settlements", settlement::router())
        .nest("/characters", character::router())
        .nest("/projects", project::router())
        .nest("/research", research::router())
        .route("/invites/{code}", get(handlers::invite::redeem))
}
