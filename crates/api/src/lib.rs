//! HTTP service for the Palisade settlement companion.
//!
//! Exposes the settlement search/sync, character claim/switch, invite code,
//! member directory, treasury ledger, project, and research endpoints under
//! `/api/v1`, plus `/health`.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod sync;
