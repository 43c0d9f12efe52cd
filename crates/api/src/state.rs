use std::sync::Arc;

use crate::config::ServerConfig;
use crate::sync::game_client::GameDataClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: palisade_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upstream game data client (real HTTP in production, mock in tests).
    pub game_client: Arc<dyn GameDataClient>,
}
