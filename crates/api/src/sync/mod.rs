//! Settlement data sync against the upstream game API.

pub mod game_client;
pub mod service;

pub use game_client::{GameApiError, GameCitizen, GameDataClient, GameSettlement, HttpGameClient};
pub use service::{sync_settlement, SyncMode, SyncReport};
