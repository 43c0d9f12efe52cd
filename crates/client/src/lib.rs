//! UI-agnostic client library for the Palisade settlement companion.
//!
//! Hosts the claim / switch / onboarding flow controller, the collaborator
//! trait it talks through, the selection store, the sync progress
//! simulator, and the treasury poller. A UI embeds [`FlowController`] and
//! renders from its snapshots; all ordering concerns (search debounce,
//! stale-response discard, claim double-submit) are handled here, not in
//! the view layer.

pub mod api;
pub mod controller;
pub mod http;
pub mod poller;
pub mod progress;
pub mod store;

pub use api::{ApiError, SettlementApi};
pub use controller::{FlowController, FlowError, FlowSnapshot, Step};
pub use http::HttpApi;
pub use poller::TreasuryPoller;
pub use progress::SyncProgress;
pub use store::{InviteCodeCache, MemoryStore, SelectionStore};
