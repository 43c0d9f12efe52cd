//! Selection persistence and the invite code cache.
//!
//! The flow controller remembers which settlement the user picked through a
//! [`SelectionStore`] so a restarted UI can resume where it left off. The
//! store is a plain key/value seam; a browser shell backs it with local
//! storage, tests and native shells use [`MemoryStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use palisade_core::types::DbId;
use tokio::sync::Mutex as AsyncMutex;

use crate::api::{ApiError, InviteCode, SettlementApi};

/// Storage key for the selected settlement id.
pub const SELECTED_SETTLEMENT_KEY: &str = "palisade.selected_settlement";

/// Small persistent key/value store for flow selections.
pub trait SelectionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn clear(&self, key: &str);
}

/// In-memory [`SelectionStore`] for tests and short-lived shells.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SelectionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn clear(&self, key: &str) {
        self.entries().remove(key);
    }
}

// ---------------------------------------------------------------------------
// Invite code cache
// ---------------------------------------------------------------------------

/// Read-through cache for a settlement's invite code.
///
/// The code shown to the user is always a value the service handed out.
/// Regeneration goes to the service and replaces the cached value with the
/// response; the cache never mints a code of its own.
pub struct InviteCodeCache {
    api: Arc<dyn SettlementApi>,
    cached: AsyncMutex<Option<InviteCode>>,
}

impl InviteCodeCache {
    pub fn new(api: Arc<dyn SettlementApi>) -> Self {
        Self {
            api,
            cached: AsyncMutex::new(None),
        }
    }

    /// The settlement's invite code, fetched once and then served locally.
    pub async fn get(&self, settlement_id: DbId) -> Result<InviteCode, ApiError> {
        let mut cached = self.cached.lock().await;
        if let Some(code) = cached.as_ref() {
            if code.settlement_id == settlement_id {
                return Ok(code.clone());
            }
        }
        let code = self.api.fetch_invite_code(settlement_id).await?;
        *cached = Some(code.clone());
        Ok(code)
    }

    /// Replace the settlement's code server-side and cache the new value.
    pub async fn regenerate(&self, settlement_id: DbId) -> Result<InviteCode, ApiError> {
        let code = self.api.regenerate_invite_code(settlement_id).await?;
        *self.cached.lock().await = Some(code.clone());
        Ok(code)
    }

    /// Drop the cached value; the next `get` hits the service again.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.get(SELECTED_SETTLEMENT_KEY), None);
        store.set(SELECTED_SETTLEMENT_KEY, "42");
        assert_eq!(store.get(SELECTED_SETTLEMENT_KEY).as_deref(), Some("42"));
        store.clear(SELECTED_SETTLEMENT_KEY);
        assert_eq!(store.get(SELECTED_SETTLEMENT_KEY), None);
    }

    #[test]
    fn clearing_a_missing_key_is_a_noop() {
        let store = MemoryStore::new();
        store.clear("palisade.never_set");
        assert_eq!(store.get("palisade.never_set"), None);
    }
}
