//! Pending CSRF state store for the OAuth login flow
//!
//! A state token is inserted when a login URL is issued and consumed
//! exactly once by the matching callback. Consumption is atomic: of any
//! number of concurrent callbacks presenting the same token, at most one
//! succeeds.
//!
//! The in-memory implementation stands in for a shared store (never-consumed
//! tokens accumulate until process restart); anything satisfying the two
//! trait operations can replace it without touching the handlers.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Context recorded with a pending state token. The callback needs the
/// original redirect target for the code exchange, and the provider name
/// to reject tokens replayed against a different provider.
#[derive(Debug, Clone)]
pub struct StateData {
    pub provider: String,
    pub redirect_uri: String,
}

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Records a freshly issued state token as pending
    async fn insert(&self, state: &str, data: StateData);

    /// Removes and returns the pending entry for a token, or `None` if the
    /// token was never issued or already consumed
    async fn consume(&self, state: &str) -> Option<StateData>;
}

#[derive(Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, StateData>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn insert(&self, state: &str, data: StateData) {
        self.entries.lock().await.insert(state.to_string(), data);
    }

    async fn consume(&self, state: &str) -> Option<StateData> {
        // Single lock covers the check and the delete
        self.entries.lock().await.remove(state)
    }
}
