//! Conversation State Store
//!
//! Holds paused conversations between a "requires tool" outcome and the
//! submission of tool results, keyed by request id.
//!
//! Expiry is lookup-driven: `get` and `pop` treat an entry older than the TTL
//! as absent and remove it. There is no background sweeper. One lock guards
//! the map, and it is held across each whole evict-or-return decision.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::models::conversation::ConversationState;

/// Default lifetime of a paused conversation.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct StoreEntry {
    state: ConversationState,
    updated_at: Instant,
}

/// In-memory store of paused conversations.
#[derive(Debug)]
pub struct ConversationStore {
    entries: Mutex<HashMap<String, StoreEntry>>,
    ttl: Duration,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ConversationStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store (or replace) the state for a request. An empty message history
    /// clears the entry instead.
    pub async fn set(&self, request_id: &str, state: ConversationState) {
        let mut entries = self.entries.lock().await;
        if state.is_empty() {
            entries.remove(request_id);
            return;
        }
        entries.insert(
            request_id.to_string(),
            StoreEntry {
                state,
                updated_at: Instant::now(),
            },
        );
    }

    /// Read the state without claiming it.
    pub async fn get(&self, request_id: &str) -> Option<ConversationState> {
        let mut entries = self.entries.lock().await;
        if self.evict_if_expired(&mut entries, request_id) {
            return None;
        }
        entries.get(request_id).map(|entry| entry.state.clone())
    }

    /// Atomically read and remove the state. Of two concurrent callers, at
    /// most one receives it.
    pub async fn pop(&self, request_id: &str) -> Option<ConversationState> {
        let mut entries = self.entries.lock().await;
        if self.evict_if_expired(&mut entries, request_id) {
            return None;
        }
        entries.remove(request_id).map(|entry| entry.state)
    }

    /// Remove the state. A no-op for unknown ids.
    pub async fn clear(&self, request_id: &str) {
        self.entries.lock().await.remove(request_id);
    }

    /// Number of stored entries, including expired ones not yet looked up.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_if_expired(&self, entries: &mut HashMap<String, StoreEntry>, request_id: &str) -> bool {
        let expired = entries
            .get(request_id)
            .is_some_and(|entry| entry.updated_at.elapsed() > self.ttl);
        if expired {
            entries.remove(request_id);
            tracing::debug!(request_id, "Evicted expired conversation state");
        }
        expired
    }
}
