//! In-memory session store.
//!
//! An upload creates a session holding its chunks so later explain requests can
//! refer to a chunk by index. Sessions are bounded by count and expire after a
//! period without access.


use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::{DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_TTL_SECS};
use crate::pipeline::Chunk;

/// Chunks retained for one uploaded document, in document order.
pub type SessionChunks = Arc<Vec<Chunk>>;

/// Concurrent session map keyed by UUID v4 strings.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, SessionChunks>,
    capacity: u64,
    ttl: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(
            DEFAULT_SESSION_CAPACITY,
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        )
    }
}

impl SessionStore {
    /// Creates a store holding at most `capacity` sessions, each evicted after
    /// `ttl` without being read.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        info!(capacity, ttl_secs = ttl.as_secs(), "Creating session store");
        Self {
            sessions: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(ttl)
                .build(),
            capacity,
            ttl,
        }
    }

    /// Stores `chunks` under a fresh session id and returns the id.
    pub fn create(&self, chunks: Vec<Chunk>) -> String {
        let id = Uuid::new_v4().to_string();
        debug!(session_id = %id, chunks = chunks.len(), "Created session");
        self.sessions.insert(id.clone(), Arc::new(chunks));
        id
    }

    pub fn get(&self, id: &str) -> Option<SessionChunks> {
        self.sessions.get(id)
    }

    /// Looks up one chunk of a session. The outer `None` means the session is
    /// unknown; the inner one that the index is out of range.
    pub fn chunk(&self, id: &str, index: usize) -> Option<Option<Chunk>> {
        self.get(id).map(|chunks| chunks.get(index).cloned())
    }

    pub fn remove(&self, id: &str) -> Option<SessionChunks> {
        self.sessions.remove(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Approximate number of live sessions (pending evictions may still count).
    #[inline]
    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clear(&self) {
        self.sessions.invalidate_all();
    }

    /// Runs pending evictions so [`Self::len`] is exact.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.sessions.run_pending_tasks();
    }
}
