//! Per-session lock table backing the concurrency guard.
//!
//! Locks are keyed by `"chatId:userId"`, created lazily on first use and kept
//! for the life of the process (cleared only at shutdown). Unlocking is
//! dropping the returned [`SessionGuard`].

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Held lock for one session key. Dropping it unlocks.
pub struct SessionGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl SessionGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Release the lock explicitly.
    pub fn unlock(self) {
        debug!(key = %self.key, "session lock released");
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard").field("key", &self.key).finish()
    }
}

/// Lazily populated table of per-session mutexes.
#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Take the lock if it is free. Never blocks.
    pub fn try_lock(&self, key: &str) -> Option<SessionGuard> {
        self.entry(key)
            .try_lock_owned()
            .ok()
            .map(|guard| SessionGuard {
                key: key.to_string(),
                _guard: guard,
            })
    }

    /// Wait until the lock is free and take it.
    pub async fn lock(&self, key: &str) -> SessionGuard {
        let guard = self.entry(key).lock_owned().await;
        SessionGuard {
            key: key.to_string(),
            _guard: guard,
        }
    }

    /// Whether the key is currently held by someone.
    pub fn is_locked(&self, key: &str) -> bool {
        self.locks
            .get(key)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Forget every lock entry. Guards already handed out stay valid.
    pub fn clear(&self) {
        let count = self.locks.len();
        self.locks.clear();
        debug!(count, "cleared session locks");
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl std::fmt::Debug for SessionLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLocks")
            .field("entries", &self.locks.len())
            .finish()
    }
}
