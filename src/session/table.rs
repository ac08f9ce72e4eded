use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::SessionState;

/// Process-wide map of chat id → in-progress roster session.
///
/// axum handlers run on a multi-threaded runtime, so every read-modify-write
/// goes through [`SessionTable::update`] and runs as one critical section.
/// Closures must not await; all I/O stays outside the lock. Entries are
/// overwritten on reset, never removed, so memory grows with distinct users.
#[derive(Debug, Default)]
pub struct SessionTable {
    inner: Mutex<HashMap<i64, SessionState>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the user's current state, `Idle` if they have none.
    pub fn snapshot(&self, user_id: i64) -> SessionState {
        self.lock().get(&user_id).cloned().unwrap_or_default()
    }

    /// Runs `f` against the user's session under the table lock, creating
    /// an `Idle` entry on first touch.
    pub fn update<R>(&self, user_id: i64, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut map = self.lock();
        f(map.entry(user_id).or_default())
    }

    pub fn put(&self, user_id: i64, state: SessionState) {
        self.lock().insert(user_id, state);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, SessionState>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
