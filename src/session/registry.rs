use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard, RwLock, TryLockError};

use super::state::SessionState;

pub type SharedSession = Arc<Session>;

/// One session's state plus a count of processing runs and questions in flight.
///
/// Readers such as page renders take the lock too, so a held lock alone does
/// not mean the session is busy.
#[derive(Default)]
pub struct Session {
    state: Mutex<SessionState>,
    in_flight: AtomicUsize,
}

impl Session {
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub fn try_lock(&self) -> Result<MutexGuard<'_, SessionState>, TryLockError> {
        self.state.try_lock()
    }

    /// Marks a processing run or question as started until the guard drops.
    pub fn begin_action(&self) -> ActionGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        ActionGuard { session: self }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

pub struct ActionGuard<'a> {
    session: &'a Session,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.session.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Per-browser session states, keyed by the session cookie value.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `id`, creating an empty one on first access.
    pub async fn get_or_create(&self, id: &str) -> SharedSession {
        if let Some(session) = self.sessions.read().await.get(id) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!("New session {}", id);
                Arc::new(Session::default())
            })
            .clone()
    }

    pub async fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for at least `ttl`. Sessions busy with a request
    /// are kept. Returns how many were evicted.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            if session.is_busy() {
                return true;
            }
            match session.try_lock() {
                Ok(state) => state.last_active.elapsed() < ttl,
                Err(_) => true,
            }
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }
}
