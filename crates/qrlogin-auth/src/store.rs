//! Session storage
//!
//! [`SessionStore`] is the seam between the login flow and wherever session
//! records live. [`MemorySessionStore`] keeps them in a process-local map.

use crate::session::{QrSession, SessionError, SessionId, SessionResult};
use crate::user::UserId;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use qrlogin_core::QrEvent;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Storage for QR session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a fresh `noscan` session and return its id
    async fn create(&self) -> SessionResult<SessionId>;

    /// Read a session, with expiry applied to the returned snapshot
    async fn get(&self, id: &SessionId) -> SessionResult<QrSession>;

    /// Apply `event` atomically and return the updated record
    async fn transition(
        &self,
        id: &SessionId,
        event: QrEvent,
        user_id: Option<UserId>,
    ) -> SessionResult<QrSession>;

    /// Expire overdue sessions and evict those past retention.
    ///
    /// Returns the number of evicted sessions.
    async fn purge_expired(&self) -> usize;

    /// Number of stored sessions
    async fn len(&self) -> usize;

    /// Whether the store holds no sessions
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// In-memory session store
///
/// Every transition holds the write lock for its whole read-modify-write,
/// so concurrent events on one session are applied one after another and
/// the loser sees the winner's status.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, QrSession>>,
    /// Lifetime of a new session
    ttl: Duration,
    /// How long a session is kept past its expiry before eviction
    retention: Duration,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new(ttl: Duration, retention: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            retention,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self) -> SessionResult<SessionId> {
        let session = QrSession::new(self.ttl)?;
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        info!("Created QR session {}", id);
        Ok(id)
    }

    async fn get(&self, id: &SessionId) -> SessionResult<QrSession> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        debug!("Read QR session {} ({})", id, session.status);
        Ok(session.observed_at(Utc::now()))
    }

    async fn transition(
        &self,
        id: &SessionId,
        event: QrEvent,
        user_id: Option<UserId>,
    ) -> SessionResult<QrSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        if session.expire_if_due(Utc::now()) {
            debug!("QR session {} expired", id);
        }

        let from = session.status;
        if let Err(e) = session.apply(event, user_id) {
            warn!("Rejected {} on QR session {}: {}", event, id, e);
            return Err(e);
        }
        info!(
            "QR session {} moved {} -> {} (v{})",
            id, from, session.status, session.version
        );
        Ok(session.clone())
    }

    async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        for session in sessions.values_mut() {
            session.expire_if_due(now);
        }

        let before = sessions.len();
        sessions.retain(|_, s| match s.expires_at.checked_add_signed(self.retention) {
            Some(evict_after) => now <= evict_after,
            None => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} stale QR sessions", evicted);
        }
        evicted
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
