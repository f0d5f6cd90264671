//! QR session identity and state machine
//!
//! A session is one QR login attempt. Its status only moves forward along
//! the transition table in [`next_status`]; the bound user id is present
//! exactly when the status is `scan-confirm`.

use crate::user::UserId;
use chrono::{DateTime, Duration, Utc};
use qrlogin_core::{QrEvent, QrStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Session errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session expired")]
    Expired,
    #[error("Cannot {event} a session in status {from}")]
    InvalidTransition { from: QrStatus, event: QrEvent },
    #[error("Confirming a session requires a user")]
    MissingUser,
    #[error("Session lifetime out of range")]
    TtlOutOfRange,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Unique identifier for a QR session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allowed transitions, keyed by current status and event.
///
/// Returns `None` for every pair not in the table.
pub fn next_status(from: QrStatus, event: QrEvent) -> Option<QrStatus> {
    use QrEvent::*;
    use QrStatus::*;

    match (from, event) {
        (NoScan, Scan) => Some(ScanWaitConfirm),
        // The confirm page may be reloaded on the phone
        (ScanWaitConfirm, Scan) => Some(ScanWaitConfirm),
        (ScanWaitConfirm, Confirm) => Some(ScanConfirm),
        (ScanWaitConfirm, Cancel) => Some(ScanCancel),
        (NoScan | ScanWaitConfirm, Expire) => Some(Expired),
        _ => None,
    }
}

/// A QR login session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrSession {
    /// Unique session identifier
    pub id: SessionId,
    /// Current status
    pub status: QrStatus,
    /// User bound on confirm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Number of transitions applied so far
    pub version: u64,
    /// When the session was generated
    pub created_at: DateTime<Utc>,
    /// When a non-terminal session turns into `expired`
    pub expires_at: DateTime<Utc>,
}

impl QrSession {
    /// Create a fresh session in `noscan` that lives for `ttl`
    pub fn new(ttl: Duration) -> SessionResult<Self> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(SessionError::TtlOutOfRange)?;
        Ok(Self {
            id: SessionId::new(),
            status: QrStatus::NoScan,
            user_id: None,
            version: 0,
            created_at: now,
            expires_at,
        })
    }

    /// Whether the TTL has elapsed at `now`
    pub fn is_past_ttl(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Move to `expired` if the TTL elapsed and the session is still open.
    ///
    /// Returns true when the status changed.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() || !self.is_past_ttl(now) {
            return false;
        }
        self.apply(QrEvent::Expire, None).is_ok()
    }

    /// Copy of this record with expiry applied, leaving `self` untouched
    pub fn observed_at(&self, now: DateTime<Utc>) -> Self {
        let mut snapshot = self.clone();
        snapshot.expire_if_due(now);
        snapshot
    }

    /// Apply an event through the transition table.
    ///
    /// `user_id` is required for `confirm` and ignored otherwise.
    pub fn apply(&mut self, event: QrEvent, user_id: Option<UserId>) -> SessionResult<()> {
        if self.status == QrStatus::Expired {
            return Err(SessionError::Expired);
        }

        let next = next_status(self.status, event).ok_or(SessionError::InvalidTransition {
            from: self.status,
            event,
        })?;

        self.user_id = if next == QrStatus::ScanConfirm {
            Some(user_id.ok_or(SessionError::MissingUser)?)
        } else {
            None
        };
        self.status = next;
        self.version += 1;
        Ok(())
    }
}
