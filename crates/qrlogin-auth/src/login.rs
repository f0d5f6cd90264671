//! QR login flow
//!
//! 1. The polling client calls `generate` and renders the scan URL as a QR code
//! 2. The scanning client opens the URL and calls `scan`
//! 3. The scanning client, logged in, calls `confirm` (or `cancel`)
//! 4. The polling client's next `check` carries a token for the confirmed user

use crate::error::AuthError;
use crate::gateway::AuthGateway;
use crate::session::{QrSession, SessionError, SessionId, SessionResult};
use crate::store::SessionStore;
use chrono::{DateTime, Utc};
use qrlogin_core::{QrEvent, QrStatus};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Login flow errors
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub type LoginResult<T> = Result<T, LoginError>;

/// A freshly generated session, ready to be rendered
#[derive(Debug, Clone, Serialize)]
pub struct QrTicket {
    pub qrcode_id: SessionId,
    /// URL the scanning client opens
    pub scan_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Session state as seen by the polling client
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    #[serde(flatten)]
    pub session: QrSession,
    /// Present once the session is confirmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Drives QR sessions through the login flow
pub struct QrLoginManager {
    store: Arc<dyn SessionStore>,
    gateway: Arc<AuthGateway>,
    /// Base URL for scan links
    server_url: String,
}

impl QrLoginManager {
    /// Create a new QR login manager
    pub fn new(store: Arc<dyn SessionStore>, gateway: Arc<AuthGateway>, server_url: String) -> Self {
        Self {
            store,
            gateway,
            server_url,
        }
    }

    /// The auth gateway used for confirmations
    pub fn gateway(&self) -> &Arc<AuthGateway> {
        &self.gateway
    }

    /// Start a new QR session
    pub async fn generate(&self) -> LoginResult<QrTicket> {
        let id = self.store.create().await?;
        let session = self.store.get(&id).await?;
        Ok(QrTicket {
            qrcode_id: id,
            scan_url: self.scan_url(&id),
            expires_at: session.expires_at,
        })
    }

    /// URL embedded in the QR code for a session
    pub fn scan_url(&self, id: &SessionId) -> String {
        qrlogin_core::config::scan_url(&self.server_url, &id.to_string())
    }

    /// Read a session; a confirmed session comes with a token for its user
    pub async fn check(&self, id: &str) -> LoginResult<CheckResponse> {
        let id = parse_id(id)?;
        let session = self.store.get(&id).await?;

        let token = match (session.status, session.user_id) {
            (QrStatus::ScanConfirm, Some(user_id)) => Some(self.gateway.issue_token(user_id)?),
            _ => None,
        };
        debug!("Checked QR session {}: {}", id, session.status);

        Ok(CheckResponse { session, token })
    }

    /// Mark a session as scanned
    pub async fn scan(&self, id: &str) -> LoginResult<QrSession> {
        let id = parse_id(id)?;
        Ok(self.store.transition(&id, QrEvent::Scan, None).await?)
    }

    /// Confirm a scanned session on behalf of the bearer of `authorization`.
    ///
    /// Credentials are checked before the session is looked up.
    pub async fn confirm(&self, id: &str, authorization: Option<&str>) -> LoginResult<QrSession> {
        let user = self.gateway.authenticate_bearer(authorization)?;
        let id = parse_id(id)?;
        let session = self
            .store
            .transition(&id, QrEvent::Confirm, Some(user.id))
            .await?;
        info!("User {} confirmed QR session {}", user.username, id);
        Ok(session)
    }

    /// Cancel a scanned session
    pub async fn cancel(&self, id: &str) -> LoginResult<QrSession> {
        let id = parse_id(id)?;
        Ok(self.store.transition(&id, QrEvent::Cancel, None).await?)
    }

    /// Expire overdue sessions and evict stale ones
    pub async fn sweep(&self) -> usize {
        self.store.purge_expired().await
    }

    /// Number of sessions currently held
    pub async fn session_count(&self) -> usize {
        self.store.len().await
    }
}

/// Ids that are not even UUIDs cannot name a session
fn parse_id(id: &str) -> SessionResult<SessionId> {
    SessionId::parse(id.trim()).map_err(|_| SessionError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;
    use crate::token::TokenService;
    use crate::user::{UserDirectory, UserId};
    use chrono::Duration;

    fn create_test_manager() -> QrLoginManager {
        let store = Arc::new(MemorySessionStore::new(
            Duration::seconds(120),
            Duration::seconds(300),
        ));
        let gateway = Arc::new(AuthGateway::new(
            TokenService::new("login-secret", Duration::hours(1)),
            UserDirectory::with_default_users().unwrap(),
        ));
        QrLoginManager::new(store, gateway, "http://192.168.1.10:3000".to_string())
    }

    fn bearer(manager: &QrLoginManager, username: &str, password: &str) -> String {
        format!("Bearer {}", manager.gateway().login(username, password).unwrap())
    }

    #[tokio::test]
    async fn test_login_flow() {
        let manager = create_test_manager();

        let ticket = manager.generate().await.unwrap();
        assert_eq!(
            ticket.scan_url,
            format!("http://192.168.1.10:3000/pages/confirm.html?id={}", ticket.qrcode_id)
        );
        let id = ticket.qrcode_id.to_string();

        let check = manager.check(&id).await.unwrap();
        assert_eq!(check.session.status, QrStatus::NoScan);
        assert!(check.token.is_none());

        manager.scan(&id).await.unwrap();
        let check = manager.check(&id).await.unwrap();
        assert_eq!(check.session.status, QrStatus::ScanWaitConfirm);
        assert!(check.token.is_none());

        let auth = bearer(&manager, "sun", "111");
        manager.confirm(&id, Some(auth.as_str())).await.unwrap();

        let check = manager.check(&id).await.unwrap();
        assert_eq!(check.session.status, QrStatus::ScanConfirm);
        assert_eq!(check.session.user_id, Some(UserId(1)));
        let token = check.token.unwrap();
        assert_eq!(manager.gateway().verify_token(&token).unwrap(), UserId(1));
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let manager = create_test_manager();
        let auth = bearer(&manager, "sun", "111");

        for id in [SessionId::new().to_string(), "not-a-uuid".to_string()] {
            assert!(matches!(
                manager.check(&id).await,
                Err(LoginError::Session(SessionError::NotFound(_)))
            ));
            assert!(matches!(
                manager.scan(&id).await,
                Err(LoginError::Session(SessionError::NotFound(_)))
            ));
            assert!(matches!(
                manager.confirm(&id, Some(auth.as_str())).await,
                Err(LoginError::Session(SessionError::NotFound(_)))
            ));
            assert!(matches!(
                manager.cancel(&id).await,
                Err(LoginError::Session(SessionError::NotFound(_)))
            ));
        }
    }

    #[tokio::test]
    async fn test_confirm_requires_valid_token() {
        let manager = create_test_manager();
        let id = manager.generate().await.unwrap().qrcode_id.to_string();
        manager.scan(&id).await.unwrap();

        for header in [None, Some("Bearer forged.token.value"), Some("Token abc")] {
            assert!(matches!(
                manager.confirm(&id, header).await,
                Err(LoginError::Auth(_))
            ));
        }

        let check = manager.check(&id).await.unwrap();
        assert_eq!(check.session.status, QrStatus::ScanWaitConfirm);
        assert!(check.session.user_id.is_none());
    }

    #[tokio::test]
    async fn test_auth_checked_before_session() {
        let manager = create_test_manager();
        let result = manager.confirm("not-a-uuid", None).await;
        assert!(matches!(
            result,
            Err(LoginError::Auth(AuthError::MissingToken))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_session_is_final() {
        let manager = create_test_manager();
        let id = manager.generate().await.unwrap().qrcode_id.to_string();
        manager.scan(&id).await.unwrap();
        let cancelled = manager.cancel(&id).await.unwrap();
        assert_eq!(cancelled.status, QrStatus::ScanCancel);

        let auth = bearer(&manager, "guang", "222");
        assert!(matches!(
            manager.confirm(&id, Some(auth.as_str())).await,
            Err(LoginError::Session(SessionError::InvalidTransition { .. }))
        ));
        assert!(matches!(
            manager.scan(&id).await,
            Err(LoginError::Session(SessionError::InvalidTransition { .. }))
        ));

        let check = manager.check(&id).await.unwrap();
        assert_eq!(check.session.status, QrStatus::ScanCancel);
        assert!(check.token.is_none());
    }

    #[tokio::test]
    async fn test_check_serialization() {
        let manager = create_test_manager();
        let id = manager.generate().await.unwrap().qrcode_id.to_string();
        manager.scan(&id).await.unwrap();
        let auth = bearer(&manager, "sun", "111");
        manager.confirm(&id, Some(auth.as_str())).await.unwrap();

        let json = serde_json::to_value(manager.check(&id).await.unwrap()).unwrap();
        assert_eq!(json["id"], id.as_str());
        assert_eq!(json["status"], "scan-confirm");
        assert_eq!(json["user_id"], 1);
        assert!(json["token"].is_string());
    }
}
