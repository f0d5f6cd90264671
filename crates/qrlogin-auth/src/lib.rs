//! QrLogin Auth - QR session state machine and bearer-token authentication
//!
//! Tracks QR login sessions through their lifecycle and authenticates the
//! scanning client that confirms them.
//!
//! # Login Flow
//!
//! 1. Polling client calls `QrLoginManager::generate()` and shows the scan URL as a QR code
//! 2. Scanning client opens the URL, which calls `scan` (`noscan` → `scan-wait-confirm`)
//! 3. Scanning client logs in and calls `confirm` with its bearer token
//!    (`scan-wait-confirm` → `scan-confirm`), or `cancel` (→ `scan-cancel`)
//! 4. Polling client's `check` returns a fresh token for the confirmed user
//!
//! Sessions that are still open when their TTL runs out read as `expired`.
//!
//! # Example
//!
//! ```no_run
//! use qrlogin_auth::{AuthGateway, MemorySessionStore, QrLoginManager, TokenService, UserDirectory};
//! use chrono::Duration;
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let store = Arc::new(MemorySessionStore::new(Duration::seconds(120), Duration::seconds(300)));
//!     let gateway = Arc::new(AuthGateway::new(
//!         TokenService::new("secret", Duration::days(7)),
//!         UserDirectory::with_default_users().unwrap(),
//!     ));
//!     let manager = QrLoginManager::new(store, gateway, "http://192.168.1.100:3000".to_string());
//!
//!     let ticket = manager.generate().await.unwrap();
//!     println!("Scan: {}", ticket.scan_url);
//!
//!     let check = manager.check(&ticket.qrcode_id.to_string()).await.unwrap();
//!     println!("Status: {}", check.session.status);
//! }
//! ```

pub mod error;
pub mod gateway;
pub mod login;
pub mod password;
pub mod session;
pub mod store;
pub mod token;
pub mod user;

pub use error::{AuthError, AuthResult};
pub use gateway::{bearer_token, AuthGateway};
pub use login::{CheckResponse, LoginError, LoginResult, QrLoginManager, QrTicket};
pub use session::{next_status, QrSession, SessionError, SessionId, SessionResult};
pub use store::{MemorySessionStore, SessionStore};
pub use token::{generate_secret, Claims, TokenService};
pub use user::{User, UserDirectory, UserId, UserProfile, UserSeed};
