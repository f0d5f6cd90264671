//! Shared application state

use qrlogin_auth::{AuthGateway, QrLoginManager};
use qrlogin_core::Config;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// QR login flow
    pub login_manager: Arc<QrLoginManager>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, login_manager: Arc<QrLoginManager>) -> Self {
        Self {
            config,
            login_manager,
        }
    }

    /// Auth gateway behind the login flow
    pub fn gateway(&self) -> &AuthGateway {
        self.login_manager.gateway()
    }
}
