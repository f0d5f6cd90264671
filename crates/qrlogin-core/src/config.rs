//! Configuration types for QrLogin

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Path (relative to the public URL) of the page the scanning client opens
pub const CONFIRM_PAGE_PATH: &str = "/pages/confirm.html";

/// Upper bound for TTLs and retention (10 years)
pub const MAX_DURATION_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Main configuration for QrLogin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address to bind the HTTP listener to
    pub bind: IpAddr,
    /// Server port
    pub port: u16,
    /// Base URL the scanning client can reach (embedded in QR payloads)
    pub public_url: String,
    /// Secret used to sign bearer tokens
    #[serde(skip_serializing, default)]
    pub jwt_secret: String,
    /// Bearer token lifetime in seconds
    pub token_ttl_secs: i64,
    /// QR session lifetime in seconds before it reads as expired
    pub qr_ttl_secs: i64,
    /// How long an expired session is kept before eviction, in seconds
    pub retention_secs: i64,
    /// Interval between expiry sweeps, in seconds
    pub sweep_interval_secs: u64,
    /// Rendered QR image edge length in pixels
    pub qr_size: u32,
    /// Optional JSON file seeding the user directory
    pub users_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            public_url: "http://localhost:3000".to_string(),
            jwt_secret: String::new(),
            token_ttl_secs: 7 * 24 * 60 * 60,
            qr_ttl_secs: 120,
            retention_secs: 300,
            sweep_interval_secs: 30,
            qr_size: 200,
            users_file: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set bind address
    pub fn with_bind(mut self, bind: IpAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Builder pattern: set port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder pattern: set public URL
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = url.into();
        self
    }

    /// Builder pattern: set token signing secret
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    /// Builder pattern: set token lifetime
    pub fn with_token_ttl(mut self, secs: i64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Builder pattern: set QR session lifetime
    pub fn with_qr_ttl(mut self, secs: i64) -> Self {
        self.qr_ttl_secs = secs;
        self
    }

    /// Builder pattern: set retention of expired sessions
    pub fn with_retention(mut self, secs: i64) -> Self {
        self.retention_secs = secs;
        self
    }

    /// Builder pattern: set sweep interval
    pub fn with_sweep_interval(mut self, secs: u64) -> Self {
        self.sweep_interval_secs = secs;
        self
    }

    /// Builder pattern: set QR image size
    pub fn with_qr_size(mut self, size: u32) -> Self {
        self.qr_size = size;
        self
    }

    /// Builder pattern: set users file
    pub fn with_users_file(mut self, path: Option<PathBuf>) -> Self {
        self.users_file = path;
        self
    }

    /// Check that values are usable before the server starts
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            return Err(Error::Config("JWT secret must not be empty".to_string()));
        }
        if !(self.public_url.starts_with("http://") || self.public_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Public URL must start with http:// or https://, got {}",
                self.public_url
            )));
        }
        if self.token_ttl_secs <= 0 || self.qr_ttl_secs <= 0 {
            return Err(Error::Config("TTL values must be positive".to_string()));
        }
        if self.retention_secs < 0 {
            return Err(Error::Config("Retention must not be negative".to_string()));
        }
        for (name, secs) in [
            ("Token TTL", self.token_ttl_secs),
            ("QR TTL", self.qr_ttl_secs),
            ("Retention", self.retention_secs),
        ] {
            if secs > MAX_DURATION_SECS {
                return Err(Error::Config(format!(
                    "{} must be at most {} seconds, got {}",
                    name, MAX_DURATION_SECS, secs
                )));
            }
        }
        if self.sweep_interval_secs == 0 {
            return Err(Error::Config("Sweep interval must be at least 1 second".to_string()));
        }
        if !(21..=2048).contains(&self.qr_size) {
            return Err(Error::Config(format!(
                "QR size must be between 21 and 2048 pixels, got {}",
                self.qr_size
            )));
        }
        Ok(())
    }
}

/// URL the scanning client opens for a given session id
pub fn scan_url(public_url: &str, session_id: &str) -> String {
    format!(
        "{}{}?id={}",
        public_url.trim_end_matches('/'),
        CONFIRM_PAGE_PATH,
        session_id
    )
}
