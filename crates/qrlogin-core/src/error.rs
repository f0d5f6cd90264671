//! Error types for QrLogin

use thiserror::Error;

/// Main error type for QrLogin configuration and rendering
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("QR code rendering failed: {0}")]
    QrRender(String),
}

/// Result type alias using QrLogin's Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a QR rendering error from any displayable cause
    pub fn qr_render(cause: impl std::fmt::Display) -> Self {
        Error::QrRender(cause.to_string())
    }
}
