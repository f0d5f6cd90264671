//! Authentication errors

use crate::user::UserId;
use thiserror::Error;

/// Errors raised by the token service, user directory and auth gateway
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Malformed Authorization header")]
    MalformedHeader,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token expired, please log in again")]
    TokenExpired,
    #[error("User does not exist")]
    UnknownUser,
    #[error("Wrong password")]
    WrongPassword,
    #[error("User {0} no longer exists")]
    UserNotFound(UserId),
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("Password hash error: {0}")]
    Hash(String),
    #[error("Duplicate user: {0}")]
    DuplicateUser(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Whether the caller presented bad or missing credentials, as opposed
    /// to the server failing to process valid ones
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::MalformedHeader
                | AuthError::InvalidToken(_)
                | AuthError::TokenExpired
                | AuthError::UnknownUser
                | AuthError::WrongPassword
                | AuthError::UserNotFound(_)
        )
    }
}
