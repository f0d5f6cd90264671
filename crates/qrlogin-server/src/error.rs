//! API error responses

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qrlogin_auth::{AuthError, LoginError, SessionError};
use serde::Serialize;
use thiserror::Error;

/// Message for any id that does not name a live session
pub const QR_EXPIRED_MESSAGE: &str = "QR code expired";

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            // Unknown and expired ids look the same to callers
            SessionError::NotFound(_) | SessionError::Expired => {
                ApiError::BadRequest(QR_EXPIRED_MESSAGE.to_string())
            }
            SessionError::InvalidTransition { .. } => ApiError::BadRequest(e.to_string()),
            SessionError::MissingUser | SessionError::TtlOutOfRange => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if e.is_unauthorized() {
            ApiError::Unauthorized(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::Session(e) => e.into(),
            LoginError::Auth(e) => e.into(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<qrlogin_core::Error> for ApiError {
    fn from(e: qrlogin_core::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BadRequest", msg)
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "Unauthorized", msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", msg)
            }
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrlogin_core::{QrEvent, QrStatus};

    #[test]
    fn test_unknown_and_expired_share_message() {
        let unknown = ApiError::from(SessionError::NotFound("x".to_string()));
        let expired = ApiError::from(SessionError::Expired);
        assert!(matches!(&unknown, ApiError::BadRequest(m) if m == QR_EXPIRED_MESSAGE));
        assert!(matches!(&expired, ApiError::BadRequest(m) if m == QR_EXPIRED_MESSAGE));
    }

    #[test]
    fn test_status_codes() {
        let invalid = ApiError::from(LoginError::Session(SessionError::InvalidTransition {
            from: QrStatus::ScanCancel,
            event: QrEvent::Confirm,
        }));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let unauthorized = ApiError::from(LoginError::Auth(AuthError::TokenExpired));
        assert_eq!(unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);

        let internal = ApiError::from(AuthError::TokenCreation("boom".to_string()));
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
