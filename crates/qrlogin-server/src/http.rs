//! HTTP request handlers
//!
//! Includes the QR login API, the login/user endpoints and static page serving.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use qrlogin_auth::{CheckResponse, UserProfile};
use qrlogin_web::Assets;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::error::ApiError;
use crate::qr::render_data_url;
use crate::state::AppState;

/// Body returned by the scan, confirm and cancel endpoints
const SUCCESS: &str = "success";

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Static pages
        .route("/", get(index_handler))
        .route("/pages/*path", get(page_handler))
        // QR login API
        .route("/qrcode/generate", get(generate_handler))
        .route("/qrcode/check", get(check_handler))
        .route("/qrcode/scan", get(scan_handler))
        .route("/qrcode/confirm", get(confirm_handler))
        .route("/qrcode/cancel", get(cancel_handler))
        // Accounts
        .route("/login", get(login_handler))
        .route("/userInfo", get(user_info_handler))
        // Server info
        .route("/api/info", get(server_info_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the polling page
async fn index_handler() -> impl IntoResponse {
    match Assets::get("index.html") {
        Some(content) => Html(content.data.to_vec()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Serve pages opened by the scanning client
async fn page_handler(Path(path): Path<String>) -> impl IntoResponse {
    serve_asset(&format!("pages/{}", path.trim_start_matches('/')))
}

fn serve_asset(path: &str) -> Response {
    debug!("Serving asset: {}", path);

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();

            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime)],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

// ============================================================================
// QR Login API Handlers
// ============================================================================

/// Response for a generated QR code
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Session ID to poll with
    pub qrcode_id: String,
    /// PNG data URL of the QR code
    pub img: String,
    /// When the code stops being scannable
    pub expires_at: DateTime<Utc>,
}

/// Query carrying a session id
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    id: String,
}

/// Create a QR session and render its scan URL
async fn generate_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let ticket = state.login_manager.generate().await?;
    let img = render_data_url(&ticket.scan_url, state.config.qr_size)?;

    Ok(Json(GenerateResponse {
        qrcode_id: ticket.qrcode_id.to_string(),
        img,
        expires_at: ticket.expires_at,
    }))
}

/// Poll a session; includes a token once confirmed
async fn check_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<CheckResponse>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.login_manager.check(&query.id).await?))
}

/// Scanning client opened the QR payload
async fn scan_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<&'static str, ApiError> {
    let Query(query) = query?;
    state.login_manager.scan(&query.id).await?;
    Ok(SUCCESS)
}

/// Scanning client approved the login with its bearer token
async fn confirm_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<&'static str, ApiError> {
    let Query(query) = query?;
    state
        .login_manager
        .confirm(&query.id, authorization(&headers))
        .await?;
    Ok(SUCCESS)
}

/// Scanning client rejected the login
async fn cancel_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<&'static str, ApiError> {
    let Query(query) = query?;
    state.login_manager.cancel(&query.id).await?;
    Ok(SUCCESS)
}

// ============================================================================
// Account Handlers
// ============================================================================

/// Query parameters for password login
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Response carrying a bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Exchange username and password for a bearer token
async fn login_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LoginQuery>, QueryRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Query(query) = query?;
    // Password hashing is CPU-bound
    let gateway = state.login_manager.gateway().clone();
    let token = tokio::task::spawn_blocking(move || gateway.login(&query.username, &query.password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(TokenResponse { token }))
}

/// Profile of the bearer
async fn user_info_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state.gateway().authenticate_bearer(authorization(&headers))?;
    Ok(Json(profile))
}

/// Raw `Authorization` header value, if present and valid UTF-8
fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

// ============================================================================
// Server Info
// ============================================================================

/// Server information response
#[derive(Debug, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server version
    pub version: String,
    /// Sessions currently held in memory
    pub sessions: usize,
    /// QR session lifetime in seconds
    pub qr_ttl_secs: i64,
    /// Base URL embedded in QR codes
    pub public_url: String,
}

/// Get server information
async fn server_info_handler(State(state): State<Arc<AppState>>) -> Json<ServerInfo> {
    Json(ServerInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.login_manager.session_count().await,
        qr_ttl_secs: state.config.qr_ttl_secs,
        public_url: state.config.public_url.clone(),
    })
}
