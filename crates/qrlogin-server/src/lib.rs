//! QrLogin Server - Axum-based HTTP server
//!
//! This crate provides the QR login API, password login, and the embedded
//! polling and confirm pages.

pub mod error;
pub mod http;
pub mod qr;
pub mod state;

pub use error::ApiError;
pub use http::create_router;
pub use qr::{render_data_url, render_png};
pub use state::AppState;
