//! QrLogin Core - Shared types and protocol definitions
//!
//! This crate provides the configuration, error type and wire-level session
//! enums used across all QrLogin components.

pub mod config;
pub mod error;
pub mod protocol;

pub use config::Config;
pub use error::{Error, Result};
pub use protocol::{QrEvent, QrStatus};
