//! QrLogin Web - Embedded web assets
//!
//! `index.html` is the polling client: it generates a QR code and polls its
//! status. `pages/confirm.html` is what the scanning client opens from the
//! QR payload.

use rust_embed::Embed;

#[derive(Embed)]
#[folder = "www/"]
pub struct Assets;
