//! QR code rendering for scan URLs

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::ImageFormat;
use qrcode::QrCode;
use qrlogin_core::{Error, Result};
use std::io::Cursor;

/// Render `payload` as a square PNG QR code of `size` pixels
pub fn render_png(payload: &str, size: u32) -> Result<Vec<u8>> {
    let code = QrCode::new(payload.as_bytes()).map_err(Error::qr_render)?;

    let image = code.render::<image::Luma<u8>>().build();

    let resized = image::imageops::resize(
        &image,
        size,
        size,
        image::imageops::FilterType::Nearest,
    );

    let mut buffer = Cursor::new(Vec::new());
    resized
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(Error::qr_render)?;

    Ok(buffer.into_inner())
}

/// Render `payload` as a `data:image/png;base64,...` URL
pub fn render_data_url(payload: &str, size: u32) -> Result<String> {
    let png = render_png(payload, size)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_is_png() {
        let url = render_data_url("http://localhost:3000/pages/confirm.html?id=abc", 200).unwrap();
        let encoded = url.strip_prefix("data:image/png;base64,").unwrap();
        let png = BASE64.decode(encoded).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 200);
    }

    #[test]
    fn test_oversized_payload_fails() {
        let payload = "x".repeat(8000);
        assert!(matches!(
            render_data_url(&payload, 200),
            Err(Error::QrRender(_))
        ));
    }
}
