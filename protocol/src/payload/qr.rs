//! QR rendering.
//!
//! Error correction is fixed at level M; the symbol version grows with the
//! payload. Rendering is a display convenience: nothing in the protocol
//! reads these pixels back.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

use super::CodecError;
use crate::config::QR_MODULE_PIXELS;

/// Render `contents` as a QR code and return PNG bytes.
pub fn render_code(contents: &str) -> Result<Vec<u8>, CodecError> {
    let code = QrCode::with_error_correction_level(contents.as_bytes(), EcLevel::M)?;
    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(QR_MODULE_PIXELS, QR_MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// [`render_code`], then standard base64 for embedding in JSON.
pub fn render_code_base64(contents: &str) -> Result<String, CodecError> {
    Ok(STANDARD.encode(render_code(contents)?))
}
