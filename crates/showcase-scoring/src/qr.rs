//! QR encoding of certificate verification URLs.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use crate::error::ScoringError;

/// Minimum edge of the rendered code in pixels.
const QR_MIN_DIMENSION: u32 = 160;

/// Renders `data` as an SVG QR code.
pub fn qr_svg(data: &str) -> Result<String, ScoringError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| ScoringError::QrCode(e.to_string()))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .dark_color(svg::Color("#111827"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// `data:` URI of an SVG document, usable as an `<img>` source.
pub fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", BASE64_STANDARD.encode(svg))
}
