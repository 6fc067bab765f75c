//! Image decoding and `data:` URI utilities.
//!
//! Exports are handed around as base64 data URIs; the watermark step decodes
//! them back into pixels.

use base64::Engine;
use meme_core::ExportFormat;

use crate::error::{ExportError, ExportResult};

/// Decoded raster image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight (non-premultiplied) RGBA pixel data, 4 bytes per pixel.
    pub data: Vec<u8>,
    /// Detected container format, if it is one we export.
    pub format: Option<ExportFormat>,
}

impl DecodedImage {
    /// Convert into a tiny-skia pixmap (premultiplied alpha).
    ///
    /// Returns `None` if the dimensions are zero or the buffer is short.
    #[must_use]
    pub fn into_pixmap(self) -> Option<tiny_skia::Pixmap> {
        let size = tiny_skia::IntSize::from_wh(self.width, self.height)?;
        let mut data = self.data;
        for px in data.chunks_exact_mut(4) {
            let alpha = u16::from(px[3]);
            if alpha < 255 {
                for channel in &mut px[..3] {
                    // Rounded c * a / 255; the result always fits in a byte.
                    #[allow(clippy::cast_possible_truncation)]
                    let premultiplied = ((u16::from(*channel) * alpha + 127) / 255) as u8;
                    *channel = premultiplied;
                }
            }
        }
        tiny_skia::Pixmap::from_vec(data, size)
    }
}

/// Detect an export format from magic bytes.
#[must_use]
pub fn sniff_format(data: &[u8]) -> Option<ExportFormat> {
    // PNG: 89 50 4E 47
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some(ExportFormat::Png);
    }
    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ExportFormat::Jpg);
    }
    None
}

/// Decode an encoded image.
///
/// # Errors
///
/// Returns [`ExportError::Decode`] if the bytes are not a decodable image.
pub fn decode_image(data: &[u8]) -> ExportResult<DecodedImage> {
    let format = sniff_format(data);
    let img = image::load_from_memory(data)
        .map_err(|e| ExportError::Decode(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        data: rgba.into_raw(),
        format,
    })
}

/// Wrap encoded bytes in a base64 data URI.
#[must_use]
pub fn encode_data_uri(mime: &str, data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime};base64,{encoded}")
}

/// Split a data URI into its MIME type and decoded payload.
///
/// Supports base64 and percent-encoded payloads.
///
/// # Errors
///
/// Returns [`ExportError::Decode`] if the URI is malformed.
pub fn decode_data_uri(uri: &str) -> ExportResult<(String, Vec<u8>)> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| ExportError::Decode("Not a data URI".to_string()))?;

    let (metadata, encoded) = uri_data
        .split_once(',')
        .ok_or_else(|| ExportError::Decode("Invalid data URI: missing comma".to_string()))?;

    let mime = metadata.split(';').next().unwrap_or_default().to_string();
    let bytes = if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ExportError::Decode(format!("Failed to decode base64: {e}")))?
    } else {
        urlencoding_decode(encoded)?
    };

    Ok((mime, bytes))
}

/// Decode the image inside a data URI.
///
/// # Errors
///
/// Returns [`ExportError::Decode`] if the URI is malformed or the payload is
/// not an image.
pub fn load_image_from_data_uri(uri: &str) -> ExportResult<DecodedImage> {
    let (_, bytes) = decode_data_uri(uri)?;
    decode_image(&bytes)
}

/// Simple URL decoding (percent-encoding).
fn urlencoding_decode(input: &str) -> ExportResult<Vec<u8>> {
    let mut result = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();

    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hex: Vec<u8> = bytes.by_ref().take(2).collect();
            let parsed = std::str::from_utf8(&hex)
                .ok()
                .filter(|h| h.len() == 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            match parsed {
                Some(byte) => result.push(byte),
                None => return Err(ExportError::Decode("Invalid URL encoding".to_string())),
            }
            continue;
        }
        result.push(b);
    }

    Ok(result)
}
