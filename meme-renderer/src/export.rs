//! Export pipeline: render surface → raster image → optional watermark.
//!
//! 1. Rasterize the surface at `scale` × native resolution and encode it in
//!    the requested format. This is the base image.
//! 2. Without a watermark, the base image is the result.
//! 3. With a watermark, the base image is decoded again, redrawn at full size
//!    with the watermark text on top, and re-encoded as PNG.
//!
//! Failures are reported as [`ExportError`] and never touch the scene store.

use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use image::ImageEncoder;
use meme_core::{ExportFormat, ExportSettings, WatermarkPosition};

use crate::codec::{decode_image, encode_data_uri};
use crate::download::DownloadSink;
use crate::error::{ExportError, ExportResult};
use crate::surface::{escape_xml, RenderSurface};

/// Watermark text used when none is given.
pub const DEFAULT_WATERMARK: &str = "totr.meme";

/// File name prefix for downloads.
pub const DEFAULT_FILE_PREFIX: &str = "totr-meme";

/// Distance between the watermark and the image edge, in pixels.
pub const WATERMARK_PADDING: f32 = 10.0;

/// Smallest watermark font size, in pixels.
pub const WATERMARK_MIN_FONT_SIZE: f32 = 12.0;

/// Watermark font size as a fraction of the image width.
pub const WATERMARK_FONT_RATIO: f32 = 0.025;

/// JPEG is flattened over this color.
const JPEG_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Options for one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Requested output format.
    pub format: ExportFormat,
    /// Encoder quality, 0.0 to 1.0.
    pub quality: f32,
    /// Resolution multiplier, at least 1.
    pub scale: f32,
    /// Whether to composite the watermark.
    pub include_watermark: bool,
    /// Watermark text.
    pub watermark_text: String,
    /// Watermark anchor.
    pub watermark_position: WatermarkPosition,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&ExportSettings::default())
    }
}

impl From<&ExportSettings> for ExportOptions {
    fn from(settings: &ExportSettings) -> Self {
        let settings = settings.normalized();
        Self {
            format: settings.format,
            quality: settings.quality,
            scale: settings.scale,
            include_watermark: settings.include_watermark,
            watermark_text: DEFAULT_WATERMARK.to_string(),
            watermark_position: WatermarkPosition::default(),
        }
    }
}

/// An encoded export result.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Format of `bytes`. Watermarked exports are always PNG.
    pub format: ExportFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ExportedImage {
    /// The image as a base64 `data:` URI.
    #[must_use]
    pub fn data_uri(&self) -> String {
        encode_data_uri(self.format.mime(), &self.bytes)
    }

    /// Download file name: `<prefix>-<epoch-ms>.<ext>`.
    #[must_use]
    pub fn file_name(&self, prefix: &str, epoch_ms: u128) -> String {
        format!("{prefix}-{epoch_ms}.{}", self.format.extension())
    }
}

/// Exports the content of a [`RenderSurface`].
pub struct SceneExporter {
    options: ExportOptions,
}

impl SceneExporter {
    /// Create an exporter with the given options.
    #[must_use]
    pub fn new(mut options: ExportOptions) -> Self {
        options.quality = options.quality.clamp(0.0, 1.0);
        options.scale = options.scale.max(1.0);
        Self { options }
    }

    /// Create an exporter with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportOptions::default())
    }

    /// The options this exporter uses.
    #[must_use]
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export the surface's current content.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::SurfaceUnavailable`] if the surface is not
    /// mounted, [`ExportError::Decode`] if the watermark step cannot decode
    /// the base image, or a render/encode error.
    pub fn export(&self, surface: &RenderSurface) -> ExportResult<ExportedImage> {
        let base = self.render_base(surface)?;
        if !self.options.include_watermark {
            return Ok(base);
        }
        self.apply_watermark(surface, &base)
    }

    /// Export the surface's current content as a data URI.
    ///
    /// # Errors
    ///
    /// See [`SceneExporter::export`].
    pub fn export_data_uri(&self, surface: &RenderSurface) -> ExportResult<String> {
        self.export(surface).map(|image| image.data_uri())
    }

    /// Export and hand the file to `sink` as `<prefix>-<epoch-ms>.<ext>`.
    ///
    /// Failures are logged and reported as `false`.
    pub fn download(&self, surface: &RenderSurface, prefix: &str, sink: &mut dyn DownloadSink) -> bool {
        let image = match self.export(surface) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Export failed: {e}");
                return false;
            }
        };

        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let file_name = image.file_name(prefix, epoch_ms);

        match sink.save(&file_name, &image.bytes) {
            Ok(()) => {
                tracing::info!(
                    "Exported {file_name} ({}x{}, {} bytes)",
                    image.width,
                    image.height,
                    image.bytes.len()
                );
                true
            }
            Err(e) => {
                tracing::warn!("Saving {file_name} failed: {e}");
                false
            }
        }
    }

    /// Rasterize and encode the surface in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is unmounted, or rasterization or
    /// encoding fails.
    pub fn render_base(&self, surface: &RenderSurface) -> ExportResult<ExportedImage> {
        if surface.content().is_none() {
            return Err(ExportError::SurfaceUnavailable);
        }
        let pixmap = surface.rasterize(self.options.scale)?;
        let (width, height) = (pixmap.width(), pixmap.height());

        let bytes = match self.options.format {
            ExportFormat::Png => encode_png(&pixmap)?,
            ExportFormat::Jpg => encode_jpeg(&pixmap, self.options.quality)?,
        };
        tracing::debug!(
            "Base image {width}x{height} {:?}, {} bytes",
            self.options.format,
            bytes.len()
        );

        Ok(ExportedImage {
            bytes,
            format: self.options.format,
            width,
            height,
        })
    }

    /// Decode `base`, draw the watermark over it and re-encode as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Decode`] if `base` cannot be decoded.
    pub fn apply_watermark(
        &self,
        surface: &RenderSurface,
        base: &ExportedImage,
    ) -> ExportResult<ExportedImage> {
        let decoded = decode_image(&base.bytes)?;
        let (width, height) = (decoded.width, decoded.height);
        let mut pixmap = decoded
            .into_pixmap()
            .ok_or_else(|| ExportError::Decode(format!("Empty {width}x{height} image")))?;

        let svg = watermark_svg(
            width,
            height,
            &self.options.watermark_text,
            self.options.watermark_position,
        );
        surface.draw_svg_over(&svg, &mut pixmap)?;

        Ok(ExportedImage {
            bytes: encode_png(&pixmap)?,
            format: ExportFormat::Png,
            width,
            height,
        })
    }
}

/// Export `surface` with `options` and hand the file to `sink`.
///
/// Shorthand for [`SceneExporter::download`]; returns `false` on failure.
pub fn download(
    surface: &RenderSurface,
    options: &ExportOptions,
    prefix: &str,
    sink: &mut dyn DownloadSink,
) -> bool {
    SceneExporter::new(options.clone()).download(surface, prefix, sink)
}

/// Watermark font size for an image `width` pixels wide.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn watermark_font_size(width: u32) -> f32 {
    (width as f32 * WATERMARK_FONT_RATIO).max(WATERMARK_MIN_FONT_SIZE)
}

/// Baseline origin and `text-anchor` of the watermark.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn watermark_origin(
    width: u32,
    height: u32,
    font_size: f32,
    position: WatermarkPosition,
) -> (f32, f32, &'static str) {
    let (w, h) = (width as f32, height as f32);
    let left = WATERMARK_PADDING;
    let right = w - WATERMARK_PADDING;
    let top = WATERMARK_PADDING + font_size;
    let bottom = h - WATERMARK_PADDING;

    match position {
        WatermarkPosition::TopLeft => (left, top, "start"),
        WatermarkPosition::TopRight => (right, top, "end"),
        WatermarkPosition::BottomLeft => (left, bottom, "start"),
        WatermarkPosition::BottomRight => (right, bottom, "end"),
        WatermarkPosition::Center => (w / 2.0, h / 2.0 + font_size * 0.35, "middle"),
    }
}

/// SVG overlay holding just the watermark text.
fn watermark_svg(width: u32, height: u32, text: &str, position: WatermarkPosition) -> String {
    let font_size = watermark_font_size(width);
    let (x, y, anchor) = watermark_origin(width, height, font_size, position);
    let stroke_width = (font_size / 12.0).max(1.0);

    let mut svg = String::with_capacity(512);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<text x=\"{x}\" y=\"{y}\" font-size=\"{font_size}\" font-family=\"sans-serif\" text-anchor=\"{anchor}\" fill=\"#ffffff\" fill-opacity=\"0.7\" stroke=\"#000000\" stroke-opacity=\"0.5\" stroke-width=\"{stroke_width}\" paint-order=\"stroke\">{}</text>",
        escape_xml(text),
    );
    svg.push_str("</svg>");
    svg
}

fn encode_png(pixmap: &tiny_skia::Pixmap) -> ExportResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode("PNG", e.to_string()))
}

/// Flatten the premultiplied pixmap over white and encode as JPEG.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn encode_jpeg(pixmap: &tiny_skia::Pixmap, quality: f32) -> ExportResult<Vec<u8>> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut rgb_data = Vec::with_capacity(pixmap.data().len() / 4 * 3);
    for pixel in pixmap.data().chunks_exact(4) {
        let inv = 1.0 - f32::from(pixel[3]) / 255.0;
        for (channel, bg) in pixel[..3].iter().zip(JPEG_BACKGROUND) {
            rgb_data.push(f32::from(bg).mul_add(inv, f32::from(*channel)).round() as u8);
        }
    }

    let jpeg_quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, jpeg_quality);
    encoder
        .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
        .map_err(|e| ExportError::Encode("JPEG", e.to_string()))?;

    Ok(buf.into_inner())
}
