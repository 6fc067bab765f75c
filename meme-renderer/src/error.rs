//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while drawing the surface.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The surface has not been synced with a scene yet.
    #[error("Render surface is not mounted")]
    NotMounted,

    /// The scene document could not be parsed as SVG.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// A pixmap of the requested size could not be allocated.
    #[error("Failed to create {0}x{1} pixmap")]
    Pixmap(u32, u32),
}

/// Errors that can occur in the export pipeline.
///
/// These never escape into the scene store; callers log them and show the
/// export as failed.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No render surface to read from.
    #[error("No render surface available for export")]
    SurfaceUnavailable,

    /// Rasterizing the surface failed.
    #[error("Rasterization failed: {0}")]
    Render(#[from] RenderError),

    /// Encoding the raster image failed.
    #[error("{0} encoding failed: {1}")]
    Encode(&'static str, String),

    /// Decoding the base image for watermarking failed.
    #[error("Image decode failed: {0}")]
    Decode(String),
}
