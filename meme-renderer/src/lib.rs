//! # Meme Canvas Renderer
//!
//! Draws a [`meme_core::SceneStore`] and exports it as PNG or JPEG.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   sync    ┌───────────────┐  rasterize  ┌──────────────┐
//! │  SceneStore  │ ────────▶ │ RenderSurface │ ──────────▶ │ tiny-skia    │
//! │  (meme-core) │ ◀──────── │  (SVG + hit)  │             │ Pixmap       │
//! └──────────────┘  commit   └───────────────┘             └──────┬───────┘
//!        ▲                          ▲                             │ encode
//!        │                  pointer │                             ▼
//!   InteractionController ──────────┘                  SceneExporter (+ watermark)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod download;
pub mod error;
pub mod export;
pub mod hit;
pub mod interaction;
pub mod surface;

pub use codec::{decode_data_uri, decode_image, encode_data_uri, load_image_from_data_uri, DecodedImage};
pub use download::{DirectorySink, DownloadSink, MemorySink};
pub use error::{ExportError, ExportResult, RenderError, RenderResult};
pub use export::{
    download, ExportOptions, ExportedImage, SceneExporter, DEFAULT_FILE_PREFIX, DEFAULT_WATERMARK,
};
pub use hit::hit_test;
pub use interaction::{InteractionController, InteractionOutcome};
pub use surface::{Anchor, Preview, RenderSurface, SurfaceConfig, SurfaceContent};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
