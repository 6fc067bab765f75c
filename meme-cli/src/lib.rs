//! # Meme Canvas CLI
//!
//! Command-line host for the meme canvas: builds a scene from a saved
//! document or a template, renders it and exports the result to disk.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p meme-cli -- --template totr-square --text "hello" --out-dir out
//! ```
//!
//! ## From a saved scene:
//!
//! ```bash
//! cargo run -p meme-cli -- --scene scene.json --format jpg --quality 0.8
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ExportJobConfig` - Scene source, export overrides and output location
//! - `build_store` / `export_options` - Turn a config into a store and exporter options
//! - `CliError` - Failures while preparing a job

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::PathBuf;

use clap::Parser;
use meme_core::{
    CanvasError, ExportFormat, ExportSettingsUpdate, SceneDocument, SceneStore, Template,
    TextUpdate, WatermarkPosition,
};
use meme_renderer::{ExportOptions, DEFAULT_FILE_PREFIX, DEFAULT_WATERMARK};

/// Vertical gap between texts added from the command line.
const TEXT_LINE_SPACING: f32 = 48.0;

/// Command-line arguments for meme-cli.
#[derive(Debug, Clone, Parser)]
#[command(name = "meme-cli")]
#[command(about = "Render and export meme canvas scenes")]
#[command(version)]
pub struct CliArgs {
    /// Saved scene document (JSON) to load
    #[arg(long, env = "MEME_SCENE")]
    pub scene: Option<PathBuf>,

    /// Template id used when no scene is given
    #[arg(long, env = "MEME_TEMPLATE", default_value = meme_core::template::DEFAULT_TEMPLATE_ID)]
    pub template: String,

    /// Text layer to add (repeatable)
    #[arg(long = "text")]
    pub texts: Vec<String>,

    /// Output directory for exported files
    #[arg(long, env = "MEME_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// File name prefix
    #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
    pub prefix: String,

    /// Export format (png or jpg)
    #[arg(long)]
    pub format: Option<ExportFormat>,

    /// Encoder quality, 0.0 to 1.0
    #[arg(long)]
    pub quality: Option<f32>,

    /// Resolution multiplier
    #[arg(long)]
    pub scale: Option<f32>,

    /// Skip the watermark
    #[arg(long)]
    pub no_watermark: bool,

    /// Watermark text
    #[arg(long, env = "MEME_WATERMARK", default_value = DEFAULT_WATERMARK)]
    pub watermark_text: String,

    /// Watermark anchor (top-left, top-right, bottom-left, bottom-right, center)
    #[arg(long, default_value = "bottom-right")]
    pub watermark_position: WatermarkPosition,

    /// Directory relative image paths are resolved against
    #[arg(long, env = "MEME_RESOURCES_DIR")]
    pub resources_dir: Option<PathBuf>,

    /// Write the final scene document to this path
    #[arg(long)]
    pub save_scene: Option<PathBuf>,

    /// List the built-in templates and exit
    #[arg(long)]
    pub list_templates: bool,
}

/// Where the scene comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneSource {
    /// A saved scene document.
    Document(PathBuf),
    /// A fresh scene on a built-in template.
    Template(String),
}

/// Export job configuration.
#[derive(Debug, Clone)]
pub struct ExportJobConfig {
    /// Scene to export.
    pub source: SceneSource,
    /// Texts added on top of the scene.
    pub texts: Vec<String>,
    /// Export setting overrides.
    pub overrides: ExportSettingsUpdate,
    /// Watermark text.
    pub watermark_text: String,
    /// Watermark anchor.
    pub watermark_position: WatermarkPosition,
    /// Output directory.
    pub out_dir: PathBuf,
    /// File name prefix.
    pub prefix: String,
    /// Resource directory for image layers.
    pub resources_dir: Option<PathBuf>,
    /// Optional path for the final scene document.
    pub save_scene: Option<PathBuf>,
}

impl Default for ExportJobConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportJobConfig {
    /// Create a configuration exporting the default template.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: SceneSource::Template(meme_core::template::DEFAULT_TEMPLATE_ID.to_string()),
            texts: Vec::new(),
            overrides: ExportSettingsUpdate::default(),
            watermark_text: DEFAULT_WATERMARK.to_string(),
            watermark_position: WatermarkPosition::default(),
            out_dir: PathBuf::from("."),
            prefix: DEFAULT_FILE_PREFIX.to_string(),
            resources_dir: None,
            save_scene: None,
        }
    }
}

impl From<CliArgs> for ExportJobConfig {
    fn from(args: CliArgs) -> Self {
        let source = match args.scene {
            Some(path) => SceneSource::Document(path),
            None => SceneSource::Template(args.template),
        };
        Self {
            source,
            texts: args.texts,
            overrides: ExportSettingsUpdate {
                format: args.format,
                quality: args.quality,
                scale: args.scale,
                include_watermark: args.no_watermark.then_some(false),
            },
            watermark_text: args.watermark_text,
            watermark_position: args.watermark_position,
            out_dir: args.out_dir,
            prefix: args.prefix,
            resources_dir: args.resources_dir,
            save_scene: args.save_scene,
        }
    }
}

/// Errors raised while preparing an export job.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The scene file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The scene could not be built.
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

/// Build the scene store for a job: load or create the scene, then add the
/// extra texts and apply the export overrides.
///
/// # Errors
///
/// Returns an error if the scene file cannot be read or parsed, or the
/// template id is unknown.
pub fn build_store(config: &ExportJobConfig) -> Result<SceneStore, CliError> {
    let mut store = match &config.source {
        SceneSource::Document(path) => {
            let json = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.clone(),
                source,
            })?;
            tracing::debug!("Loaded scene from {}", path.display());
            SceneStore::from_document(SceneDocument::from_json(&json)?)
        }
        SceneSource::Template(id) => SceneStore::new(Template::by_id(id)?),
    };

    for (i, text) in config.texts.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = TEXT_LINE_SPACING * (i as f32 + 1.0);
        store.add_text(TextUpdate {
            text: Some(text.clone()),
            y: Some(y),
            ..TextUpdate::default()
        });
    }

    store.update_export_settings(&config.overrides);
    store.select_element(None);
    Ok(store)
}

/// Exporter options for a job: the store's settings plus watermark choices.
#[must_use]
pub fn export_options(config: &ExportJobConfig, store: &SceneStore) -> ExportOptions {
    ExportOptions {
        watermark_text: config.watermark_text.clone(),
        watermark_position: config.watermark_position,
        ..ExportOptions::from(store.export_settings())
    }
}
