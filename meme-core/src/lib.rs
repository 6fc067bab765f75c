//! # Meme Canvas Core
//!
//! Scene state for the meme editor: templates, text and image layers,
//! selection, undo/redo history and export settings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 meme-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Scene Store     │  Editor Panels           │
//! │  - Template      │  - Template selector     │
//! │  - Text/Image    │  - Text style rules      │
//! │  - Selection     │  - Export button state   │
//! ├─────────────────────────────────────────────┤
//! │  History (50 snapshots, linear undo/redo)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Data flows one way: gesture → surface event → store mutation → history
//! snapshot → re-render.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod editor;
pub mod error;
pub mod event;
pub mod history;
pub mod layer;
pub mod patch;
pub mod scene;
pub mod settings;
pub mod state;
pub mod store;
pub mod template;

pub use error::{CanvasError, CanvasResult};
pub use event::{PointerEvent, PointerPhase};
pub use history::{History, Snapshot, MAX_HISTORY};
pub use layer::{
    ImageLayer, ImageUpdate, Layer, LayerId, LayerKind, Placement, TextLayer, TextUpdate,
};
pub use patch::Patch;
pub use scene::SceneDocument;
pub use settings::{ExportFormat, ExportSettings, ExportSettingsUpdate, WatermarkPosition};
pub use state::{ExportButton, ExportStatus};
pub use store::{SceneStore, Selection};
pub use template::Template;

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
