//! Serializable scene documents.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, ExportSettings, ImageLayer, Template, TextLayer};

/// Everything needed to recreate a scene, minus history and selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Active template.
    pub template: Template,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
    /// Text layers, in draw order.
    #[serde(default)]
    pub texts: Vec<TextLayer>,
    /// Image layers, in draw order.
    #[serde(default)]
    pub images: Vec<ImageLayer>,
    /// Export settings for the session.
    #[serde(default)]
    pub export_settings: ExportSettings,
}

impl SceneDocument {
    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string_pretty(self).map_err(CanvasError::Serialization)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a scene.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json).map_err(CanvasError::Serialization)
    }
}
