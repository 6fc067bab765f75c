//! Background templates.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult};

/// Id of the template a new editor session starts with.
pub const DEFAULT_TEMPLATE_ID: &str = "totr-classic";

/// A background preset with a fixed canvas size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Template identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional background image reference drawn over the color.
    pub background_image: Option<String>,
    /// Background color as hex.
    pub background_color: String,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl Template {
    /// Create a plain-color template.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        background_color: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            background_image: None,
            background_color: background_color.into(),
            width,
            height,
        }
    }

    /// Set the background image reference.
    #[must_use]
    pub fn with_background_image(mut self, src: impl Into<String>) -> Self {
        self.background_image = Some(src.into());
        self
    }

    /// The built-in templates, in selector order.
    #[must_use]
    pub fn builtin() -> Vec<Template> {
        vec![
            Self::new(DEFAULT_TEMPLATE_ID, "Classic", "#1a1a2e", 480, 360),
            Self::new("totr-square", "Square", "#ffffff", 600, 600),
            Self::new("totr-story", "Story", "#ff6b9d", 540, 960),
        ]
    }

    /// Look up a built-in template by id.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::UnknownTemplate`] if no built-in has this id.
    pub fn by_id(id: &str) -> CanvasResult<Template> {
        Self::builtin()
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CanvasError::UnknownTemplate(id.to_string()))
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_ID, "Classic", "#1a1a2e", 480, 360)
    }
}
