//! Canvas layers - the text and image elements placed over a template.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patch::{merge_field, merge_finite, Patch};

/// Default text content for a freshly added text layer.
pub const DEFAULT_TEXT: &str = "Your text";

/// Default font family for a freshly added text layer.
pub const DEFAULT_FONT_FAMILY: &str = "Impact";

/// Unique identifier for a layer.
///
/// Generated ids look like `text-1718000000000-3f9a0c1b2`: the layer kind,
/// the creation time in epoch milliseconds and a random hex suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// Generate a new unique id for a layer of the given kind.
    #[must_use]
    pub fn generate(kind: LayerKind) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{millis}-{}", kind.as_str(), &suffix[..9]))
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discriminant of a [`Layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// A text layer.
    Text,
    /// An image layer.
    Image,
}

impl LayerKind {
    /// Lower-case name, used in generated ids and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// Position, rotation and scale shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// X position (pixels from the left edge of the canvas).
    pub x: f32,
    /// Y position (pixels from the top edge of the canvas).
    pub y: f32,
    /// Rotation in degrees, clockwise, around the layer origin.
    pub rotation: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
}

impl Placement {
    /// An unrotated, unscaled placement at `(x, y)`.
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// A positioned, styled string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    /// Unique identifier.
    pub id: LayerId,
    /// Text content.
    pub text: String,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Font size in pixels.
    pub font_size: f32,
    /// Font family name.
    pub font_family: String,
    /// Fill color as hex.
    pub fill: String,
    /// Optional outline color as hex.
    pub stroke: Option<String>,
    /// Outline width in pixels.
    pub stroke_width: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
}

impl TextLayer {
    /// Create a text layer with default content and style.
    #[must_use]
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            text: DEFAULT_TEXT.to_string(),
            x: 50.0,
            y: 50.0,
            font_size: 32.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            fill: "#ffffff".to_string(),
            stroke: Some("#000000".to_string()),
            stroke_width: 2.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Current placement of this layer.
    #[must_use]
    pub fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }
}

/// A positioned bitmap reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    /// Unique identifier.
    pub id: LayerId,
    /// Image source URI (path or `data:` URI).
    pub src: String,
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
}

impl ImageLayer {
    /// Create an empty 100x100 image layer at the origin.
    #[must_use]
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            src: String::new(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Current placement of this layer.
    #[must_use]
    pub fn placement(&self) -> Placement {
        Placement {
            x: self.x,
            y: self.y,
            rotation: self.rotation,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
        }
    }
}

/// A borrowed view of either kind of layer.
///
/// Renderers and hit testing dispatch on this with a `match`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Layer<'a> {
    /// A text layer.
    Text(&'a TextLayer),
    /// An image layer.
    Image(&'a ImageLayer),
}

impl Layer<'_> {
    /// The layer id.
    #[must_use]
    pub fn id(&self) -> &LayerId {
        match self {
            Self::Text(text) => &text.id,
            Self::Image(image) => &image.id,
        }
    }

    /// The layer discriminant.
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Text(_) => LayerKind::Text,
            Self::Image(_) => LayerKind::Image,
        }
    }

    /// Current placement of the layer.
    #[must_use]
    pub fn placement(&self) -> Placement {
        match self {
            Self::Text(text) => text.placement(),
            Self::Image(image) => image.placement(),
        }
    }
}

/// Partial update for a [`TextLayer`]. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct TextUpdate {
    pub text: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub fill: Option<String>,
    /// `Some(None)` removes the outline.
    pub stroke: Option<Option<String>>,
    pub stroke_width: Option<f32>,
    pub rotation: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
}

impl TextUpdate {
    /// Update that only sets the text content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Update that moves the layer.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Update carrying a full placement, as reported after a transform gesture.
    #[must_use]
    pub fn placement(placement: Placement) -> Self {
        Self {
            x: Some(placement.x),
            y: Some(placement.y),
            rotation: Some(placement.rotation),
            scale_x: Some(placement.scale_x),
            scale_y: Some(placement.scale_y),
            ..Self::default()
        }
    }
}

impl Patch<TextLayer> for TextUpdate {
    fn apply_to(&self, target: &mut TextLayer) -> bool {
        let mut changed = merge_field(&mut target.text, self.text.as_ref());
        changed |= merge_finite(&mut target.x, self.x.as_ref());
        changed |= merge_finite(&mut target.y, self.y.as_ref());
        changed |= merge_finite(&mut target.font_size, self.font_size.as_ref());
        changed |= merge_field(&mut target.font_family, self.font_family.as_ref());
        changed |= merge_field(&mut target.fill, self.fill.as_ref());
        changed |= merge_field(&mut target.stroke, self.stroke.as_ref());
        changed |= merge_finite(&mut target.stroke_width, self.stroke_width.as_ref());
        changed |= merge_finite(&mut target.rotation, self.rotation.as_ref());
        changed |= merge_finite(&mut target.scale_x, self.scale_x.as_ref());
        changed |= merge_finite(&mut target.scale_y, self.scale_y.as_ref());
        changed
    }
}

/// Partial update for an [`ImageLayer`]. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ImageUpdate {
    pub src: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
}

impl ImageUpdate {
    /// Update that only sets the source.
    #[must_use]
    pub fn src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    /// Update that moves the layer.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Update carrying a full placement, as reported after a transform gesture.
    #[must_use]
    pub fn placement(placement: Placement) -> Self {
        Self {
            x: Some(placement.x),
            y: Some(placement.y),
            rotation: Some(placement.rotation),
            scale_x: Some(placement.scale_x),
            scale_y: Some(placement.scale_y),
            ..Self::default()
        }
    }
}

impl Patch<ImageLayer> for ImageUpdate {
    fn apply_to(&self, target: &mut ImageLayer) -> bool {
        let mut changed = merge_field(&mut target.src, self.src.as_ref());
        changed |= merge_finite(&mut target.x, self.x.as_ref());
        changed |= merge_finite(&mut target.y, self.y.as_ref());
        changed |= merge_finite(&mut target.width, self.width.as_ref());
        changed |= merge_finite(&mut target.height, self.height.as_ref());
        changed |= merge_finite(&mut target.rotation, self.rotation.as_ref());
        changed |= merge_finite(&mut target.scale_x, self.scale_x.as_ref());
        changed |= merge_finite(&mut target.scale_y, self.scale_y.as_ref());
        changed
    }
}
