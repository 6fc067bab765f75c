//! Rules of the text/style editor panel.
//!
//! The panel edits the selected text layer through [`TextStyleEdit`], which
//! validates user input and turns it into a [`TextUpdate`] for the store.

use std::ops::RangeInclusive;

use crate::{CanvasError, CanvasResult, LayerId, SceneStore, TextUpdate};

/// Font families offered by the panel.
pub const FONT_FAMILIES: [&str; 6] = [
    "Impact",
    "Arial",
    "Comic Sans MS",
    "Times New Roman",
    "Courier New",
    "Georgia",
];

/// Font size slider bounds, in pixels.
pub const FONT_SIZE_RANGE: RangeInclusive<f32> = 12.0..=120.0;

/// Stroke width slider bounds, in pixels.
pub const STROKE_WIDTH_RANGE: RangeInclusive<f32> = 0.0..=10.0;

/// Preset color swatches.
pub const COLOR_SWATCHES: [&str; 10] = [
    "#ffffff", "#000000", "#ff0000", "#ffeb3b", "#4caf50", "#2196f3", "#9c27b0", "#ff9800",
    "#ff6b9d", "#1a1a2e",
];

/// Normalize a free-form hex color to lower-case `#rrggbb`.
///
/// Accepts `#rgb` and `#rrggbb`, with or without the leading `#`.
///
/// # Errors
///
/// Returns [`CanvasError::InvalidStyle`] for anything else.
pub fn normalize_hex(input: &str) -> CanvasResult<String> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CanvasError::InvalidStyle(format!("not a hex color: {input}")));
    }
    let digits = digits.to_ascii_lowercase();
    match digits.len() {
        3 => Ok(digits.chars().fold(String::from("#"), |mut out, c| {
            out.push(c);
            out.push(c);
            out
        })),
        6 => Ok(format!("#{digits}")),
        _ => Err(CanvasError::InvalidStyle(format!("not a hex color: {input}"))),
    }
}

/// Resolve a font family against the allow-list, case-insensitively.
///
/// # Errors
///
/// Returns [`CanvasError::InvalidStyle`] if the family is not offered.
pub fn font_family(name: &str) -> CanvasResult<&'static str> {
    FONT_FAMILIES
        .iter()
        .copied()
        .find(|family| family.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CanvasError::InvalidStyle(format!("unsupported font family: {name}")))
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

/// One round of edits from the panel. Absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyleEdit {
    /// New text content.
    pub text: Option<String>,
    /// Font family; must be on the allow-list.
    pub font_family: Option<String>,
    /// Font size; clamped to [`FONT_SIZE_RANGE`].
    pub font_size: Option<f32>,
    /// Fill color; swatch or hex.
    pub fill: Option<String>,
    /// Stroke color; `Some(None)` removes the outline.
    pub stroke: Option<Option<String>>,
    /// Stroke width; clamped to [`STROKE_WIDTH_RANGE`].
    pub stroke_width: Option<f32>,
}

impl TextStyleEdit {
    /// Validate the edit and convert it into a store update.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidStyle`] for an unknown font family or a
    /// malformed color. Sizes outside the slider range are clamped instead.
    pub fn into_update(self) -> CanvasResult<TextUpdate> {
        let font_family = self
            .font_family
            .as_deref()
            .map(font_family)
            .transpose()?
            .map(str::to_string);
        let fill = self.fill.as_deref().map(normalize_hex).transpose()?;
        let stroke = match self.stroke {
            Some(Some(color)) => Some(Some(normalize_hex(&color)?)),
            Some(None) => Some(None),
            None => None,
        };

        Ok(TextUpdate {
            text: self.text,
            font_family,
            font_size: self.font_size.map(|s| clamp_to(s, &FONT_SIZE_RANGE)),
            fill,
            stroke,
            stroke_width: self.stroke_width.map(|w| clamp_to(w, &STROKE_WIDTH_RANGE)),
            ..TextUpdate::default()
        })
    }

    /// Validate and apply the edit to text layer `id`.
    ///
    /// Returns whether the store changed.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidStyle`] if validation fails; the store is
    /// untouched in that case.
    pub fn apply(self, store: &mut SceneStore, id: &LayerId) -> CanvasResult<bool> {
        let update = self.into_update()?;
        Ok(store.update_text(id, &update))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("#FFF").expect("short"), "#ffffff");
        assert_eq!(normalize_hex("ff6B9d").expect("long"), "#ff6b9d");
        assert!(normalize_hex("#ggg").is_err());
        assert!(normalize_hex("#12345").is_err());
        assert!(normalize_hex("").is_err());
    }

    #[test]
    fn test_swatches_are_normalized() {
        for swatch in COLOR_SWATCHES {
            assert_eq!(normalize_hex(swatch).expect("swatch"), swatch);
        }
    }

    #[test]
    fn test_font_family_allow_list() {
        assert_eq!(font_family("comic sans ms").expect("known"), "Comic Sans MS");
        assert!(font_family("Wingdings").is_err());
    }

    #[test]
    fn test_sizes_are_clamped() {
        let update = TextStyleEdit {
            font_size: Some(400.0),
            stroke_width: Some(-3.0),
            ..TextStyleEdit::default()
        }
        .into_update()
        .expect("valid");
        assert_eq!(update.font_size, Some(120.0));
        assert_eq!(update.stroke_width, Some(0.0));
    }

    #[test]
    fn test_apply_to_store() {
        let mut store = SceneStore::default();
        let id = store.add_text(TextUpdate::default());
        let len = store.history_len();

        let changed = TextStyleEdit {
            fill: Some("#F00".to_string()),
            stroke: Some(None),
            ..TextStyleEdit::default()
        }
        .apply(&mut store, &id)
        .expect("valid");

        assert!(changed);
        assert_eq!(store.history_len(), len + 1);
        let layer = store.text(&id).expect("layer");
        assert_eq!(layer.fill, "#ff0000");
        assert_eq!(layer.stroke, None);

        let rejected = TextStyleEdit {
            font_family: Some("Papyrus".to_string()),
            ..TextStyleEdit::default()
        }
        .apply(&mut store, &id);
        assert!(rejected.is_err());
        assert_eq!(store.history_len(), len + 1);
    }
}
