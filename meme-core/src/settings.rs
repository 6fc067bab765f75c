//! Per-session export settings.
//!
//! These are configuration, not scene content: changing them never records a
//! history entry.

use serde::{Deserialize, Serialize};

use crate::patch::{merge_field, Patch};

/// Raster output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG (lossless, keeps alpha).
    #[default]
    Png,
    /// JPEG (lossy, flattened).
    #[serde(alias = "jpeg")]
    Jpg,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    /// MIME type used in data URIs.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

/// Where the watermark is anchored on the exported image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    #[default]
    BottomRight,
    /// Centered.
    Center,
}

impl std::str::FromStr for WatermarkPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            "center" => Ok(Self::Center),
            other => Err(format!("unknown watermark position: {other}")),
        }
    }
}

/// Export configuration for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Output format.
    pub format: ExportFormat,
    /// Encoder quality, 0.0 to 1.0 (JPEG only).
    pub quality: f32,
    /// Render scale multiplier, at least 1.
    pub scale: f32,
    /// Whether the watermark is composited.
    pub include_watermark: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 0.92,
            scale: 1.0,
            include_watermark: true,
        }
    }
}

impl ExportSettings {
    /// Clamp quality into `0..=1` and raise scale to at least 1.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.quality = if self.quality.is_finite() {
            self.quality.clamp(0.0, 1.0)
        } else {
            Self::default().quality
        };
        self.scale = if self.scale.is_finite() {
            self.scale.max(1.0)
        } else {
            1.0
        };
        self
    }
}

/// Partial update for [`ExportSettings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ExportSettingsUpdate {
    pub format: Option<ExportFormat>,
    pub quality: Option<f32>,
    pub scale: Option<f32>,
    pub include_watermark: Option<bool>,
}

impl Patch<ExportSettings> for ExportSettingsUpdate {
    fn apply_to(&self, target: &mut ExportSettings) -> bool {
        let mut changed = merge_field(&mut target.format, self.format.as_ref());
        changed |= merge_field(&mut target.quality, self.quality.as_ref());
        changed |= merge_field(&mut target.scale, self.scale.as_ref());
        changed |= merge_field(&mut target.include_watermark, self.include_watermark.as_ref());
        *target = target.normalized();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert_eq!("jpeg".parse::<ExportFormat>(), Ok(ExportFormat::Jpg));
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Jpg.mime(), "image/jpeg");
    }

    #[test]
    fn test_update_clamps() {
        let mut settings = ExportSettings::default();
        let update = ExportSettingsUpdate {
            quality: Some(1.7),
            scale: Some(0.25),
            ..ExportSettingsUpdate::default()
        };
        assert!(update.apply_to(&mut settings));
        assert!((settings.quality - 1.0).abs() < f32::EPSILON);
        assert!((settings.scale - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!(
            "top-left".parse::<WatermarkPosition>(),
            Ok(WatermarkPosition::TopLeft)
        );
        assert_eq!(WatermarkPosition::default(), WatermarkPosition::BottomRight);
    }
}
