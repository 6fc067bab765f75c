//! The render surface: materializes a scene onto a 2D drawing surface.
//!
//! The scene is first written as an SVG document (background, image layers,
//! text layers) and then rasterized with usvg/resvg into a tiny-skia pixmap.
//! The surface keeps the document from its last [`RenderSurface::sync`]; the
//! export pipeline reads that content, so an export always reflects what is
//! on screen at the moment it is invoked.

use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

use meme_core::{Layer, LayerId, Placement, SceneStore};

use crate::error::{RenderError, RenderResult};
use crate::hit::{self, ASCENT_EM, LINE_HEIGHT_EM};

/// Color of the selection box and transform anchors.
pub const ACCENT_COLOR: &str = "#00a1ff";

/// Side of a square resize anchor, in display pixels.
pub const ANCHOR_SIZE: f32 = 10.0;

/// Distance of the rotate anchor above the box, in display pixels.
pub const ROTATE_ANCHOR_OFFSET: f32 = 30.0;

/// Configuration for a render surface.
#[derive(Debug, Clone, Default)]
pub struct SurfaceConfig {
    /// Base directory for relative image references.
    pub resources_dir: Option<PathBuf>,
    /// Width of the on-screen container, if constrained.
    pub container_width: Option<f32>,
}

/// What the surface last drew, without any interaction overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceContent {
    /// Native canvas width in pixels.
    pub width: u32,
    /// Native canvas height in pixels.
    pub height: u32,
    /// SVG document of the scene at native resolution.
    pub svg: String,
    /// Store revision this content was built from.
    pub revision: u64,
}

/// A live geometry change being previewed during a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview<'a> {
    /// Layer being dragged or transformed.
    pub id: &'a LayerId,
    /// Its placement under the pointer.
    pub placement: Placement,
}

/// Draws a [`SceneStore`] and maps display coordinates back to the canvas.
pub struct RenderSurface {
    config: SurfaceConfig,
    content: Option<SurfaceContent>,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl RenderSurface {
    /// Create an unmounted surface, loading system fonts once.
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            config,
            content: None,
            fontdb: Arc::new(load_fonts()),
        }
    }

    /// Re-draw from the store if it changed since the last sync.
    ///
    /// Returns `true` if the content was rebuilt.
    pub fn sync(&mut self, store: &SceneStore) -> bool {
        if self
            .content
            .as_ref()
            .is_some_and(|c| c.revision == store.revision())
        {
            return false;
        }
        let (width, height) = store.canvas_size();
        tracing::trace!(
            "Surface sync: {} images, {} texts, {width}x{height}",
            store.images().len(),
            store.texts().len()
        );
        self.content = Some(SurfaceContent {
            width,
            height,
            svg: scene_svg(store, None),
            revision: store.revision(),
        });
        true
    }

    /// Detach the surface; exports fail until the next sync.
    pub fn unmount(&mut self) {
        self.content = None;
    }

    /// The last synced content, or `None` when unmounted.
    #[must_use]
    pub fn content(&self) -> Option<&SurfaceContent> {
        self.content.as_ref()
    }

    /// Number of font faces available for text rendering.
    #[must_use]
    pub fn font_faces(&self) -> usize {
        self.fontdb.len()
    }

    /// Set the on-screen container width.
    pub fn set_container_width(&mut self, width: Option<f32>) {
        self.config.container_width = width;
    }

    /// On-screen scale factor: shrinks to fit the container, never enlarges.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn display_scale(&self) -> f32 {
        let Some(content) = &self.content else {
            return 1.0;
        };
        match self.config.container_width {
            Some(container) if container > 0.0 && content.width > 0 => {
                (container / content.width as f32).min(1.0)
            }
            _ => 1.0,
        }
    }

    /// On-screen size of the surface, in display pixels.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn display_size(&self) -> (f32, f32) {
        let scale = self.display_scale();
        self.content.as_ref().map_or((0.0, 0.0), |c| {
            (c.width as f32 * scale, c.height as f32 * scale)
        })
    }

    /// Map a display-space point to native canvas coordinates.
    #[must_use]
    pub fn to_native(&self, x: f32, y: f32) -> (f32, f32) {
        let scale = self.display_scale();
        (x / scale, y / scale)
    }

    /// SVG for the interactive view: the scene plus the selection overlay.
    #[must_use]
    pub fn view_svg(&self, store: &SceneStore, preview: Option<Preview<'_>>) -> String {
        let mut svg = scene_svg(store, preview);
        if let Some(layer) = store.selected_layer() {
            let placement = match preview {
                Some(p) if p.id == layer.id() => p.placement,
                _ => layer.placement(),
            };
            svg.truncate(svg.len() - "</svg>".len());
            write_overlay(&mut svg, &layer, placement, self.display_scale());
            svg.push_str("</svg>");
        }
        svg
    }

    /// Rasterize the last synced content at `scale` × native resolution.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotMounted`] before the first sync, or an error
    /// if the document cannot be parsed or the pixmap cannot be allocated.
    pub fn rasterize(&self, scale: f32) -> RenderResult<tiny_skia::Pixmap> {
        let content = self.content.as_ref().ok_or(RenderError::NotMounted)?;
        self.rasterize_svg(&content.svg, scale)
    }

    /// Rasterize the interactive view (with overlay) at display scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be rasterized.
    pub fn rasterize_view(
        &self,
        store: &SceneStore,
        preview: Option<Preview<'_>>,
    ) -> RenderResult<tiny_skia::Pixmap> {
        let svg = self.view_svg(store, preview);
        self.rasterize_svg(&svg, self.display_scale())
    }

    /// Parse and draw an SVG document into a new pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn rasterize_svg(&self, svg: &str, scale: f32) -> RenderResult<tiny_skia::Pixmap> {
        let tree = self.parse_svg(svg)?;
        let px_w = (tree.size().width() * scale).round().max(1.0) as u32;
        let px_h = (tree.size().height() * scale).round().max(1.0) as u32;

        let mut pixmap =
            tiny_skia::Pixmap::new(px_w, px_h).ok_or(RenderError::Pixmap(px_w, px_h))?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap)
    }

    /// Draw an SVG document over an existing pixmap at 1:1.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed.
    pub(crate) fn draw_svg_over(&self, svg: &str, pixmap: &mut tiny_skia::Pixmap) -> RenderResult<()> {
        let tree = self.parse_svg(svg)?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        Ok(())
    }

    fn parse_svg(&self, svg: &str) -> RenderResult<usvg::Tree> {
        let mut opt = usvg::Options {
            resources_dir: self.config.resources_dir.clone(),
            ..usvg::Options::default()
        };
        opt.fontdb = Arc::clone(&self.fontdb);
        usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Svg(e.to_string()))
    }
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

/// Load system fonts, making sure `sans-serif` maps to an installed family.
fn load_fonts() -> usvg::fontdb::Database {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let query = usvg::fontdb::Query {
        families: &[usvg::fontdb::Family::SansSerif],
        ..usvg::fontdb::Query::default()
    };
    if db.query(&query).is_none() {
        let fallback = db
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
        if let Some(name) = fallback {
            tracing::debug!("No default sans-serif font, using {name}");
            db.set_sans_serif_family(name);
        }
    }
    tracing::debug!("Loaded {} font faces", db.len());
    db
}

/// Build the SVG document for the scene at native resolution.
///
/// Draw order: background color, template image, image layers, text layers.
#[must_use]
pub fn scene_svg(store: &SceneStore, preview: Option<Preview<'_>>) -> String {
    let (width, height) = store.canvas_size();
    let template = store.template();

    let mut svg = String::with_capacity(4096);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&template.background_color),
    );
    if let Some(src) = &template.background_image {
        let _ = write!(
            svg,
            "<image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>",
            escape_xml(src),
        );
    }

    for layer in store.layers() {
        let placement = match preview {
            Some(p) if p.id == layer.id() => p.placement,
            _ => layer.placement(),
        };
        render_layer_svg(&mut svg, &layer, placement);
    }

    svg.push_str("</svg>");
    svg
}

fn transform_attr(placement: Placement) -> String {
    format!(
        "translate({} {}) rotate({}) scale({} {})",
        placement.x, placement.y, placement.rotation, placement.scale_x, placement.scale_y
    )
}

/// Render a single layer to SVG.
#[allow(clippy::cast_precision_loss)]
fn render_layer_svg(svg: &mut String, layer: &Layer<'_>, placement: Placement) {
    let transform = transform_attr(placement);
    match layer {
        Layer::Image(image) => {
            if image.src.is_empty() {
                return;
            }
            let _ = write!(
                svg,
                "<image transform=\"{transform}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>",
                image.width,
                image.height,
                escape_xml(&image.src),
            );
        }
        Layer::Text(text) => {
            let stroke = match &text.stroke {
                Some(color) if text.stroke_width > 0.0 => format!(
                    " stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\" paint-order=\"stroke\"",
                    escape_xml(color),
                    text.stroke_width,
                ),
                _ => String::new(),
            };
            let _ = write!(
                svg,
                "<text transform=\"{transform}\" font-size=\"{}\" font-family=\"{}, sans-serif\" fill=\"{}\"{stroke}>",
                text.font_size,
                escape_xml(&text.font_family),
                escape_xml(&text.fill),
            );
            for (i, line) in text.text.split('\n').enumerate() {
                let baseline = (i as f32 * LINE_HEIGHT_EM + ASCENT_EM) * text.font_size;
                let _ = write!(
                    svg,
                    "<tspan x=\"0\" y=\"{baseline}\" xml:space=\"preserve\">{}</tspan>",
                    escape_xml(line),
                );
            }
            svg.push_str("</text>");
        }
    }
}

/// Selection box with eight resize anchors and a rotate anchor.
///
/// Sizes are given in display pixels and divided by the display scale so the
/// handles keep a constant on-screen size.
fn write_overlay(svg: &mut String, layer: &Layer<'_>, placement: Placement, display_scale: f32) {
    let (w, h) = hit::local_size(layer);
    let outline = hit::corners(&placement, (w, h));
    let stroke = 1.0 / display_scale;

    let points = outline
        .iter()
        .map(|(x, y)| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        svg,
        "<g class=\"transformer\"><polygon points=\"{points}\" fill=\"none\" stroke=\"{ACCENT_COLOR}\" stroke-width=\"{stroke}\"/>",
    );

    let top_mid = hit::to_canvas(&placement, w / 2.0, 0.0);
    let (rx, ry) = rotate_anchor(&placement, w, display_scale);
    let _ = write!(
        svg,
        "<line x1=\"{}\" y1=\"{}\" x2=\"{rx}\" y2=\"{ry}\" stroke=\"{ACCENT_COLOR}\" stroke-width=\"{stroke}\"/>",
        top_mid.0, top_mid.1,
    );

    let size = ANCHOR_SIZE / display_scale;
    for anchor in Anchor::RESIZE {
        let (ax, ay) = anchor.position(&placement, w, h);
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{size}\" height=\"{size}\" fill=\"#ffffff\" stroke=\"{ACCENT_COLOR}\" stroke-width=\"{stroke}\"/>",
            ax - size / 2.0,
            ay - size / 2.0,
        );
    }
    let _ = write!(
        svg,
        "<circle cx=\"{rx}\" cy=\"{ry}\" r=\"{}\" fill=\"#ffffff\" stroke=\"{ACCENT_COLOR}\" stroke-width=\"{stroke}\"/></g>",
        size / 2.0,
    );
}

/// Transform handles around the selected layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Top edge midpoint.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Right edge midpoint.
    MiddleRight,
    /// Bottom-right corner.
    BottomRight,
    /// Bottom edge midpoint.
    BottomCenter,
    /// Bottom-left corner.
    BottomLeft,
    /// Left edge midpoint.
    MiddleLeft,
    /// Rotation handle above the top edge.
    Rotate,
}

impl Anchor {
    /// The eight resize anchors.
    pub const RESIZE: [Anchor; 8] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleRight,
        Anchor::BottomRight,
        Anchor::BottomCenter,
        Anchor::BottomLeft,
        Anchor::MiddleLeft,
    ];

    /// Position of the anchor in the layer's unscaled local frame, as
    /// fractions of the box size. The rotate anchor has no fixed fraction.
    #[must_use]
    pub fn fraction(self) -> Option<(f32, f32)> {
        match self {
            Self::TopLeft => Some((0.0, 0.0)),
            Self::TopCenter => Some((0.5, 0.0)),
            Self::TopRight => Some((1.0, 0.0)),
            Self::MiddleRight => Some((1.0, 0.5)),
            Self::BottomRight => Some((1.0, 1.0)),
            Self::BottomCenter => Some((0.5, 1.0)),
            Self::BottomLeft => Some((0.0, 1.0)),
            Self::MiddleLeft => Some((0.0, 0.5)),
            Self::Rotate => None,
        }
    }

    /// Canvas position of a resize anchor for a `w`×`h` box.
    #[must_use]
    pub fn position(self, placement: &Placement, w: f32, h: f32) -> (f32, f32) {
        let (fx, fy) = self.fraction().unwrap_or((0.5, 0.0));
        hit::to_canvas(placement, fx * w, fy * h)
    }
}

/// Canvas position of the rotate anchor.
#[must_use]
pub fn rotate_anchor(placement: &Placement, w: f32, display_scale: f32) -> (f32, f32) {
    let offset = ROTATE_ANCHOR_OFFSET / display_scale;
    let (top_x, top_y) = hit::to_canvas(placement, w / 2.0, 0.0);
    let (sin, cos) = placement.rotation.to_radians().sin_cos();
    // "Up" in the layer frame is (sin, -cos) in canvas space.
    (top_x + offset * sin, top_y - offset * cos)
}

/// Escape special XML characters.
pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
