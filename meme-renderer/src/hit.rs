//! Layer geometry and hit testing: point → layer lookup.
//!
//! Layers are drawn in a local frame anchored at `(x, y)`, then rotated and
//! scaled around that anchor. Hit testing maps the point back into the local
//! frame and checks the unscaled box.

use meme_core::{Layer, Placement, SceneStore, Selection, TextLayer};

/// Estimated glyph advance, as a fraction of the font size.
pub const CHAR_WIDTH_EM: f32 = 0.6;

/// Line height, as a fraction of the font size.
pub const LINE_HEIGHT_EM: f32 = 1.0;

/// Baseline offset of the first line, as a fraction of the font size.
pub const ASCENT_EM: f32 = 0.8;

/// Unscaled size of a text layer's box.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn text_box(text: &TextLayer) -> (f32, f32) {
    let lines: Vec<&str> = text.text.split('\n').collect();
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = widest as f32 * CHAR_WIDTH_EM * text.font_size;
    let height = lines.len() as f32 * LINE_HEIGHT_EM * text.font_size;
    (width, height)
}

/// Unscaled size of a layer's box in its local frame.
#[must_use]
pub fn local_size(layer: &Layer<'_>) -> (f32, f32) {
    match layer {
        Layer::Text(text) => text_box(text),
        Layer::Image(image) => (image.width, image.height),
    }
}

/// Map a local-frame point to canvas coordinates.
#[must_use]
pub fn to_canvas(placement: &Placement, lx: f32, ly: f32) -> (f32, f32) {
    let (sin, cos) = placement.rotation.to_radians().sin_cos();
    let sx = lx * placement.scale_x;
    let sy = ly * placement.scale_y;
    (
        placement.x + sx * cos - sy * sin,
        placement.y + sx * sin + sy * cos,
    )
}

/// Map a canvas point into the layer's rotated frame, before un-scaling.
#[must_use]
pub fn to_rotated_frame(placement: &Placement, px: f32, py: f32) -> (f32, f32) {
    let (sin, cos) = placement.rotation.to_radians().sin_cos();
    let dx = px - placement.x;
    let dy = py - placement.y;
    (dx * cos + dy * sin, -dx * sin + dy * cos)
}

/// Whether canvas point `(px, py)` falls inside `layer`.
#[must_use]
pub fn contains(layer: &Layer<'_>, px: f32, py: f32) -> bool {
    let placement = layer.placement();
    if placement.scale_x == 0.0 || placement.scale_y == 0.0 {
        return false;
    }
    let (u, v) = to_rotated_frame(&placement, px, py);
    let lx = u / placement.scale_x;
    let ly = v / placement.scale_y;
    let (w, h) = local_size(layer);
    (0.0..=w).contains(&lx) && (0.0..=h).contains(&ly)
}

/// The four corners of a `(w, h)` box placed at `placement`, in canvas
/// coordinates, clockwise from the origin.
#[must_use]
pub fn corners(placement: &Placement, (w, h): (f32, f32)) -> [(f32, f32); 4] {
    [
        to_canvas(placement, 0.0, 0.0),
        to_canvas(placement, w, 0.0),
        to_canvas(placement, w, h),
        to_canvas(placement, 0.0, h),
    ]
}

/// Find the topmost layer at canvas point `(px, py)`.
///
/// Texts are above images and later entries above earlier ones, so the walk
/// runs back to front. Returns `None` for the background.
#[must_use]
pub fn hit_test(store: &SceneStore, px: f32, py: f32) -> Option<Selection> {
    store
        .layers()
        .rev()
        .find(|layer| contains(layer, px, py))
        .map(|layer| Selection {
            id: layer.id().clone(),
            kind: layer.kind(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meme_core::{ImageUpdate, Template, TextUpdate};

    #[test]
    fn test_text_box_estimate() {
        let mut text = TextLayer::new("t".into());
        text.text = "abcd\nab".to_string();
        text.font_size = 10.0;
        let (w, h) = text_box(&text);
        assert!((w - 24.0).abs() < 1e-4);
        assert!((h - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_corners_follow_rotation_and_scale() {
        let placement = Placement {
            x: 10.0,
            y: 20.0,
            rotation: 90.0,
            scale_x: 2.0,
            scale_y: 1.0,
        };
        let expected = [(10.0, 20.0), (10.0, 60.0), (0.0, 60.0), (0.0, 20.0)];
        for ((x, y), (ex, ey)) in corners(&placement, (20.0, 10.0)).into_iter().zip(expected) {
            assert!((x - ex).abs() < 1e-4 && (y - ey).abs() < 1e-4, "({x}, {y})");
        }
    }

    #[test]
    fn test_topmost_wins() {
        let mut store = SceneStore::new(Template::default());
        let image = store.add_image(ImageUpdate {
            width: Some(200.0),
            height: Some(200.0),
            ..ImageUpdate::default()
        });
        let text = store.add_text(TextUpdate {
            text: Some("hello".to_string()),
            x: Some(10.0),
            y: Some(10.0),
            font_size: Some(20.0),
            ..TextUpdate::default()
        });

        assert_eq!(hit_test(&store, 20.0, 20.0).map(|s| s.id), Some(text));
        assert_eq!(hit_test(&store, 150.0, 150.0).map(|s| s.id), Some(image));
        assert!(hit_test(&store, 300.0, 300.0).is_none());
    }

    #[test]
    fn test_rotation_and_scale_respected() {
        let mut store = SceneStore::new(Template::default());
        let id = store.add_image(ImageUpdate {
            x: Some(100.0),
            y: Some(100.0),
            width: Some(50.0),
            height: Some(10.0),
            rotation: Some(90.0),
            scale_x: Some(2.0),
            ..ImageUpdate::default()
        });

        // Rotated 90°: the box extends downward from the origin, 100 long.
        assert_eq!(hit_test(&store, 95.0, 180.0).map(|s| s.id), Some(id));
        assert!(hit_test(&store, 150.0, 105.0).is_none());
    }
}
