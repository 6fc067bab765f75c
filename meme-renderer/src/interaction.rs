//! Pointer interaction: select, drag and transform layers.
//!
//! The controller turns pointer events on the render surface into scene store
//! calls. Moves only update a live preview; the store is written once, when
//! the gesture is released, so a whole drag is a single history entry.

use meme_core::{
    ImageUpdate, Layer, LayerId, LayerKind, Placement, PointerEvent, PointerPhase, SceneStore,
    Selection, TextUpdate,
};

use crate::hit;
use crate::surface::{rotate_anchor, Anchor, Preview, RenderSurface, ANCHOR_SIZE};

/// Smallest scale factor a resize can produce.
pub const MIN_SCALE: f32 = 0.05;

/// What a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    /// Nothing happened.
    Ignored,
    /// The background was hit and the selection cleared.
    Deselected,
    /// A layer was selected and a gesture started.
    Selected(Selection),
    /// The gesture preview moved.
    Previewed(Placement),
    /// The gesture ended; `changed` reports whether the store recorded it.
    Committed {
        /// Layer that was moved or transformed.
        id: LayerId,
        /// Whether the store actually changed.
        changed: bool,
    },
    /// The gesture was cancelled; nothing was written.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureKind {
    Drag,
    Resize(Anchor),
    Rotate,
}

#[derive(Debug, Clone)]
struct Gesture {
    target: Selection,
    kind: GestureKind,
    start: (f32, f32),
    origin: Placement,
    size: (f32, f32),
    current: Placement,
}

/// Pointer state machine for one render surface.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    gesture: Option<Gesture>,
}

impl InteractionController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The live preview of the running gesture, if any.
    #[must_use]
    pub fn preview(&self) -> Option<Preview<'_>> {
        self.gesture.as_ref().map(|g| Preview {
            id: &g.target.id,
            placement: g.current,
        })
    }

    /// Whether a drag or transform is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Feed one pointer event in display coordinates.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        surface: &RenderSurface,
        store: &mut SceneStore,
    ) -> InteractionOutcome {
        let point = surface.to_native(event.x, event.y);
        match event.phase {
            PointerPhase::Down => self.pointer_down(point, surface.display_scale(), store),
            PointerPhase::Move => self.pointer_move(point),
            PointerPhase::Up => self.pointer_up(point, store),
            PointerPhase::Cancel => {
                if self.gesture.take().is_some() {
                    InteractionOutcome::Cancelled
                } else {
                    InteractionOutcome::Ignored
                }
            }
        }
    }

    fn pointer_down(
        &mut self,
        point: (f32, f32),
        display_scale: f32,
        store: &mut SceneStore,
    ) -> InteractionOutcome {
        let (px, py) = point;

        // Anchors of the current selection take priority over layers beneath.
        if let Some(layer) = store.selected_layer() {
            if let Some(kind) = anchor_at(&layer, px, py, display_scale) {
                let gesture = Gesture::start(&layer, kind, point);
                let selection = gesture.target.clone();
                self.gesture = Some(gesture);
                return InteractionOutcome::Selected(selection);
            }
        }

        let Some(selection) = hit::hit_test(store, px, py) else {
            self.gesture = None;
            store.select_element(None);
            return InteractionOutcome::Deselected;
        };

        store.select_element(Some((selection.id.clone(), selection.kind)));
        self.gesture = store
            .selected_layer()
            .map(|layer| Gesture::start(&layer, GestureKind::Drag, point));
        InteractionOutcome::Selected(selection)
    }

    fn pointer_move(&mut self, point: (f32, f32)) -> InteractionOutcome {
        match self.gesture.as_mut() {
            Some(gesture) => {
                gesture.current = gesture.placement_at(point);
                InteractionOutcome::Previewed(gesture.current)
            }
            None => InteractionOutcome::Ignored,
        }
    }

    fn pointer_up(&mut self, point: (f32, f32), store: &mut SceneStore) -> InteractionOutcome {
        let Some(mut gesture) = self.gesture.take() else {
            return InteractionOutcome::Ignored;
        };
        gesture.current = gesture.placement_at(point);
        let placement = gesture.current;
        let id = gesture.target.id;

        // Drags report position only; transforms report the full placement.
        let changed = match (gesture.target.kind, gesture.kind) {
            (LayerKind::Text, GestureKind::Drag) => {
                store.update_text(&id, &TextUpdate::position(placement.x, placement.y))
            }
            (LayerKind::Text, _) => store.update_text(&id, &TextUpdate::placement(placement)),
            (LayerKind::Image, GestureKind::Drag) => {
                store.update_image(&id, &ImageUpdate::position(placement.x, placement.y))
            }
            (LayerKind::Image, _) => store.update_image(&id, &ImageUpdate::placement(placement)),
        };
        tracing::debug!("Gesture on {id} released, changed={changed}");
        InteractionOutcome::Committed { id, changed }
    }
}

impl Gesture {
    fn start(layer: &Layer<'_>, kind: GestureKind, point: (f32, f32)) -> Self {
        let origin = layer.placement();
        Self {
            target: Selection {
                id: layer.id().clone(),
                kind: layer.kind(),
            },
            kind,
            start: point,
            origin,
            size: hit::local_size(layer),
            current: origin,
        }
    }

    fn placement_at(&self, (px, py): (f32, f32)) -> Placement {
        if (px, py) == self.start {
            return self.origin;
        }
        match self.kind {
            GestureKind::Drag => Placement {
                x: self.origin.x + (px - self.start.0),
                y: self.origin.y + (py - self.start.1),
                ..self.origin
            },
            GestureKind::Resize(anchor) => self.resize(anchor, px, py),
            GestureKind::Rotate => self.rotate(px, py),
        }
    }

    /// Free-aspect resize: the dragged edges move by the pointer delta, the
    /// opposite edges stay fixed.
    fn resize(&self, anchor: Anchor, px: f32, py: f32) -> Placement {
        let (w, h) = self.size;
        if w <= 0.0 || h <= 0.0 {
            return self.origin;
        }
        let (fx, fy) = anchor.fraction().unwrap_or((0.5, 0.5));
        let (u0, v0) = hit::to_rotated_frame(&self.origin, self.start.0, self.start.1);
        let (u1, v1) = hit::to_rotated_frame(&self.origin, px, py);
        let (du, dv) = (u1 - u0, v1 - v0);

        let mut left = 0.0;
        let mut top = 0.0;
        let mut right = w * self.origin.scale_x;
        let mut bottom = h * self.origin.scale_y;
        let min_w = w * MIN_SCALE;
        let min_h = h * MIN_SCALE;

        if fx == 0.0 {
            left = du.min(right - min_w);
        } else if fx == 1.0 {
            right = (right + du).max(left + min_w);
        }
        if fy == 0.0 {
            top = dv.min(bottom - min_h);
        } else if fy == 1.0 {
            bottom = (bottom + dv).max(top + min_h);
        }

        let (x, y) = hit::to_canvas(
            &Placement {
                scale_x: 1.0,
                scale_y: 1.0,
                ..self.origin
            },
            left,
            top,
        );
        Placement {
            x,
            y,
            rotation: self.origin.rotation,
            scale_x: (right - left) / w,
            scale_y: (bottom - top) / h,
        }
    }

    /// Rotate around the box center by the angle the pointer swept since the
    /// press.
    fn rotate(&self, px: f32, py: f32) -> Placement {
        let (w, h) = self.size;
        let half_w = w * self.origin.scale_x / 2.0;
        let half_h = h * self.origin.scale_y / 2.0;
        let (cx, cy) = hit::to_canvas(&self.origin, w / 2.0, h / 2.0);

        let grabbed = (self.start.1 - cy).atan2(self.start.0 - cx);
        let swept = (py - cy).atan2(px - cx) - grabbed;
        let rotation = normalize_degrees(self.origin.rotation + swept.to_degrees());
        let (sin, cos) = rotation.to_radians().sin_cos();
        Placement {
            x: cx - (half_w * cos - half_h * sin),
            y: cy - (half_w * sin + half_h * cos),
            rotation,
            ..self.origin
        }
    }
}

/// Wrap an angle into `(-180, 180]`.
fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Which transform anchor of `layer`, if any, lies under the pointer.
fn anchor_at(layer: &Layer<'_>, px: f32, py: f32, display_scale: f32) -> Option<GestureKind> {
    let placement = layer.placement();
    let (w, h) = hit::local_size(layer);
    let reach = ANCHOR_SIZE / display_scale;
    let near = |(ax, ay): (f32, f32)| (px - ax).abs() <= reach && (py - ay).abs() <= reach;

    if near(rotate_anchor(&placement, w, display_scale)) {
        return Some(GestureKind::Rotate);
    }
    Anchor::RESIZE
        .into_iter()
        .find(|anchor| near(anchor.position(&placement, w, h)))
        .map(GestureKind::Resize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meme_core::Template;

    fn setup() -> (SceneStore, RenderSurface, LayerId) {
        let mut store = SceneStore::new(Template::default());
        let id = store.add_image(ImageUpdate {
            src: Some("cat.png".to_string()),
            x: Some(100.0),
            y: Some(100.0),
            width: Some(100.0),
            height: Some(50.0),
            ..ImageUpdate::default()
        });
        store.select_element(None);
        let mut surface = RenderSurface::default();
        surface.sync(&store);
        (store, surface, id)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_click_background_clears_selection() {
        let (mut store, surface, id) = setup();
        store.select_element(Some((id, LayerKind::Image)));
        let mut controller = InteractionController::new();

        let outcome = controller.handle(PointerEvent::down(5.0, 5.0), &surface, &mut store);
        assert_eq!(outcome, InteractionOutcome::Deselected);
        assert!(store.selection().is_none());
    }

    #[test]
    fn test_drag_commits_once_on_release() {
        let (mut store, surface, id) = setup();
        let mut controller = InteractionController::new();
        let len = store.history_len();

        let outcome = controller.handle(PointerEvent::down(120.0, 120.0), &surface, &mut store);
        assert!(matches!(outcome, InteractionOutcome::Selected(ref s) if s.id == id));
        assert_eq!(store.selected_element_id(), Some(&id));

        controller.handle(PointerEvent::moved(130.0, 125.0), &surface, &mut store);
        controller.handle(PointerEvent::moved(150.0, 140.0), &surface, &mut store);
        assert_eq!(store.history_len(), len, "moves must not write the store");
        let preview = controller.preview().expect("preview");
        assert!(close(preview.placement.x, 130.0));

        let outcome = controller.handle(PointerEvent::up(150.0, 140.0), &surface, &mut store);
        assert_eq!(
            outcome,
            InteractionOutcome::Committed {
                id: id.clone(),
                changed: true
            }
        );
        assert_eq!(store.history_len(), len + 1);
        let image = store.image(&id).expect("image");
        assert!(close(image.x, 130.0) && close(image.y, 120.0));
        assert!(!controller.is_active());
    }

    #[test]
    fn test_click_without_move_records_nothing() {
        let (mut store, surface, id) = setup();
        let mut controller = InteractionController::new();
        let len = store.history_len();

        controller.handle(PointerEvent::down(120.0, 120.0), &surface, &mut store);
        let outcome = controller.handle(PointerEvent::up(120.0, 120.0), &surface, &mut store);
        assert_eq!(outcome, InteractionOutcome::Committed { id, changed: false });
        assert_eq!(store.history_len(), len);
    }

    #[test]
    fn test_resize_from_bottom_right_anchor() {
        let (mut store, surface, id) = setup();
        store.select_element(Some((id.clone(), LayerKind::Image)));
        let mut controller = InteractionController::new();

        // Bottom-right anchor sits at (200, 150).
        controller.handle(PointerEvent::down(200.0, 150.0), &surface, &mut store);
        controller.handle(PointerEvent::up(300.0, 200.0), &surface, &mut store);

        let image = store.image(&id).expect("image");
        assert!(close(image.x, 100.0) && close(image.y, 100.0));
        assert!(close(image.scale_x, 2.0));
        assert!(close(image.scale_y, 2.0));
    }

    #[test]
    fn test_press_off_center_on_resize_anchor_keeps_size() {
        let (mut store, surface, id) = setup();
        store.select_element(Some((id.clone(), LayerKind::Image)));
        let mut controller = InteractionController::new();
        let len = store.history_len();

        // Inside the reach of the bottom-right anchor at (200, 150).
        controller.handle(PointerEvent::down(194.0, 144.0), &surface, &mut store);
        let outcome = controller.handle(PointerEvent::up(194.0, 144.0), &surface, &mut store);

        assert_eq!(outcome, InteractionOutcome::Committed { id: id.clone(), changed: false });
        assert_eq!(store.history_len(), len);
        let image = store.image(&id).expect("image");
        assert!(close(image.scale_x, 1.0) && close(image.scale_y, 1.0));
    }

    #[test]
    fn test_resize_follows_pointer_delta() {
        let (mut store, surface, id) = setup();
        store.select_element(Some((id.clone(), LayerKind::Image)));
        let mut controller = InteractionController::new();

        controller.handle(PointerEvent::down(194.0, 144.0), &surface, &mut store);
        controller.handle(PointerEvent::up(294.0, 194.0), &surface, &mut store);

        let image = store.image(&id).expect("image");
        assert!(close(image.scale_x, 2.0));
        assert!(close(image.scale_y, 2.0));
    }

    #[test]
    fn test_resize_from_top_left_moves_origin() {
        let (mut store, surface, id) = setup();
        store.select_element(Some((id.clone(), LayerKind::Image)));
        let mut controller = InteractionController::new();

        controller.handle(PointerEvent::down(100.0, 100.0), &surface, &mut store);
        controller.handle(PointerEvent::up(150.0, 125.0), &surface, &mut store);

        let image = store.image(&id).expect("image");
        assert!(close(image.x, 150.0) && close(image.y, 125.0));
        assert!(close(image.scale_x, 0.5));
        assert!(close(image.scale_y, 0.5));
    }

    #[test]
    fn test_rotate_keeps_center() {
        let (mut store, surface, id) = setup();
        store.select_element(Some((id.clone(), LayerKind::Image)));
        let mut controller = InteractionController::new();

        // Rotate anchor: 30px above the top-center (150, 100).
        controller.handle(PointerEvent::down(150.0, 70.0), &surface, &mut store);
        // Pointer to the right of the center (150, 125): a quarter turn.
        controller.handle(PointerEvent::up(300.0, 125.0), &surface, &mut store);

        let image = store.image(&id).expect("image");
        assert!(close(image.rotation, 90.0));
        let layer = Layer::Image(image);
        let (cx, cy) = hit::to_canvas(&layer.placement(), 50.0, 25.0);
        assert!(close(cx, 150.0) && close(cy, 125.0));
    }

    #[test]
    fn test_press_off_center_on_rotate_anchor_keeps_rotation() {
        let (mut store, surface, id) = setup();
        store.select_element(Some((id.clone(), LayerKind::Image)));
        let mut controller = InteractionController::new();
        let len = store.history_len();

        // Inside the reach of the rotate anchor at (150, 70).
        controller.handle(PointerEvent::down(158.0, 70.0), &surface, &mut store);
        let outcome = controller.handle(PointerEvent::up(158.0, 70.0), &surface, &mut store);

        assert_eq!(outcome, InteractionOutcome::Committed { id: id.clone(), changed: false });
        assert_eq!(store.history_len(), len);
        assert!(close(store.image(&id).expect("image").rotation, 0.0));
    }

    #[test]
    fn test_display_scale_maps_pointer() {
        let (mut store, mut surface, id) = setup();
        surface.set_container_width(Some(240.0));
        let mut controller = InteractionController::new();

        // Display (60, 60) is native (120, 120), inside the image.
        let outcome = controller.handle(PointerEvent::down(60.0, 60.0), &surface, &mut store);
        assert!(matches!(outcome, InteractionOutcome::Selected(ref s) if s.id == id));
        controller.handle(PointerEvent::up(70.0, 60.0), &surface, &mut store);
        assert!(close(store.image(&id).expect("image").x, 120.0));
    }

    #[test]
    fn test_cancel_discards_gesture() {
        let (mut store, surface, _) = setup();
        let mut controller = InteractionController::new();
        let len = store.history_len();

        controller.handle(PointerEvent::down(120.0, 120.0), &surface, &mut store);
        controller.handle(PointerEvent::moved(200.0, 200.0), &surface, &mut store);
        let outcome = controller.handle(
            PointerEvent::new(PointerPhase::Cancel, 200.0, 200.0),
            &surface,
            &mut store,
        );
        assert_eq!(outcome, InteractionOutcome::Cancelled);
        assert_eq!(store.history_len(), len);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!(close(normalize_degrees(270.0), -90.0));
        assert!(close(normalize_degrees(-190.0), 170.0));
        assert!(close(normalize_degrees(180.0), 180.0));
    }
}
