//! Pointer input for the render surface.

use serde::{Deserialize, Serialize};

/// Phase of a pointer (mouse, pen or single touch) event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed / finger down.
    Down,
    /// Pointer moved.
    Move,
    /// Button released / finger up.
    Up,
    /// Gesture aborted (e.g. pointer left the surface).
    Cancel,
}

/// A pointer event in display coordinates.
///
/// Display coordinates are relative to the on-screen surface, which may be
/// scaled down from the native canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// X position in display pixels.
    pub x: f32,
    /// Y position in display pixels.
    pub y: f32,
}

impl PointerEvent {
    /// Create a pointer event.
    #[must_use]
    pub fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self { phase, x, y }
    }

    /// Pointer pressed at `(x, y)`.
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Pointer moved to `(x, y)`.
    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Pointer released at `(x, y)`.
    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }
}
