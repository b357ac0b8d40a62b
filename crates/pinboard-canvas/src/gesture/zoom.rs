#![forbid(unsafe_code)]

//! Zoom and pan.
//!
//! Ctrl+wheel zooms about the cursor so the content point under it stays
//! visually fixed; `zoom_in`/`zoom_out`/`zoom_reset` do the same math about
//! the viewport center. Scale is clamped to the configured limits and
//! published through the shared [`ScaleContext`] so drag/resize math stays
//! correct mid-zoom. Pan mutates the separate [`Offset`] layer and composes
//! without touching the zoom transform.

use tracing::trace;

use pinboard_core::{Offset, Point, ScaleContext, Transform, WheelEvent, ZoomLimits};

/// Multiplier applied per wheel tick.
const WHEEL_FACTOR: f64 = 1.1;
/// Multiplier applied per zoom_in/zoom_out step.
const STEP_FACTOR: f64 = 1.25;

/// Wheel-zoom and pan handler for the board's transform and offset layers.
#[derive(Debug)]
pub struct ZoomPanController {
    scale: ScaleContext,
    limits: ZoomLimits,
}

impl ZoomPanController {
    /// Create a controller publishing into the given scale context.
    #[must_use]
    pub fn new(scale: ScaleContext, limits: ZoomLimits) -> Self {
        Self { scale, limits }
    }

    #[must_use]
    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Handle a wheel event. Only ctrl+wheel zooms; returns whether the
    /// event was consumed.
    pub fn on_wheel(&self, transform: &mut Transform, ev: &WheelEvent) -> bool {
        if !ev.ctrl {
            return false;
        }
        let factor = if ev.delta_y < 0.0 {
            WHEEL_FACTOR
        } else {
            1.0 / WHEEL_FACTOR
        };
        self.zoom_about(transform, ev.pos, transform.scale * factor);
        true
    }

    /// Zoom one step in about the viewport center.
    pub fn zoom_in(&self, transform: &mut Transform, center: Point) {
        self.zoom_about(transform, center, transform.scale * STEP_FACTOR);
    }

    /// Zoom one step out about the viewport center.
    pub fn zoom_out(&self, transform: &mut Transform, center: Point) {
        self.zoom_about(transform, center, transform.scale / STEP_FACTOR);
    }

    /// Return to 1:1 about the viewport center.
    pub fn zoom_reset(&self, transform: &mut Transform, center: Point) {
        self.zoom_about(transform, center, 1.0);
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan(&self, offset: &mut Offset, delta: Point) {
        offset.shift(delta);
    }

    fn zoom_about(&self, transform: &mut Transform, focus: Point, new_scale: f64) {
        transform.zoom_about(focus, new_scale, self.limits);
        self.scale.set(transform.scale);
        trace!(scale = transform.scale, "zoom");
    }
}

// ===========================================================================
// Tests
// ===========================================================================
