#![forbid(unsafe_code)]

//! Pan/zoom state for the board's content layer.
//!
//! Two independent pieces compose without re-deriving each other's math:
//!
//! - [`Transform`] carries the zoom scale plus the translation that keeps the
//!   zoom focus point visually fixed. It applies to the content layer.
//! - [`Offset`] is the drag-pan position applied to a different ancestor
//!   layer, so panel drag/resize math stays simple under pan.
//!
//! [`ScaleContext`] is the shared live scale accessor: every gesture
//! controller and the board observe the same value without copying. The
//! engine is single-threaded (one UI event loop), so a `Rc<Cell<f64>>` is
//! all the sharing this needs.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Scale clamp bounds for zooming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_scale: 0.125,
            max_scale: 4.0,
        }
    }
}

impl ZoomLimits {
    /// Clamp a scale into the allowed range.
    #[inline]
    #[must_use]
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// The pan/zoom state of the content layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    /// The content-space point currently under the given screen position.
    #[must_use]
    pub fn screen_to_content(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.translate_x) / self.scale,
            y: (screen.y - self.translate_y) / self.scale,
        }
    }

    /// Rescale about a screen-space focus point.
    ///
    /// Classic zoom-to-cursor: the content point under `focus` before the
    /// rescale maps back to the same screen position afterwards. The new
    /// scale is clamped by `limits`.
    pub fn zoom_about(&mut self, focus: Point, new_scale: f64, limits: ZoomLimits) {
        let new_scale = limits.clamp(new_scale);
        let anchor = self.screen_to_content(focus);
        self.translate_x = focus.x - anchor.x * new_scale;
        self.translate_y = focus.y - anchor.y * new_scale;
        self.scale = new_scale;
    }
}

/// Drag-pan position of the outer layer, independent of [`Transform`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offset {
    pub offset_left: f64,
    pub offset_top: f64,
}

impl Offset {
    /// Shift by a screen-space delta (pan is applied pre-scale).
    pub fn shift(&mut self, delta: Point) {
        self.offset_left += delta.x;
        self.offset_top += delta.y;
    }
}

/// Shared read-only view of the live zoom scale.
///
/// Cloning yields another handle onto the same value; [`set`](Self::set) is
/// called only by the zoom controller and by snapshot restore.
#[derive(Debug, Clone)]
pub struct ScaleContext {
    inner: Rc<Cell<f64>>,
}

impl Default for ScaleContext {
    fn default() -> Self {
        Self {
            inner: Rc::new(Cell::new(1.0)),
        }
    }
}

impl ScaleContext {
    /// Create a context at the given initial scale.
    #[must_use]
    pub fn new(scale: f64) -> Self {
        Self {
            inner: Rc::new(Cell::new(scale)),
        }
    }

    /// The current scale.
    #[inline]
    #[must_use]
    pub fn get(&self) -> f64 {
        self.inner.get()
    }

    /// Publish a new scale to every holder of this context.
    #[inline]
    pub fn set(&self, scale: f64) {
        self.inner.set(scale);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_default_and_clamp() {
        let limits = ZoomLimits::default();
        assert_eq!(limits.clamp(0.01), 0.125);
        assert_eq!(limits.clamp(100.0), 4.0);
        assert_eq!(limits.clamp(1.5), 1.5);
    }

    #[test]
    fn zoom_about_keeps_focus_point_fixed() {
        let mut t = Transform {
            translate_x: 30.0,
            translate_y: -10.0,
            scale: 1.0,
        };
        let focus = Point::new(200.0, 150.0);
        let before = t.screen_to_content(focus);
        t.zoom_about(focus, 2.0, ZoomLimits::default());
        let after = t.screen_to_content(focus);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert_eq!(t.scale, 2.0);
    }

    #[test]
    fn zoom_about_clamps_scale() {
        let mut t = Transform::default();
        t.zoom_about(Point::new(0.0, 0.0), 64.0, ZoomLimits::default());
        assert_eq!(t.scale, 4.0);
    }

    #[test]
    fn offset_shift_accumulates() {
        let mut o = Offset::default();
        o.shift(Point::new(5.0, -3.0));
        o.shift(Point::new(2.0, 1.0));
        assert_eq!(o.offset_left, 7.0);
        assert_eq!(o.offset_top, -2.0);
    }

    #[test]
    fn scale_context_is_shared() {
        let a = ScaleContext::default();
        let b = a.clone();
        a.set(2.5);
        assert_eq!(b.get(), 2.5);
    }

    #[test]
    fn transform_serde_uses_camel_case() {
        let t = Transform {
            translate_x: 1.0,
            translate_y: 2.0,
            scale: 0.5,
        };
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"translateX\":1.0"));
        assert!(json.contains("\"scale\":0.5"));
        let o = Offset {
            offset_left: 3.0,
            offset_top: 4.0,
        };
        let json = serde_json::to_string(&o).unwrap();
        assert!(json.contains("\"offsetLeft\":3.0"));
    }
}
