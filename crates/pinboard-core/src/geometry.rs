#![forbid(unsafe_code)]

//! Geometric primitives in content-space coordinates.
//!
//! [`Rect`] is a concrete geometry snapshot. [`RectPatch`] is the partial
//! form used both as a mutation patch and as the persisted wire format: each
//! component is `Option<f64>`, where `None` means "unspecified, keep the
//! current value". On the wire a patch is a 4-tuple
//! `[left|null, top|null, width|null, height|null]`.
//!
//! A patch can also round-trip through a comma-joined cache string (used to
//! stash pre-maximize geometry in a panel's dataset). Malformed cache strings
//! fail loudly: corrupt persisted state should never be silently coerced.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point or delta in either screen or content space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert a screen-space delta to content space by dividing by `scale`.
    #[inline]
    #[must_use]
    pub fn to_content(self, scale: f64) -> Self {
        Self {
            x: self.x / scale,
            y: self.y / scale,
        }
    }

    /// Component-wise addition.
    #[inline]
    #[must_use]
    pub fn offset_by(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// A rectangle in content space: `(left, top, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    /// Check whether two rectangles overlap with positive area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    /// A copy moved by the given content-space delta.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// A copy centered on the given point.
    #[must_use]
    pub fn centered_at(&self, center: Point) -> Rect {
        Rect {
            left: center.x - self.width / 2.0,
            top: center.y - self.height / 2.0,
            ..*self
        }
    }
}

type PatchTuple = (Option<f64>, Option<f64>, Option<f64>, Option<f64>);

/// A partial rectangle: each slot is `Some(value)` or `None` ("keep current").
///
/// Serializes as the 4-tuple `[left, top, width, height]` with `null` for
/// unspecified slots.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PatchTuple", into = "PatchTuple")]
pub struct RectPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl From<PatchTuple> for RectPatch {
    fn from((left, top, width, height): PatchTuple) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

impl From<RectPatch> for PatchTuple {
    fn from(p: RectPatch) -> Self {
        (p.left, p.top, p.width, p.height)
    }
}

impl From<Rect> for RectPatch {
    fn from(r: Rect) -> Self {
        Self {
            left: Some(r.left),
            top: Some(r.top),
            width: Some(r.width),
            height: Some(r.height),
        }
    }
}

impl RectPatch {
    /// A patch specifying every component.
    #[must_use]
    pub fn full(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect::new(left, top, width, height).into()
    }

    /// Apply the patch on top of a base rectangle; `None` slots keep the base.
    #[must_use]
    pub fn apply_to(&self, base: &Rect) -> Rect {
        Rect {
            left: self.left.unwrap_or(base.left),
            top: self.top.unwrap_or(base.top),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
        }
    }

    /// Overlay `other` on top of this patch; `other`'s `Some` slots win.
    #[must_use]
    pub fn merge(&self, other: &RectPatch) -> RectPatch {
        RectPatch {
            left: other.left.or(self.left),
            top: other.top.or(self.top),
            width: other.width.or(self.width),
            height: other.height.or(self.height),
        }
    }

    /// Render as the comma-joined cache string, e.g. `"20,40,300,null"`.
    #[must_use]
    pub fn to_cache_string(&self) -> String {
        let slot = |v: Option<f64>| match v {
            Some(n) => n.to_string(),
            None => "null".to_string(),
        };
        format!(
            "{},{},{},{}",
            slot(self.left),
            slot(self.top),
            slot(self.width),
            slot(self.height)
        )
    }

    /// Parse a comma-joined cache string.
    ///
    /// Exactly four slots are required; anything else is a
    /// [`GeometryError::MalformedRect`].
    pub fn parse_cache_string(text: &str) -> Result<Self, GeometryError> {
        let slots: Vec<&str> = text.split(',').collect();
        if slots.len() != 4 {
            return Err(GeometryError::MalformedRect {
                text: text.to_string(),
                fields: slots.len(),
            });
        }
        let mut parsed = [None; 4];
        for (i, raw) in slots.iter().enumerate() {
            let raw = raw.trim();
            if raw == "null" {
                continue;
            }
            let value = raw.parse::<f64>().map_err(|_| GeometryError::BadNumber {
                slot: i,
                text: raw.to_string(),
            })?;
            parsed[i] = Some(value);
        }
        Ok(Self {
            left: parsed[0],
            top: parsed[1],
            width: parsed[2],
            height: parsed[3],
        })
    }
}

/// Errors from geometry parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A cached rect string did not have exactly four slots.
    MalformedRect { text: String, fields: usize },
    /// A cached rect slot was neither a number nor `null`.
    BadNumber { slot: usize, text: String },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRect { text, fields } => {
                write!(f, "malformed rect string {text:?}: {fields} fields, expected 4")
            }
            Self::BadNumber { slot, text } => {
                write!(f, "rect slot {slot} is not a number or null: {text:?}")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_and_contains() {
        let r = Rect::new(10.0, 20.0, 300.0, 200.0);
        assert_eq!(r.right(), 310.0);
        assert_eq!(r.bottom(), 220.0);
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(309.9, 219.9));
        assert!(!r.contains(310.0, 20.0));
    }

    #[test]
    fn rect_intersects_needs_positive_area() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        let c = Rect::new(100.0, 0.0, 50.0, 50.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c), "edge-adjacent rects do not overlap");
    }

    #[test]
    fn rect_translated_keeps_size() {
        let r = Rect::new(5.0, 5.0, 40.0, 30.0).translated(20.0, 20.0);
        assert_eq!(r, Rect::new(25.0, 25.0, 40.0, 30.0));
    }

    #[test]
    fn rect_centered_at() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0).centered_at(Point::new(200.0, 200.0));
        assert_eq!(r, Rect::new(150.0, 175.0, 100.0, 50.0));
    }

    #[test]
    fn point_to_content_divides_by_scale() {
        let p = Point::new(50.0, 50.0).to_content(2.0);
        assert_eq!(p, Point::new(25.0, 25.0));
    }

    #[test]
    fn patch_apply_keeps_unspecified() {
        let base = Rect::new(1.0, 2.0, 3.0, 4.0);
        let patch = RectPatch {
            left: Some(10.0),
            height: Some(40.0),
            ..RectPatch::default()
        };
        assert_eq!(patch.apply_to(&base), Rect::new(10.0, 2.0, 3.0, 40.0));
    }

    #[test]
    fn patch_merge_prefers_other() {
        let a = RectPatch::full(1.0, 2.0, 3.0, 4.0);
        let b = RectPatch {
            left: Some(9.0),
            ..RectPatch::default()
        };
        let merged = a.merge(&b);
        assert_eq!(merged.left, Some(9.0));
        assert_eq!(merged.top, Some(2.0));
    }

    #[test]
    fn cache_string_round_trip() {
        let patch = RectPatch {
            left: Some(20.0),
            top: Some(40.0),
            width: Some(300.0),
            height: None,
        };
        let text = patch.to_cache_string();
        assert_eq!(text, "20,40,300,null");
        assert_eq!(RectPatch::parse_cache_string(&text).unwrap(), patch);
    }

    #[test]
    fn cache_string_wrong_field_count_is_loud() {
        let err = RectPatch::parse_cache_string("1,2,3").unwrap_err();
        assert!(matches!(err, GeometryError::MalformedRect { fields: 3, .. }));
        let err = RectPatch::parse_cache_string("1,2,3,4,5").unwrap_err();
        assert!(matches!(err, GeometryError::MalformedRect { fields: 5, .. }));
    }

    #[test]
    fn cache_string_bad_slot_is_loud() {
        let err = RectPatch::parse_cache_string("1,2,x,4").unwrap_err();
        assert!(matches!(err, GeometryError::BadNumber { slot: 2, .. }));
    }

    #[test]
    fn patch_serializes_as_tuple_with_nulls() {
        let patch = RectPatch {
            left: Some(0.0),
            top: None,
            width: Some(300.0),
            height: Some(200.0),
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, "[0.0,null,300.0,200.0]");
        let back: RectPatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, patch);
    }

    #[test]
    fn error_display_mentions_input() {
        let err = RectPatch::parse_cache_string("oops").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("oops"));
        assert!(msg.contains("expected 4"));
    }
}
