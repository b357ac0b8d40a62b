#![forbid(unsafe_code)]

//! Minimal pointer/wheel input model.
//!
//! The embedding shell translates platform events (DOM pointer events, native
//! toolkits, test drivers) into these types; gesture controllers consume them
//! without knowing where they came from.

use crate::geometry::Point;

/// Which pointer button an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button / primary touch.
    Primary,
    /// Middle button.
    Auxiliary,
    /// Right button.
    Secondary,
}

/// The kind of pointer transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down(PointerButton),
    Move,
    Up(PointerButton),
    /// Pointer capture lost (e.g. `pointercancel`). Treated like an up:
    /// whatever geometry was last computed commits.
    Cancel,
}

/// A pointer transition at a screen-space position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pos: Point,
    pub ctrl: bool,
}

impl PointerEvent {
    /// Create an event with no modifiers.
    #[must_use]
    pub const fn new(kind: PointerEventKind, pos: Point) -> Self {
        Self {
            kind,
            pos,
            ctrl: false,
        }
    }

    /// Builder-style ctrl modifier.
    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

/// A wheel tick at a screen-space position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub pos: Point,
    /// Positive = scroll down (zoom out with ctrl held).
    pub delta_y: f64,
    pub ctrl: bool,
}
