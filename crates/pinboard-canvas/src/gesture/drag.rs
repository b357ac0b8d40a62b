#![forbid(unsafe_code)]

//! Drag gesture controller.
//!
//! A drag starts only on a pointer-down that hits the designated handle
//! itself (the caller hit-tests; a down on a nested button must not start a
//! drag) and passes the button filter. Per-event deltas are converted to
//! content space by dividing by the live scale, and are additive: the caller
//! applies each delta on top of the current offset, so a drag stays correct
//! even if the zoom changes mid-gesture.

use tracing::trace;

use pinboard_core::{Point, PointerButton, PointerEvent, PointerEventKind, ScaleContext};

/// Lifecycle of one drag gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Start { pos: Point },
    Move { content_delta: Point },
    End,
}

/// Pointer-driven drag state machine.
#[derive(Debug)]
pub struct DragController {
    scale: ScaleContext,
    /// When set, only this button starts a drag; otherwise anything but the
    /// secondary (context-menu) button does.
    required_button: Option<PointerButton>,
    dragging: bool,
    last_pos: Point,
}

impl DragController {
    /// Create a controller observing the given scale.
    #[must_use]
    pub fn new(scale: ScaleContext) -> Self {
        Self {
            scale,
            required_button: None,
            dragging: false,
            last_pos: Point::default(),
        }
    }

    /// Restrict drag starts to one button.
    #[must_use]
    pub fn with_required_button(mut self, button: PointerButton) -> Self {
        self.required_button = Some(button);
        self
    }

    /// Whether a drag is in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Feed one pointer event. `on_handle` is whether the down event's
    /// target was the drag handle itself.
    pub fn on_pointer_event(&mut self, ev: &PointerEvent, on_handle: bool) -> Option<DragEvent> {
        match ev.kind {
            PointerEventKind::Down(button) => {
                if self.dragging || !on_handle || !self.accepts(button) {
                    return None;
                }
                self.dragging = true;
                self.last_pos = ev.pos;
                trace!(x = ev.pos.x, y = ev.pos.y, "drag start");
                Some(DragEvent::Start { pos: ev.pos })
            }
            PointerEventKind::Move => {
                if !self.dragging {
                    return None;
                }
                let screen_delta = Point::new(ev.pos.x - self.last_pos.x, ev.pos.y - self.last_pos.y);
                self.last_pos = ev.pos;
                Some(DragEvent::Move {
                    content_delta: screen_delta.to_content(self.scale.get()),
                })
            }
            PointerEventKind::Up(_) | PointerEventKind::Cancel => {
                if !self.dragging {
                    return None;
                }
                self.dragging = false;
                trace!("drag end");
                Some(DragEvent::End)
            }
        }
    }

    fn accepts(&self, button: PointerButton) -> bool {
        match self.required_button {
            Some(required) => button == required,
            None => button != PointerButton::Secondary,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
