#![forbid(unsafe_code)]

//! Resize gesture controller.
//!
//! Eight handle regions surround a panel: four edges plus four corners, each
//! encoded as a combination of [`ResizeEdges`]. Resizing from a left or top
//! edge keeps the opposite edge stationary: the size shrinks while
//! `left`/`top` advance by the same signed delta, and a minimum-size floor
//! prevents the rectangle from inverting. Deltas are scale-corrected the
//! same way drags are.

use bitflags::bitflags;
use tracing::trace;

use pinboard_core::{Point, PointerEvent, PointerEventKind, Rect, ScaleContext};

bitflags! {
    /// Which edges a resize handle affects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResizeEdges: u8 {
        const NORTH = 1 << 0;
        const SOUTH = 1 << 1;
        const EAST = 1 << 2;
        const WEST = 1 << 3;
    }
}

impl ResizeEdges {
    /// The eight synthetic handle regions appended to a panel.
    #[must_use]
    pub fn handles() -> [ResizeEdges; 8] {
        [
            Self::NORTH,
            Self::SOUTH,
            Self::EAST,
            Self::WEST,
            Self::NORTH | Self::EAST,
            Self::NORTH | Self::WEST,
            Self::SOUTH | Self::EAST,
            Self::SOUTH | Self::WEST,
        ]
    }
}

/// Apply a content-space resize delta to a rectangle.
///
/// East/south grow with the pointer; west/north move the near edge while the
/// far edge stays put. `min` is the `(width, height)` floor.
#[must_use]
pub fn resize_rect(origin: &Rect, edges: ResizeEdges, delta: Point, min: (f64, f64)) -> Rect {
    let mut out = *origin;
    let (min_w, min_h) = min;

    if edges.contains(ResizeEdges::EAST) {
        out.width = (origin.width + delta.x).max(min_w);
    }
    if edges.contains(ResizeEdges::WEST) {
        let width = (origin.width - delta.x).max(min_w);
        out.left = origin.left + (origin.width - width);
        out.width = width;
    }
    if edges.contains(ResizeEdges::SOUTH) {
        out.height = (origin.height + delta.y).max(min_h);
    }
    if edges.contains(ResizeEdges::NORTH) {
        let height = (origin.height - delta.y).max(min_h);
        out.top = origin.top + (origin.height - height);
        out.height = height;
    }

    out
}

/// Lifecycle of one resize gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeEvent {
    Start { edges: ResizeEdges },
    Resize { rect: Rect },
    End,
}

#[derive(Debug)]
struct ActiveResize {
    edges: ResizeEdges,
    origin: Rect,
    start_pos: Point,
}

/// Pointer-driven resize state machine.
#[derive(Debug)]
pub struct ResizeController {
    scale: ScaleContext,
    min_width: f64,
    min_height: f64,
    active: Option<ActiveResize>,
}

impl ResizeController {
    /// Create a controller with the given minimum panel size.
    #[must_use]
    pub fn new(scale: ScaleContext, min_width: f64, min_height: f64) -> Self {
        Self {
            scale,
            min_width,
            min_height,
            active: None,
        }
    }

    /// Whether a resize is in progress.
    #[inline]
    #[must_use]
    pub fn is_resizing(&self) -> bool {
        self.active.is_some()
    }

    /// Feed one pointer event. A down event must name the handle's edges and
    /// the panel's current rectangle; moves and ups carry the rest.
    pub fn on_pointer_event(
        &mut self,
        ev: &PointerEvent,
        handle: Option<(ResizeEdges, Rect)>,
    ) -> Option<ResizeEvent> {
        match ev.kind {
            PointerEventKind::Down(_) => {
                let (edges, origin) = handle?;
                if self.active.is_some() {
                    return None;
                }
                self.active = Some(ActiveResize {
                    edges,
                    origin,
                    start_pos: ev.pos,
                });
                trace!(?edges, "resize start");
                Some(ResizeEvent::Start { edges })
            }
            PointerEventKind::Move => {
                let active = self.active.as_ref()?;
                let screen_delta = Point::new(ev.pos.x - active.start_pos.x, ev.pos.y - active.start_pos.y);
                let delta = screen_delta.to_content(self.scale.get());
                let rect = resize_rect(
                    &active.origin,
                    active.edges,
                    delta,
                    (self.min_width, self.min_height),
                );
                Some(ResizeEvent::Resize { rect })
            }
            PointerEventKind::Up(_) | PointerEventKind::Cancel => {
                if self.active.take().is_none() {
                    return None;
                }
                trace!("resize end");
                Some(ResizeEvent::End)
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
