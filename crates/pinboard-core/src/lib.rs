#![forbid(unsafe_code)]

//! Core primitives for the pinboard spatial engine.
//!
//! This crate has no knowledge of panels or history. It provides:
//!
//! - [`geometry`]: content-space rectangles, partial rect patches, points
//! - [`transform`]: pan/zoom transform, pan offset, shared scale context
//! - [`input`]: the minimal pointer/wheel input model gesture code consumes
//!
//! # Coordinate spaces
//!
//! **Content space** is scale/pan-independent logical coordinates; **screen
//! space** is raw pointer pixels. Gesture deltas convert screen→content by
//! dividing by the current scale (see [`geometry::Point::to_content`]).

pub mod geometry;
pub mod input;
pub mod transform;

pub use geometry::{GeometryError, Point, Rect, RectPatch};
pub use input::{PointerButton, PointerEvent, PointerEventKind, WheelEvent};
pub use transform::{Offset, ScaleContext, Transform, ZoomLimits};
