#![forbid(unsafe_code)]

//! Scale-aware gesture controllers.
//!
//! Three independent controllers, each consuming the shared
//! [`ScaleContext`](pinboard_core::ScaleContext) and producing geometry
//! mutations: [`DragController`], [`ResizeController`], and
//! [`ZoomPanController`]. Each is a guarded state machine: stray move/up
//! events outside an active gesture are no-ops, because listener lifecycle
//! is never perfectly exclusive in a real event loop.
//!
//! None of them has a cancel path. Releasing the pointer (or losing capture)
//! always commits whatever the last computed geometry was.

pub mod drag;
pub mod resize;
pub mod zoom;

pub use drag::{DragController, DragEvent};
pub use resize::{ResizeController, ResizeEdges, ResizeEvent, resize_rect};
pub use zoom::ZoomPanController;
