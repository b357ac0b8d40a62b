#![forbid(unsafe_code)]

//! Pinboard public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from internal crates and offers a lightweight
//! prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use pinboard_core::{
    GeometryError, Offset, Point, PointerButton, PointerEvent, PointerEventKind, Rect, RectPatch,
    ScaleContext, Transform, WheelEvent, ZoomLimits,
};

// --- History re-exports ----------------------------------------------------

pub use pinboard_history::{Checkpoint, CommandError, CommandResult, FnCommand, History, Undoable};

// --- Canvas re-exports -----------------------------------------------------

pub use pinboard_canvas::{
    Board, BoardOptions, BoardSnapshot, BoardState, CanvasError, DockPlacement, DragController,
    DragEvent, MountReason, Panel, PanelConfig, PanelFlags, PanelId, PanelKind, PanelModel,
    PluginRegistry, ResizeController, ResizeEdges, ResizeEvent, ZoomPanController,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for pinboard apps.
#[derive(Debug)]
pub enum Error {
    /// A board or panel operation failed.
    Canvas(CanvasError),
    /// A history command failed outside a board.
    Command(CommandError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canvas(err) => write!(f, "{err}"),
            Self::Command(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Canvas(err) => Some(err),
            Self::Command(err) => Some(err),
        }
    }
}

impl From<CanvasError> for Error {
    fn from(err: CanvasError) -> Self {
        Self::Canvas(err)
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

/// Standard result type for pinboard APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Board, BoardOptions, BoardSnapshot, Error, Panel, PanelConfig, PanelFlags, PanelId, Point,
        Rect, RectPatch, Result, Transform,
    };

    pub use crate::{canvas, core, history};
}

pub use pinboard_canvas as canvas;
pub use pinboard_core as core;
pub use pinboard_history as history;
