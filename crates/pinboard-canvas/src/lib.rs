#![forbid(unsafe_code)]

//! The board: panels, gestures, arrangement, and persistence.
//!
//! [`Board`] is the orchestrator; everything user-visible flows through it
//! so history, z-order, and panel lifecycle stay consistent. The submodules
//! are usable on their own:
//!
//! - [`panel`]: live panel records and their serializable configs
//! - [`gesture`]: scale-aware drag, resize, and zoom/pan controllers
//! - [`arrange`]: first-fit grid packing
//! - [`plugin`]: the panel-model registry behind the `type` key
//! - [`snapshot`]: the versioned persistence schema

pub mod arrange;
pub mod board;
pub mod error;
pub mod gesture;
pub mod panel;
pub mod plugin;
pub mod snapshot;

pub use arrange::{DEFAULT_CELL, pack};
pub use board::{AfterLoadHook, BeforeSaveHook, Board, BoardOptions, BoardState};
pub use error::CanvasError;
pub use gesture::{
    DragController, DragEvent, ResizeController, ResizeEdges, ResizeEvent, ZoomPanController,
    resize_rect,
};
pub use panel::{
    DATASET_RECT_KEY, DockPlacement, FlagsObserver, Panel, PanelConfig, PanelFlags, PanelId,
    PanelKind,
};
pub use plugin::{MountReason, PanelModel, PluginRegistry};
pub use snapshot::{BOARD_SCHEMA_VERSION, BoardSnapshot, SnapshotError};
