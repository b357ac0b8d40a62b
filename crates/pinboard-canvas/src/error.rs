#![forbid(unsafe_code)]

//! Error types for board operations.

use std::fmt;

use pinboard_core::GeometryError;
use pinboard_history::CommandError;

use crate::panel::PanelId;
use crate::snapshot::SnapshotError;

/// Errors from board and panel operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// A panel `type` has no registered model. Fatal: the panel cannot be
    /// rendered without its model, so this is never silently skipped.
    UnknownPanelType { type_key: String },
    /// The referenced panel is not alive on the board.
    PanelNotFound { id: PanelId },
    /// Persisted geometry failed to parse.
    Geometry(GeometryError),
    /// A history command failed.
    Command(CommandError),
    /// A snapshot failed validation on restore.
    Snapshot(SnapshotError),
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPanelType { type_key } => {
                write!(f, "no panel model registered for type {type_key:?}")
            }
            Self::PanelNotFound { id } => write!(f, "panel {id} not found"),
            Self::Geometry(e) => write!(f, "{e}"),
            Self::Command(e) => write!(f, "{e}"),
            Self::Snapshot(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CanvasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            Self::Command(e) => Some(e),
            Self::Snapshot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GeometryError> for CanvasError {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<CommandError> for CanvasError {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl From<SnapshotError> for CanvasError {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_type() {
        let err = CanvasError::UnknownPanelType {
            type_key: "markdown".to_string(),
        };
        assert!(format!("{err}").contains("markdown"));
    }

    #[test]
    fn from_geometry_error() {
        let err: CanvasError = GeometryError::MalformedRect {
            text: "1,2".to_string(),
            fields: 2,
        }
        .into();
        assert!(matches!(err, CanvasError::Geometry(_)));
    }
}
