#![forbid(unsafe_code)]

//! Persisted board layout schema v1.
//!
//! A [`BoardSnapshot`] is the single serialized unit the persistence
//! collaborator stores and reloads: pan/zoom transform, pan offset, and the
//! panel descriptors in z-order. Loaders call [`validate`](BoardSnapshot::validate)
//! before restoring; corrupt state is rejected loudly rather than coerced.
//!
//! # Schema versioning
//!
//! Breaking changes increment [`BOARD_SCHEMA_VERSION`]; snapshots carry
//! their version and unknown versions are rejected with a diagnostic.

use std::fmt;

use serde::{Deserialize, Serialize};

use pinboard_core::{Offset, Transform};

use crate::panel::{PanelConfig, PanelFlags};

/// Current board snapshot schema version.
pub const BOARD_SCHEMA_VERSION: u16 = 1;

fn default_version() -> u16 {
    BOARD_SCHEMA_VERSION
}

/// Persisted board layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    #[serde(default = "default_version")]
    pub schema_version: u16,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub offset: Offset,
    /// Panel descriptors in z-order (bottom first).
    #[serde(default)]
    pub stickies: Vec<PanelConfig>,
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            schema_version: BOARD_SCHEMA_VERSION,
            transform: Transform::default(),
            offset: Offset::default(),
            stickies: Vec::new(),
        }
    }
}

impl BoardSnapshot {
    /// Validate schema version and structural invariants.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.schema_version != BOARD_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.schema_version,
                expected: BOARD_SCHEMA_VERSION,
            });
        }

        // z-order must strictly increase with array position.
        for pair in self.stickies.windows(2) {
            if pair[1].z_index <= pair[0].z_index {
                return Err(SnapshotError::ZOrderNotMonotonic {
                    id: pair[1].id.to_string(),
                });
            }
        }

        for config in &self.stickies {
            let flags = config.flags;
            if flags.contains(PanelFlags::MAXIMIZED | PanelFlags::MINIMIZED) {
                return Err(SnapshotError::ConflictingFlags {
                    id: config.id.to_string(),
                });
            }
            if flags.contains(PanelFlags::DELETED) {
                return Err(SnapshotError::TransientFlagPersisted {
                    id: config.id.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors from snapshot validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Schema version is not supported.
    UnsupportedVersion { found: u16, expected: u16 },
    /// A panel's z-index does not strictly increase with its position.
    ZOrderNotMonotonic { id: String },
    /// A panel claims to be both maximized and minimized.
    ConflictingFlags { id: String },
    /// The transient mid-removal flag leaked into persistence.
    TransientFlagPersisted { id: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported board schema version {found} (expected {expected})")
            }
            Self::ZOrderNotMonotonic { id } => {
                write!(f, "panel {id} breaks strict z-order monotonicity")
            }
            Self::ConflictingFlags { id } => {
                write!(f, "panel {id} is both maximized and minimized")
            }
            Self::TransientFlagPersisted { id } => {
                write!(f, "panel {id} was persisted mid-removal")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

// ===========================================================================
// Tests
// ===========================================================================
