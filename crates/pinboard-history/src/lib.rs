#![forbid(unsafe_code)]

//! Undo/redo command history for pinboard.
//!
//! This crate knows nothing about geometry or panels. It provides:
//!
//! - [`Undoable`]: a reversible command over external mutable state `S`
//! - [`History`]: a linear stack with a cursor, truncate-on-write branching,
//!   and silent no-ops at both boundaries
//! - [`Checkpoint`]: the "overwrite" mode that coalesces every intermediate
//!   frame of a continuous gesture into a single history slot
//!
//! # Why commands take `&mut S`
//!
//! Commands live in the history after the mutation they describe, so they
//! cannot borrow the state they mutate. Parameterizing [`Undoable`] over an
//! external `&mut S` keeps ownership with the caller (the board owns its
//! state and its history side by side) and makes every command trivially
//! testable against a bare state value.

pub mod checkpoint;
pub mod command;
pub mod history;

pub use checkpoint::Checkpoint;
pub use command::{CommandError, CommandResult, FnCommand, Undoable};
pub use history::History;
