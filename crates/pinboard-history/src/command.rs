#![forbid(unsafe_code)]

//! The [`Undoable`] command trait and its error type.
//!
//! # Invariants
//!
//! - `execute()` followed by `undo()` restores the prior observable state
//! - `undo()` followed by `execute()` restores the executed state
//! - A command is one atomic unit; the history performs no rollback of a
//!   partially failed command

use std::fmt;

/// Result of command execution or undo.
pub type CommandResult = Result<(), CommandError>;

/// Errors raised by command execution.
///
/// These propagate to the caller of the history operation; the stack itself
/// neither catches nor rolls back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command's target no longer exists.
    TargetNotFound { id: String },
    /// The command cannot run against the current state.
    InvalidState(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound { id } => write!(f, "command target {id} not found"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl std::error::Error for CommandError {}

/// A reversible command over external mutable state `S`.
pub trait Undoable<S> {
    /// Apply the command's effect.
    fn execute(&mut self, state: &mut S) -> CommandResult;

    /// Revert the command's effect.
    fn undo(&mut self, state: &mut S) -> CommandResult;

    /// Human-readable label for history inspection.
    fn label(&self) -> &str {
        "command"
    }
}

/// A command built from a pair of closures.
///
/// Handy for small call sites and tests; larger operations get named command
/// structs so their captured state is visible.
pub struct FnCommand<S, E, U>
where
    E: FnMut(&mut S) -> CommandResult,
    U: FnMut(&mut S) -> CommandResult,
{
    label: &'static str,
    apply: E,
    revert: U,
    _state: std::marker::PhantomData<fn(&mut S)>,
}

impl<S, E, U> FnCommand<S, E, U>
where
    E: FnMut(&mut S) -> CommandResult,
    U: FnMut(&mut S) -> CommandResult,
{
    /// Create a new closure-backed command.
    pub fn new(label: &'static str, apply: E, revert: U) -> Self {
        Self {
            label,
            apply,
            revert,
            _state: std::marker::PhantomData,
        }
    }
}

impl<S, E, U> Undoable<S> for FnCommand<S, E, U>
where
    E: FnMut(&mut S) -> CommandResult,
    U: FnMut(&mut S) -> CommandResult,
{
    fn execute(&mut self, state: &mut S) -> CommandResult {
        (self.apply)(state)
    }

    fn undo(&mut self, state: &mut S) -> CommandResult {
        (self.revert)(state)
    }

    fn label(&self) -> &str {
        self.label
    }
}
