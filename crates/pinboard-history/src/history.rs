#![forbid(unsafe_code)]

//! The linear history stack.
//!
//! A single entry vector plus a cursor. The cursor counts applied entries:
//! `0` means everything is undone, `entries.len()` means nothing is redoable.
//!
//! # Invariants
//!
//! 1. `cursor <= entries.len()` after every operation
//! 2. `write` truncates all entries past the cursor before appending
//!    (standard branching-history discard)
//! 3. `undo`/`redo` at a boundary return `None` and change nothing
//!
//! ```text
//! write(c4) with cursor = 2
//! ┌──────────────────────────────┐
//! │ [c1, c2 | c3]   cursor = 2   │  c3 is redoable
//! │ [c1, c2, c4]    cursor = 3   │  c3 discarded, c4 executed
//! └──────────────────────────────┘
//! ```

use tracing::{debug, trace};

use crate::command::{CommandError, CommandResult, Undoable};

/// Linear undo/redo stack over state `S`.
pub struct History<S> {
    entries: Vec<Box<dyn Undoable<S>>>,
    /// Number of applied entries; the next undo targets `entries[cursor - 1]`.
    cursor: usize,
    /// Bumped whenever entries are discarded, so a stale slot index held by
    /// a [`Checkpoint`](crate::Checkpoint) can be told apart from a live one
    /// even after the index is refilled by later writes.
    generation: u64,
}

impl<S> std::fmt::Debug for History<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("depth", &self.entries.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> History<S> {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            generation: 0,
        }
    }

    /// Append a command and execute it immediately.
    ///
    /// Discards any redoable entries past the cursor first. If `execute`
    /// fails the error propagates and the entry stays in place; one command
    /// is one unit and the stack does not roll back partial failures.
    pub fn write(&mut self, state: &mut S, cmd: Box<dyn Undoable<S>>) -> CommandResult {
        let discarded = self.entries.len() - self.cursor;
        if discarded > 0 {
            trace!(discarded, "discarding redoable entries");
            self.generation += 1;
        }
        self.entries.truncate(self.cursor);
        debug!(label = cmd.label(), cursor = self.cursor, "history write");
        self.entries.push(cmd);
        self.cursor = self.entries.len();
        let index = self.cursor - 1;
        self.entries[index].execute(state)
    }

    /// Undo the entry at the cursor.
    ///
    /// Returns `None` at the bottom of history (a defined no-op, not an
    /// error: users routinely hold the undo key past the boundary).
    pub fn undo(&mut self, state: &mut S) -> Option<CommandResult> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        let entry = &mut self.entries[self.cursor];
        debug!(label = entry.label(), cursor = self.cursor, "history undo");
        Some(entry.undo(state))
    }

    /// Re-execute the entry just past the cursor.
    ///
    /// Returns `None` at the top of history.
    pub fn redo(&mut self, state: &mut S) -> Option<CommandResult> {
        if self.cursor == self.entries.len() {
            return None;
        }
        let entry = &mut self.entries[self.cursor];
        debug!(label = entry.label(), cursor = self.cursor, "history redo");
        self.cursor += 1;
        Some(entry.execute(state))
    }

    /// Replace the entry at `index` and execute the replacement directly,
    /// without touching the cursor or truncating redo entries.
    ///
    /// This is the primitive behind [`Checkpoint`](crate::Checkpoint)
    /// coalescing; `index` must come from a prior `write` in the same
    /// gesture.
    pub(crate) fn overwrite_at(
        &mut self,
        index: usize,
        state: &mut S,
        cmd: Box<dyn Undoable<S>>,
    ) -> CommandResult {
        if index >= self.entries.len() {
            return Err(CommandError::InvalidState(format!(
                "overwrite slot {index} out of bounds (depth {})",
                self.entries.len()
            )));
        }
        trace!(index, label = cmd.label(), "history overwrite");
        self.entries[index] = cmd;
        self.entries[index].execute(state)
    }

    /// Whether an undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Total number of entries, applied or not.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Number of applied entries.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Truncation epoch; see the `generation` field.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Labels of the full stack, oldest first. Debug/inspection only.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label()).collect()
    }

    /// Drop all entries. Used when history is replaced wholesale
    /// (e.g. a full document restore).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.generation += 1;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
