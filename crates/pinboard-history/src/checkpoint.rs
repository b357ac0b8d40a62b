#![forbid(unsafe_code)]

//! Gesture-scoped history coalescing.
//!
//! A continuous gesture (drag, resize) produces a geometry mutation on every
//! pointer frame, but to the user the whole gesture is one action. A
//! [`Checkpoint`] makes that explicit: the first `overwrite` performs a
//! normal [`History::write`]; every later call in the same gesture replaces
//! the entry at the same stack position and executes it directly, without
//! touching the cursor or truncating redo entries. One `undo()` then reverts
//! the entire gesture.
//!
//! A checkpoint is created at gesture start and discarded at gesture end, so
//! its "first call" state never leaks across gestures. The armed slot is an
//! explicit field rather than a closured flag so the scoping invariant is
//! visible and testable on its own.

use std::marker::PhantomData;

use crate::command::{CommandResult, Undoable};
use crate::history::History;

/// Stack position claimed by a checkpoint's first write.
///
/// The generation pins the claim to the truncation epoch it was made in:
/// if the history discards entries after the claim, the same index may be
/// refilled by an unrelated write, and overwriting it would corrupt the
/// stack.
#[derive(Debug, Clone, Copy)]
struct ArmedSlot {
    index: usize,
    generation: u64,
}

/// Overwrite-mode handle into a [`History`].
#[derive(Debug)]
pub struct Checkpoint<S> {
    slot: Option<ArmedSlot>,
    _state: PhantomData<fn(&mut S)>,
}

impl<S> Default for Checkpoint<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Checkpoint<S> {
    /// Create an unarmed checkpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: None,
            _state: PhantomData,
        }
    }

    /// Write or overwrite this gesture's single history entry, executing it.
    ///
    /// The claimed slot is only overwritten while it is still the topmost
    /// applied entry of the same truncation epoch it was written in. If an
    /// interleaved undo left the slot behind the cursor, or an interleaved
    /// write discarded and refilled it, the checkpoint re-arms and claims a
    /// fresh slot instead of clobbering an entry it does not own.
    pub fn overwrite(
        &mut self,
        history: &mut History<S>,
        state: &mut S,
        cmd: Box<dyn Undoable<S>>,
    ) -> CommandResult {
        match self.slot {
            Some(slot)
                if slot.index + 1 == history.cursor()
                    && slot.generation == history.generation() =>
            {
                history.overwrite_at(slot.index, state, cmd)
            }
            _ => {
                history.write(state, cmd)?;
                self.slot = Some(ArmedSlot {
                    index: history.cursor() - 1,
                    generation: history.generation(),
                });
                Ok(())
            }
        }
    }

    /// Whether the first write has happened.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FnCommand;

    // A "move" over a plain i32: from/to captured per frame, like a drag.
    fn set_cmd(from: i32, to: i32) -> Box<dyn Undoable<i32>> {
        Box::new(FnCommand::new(
            "set",
            move |s: &mut i32| {
                *s = to;
                Ok(())
            },
            move |s: &mut i32| {
                *s = from;
                Ok(())
            },
        ))
    }

    #[test]
    fn n_overwrites_undo_in_one_step() {
        let mut state = 0;
        let mut history = History::new();
        let mut cp = Checkpoint::new();
        for frame in 1..=10 {
            cp.overwrite(&mut history, &mut state, set_cmd(0, frame))
                .unwrap();
        }
        assert_eq!(state, 10);
        assert_eq!(history.depth(), 1, "all frames share one slot");
        history.undo(&mut state).unwrap().unwrap();
        assert_eq!(state, 0, "single undo reverts the whole gesture");
    }

    #[test]
    fn first_overwrite_is_a_normal_write() {
        let mut state = 0;
        let mut history = History::new();
        let mut cp = Checkpoint::new();
        assert!(!cp.is_armed());
        cp.overwrite(&mut history, &mut state, set_cmd(0, 5)).unwrap();
        assert!(cp.is_armed());
        assert_eq!(history.depth(), 1);
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn overwrite_does_not_touch_cursor_or_redo() {
        let mut state = 0;
        let mut history = History::new();
        history.write(&mut state, set_cmd(0, 1)).unwrap();

        let mut cp = Checkpoint::new();
        cp.overwrite(&mut history, &mut state, set_cmd(1, 2)).unwrap();
        let cursor_before = history.cursor();
        cp.overwrite(&mut history, &mut state, set_cmd(1, 3)).unwrap();
        cp.overwrite(&mut history, &mut state, set_cmd(1, 4)).unwrap();
        assert_eq!(history.cursor(), cursor_before);
        assert_eq!(history.depth(), 2);
        assert_eq!(state, 4);
    }

    #[test]
    fn separate_checkpoints_get_separate_slots() {
        let mut state = 0;
        let mut history = History::new();

        let mut first = Checkpoint::new();
        first.overwrite(&mut history, &mut state, set_cmd(0, 1)).unwrap();
        first.overwrite(&mut history, &mut state, set_cmd(0, 2)).unwrap();

        let mut second = Checkpoint::new();
        second.overwrite(&mut history, &mut state, set_cmd(2, 3)).unwrap();
        second.overwrite(&mut history, &mut state, set_cmd(2, 4)).unwrap();

        assert_eq!(history.depth(), 2, "one slot per gesture");
        history.undo(&mut state).unwrap().unwrap();
        assert_eq!(state, 2);
        history.undo(&mut state).unwrap().unwrap();
        assert_eq!(state, 0);
    }

    #[test]
    fn cleared_slot_rearms() {
        let mut state = 0;
        let mut history = History::new();
        let mut cp = Checkpoint::new();
        cp.overwrite(&mut history, &mut state, set_cmd(0, 1)).unwrap();
        history.clear();

        cp.overwrite(&mut history, &mut state, set_cmd(1, 9)).unwrap();
        assert_eq!(history.depth(), 1);
        assert_eq!(state, 9);
    }

    #[test]
    fn refilled_slot_is_not_clobbered() {
        let mut state = 0;
        let mut history = History::new();
        let mut cp = Checkpoint::new();
        cp.overwrite(&mut history, &mut state, set_cmd(0, 1)).unwrap();

        // Undo past the slot, then branch: the write truncates the slot away
        // and refills index 0 with an unrelated entry.
        history.undo(&mut state).unwrap().unwrap();
        history.write(&mut state, set_cmd(0, 7)).unwrap();

        cp.overwrite(&mut history, &mut state, set_cmd(7, 9)).unwrap();
        assert_eq!(history.depth(), 2, "stale checkpoint claims a fresh slot");
        assert_eq!(state, 9);
        history.undo(&mut state).unwrap().unwrap();
        assert_eq!(state, 7, "unrelated entry survived intact");
    }

    #[test]
    fn undo_mid_gesture_rearms_instead_of_writing_behind_cursor() {
        let mut state = 0;
        let mut history = History::new();
        let mut cp = Checkpoint::new();
        cp.overwrite(&mut history, &mut state, set_cmd(0, 3)).unwrap();
        history.undo(&mut state).unwrap().unwrap();
        assert_eq!(state, 0);

        // The gesture continues: the next frame must become a new applied
        // entry, not execute into the undone slot.
        cp.overwrite(&mut history, &mut state, set_cmd(0, 5)).unwrap();
        assert_eq!(state, 5);
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.depth(), 1, "undone frame discarded by the rewrite");
        history.undo(&mut state).unwrap().unwrap();
        assert_eq!(state, 0);
    }
}
