//! Undo / redo dispatch (`u`, `Ctrl-R`).
//!
//! Delegates to the snapshot stacks inside `EditorState`. A count repeats
//! the step; the first exhausted step stops the loop and leaves the status
//! message set by the state ("already at oldest change" / "... newest ...").

use super::DispatchResult;
use core_state::EditorState;

pub(crate) fn handle_undo(state: &mut EditorState, count: usize) -> DispatchResult {
    let steps = repeat(count, || state.undo());
    tracing::trace!(target: "actions.dispatch", op = "undo", steps, undo_depth = state.undo_depth(), redo_depth = state.redo_depth(), "undo");
    finish(state, steps)
}

pub(crate) fn handle_redo(state: &mut EditorState, count: usize) -> DispatchResult {
    let steps = repeat(count, || state.redo());
    tracing::trace!(target: "actions.dispatch", op = "redo", steps, undo_depth = state.undo_depth(), redo_depth = state.redo_depth(), "redo");
    finish(state, steps)
}

fn repeat(count: usize, mut step: impl FnMut() -> bool) -> usize {
    let mut done = 0;
    while done < count.max(1) && step() {
        done += 1;
    }
    done
}

fn finish(state: &mut EditorState, steps: usize) -> DispatchResult {
    if steps == 0 {
        // Nothing restored; only the status message changed.
        return DispatchResult::dirty();
    }
    state.clamp_cursor_normal();
    DispatchResult::edited()
}
