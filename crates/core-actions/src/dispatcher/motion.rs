//! Motion sub-dispatch (cursor movement).
//!
//! Targets come from `span_resolver::motion_target`; this module only decides
//! how the cursor adopts them:
//! * vertical motions keep the preferred column,
//! * `$` pins the preferred column to end of line,
//! * everything else resets it to the new column.
//!
//! Outside Insert mode the cursor is then normalized onto a real character.

use crate::span_resolver::{self, MotionKind};
use core_state::EditorState;
use core_text::motion;

/// Move the cursor by `kind`. `past_end` allows the end-of-line column
/// (Insert mode). Returns whether the cursor moved.
pub(crate) fn apply(
    state: &mut EditorState,
    kind: MotionKind,
    count: Option<usize>,
    past_end: bool,
) -> bool {
    let before = state.cursor;
    let Some(target) =
        span_resolver::motion_target(&state.buffer, state.cursor, kind, count, past_end)
    else {
        tracing::debug!(target: "actions.dispatch", motion = ?kind, "motion_unresolved");
        return false;
    };
    if kind.is_vertical() {
        state.cursor.set_vertical(target);
    } else if kind == MotionKind::LineEnd {
        state.cursor.set_end_of_line(target);
    } else {
        state.cursor.set(target);
    }
    if !past_end {
        state.cursor.position =
            motion::normalize_normal_mode_position(&state.buffer, state.cursor.position);
    }
    let after = state.cursor.position;
    tracing::trace!(target: "actions.dispatch", motion = ?kind, line = before.position.line, col = before.position.column, to_line = after.line, to_col = after.column, "motion");
    before != state.cursor
}
