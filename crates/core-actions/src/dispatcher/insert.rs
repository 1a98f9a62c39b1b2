//! Insert mode: text entry, deletion and cursor keys.
//!
//! A contiguous run of insert-mode mutations is one undo step. The snapshot
//! is taken lazily by `begin_insert_edit` right before the first mutation, so
//! entering Insert mode and leaving again without typing records nothing.
//! Enter, cursor keys and Esc close the run.

use super::{DispatchResult, ModeState, motion};
use crate::span_resolver::MotionKind;
use core_events::KeyCode;
use core_state::EditorState;
use core_text::Position;

pub(crate) fn handle(state: &mut EditorState, mode: &mut ModeState, key: char) -> DispatchResult {
    match KeyCode::from_code_point(key) {
        KeyCode::Esc => {
            state.end_insert_run();
            let pos = state.buffer.clamp_position(state.cursor.position);
            state.cursor.set(Position::new(pos.line, pos.column.saturating_sub(1)));
            state.clamp_cursor_normal();
            *mode = ModeState::normal();
            DispatchResult::dirty()
        }
        KeyCode::Enter => {
            insert_char(state, '\n');
            state.end_insert_run();
            DispatchResult::edited()
        }
        KeyCode::Tab => {
            insert_char(state, '\t');
            DispatchResult::edited()
        }
        KeyCode::Backspace => backspace(state),
        KeyCode::Delete => delete_forward(state),
        KeyCode::Left => cursor_key(state, MotionKind::Left),
        KeyCode::Right => cursor_key(state, MotionKind::Right),
        KeyCode::Up => cursor_key(state, MotionKind::Up),
        KeyCode::Down => cursor_key(state, MotionKind::Down),
        KeyCode::Home => cursor_key(state, MotionKind::LineStart),
        KeyCode::End => cursor_key(state, MotionKind::LineEnd),
        KeyCode::Char(c) if !c.is_control() => {
            insert_char(state, c);
            DispatchResult::edited()
        }
        KeyCode::Char(_) | KeyCode::Ctrl(_) => DispatchResult::clean(),
    }
}

fn insert_char(state: &mut EditorState, ch: char) {
    state.begin_insert_edit();
    let mut pos = state.buffer.clamp_position(state.cursor.position);
    let before = pos;
    state.buffer.insert_char(&mut pos, ch);
    state.cursor.set(pos);
    tracing::trace!(target: "actions.dispatch", op = if ch == '\n' { "insert_newline" } else { "insert_char" }, line = before.line, col = before.column, to_line = pos.line, to_col = pos.column, "edit");
}

fn backspace(state: &mut EditorState) -> DispatchResult {
    let mut pos = state.buffer.clamp_position(state.cursor.position);
    if pos == Position::origin() {
        return DispatchResult::clean();
    }
    let before = pos;
    state.begin_insert_edit();
    state.buffer.delete_backward(&mut pos);
    state.cursor.set(pos);
    tracing::trace!(target: "actions.dispatch", op = "backspace", line = before.line, col = before.column, to_line = pos.line, to_col = pos.column, "edit");
    DispatchResult::edited()
}

/// Delete key: remove the character under the cursor, or join the next line
/// when the cursor sits at the end of its line.
fn delete_forward(state: &mut EditorState) -> DispatchResult {
    let pos = state.buffer.clamp_position(state.cursor.position);
    let at_line_end = pos.column >= state.buffer.line_len(pos.line);
    if at_line_end && pos.line >= state.buffer.last_line() {
        return DispatchResult::clean();
    }
    state.begin_insert_edit();
    if at_line_end {
        state.buffer.delete_range(pos, Position::new(pos.line + 1, 0));
    } else {
        state.buffer.delete_char(pos);
    }
    state.cursor.set(pos);
    tracing::trace!(target: "actions.dispatch", op = "delete_forward", line = pos.line, col = pos.column, joined = at_line_end, "edit");
    DispatchResult::edited()
}

fn cursor_key(state: &mut EditorState, kind: MotionKind) -> DispatchResult {
    state.end_insert_run();
    DispatchResult::moved(motion::apply(state, kind, None, true))
}
