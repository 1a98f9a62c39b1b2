//! Command line (`:`) and search line (`/`, `?`) input.
//!
//! Both modes collect characters into the `ModeState` payload until Enter.
//! Backspace on an empty line and Esc cancel back to Normal mode.
//!
//! On Enter:
//! * `:` lines go through `CommandParser`. A bare integer moves to that
//!   (1-based, clamped) line; any other text is returned in
//!   `DispatchResult::command` for the embedding front end.
//! * search lines run a literal, wrapping search and remember pattern and
//!   direction for `n` / `N`. An empty pattern reuses the previous one.

use super::command_parser::{CommandParser, ParsedCommand};
use super::{DispatchResult, ModeState};
use core_events::KeyCode;
use core_state::{EditorState, SearchMemory};
use core_text::{motion, search};

/// Where the collected line goes on Enter.
enum LineKind {
    Command,
    Search { forward: bool },
}

pub(crate) fn handle(state: &mut EditorState, mode: &mut ModeState, key: char) -> DispatchResult {
    let (input, kind) = match mode {
        ModeState::Command { input } => (input, LineKind::Command),
        ModeState::Search { input, forward } => (input, LineKind::Search { forward: *forward }),
        _ => return DispatchResult::clean(),
    };
    match KeyCode::from_code_point(key) {
        KeyCode::Esc => {
            *mode = ModeState::normal();
            DispatchResult::dirty()
        }
        KeyCode::Backspace => {
            if input.pop().is_none() {
                *mode = ModeState::normal();
            }
            DispatchResult::dirty()
        }
        KeyCode::Enter => {
            let line = std::mem::take(input);
            *mode = ModeState::normal();
            match kind {
                LineKind::Command => execute_command(state, &line),
                LineKind::Search { forward } => execute_search(state, line, forward),
            }
        }
        KeyCode::Tab => {
            input.push('\t');
            DispatchResult::dirty()
        }
        KeyCode::Char(c) if !c.is_control() => {
            input.push(c);
            DispatchResult::dirty()
        }
        _ => DispatchResult::clean(),
    }
}

fn execute_command(state: &mut EditorState, line: &str) -> DispatchResult {
    match CommandParser::parse(line) {
        ParsedCommand::Empty => DispatchResult::dirty(),
        ParsedCommand::GoToLine(n) => {
            let target = motion::go_to_line(&state.buffer, n.saturating_sub(1));
            state.cursor.set(target);
            state.clamp_cursor_normal();
            tracing::trace!(target: "actions.dispatch", op = "goto_line", requested = n, line = target.line, "command");
            DispatchResult::dirty()
        }
        ParsedCommand::External(cmd) => {
            tracing::debug!(target: "actions.dispatch", len = cmd.len(), "command_external");
            DispatchResult::command(cmd)
        }
    }
}

fn execute_search(state: &mut EditorState, pattern: String, forward: bool) -> DispatchResult {
    let pattern = if pattern.is_empty() {
        match &state.last_search {
            Some(last) => last.pattern.clone(),
            None => {
                state.set_message("no previous search pattern");
                return DispatchResult::dirty();
            }
        }
    } else {
        pattern
    };
    state.last_search = Some(SearchMemory {
        pattern: pattern.clone(),
        forward,
    });
    search_step(state, &pattern, forward, 1);
    DispatchResult::dirty()
}

/// `n` (`reverse == false`) / `N`: repeat the last search `count` times.
pub(crate) fn repeat_search(state: &mut EditorState, reverse: bool, count: usize) -> DispatchResult {
    let Some(last) = state.last_search.clone() else {
        state.set_message("no previous search pattern");
        return DispatchResult::dirty();
    };
    let moved = search_step(state, &last.pattern, last.forward != reverse, count);
    DispatchResult::moved(moved || state.message().is_some())
}

/// Move to the `count`-th match, going round the document as often as the
/// count needs. On failure the cursor stays put and the status message names
/// the pattern.
fn search_step(state: &mut EditorState, pattern: &str, forward: bool, count: usize) -> bool {
    let start = state.cursor.position;
    let Some(pos) = search::find_nth(&state.buffer, start, pattern, forward, count) else {
        tracing::debug!(target: "actions.dispatch", forward, len = pattern.len(), "search_not_found");
        state.set_message(format!("pattern not found: {pattern}"));
        return false;
    };
    state.cursor.set(pos);
    state.clamp_cursor_normal();
    tracing::trace!(target: "actions.dispatch", op = "search", forward, line = start.line, col = start.column, to_line = pos.line, to_col = pos.column, "motion");
    pos != start
}
