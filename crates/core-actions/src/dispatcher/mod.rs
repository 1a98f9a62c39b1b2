//! Keystroke dispatcher.
//!
//! One code point at a time goes through `handle_key`, which routes it to the
//! handler of the current mode. Per-mode state lives in the tagged
//! `ModeState` variant (pending counts, find prefixes, the visual anchor, the
//! command line being typed) so each handler carries only what it needs.
//! Sub-modules:
//! * `normal`  - count/prefix state machine, Normal mode commands
//! * `insert`  - text entry and insert-run coalescing
//! * `visual`  - character-wise selection and operators on it
//! * `command` - `:` and `/` `?` line input
//! * `motion`  - cursor movement shared by the modes
//! * `edit`    - Normal mode edits that are not operators (`x`, `p`, `J`, ...)
//! * `undo`    - undo / redo dispatch

use core_state::{EditorState, Mode};
use core_text::Position;

mod command;
mod command_parser;
mod edit;
mod insert;
mod motion;
mod normal;
mod undo;
mod visual;

pub use command_parser::{CommandParser, ParsedCommand};
pub use normal::NormalState;
pub use visual::VisualState;

/// Emitted when a keystroke switched modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub from: Mode,
    pub to: Mode,
}

/// Result of dispatching a single keystroke.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// Something visible changed (cursor, text, mode, pending echo).
    pub dirty: bool,
    /// The buffer text was mutated.
    pub text_changed: bool,
    pub mode_changed: Option<ModeChange>,
    /// A `:` command the core does not execute itself, without the colon.
    pub command: Option<String>,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }
    pub fn clean() -> Self {
        Self::default()
    }
    pub fn edited() -> Self {
        Self {
            dirty: true,
            text_changed: true,
            ..Self::default()
        }
    }
    pub fn command(cmd: String) -> Self {
        Self {
            dirty: true,
            command: Some(cmd),
            ..Self::default()
        }
    }
    /// `dirty()` when `moved`, else `clean()`.
    pub fn moved(moved: bool) -> Self {
        if moved { Self::dirty() } else { Self::clean() }
    }
}

/// Mode payload. `mode()` maps each variant onto the public `Mode`.
#[derive(Debug, Clone)]
pub enum ModeState {
    Normal(NormalState),
    Insert,
    Visual(VisualState),
    Command { input: String },
    Search { input: String, forward: bool },
}

impl Default for ModeState {
    fn default() -> Self {
        ModeState::Normal(NormalState::default())
    }
}

impl ModeState {
    pub fn mode(&self) -> Mode {
        match self {
            ModeState::Normal(_) => Mode::Normal,
            ModeState::Insert => Mode::Insert,
            ModeState::Visual(_) => Mode::Visual,
            ModeState::Command { .. } => Mode::Command,
            ModeState::Search { .. } => Mode::Search,
        }
    }

    pub(crate) fn normal() -> Self {
        ModeState::default()
    }

    pub(crate) fn visual(anchor: Position) -> Self {
        ModeState::Visual(VisualState::new(anchor))
    }

    /// Pending keys to echo on a status line (`3d`, `"a`, `:wq`, `/foo`).
    pub fn pending_echo(&self) -> String {
        match self {
            ModeState::Normal(ns) => ns.echo(),
            ModeState::Visual(vs) => vs.echo(),
            ModeState::Insert => String::new(),
            ModeState::Command { input } => format!(":{input}"),
            ModeState::Search { input, forward } => {
                format!("{}{input}", if *forward { '/' } else { '?' })
            }
        }
    }
}

/// Apply one keystroke to the session.
pub fn handle_key(state: &mut EditorState, mode: &mut ModeState, key: char) -> DispatchResult {
    let from = mode.mode();
    if !matches!(mode, ModeState::Command { .. } | ModeState::Search { .. }) {
        state.clear_message();
    }
    let mut result = match mode {
        ModeState::Normal(_) => normal::handle(state, mode, key),
        ModeState::Insert => insert::handle(state, mode, key),
        ModeState::Visual(_) => visual::handle(state, mode, key),
        ModeState::Command { .. } | ModeState::Search { .. } => command::handle(state, mode, key),
    };
    let to = mode.mode();
    state.mode = to;
    if from != to {
        tracing::trace!(target: "actions.dispatch", ?from, ?to, "mode_change");
        result.dirty = true;
        result.mode_changed = Some(ModeChange { from, to });
    }
    if result.text_changed {
        state.dirty = true;
    }
    result
}
