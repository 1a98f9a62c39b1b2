//! `Editor`: one editing session.
//!
//! Owns the `EditorState` aggregate and the current `ModeState`. Mode
//! handlers are free functions taking both by `&mut`, so nothing holds a
//! reference back into the session.

use crate::dispatcher::{self, DispatchResult, ModeState};
use core_config::Config;
use core_events::KeyNotationError;
use core_state::{EditorOptions, EditorState, Mode};
use core_text::{Buffer, Position, display_column, motion};

/// Facts an external status line formats. Coordinates are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFacts {
    pub mode: Mode,
    pub line: usize,
    pub column: usize,
    /// Terminal cell column of the cursor (tabs and wide glyphs expanded).
    pub display_column: usize,
    pub line_count: usize,
    pub dirty: bool,
    /// `%` target when the cursor sits on a bracket that has a partner.
    pub matching_bracket: Option<Position>,
    pub message: Option<String>,
    /// Pending keys (`2d`, `"a`, `:wq`).
    pub pending: String,
}

#[derive(Debug, Clone, Default)]
pub struct Editor {
    state: EditorState,
    mode: ModeState,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EditorOptions) -> Self {
        Self {
            state: EditorState::with_options(Buffer::new(), options),
            mode: ModeState::default(),
        }
    }

    /// Session using the `[editor]` section of a loaded config.
    pub fn with_config(config: &Config) -> Self {
        Self::with_options(EditorOptions::from(config.editor()))
    }

    pub fn from_text(text: &str) -> Self {
        let mut editor = Self::new();
        editor.load_text(text);
        editor
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn mode_state(&self) -> &ModeState {
        &self.mode
    }

    /// Replace the document and return to Normal mode with pending state
    /// cleared. Registers and last find/search survive.
    pub fn load_text(&mut self, text: &str) {
        self.state.load_text(text);
        self.mode = ModeState::default();
    }

    pub fn text(&self) -> String {
        self.state.text()
    }

    pub fn handle_key(&mut self, key: char) -> DispatchResult {
        dispatcher::handle_key(&mut self.state, &mut self.mode, key)
    }

    /// Dispatch every key in order. Returns the `:` commands the session
    /// handed out, in order.
    pub fn feed(&mut self, keys: impl IntoIterator<Item = char>) -> Vec<String> {
        keys.into_iter()
            .filter_map(|k| self.handle_key(k).command)
            .collect()
    }

    /// `feed` for key notation (`"dw"`, `"ihi<Esc>"`, `"<C-r>"`).
    pub fn feed_keys(&mut self, notation: &str) -> Result<Vec<String>, KeyNotationError> {
        let keys = core_events::parse_keys(notation)?;
        Ok(self.feed(keys))
    }

    pub fn status(&self) -> StatusFacts {
        let st = &self.state;
        let pos = st.buffer.clamp_position(st.cursor.position);
        let line_text = st.buffer.line(pos.line).unwrap_or_default();
        StatusFacts {
            mode: self.mode(),
            line: pos.line,
            column: pos.column,
            display_column: display_column(line_text, pos.column),
            line_count: st.buffer.line_count(),
            dirty: st.dirty,
            matching_bracket: motion::matching_bracket(&st.buffer, pos),
            message: st.message().map(str::to_owned),
            pending: self.mode.pending_echo(),
        }
    }
}
