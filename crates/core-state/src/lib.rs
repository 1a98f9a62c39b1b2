//! Editor state: buffer, cursor, mode, registers, undo engine and session metadata.
//!
//! `EditorState` is the single owning aggregate for one editing session. The
//! dispatcher in `core-actions` mutates it through `&mut` methods; nothing in
//! here holds a reference back to the dispatcher or to mode handlers.
//!
//! Undo policy:
//! - Discrete Normal mode edits (`x`, operators, paste, `J`, `r`) call
//!   `save_undo_state` immediately before mutating, so each is undone alone.
//! - A contiguous run of Insert mode typing is captured by a *single*
//!   snapshot taken lazily at the first mutation of the run. `Esc` and Enter
//!   close the run; Backspace does not.
//! - Undo/redo restore text and cursor only. The mode is never restored, so
//!   undoing a just-finished insert does not re-enter Insert mode.
//!
//! Snapshot lifecycle emits trace events under `state.undo` (see `undo`).

use core_config::EditorConfig;
use core_text::{Buffer, Cursor, Position, motion};
use tracing::{debug, trace};

pub mod register;
pub mod undo;

pub use register::{RegisterContent, Registers};
pub use undo::{DEFAULT_UNDO_DEPTH, InsertRun, UndoEngine, UndoState};

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Command/navigation mode.
    #[default]
    Normal,
    /// Text entry.
    Insert,
    /// Character-wise selection.
    Visual,
    /// `:` command line entry.
    Command,
    /// `/` or `?` pattern entry.
    Search,
}

impl Mode {
    /// Upper-case label used by status lines.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
            Mode::Command => "COMMAND",
            Mode::Search => "SEARCH",
        }
    }
}

/// Editing options handed in by the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub undo_depth: usize,
    /// Columns added or removed per level by `>` and `<`.
    pub shift_width: usize,
    /// Indent with spaces; `false` indents with one tab per level.
    pub expand_tab: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            shift_width: 4,
            expand_tab: true,
        }
    }
}

impl From<&EditorConfig> for EditorOptions {
    fn from(cfg: &EditorConfig) -> Self {
        Self {
            undo_depth: cfg.undo_depth,
            shift_width: cfg.shift_width,
            expand_tab: cfg.expand_tab,
        }
    }
}

impl EditorOptions {
    /// One indentation level as text.
    pub fn indent_unit(&self) -> String {
        if self.expand_tab {
            " ".repeat(self.shift_width.max(1))
        } else {
            "\t".to_string()
        }
    }
}

/// `f`/`F`/`t`/`T` flavour remembered for `;` and `,`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    /// `f` / `F`: land on the character.
    Find,
    /// `t` / `T`: stop one column short.
    Till,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindMemory {
    pub kind: FindKind,
    pub forward: bool,
    pub target: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMemory {
    pub pattern: String,
    pub forward: bool,
}

/// Line ending style detected in loaded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
    Cr,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub normalized: String,         // LF-only content
    pub original: LineEnding,       // majority style
    pub had_trailing_newline: bool, // original ended with a line break
}

/// Normalize CRLF and lone CR to LF. The dominant style is reported so a
/// save can restore it (ties resolved CRLF > LF > CR).
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let (mut crlf, mut lf, mut cr) = (0usize, 0usize, 0usize);
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                crlf += 1;
                out.push('\n');
            }
            '\r' => {
                cr += 1;
                out.push('\n');
            }
            '\n' => {
                lf += 1;
                out.push('\n');
            }
            other => out.push(other),
        }
    }
    let mut original = LineEnding::Lf;
    let mut max = 0usize;
    for (style, count) in [
        (LineEnding::Crlf, crlf),
        (LineEnding::Lf, lf),
        (LineEnding::Cr, cr),
    ] {
        if count > max {
            max = count;
            original = style;
        }
    }
    NormalizedText {
        had_trailing_newline: out.ends_with('\n'),
        normalized: out,
        original,
    }
}

/// Single-session editor aggregate.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub buffer: Buffer,
    pub cursor: Cursor,
    pub mode: Mode,
    pub dirty: bool,
    pub registers: Registers,
    pub options: EditorOptions,
    pub last_find: Option<FindMemory>,
    pub last_search: Option<SearchMemory>,
    pub original_line_ending: LineEnding,
    pub had_trailing_newline: bool,
    undo: UndoEngine,
    message: Option<String>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Buffer::new())
    }
}

impl EditorState {
    pub fn new(buffer: Buffer) -> Self {
        Self::with_options(buffer, EditorOptions::default())
    }

    pub fn with_options(buffer: Buffer, options: EditorOptions) -> Self {
        Self {
            buffer,
            cursor: Cursor::default(),
            mode: Mode::Normal,
            dirty: false,
            registers: Registers::new(),
            options,
            last_find: None,
            last_search: None,
            original_line_ending: LineEnding::Lf,
            had_trailing_newline: false,
            undo: UndoEngine::with_max_depth(options.undo_depth),
            message: None,
        }
    }

    /// Replace the document with loaded text. Line endings are normalized and
    /// one trailing line break is treated as a terminator. Cursor, undo
    /// history, mode and dirty flag reset; registers survive.
    pub fn load_text(&mut self, text: &str) {
        let norm = normalize_line_endings(text);
        let body = norm
            .normalized
            .strip_suffix('\n')
            .unwrap_or(&norm.normalized);
        self.buffer = Buffer::from_text(body);
        self.original_line_ending = norm.original;
        self.had_trailing_newline = norm.had_trailing_newline;
        self.cursor = Cursor::default();
        self.mode = Mode::Normal;
        self.dirty = false;
        self.undo = UndoEngine::with_max_depth(self.options.undo_depth);
        self.message = None;
        debug!(target: "state.buffer", lines = self.buffer.line_count(), line_ending = ?norm.original, "buffer_loaded");
    }

    /// Document text with `'\n'` separators and no trailing terminator.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Text for writing back: original line ending style, trailing line break
    /// restored when the loaded text had one.
    pub fn text_for_save(&self) -> String {
        let sep = self.original_line_ending.as_str();
        let mut out = self.buffer.lines().join(sep);
        if self.had_trailing_newline {
            out.push_str(sep);
        }
        out
    }

    /// The external save collaborator wrote the text out.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        trace!(target: "state.buffer", "marked_saved");
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn position(&self) -> Position {
        self.cursor.position
    }

    /// Clamp the cursor into the buffer, Normal mode style (on a character).
    pub fn clamp_cursor_normal(&mut self) {
        let clamped = motion::normalize_normal_mode_position(&self.buffer, self.cursor.position);
        self.cursor.position = clamped;
    }

    fn snapshot(&self) -> UndoState {
        UndoState::new(self.buffer.text(), self.cursor.position)
    }

    /// Snapshot the current state before a discrete destructive edit.
    pub fn save_undo_state(&mut self) {
        let snap = self.snapshot();
        self.undo.save_state(snap);
    }

    /// Lazily open an insert run (snapshotting on its first edit) and count
    /// the edit that is about to happen.
    pub fn begin_insert_edit(&mut self) {
        let snap = self.snapshot();
        self.undo.begin_insert_run(snap);
        self.undo.note_insert_edit();
    }

    /// Continue the undo step of the edit that just opened Insert mode.
    pub fn join_insert_run(&mut self) {
        self.undo.join_insert_run();
    }

    pub fn end_insert_run(&mut self) {
        self.undo.end_insert_run();
    }

    pub fn insert_run(&self) -> InsertRun {
        self.undo.insert_run()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// Undo one change. On an empty history the status message reports it and
    /// nothing else changes.
    pub fn undo(&mut self) -> bool {
        self.undo.end_insert_run();
        let current = self.snapshot();
        match self.undo.undo(current) {
            Some(state) => {
                self.restore(state);
                true
            }
            None => {
                self.set_message("already at oldest change");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        self.undo.end_insert_run();
        let current = self.snapshot();
        match self.undo.redo(current) {
            Some(state) => {
                self.restore(state);
                true
            }
            None => {
                self.set_message("already at newest change");
                false
            }
        }
    }

    fn restore(&mut self, state: UndoState) {
        self.buffer.replace_all(&state.text);
        self.cursor.set(self.buffer.clamp_position(state.cursor));
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_crlf_and_cr() {
        let n = normalize_line_endings("a\r\nb\r\nc\rd\n");
        assert_eq!(n.normalized, "a\nb\nc\nd\n");
        assert_eq!(n.original, LineEnding::Crlf);
        assert!(n.had_trailing_newline);
        let plain = normalize_line_endings("x");
        assert_eq!(plain.original, LineEnding::Lf);
        assert!(!plain.had_trailing_newline);
    }

    #[test]
    fn load_text_strips_terminator_and_resets() {
        let mut s = EditorState::default();
        s.cursor.set(Position::new(0, 0));
        s.dirty = true;
        s.load_text("one\r\ntwo\r\n");
        assert_eq!(s.buffer.lines(), ["one", "two"]);
        assert!(!s.dirty);
        assert_eq!(s.text(), "one\ntwo");
        assert_eq!(s.text_for_save(), "one\r\ntwo\r\n");
        assert_eq!(s.undo_depth(), 0);
    }

    #[test]
    fn load_empty_text_keeps_one_line() {
        let mut s = EditorState::default();
        s.load_text("");
        assert_eq!(s.buffer.line_count(), 1);
        assert_eq!(s.text_for_save(), "");
    }

    #[test]
    fn undo_on_empty_history_reports_oldest() {
        let mut s = EditorState::default();
        assert!(!s.undo());
        assert_eq!(s.message(), Some("already at oldest change"));
        assert_eq!(s.text(), "");
        assert!(!s.redo());
        assert_eq!(s.message(), Some("already at newest change"));
    }

    #[test]
    fn undo_restores_text_and_cursor() {
        let mut s = EditorState::new(Buffer::from_text("abc"));
        s.cursor.set(Position::new(0, 1));
        s.save_undo_state();
        s.buffer.delete_char(Position::new(0, 1));
        s.cursor.set(Position::new(0, 0));
        assert!(s.undo());
        assert_eq!(s.text(), "abc");
        assert_eq!(s.position(), Position::new(0, 1));
        assert!(s.redo());
        assert_eq!(s.text(), "ac");
        assert_eq!(s.position(), Position::new(0, 0));
    }

    #[test]
    fn options_come_from_config_and_bound_undo() {
        let cfg = EditorConfig {
            undo_depth: 2,
            shift_width: 2,
            expand_tab: false,
        };
        let opts = EditorOptions::from(&cfg);
        assert_eq!(opts.indent_unit(), "\t");
        let mut s = EditorState::with_options(Buffer::from_text("x"), opts);
        for _ in 0..4 {
            s.save_undo_state();
            s.buffer.insert_text(Position::origin(), "x");
        }
        assert_eq!(s.undo_depth(), 2);
        assert_eq!(EditorOptions::default().indent_unit(), "    ");
    }

    #[test]
    fn mode_labels() {
        assert_eq!(Mode::default(), Mode::Normal);
        assert_eq!(Mode::Insert.label(), "INSERT");
    }
}
