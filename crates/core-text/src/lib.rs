//! Line-array text buffer and the pure helpers built on top of it.
//!
//! The document is stored as an ordered `Vec<String>`, one entry per line.
//! Line breaks are structural: no entry ever contains `'\n'`. Columns are
//! counted in Unicode scalar values (one column per `char`), so every column in
//! `[0, line_len]` is addressable, the last one meaning "end of line".
//!
//! Nothing in this crate returns an error or panics on out-of-range
//! coordinates. Reads clamp, writes outside the document are silent no-ops;
//! callers that need a hard failure must validate before calling.

pub mod class;
pub mod cursor;
pub mod motion;
pub mod search;
pub mod width;

pub use class::{CharClass, WordKind, classify, is_word_char};
pub use cursor::{Cursor, END_OF_LINE};
pub use width::display_column;

/// A (line, column) coordinate. Both components are zero-based; the column is
/// a character index within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn origin() -> Self {
        Self { line: 0, column: 0 }
    }

    /// Build from signed cursor arithmetic, flooring negative components at zero.
    pub fn from_signed(line: isize, column: isize) -> Self {
        Self {
            line: line.max(0) as usize,
            column: column.max(0) as usize,
        }
    }
}

/// Ordered sequence of independently mutable lines. Always holds at least one
/// (possibly empty) line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    lines: Vec<String>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of character `column` in `line`, saturating at `line.len()`.
fn byte_index(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(b, _)| b)
        .unwrap_or(line.len())
}

impl Buffer {
    /// An empty document: a single empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Split `text` on `'\n'` into lines. A trailing newline yields a final
    /// empty line; callers that treat it as a terminator strip it first.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_owned).collect(),
        }
    }

    /// Build directly from line entries. An empty vector becomes one empty line,
    /// and embedded line breaks are split into separate entries.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for line in lines {
            let line: String = line.into();
            out.extend(line.split('\n').map(str::to_owned));
        }
        if out.is_empty() {
            out.push(String::new());
        }
        Self { lines: out }
    }

    /// Full document text, lines joined with `'\n'`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the whole document (load / undo / redo).
    pub fn replace_all(&mut self, text: &str) {
        *self = Self::from_text(text);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    /// Character length of line `idx`; zero for lines that do not exist.
    pub fn line_len(&self, idx: usize) -> usize {
        self.lines.get(idx).map_or(0, |l| l.chars().count())
    }

    /// Characters of line `idx` (empty when out of range). Motions that scan a
    /// line take one copy up front instead of re-walking UTF-8 per column.
    pub fn line_chars(&self, idx: usize) -> Vec<char> {
        self.lines
            .get(idx)
            .map(|l| l.chars().collect())
            .unwrap_or_default()
    }

    /// True when the line is empty or holds only whitespace.
    pub fn is_blank_line(&self, idx: usize) -> bool {
        self.lines
            .get(idx)
            .is_none_or(|l| l.chars().all(char::is_whitespace))
    }

    /// Character under `pos`, or `None` at/after the end of the line.
    pub fn char_at(&self, pos: Position) -> Option<char> {
        self.lines.get(pos.line)?.chars().nth(pos.column)
    }

    /// Nearest valid position: line in `[0, line_count)`, column in `[0, line_len]`.
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.last_line());
        let column = pos.column.min(self.line_len(line));
        Position { line, column }
    }

    /// Insert `ch` at `pos` (column clamped to the line end) and advance `pos`
    /// past it. A `'\n'` splits the line and moves `pos` to the start of the new
    /// line. No-op when `pos.line` is out of range.
    pub fn insert_char(&mut self, pos: &mut Position, ch: char) {
        let Some(line) = self.lines.get_mut(pos.line) else {
            return;
        };
        let column = pos.column.min(line.chars().count());
        let at = byte_index(line, column);
        if ch == '\n' {
            let tail = line.split_off(at);
            self.lines.insert(pos.line + 1, tail);
            pos.line += 1;
            pos.column = 0;
        } else {
            line.insert(at, ch);
            pos.column = column + 1;
        }
    }

    /// Insert a run of text (which may contain line breaks) at `pos`. Returns
    /// the position just past the inserted text.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        if pos.line >= self.lines.len() {
            return pos;
        }
        let start = self.clamp_position(pos);
        let mut segments = text.split('\n');
        let first = segments.next().unwrap_or_default();
        let mut added: Vec<String> = segments.map(str::to_owned).collect();
        let added_len = added.len();
        let line = &mut self.lines[start.line];
        let at = byte_index(line, start.column);
        let tail = line.split_off(at);
        line.push_str(first);
        let Some(last) = added.last_mut() else {
            line.push_str(&tail);
            return Position::new(start.line, start.column + first.chars().count());
        };
        let end = Position::new(start.line + added_len, last.chars().count());
        last.push_str(&tail);
        self.lines.splice(start.line + 1..start.line + 1, added);
        end
    }

    /// Remove the character under `pos`. Returns it, or `None` when `pos` is at
    /// or beyond the end of its line.
    pub fn delete_char(&mut self, pos: Position) -> Option<char> {
        let line = self.lines.get_mut(pos.line)?;
        if pos.column >= line.chars().count() {
            return None;
        }
        let at = byte_index(line, pos.column);
        Some(line.remove(at))
    }

    /// Backspace. Removes the character before `pos` and moves `pos` back one
    /// column; at column 0 of a non-first line, joins the line onto the end of
    /// the previous one. No-op at the very start of the document.
    pub fn delete_backward(&mut self, pos: &mut Position) {
        if pos.line >= self.lines.len() {
            return;
        }
        let column = pos.column.min(self.line_len(pos.line));
        if column == 0 {
            if pos.line == 0 {
                return;
            }
            let current = self.lines.remove(pos.line);
            pos.line -= 1;
            pos.column = self.line_len(pos.line);
            self.lines[pos.line].push_str(&current);
            return;
        }
        let line = &mut self.lines[pos.line];
        let at = byte_index(line, column - 1);
        line.remove(at);
        pos.column = column - 1;
    }

    /// Delete `[from, to)`. Positions are clamped and reordered. Same-line
    /// ranges drop the column span; cross-line ranges join the head of `from`'s
    /// line with the tail of `to`'s line and remove every line after `from` up to
    /// and including `to`. Returns the removed text (line breaks as `'\n'`).
    pub fn delete_range(&mut self, from: Position, to: Position) -> String {
        let (from, to) = self.ordered(from, to);
        let removed = self.substring(from, to);
        if from.line == to.line {
            let line = &mut self.lines[from.line];
            let a = byte_index(line, from.column);
            let b = byte_index(line, to.column);
            line.replace_range(a..b, "");
            return removed;
        }
        let tail = {
            let last = &self.lines[to.line];
            last[byte_index(last, to.column)..].to_owned()
        };
        let head = &mut self.lines[from.line];
        head.truncate(byte_index(head, from.column));
        head.push_str(&tail);
        self.lines.drain(from.line + 1..=to.line);
        removed
    }

    /// Text in `[from, to)` with the same clamping and ordering as `delete_range`.
    pub fn substring(&self, from: Position, to: Position) -> String {
        let (from, to) = self.ordered(from, to);
        if from.line == to.line {
            let line = &self.lines[from.line];
            return line[byte_index(line, from.column)..byte_index(line, to.column)].to_owned();
        }
        let first = &self.lines[from.line];
        let mut out = first[byte_index(first, from.column)..].to_owned();
        for line in &self.lines[from.line + 1..to.line] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        let last = &self.lines[to.line];
        out.push_str(&last[..byte_index(last, to.column)]);
        out
    }

    /// Insert a whole line before index `idx` (clamped to `line_count`, so an
    /// out-of-range index appends).
    pub fn insert_line(&mut self, idx: usize, text: &str) {
        let idx = idx.min(self.lines.len());
        self.lines.insert(idx, text.replace('\n', ""));
    }

    /// Insert `lines` as whole lines before index `idx`, clamped like
    /// `insert_line`. Returns how many lines went in.
    pub fn insert_lines<I, S>(&mut self, idx: usize, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let idx = idx.min(self.lines.len());
        let before = self.lines.len();
        self.lines
            .splice(idx..idx, lines.into_iter().map(|l| l.as_ref().replace('\n', "")));
        self.lines.len() - before
    }

    /// Remove line `idx` and return it. No-op (returns `None`) when the index is
    /// out of range or the document would be left without lines.
    pub fn delete_line(&mut self, idx: usize) -> Option<String> {
        if idx >= self.lines.len() || self.lines.len() == 1 {
            return None;
        }
        Some(self.lines.remove(idx))
    }

    /// Remove lines `first..=last` (`last` clamped) and return them. Removing
    /// every line leaves a single empty line behind.
    pub fn delete_lines(&mut self, first: usize, last: usize) -> Vec<String> {
        let last = last.min(self.last_line());
        if first > last {
            return Vec::new();
        }
        let removed: Vec<String> = self.lines.drain(first..=last).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        removed
    }

    /// Overwrite the contents of line `idx`. No-op when out of range.
    pub fn replace_line(&mut self, idx: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(idx) {
            *line = text.replace('\n', "");
        }
    }

    fn ordered(&self, a: Position, b: Position) -> (Position, Position) {
        let a = self.clamp_position(a);
        let b = self.clamp_position(b);
        if a <= b { (a, b) } else { (b, a) }
    }
}
