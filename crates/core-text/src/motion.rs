//! Cursor motion engine.
//!
//! Every function here is pure: it takes a `Buffer`, a starting `Position` and
//! a repeat count, and returns the target position without touching any editor
//! state. The same functions serve plain cursor movement and operator range
//! resolution. Counts of zero behave like one.
//!
//! Returned positions are always valid buffer coordinates (`clamp_position`
//! would leave them unchanged). Word motions may return the one-past-the-end
//! column of the last line when they run out of text; Normal mode callers pull
//! that back with `normalize_normal_mode_position`.

use crate::{Buffer, CharClass, Position, WordKind, classify};

/// Highest column the cursor may occupy on `line`. Insert-like contexts may
/// sit one past the last character; Normal mode rests on a real character.
pub fn max_column(buf: &Buffer, line: usize, past_end: bool) -> usize {
    let len = buf.line_len(line);
    if past_end { len } else { len.saturating_sub(1) }
}

/// Clamp a position for Normal mode: valid line, and a column on a real
/// character (column 0 for empty lines).
pub fn normalize_normal_mode_position(buf: &Buffer, pos: Position) -> Position {
    let pos = buf.clamp_position(pos);
    Position::new(pos.line, pos.column.min(max_column(buf, pos.line, false)))
}

pub fn left(buf: &Buffer, pos: Position, count: usize) -> Position {
    let pos = buf.clamp_position(pos);
    Position::new(pos.line, pos.column.saturating_sub(count.max(1)))
}

pub fn right(buf: &Buffer, pos: Position, count: usize, past_end: bool) -> Position {
    let pos = buf.clamp_position(pos);
    let limit = max_column(buf, pos.line, past_end);
    Position::new(pos.line, pos.column.saturating_add(count.max(1)).min(limit))
}

/// Move up `count` lines. The column comes from `preferred` (the sticky
/// column), clamped to the destination line.
pub fn up(buf: &Buffer, pos: Position, count: usize, preferred: usize, past_end: bool) -> Position {
    let line = pos.line.min(buf.last_line()).saturating_sub(count.max(1));
    Position::new(line, preferred.min(max_column(buf, line, past_end)))
}

pub fn down(buf: &Buffer, pos: Position, count: usize, preferred: usize, past_end: bool) -> Position {
    let line = pos.line.saturating_add(count.max(1)).min(buf.last_line());
    Position::new(line, preferred.min(max_column(buf, line, past_end)))
}

pub fn line_start(buf: &Buffer, pos: Position) -> Position {
    Position::new(pos.line.min(buf.last_line()), 0)
}

/// First non-blank column of the line; the last column for all-blank lines.
pub fn first_non_whitespace(buf: &Buffer, pos: Position) -> Position {
    let line = pos.line.min(buf.last_line());
    let chars = buf.line_chars(line);
    let column = chars
        .iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(chars.len().saturating_sub(1));
    Position::new(line, column)
}

/// Last character of the line (`max(0, len - 1)`).
pub fn line_end(buf: &Buffer, pos: Position) -> Position {
    let line = pos.line.min(buf.last_line());
    Position::new(line, buf.line_len(line).saturating_sub(1))
}

/// Zero-based line jump, clamped into the document, column 0.
pub fn go_to_line(buf: &Buffer, line: usize) -> Position {
    Position::new(line.min(buf.last_line()), 0)
}

/// Start of the `count`-th next word. Runs that leave the line continue on the
/// following lines after their leading whitespace; an empty line counts as a
/// word. Past the last word the result is the end of the last line.
pub fn next_word(buf: &Buffer, pos: Position, count: usize, kind: WordKind) -> Position {
    repeat(buf, pos, count, |lines, p| next_word_once(lines, p, kind))
}

/// Start of the `count`-th previous word, crossing line boundaries backwards.
pub fn previous_word(buf: &Buffer, pos: Position, count: usize, kind: WordKind) -> Position {
    repeat(buf, pos, count, |lines, p| previous_word_once(lines, p, kind))
}

/// Last character of the `count`-th word end after the cursor. Blank lines are
/// skipped.
pub fn end_of_word(buf: &Buffer, pos: Position, count: usize, kind: WordKind) -> Position {
    repeat(buf, pos, count, |lines, p| end_of_word_once(lines, p, kind))
}

/// Characters of the line a word scan is on, re-read only when the scan
/// moves to another line.
struct LineCache<'a> {
    buf: &'a Buffer,
    line: Option<usize>,
    chars: Vec<char>,
}

impl<'a> LineCache<'a> {
    fn new(buf: &'a Buffer) -> Self {
        Self {
            buf,
            line: None,
            chars: Vec::new(),
        }
    }

    fn get(&mut self, line: usize) -> &[char] {
        if self.line != Some(line) {
            self.chars = self.buf.line_chars(line);
            self.line = Some(line);
        }
        &self.chars
    }
}

fn repeat(
    buf: &Buffer,
    pos: Position,
    count: usize,
    mut step: impl FnMut(&mut LineCache<'_>, Position) -> Position,
) -> Position {
    let mut lines = LineCache::new(buf);
    let mut current = buf.clamp_position(pos);
    for _ in 0..count.max(1) {
        let next = step(&mut lines, current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn next_word_once(lines: &mut LineCache<'_>, pos: Position, kind: WordKind) -> Position {
    let last = lines.buf.last_line();
    let mut line = pos.line;
    let mut chars = lines.get(line);
    let mut col = pos.column;
    if col < chars.len() {
        let class = classify(chars[col], kind);
        if class != CharClass::Whitespace {
            while col < chars.len() && classify(chars[col], kind) == class {
                col += 1;
            }
        }
    }
    loop {
        while col < chars.len() && chars[col].is_whitespace() {
            col += 1;
        }
        if col < chars.len() {
            return Position::new(line, col);
        }
        if line >= last {
            return Position::new(line, chars.len());
        }
        line += 1;
        chars = lines.get(line);
        col = 0;
        if chars.is_empty() {
            return Position::new(line, 0);
        }
    }
}

fn previous_word_once(lines: &mut LineCache<'_>, pos: Position, kind: WordKind) -> Position {
    let mut line = pos.line;
    let mut chars = lines.get(line);
    let mut col = pos.column.min(chars.len());
    if col > 0 {
        col -= 1;
    } else {
        if line == 0 {
            return Position::origin();
        }
        line -= 1;
        chars = lines.get(line);
        if chars.is_empty() {
            return Position::new(line, 0);
        }
        col = chars.len() - 1;
    }
    while chars[col].is_whitespace() {
        if col > 0 {
            col -= 1;
            continue;
        }
        if line == 0 {
            return Position::origin();
        }
        line -= 1;
        chars = lines.get(line);
        if chars.is_empty() {
            return Position::new(line, 0);
        }
        col = chars.len() - 1;
    }
    let class = classify(chars[col], kind);
    while col > 0 && classify(chars[col - 1], kind) == class {
        col -= 1;
    }
    Position::new(line, col)
}

fn end_of_word_once(lines: &mut LineCache<'_>, pos: Position, kind: WordKind) -> Position {
    let last = lines.buf.last_line();
    let mut line = pos.line;
    let mut chars = lines.get(line);
    let mut col = pos.column + 1;
    loop {
        while col < chars.len() && chars[col].is_whitespace() {
            col += 1;
        }
        if col < chars.len() {
            break;
        }
        if line >= last {
            return pos;
        }
        line += 1;
        chars = lines.get(line);
        col = 0;
    }
    let class = classify(chars[col], kind);
    while col + 1 < chars.len() && classify(chars[col + 1], kind) == class {
        col += 1;
    }
    Position::new(line, col)
}

/// Position of the `count`-th `target` after the cursor, scanning the rest of
/// the cursor line and then the following lines.
pub fn find_char_forward(buf: &Buffer, pos: Position, target: char, count: usize) -> Option<Position> {
    let mut remaining = count.max(1);
    let mut start = pos.column.saturating_add(1);
    for line in pos.line..buf.line_count() {
        for (col, &c) in buf.line_chars(line).iter().enumerate().skip(start) {
            if c == target {
                remaining -= 1;
                if remaining == 0 {
                    return Some(Position::new(line, col));
                }
            }
        }
        start = 0;
    }
    None
}

/// Position of the `count`-th `target` before the cursor, scanning backwards
/// through the cursor line and then the preceding lines.
pub fn find_char_backward(buf: &Buffer, pos: Position, target: char, count: usize) -> Option<Position> {
    if pos.line >= buf.line_count() {
        return None;
    }
    let mut remaining = count.max(1);
    let mut end = pos.column;
    for line in (0..=pos.line).rev() {
        let chars = buf.line_chars(line);
        for col in (0..end.min(chars.len())).rev() {
            if chars[col] == target {
                remaining -= 1;
                if remaining == 0 {
                    return Some(Position::new(line, col));
                }
            }
        }
        end = usize::MAX;
    }
    None
}

/// `t`: one column before the found character. `None` if the target is the
/// first character of its line.
pub fn till_char_forward(buf: &Buffer, pos: Position, target: char, count: usize) -> Option<Position> {
    find_char_forward(buf, pos, target, count)
        .filter(|p| p.column > 0)
        .map(|p| Position::new(p.line, p.column - 1))
}

/// `T`: one column after the found character. `None` if the target is the
/// last character of its line.
pub fn till_char_backward(buf: &Buffer, pos: Position, target: char, count: usize) -> Option<Position> {
    find_char_backward(buf, pos, target, count)
        .filter(|p| p.column + 1 < buf.line_len(p.line))
        .map(|p| Position::new(p.line, p.column + 1))
}

/// `}`: per repetition skip non-blank lines, then blank lines, landing on the
/// first line of the next paragraph (or the last line).
pub fn next_paragraph(buf: &Buffer, pos: Position, preferred: usize, count: usize) -> Position {
    let last = buf.last_line();
    let mut line = pos.line.min(last);
    for _ in 0..count.max(1) {
        let start = line;
        while line < last && !buf.is_blank_line(line) {
            line += 1;
        }
        while line < last && buf.is_blank_line(line) {
            line += 1;
        }
        if line == start {
            break;
        }
    }
    Position::new(line, preferred.min(max_column(buf, line, false)))
}

/// `{`: per repetition skip blank lines, then non-blank lines, stopping on
/// the blank line above the paragraph (or the first line).
pub fn previous_paragraph(buf: &Buffer, pos: Position, preferred: usize, count: usize) -> Position {
    let mut line = pos.line.min(buf.last_line());
    for _ in 0..count.max(1) {
        let start = line;
        while line > 0 && buf.is_blank_line(line) {
            line -= 1;
        }
        while line > 0 && !buf.is_blank_line(line) {
            line -= 1;
        }
        if line == start {
            break;
        }
    }
    Position::new(line, preferred.min(max_column(buf, line, false)))
}

/// Bracket pair for `c` as `(open, close, c_is_open)`.
pub fn bracket_pair(c: char) -> Option<(char, char, bool)> {
    match c {
        '(' => Some(('(', ')', true)),
        ')' => Some(('(', ')', false)),
        '[' => Some(('[', ']', true)),
        ']' => Some(('[', ']', false)),
        '{' => Some(('{', '}', true)),
        '}' => Some(('{', '}', false)),
        _ => None,
    }
}

/// `%`: partner of the bracket under `pos`, found with a depth counter over
/// as many lines as needed. `None` when `pos` is not on a bracket or the
/// bracket is unbalanced.
pub fn matching_bracket(buf: &Buffer, pos: Position) -> Option<Position> {
    let (open, close, forward) = bracket_pair(buf.char_at(pos)?)?;
    let mut depth = 0usize;
    if forward {
        let mut start = pos.column;
        for line in pos.line..buf.line_count() {
            for (col, &c) in buf.line_chars(line).iter().enumerate().skip(start) {
                if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some(Position::new(line, col));
                    }
                }
            }
            start = 0;
        }
    } else {
        let mut end = pos.column + 1;
        for line in (0..=pos.line).rev() {
            let chars = buf.line_chars(line);
            for col in (0..end.min(chars.len())).rev() {
                if chars[col] == close {
                    depth += 1;
                } else if chars[col] == open {
                    depth -= 1;
                    if depth == 0 {
                        return Some(Position::new(line, col));
                    }
                }
            }
            end = usize::MAX;
        }
    }
    None
}
