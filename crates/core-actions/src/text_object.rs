//! Text object resolution (`iw`, `aw`, `i"`, `a(`, ...).
//!
//! Every resolver is pure and single-line: it looks only at the cursor line
//! and returns a half-open column range `[start, end)` on that line, or `None`
//! when no object surrounds the cursor. Operators apply the range as
//! character-wise text.
//!
//! Rules:
//! * Word objects take the run of same-class characters under the cursor
//!   (word characters, or a punctuation run). `aw` adds the trailing
//!   whitespace, falling back to the leading whitespace at the end of a line.
//!   A cursor on whitespace or on an empty line resolves to nothing.
//! * Quote objects decide whether a quote under the cursor opens or closes a
//!   string by the parity of the quotes before it on the line.
//! * Bracket objects search outward with a depth counter, so a cursor inside
//!   a nested pair selects the innermost enclosing pair.

use core_text::{Buffer, CharClass, Position, WordKind, classify};

/// Inner (`i`) versus around (`a`) selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectScope {
    Inner,
    Around,
}

/// Half-open range on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Resolve the object named by `object` (the key typed after `i`/`a`).
/// Accepted keys: `w` `W`, the quotes `"` `'` `` ` ``, and the brackets
/// `(` `)` `b` `[` `]` `{` `}` `B` `<` `>`.
pub fn resolve(buf: &Buffer, pos: Position, scope: ObjectScope, object: char) -> Option<TextRange> {
    match object {
        'w' => word(buf, pos, scope, WordKind::Word),
        'W' => word(buf, pos, scope, WordKind::BigWord),
        '"' | '\'' | '`' => quotes(buf, pos, scope, object),
        other => {
            let (open, close) = delimiter_pair(other)?;
            brackets(buf, pos, scope, open, close)
        }
    }
}

fn delimiter_pair(c: char) -> Option<(char, char)> {
    match c {
        '(' | ')' | 'b' => Some(('(', ')')),
        '[' | ']' => Some(('[', ']')),
        '{' | '}' | 'B' => Some(('{', '}')),
        '<' | '>' => Some(('<', '>')),
        _ => None,
    }
}

pub fn inner_word(buf: &Buffer, pos: Position) -> Option<TextRange> {
    word(buf, pos, ObjectScope::Inner, WordKind::Word)
}

pub fn a_word(buf: &Buffer, pos: Position) -> Option<TextRange> {
    word(buf, pos, ObjectScope::Around, WordKind::Word)
}

fn word(buf: &Buffer, pos: Position, scope: ObjectScope, kind: WordKind) -> Option<TextRange> {
    let chars = buf.line_chars(pos.line);
    let col = pos.column;
    let class = classify(*chars.get(col)?, kind);
    if class == CharClass::Whitespace {
        return None;
    }
    let mut start = col;
    while start > 0 && classify(chars[start - 1], kind) == class {
        start -= 1;
    }
    let mut end = col + 1;
    while end < chars.len() && classify(chars[end], kind) == class {
        end += 1;
    }
    if scope == ObjectScope::Around {
        let mut trailing = end;
        while trailing < chars.len() && chars[trailing].is_whitespace() {
            trailing += 1;
        }
        if trailing > end {
            end = trailing;
        } else {
            while start > 0 && chars[start - 1].is_whitespace() {
                start -= 1;
            }
        }
    }
    Some(TextRange::on_line(pos.line, start, end))
}

pub fn inner_quotes(buf: &Buffer, pos: Position, delim: char) -> Option<TextRange> {
    quotes(buf, pos, ObjectScope::Inner, delim)
}

pub fn a_quotes(buf: &Buffer, pos: Position, delim: char) -> Option<TextRange> {
    quotes(buf, pos, ObjectScope::Around, delim)
}

fn quotes(buf: &Buffer, pos: Position, scope: ObjectScope, delim: char) -> Option<TextRange> {
    let chars = buf.line_chars(pos.line);
    let col = pos.column;
    if col >= chars.len() {
        return None;
    }
    let (open, close) = if chars[col] == delim {
        let before = chars[..col].iter().filter(|&&c| c == delim).count();
        if before % 2 == 0 {
            let close = (col + 1..chars.len()).find(|&i| chars[i] == delim)?;
            (col, close)
        } else {
            let open = (0..col).rev().find(|&i| chars[i] == delim)?;
            (open, col)
        }
    } else {
        let open = (0..col).rev().find(|&i| chars[i] == delim)?;
        let close = (col + 1..chars.len()).find(|&i| chars[i] == delim)?;
        (open, close)
    };
    Some(match scope {
        ObjectScope::Inner => TextRange::on_line(pos.line, open + 1, close),
        ObjectScope::Around => TextRange::on_line(pos.line, open, close + 1),
    })
}

pub fn inner_brackets(buf: &Buffer, pos: Position, open: char) -> Option<TextRange> {
    let (open, close) = delimiter_pair(open)?;
    brackets(buf, pos, ObjectScope::Inner, open, close)
}

pub fn a_brackets(buf: &Buffer, pos: Position, open: char) -> Option<TextRange> {
    let (open, close) = delimiter_pair(open)?;
    brackets(buf, pos, ObjectScope::Around, open, close)
}

fn brackets(
    buf: &Buffer,
    pos: Position,
    scope: ObjectScope,
    open: char,
    close: char,
) -> Option<TextRange> {
    let chars = buf.line_chars(pos.line);
    let col = pos.column;
    if col >= chars.len() {
        return None;
    }
    let open_col = if chars[col] == open {
        col
    } else {
        // A close bracket under the cursor belongs to the pair we are after.
        let mut depth = 0usize;
        let mut found = None;
        for i in (0..col).rev() {
            if chars[i] == close {
                depth += 1;
            } else if chars[i] == open {
                if depth == 0 {
                    found = Some(i);
                    break;
                }
                depth -= 1;
            }
        }
        found?
    };
    let mut depth = 0usize;
    let mut close_col = None;
    for (i, &c) in chars.iter().enumerate().skip(open_col + 1) {
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                close_col = Some(i);
                break;
            }
            depth -= 1;
        }
    }
    let close_col = close_col?;
    Some(match scope {
        ObjectScope::Inner => TextRange::on_line(pos.line, open_col + 1, close_col),
        ObjectScope::Around => TextRange::on_line(pos.line, open_col, close_col + 1),
    })
}
