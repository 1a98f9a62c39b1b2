//! Input boundary of the editing core.
//!
//! The dispatcher consumes one code point per keystroke. Special keys that have
//! no code point of their own (arrows, Home/End, Delete) are mapped onto fixed
//! sentinels in the Unicode private use area before they reach the core, and
//! control keys use their ASCII control codes. `KeyCode` is the typed view of
//! that alphabet; `parse_keys` turns a script such as `"3dw<Esc>:12<CR>"` into
//! the code-point stream.

use std::fmt;
use thiserror::Error;

/// Escape (0x1b).
pub const ESC: char = '\u{1b}';
/// Carriage return; `'\n'` is accepted as Enter as well.
pub const ENTER: char = '\r';
pub const TAB: char = '\t';
/// DEL (0x7f), sent by most terminals for the Backspace key.
pub const BACKSPACE: char = '\u{7f}';
pub const CTRL_R: char = '\u{12}';

pub const UP: char = '\u{E000}';
pub const DOWN: char = '\u{E001}';
pub const LEFT: char = '\u{E002}';
pub const RIGHT: char = '\u{E003}';
pub const DELETE: char = '\u{E004}';
pub const HOME: char = '\u{E005}';
pub const END: char = '\u{E006}';

/// Typed key derived from a single input code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    /// Control chord with an ASCII letter (`Ctrl` + lowercase letter).
    Ctrl(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Delete,
    Home,
    End,
}

impl KeyCode {
    /// Classify an input code point.
    pub fn from_code_point(c: char) -> Self {
        match c {
            ESC => Self::Esc,
            '\r' | '\n' => Self::Enter,
            TAB => Self::Tab,
            BACKSPACE | '\u{8}' => Self::Backspace,
            UP => Self::Up,
            DOWN => Self::Down,
            LEFT => Self::Left,
            RIGHT => Self::Right,
            DELETE => Self::Delete,
            HOME => Self::Home,
            END => Self::End,
            '\u{1}'..='\u{1a}' => Self::Ctrl((b'a' + (c as u8 - 1)) as char),
            other => Self::Char(other),
        }
    }

    /// Inverse of `from_code_point`.
    pub fn code_point(self) -> char {
        match self {
            Self::Char(c) => c,
            Self::Ctrl(c) => {
                let lower = c.to_ascii_lowercase();
                if lower.is_ascii_lowercase() {
                    ((lower as u8 - b'a') + 1) as char
                } else {
                    lower
                }
            }
            Self::Enter => ENTER,
            Self::Esc => ESC,
            Self::Backspace => BACKSPACE,
            Self::Tab => TAB,
            Self::Up => UP,
            Self::Down => DOWN,
            Self::Left => LEFT,
            Self::Right => RIGHT,
            Self::Delete => DELETE,
            Self::Home => HOME,
            Self::End => END,
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char('<') => write!(f, "<lt>"),
            Self::Char(' ') => write!(f, "<Space>"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Ctrl(c) => write!(f, "<C-{c}>"),
            Self::Enter => write!(f, "<CR>"),
            Self::Esc => write!(f, "<Esc>"),
            Self::Backspace => write!(f, "<BS>"),
            Self::Tab => write!(f, "<Tab>"),
            Self::Up => write!(f, "<Up>"),
            Self::Down => write!(f, "<Down>"),
            Self::Left => write!(f, "<Left>"),
            Self::Right => write!(f, "<Right>"),
            Self::Delete => write!(f, "<Del>"),
            Self::Home => write!(f, "<Home>"),
            Self::End => write!(f, "<End>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyNotationError {
    #[error("unterminated key name starting at offset {offset}")]
    Unterminated { offset: usize },
    #[error("unknown key name <{name}>")]
    UnknownKey { name: String },
}

fn named_key(name: &str) -> Option<KeyCode> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "esc" | "escape" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "del" | "delete" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        _ => {
            let letter = lower.strip_prefix("c-")?;
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_lowercase() => KeyCode::Ctrl(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

/// Parse vi key notation into input code points. Literal characters pass
/// through; `<Name>` sequences map to their sentinel (`<Esc>`, `<CR>`, `<BS>`,
/// `<Tab>`, `<Space>`, `<lt>`, arrows, `<Del>`, `<Home>`, `<End>`, `<C-x>`).
/// Names are case-insensitive. A `<` with no closing `>` before the next `<` or
/// the end is an error.
pub fn parse_keys(script: &str) -> Result<Vec<char>, KeyNotationError> {
    let mut out = Vec::with_capacity(script.len());
    let mut rest = script;
    let mut offset = 0usize;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let body = &rest[1..];
            let close = body.find('>');
            let next_open = body.find('<');
            match close {
                Some(end) if next_open.is_none_or(|o| o > end) => {
                    let name = &body[..end];
                    let key = named_key(name).ok_or_else(|| KeyNotationError::UnknownKey {
                        name: name.to_string(),
                    })?;
                    out.push(key.code_point());
                    let consumed = end + 2;
                    rest = &rest[consumed..];
                    offset += consumed;
                }
                _ => return Err(KeyNotationError::Unterminated { offset }),
            }
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
            offset += c.len_utf8();
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn literal_and_named_keys() {
        let keys = parse_keys("ihi<Esc>:3<CR>").unwrap();
        assert_eq!(keys, vec!['i', 'h', 'i', ESC, ':', '3', ENTER]);
    }

    #[test]
    fn names_are_case_insensitive_and_ctrl_maps_to_control_code() {
        let keys = parse_keys("<ESC>u<c-r><C-R><lt><Space>").unwrap();
        assert_eq!(keys, vec![ESC, 'u', CTRL_R, CTRL_R, '<', ' ']);
    }

    #[test]
    fn arrows_use_sentinels() {
        let keys = parse_keys("<Up><Down><Left><Right><Del>").unwrap();
        assert_eq!(keys, vec![UP, DOWN, LEFT, RIGHT, DELETE]);
    }

    #[test]
    fn errors() {
        assert_eq!(
            parse_keys("ab<Esc"),
            Err(KeyNotationError::Unterminated { offset: 2 })
        );
        assert_eq!(
            parse_keys("<Nope>"),
            Err(KeyNotationError::UnknownKey {
                name: "Nope".into()
            })
        );
        assert_eq!(
            parse_keys("a<b<CR>"),
            Err(KeyNotationError::Unterminated { offset: 1 })
        );
    }

    #[test]
    fn code_point_round_trip() {
        for key in [
            KeyCode::Char('x'),
            KeyCode::Ctrl('r'),
            KeyCode::Enter,
            KeyCode::Esc,
            KeyCode::Backspace,
            KeyCode::Tab,
            KeyCode::Up,
            KeyCode::Delete,
            KeyCode::End,
        ] {
            assert_eq!(KeyCode::from_code_point(key.code_point()), key);
        }
        assert_eq!(KeyCode::from_code_point('\n'), KeyCode::Enter);
        assert_eq!(KeyCode::Ctrl('r').to_string(), "<C-r>");
    }
}
