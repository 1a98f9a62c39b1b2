//! Register store: unnamed register plus the named, numbered and special slots.
//!
//! Names accepted: `a`-`z` (uppercase appends to the lowercase slot), `0`-`9`,
//! and the symbols `"` (unnamed), `-` (small delete), `*`, `+`, `/`. The `*`
//! and `+` slots are plain storage here; bridging them to a system clipboard
//! belongs to the embedding front end.
//!
//! Writes through any name also overwrite the unnamed register. Operators go
//! through `record_yank` / `record_delete`, which add the numbered-ring
//! behaviour: yanks land in `"0`, line-wise or multi-line deletes shift
//! `"1`..`"9`, smaller deletes go to `"-`.

use std::collections::BTreeMap;
use tracing::trace;

/// The unnamed register.
pub const UNNAMED: char = '"';
/// Most recent yank.
pub const YANK: char = '0';
/// Small (sub-line) deletes.
pub const SMALL_DELETE: char = '-';

/// Register payload, tagged with how it was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterContent {
    /// Character-wise text; may contain `'\n'` when the range spanned lines.
    Characters(String),
    /// Whole lines, without terminators.
    Lines(Vec<String>),
}

impl RegisterContent {
    pub fn is_linewise(&self) -> bool {
        matches!(self, Self::Lines(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Characters(s) => s.is_empty(),
            Self::Lines(lines) => lines.is_empty(),
        }
    }

    /// Flattened text: line-wise content joined with `'\n'`.
    pub fn text(&self) -> String {
        match self {
            Self::Characters(s) => s.clone(),
            Self::Lines(lines) => lines.join("\n"),
        }
    }

    /// True when the content covers more than one line of text.
    pub fn spans_lines(&self) -> bool {
        match self {
            Self::Characters(s) => s.contains('\n'),
            Self::Lines(_) => true,
        }
    }

    /// Concatenate `self` then `other`. Mixed tags coerce to `Lines`, with the
    /// character content becoming one synthetic line on its side.
    pub fn append(self, other: RegisterContent) -> RegisterContent {
        match (self, other) {
            (Self::Characters(mut a), Self::Characters(b)) => {
                a.push_str(&b);
                Self::Characters(a)
            }
            (Self::Lines(mut a), Self::Lines(b)) => {
                a.extend(b);
                Self::Lines(a)
            }
            (Self::Characters(a), Self::Lines(b)) => {
                let mut lines = Vec::with_capacity(b.len() + 1);
                lines.push(a);
                lines.extend(b);
                Self::Lines(lines)
            }
            (Self::Lines(mut a), Self::Characters(b)) => {
                a.push(b);
                Self::Lines(a)
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Characters(_) => "characters",
            Self::Lines(_) => "lines",
        }
    }
}

/// Whether `name` is an accepted register name (either case for letters).
pub fn is_valid_name(name: char) -> bool {
    name.is_ascii_alphanumeric() || matches!(name, '"' | '-' | '*' | '+' | '/')
}

#[derive(Debug, Default, Clone)]
pub struct Registers {
    unnamed: Option<RegisterContent>,
    slots: BTreeMap<char, RegisterContent>,
}

impl Registers {
    /// Numbered ring size (`"1`..`"9`).
    pub const RING: usize = 9;

    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` under `name`. Uppercase letters append to their
    /// lowercase register. Returns `false` (and stores nothing) for names
    /// outside the register alphabet.
    pub fn set(&mut self, name: char, content: RegisterContent) -> bool {
        if !is_valid_name(name) {
            trace!(target: "state.registers", ?name, "register_name_rejected");
            return false;
        }
        if name.is_ascii_uppercase() {
            return self.append(name, content);
        }
        trace!(target: "state.registers", ?name, kind = content.kind(), "register_set");
        if name != UNNAMED {
            self.slots.insert(name, content.clone());
        }
        self.unnamed = Some(content);
        true
    }

    /// Append `content` to register `name` following the tag coercion rules
    /// of `RegisterContent::append`. An empty register simply takes `content`.
    pub fn append(&mut self, name: char, content: RegisterContent) -> bool {
        if !is_valid_name(name) {
            trace!(target: "state.registers", ?name, "register_name_rejected");
            return false;
        }
        let key = name.to_ascii_lowercase();
        let merged = match self.lookup(key).cloned() {
            Some(existing) => existing.append(content),
            None => content,
        };
        trace!(target: "state.registers", name = ?key, kind = merged.kind(), "register_append");
        if key != UNNAMED {
            self.slots.insert(key, merged.clone());
        }
        self.unnamed = Some(merged);
        true
    }

    /// Content of register `name` (letters case-insensitive).
    pub fn get(&self, name: char) -> Option<&RegisterContent> {
        if !is_valid_name(name) {
            return None;
        }
        self.lookup(name.to_ascii_lowercase())
    }

    pub fn unnamed(&self) -> Option<&RegisterContent> {
        self.unnamed.as_ref()
    }

    fn lookup(&self, key: char) -> Option<&RegisterContent> {
        if key == UNNAMED {
            self.unnamed.as_ref()
        } else {
            self.slots.get(&key)
        }
    }

    /// Record a yank. With an explicit target only that register (and the
    /// unnamed one) change; otherwise the yank also lands in `"0`.
    pub fn record_yank(&mut self, target: Option<char>, content: RegisterContent) {
        match target.filter(|&t| t != UNNAMED) {
            Some(name) => {
                self.set(name, content);
            }
            None => {
                self.set(YANK, content);
            }
        }
    }

    /// Record a delete or change. Without an explicit target, line-wise or
    /// multi-line content shifts the numbered ring and lands in `"1`; anything
    /// smaller goes to `"-`.
    pub fn record_delete(&mut self, target: Option<char>, content: RegisterContent) {
        if let Some(name) = target.filter(|&t| t != UNNAMED) {
            self.set(name, content);
            return;
        }
        if content.spans_lines() {
            self.rotate_numbered();
            self.set('1', content);
        } else {
            self.set(SMALL_DELETE, content);
        }
    }

    /// Shift `"1`..`"8` up by one, discarding `"9`.
    fn rotate_numbered(&mut self) {
        for n in (1..Self::RING).rev() {
            let from = char::from(b'0' + n as u8);
            let to = char::from(b'0' + n as u8 + 1);
            match self.slots.remove(&from) {
                Some(content) => {
                    self.slots.insert(to, content);
                }
                None => {
                    self.slots.remove(&to);
                }
            }
        }
        trace!(target: "state.registers", "numbered_ring_rotated");
    }

    /// Numbered ring contents `"1`..`"9`, newest first (missing slots skipped).
    pub fn numbered(&self) -> Vec<&RegisterContent> {
        (1..=Self::RING)
            .filter_map(|n| self.slots.get(&char::from(b'0' + n as u8)))
            .collect()
    }

    /// Non-empty letter registers, for listings.
    pub fn named_snapshot(&self) -> Vec<(char, &RegisterContent)> {
        self.slots
            .iter()
            .filter(|(k, _)| k.is_ascii_lowercase())
            .map(|(k, v)| (*k, v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(s: &str) -> RegisterContent {
        RegisterContent::Characters(s.to_string())
    }

    fn lines(ls: &[&str]) -> RegisterContent {
        RegisterContent::Lines(ls.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn set_writes_named_and_unnamed() {
        let mut r = Registers::new();
        assert!(r.set('a', chars("foo")));
        assert_eq!(r.get('a'), Some(&chars("foo")));
        assert_eq!(r.get('A'), Some(&chars("foo")));
        assert_eq!(r.unnamed(), Some(&chars("foo")));
        assert_eq!(r.get('"'), Some(&chars("foo")));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut r = Registers::new();
        assert!(!r.set('!', chars("x")));
        assert!(!r.set('é', chars("x")));
        assert_eq!(r.unnamed(), None);
        assert_eq!(r.get('!'), None);
        for name in ['"', '-', '*', '+', '/', '5', 'q'] {
            assert!(r.set(name, chars("ok")), "{name}");
        }
    }

    #[test]
    fn uppercase_appends_with_coercion() {
        let mut r = Registers::new();
        r.set('a', chars("one"));
        r.set('A', chars(" two"));
        assert_eq!(r.get('a'), Some(&chars("one two")));
        r.set('A', lines(&["three"]));
        assert_eq!(r.get('a'), Some(&lines(&["one two", "three"])));
        r.append('a', chars("four"));
        assert_eq!(r.get('a'), Some(&lines(&["one two", "three", "four"])));
        assert_eq!(r.unnamed(), r.get('a'));
    }

    #[test]
    fn append_character_content_before_lines_prepends_synthetic_line() {
        let merged = chars("head").append(lines(&["a", "b"]));
        assert_eq!(merged, lines(&["head", "a", "b"]));
    }

    #[test]
    fn append_to_empty_register_takes_content() {
        let mut r = Registers::new();
        r.append('z', lines(&["x"]));
        assert_eq!(r.get('z'), Some(&lines(&["x"])));
    }

    #[test]
    fn yank_goes_to_zero_unless_targeted() {
        let mut r = Registers::new();
        r.record_yank(None, chars("y1"));
        assert_eq!(r.get('0'), Some(&chars("y1")));
        r.record_yank(Some('b'), chars("y2"));
        assert_eq!(r.get('0'), Some(&chars("y1")));
        assert_eq!(r.get('b'), Some(&chars("y2")));
        assert_eq!(r.unnamed(), Some(&chars("y2")));
    }

    #[test]
    fn deletes_rotate_ring_or_fill_small_delete() {
        let mut r = Registers::new();
        r.record_delete(None, chars("word"));
        assert_eq!(r.get('-'), Some(&chars("word")));
        assert!(r.numbered().is_empty());
        for i in 0..11 {
            r.record_delete(None, lines(&[&format!("line{i}")]));
        }
        assert_eq!(r.get('1'), Some(&lines(&["line10"])));
        assert_eq!(r.get('9'), Some(&lines(&["line2"])));
        assert_eq!(r.numbered().len(), Registers::RING);
        r.record_delete(None, chars("a\nb"));
        assert_eq!(r.get('1'), Some(&chars("a\nb")));
        assert_eq!(r.get('2'), Some(&lines(&["line10"])));
    }

    #[test]
    fn named_snapshot_lists_letters_only() {
        let mut r = Registers::new();
        r.set('c', chars("c"));
        r.set('a', chars("a"));
        r.record_yank(None, chars("zero"));
        let names: Vec<char> = r.named_snapshot().into_iter().map(|(c, _)| c).collect();
        assert_eq!(names, vec!['a', 'c']);
    }
}
