//! Character-wise Visual mode.
//!
//! The selection runs from the anchor (where `v` was pressed) to the cursor,
//! inclusive at both ends, in either order. Motions move the cursor only.
//! An operator key applies to the selection and returns to Normal mode
//! (Insert mode for `c`). A selection whose last character is the end of a
//! line also takes that line break, so `vd` on an empty line joins it with
//! the next one.

use super::{DispatchResult, ModeState, motion};
use crate::operator::{self, OperatorKind, OperatorOutcome};
use crate::span_resolver::{self, MotionKind, Span, SpanKind};
use core_events::{DELETE, ESC};
use core_state::{EditorState, FindKind, FindMemory, register};
use core_text::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Prefix {
    #[default]
    None,
    G,
    Find(FindKind, bool),
    Register,
}

#[derive(Debug, Clone)]
pub struct VisualState {
    anchor: Position,
    count: Option<usize>,
    prefix: Prefix,
    register: Option<char>,
}

impl VisualState {
    pub fn new(anchor: Position) -> Self {
        Self {
            anchor,
            count: None,
            prefix: Prefix::None,
            register: None,
        }
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    /// Ordered `(start, end)` of the selection, both inclusive.
    pub fn selection(&self, cursor: Position) -> (Position, Position) {
        if self.anchor <= cursor {
            (self.anchor, cursor)
        } else {
            (cursor, self.anchor)
        }
    }

    pub fn echo(&self) -> String {
        let mut out = String::new();
        if let Some(r) = self.register {
            out.push('"');
            out.push(r);
        }
        if let Some(n) = self.count {
            out.push_str(&n.to_string());
        }
        match self.prefix {
            Prefix::None => {}
            Prefix::G => out.push('g'),
            Prefix::Find(FindKind::Find, forward) => out.push(if forward { 'f' } else { 'F' }),
            Prefix::Find(FindKind::Till, forward) => out.push(if forward { 't' } else { 'T' }),
            Prefix::Register => out.push('"'),
        }
        out
    }

    fn clear_pending(&mut self) {
        self.count = None;
        self.prefix = Prefix::None;
        self.register = None;
    }
}

pub(crate) fn handle(state: &mut EditorState, mode: &mut ModeState, key: char) -> DispatchResult {
    let ModeState::Visual(vs) = mode else {
        return DispatchResult::clean();
    };
    let has_pending = vs.prefix != Prefix::None || vs.count.is_some() || vs.register.is_some();
    if key == ESC && has_pending {
        vs.clear_pending();
        return DispatchResult::dirty();
    }
    if key == ESC || (key == 'v' && vs.prefix == Prefix::None) {
        *mode = ModeState::normal();
        state.clamp_cursor_normal();
        return DispatchResult::dirty();
    }
    match vs.prefix {
        Prefix::None => {}
        Prefix::G => {
            vs.prefix = Prefix::None;
            if key == 'g' {
                let count = vs.count.take();
                return DispatchResult::moved(motion::apply(state, MotionKind::FirstLine, count, false));
            }
            return match OperatorKind::from_g_key(key) {
                Some(op) => apply_to_selection(state, mode, op),
                None => {
                    vs.clear_pending();
                    DispatchResult::dirty()
                }
            };
        }
        Prefix::Find(kind, forward) => {
            let find = FindMemory {
                kind,
                forward,
                target: key,
            };
            state.last_find = Some(find);
            let count = vs.count.take();
            vs.prefix = Prefix::None;
            return DispatchResult::moved(motion::apply(state, MotionKind::Find(find), count, false));
        }
        Prefix::Register => {
            vs.prefix = Prefix::None;
            if register::is_valid_name(key) {
                vs.register = Some(key);
            }
            return DispatchResult::dirty();
        }
    }
    if let Some(digit) = key.to_digit(10)
        && (digit != 0 || vs.count.is_some())
    {
        let n = vs.count.unwrap_or(0);
        vs.count = Some(n.saturating_mul(10).saturating_add(digit as usize));
        return DispatchResult::dirty();
    }
    if let Some((kind, forward)) = span_resolver::find_key(key) {
        vs.prefix = Prefix::Find(kind, forward);
        return DispatchResult::dirty();
    }
    let count = vs.count.take();
    match key {
        'g' => {
            vs.count = count;
            vs.prefix = Prefix::G;
            DispatchResult::dirty()
        }
        '"' => {
            vs.prefix = Prefix::Register;
            DispatchResult::dirty()
        }
        'o' => {
            let cursor = state.cursor.position;
            state.cursor.set(vs.anchor);
            vs.anchor = cursor;
            DispatchResult::dirty()
        }
        ';' | ',' => match span_resolver::repeat_find(state.last_find, key == ',') {
            Some(kind) => DispatchResult::moved(motion::apply(state, kind, count, false)),
            None => DispatchResult::clean(),
        },
        _ => {
            if let Some(kind) = MotionKind::from_key(key) {
                return DispatchResult::moved(motion::apply(state, kind, count, false));
            }
            match visual_operator(key) {
                Some(op) => apply_to_selection(state, mode, op),
                None => DispatchResult::clean(),
            }
        }
    }
}

fn visual_operator(key: char) -> Option<OperatorKind> {
    let op = match key {
        'd' | 'x' | DELETE => OperatorKind::Delete,
        'y' => OperatorKind::Yank,
        'c' => OperatorKind::Change,
        '>' => OperatorKind::Indent,
        '<' => OperatorKind::Unindent,
        'u' => OperatorKind::Lowercase,
        'U' => OperatorKind::Uppercase,
        '~' => OperatorKind::ToggleCase,
        _ => return None,
    };
    Some(op)
}

/// Half-open span covering the inclusive selection.
fn selection_span(state: &EditorState, vs: &VisualState) -> Span {
    let (start, end) = vs.selection(state.cursor.position);
    let start = state.buffer.clamp_position(start);
    let end = state.buffer.clamp_position(end);
    let len = state.buffer.line_len(end.line);
    let end = if end.column < len {
        Position::new(end.line, end.column + 1)
    } else if end.line < state.buffer.last_line() {
        Position::new(end.line + 1, 0)
    } else {
        Position::new(end.line, len)
    };
    Span::chars(start, end)
}

fn apply_to_selection(state: &mut EditorState, mode: &mut ModeState, op: OperatorKind) -> DispatchResult {
    let ModeState::Visual(vs) = mode else {
        return DispatchResult::clean();
    };
    let span = if matches!(op, OperatorKind::Indent | OperatorKind::Unindent) {
        let (start, end) = vs.selection(state.cursor.position);
        Span::lines(start.line, end.line)
    } else {
        selection_span(state, vs)
    };
    let register = vs.register;
    tracing::trace!(target: "actions.dispatch", ?op, from_line = span.start.line, from_col = span.start.column, to_line = span.end.line, to_col = span.end.column, "visual_operator");
    let outcome = if span.kind == SpanKind::Characterwise && span.start == span.end {
        // Empty document: nothing to select.
        OperatorOutcome::Cancelled
    } else {
        operator::apply(state, op, span, register)
    };
    let text_changed = matches!(
        outcome,
        OperatorOutcome::Applied {
            text_changed: true,
            ..
        }
    );
    if op == OperatorKind::Yank {
        state.cursor.set(span.start);
    }
    if op == OperatorKind::Change {
        if text_changed {
            state.join_insert_run();
        }
        *mode = ModeState::Insert;
    } else {
        state.clamp_cursor_normal();
        *mode = ModeState::normal();
    }
    DispatchResult {
        dirty: true,
        text_changed,
        ..DispatchResult::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::handle_key;
    use core_state::RegisterContent;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn feed(st: &mut EditorState, mode: &mut ModeState, keys: &str) {
        for k in keys.chars() {
            handle_key(st, mode, k);
        }
    }

    fn start(text: &str) -> (EditorState, ModeState) {
        (EditorState::new(Buffer::from_text(text)), ModeState::normal())
    }

    #[test]
    fn delete_inclusive_selection() {
        let (mut st, mut mode) = start("hello world");
        feed(&mut st, &mut mode, "vlld");
        assert_eq!(st.text(), "lo world");
        assert!(matches!(mode, ModeState::Normal(_)));
        assert_eq!(st.registers.unnamed(), Some(&RegisterContent::Characters("hel".into())));
    }

    #[test]
    fn backward_selection_and_swap() {
        let (mut st, mut mode) = start("abcdef");
        feed(&mut st, &mut mode, "$vhho");
        assert_eq!(st.position(), Position::new(0, 5));
        feed(&mut st, &mut mode, "y");
        assert_eq!(st.registers.get('0'), Some(&RegisterContent::Characters("def".into())));
        assert_eq!(st.position(), Position::new(0, 3));
        assert_eq!(st.text(), "abcdef");
    }

    #[test]
    fn multi_line_selection_case_and_change() {
        let (mut st, mut mode) = start("ab\ncd");
        feed(&mut st, &mut mode, "lvjU");
        assert_eq!(st.text(), "aB\nCD");
        feed(&mut st, &mut mode, "ggvec");
        assert!(matches!(mode, ModeState::Insert));
        feed(&mut st, &mut mode, "z\u{1b}");
        assert_eq!(st.text(), "z\nCD");
    }

    #[test]
    fn counts_and_find_extend_selection() {
        let (mut st, mut mode) = start("a b c d e");
        feed(&mut st, &mut mode, "v2wd");
        assert_eq!(st.text(), " d e");
        feed(&mut st, &mut mode, "vfdx");
        assert_eq!(st.text(), " e");
    }

    #[test]
    fn empty_line_selection_takes_line_break() {
        let (mut st, mut mode) = start("\nnext");
        feed(&mut st, &mut mode, "vd");
        assert_eq!(st.text(), "next");
    }

    #[test]
    fn indent_selection_lines() {
        let (mut st, mut mode) = start("a\nb\nc");
        feed(&mut st, &mut mode, "vj>");
        assert_eq!(st.buffer.lines(), ["    a", "    b", "c"]);
    }

    #[test]
    fn escape_leaves_without_edit() {
        let (mut st, mut mode) = start("abc");
        feed(&mut st, &mut mode, "vl\u{1b}");
        assert!(matches!(mode, ModeState::Normal(_)));
        assert_eq!(st.position(), Position::new(0, 1));
        feed(&mut st, &mut mode, "v2\u{1b}");
        assert!(matches!(mode, ModeState::Visual(_)));
        feed(&mut st, &mut mode, "v");
        assert!(matches!(mode, ModeState::Normal(_)));
    }

    #[test]
    fn named_register_in_visual() {
        let (mut st, mut mode) = start("xyz");
        feed(&mut st, &mut mode, "v\"kly");
        assert_eq!(st.registers.get('k'), Some(&RegisterContent::Characters("xy".into())));
    }
}
