//! Normal mode state machine.
//!
//! States (all carried by `NormalState`):
//! * idle: no count, no prefix, no operator.
//! * counting: digits accumulate while no operator is pending. `0` with no
//!   count so far is the line-start motion instead.
//! * `g` prefix: `gg` jumps to the first line, `gu` / `gU` / `g~` start a
//!   case operator, anything else cancels.
//! * find prefix (`f` `F` `t` `T`): the next code point is the target.
//! * register prefix (`"`): the next key names the register.
//! * replace prefix (`r`): the next code point overwrites characters.
//! * operator pending: every key goes to the `OperatorEngine` until it
//!   applies or cancels.
//!
//! Esc clears every pending field from any of these states. Commands that
//! execute reset count and register afterwards.

use super::{DispatchResult, ModeState, command, edit, motion, undo};
use crate::operator::{self, OperatorEngine, OperatorKind, OperatorOutcome};
use crate::span_resolver::{self, MotionKind};
use core_events::{CTRL_R, DELETE, ESC};
use core_state::{EditorState, FindKind, FindMemory, register};
use core_text::{Position, motion as text_motion};

/// Multi-key prefix awaiting its second key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Prefix {
    #[default]
    None,
    G,
    Find(FindKind, bool),
    Register,
    Replace,
}

#[derive(Debug, Clone, Default)]
pub struct NormalState {
    count: Option<usize>,
    prefix: Prefix,
    register: Option<char>,
    operator: OperatorEngine,
}

impl NormalState {
    /// Count typed so far, if any.
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn register(&self) -> Option<char> {
        self.register
    }

    pub fn operator(&self) -> &OperatorEngine {
        &self.operator
    }

    pub fn is_idle(&self) -> bool {
        self.count.is_none()
            && self.prefix == Prefix::None
            && self.register.is_none()
            && !self.operator.is_pending()
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Keys typed so far, e.g. `"a3d` or `2f`.
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
            Prefix::Find(kind, forward) => out.push(match (kind, forward) {
                (FindKind::Find, true) => 'f',
                (FindKind::Find, false) => 'F',
                (FindKind::Till, true) => 't',
                (FindKind::Till, false) => 'T',
            }),
            Prefix::Register => out.push('"'),
            Prefix::Replace => out.push('r'),
        }
        out.push_str(&self.operator.echo());
        out
    }

    fn push_digit(&mut self, digit: usize) {
        let n = self.count.unwrap_or(0);
        self.count = Some(n.saturating_mul(10).saturating_add(digit));
    }
}

pub(crate) fn handle(state: &mut EditorState, mode: &mut ModeState, key: char) -> DispatchResult {
    let ModeState::Normal(ns) = mode else {
        return DispatchResult::clean();
    };
    let (result, next) = execute(state, ns, key);
    if let Some(next) = next {
        *mode = next;
    }
    result
}

type Step = (DispatchResult, Option<ModeState>);

fn stay(result: DispatchResult) -> Step {
    (result, None)
}

fn execute(state: &mut EditorState, ns: &mut NormalState, key: char) -> Step {
    if key == ESC {
        let was_pending = !ns.is_idle();
        ns.reset();
        if was_pending {
            tracing::trace!(target: "actions.dispatch", "pending_cleared");
        }
        return stay(DispatchResult::moved(was_pending));
    }
    if ns.operator.is_pending() {
        return operator_key(state, ns, key);
    }
    match ns.prefix {
        Prefix::None => {}
        Prefix::G => {
            ns.prefix = Prefix::None;
            return g_key(state, ns, key);
        }
        Prefix::Find(kind, forward) => {
            let find = FindMemory {
                kind,
                forward,
                target: key,
            };
            state.last_find = Some(find);
            let count = ns.count;
            ns.reset();
            return stay(DispatchResult::moved(motion::apply(
                state,
                MotionKind::Find(find),
                count,
                false,
            )));
        }
        Prefix::Register => {
            ns.prefix = Prefix::None;
            if register::is_valid_name(key) {
                ns.register = Some(key);
            } else {
                tracing::debug!(target: "actions.dispatch", name = ?key, "register_name_rejected");
                ns.reset();
            }
            return stay(DispatchResult::dirty());
        }
        Prefix::Replace => {
            let n = ns.count.unwrap_or(1);
            ns.reset();
            let changed = edit::replace_chars(state, key, n);
            return stay(edited_or_redraw(changed));
        }
    }
    if let Some(digit) = key.to_digit(10)
        && (digit != 0 || ns.count.is_some())
    {
        ns.push_digit(digit as usize);
        return stay(DispatchResult::dirty());
    }
    idle_key(state, ns, key)
}

fn edited_or_redraw(changed: bool) -> DispatchResult {
    if changed {
        DispatchResult::edited()
    } else {
        DispatchResult::dirty()
    }
}

fn operator_key(state: &mut EditorState, ns: &mut NormalState, key: char) -> Step {
    match ns.operator.handle_key(state, key) {
        OperatorOutcome::Awaiting => stay(DispatchResult::dirty()),
        OperatorOutcome::Cancelled => {
            ns.reset();
            stay(DispatchResult::dirty())
        }
        OperatorOutcome::Applied {
            text_changed,
            enter_insert,
        } => {
            ns.reset();
            let result = DispatchResult {
                dirty: true,
                text_changed,
                ..DispatchResult::default()
            };
            if enter_insert {
                state.join_insert_run();
                (result, Some(ModeState::Insert))
            } else {
                stay(result)
            }
        }
    }
}

fn g_key(state: &mut EditorState, ns: &mut NormalState, key: char) -> Step {
    if key == 'g' {
        let count = ns.count;
        ns.reset();
        return stay(DispatchResult::moved(motion::apply(
            state,
            MotionKind::FirstLine,
            count,
            false,
        )));
    }
    if let Some(op) = OperatorKind::from_g_key(key) {
        ns.operator.begin(op, ns.count, ns.register);
        return stay(DispatchResult::dirty());
    }
    tracing::debug!(target: "actions.dispatch", key = ?key, "g_prefix_cancelled");
    ns.reset();
    stay(DispatchResult::dirty())
}

/// A key with no prefix or operator pending.
fn idle_key(state: &mut EditorState, ns: &mut NormalState, key: char) -> Step {
    if let Some(op) = OperatorKind::from_key(key) {
        ns.operator.begin(op, ns.count, ns.register);
        return stay(DispatchResult::dirty());
    }
    if let Some((kind, forward)) = span_resolver::find_key(key) {
        ns.prefix = Prefix::Find(kind, forward);
        return stay(DispatchResult::dirty());
    }
    match key {
        'g' => {
            ns.prefix = Prefix::G;
            return stay(DispatchResult::dirty());
        }
        '"' => {
            ns.prefix = Prefix::Register;
            return stay(DispatchResult::dirty());
        }
        'r' => {
            ns.prefix = Prefix::Replace;
            return stay(DispatchResult::dirty());
        }
        _ => {}
    }
    let count = ns.count;
    let n = count.unwrap_or(1);
    let register = ns.register;
    let was_pending = !ns.is_idle();
    ns.reset();
    if let Some(kind) = MotionKind::from_key(key) {
        let moved = motion::apply(state, kind, count, false);
        return stay(DispatchResult::moved(moved || was_pending));
    }
    match key {
        ';' | ',' => match span_resolver::repeat_find(state.last_find, key == ',') {
            Some(kind) => stay(DispatchResult::moved(motion::apply(state, kind, count, false))),
            None => stay(DispatchResult::moved(was_pending)),
        },
        'x' | DELETE => stay(edited_or_redraw(edit::delete_under(state, n, register))),
        'X' => stay(edited_or_redraw(edit::delete_before(state, n, register))),
        'D' | 'C' => {
            let op = if key == 'D' {
                OperatorKind::Delete
            } else {
                OperatorKind::Change
            };
            to_line_end(state, op, count, register)
        }
        'Y' => {
            operator::apply_lines(state, OperatorKind::Yank, count, register);
            stay(DispatchResult::dirty())
        }
        'p' | 'P' => stay(edited_or_redraw(edit::put(state, key == 'p', n, register))),
        'J' => stay(edited_or_redraw(edit::join_lines(state, n))),
        'i' | 'a' | 'I' | 'A' => {
            enter_insert(state, key);
            (DispatchResult::dirty(), Some(ModeState::Insert))
        }
        'o' | 'O' => {
            open_line(state, key == 'o');
            (DispatchResult::edited(), Some(ModeState::Insert))
        }
        'v' => (
            DispatchResult::dirty(),
            Some(ModeState::visual(state.cursor.position)),
        ),
        ':' => (
            DispatchResult::dirty(),
            Some(ModeState::Command {
                input: String::new(),
            }),
        ),
        '/' | '?' => (
            DispatchResult::dirty(),
            Some(ModeState::Search {
                input: String::new(),
                forward: key == '/',
            }),
        ),
        'n' | 'N' => stay(command::repeat_search(state, key == 'N', n)),
        'u' => stay(undo::handle_undo(state, n)),
        CTRL_R => stay(undo::handle_redo(state, n)),
        other => {
            tracing::trace!(target: "actions.dispatch", key = ?other, "unmapped_key");
            stay(DispatchResult::moved(was_pending))
        }
    }
}

/// `D` / `C`: the operator over `$` with the typed count.
fn to_line_end(
    state: &mut EditorState,
    op: OperatorKind,
    count: Option<usize>,
    register: Option<char>,
) -> Step {
    let span = span_resolver::resolve_span(&state.buffer, state.cursor, MotionKind::LineEnd, count, op);
    let text_changed = match span {
        Some(span) => matches!(
            operator::apply(state, op, span, register),
            OperatorOutcome::Applied {
                text_changed: true,
                ..
            }
        ),
        None => false,
    };
    let result = edited_or_redraw(text_changed);
    if op == OperatorKind::Change {
        if text_changed {
            state.join_insert_run();
        }
        (result, Some(ModeState::Insert))
    } else {
        stay(result)
    }
}

/// Cursor placement for `i` `a` `I` `A`.
fn enter_insert(state: &mut EditorState, key: char) {
    let pos = state.buffer.clamp_position(state.cursor.position);
    let len = state.buffer.line_len(pos.line);
    let target = match key {
        'a' => Position::new(pos.line, (pos.column + 1).min(len)),
        'I' => text_motion::first_non_whitespace(&state.buffer, pos),
        'A' => Position::new(pos.line, len),
        _ => pos,
    };
    state.cursor.set(target);
    tracing::trace!(target: "actions.dispatch", key = ?key, line = target.line, col = target.column, "enter_insert");
}

/// `o` / `O`: open an empty line below/above. The new line belongs to the
/// insert run that follows, so one undo removes it together with the typed
/// text.
fn open_line(state: &mut EditorState, below: bool) {
    let line = state.cursor.line().min(state.buffer.last_line());
    let at = if below { line + 1 } else { line };
    state.begin_insert_edit();
    state.buffer.insert_line(at, "");
    state.cursor.set(Position::new(at, 0));
    tracing::trace!(target: "actions.dispatch", op = "open_line", below, line = at, "edit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::RegisterContent;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn feed(st: &mut EditorState, mode: &mut ModeState, keys: &str) {
        for k in keys.chars() {
            super::super::handle_key(st, mode, k);
        }
    }

    fn normal(text: &str) -> (EditorState, ModeState) {
        (EditorState::new(Buffer::from_text(text)), ModeState::normal())
    }

    fn ns(mode: &ModeState) -> &NormalState {
        match mode {
            ModeState::Normal(ns) => ns,
            other => panic!("expected Normal, got {other:?}"),
        }
    }

    #[test]
    fn count_accumulates_and_zero_is_motion() {
        let (mut st, mut mode) = normal("abcdefghijklmnop");
        feed(&mut st, &mut mode, "12");
        assert_eq!(ns(&mode).count(), Some(12));
        feed(&mut st, &mut mode, "l");
        assert_eq!(st.position(), Position::new(0, 12));
        assert!(ns(&mode).is_idle());
        feed(&mut st, &mut mode, "0");
        assert_eq!(st.position(), Position::new(0, 0));
        feed(&mut st, &mut mode, "10l");
        assert_eq!(st.position(), Position::new(0, 10));
    }

    #[test]
    fn escape_clears_everything() {
        let (mut st, mut mode) = normal("abc");
        feed(&mut st, &mut mode, "\"a3d");
        assert_eq!(ns(&mode).echo(), "\"a3d");
        feed(&mut st, &mut mode, "\u{1b}");
        assert!(ns(&mode).is_idle());
        feed(&mut st, &mut mode, "x");
        assert_eq!(st.text(), "bc");
        assert_eq!(st.registers.get('a'), None);
    }

    #[test]
    fn digit_after_operator_cancels_it() {
        let (mut st, mut mode) = normal("one two three four");
        feed(&mut st, &mut mode, "d3w");
        assert_eq!(st.text(), "one two three four");
        assert!(ns(&mode).is_idle());
        assert_eq!(st.position(), Position::new(0, 4));
    }

    #[test]
    fn count_before_operator_multiplies() {
        let (mut st, mut mode) = normal("one two three four");
        feed(&mut st, &mut mode, "2dw");
        assert_eq!(st.text(), "three four");
    }

    #[test]
    fn g_prefix() {
        let (mut st, mut mode) = normal("a\nb\nc");
        feed(&mut st, &mut mode, "Ggg");
        assert_eq!(st.position(), Position::new(0, 0));
        feed(&mut st, &mut mode, "2gg");
        assert_eq!(st.position(), Position::new(1, 0));
        feed(&mut st, &mut mode, "gx");
        assert!(ns(&mode).is_idle());
        assert_eq!(st.position(), Position::new(1, 0));
    }

    #[test]
    fn find_and_repeat() {
        let (mut st, mut mode) = normal("a-b-c-d");
        feed(&mut st, &mut mode, "f-");
        assert_eq!(st.position(), Position::new(0, 1));
        feed(&mut st, &mut mode, ";");
        assert_eq!(st.position(), Position::new(0, 3));
        feed(&mut st, &mut mode, ",");
        assert_eq!(st.position(), Position::new(0, 1));
        feed(&mut st, &mut mode, "2t-");
        assert_eq!(st.position(), Position::new(0, 4));
    }

    #[test]
    fn named_register_yank_and_put() {
        let (mut st, mut mode) = normal("word");
        feed(&mut st, &mut mode, "\"qyiw$\"qp");
        assert_eq!(st.text(), "wordword");
        assert_eq!(st.registers.get('q'), Some(&RegisterContent::Characters("word".into())));
    }

    #[test]
    fn invalid_register_name_resets() {
        let (mut st, mut mode) = normal("abc");
        feed(&mut st, &mut mode, "\"!");
        assert!(ns(&mode).is_idle());
    }

    #[test]
    fn change_enters_insert_as_one_undo_step() {
        let (mut st, mut mode) = normal("foo bar");
        feed(&mut st, &mut mode, "cwxyz\u{1b}");
        assert_eq!(st.text(), "xyz bar");
        assert_eq!(st.undo_depth(), 1);
        feed(&mut st, &mut mode, "u");
        assert_eq!(st.text(), "foo bar");
    }

    #[test]
    fn open_line_below_and_above() {
        let (mut st, mut mode) = normal("a\nc");
        feed(&mut st, &mut mode, "ob\u{1b}");
        assert_eq!(st.buffer.lines(), ["a", "b", "c"]);
        feed(&mut st, &mut mode, "ggOz\u{1b}");
        assert_eq!(st.buffer.lines(), ["z", "a", "b", "c"]);
        feed(&mut st, &mut mode, "u");
        assert_eq!(st.buffer.lines(), ["a", "b", "c"]);
    }

    #[test]
    fn append_variants_position_cursor() {
        let (mut st, mut mode) = normal("  ab");
        feed(&mut st, &mut mode, "A!\u{1b}");
        assert_eq!(st.text(), "  ab!");
        feed(&mut st, &mut mode, "I>\u{1b}");
        assert_eq!(st.text(), "  >ab!");
        feed(&mut st, &mut mode, "0a.\u{1b}");
        assert_eq!(st.text(), " . >ab!");
    }

    #[test]
    fn shorthand_commands() {
        let (mut st, mut mode) = normal("hello world\nnext");
        feed(&mut st, &mut mode, "wD");
        assert_eq!(st.text(), "hello \nnext");
        assert_eq!(st.position(), Position::new(0, 5));
        feed(&mut st, &mut mode, "0Y");
        assert_eq!(st.registers.unnamed(), Some(&RegisterContent::Lines(vec!["hello ".into()])));
        feed(&mut st, &mut mode, "jCnew\u{1b}");
        assert_eq!(st.text(), "hello \nnew");
    }

    #[test]
    fn replace_and_join() {
        let (mut st, mut mode) = normal("abc\ndef");
        feed(&mut st, &mut mode, "2rxJ");
        assert_eq!(st.text(), "xxc def");
        feed(&mut st, &mut mode, "r\u{1b}");
        assert!(ns(&mode).is_idle());
        assert_eq!(st.text(), "xxc def");
    }

    #[test]
    fn undo_redo_with_counts() {
        let (mut st, mut mode) = normal("abcd");
        feed(&mut st, &mut mode, "xxx");
        assert_eq!(st.text(), "d");
        feed(&mut st, &mut mode, "2u");
        assert_eq!(st.text(), "bcd");
        feed(&mut st, &mut mode, "\u{12}");
        assert_eq!(st.text(), "cd");
    }

    #[test]
    fn mode_switch_keys() {
        let (mut st, mut mode) = normal("abc");
        feed(&mut st, &mut mode, "v");
        assert!(matches!(mode, ModeState::Visual(_)));
        let (mut st2, mut mode2) = normal("abc");
        feed(&mut st2, &mut mode2, ":");
        assert!(matches!(mode2, ModeState::Command { .. }));
        feed(&mut st, &mut mode, "\u{1b}?");
        assert!(matches!(mode, ModeState::Search { forward: false, .. }));
    }

    #[test]
    fn n_without_search_reports() {
        let (mut st, mut mode) = normal("abc");
        feed(&mut st, &mut mode, "n");
        assert_eq!(st.message(), Some("no previous search pattern"));
    }
}
