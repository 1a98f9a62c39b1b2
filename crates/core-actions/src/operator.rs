//! Operator engine: pending-operator state and operator application.
//!
//! An operator key (`d`, `y`, `c`, `gu`, `gU`, `g~`, `>`, `<`) stores the
//! operator together with the count typed before it and any `"x` register.
//! The following key completes it: a motion, a text object (after `i`/`a`), a
//! find target (after `f`/`F`/`t`/`T`), or the doubled operator key for the
//! line-wise form. The pending state is cleared after that key whether or not
//! it produced an edit, so a digit typed after the operator (`d3w`) cancels
//! the operator rather than extending the count.
//!
//! Application rules:
//! * Destructive operators snapshot undo state immediately before mutating.
//! * Delete and Change leave the cursor at the start of the removed range;
//!   Change then enters Insert mode. Yank never moves the cursor.
//! * Line-wise spans produce `Lines` register content, character-wise spans
//!   produce `Characters`.
//! * Indent and unindent always act on whole lines (every line the span
//!   touches). Case conversion replaces characters in place for
//!   character-wise spans and whole lines for line-wise ones.

use crate::span_resolver::{self, MotionKind, Span, SpanKind};
use crate::text_object::{self, ObjectScope};
use core_state::{EditorState, FindKind, FindMemory, RegisterContent};
use core_text::{Position, motion};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Delete,
    Yank,
    Change,
    Lowercase,
    Uppercase,
    ToggleCase,
    Indent,
    Unindent,
}

impl OperatorKind {
    /// Key that, typed again, applies the operator line-wise (`dd`, `guu`).
    pub fn doubled_key(self) -> char {
        match self {
            OperatorKind::Delete => 'd',
            OperatorKind::Yank => 'y',
            OperatorKind::Change => 'c',
            OperatorKind::Lowercase => 'u',
            OperatorKind::Uppercase => 'U',
            OperatorKind::ToggleCase => '~',
            OperatorKind::Indent => '>',
            OperatorKind::Unindent => '<',
        }
    }

    /// Operators started by a single key in Normal mode.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'd' => Some(OperatorKind::Delete),
            'y' => Some(OperatorKind::Yank),
            'c' => Some(OperatorKind::Change),
            '>' => Some(OperatorKind::Indent),
            '<' => Some(OperatorKind::Unindent),
            _ => None,
        }
    }

    /// Operators started by `g` + key.
    pub fn from_g_key(key: char) -> Option<Self> {
        match key {
            'u' => Some(OperatorKind::Lowercase),
            'U' => Some(OperatorKind::Uppercase),
            '~' => Some(OperatorKind::ToggleCase),
            _ => None,
        }
    }

    fn is_g_prefixed(self) -> bool {
        matches!(
            self,
            OperatorKind::Lowercase | OperatorKind::Uppercase | OperatorKind::ToggleCase
        )
    }
}

/// Result of feeding one key to a pending operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorOutcome {
    /// A multi-key prefix (`i`/`a`, `f`, `g`) was stored; still pending.
    Awaiting,
    /// The operator was applied. `text_changed` reports a buffer mutation.
    Applied {
        text_changed: bool,
        enter_insert: bool,
    },
    /// The key did not complete a valid target; nothing was edited.
    Cancelled,
}

/// Extra key the operator is waiting for inside its own pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SubPending {
    #[default]
    None,
    G,
    Find(FindKind, bool),
}

/// Pending-operator state.
#[derive(Debug, Clone, Default)]
pub struct OperatorEngine {
    pending_operator: Option<OperatorKind>,
    pending_count: Option<usize>,
    text_object_prefix: Option<ObjectScope>,
    pending_register: Option<char>,
    sub: SubPending,
}

impl OperatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending_operator.is_some()
    }

    pub fn pending_operator(&self) -> Option<OperatorKind> {
        self.pending_operator
    }

    /// Count carried by the pending operator (1 when none was typed).
    pub fn pending_count(&self) -> usize {
        self.pending_count.unwrap_or(1)
    }

    pub fn text_object_prefix(&self) -> Option<ObjectScope> {
        self.text_object_prefix
    }

    pub fn pending_register(&self) -> Option<char> {
        self.pending_register
    }

    /// Store `op` awaiting its target. Does not touch the buffer.
    pub fn begin(&mut self, op: OperatorKind, count: Option<usize>, register: Option<char>) {
        self.pending_operator = Some(op);
        self.pending_count = count;
        self.pending_register = register;
        self.text_object_prefix = None;
        self.sub = SubPending::None;
        trace!(target: "actions.operator", ?op, count = self.pending_count(), ?register, "operator_pending");
    }

    /// Clear every pending field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed the key typed while an operator is pending.
    pub fn handle_key(&mut self, state: &mut EditorState, key: char) -> OperatorOutcome {
        let Some(op) = self.pending_operator else {
            return OperatorOutcome::Cancelled;
        };
        let count = self.pending_count;
        let register = self.pending_register;
        if key == core_events::ESC {
            self.reset();
            return OperatorOutcome::Cancelled;
        }
        if let Some(scope) = self.text_object_prefix {
            self.reset();
            let pos = state.cursor.position;
            return match text_object::resolve(&state.buffer, pos, scope, key) {
                Some(range) if !range.is_empty() => {
                    let span = Span::chars(range.start, range.end);
                    apply(state, op, span, register)
                }
                _ => {
                    debug!(target: "actions.operator", ?op, ?scope, object = ?key, "text_object_unresolved");
                    OperatorOutcome::Cancelled
                }
            };
        }
        match self.sub {
            SubPending::Find(kind, forward) => {
                self.reset();
                let find = FindMemory {
                    kind,
                    forward,
                    target: key,
                };
                state.last_find = Some(find);
                return self.apply_motion(state, op, MotionKind::Find(find), count, register);
            }
            SubPending::G => {
                self.reset();
                if key == 'g' {
                    return self.apply_motion(state, op, MotionKind::FirstLine, count, register);
                }
                if op.is_g_prefixed() && OperatorKind::from_g_key(key) == Some(op) {
                    return apply_lines(state, op, count, register);
                }
                debug!(target: "actions.operator", ?op, key = ?key, "g_target_unknown");
                return OperatorOutcome::Cancelled;
            }
            SubPending::None => {}
        }
        match key {
            'i' => {
                self.text_object_prefix = Some(ObjectScope::Inner);
                OperatorOutcome::Awaiting
            }
            'a' => {
                self.text_object_prefix = Some(ObjectScope::Around);
                OperatorOutcome::Awaiting
            }
            'g' => {
                self.sub = SubPending::G;
                OperatorOutcome::Awaiting
            }
            k if span_resolver::find_key(k).is_some() => {
                if let Some((kind, forward)) = span_resolver::find_key(k) {
                    self.sub = SubPending::Find(kind, forward);
                }
                OperatorOutcome::Awaiting
            }
            k if k == op.doubled_key() => {
                self.reset();
                apply_lines(state, op, count, register)
            }
            ';' | ',' => {
                self.reset();
                match span_resolver::repeat_find(state.last_find, key == ',') {
                    Some(kind) => self.apply_motion(state, op, kind, count, register),
                    None => OperatorOutcome::Cancelled,
                }
            }
            other => {
                self.reset();
                match MotionKind::from_key(other) {
                    Some(kind) => self.apply_motion(state, op, kind, count, register),
                    None => {
                        debug!(target: "actions.operator", ?op, key = ?other, "operator_cancelled_unknown_motion");
                        OperatorOutcome::Cancelled
                    }
                }
            }
        }
    }

    fn apply_motion(
        &self,
        state: &mut EditorState,
        op: OperatorKind,
        kind: MotionKind,
        count: Option<usize>,
        register: Option<char>,
    ) -> OperatorOutcome {
        match span_resolver::resolve_span(&state.buffer, state.cursor, kind, count, op) {
            Some(span) => apply(state, op, span, register),
            None => {
                debug!(target: "actions.operator", ?op, motion = ?kind, "motion_unresolved");
                OperatorOutcome::Cancelled
            }
        }
    }

    /// Keys typed so far for the pending operator, for status echo.
    pub fn echo(&self) -> String {
        let mut out = String::new();
        let Some(op) = self.pending_operator else {
            return out;
        };
        if op.is_g_prefixed() {
            out.push('g');
        }
        out.push(op.doubled_key());
        match self.text_object_prefix {
            Some(ObjectScope::Inner) => out.push('i'),
            Some(ObjectScope::Around) => out.push('a'),
            None => {}
        }
        match self.sub {
            SubPending::G => out.push('g'),
            SubPending::Find(kind, forward) => out.push(match (kind, forward) {
                (FindKind::Find, true) => 'f',
                (FindKind::Find, false) => 'F',
                (FindKind::Till, true) => 't',
                (FindKind::Till, false) => 'T',
            }),
            SubPending::None => {}
        }
        out
    }
}

/// Doubled-key form: `count` whole lines from the cursor line.
pub fn apply_lines(
    state: &mut EditorState,
    op: OperatorKind,
    count: Option<usize>,
    register: Option<char>,
) -> OperatorOutcome {
    let span = span_resolver::line_span(&state.buffer, state.cursor.position, count.unwrap_or(1));
    apply(state, op, span, register)
}

/// Apply `op` to `span`.
pub fn apply(
    state: &mut EditorState,
    op: OperatorKind,
    span: Span,
    register: Option<char>,
) -> OperatorOutcome {
    let (start, end) = span.ordered();
    trace!(target: "actions.operator", ?op, kind = ?span.kind, from_line = start.line, from_col = start.column, to_line = end.line, to_col = end.column, "apply_operator");
    let text_changed = match op {
        OperatorKind::Yank => {
            yank(state, span, register);
            false
        }
        OperatorKind::Delete => delete(state, span, register, false),
        OperatorKind::Change => delete(state, span, register, true),
        OperatorKind::Lowercase | OperatorKind::Uppercase | OperatorKind::ToggleCase => {
            convert_case(state, span, op)
        }
        OperatorKind::Indent | OperatorKind::Unindent => {
            shift_lines(state, span, op == OperatorKind::Indent)
        }
    };
    if text_changed {
        state.dirty = true;
    }
    OperatorOutcome::Applied {
        text_changed,
        enter_insert: op == OperatorKind::Change,
    }
}

fn collect_lines(state: &EditorState, first: usize, last: usize) -> Vec<String> {
    (first..=last)
        .filter_map(|l| state.buffer.line(l).map(str::to_owned))
        .collect()
}

fn span_content(state: &EditorState, span: Span) -> RegisterContent {
    match span.kind {
        SpanKind::Linewise => {
            let (first, last) = span.line_range();
            RegisterContent::Lines(collect_lines(state, first, last))
        }
        SpanKind::Characterwise => {
            let (start, end) = span.ordered();
            RegisterContent::Characters(state.buffer.substring(start, end))
        }
    }
}

fn yank(state: &mut EditorState, span: Span, register: Option<char>) {
    let content = span_content(state, span);
    state.registers.record_yank(register, content);
}

/// Delete (or change) `span`. Returns whether the buffer changed.
fn delete(state: &mut EditorState, span: Span, register: Option<char>, change: bool) -> bool {
    let content = span_content(state, span);
    state.save_undo_state();
    match span.kind {
        SpanKind::Linewise => {
            let (first, last) = span.line_range();
            if change {
                // Keep one (emptied) line to type into.
                state.buffer.delete_lines(first + 1, last);
                state.buffer.replace_line(first, "");
                state.cursor.set(Position::new(first, 0));
            } else {
                state.buffer.delete_lines(first, last);
                let target = Position::new(first.min(state.buffer.last_line()), 0);
                state.cursor.set(motion::first_non_whitespace(&state.buffer, target));
            }
        }
        SpanKind::Characterwise => {
            let (start, end) = span.ordered();
            state.buffer.delete_range(start, end);
            state.cursor.set(state.buffer.clamp_position(start));
        }
    }
    state.registers.record_delete(register, content);
    if !change {
        state.clamp_cursor_normal();
    }
    true
}

fn convert_char(c: char, op: OperatorKind) -> String {
    match op {
        OperatorKind::Lowercase => c.to_lowercase().collect(),
        OperatorKind::Uppercase => c.to_uppercase().collect(),
        _ if c.is_uppercase() => c.to_lowercase().collect(),
        _ => c.to_uppercase().collect(),
    }
}

fn convert_str(s: &str, op: OperatorKind) -> String {
    s.chars().map(|c| convert_char(c, op)).collect()
}

fn convert_case(state: &mut EditorState, span: Span, op: OperatorKind) -> bool {
    let (start, end) = span.ordered();
    let changed = match span.kind {
        SpanKind::Linewise => {
            let (first, last) = span.line_range();
            let before = collect_lines(state, first, last);
            let after: Vec<String> = before.iter().map(|l| convert_str(l, op)).collect();
            if before == after {
                false
            } else {
                state.save_undo_state();
                for (offset, line) in after.iter().enumerate() {
                    state.buffer.replace_line(first + offset, line);
                }
                true
            }
        }
        SpanKind::Characterwise => {
            let before = state.buffer.substring(start, end);
            let after = convert_str(&before, op);
            if before == after {
                false
            } else {
                state.save_undo_state();
                state.buffer.delete_range(start, end);
                state.buffer.insert_text(start, &after);
                true
            }
        }
    };
    let target = match span.kind {
        SpanKind::Linewise => Position::new(start.line, state.cursor.column()),
        SpanKind::Characterwise => start,
    };
    state.cursor.set(target);
    state.clamp_cursor_normal();
    changed
}

fn shift_lines(state: &mut EditorState, span: Span, indent: bool) -> bool {
    let (first, last) = span.line_range();
    let unit = state.options.indent_unit();
    let width = state.options.shift_width.max(1);
    let before = collect_lines(state, first, last);
    let after: Vec<String> = before
        .iter()
        .map(|line| {
            if indent {
                if line.is_empty() {
                    line.clone()
                } else {
                    format!("{unit}{line}")
                }
            } else {
                unindent_line(line, width)
            }
        })
        .collect();
    let changed = before != after;
    if changed {
        state.save_undo_state();
        for (offset, line) in after.iter().enumerate() {
            state.buffer.replace_line(first + offset, line);
        }
    }
    let target = motion::first_non_whitespace(&state.buffer, Position::new(first, 0));
    state.cursor.set(target);
    changed
}

/// Remove one indentation level: a leading tab, or up to `width` spaces.
fn unindent_line(line: &str, width: usize) -> String {
    if let Some(rest) = line.strip_prefix('\t') {
        return rest.to_string();
    }
    let spaces = line.chars().take(width).take_while(|&c| c == ' ').count();
    line[spaces..].to_string()
}
