//! Normal mode edits that are not operators: `x`, `X`, `p`, `P`, `r`, `J`.
//!
//! Each function snapshots undo state immediately before its first buffer
//! mutation and returns whether the text changed. A command that cannot act
//! (nothing under the cursor, empty register, too few characters for `r`)
//! leaves buffer, undo history and registers untouched.

use core_state::{EditorState, RegisterContent};
use core_text::{Position, motion};

/// `x`: delete `count` characters under and after the cursor.
pub(crate) fn delete_under(state: &mut EditorState, count: usize, register: Option<char>) -> bool {
    let pos = state.buffer.clamp_position(state.cursor.position);
    let len = state.buffer.line_len(pos.line);
    if pos.column >= len {
        return false;
    }
    let end = Position::new(pos.line, pos.column.saturating_add(count.max(1)).min(len));
    state.save_undo_state();
    let removed = state.buffer.delete_range(pos, end);
    state.registers.record_delete(register, RegisterContent::Characters(removed));
    state.cursor.set(pos);
    state.clamp_cursor_normal();
    tracing::trace!(target: "actions.dispatch", op = "delete_under", line = pos.line, col = pos.column, n = end.column - pos.column, "edit");
    true
}

/// `X`: delete `count` characters before the cursor, never crossing lines.
pub(crate) fn delete_before(state: &mut EditorState, count: usize, register: Option<char>) -> bool {
    let pos = state.buffer.clamp_position(state.cursor.position);
    if pos.column == 0 {
        return false;
    }
    let start = Position::new(pos.line, pos.column.saturating_sub(count.max(1)));
    state.save_undo_state();
    let removed = state.buffer.delete_range(start, pos);
    state.registers.record_delete(register, RegisterContent::Characters(removed));
    state.cursor.set(start);
    state.clamp_cursor_normal();
    tracing::trace!(target: "actions.dispatch", op = "delete_before", line = pos.line, col = pos.column, to_col = start.column, "edit");
    true
}

/// Upper bound on the characters (line breaks included) one put may insert.
/// Larger counts are reduced so `count * content` stays under it.
const PUT_LIMIT: usize = 1 << 20;

/// `count` reduced so that `count` copies of `units` characters fit in
/// `PUT_LIMIT`. Never below one copy.
fn bounded_put_count(count: usize, units: usize) -> usize {
    count.max(1).min((PUT_LIMIT / units.max(1)).max(1))
}

/// `p` (`after`) / `P`: put register content `count` times. Line-wise
/// content goes below/above the cursor line and the cursor lands on the first
/// put line; character-wise content goes after/at the cursor and the cursor
/// lands on the last put character (or the put start for multi-line text).
pub(crate) fn put(state: &mut EditorState, after: bool, count: usize, register: Option<char>) -> bool {
    let content = match register {
        Some(name) => state.registers.get(name),
        None => state.registers.unnamed(),
    };
    let Some(content) = content.filter(|c| !c.is_empty()).cloned() else {
        tracing::debug!(target: "actions.dispatch", ?register, "put_empty_register");
        return false;
    };
    let units: usize = match &content {
        RegisterContent::Lines(lines) => lines.iter().map(|l| l.chars().count() + 1).sum(),
        RegisterContent::Characters(text) => text.chars().count(),
    };
    let requested = count;
    let count = bounded_put_count(count, units);
    if count < requested {
        tracing::debug!(target: "actions.dispatch", requested, count, units, "put_count_bounded");
    }
    let pos = state.buffer.clamp_position(state.cursor.position);
    state.save_undo_state();
    match content {
        RegisterContent::Lines(lines) => {
            let first = if after { pos.line + 1 } else { pos.line };
            let copies = std::iter::repeat_n(lines.as_slice(), count).flatten();
            state.buffer.insert_lines(first, copies);
            let target = motion::first_non_whitespace(&state.buffer, Position::new(first, 0));
            state.cursor.set(target);
        }
        RegisterContent::Characters(text) => {
            let len = state.buffer.line_len(pos.line);
            let column = if after && len > 0 { (pos.column + 1).min(len) } else { pos.column };
            let start = Position::new(pos.line, column);
            let repeated = text.repeat(count);
            let end = state.buffer.insert_text(start, &repeated);
            let target = if repeated.contains('\n') {
                start
            } else {
                Position::new(end.line, end.column.saturating_sub(1))
            };
            state.cursor.set(target);
        }
    }
    state.clamp_cursor_normal();
    tracing::trace!(target: "actions.dispatch", op = if after { "put_after" } else { "put_before" }, line = pos.line, col = pos.column, count, "edit");
    true
}

/// `r<ch>`: overwrite `count` characters with `ch`. Fails when fewer than
/// `count` characters remain on the line. Enter replaces them with a line
/// break instead.
pub(crate) fn replace_chars(state: &mut EditorState, ch: char, count: usize) -> bool {
    let pos = state.buffer.clamp_position(state.cursor.position);
    let count = count.max(1);
    let end = pos.column.saturating_add(count);
    if end > state.buffer.line_len(pos.line) {
        return false;
    }
    state.save_undo_state();
    state.buffer.delete_range(pos, Position::new(pos.line, end));
    if ch == core_events::ENTER || ch == '\n' {
        let next = state.buffer.insert_text(pos, "\n");
        state.cursor.set(next);
    } else {
        let replacement: String = std::iter::repeat_n(ch, count).collect();
        state.buffer.insert_text(pos, &replacement);
        state.cursor.set(Position::new(pos.line, end - 1));
    }
    state.clamp_cursor_normal();
    tracing::trace!(target: "actions.dispatch", op = "replace", line = pos.line, col = pos.column, count, "edit");
    true
}

/// `J`: join `max(count, 2)` lines starting at the cursor line. Leading
/// whitespace of each joined line is dropped and a single space separates the
/// parts (none when either side is empty or the left side already ends in
/// whitespace). The cursor rests on the last join point.
pub(crate) fn join_lines(state: &mut EditorState, count: usize) -> bool {
    let first = state.cursor.line().min(state.buffer.last_line());
    let joins = count.max(2) - 1;
    if first >= state.buffer.last_line() {
        return false;
    }
    state.save_undo_state();
    let mut joined = state.buffer.line(first).unwrap_or_default().to_string();
    let mut width = joined.chars().count();
    let mut join_col = 0;
    for next in state.buffer.delete_lines(first + 1, first.saturating_add(joins)) {
        let next = next.trim_start();
        join_col = width;
        if !next.is_empty() && !joined.is_empty() && !joined.ends_with(char::is_whitespace) {
            joined.push(' ');
            width += 1;
        } else {
            join_col = join_col.saturating_sub(1);
        }
        joined.push_str(next);
        width += next.chars().count();
    }
    state.buffer.replace_line(first, &joined);
    state.cursor.set(Position::new(first, join_col));
    state.clamp_cursor_normal();
    tracing::trace!(target: "actions.dispatch", op = "join", line = first, joins, "edit");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn state(text: &str) -> EditorState {
        EditorState::new(Buffer::from_text(text))
    }

    #[test]
    fn x_deletes_within_line_only() {
        let mut st = state("abc\ndef");
        st.cursor.set(Position::new(0, 1));
        assert!(delete_under(&mut st, 5, None));
        assert_eq!(st.text(), "a\ndef");
        assert_eq!(st.position(), Position::new(0, 0));
        assert_eq!(st.registers.unnamed(), Some(&RegisterContent::Characters("bc".into())));
        let mut empty = state("");
        assert!(!delete_under(&mut empty, 1, None));
        assert_eq!(empty.undo_depth(), 0);
    }

    #[test]
    fn big_x_deletes_before_cursor() {
        let mut st = state("abcd");
        st.cursor.set(Position::new(0, 3));
        assert!(delete_before(&mut st, 2, Some('a')));
        assert_eq!(st.text(), "ad");
        assert_eq!(st.position(), Position::new(0, 1));
        assert_eq!(st.registers.get('a'), Some(&RegisterContent::Characters("bc".into())));
        st.cursor.set(Position::new(0, 0));
        assert!(!delete_before(&mut st, 1, None));
    }

    #[test]
    fn put_characters_after_and_before() {
        let mut st = state("ac");
        st.registers.set('"', RegisterContent::Characters("b".into()));
        assert!(put(&mut st, true, 1, None));
        assert_eq!(st.text(), "abc");
        assert_eq!(st.position(), Position::new(0, 1));
        assert!(put(&mut st, false, 2, None));
        assert_eq!(st.text(), "abbbc");
        assert_eq!(st.position(), Position::new(0, 2));
    }

    #[test]
    fn put_lines_below_and_above() {
        let mut st = state("one\nthree");
        st.registers.set('x', RegisterContent::Lines(vec!["  two".into()]));
        assert!(put(&mut st, true, 1, Some('x')));
        assert_eq!(st.buffer.lines(), ["one", "  two", "three"]);
        assert_eq!(st.position(), Position::new(1, 2));
        st.cursor.set(Position::new(0, 0));
        assert!(put(&mut st, false, 1, Some('x')));
        assert_eq!(st.buffer.lines(), ["  two", "one", "  two", "three"]);
        assert_eq!(st.position(), Position::new(0, 2));
    }

    #[test]
    fn put_with_empty_register_is_noop() {
        let mut st = state("abc");
        assert!(!put(&mut st, true, 1, None));
        assert!(!put(&mut st, true, 1, Some('q')));
        assert_eq!(st.undo_depth(), 0);
    }

    #[test]
    fn put_into_empty_line() {
        let mut st = state("");
        st.registers.set('"', RegisterContent::Characters("xy".into()));
        put(&mut st, true, 1, None);
        assert_eq!(st.text(), "xy");
        assert_eq!(st.position(), Position::new(0, 1));
    }

    #[test]
    fn huge_put_counts_are_bounded() {
        let mut st = state("abc");
        st.registers.set('"', RegisterContent::Characters("a".into()));
        assert!(put(&mut st, true, usize::MAX, None));
        assert_eq!(st.text().chars().count(), 3 + PUT_LIMIT);

        let mut lines = state("x");
        lines.registers.set('"', RegisterContent::Lines(vec!["ab".into(), String::new()]));
        assert!(put(&mut lines, true, usize::MAX, None));
        assert_eq!(lines.buffer.line_count(), 1 + 2 * (PUT_LIMIT / 4));
        assert_eq!(lines.position(), Position::new(1, 0));
        assert!(lines.undo());
        assert_eq!(lines.text(), "x");
    }

    #[test]
    fn bounded_put_count_keeps_at_least_one_copy() {
        assert_eq!(bounded_put_count(0, 5), 1);
        assert_eq!(bounded_put_count(3, 5), 3);
        assert_eq!(bounded_put_count(usize::MAX, PUT_LIMIT * 2), 1);
        assert_eq!(bounded_put_count(usize::MAX, 0), PUT_LIMIT);
    }

    #[test]
    fn replace_needs_enough_characters() {
        let mut st = state("abcd");
        st.cursor.set(Position::new(0, 1));
        assert!(replace_chars(&mut st, 'z', 2));
        assert_eq!(st.text(), "azzd");
        assert_eq!(st.position(), Position::new(0, 2));
        assert!(!replace_chars(&mut st, 'z', 5));
        assert_eq!(st.text(), "azzd");
    }

    #[test]
    fn replace_with_enter_splits_line() {
        let mut st = state("ab cd");
        st.cursor.set(Position::new(0, 2));
        assert!(replace_chars(&mut st, core_events::ENTER, 1));
        assert_eq!(st.buffer.lines(), ["ab", "cd"]);
        assert_eq!(st.position(), Position::new(1, 0));
    }

    #[test]
    fn join_trims_and_spaces() {
        let mut st = state("one\n   two\nthree\nfour");
        assert!(join_lines(&mut st, 3));
        assert_eq!(st.buffer.lines(), ["one two three", "four"]);
        assert_eq!(st.position(), Position::new(0, 7));
        st.cursor.set(Position::new(1, 0));
        assert!(!join_lines(&mut st, 1));
    }

    #[test]
    fn join_with_empty_lines() {
        let mut st = state("a\n\nb");
        assert!(join_lines(&mut st, 1));
        assert_eq!(st.buffer.lines(), ["a", "b"]);
        let mut st = state("\nb");
        join_lines(&mut st, 1);
        assert_eq!(st.text(), "b");
        assert_eq!(st.position(), Position::new(0, 0));
    }

    #[test]
    fn join_count_past_end_stops_at_last_line() {
        let mut st = state("a\nb");
        assert!(join_lines(&mut st, 9));
        assert_eq!(st.text(), "a b");
    }
}
