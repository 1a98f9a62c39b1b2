//! Motion span resolver.
//!
//! Given a cursor, a `MotionKind` and a count, this module computes either the
//! cursor target (plain movement) or the span an operator acts on. Span rules
//! are decided per motion rather than inferred from the direction of travel:
//! * Backward motions (`h`, `b`, `B`, `0`, `^`, `{`, `F`, `T`) span
//!   `(target, cursor)`; forward motions span `(cursor, target)`.
//! * Inclusive motions (`e`, `E`, `$`, `f`, `t`, `%`) extend the end by one
//!   column so the character under the target is included.
//! * `w`/`W` never cross a line break under an operator: a target on a later
//!   line is pulled back to the end of the cursor line. Under `c` on a
//!   non-blank character they behave like `e`/`E`.
//! * `j`, `k`, `gg` and `G` are line-wise. `j`/`k` that cannot move resolve to
//!   no span at all.
//!
//! Nothing here mutates editor state.

use crate::operator::OperatorKind;
use core_state::{FindKind, FindMemory};
use core_text::{Buffer, Cursor, Position, WordKind, classify, motion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    FirstNonBlank,
    LineEnd,
    WordForward(WordKind),
    WordBackward(WordKind),
    WordEnd(WordKind),
    ParagraphForward,
    ParagraphBackward,
    MatchBracket,
    /// `gg`: first line, or line `count` when a count was typed.
    FirstLine,
    /// `G`: last line, or line `count` when a count was typed.
    LastLine,
    Find(FindMemory),
}

impl MotionKind {
    /// Motions that keep the preferred column instead of resetting it.
    pub fn is_vertical(self) -> bool {
        matches!(
            self,
            MotionKind::Up | MotionKind::Down | MotionKind::ParagraphForward | MotionKind::ParagraphBackward
        )
    }

    /// Normal mode key for the single-key motions.
    pub fn from_key(key: char) -> Option<Self> {
        use core_events::{DOWN, END, HOME, LEFT, RIGHT, UP};
        let kind = match key {
            'h' | LEFT => MotionKind::Left,
            'l' | RIGHT => MotionKind::Right,
            'j' | DOWN => MotionKind::Down,
            'k' | UP => MotionKind::Up,
            '0' | HOME => MotionKind::LineStart,
            '^' => MotionKind::FirstNonBlank,
            '$' | END => MotionKind::LineEnd,
            'w' => MotionKind::WordForward(WordKind::Word),
            'W' => MotionKind::WordForward(WordKind::BigWord),
            'b' => MotionKind::WordBackward(WordKind::Word),
            'B' => MotionKind::WordBackward(WordKind::BigWord),
            'e' => MotionKind::WordEnd(WordKind::Word),
            'E' => MotionKind::WordEnd(WordKind::BigWord),
            '}' => MotionKind::ParagraphForward,
            '{' => MotionKind::ParagraphBackward,
            '%' => MotionKind::MatchBracket,
            'G' => MotionKind::LastLine,
            _ => return None,
        };
        Some(kind)
    }
}

/// Map an `f`/`F`/`t`/`T` key to its find flavour and direction.
pub fn find_key(key: char) -> Option<(FindKind, bool)> {
    match key {
        'f' => Some((FindKind::Find, true)),
        'F' => Some((FindKind::Find, false)),
        't' => Some((FindKind::Till, true)),
        'T' => Some((FindKind::Till, false)),
        _ => None,
    }
}

/// `;` / `,`: the remembered find, reversed for `,`.
pub fn repeat_find(last: Option<FindMemory>, reverse: bool) -> Option<MotionKind> {
    let mut find = last?;
    if reverse {
        find.forward = !find.forward;
    }
    Some(MotionKind::Find(find))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Half-open `[start, end)`.
    Characterwise,
    /// Every line from `start.line` through `end.line`.
    Linewise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
    pub kind: SpanKind,
}

impl Span {
    pub fn chars(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            kind: SpanKind::Characterwise,
        }
    }

    pub fn lines(first: usize, last: usize) -> Self {
        Self {
            start: Position::new(first.min(last), 0),
            end: Position::new(first.max(last), 0),
            kind: SpanKind::Linewise,
        }
    }

    /// `(start, end)` with `start <= end`.
    pub fn ordered(&self) -> (Position, Position) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    pub fn line_range(&self) -> (usize, usize) {
        let (a, b) = self.ordered();
        (a.line, b.line)
    }
}

/// Where `kind` moves the cursor. `count` is `None` when no count was typed
/// (only `G`/`gg` care). `past_end` lets horizontal motions rest one past the
/// last character (Insert mode). `None` when the motion has no target.
pub fn motion_target(
    buf: &Buffer,
    cursor: Cursor,
    kind: MotionKind,
    count: Option<usize>,
    past_end: bool,
) -> Option<Position> {
    let n = count.unwrap_or(1).max(1);
    let pos = buf.clamp_position(cursor.position);
    let target = match kind {
        MotionKind::Left => motion::left(buf, pos, n),
        MotionKind::Right => motion::right(buf, pos, n, past_end),
        MotionKind::Up => motion::up(buf, pos, n, cursor.preferred_column, past_end),
        MotionKind::Down => motion::down(buf, pos, n, cursor.preferred_column, past_end),
        MotionKind::LineStart => motion::line_start(buf, pos),
        MotionKind::FirstNonBlank => motion::first_non_whitespace(buf, pos),
        MotionKind::LineEnd => {
            let line = pos.line.saturating_add(n - 1).min(buf.last_line());
            let end = motion::line_end(buf, Position::new(line, 0));
            if past_end {
                Position::new(line, buf.line_len(line))
            } else {
                end
            }
        }
        MotionKind::WordForward(w) => motion::next_word(buf, pos, n, w),
        MotionKind::WordBackward(w) => motion::previous_word(buf, pos, n, w),
        MotionKind::WordEnd(w) => motion::end_of_word(buf, pos, n, w),
        MotionKind::ParagraphForward => {
            motion::next_paragraph(buf, pos, cursor.preferred_column, n)
        }
        MotionKind::ParagraphBackward => {
            motion::previous_paragraph(buf, pos, cursor.preferred_column, n)
        }
        MotionKind::MatchBracket => motion::matching_bracket(buf, pos)?,
        MotionKind::FirstLine => motion::go_to_line(buf, count.map_or(0, |c| c.saturating_sub(1))),
        MotionKind::LastLine => {
            motion::go_to_line(buf, count.map_or(buf.last_line(), |c| c.saturating_sub(1)))
        }
        MotionKind::Find(find) => find_target(buf, pos, find, n)?,
    };
    Some(target)
}

fn find_target(buf: &Buffer, pos: Position, find: FindMemory, n: usize) -> Option<Position> {
    match (find.kind, find.forward) {
        (FindKind::Find, true) => motion::find_char_forward(buf, pos, find.target, n),
        (FindKind::Find, false) => motion::find_char_backward(buf, pos, find.target, n),
        (FindKind::Till, true) => motion::till_char_forward(buf, pos, find.target, n),
        (FindKind::Till, false) => motion::till_char_backward(buf, pos, find.target, n),
    }
}

/// The span operator `op` acts on for `kind` from `cursor`, or `None` when
/// the motion fails or covers nothing.
pub fn resolve_span(
    buf: &Buffer,
    cursor: Cursor,
    kind: MotionKind,
    count: Option<usize>,
    op: OperatorKind,
) -> Option<Span> {
    let pos = buf.clamp_position(cursor.position);
    let n = count.unwrap_or(1).max(1);
    let span = match kind {
        MotionKind::Up | MotionKind::Down => {
            let target = motion_target(buf, cursor, kind, count, false)?;
            if target.line == pos.line {
                return None;
            }
            Span::lines(pos.line, target.line)
        }
        MotionKind::FirstLine | MotionKind::LastLine => {
            let target = motion_target(buf, cursor, kind, count, false)?;
            Span::lines(pos.line, target.line)
        }
        MotionKind::WordForward(w) => {
            let on_non_blank = buf.char_at(pos).is_some_and(|c| !c.is_whitespace());
            if op == OperatorKind::Change && on_non_blank {
                let end = change_word_end(buf, pos, n, w);
                Span::chars(pos, after(buf, end))
            } else {
                let target = motion::next_word(buf, pos, n, w);
                let end = if target.line > pos.line {
                    Position::new(pos.line, buf.line_len(pos.line))
                } else {
                    target
                };
                Span::chars(pos, end)
            }
        }
        MotionKind::WordEnd(_) | MotionKind::MatchBracket => {
            let target = motion_target(buf, cursor, kind, count, false)?;
            let (a, b) = if target < pos { (target, pos) } else { (pos, target) };
            Span::chars(a, after(buf, b))
        }
        MotionKind::LineEnd => {
            let target = motion_target(buf, cursor, kind, count, true)?;
            Span::chars(pos, target)
        }
        MotionKind::Right => {
            let target = motion_target(buf, cursor, kind, count, true)?;
            Span::chars(pos, target)
        }
        MotionKind::Left
        | MotionKind::WordBackward(_)
        | MotionKind::LineStart
        | MotionKind::FirstNonBlank => {
            let target = motion_target(buf, cursor, kind, count, false)?;
            Span::chars(target, pos)
        }
        MotionKind::ParagraphForward => {
            let target = motion_target(buf, cursor, kind, count, false)?;
            // Landing on the first line of the next paragraph is exclusive;
            // running out of paragraphs takes the rest of the last line.
            let starts_paragraph = target.line > pos.line
                && !buf.is_blank_line(target.line)
                && buf.is_blank_line(target.line - 1);
            let end = if starts_paragraph {
                Position::new(target.line, 0)
            } else {
                Position::new(target.line, buf.line_len(target.line))
            };
            Span::chars(pos, end)
        }
        MotionKind::ParagraphBackward => {
            let target = motion_target(buf, cursor, kind, count, false)?;
            Span::chars(Position::new(target.line, 0), pos)
        }
        MotionKind::Find(find) => {
            let target = motion_target(buf, cursor, kind, count, false)?;
            if find.forward {
                Span::chars(pos, after(buf, target))
            } else {
                Span::chars(target, pos)
            }
        }
    };
    if span.kind == SpanKind::Characterwise && span.start == span.end {
        return None;
    }
    Some(span)
}

/// Span of `count` whole lines starting at the cursor line (`dd`, `yy`, `>>`).
pub fn line_span(buf: &Buffer, cursor: Position, count: usize) -> Span {
    let first = cursor.line.min(buf.last_line());
    let last = first.saturating_add(count.max(1) - 1).min(buf.last_line());
    Span::lines(first, last)
}

/// Column just after `pos`, clamped to the line end.
fn after(buf: &Buffer, pos: Position) -> Position {
    Position::new(pos.line, (pos.column + 1).min(buf.line_len(pos.line)))
}

/// `cw` end: the last character of the current word when the cursor is inside
/// it (even on its last character), then `count - 1` further word ends.
fn change_word_end(buf: &Buffer, pos: Position, count: usize, kind: WordKind) -> Position {
    let chars = buf.line_chars(pos.line);
    let class = classify(chars[pos.column], kind);
    let at_run_end = chars
        .get(pos.column + 1)
        .is_none_or(|&c| classify(c, kind) != class);
    let first = if at_run_end {
        pos
    } else {
        motion::end_of_word(buf, pos, 1, kind)
    };
    if count > 1 {
        motion::end_of_word(buf, first, count - 1, kind)
    } else {
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_text(buf: &Buffer, s: Span) -> String {
        buf.substring(s.start, s.end)
    }

    fn at(line: usize, column: usize) -> Cursor {
        Cursor::new(Position::new(line, column))
    }

    fn word(kind: fn(WordKind) -> MotionKind) -> MotionKind {
        kind(WordKind::Word)
    }

    #[test]
    fn dw_span_covers_word_and_space() {
        let buf = Buffer::from_text("hello world");
        let s = resolve_span(&buf, at(0, 0), word(MotionKind::WordForward), None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, s), "hello ");
    }

    #[test]
    fn dw_on_last_word_stops_at_line_end() {
        let buf = Buffer::from_text("one two\nthree");
        let s = resolve_span(&buf, at(0, 4), word(MotionKind::WordForward), None, OperatorKind::Delete).unwrap();
        assert_eq!(s.end, Position::new(0, 7));
        assert_eq!(span_text(&buf, s), "two");
    }

    #[test]
    fn cw_behaves_like_ce() {
        let buf = Buffer::from_text("foo bar");
        let s = resolve_span(&buf, at(0, 0), word(MotionKind::WordForward), None, OperatorKind::Change).unwrap();
        assert_eq!(span_text(&buf, s), "foo");
        let on_last = resolve_span(&buf, at(0, 2), word(MotionKind::WordForward), None, OperatorKind::Change).unwrap();
        assert_eq!(span_text(&buf, on_last), "o");
        let two = resolve_span(&buf, at(0, 0), word(MotionKind::WordForward), Some(2), OperatorKind::Change).unwrap();
        assert_eq!(span_text(&buf, two), "foo bar");
    }

    #[test]
    fn backward_motions_span_target_to_cursor() {
        let buf = Buffer::from_text("  alpha beta");
        let b = resolve_span(&buf, at(0, 8), word(MotionKind::WordBackward), None, OperatorKind::Delete).unwrap();
        assert_eq!((b.start, b.end), (Position::new(0, 2), Position::new(0, 8)));
        let zero = resolve_span(&buf, at(0, 4), MotionKind::LineStart, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, zero), "  al");
        let caret = resolve_span(&buf, at(0, 4), MotionKind::FirstNonBlank, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, caret), "al");
        assert_eq!(resolve_span(&buf, at(0, 0), MotionKind::LineStart, None, OperatorKind::Delete), None);
    }

    #[test]
    fn inclusive_motions_include_target() {
        let buf = Buffer::from_text("foo(bar) baz");
        let e = resolve_span(&buf, at(0, 0), word(MotionKind::WordEnd), None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, e), "foo");
        let dollar = resolve_span(&buf, at(0, 4), MotionKind::LineEnd, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, dollar), "bar) baz");
        let pct = resolve_span(&buf, at(0, 7), MotionKind::MatchBracket, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, pct), "(bar)");
        let f = MotionKind::Find(FindMemory { kind: FindKind::Find, forward: true, target: ')' });
        assert_eq!(span_text(&buf, resolve_span(&buf, at(0, 0), f, None, OperatorKind::Delete).unwrap()), "foo(bar)");
        let t = MotionKind::Find(FindMemory { kind: FindKind::Till, forward: true, target: ')' });
        assert_eq!(span_text(&buf, resolve_span(&buf, at(0, 0), t, None, OperatorKind::Delete).unwrap()), "foo(bar");
        let big_f = MotionKind::Find(FindMemory { kind: FindKind::Find, forward: false, target: '(' });
        assert_eq!(span_text(&buf, resolve_span(&buf, at(0, 9), big_f, None, OperatorKind::Delete).unwrap()), "(bar) ");
    }

    #[test]
    fn vertical_spans_are_linewise_or_nothing() {
        let buf = Buffer::from_text("a\nb\nc");
        let j = resolve_span(&buf, at(0, 0), MotionKind::Down, None, OperatorKind::Delete).unwrap();
        assert_eq!((j.kind, j.line_range()), (SpanKind::Linewise, (0, 1)));
        let k = resolve_span(&buf, at(2, 0), MotionKind::Up, Some(5), OperatorKind::Delete).unwrap();
        assert_eq!(k.line_range(), (0, 2));
        assert_eq!(resolve_span(&buf, at(2, 0), MotionKind::Down, None, OperatorKind::Delete), None);
        let g = resolve_span(&buf, at(1, 0), MotionKind::LastLine, None, OperatorKind::Yank).unwrap();
        assert_eq!(g.line_range(), (1, 2));
        let gg = resolve_span(&buf, at(1, 0), MotionKind::FirstLine, None, OperatorKind::Yank).unwrap();
        assert_eq!(gg.line_range(), (0, 1));
    }

    #[test]
    fn paragraph_spans() {
        let buf = Buffer::from_text("one\ntwo\n\nthree");
        let fwd = resolve_span(&buf, at(0, 1), MotionKind::ParagraphForward, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, fwd), "ne\ntwo\n\n");
        let from_blank = resolve_span(&buf, at(2, 0), MotionKind::ParagraphForward, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, from_blank), "\n");
        let single = Buffer::from_text("one\ntwo");
        let to_end = resolve_span(&single, at(0, 0), MotionKind::ParagraphForward, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&single, to_end), "one\ntwo");
        let last = resolve_span(&buf, at(3, 0), MotionKind::ParagraphForward, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, last), "three");
        let back = resolve_span(&buf, at(3, 2), MotionKind::ParagraphBackward, None, OperatorKind::Delete).unwrap();
        assert_eq!(span_text(&buf, back), "\nth");
    }

    #[test]
    fn unresolved_targets_give_none() {
        let buf = Buffer::from_text("abc");
        assert_eq!(resolve_span(&buf, at(0, 0), MotionKind::MatchBracket, None, OperatorKind::Delete), None);
        let f = MotionKind::Find(FindMemory { kind: FindKind::Find, forward: true, target: 'z' });
        assert_eq!(resolve_span(&buf, at(0, 0), f, None, OperatorKind::Delete), None);
    }

    #[test]
    fn line_span_clamps_count() {
        let buf = Buffer::from_text("a\nb");
        assert_eq!(line_span(&buf, Position::new(1, 0), 9).line_range(), (1, 1));
        assert_eq!(line_span(&buf, Position::new(0, 0), 2).line_range(), (0, 1));
    }

    #[test]
    fn targets_for_plain_movement() {
        let buf = Buffer::from_text("one\ntwo\nthree");
        let c = at(0, 1);
        assert_eq!(motion_target(&buf, c, MotionKind::LastLine, None, false), Some(Position::new(2, 0)));
        assert_eq!(motion_target(&buf, c, MotionKind::LastLine, Some(2), false), Some(Position::new(1, 0)));
        assert_eq!(motion_target(&buf, c, MotionKind::FirstLine, Some(3), false), Some(Position::new(2, 0)));
        assert_eq!(motion_target(&buf, c, MotionKind::LineEnd, Some(3), false), Some(Position::new(2, 4)));
        assert_eq!(repeat_find(None, false), None);
        let f = FindMemory { kind: FindKind::Till, forward: true, target: 'x' };
        assert_eq!(
            repeat_find(Some(f), true),
            Some(MotionKind::Find(FindMemory { forward: false, ..f }))
        );
    }
}
