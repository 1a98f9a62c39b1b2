mod common;

use common::{cursor, editor, lines, run};
use core_actions::text_object;
use core_state::RegisterContent;
use core_text::{Buffer, Position, motion};
use pretty_assertions::assert_eq;

#[test]
fn dw_deletes_first_word_and_its_space() {
    let ed = run("hello world", "dw");
    assert_eq!(ed.text(), "world");
    assert_eq!(cursor(&ed), (0, 0));
    assert_eq!(
        ed.state().registers.unnamed(),
        Some(&RegisterContent::Characters("hello ".into()))
    );
}

#[test]
fn counted_dd_empties_the_document() {
    let ed = run("one\ntwo\nthree", "3dd");
    assert_eq!(lines(&ed), [""]);
    assert_eq!(
        ed.state().registers.unnamed(),
        Some(&RegisterContent::Lines(vec![
            "one".into(),
            "two".into(),
            "three".into()
        ]))
    );
}

#[test]
fn outer_bracket_matches_last_column() {
    let buf = Buffer::from_text("(a(b)c)");
    assert_eq!(
        motion::matching_bracket(&buf, Position::new(0, 0)),
        Some(Position::new(0, 6))
    );
    let ed = run("(a(b)c)", "%");
    assert_eq!(cursor(&ed), (0, 6));
    assert_eq!(ed.status().matching_bracket, Some(Position::new(0, 0)));
}

#[test]
fn inner_quotes_cover_the_string_body() {
    let buf = Buffer::from_text("say \"hi\" now");
    let range = text_object::inner_quotes(&buf, Position::new(0, 5), '"').unwrap();
    assert_eq!((range.start, range.end), (Position::new(0, 5), Position::new(0, 7)));
    let ed = run("say \"hi\" now", "fhdi\"");
    assert_eq!(ed.text(), "say \"\" now");
}

#[test]
fn undo_on_fresh_buffer_reports_oldest_change() {
    let mut ed = editor("");
    ed.feed_keys("u").unwrap();
    assert_eq!(ed.text(), "");
    assert_eq!(ed.status().message.as_deref(), Some("already at oldest change"));
    ed.feed_keys("<C-r>").unwrap();
    assert_eq!(ed.status().message.as_deref(), Some("already at newest change"));
}

#[test]
fn insert_then_backspace_round_trips() {
    let mut buf = Buffer::from_text("abc");
    let mut pos = Position::new(0, 1);
    buf.insert_char(&mut pos, 'x');
    assert_eq!(buf.text(), "axbc");
    assert_eq!(pos, Position::new(0, 2));
    buf.delete_backward(&mut pos);
    assert_eq!(buf.text(), "abc");

    let ed = run("abc", "lix");
    assert_eq!(ed.text(), "axbc");
    let ed = run("abc", "lix<BS><Esc>");
    assert_eq!(ed.text(), "abc");
}

#[test]
fn undo_and_redo_restore_text_and_cursor() {
    let mut ed = run("hello world", "wdw");
    assert_eq!(ed.text(), "hello ");
    ed.feed_keys("u").unwrap();
    assert_eq!(ed.text(), "hello world");
    assert_eq!(cursor(&ed), (0, 6));
    ed.feed_keys("<C-r>").unwrap();
    assert_eq!(ed.text(), "hello ");
}

#[test]
fn undoing_an_append_clamps_the_cursor() {
    let mut ed = run("abc", "A!<Esc>");
    assert_eq!(cursor(&ed), (0, 3));
    ed.feed_keys("u").unwrap();
    assert_eq!(ed.text(), "abc");
    assert_eq!(cursor(&ed), (0, 2));
    ed.feed_keys("<C-r>").unwrap();
    assert_eq!(ed.text(), "abc!");
    assert_eq!(cursor(&ed), (0, 3));
}

#[test]
fn yank_delete_put_reproduces_text() {
    let ed = run("hello world", "ywdwP");
    assert_eq!(ed.text(), "hello world");
}

#[test]
fn twenty_digit_counts_complete() {
    const HUGE: &str = "99999999999999999999";

    let ed = run("abc", &format!("yl{HUGE}p"));
    let len = ed.text().chars().count();
    assert!(ed.text().starts_with("aaa"));
    assert!(len > 3 && len <= 3 + (1 << 20));
    assert_eq!(ed.state().buffer.line_count(), 1);

    let mut ed = run("one\ntwo", &format!("yy{HUGE}P"));
    let count = ed.state().buffer.line_count();
    assert!(count > 2 && count <= 2 + (1 << 20));
    assert_eq!(cursor(&ed), (0, 0));
    ed.feed_keys(&format!("{HUGE}J")).unwrap();
    assert_eq!(ed.state().buffer.line_count(), 1);
    assert!(ed.text().ends_with("one one two"));
    let width = ed.state().buffer.line_len(0);
    ed.feed_keys(&format!("0{HUGE}w")).unwrap();
    assert_eq!(cursor(&ed), (0, width - 1));
    ed.feed_keys(&format!("{HUGE}b")).unwrap();
    assert_eq!(cursor(&ed), (0, 0));
    ed.feed_keys("u").unwrap();
    assert_eq!(ed.state().buffer.line_count(), count);
    ed.feed_keys(&format!("{HUGE}dd")).unwrap();
    assert_eq!(lines(&ed), [""]);

    let mut ed = editor("a\n\nb");
    ed.feed_keys(&format!("{HUGE}}}")).unwrap();
    assert_eq!(cursor(&ed), (2, 0));
    ed.feed_keys(&format!("{HUGE}{{")).unwrap();
    assert_eq!(cursor(&ed), (0, 0));
    ed.feed_keys(&format!("{HUGE}d}}")).unwrap();
    assert_eq!(ed.text(), "b");

    let mut ed = editor("x a\na");
    ed.feed_keys("/a<CR>").unwrap();
    assert_eq!(cursor(&ed), (0, 2));
    ed.feed_keys(&format!("{HUGE}n")).unwrap();
    assert_eq!(cursor(&ed), (1, 0));
    ed.feed_keys(&format!("{HUGE}N")).unwrap();
    assert_eq!(cursor(&ed), (0, 2));
    assert_eq!(ed.text(), "x a\na");
}
