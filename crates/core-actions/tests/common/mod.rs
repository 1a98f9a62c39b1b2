#![allow(dead_code)] // Shared across the integration tests; each binary uses a subset.

use core_actions::Editor;

pub fn editor(text: &str) -> Editor {
    Editor::from_text(text)
}

/// Load `text`, feed `keys` (vi notation) and return the session.
pub fn run(text: &str, keys: &str) -> Editor {
    let mut ed = editor(text);
    ed.feed_keys(keys).expect("valid key notation");
    ed
}

pub fn lines(ed: &Editor) -> Vec<String> {
    ed.state().buffer.lines().to_vec()
}

pub fn cursor(ed: &Editor) -> (usize, usize) {
    let pos = ed.state().position();
    (pos.line, pos.column)
}
