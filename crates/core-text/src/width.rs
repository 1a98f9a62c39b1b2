//! Display width of line prefixes, for status facts and external renderers.
//!
//! All width decisions go through `char_width` so the tab policy lives in one
//! place. Grapheme clustering is left to the renderer; here each scalar value
//! is measured on its own with `unicode-width` (combining marks count zero).

use unicode_width::UnicodeWidthChar;

/// Tab stop used when measuring `'\t'`.
pub const TAB_STOP: usize = 8;

/// Terminal cells occupied by `c` when it starts at visual column `col`.
pub fn char_width(c: char, col: usize) -> usize {
    if c == '\t' {
        TAB_STOP - (col % TAB_STOP)
    } else {
        c.width().unwrap_or(0)
    }
}

/// Visual column (terminal cells) at which character index `column` of `line`
/// starts. Columns past the end measure the whole line.
pub fn display_column(line: &str, column: usize) -> usize {
    line.chars()
        .take(column)
        .fold(0, |col, c| col + char_width(c, col))
}

/// Total display width of `s`.
pub fn display_width(s: &str) -> usize {
    display_column(s, usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_wide() {
        assert_eq!(display_column("abc", 2), 2);
        assert_eq!(display_column("漢字x", 2), 4);
        assert_eq!(display_width("漢字x"), 5);
    }

    #[test]
    fn combining_mark_is_zero_width() {
        assert_eq!(display_width("e\u{0301}"), 1);
    }

    #[test]
    fn tabs_advance_to_next_stop() {
        assert_eq!(display_column("\tx", 1), 8);
        assert_eq!(display_column("ab\tx", 3), 8);
        assert_eq!(display_column("ab\tx", 4), 9);
    }

    #[test]
    fn past_end_measures_whole_line() {
        assert_eq!(display_column("ab", 10), 2);
    }
}
