//! Literal pattern search over a `Buffer`, wrapping around the document.
//!
//! Matches never span a line break. The incremental-search UI (highlighting,
//! restoring the cursor on cancel) lives outside the core and calls these once
//! per update.

use crate::{Buffer, Position};

/// Char-column offsets of every occurrence of `pattern` in `line`.
fn columns_of(line: &str, pattern: &str) -> Vec<usize> {
    let mut columns = Vec::new();
    let (mut byte, mut column) = (0, 0);
    for (start, _) in line.match_indices(pattern) {
        column += line[byte..start].chars().count();
        byte = start;
        columns.push(column);
    }
    columns
}

/// Every match of `pattern` in document order. Empty for an empty pattern or
/// one containing a line break.
pub fn all_matches(buf: &Buffer, pattern: &str) -> Vec<Position> {
    if pattern.is_empty() || pattern.contains('\n') {
        return Vec::new();
    }
    buf.lines()
        .iter()
        .enumerate()
        .flat_map(|(line, text)| {
            columns_of(text, pattern)
                .into_iter()
                .map(move |column| Position::new(line, column))
        })
        .collect()
}

/// The `count`-th match strictly after (`forward`) or before `from`,
/// wrapping around the document. A match at `from` itself is only reached
/// after a full wrap. Counts larger than the number of matches go round the
/// cycle again.
pub fn find_nth(
    buf: &Buffer,
    from: Position,
    pattern: &str,
    forward: bool,
    count: usize,
) -> Option<Position> {
    let matches = all_matches(buf, pattern);
    let total = matches.len();
    if total == 0 {
        return None;
    }
    let from = buf.clamp_position(from);
    let steps = (count.max(1) - 1) % total;
    let index = if forward {
        let first = matches.partition_point(|&m| m <= from) % total;
        (first + steps) % total
    } else {
        let first = (matches.partition_point(|&m| m < from) + total - 1) % total;
        (first + total - steps) % total
    };
    matches.get(index).copied()
}
