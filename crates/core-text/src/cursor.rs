//! Cursor with sticky ("preferred") column.

use crate::Position;

/// Sentinel preferred column meaning "end of whatever line we land on" (`$`).
pub const END_OF_LINE: usize = usize::MAX;

/// Cursor position plus the column vertical motions try to restore.
///
/// Horizontal movement and edits go through `set`, which re-syncs the
/// preferred column. Vertical movement goes through `set_vertical`, which
/// leaves it alone so a trip through a short line does not lose the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub position: Position,
    pub preferred_column: usize,
}

impl Cursor {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            preferred_column: position.column,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// Move horizontally (or jump); the preferred column follows.
    pub fn set(&mut self, position: Position) {
        self.position = position;
        self.preferred_column = position.column;
    }

    /// Move vertically; the preferred column is kept.
    pub fn set_vertical(&mut self, position: Position) {
        self.position = position;
    }

    /// Move and remember "end of line" as the preferred column.
    pub fn set_end_of_line(&mut self, position: Position) {
        self.position = position;
        self.preferred_column = END_OF_LINE;
    }
}
