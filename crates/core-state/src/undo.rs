use core_text::Position;
use tracing::trace;

/// Default bound on retained undo snapshots.
pub const DEFAULT_UNDO_DEPTH: usize = 1000;

/// Whole-document snapshot: full text plus the cursor at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoState {
    pub text: String,
    pub cursor: Position,
}

impl UndoState {
    pub fn new(text: impl Into<String>, cursor: Position) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }
}

/// Insert run tracking. While a run is active every insert-mode mutation
/// shares the snapshot taken at the run's first edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertRun {
    Inactive,
    Active { edits: u32 },
}

#[derive(Debug, Clone)]
pub struct UndoEngine {
    undo_stack: Vec<UndoState>,
    redo_stack: Vec<UndoState>,
    max_depth: usize,
    insert_run: InsertRun,
    /// Snapshots skipped because they matched the top of the stack.
    snapshots_skipped: u64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_UNDO_DEPTH)
    }

    /// Engine retaining at most `max_depth` undo snapshots (minimum 1).
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            insert_run: InsertRun::Inactive,
            snapshots_skipped: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn insert_run(&self) -> InsertRun {
        self.insert_run
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }

    /// Record the pre-edit state. Skips the push when the top of the stack is
    /// identical, evicts the oldest entry past `max_depth`, and always clears
    /// the redo stack.
    pub fn save_state(&mut self, state: UndoState) {
        if self.undo_stack.last() == Some(&state) {
            self.snapshots_skipped += 1;
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "snapshot_dedupe_skip");
        } else {
            let bytes = state.text.len();
            self.undo_stack.push(state);
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), bytes, "push_snapshot");
            if self.undo_stack.len() > self.max_depth {
                let overflow = self.undo_stack.len() - self.max_depth;
                self.undo_stack.drain(..overflow);
                trace!(target: "state.undo", max_depth = self.max_depth, "undo_stack_trimmed");
            }
        }
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
    }

    /// Pop the newest snapshot, parking `current` on the redo stack.
    pub fn undo(&mut self, current: UndoState) -> Option<UndoState> {
        let last = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        Some(last)
    }

    /// Mirror of `undo`.
    pub fn redo(&mut self, current: UndoState) -> Option<UndoState> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        Some(next)
    }

    /// Start a coalesced insert run, snapshotting `state` if none is active.
    /// Returns `true` when a new run (and snapshot) began.
    pub fn begin_insert_run(&mut self, state: UndoState) -> bool {
        match self.insert_run {
            InsertRun::Inactive => {
                self.save_state(state);
                self.insert_run = InsertRun::Active { edits: 0 };
                trace!(target: "state.undo", "insert_run_begin");
                true
            }
            InsertRun::Active { .. } => false,
        }
    }

    /// Open a run without a snapshot of its own. Used when the edit that
    /// entered Insert mode (`c`, `o`) already saved one.
    pub fn join_insert_run(&mut self) {
        if self.insert_run == InsertRun::Inactive {
            self.insert_run = InsertRun::Active { edits: 0 };
            trace!(target: "state.undo", "insert_run_joined");
        }
    }

    pub fn note_insert_edit(&mut self) {
        if let InsertRun::Active { edits } = &mut self.insert_run {
            *edits += 1;
        }
    }

    pub fn end_insert_run(&mut self) {
        if let InsertRun::Active { edits } = self.insert_run {
            trace!(target: "state.undo", edits, "insert_run_end");
        }
        self.insert_run = InsertRun::Inactive;
    }
}
