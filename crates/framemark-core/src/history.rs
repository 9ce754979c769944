//! Snapshot-based undo/redo over the element set.

use crate::element::Element;

/// A sequence of full element-set copies plus a cursor.
///
/// Snapshot 0 is the initial state (empty, or seeded from a restored
/// draft). Committing while the cursor is not at the end discards the redo
/// branch first. Full copies are a deliberate trade of space for
/// simplicity, governed by expected drawing-session scale.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Vec<Element>>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Start with a single empty snapshot.
    pub fn new() -> Self {
        Self {
            snapshots: vec![Vec::new()],
            cursor: 0,
        }
    }

    /// Start with a seeded initial snapshot (restored draft).
    pub fn seeded(initial: Vec<Element>) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
        }
    }

    /// Record a new element-set state, truncating any redo branch.
    pub fn commit(&mut self, elements: Vec<Element>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(elements);
        self.cursor += 1;
    }

    /// Step back and return the snapshot to restore; `None` at the lower
    /// bound.
    pub fn undo(&mut self) -> Option<&[Element]> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward and return the snapshot to restore; `None` at the upper
    /// bound.
    pub fn redo(&mut self) -> Option<&[Element]> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }
}
