//! Snapshot undo.
//!
//! Each snapshot is the whole buffer plus the cursor. Buffers share their
//! unchanged lines through `Arc`, so a snapshot costs one map of pointers.
//! The log is bounded; the oldest entries fall off silently.

use core_text::{PositionModel, TextBuffer};
use thiserror::Error;
use tracing::trace;

/// Snapshots retained when no capacity is configured.
pub const DEFAULT_UNDO_CAPACITY: usize = 8192;

/// Buffer and cursor as they were before an edit. Cloning a buffer shares
/// its unchanged lines, so holding thousands of these stays cheap.
#[derive(Clone, Debug)]
pub struct EditSnapshot {
    pub buffer: TextBuffer,
    pub position: PositionModel,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoError {
    #[error("nothing to undo")]
    NothingToUndo,
}

/// Fixed-capacity circular log of snapshots.
///
/// `snapshot` writes at the current index and advances; `restore` steps back
/// and returns that slot. Once more than `capacity` snapshots have been taken
/// the oldest ones are overwritten and can no longer be restored. There is no
/// redo: a snapshot taken after a restore overwrites the slot it came from.
#[derive(Debug)]
pub struct UndoLog {
    slots: Vec<EditSnapshot>,
    capacity: usize,
    index: usize,
    count: usize,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoLog {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::new(),
            capacity,
            index: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshots that can still be restored.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Slot the next snapshot is written to.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn snapshot(&mut self, buffer: &TextBuffer, position: &PositionModel) {
        let snap = EditSnapshot {
            buffer: buffer.clone(),
            position: *position,
        };
        if self.index < self.slots.len() {
            self.slots[self.index] = snap;
        } else {
            self.slots.push(snap);
        }
        self.index = (self.index + 1) % self.capacity;
        self.count = (self.count + 1).min(self.capacity);
        trace!(target: "state.undo", index = self.index, count = self.count, lines = buffer.len(), "push_snapshot");
    }

    pub fn restore(&mut self) -> Result<EditSnapshot, UndoError> {
        if self.count == 0 {
            trace!(target: "state.undo", "undo_underflow");
            return Err(UndoError::NothingToUndo);
        }
        self.index = (self.index + self.capacity - 1) % self.capacity;
        self.count -= 1;
        trace!(target: "state.undo", index = self.index, count = self.count, "restore_snapshot");
        Ok(self.slots[self.index].clone())
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index = 0;
        self.count = 0;
        trace!(target: "state.undo", "undo_cleared");
    }
}
