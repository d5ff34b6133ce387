//! # Undo/Redo Stack
//!
//! Tracks forest history and enables undo/redo.
//!
//! ## Design
//!
//! - Every successful edit pushes the pre-edit forest
//! - Snapshots are cheap: the forest is persistent, so a snapshot is a
//!   vector of `Arc`s sharing every node with the live tree
//! - Undo swaps the live forest for the snapshot and keeps the live one
//!   for redo
//! - New edits clear the redo stack

use tenon_program::program::Ast;

/// Undo/redo stack over forest snapshots.
#[derive(Debug)]
pub struct UndoStack {
    /// Snapshots to restore on undo (most recent last)
    undo_stack: Vec<Ast>,

    /// Snapshots to restore on redo (most recent last)
    redo_stack: Vec<Ast>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record the pre-edit forest. New history invalidates redo.
    pub fn push(&mut self, snapshot: Ast) {
        self.undo_stack.push(snapshot);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Swap `live` for the most recent snapshot.
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, live: &mut Ast) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                self.redo_stack.push(std::mem::replace(live, snapshot));
                true
            }
            None => false,
        }
    }

    /// Swap `live` for the most recently undone forest.
    ///
    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, live: &mut Ast) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                self.undo_stack.push(std::mem::replace(live, snapshot));
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
