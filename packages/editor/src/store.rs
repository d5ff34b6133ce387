//! # Program Store
//!
//! Single-writer editing session around one program.
//!
//! A store owns the live [`Program`], its undo history and its id
//! generator. Stores can be:
//! - **Memory-backed**: scratch programs, tests
//! - **File-backed**: persisted back to disk after every successful edit
//!
//! ## Lifecycle
//!
//! ```text
//! Open → Edit → Undo/Redo → Persist
//!   ↓      ↓        ↓          ↓
//! File  Forest  Snapshots    File
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use tenon_program::ast::Node;
use tenon_program::factory;
use tenon_program::id_generator::{get_program_id, IDGenerator};
use tenon_program::program::{Ast, Canvas, Program};
use tenon_program::schema::NodeKind;

use crate::edits::{self, EditError, FieldPatch, Placement};
use crate::undo_stack::UndoStack;

/// Storage backend for a program
#[derive(Debug)]
pub enum StoreBacking {
    /// In-memory only (scratch programs, tests)
    Memory,

    /// File-backed (persisted after every successful edit)
    File { path: PathBuf, dirty: bool },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed program: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),

    #[error("Store is not file-backed")]
    NotFileBacked,
}

/// Editable program with history and persistence.
pub struct ProgramStore {
    program: Program,
    backing: StoreBacking,
    history: UndoStack,
    ids: IDGenerator,
}

impl ProgramStore {
    /// Create a memory-backed store.
    pub fn in_memory(program: Program) -> Self {
        Self::with_backing(program, StoreBacking::Memory)
    }

    /// Open a file-backed store.
    ///
    /// A missing or malformed file falls back to the blank program, the
    /// same way the frontend recovers from cleared or corrupt storage.
    pub fn open(path: PathBuf) -> Self {
        let program = match std::fs::read_to_string(&path) {
            Ok(source) => match Program::from_json(&source) {
                Ok(program) => program,
                Err(error) => {
                    tracing::warn!(%error, path = %path.display(), "stored program is malformed, starting blank");
                    Program::default()
                }
            },
            Err(error) => {
                tracing::debug!(%error, path = %path.display(), "no stored program, starting blank");
                Program::default()
            }
        };

        Self::with_backing(program, StoreBacking::File { path, dirty: false })
    }

    fn with_backing(program: Program, backing: StoreBacking) -> Self {
        // resume the id counter past every persisted id
        let mut ids = IDGenerator::new(get_program_id(&program.name));
        for root in &program.ast {
            advance_all(root, &mut ids);
        }

        Self {
            program,
            backing,
            history: UndoStack::new(),
            ids,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn ast(&self) -> &Ast {
        &self.program.ast
    }

    pub fn find(&self, id: &str) -> Option<&Arc<Node>> {
        edits::find(&self.program.ast, id)
    }

    /// Replace the whole program, resetting history and the id counter.
    pub fn load(&mut self, program: Program) {
        let mut ids = IDGenerator::new(get_program_id(&program.name));
        for root in &program.ast {
            advance_all(root, &mut ids);
        }

        self.program = program;
        self.ids = ids;
        self.history.clear();
        self.autosave();
    }

    /// Insert a fresh palette node at the destination, returning its id.
    ///
    /// The node only lands if the destination still exists; the returned
    /// id can be checked with [`ProgramStore::find`].
    pub fn create(
        &mut self,
        kind: NodeKind,
        destination_id: Option<&str>,
        placement: Placement,
    ) -> Result<String, EditError> {
        let node = factory::create(kind, &mut self.ids);
        let id = node.id().to_string();
        self.insert(node, destination_id, placement)?;
        Ok(id)
    }

    /// Insert `node` and its subtree at the destination.
    pub fn insert(
        &mut self,
        node: Arc<Node>,
        destination_id: Option<&str>,
        placement: Placement,
    ) -> Result<(), EditError> {
        let next = edits::emplace(&self.program.ast, node, destination_id, placement)
            .map_err(|error| {
                tracing::warn!(%error, "insert rejected");
                error
            })?;
        self.commit(next);
        Ok(())
    }

    /// Remove the node with `id` and its subtree.
    pub fn remove(&mut self, id: &str) {
        if self.find(id).is_none() {
            tracing::debug!(id, "remove target not found, skipping");
            return;
        }
        let next = edits::remove(&self.program.ast, id);
        self.commit(next);
    }

    /// Patch scalar fields on the node with `id`.
    pub fn update_fields(&mut self, id: &str, patch: &FieldPatch) {
        if patch.is_empty() {
            return;
        }
        if self.find(id).is_none() {
            tracing::debug!(id, "update target not found, skipping");
            return;
        }
        let next = edits::update_fields(&self.program.ast, id, patch);
        self.commit(next);
    }

    /// Relocate a node and its subtree to a new destination.
    pub fn move_node(
        &mut self,
        id: &str,
        destination_id: Option<&str>,
        placement: Placement,
    ) -> Result<(), EditError> {
        let next = edits::move_node(&self.program.ast, id, destination_id, placement).map_err(
            |error| {
                tracing::warn!(%error, id, "move rejected");
                error
            },
        )?;
        self.commit(next);
        Ok(())
    }

    /// Restore the forest before the most recent edit.
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.program.ast);
        if undone {
            self.autosave();
        }
        undone
    }

    /// Restore the most recently undone forest.
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.program.ast);
        if redone {
            self.autosave();
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Resize the drawing canvas. Not part of the undo history.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.program.canvas = Canvas { width, height };
        self.autosave();
    }

    /// Check for unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.backing {
            StoreBacking::File { dirty, .. } => *dirty,
            _ => false,
        }
    }

    /// Serialize the program to the backing file.
    pub fn save(&mut self) -> Result<(), StoreError> {
        match &mut self.backing {
            StoreBacking::File { path, dirty } => {
                let json = self.program.to_json_pretty()?;
                std::fs::write(&path, json)?;
                *dirty = false;
                Ok(())
            }
            StoreBacking::Memory => Err(StoreError::NotFileBacked),
        }
    }

    // History pushes only when the forest actually changed, so no-op
    // edits never pollute the undo stack.
    fn commit(&mut self, next: Ast) {
        if next == self.program.ast {
            return;
        }
        let previous = std::mem::replace(&mut self.program.ast, next);
        self.history.push(previous);
        self.autosave();
    }

    // Write-through persistence; failures keep the change in memory.
    fn autosave(&mut self) {
        if let StoreBacking::File { dirty, .. } = &mut self.backing {
            *dirty = true;
        } else {
            return;
        }
        if let Err(error) = self.save() {
            tracing::warn!(%error, "autosave failed, keeping changes in memory");
        }
    }
}

fn advance_all(node: &Node, ids: &mut IDGenerator) {
    ids.advance_past(node.id());
    for child in node.children() {
        advance_all(child, ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenon_program::schema::SlotId;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = ProgramStore::in_memory(Program::default());
        assert!(store.find("2").is_some());

        store.remove("2");
        assert!(store.find("2").is_none());
        assert!(store.can_undo());

        assert!(store.undo());
        assert!(store.find("2").is_some());

        assert!(store.redo());
        assert!(store.find("2").is_none());
    }

    #[test]
    fn test_create_mints_ids_past_loaded_ones() {
        let mut store = ProgramStore::in_memory(Program::default());
        let id = store
            .create(NodeKind::ClearScreen, None, Placement::Append)
            .unwrap();

        let node = store.find(&id).expect("created node should be present");
        assert_eq!(node.kind(), NodeKind::ClearScreen);
        // loaded ids ("1", "2") come from another seed and stay untouched
        assert!(id.contains('-'));
    }

    #[test]
    fn test_noop_edits_leave_no_history() {
        let mut store = ProgramStore::in_memory(Program::default());
        store.remove("missing");
        store.update_fields("also-missing", &FieldPatch::default());
        store
            .insert(
                factory::create(NodeKind::Print, &mut IDGenerator::new("x".to_string())),
                Some("missing"),
                Placement::Append,
            )
            .unwrap();
        assert!(!store.can_undo());
    }

    #[test]
    fn test_save_requires_file_backing() {
        let mut store = ProgramStore::in_memory(Program::default());
        assert!(matches!(store.save(), Err(StoreError::NotFileBacked)));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_rejected_edit_surfaces_error() {
        let mut store = ProgramStore::in_memory(Program::default());
        let result = store.create(
            NodeKind::Literal,
            Some("1"),
            Placement::Insert {
                slot: SlotId::Lvalue,
            },
        );
        assert!(matches!(result, Err(EditError::UnknownSlot { .. })));
        assert!(!store.can_undo());
    }
}
