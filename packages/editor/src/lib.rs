//! # Tenon Editor
//!
//! Core program editing engine for Tenon.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ program: node model + slot schema           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: ProgramStore + edits                │
//! │  - Open/save programs                       │
//! │  - Validate inserts/moves against the schema│
//! │  - Persistent forest, snapshot undo/redo    │
//! │  - Write-through persistence                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ wasm: session facade for the frontend       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Forest is source of truth**: the UI renders whatever the store holds
//! 2. **Persistent values**: edits build new trees sharing untouched subtrees
//! 3. **Schema-validated**: a node lands in a slot only if the slot accepts it
//! 4. **Forgiving by id**: edits naming vanished nodes are no-ops, not errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tenon_editor::{Placement, ProgramStore, SlotId};
//! use tenon_program::NodeKind;
//!
//! // Open a program (falls back to the blank one)
//! let mut store = ProgramStore::open("sketch.json".into());
//!
//! // Drop a repeat block at the top of the program
//! let repeat_id = store.create(NodeKind::Repeat, None, Placement::Append)?;
//!
//! // Put a print inside it
//! store.create(
//!     NodeKind::Print,
//!     Some(&repeat_id),
//!     Placement::Insert { slot: SlotId::Components },
//! )?;
//!
//! // Take it back
//! store.undo();
//! ```

mod edits;
mod store;
mod undo_stack;

pub use edits::{contains, emplace, find, move_node, remove, update_fields};
pub use edits::{EditError, FieldPatch, Placement};
pub use store::{ProgramStore, StoreBacking, StoreError};
pub use undo_stack::UndoStack;

// Re-export common types for convenience
pub use tenon_program::program::{Ast, Canvas, Program};
pub use tenon_program::schema::{NodeKind, SlotId};
