//! # Program Edits
//!
//! High-level semantic operations on the program forest.
//!
//! ## Design Principles
//!
//! 1. **Persistent**: every operation returns a new forest; untouched
//!    subtrees are shared with the input via `Arc`
//! 2. **Validated**: insertion and move check the slot rules before any
//!    structural change
//! 3. **Forgiving**: edits aimed at nodes that no longer exist are
//!    silent no-ops, absorbing stale drags from the frontend
//! 4. **Total where possible**: removal and field updates cannot fail
//!
//! ## Edit Semantics
//!
//! ### Remove
//! - Detaches the node and its whole subtree
//! - Statement sequences close the gap; list cells empty in place
//! - Absent targets leave the forest untouched
//!
//! ### Emplace
//! - Validates the destination slot against the schema, then writes
//! - `Prepend`/`Append` splice around a destination statement
//! - No destination means the program root; a destination that no
//!   longer exists is a silent no-op
//! - Rejects ids already present in the forest
//!
//! ### Move
//! - Remove + emplace, validated before the node is detached
//! - Fails if it would create a cycle
//! - A rejected move loses nothing

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use tenon_program::ast::{Node, Primitive, PrimitiveKind, SlotMut};
use tenon_program::program::Ast;
use tenon_program::schema::{self, NodeKind, SlotId};

/// Where an emplaced node lands relative to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum Placement {
    /// Before the destination statement in its sequence
    Prepend,
    /// After the destination statement in its sequence
    Append,
    /// Into a named slot of the destination
    Insert { slot: SlotId },
}

/// Scalar fields an update may patch, all optional.
///
/// Present fields overwrite, absent fields keep their value. A field the
/// target's kind does not carry is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive: Option<PrimitiveKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Primitive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.primitive.is_none()
            && self.value.is_none()
            && self.definition_id.is_none()
            && self.text.is_none()
    }

    fn apply_to(&self, node: &mut Node) {
        match node {
            Node::Definition {
                name, primitive, ..
            } => {
                if let Some(new_name) = &self.name {
                    *name = new_name.clone();
                }
                if let Some(new_primitive) = self.primitive {
                    *primitive = new_primitive;
                }
            }
            Node::Literal { value, .. } => {
                if let Some(new_value) = &self.value {
                    *value = Some(new_value.clone());
                }
            }
            Node::Variable { definition_id, .. } => {
                if let Some(new_definition) = &self.definition_id {
                    *definition_id = new_definition.clone();
                }
            }
            Node::Comment { text, .. } => {
                if let Some(new_text) = &self.text {
                    *text = new_text.clone();
                }
            }
            _ => {}
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Node {candidate} does not fit slot {slot} of {target}")]
    SlotRejected {
        target: NodeKind,
        slot: SlotId,
        candidate: NodeKind,
    },

    #[error("No slot named {slot} on {target}")]
    UnknownSlot { target: NodeKind, slot: SlotId },

    #[error("Not a statement")]
    NotAStatement,

    #[error("Cannot place statements relative to an expression")]
    ExpressionDestination,

    #[error("List cell {index} is out of range")]
    CellOutOfRange { index: usize },

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Would create cycle")]
    CycleDetected,
}

/// Locates a node anywhere in the forest.
pub fn find<'a>(ast: &'a Ast, id: &str) -> Option<&'a Arc<Node>> {
    ast.iter().find_map(|root| find_in(root, id))
}

fn find_in<'a>(node: &'a Arc<Node>, id: &str) -> Option<&'a Arc<Node>> {
    if node.id() == id {
        return Some(node);
    }
    node.children()
        .into_iter()
        .find_map(|child| find_in(child, id))
}

/// Whether `id` names `node` or anything beneath it.
pub fn contains(node: &Node, id: &str) -> bool {
    node.id() == id || node.children().iter().any(|child| contains(child, id))
}

/// Removes the node with `id` and its subtree.
///
/// Statement sequences close the gap around the removed statement; a
/// removed list cell empties in place so its siblings keep their
/// positions. An absent id returns the forest unchanged.
pub fn remove(ast: &Ast, id: &str) -> Ast {
    ast.iter()
        .filter(|root| root.id() != id)
        .map(|root| remove_in(root, id))
        .collect()
}

fn remove_in(node: &Arc<Node>, id: &str) -> Arc<Node> {
    // untouched subtrees are handed back shared
    if !contains(node, id) {
        return Arc::clone(node);
    }

    let mut next = Arc::clone(node);
    let inner = Arc::make_mut(&mut next);
    for (_, slot) in inner.slots_mut() {
        match slot {
            SlotMut::Single(child) => {
                if child.as_ref().map_or(false, |c| c.id() == id) {
                    *child = None;
                } else if let Some(c) = child {
                    *c = remove_in(c, id);
                }
            }
            SlotMut::Statements(seq) => {
                if let Some(pos) = seq.iter().position(|c| c.id() == id) {
                    seq.remove(pos);
                } else {
                    for child in seq.iter_mut() {
                        *child = remove_in(child, id);
                    }
                }
            }
            SlotMut::Items(cells) => {
                for cell in cells.iter_mut() {
                    if cell.as_ref().map_or(false, |c| c.id() == id) {
                        *cell = None;
                    } else if let Some(c) = cell {
                        *c = remove_in(c, id);
                    }
                }
            }
        }
    }
    next
}

/// Patches scalar fields on the node with `id`. An absent id returns the
/// forest unchanged.
pub fn update_fields(ast: &Ast, id: &str, patch: &FieldPatch) -> Ast {
    ast.iter().map(|root| update_in(root, id, patch)).collect()
}

fn update_in(node: &Arc<Node>, id: &str, patch: &FieldPatch) -> Arc<Node> {
    if !contains(node, id) {
        return Arc::clone(node);
    }

    let mut next = Arc::clone(node);
    let inner = Arc::make_mut(&mut next);
    if inner.id() == id {
        patch.apply_to(inner);
        return next;
    }

    for (_, slot) in inner.slots_mut() {
        match slot {
            SlotMut::Single(child) => {
                if let Some(c) = child {
                    *c = update_in(c, id, patch);
                }
            }
            SlotMut::Statements(seq) => {
                for child in seq.iter_mut() {
                    *child = update_in(child, id, patch);
                }
            }
            SlotMut::Items(cells) => {
                for cell in cells.iter_mut().flatten() {
                    *cell = update_in(cell, id, patch);
                }
            }
        }
    }
    next
}

/// Inserts `node` and its subtree at the destination.
///
/// A destination of `None` prepends to the program root, which only
/// takes statements. Every id under `node` must be new to the forest.
/// An absent destination id returns the forest unchanged.
pub fn emplace(
    ast: &Ast,
    node: Arc<Node>,
    destination_id: Option<&str>,
    placement: Placement,
) -> Result<Ast, EditError> {
    if let Some(duplicate) = duplicate_id(ast, &node) {
        return Err(EditError::DuplicateId(duplicate));
    }
    insert_validated(ast, node, destination_id, placement)
}

/// Relocates a node and its subtree to a new destination.
///
/// Every check runs before the node is detached, so a rejected move
/// leaves the forest exactly as it was. Moving a node into its own
/// subtree is a cycle. Moving a node onto itself is a no-op.
pub fn move_node(
    ast: &Ast,
    id: &str,
    destination_id: Option<&str>,
    placement: Placement,
) -> Result<Ast, EditError> {
    if destination_id == Some(id) {
        tracing::debug!(id, "move onto itself, skipping");
        return Ok(ast.clone());
    }

    let Some(source) = find(ast, id) else {
        tracing::debug!(id, "move source not found, skipping");
        return Ok(ast.clone());
    };
    let source = Arc::clone(source);

    match destination_id {
        Some(destination_id) => {
            let Some(destination) = find(ast, destination_id) else {
                tracing::debug!(destination_id, "move destination not found, skipping");
                return Ok(ast.clone());
            };
            if contains(&source, destination_id) {
                return Err(EditError::CycleDetected);
            }
            validate_placement(destination, placement, &source)?;
        }
        None => {
            if !source.is_statement() {
                return Err(EditError::NotAStatement);
            }
        }
    }

    let without = remove(ast, id);
    insert_validated(&without, source, destination_id, placement)
}

// Shared tail of emplace and move. Move re-inserts the node it just
// detached, so it must not run the duplicate scan again.
fn insert_validated(
    ast: &Ast,
    node: Arc<Node>,
    destination_id: Option<&str>,
    placement: Placement,
) -> Result<Ast, EditError> {
    let Some(destination_id) = destination_id else {
        if !node.is_statement() {
            return Err(EditError::NotAStatement);
        }
        let mut next = ast.clone();
        next.insert(0, node);
        return Ok(next);
    };

    let Some(destination) = find(ast, destination_id) else {
        tracing::debug!(destination_id, "destination not found, skipping emplace");
        return Ok(ast.clone());
    };

    validate_placement(destination, placement, &node)?;

    match placement {
        Placement::Prepend => Ok(splice(ast, destination_id, &node, 0)),
        Placement::Append => Ok(splice(ast, destination_id, &node, 1)),
        Placement::Insert { slot } => Ok(ast
            .iter()
            .map(|root| write_in(root, destination_id, slot, &node))
            .collect()),
    }
}

fn validate_placement(
    destination: &Node,
    placement: Placement,
    candidate: &Node,
) -> Result<(), EditError> {
    match placement {
        Placement::Prepend | Placement::Append => {
            if !candidate.is_statement() {
                return Err(EditError::NotAStatement);
            }
            if !destination.is_statement() {
                return Err(EditError::ExpressionDestination);
            }
            Ok(())
        }
        Placement::Insert { slot } => {
            let target = destination.kind();
            if schema::slot_shape(target, slot).is_none() {
                return Err(EditError::UnknownSlot { target, slot });
            }
            if let SlotId::Cell(index) = slot {
                let cells = match destination {
                    Node::List { items, .. } => items.len(),
                    _ => 0,
                };
                if index >= cells {
                    return Err(EditError::CellOutOfRange { index });
                }
            }
            if !schema::accepts(target, slot, candidate) {
                return Err(EditError::SlotRejected {
                    target,
                    slot,
                    candidate: candidate.kind(),
                });
            }
            Ok(())
        }
    }
}

fn duplicate_id(ast: &Ast, node: &Node) -> Option<String> {
    if find(ast, node.id()).is_some() {
        return Some(node.id().to_string());
    }
    node.children()
        .into_iter()
        .find_map(|child| duplicate_id(ast, child))
}

// Insert `new` into the statement sequence holding the destination,
// `offset` positions after it.
fn splice(ast: &Ast, destination_id: &str, new: &Arc<Node>, offset: usize) -> Ast {
    if let Some(pos) = ast.iter().position(|root| root.id() == destination_id) {
        let mut next = ast.clone();
        next.insert(pos + offset, Arc::clone(new));
        return next;
    }

    ast.iter()
        .map(|root| splice_in(root, destination_id, new, offset))
        .collect()
}

fn splice_in(node: &Arc<Node>, destination_id: &str, new: &Arc<Node>, offset: usize) -> Arc<Node> {
    if !contains(node, destination_id) {
        return Arc::clone(node);
    }

    let mut next = Arc::clone(node);
    let inner = Arc::make_mut(&mut next);
    for (_, slot) in inner.slots_mut() {
        match slot {
            SlotMut::Statements(seq) => {
                if let Some(pos) = seq.iter().position(|c| c.id() == destination_id) {
                    seq.insert(pos + offset, Arc::clone(new));
                } else {
                    for child in seq.iter_mut() {
                        *child = splice_in(child, destination_id, new, offset);
                    }
                }
            }
            SlotMut::Single(child) => {
                if let Some(c) = child {
                    *c = splice_in(c, destination_id, new, offset);
                }
            }
            SlotMut::Items(cells) => {
                for cell in cells.iter_mut().flatten() {
                    *cell = splice_in(cell, destination_id, new, offset);
                }
            }
        }
    }
    next
}

fn write_in(node: &Arc<Node>, destination_id: &str, slot: SlotId, new: &Arc<Node>) -> Arc<Node> {
    if !contains(node, destination_id) {
        return Arc::clone(node);
    }

    let mut next = Arc::clone(node);
    let inner = Arc::make_mut(&mut next);
    if inner.id() == destination_id {
        write_slot(inner, slot, new);
        return next;
    }

    for (_, contents) in inner.slots_mut() {
        match contents {
            SlotMut::Single(child) => {
                if let Some(c) = child {
                    *c = write_in(c, destination_id, slot, new);
                }
            }
            SlotMut::Statements(seq) => {
                for child in seq.iter_mut() {
                    *child = write_in(child, destination_id, slot, new);
                }
            }
            SlotMut::Items(cells) => {
                for cell in cells.iter_mut().flatten() {
                    *cell = write_in(cell, destination_id, slot, new);
                }
            }
        }
    }
    next
}

// Validation already ran; single slots overwrite, sequences and item
// lists append, a cell index replaces in place.
fn write_slot(node: &mut Node, slot: SlotId, new: &Arc<Node>) {
    if let SlotId::Cell(index) = slot {
        if let Node::List { items, .. } = node {
            if let Some(cell) = items.get_mut(index) {
                *cell = Some(Arc::clone(new));
            }
        }
        return;
    }

    for (id, contents) in node.slots_mut() {
        if id != slot {
            continue;
        }
        match contents {
            SlotMut::Single(child) => *child = Some(Arc::clone(new)),
            SlotMut::Statements(seq) => seq.push(Arc::clone(new)),
            SlotMut::Items(cells) => cells.push(Some(Arc::clone(new))),
        }
        return;
    }
}
