//! Program tree nodes.
//!
//! Every node carries a stable `id` and a `kind` tag; children live in
//! named slots declared by the schema ([`crate::schema`]). Child links are
//! `Arc`s so an edited tree shares every untouched subtree with its
//! predecessor.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::schema::{NodeKind, SlotId};

/// A literal's held value.
///
/// Serialized untagged: JSON booleans, numbers and strings map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Boolean(_) => PrimitiveKind::Boolean,
            Primitive::Number(_) => PrimitiveKind::Number,
            Primitive::String(_) => PrimitiveKind::String,
        }
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Boolean(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Primitive::Number(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::String(value)
    }
}

/// The primitive type a definition declares for its variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveKind::String => write!(f, "string"),
            PrimitiveKind::Number => write!(f, "number"),
            PrimitiveKind::Boolean => write!(f, "boolean"),
        }
    }
}

/// One node of the program tree: a statement ("block") or an expression.
///
/// Statements occupy statement sequences (the program root, loop bodies,
/// branch arms); expressions occupy named single slots and list cells.
/// Empty single slots are legal everywhere and render as drop targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    // Output //
    /// Print the expression's value to the program output
    Print {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    /// Clear the program output
    ClearOutput { id: String },

    // Renderers //
    /// Draw a line from (x1, y1) to (x2, y2)
    DrawLine {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x1: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y1: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x2: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y2: Option<Arc<Node>>,
    },

    /// Draw a filled rectangle at (x, y) sized w by h
    DrawRect {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        w: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        h: Option<Arc<Node>>,
    },

    /// Draw a single pixel at (x, y)
    DrawPixel {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<Arc<Node>>,
    },

    /// Clear the drawing canvas
    ClearScreen { id: String },

    // Loops //
    /// Run the body a fixed number of times
    Repeat {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        repetition: Option<Arc<Node>>,
        #[serde(default)]
        components: Vec<Arc<Node>>,
    },

    /// Run the body while the condition holds
    While {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Arc<Node>>,
        #[serde(default)]
        components: Vec<Arc<Node>>,
    },

    /// Run the body until the program exits
    Forever {
        id: String,
        #[serde(default)]
        components: Vec<Arc<Node>>,
    },

    // Control flow //
    /// Two-armed conditional; arms are serialized as "true" and "false"
    Branch {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Arc<Node>>,
        #[serde(rename = "true", default)]
        then_branch: Vec<Arc<Node>>,
        #[serde(rename = "false", default)]
        else_branch: Vec<Arc<Node>>,
    },

    /// Stop the program
    Exit { id: String },

    // Variables //
    /// Declare a variable with a primitive type and an initial expression
    Definition {
        id: String,
        name: String,
        primitive: PrimitiveKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    /// Assign rvalue to the variable in lvalue
    Assignment {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lvalue: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rvalue: Option<Arc<Node>>,
    },

    /// Append an item to a list
    Append {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<Arc<Node>>,
    },

    /// Add one to a numeric variable
    Increment {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    /// Subtract one from a numeric variable
    Decrement {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    /// Free-form note; ignored by execution
    Comment { id: String, text: String },

    // Expressions //
    /// A constant value; `None` is the unfilled palette placeholder
    Literal {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Primitive>,
    },

    /// A reference to a variable definition
    Variable { id: String, definition_id: String },

    /// An ordered collection; cells may be empty
    List {
        id: String,
        #[serde(default)]
        items: Vec<Option<Arc<Node>>>,
    },

    /// Index into a list
    Subscript {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<Arc<Node>>,
    },

    /// Length of a list
    Size {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list: Option<Arc<Node>>,
    },

    // Arithmetic //
    Add {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Subtract {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Multiply {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Divide {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Modulo {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Exponent {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    // Comparisons //
    Eq {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Ne {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Gt {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Lt {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Ge {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Le {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    // Boolean //
    And {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Or {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<Arc<Node>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<Arc<Node>>,
    },

    Not {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    // Unary math //
    Sin {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    Cos {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    Tan {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    Round {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    Floor {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    Ceil {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    Abs {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    Sqrt {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    Log {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },

    /// Random number seeded by the expression's value
    Random {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expression: Option<Arc<Node>>,
    },
}

/// Shared view of one slot's contents.
#[derive(Debug)]
pub enum SlotRef<'a> {
    /// Zero or one child
    Single(&'a Option<Arc<Node>>),
    /// Dense statement sequence
    Statements(&'a Vec<Arc<Node>>),
    /// Positional list cells; empty cells stay in place
    Items(&'a Vec<Option<Arc<Node>>>),
}

/// Mutable view of one slot's contents.
#[derive(Debug)]
pub enum SlotMut<'a> {
    Single(&'a mut Option<Arc<Node>>),
    Statements(&'a mut Vec<Arc<Node>>),
    Items(&'a mut Vec<Option<Arc<Node>>>),
}

impl Node {
    /// Stable identity, unique across the whole forest.
    pub fn id(&self) -> &str {
        match self {
            Node::Print { id, .. }
            | Node::ClearOutput { id, .. }
            | Node::DrawLine { id, .. }
            | Node::DrawRect { id, .. }
            | Node::DrawPixel { id, .. }
            | Node::ClearScreen { id, .. }
            | Node::Repeat { id, .. }
            | Node::While { id, .. }
            | Node::Forever { id, .. }
            | Node::Branch { id, .. }
            | Node::Exit { id, .. }
            | Node::Definition { id, .. }
            | Node::Assignment { id, .. }
            | Node::Append { id, .. }
            | Node::Increment { id, .. }
            | Node::Decrement { id, .. }
            | Node::Comment { id, .. }
            | Node::Literal { id, .. }
            | Node::Variable { id, .. }
            | Node::List { id, .. }
            | Node::Subscript { id, .. }
            | Node::Size { id, .. }
            | Node::Add { id, .. }
            | Node::Subtract { id, .. }
            | Node::Multiply { id, .. }
            | Node::Divide { id, .. }
            | Node::Modulo { id, .. }
            | Node::Exponent { id, .. }
            | Node::Eq { id, .. }
            | Node::Ne { id, .. }
            | Node::Gt { id, .. }
            | Node::Lt { id, .. }
            | Node::Ge { id, .. }
            | Node::Le { id, .. }
            | Node::And { id, .. }
            | Node::Or { id, .. }
            | Node::Not { id, .. }
            | Node::Sin { id, .. }
            | Node::Cos { id, .. }
            | Node::Tan { id, .. }
            | Node::Round { id, .. }
            | Node::Floor { id, .. }
            | Node::Ceil { id, .. }
            | Node::Abs { id, .. }
            | Node::Sqrt { id, .. }
            | Node::Log { id, .. }
            | Node::Random { id, .. } => id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Print { .. } => NodeKind::Print,
            Node::ClearOutput { .. } => NodeKind::ClearOutput,
            Node::DrawLine { .. } => NodeKind::DrawLine,
            Node::DrawRect { .. } => NodeKind::DrawRect,
            Node::DrawPixel { .. } => NodeKind::DrawPixel,
            Node::ClearScreen { .. } => NodeKind::ClearScreen,
            Node::Repeat { .. } => NodeKind::Repeat,
            Node::While { .. } => NodeKind::While,
            Node::Forever { .. } => NodeKind::Forever,
            Node::Branch { .. } => NodeKind::Branch,
            Node::Exit { .. } => NodeKind::Exit,
            Node::Definition { .. } => NodeKind::Definition,
            Node::Assignment { .. } => NodeKind::Assignment,
            Node::Append { .. } => NodeKind::Append,
            Node::Increment { .. } => NodeKind::Increment,
            Node::Decrement { .. } => NodeKind::Decrement,
            Node::Comment { .. } => NodeKind::Comment,
            Node::Literal { .. } => NodeKind::Literal,
            Node::Variable { .. } => NodeKind::Variable,
            Node::List { .. } => NodeKind::List,
            Node::Subscript { .. } => NodeKind::Subscript,
            Node::Size { .. } => NodeKind::Size,
            Node::Add { .. } => NodeKind::Add,
            Node::Subtract { .. } => NodeKind::Subtract,
            Node::Multiply { .. } => NodeKind::Multiply,
            Node::Divide { .. } => NodeKind::Divide,
            Node::Modulo { .. } => NodeKind::Modulo,
            Node::Exponent { .. } => NodeKind::Exponent,
            Node::Eq { .. } => NodeKind::Eq,
            Node::Ne { .. } => NodeKind::Ne,
            Node::Gt { .. } => NodeKind::Gt,
            Node::Lt { .. } => NodeKind::Lt,
            Node::Ge { .. } => NodeKind::Ge,
            Node::Le { .. } => NodeKind::Le,
            Node::And { .. } => NodeKind::And,
            Node::Or { .. } => NodeKind::Or,
            Node::Not { .. } => NodeKind::Not,
            Node::Sin { .. } => NodeKind::Sin,
            Node::Cos { .. } => NodeKind::Cos,
            Node::Tan { .. } => NodeKind::Tan,
            Node::Round { .. } => NodeKind::Round,
            Node::Floor { .. } => NodeKind::Floor,
            Node::Ceil { .. } => NodeKind::Ceil,
            Node::Abs { .. } => NodeKind::Abs,
            Node::Sqrt { .. } => NodeKind::Sqrt,
            Node::Log { .. } => NodeKind::Log,
            Node::Random { .. } => NodeKind::Random,
        }
    }

    /// The node's slots in schema order (single slots before sequences).
    ///
    /// Traversal, removal and insertion all drive off this accessor, so a
    /// new kind only has to be wired here and in the schema table.
    pub fn slots(&self) -> Vec<(SlotId, SlotRef<'_>)> {
        match self {
            Node::Print { expression, .. }
            | Node::Definition { expression, .. }
            | Node::Increment { expression, .. }
            | Node::Decrement { expression, .. }
            | Node::Not { expression, .. }
            | Node::Sin { expression, .. }
            | Node::Cos { expression, .. }
            | Node::Tan { expression, .. }
            | Node::Round { expression, .. }
            | Node::Floor { expression, .. }
            | Node::Ceil { expression, .. }
            | Node::Abs { expression, .. }
            | Node::Sqrt { expression, .. }
            | Node::Log { expression, .. }
            | Node::Random { expression, .. } => {
                vec![(SlotId::Expression, SlotRef::Single(expression))]
            }

            Node::DrawLine { x1, y1, x2, y2, .. } => vec![
                (SlotId::X1, SlotRef::Single(x1)),
                (SlotId::Y1, SlotRef::Single(y1)),
                (SlotId::X2, SlotRef::Single(x2)),
                (SlotId::Y2, SlotRef::Single(y2)),
            ],

            Node::DrawRect { x, y, w, h, .. } => vec![
                (SlotId::X, SlotRef::Single(x)),
                (SlotId::Y, SlotRef::Single(y)),
                (SlotId::W, SlotRef::Single(w)),
                (SlotId::H, SlotRef::Single(h)),
            ],

            Node::DrawPixel { x, y, .. } => vec![
                (SlotId::X, SlotRef::Single(x)),
                (SlotId::Y, SlotRef::Single(y)),
            ],

            Node::Repeat {
                repetition,
                components,
                ..
            } => vec![
                (SlotId::Repetition, SlotRef::Single(repetition)),
                (SlotId::Components, SlotRef::Statements(components)),
            ],

            Node::While {
                condition,
                components,
                ..
            } => vec![
                (SlotId::Condition, SlotRef::Single(condition)),
                (SlotId::Components, SlotRef::Statements(components)),
            ],

            Node::Forever { components, .. } => {
                vec![(SlotId::Components, SlotRef::Statements(components))]
            }

            Node::Branch {
                condition,
                then_branch,
                else_branch,
                ..
            } => vec![
                (SlotId::Condition, SlotRef::Single(condition)),
                (SlotId::Then, SlotRef::Statements(then_branch)),
                (SlotId::Else, SlotRef::Statements(else_branch)),
            ],

            Node::Assignment { lvalue, rvalue, .. } => vec![
                (SlotId::Lvalue, SlotRef::Single(lvalue)),
                (SlotId::Rvalue, SlotRef::Single(rvalue)),
            ],

            Node::Append { list, item, .. } => vec![
                (SlotId::List, SlotRef::Single(list)),
                (SlotId::Item, SlotRef::Single(item)),
            ],

            Node::Subscript { list, index, .. } => vec![
                (SlotId::List, SlotRef::Single(list)),
                (SlotId::Index, SlotRef::Single(index)),
            ],

            Node::Size { list, .. } => vec![(SlotId::List, SlotRef::Single(list))],

            Node::Add { left, right, .. }
            | Node::Subtract { left, right, .. }
            | Node::Multiply { left, right, .. }
            | Node::Divide { left, right, .. }
            | Node::Modulo { left, right, .. }
            | Node::Exponent { left, right, .. }
            | Node::Eq { left, right, .. }
            | Node::Ne { left, right, .. }
            | Node::Gt { left, right, .. }
            | Node::Lt { left, right, .. }
            | Node::Ge { left, right, .. }
            | Node::Le { left, right, .. }
            | Node::And { left, right, .. }
            | Node::Or { left, right, .. } => vec![
                (SlotId::Left, SlotRef::Single(left)),
                (SlotId::Right, SlotRef::Single(right)),
            ],

            Node::List { items, .. } => vec![(SlotId::Items, SlotRef::Items(items))],

            Node::ClearOutput { .. }
            | Node::ClearScreen { .. }
            | Node::Exit { .. }
            | Node::Comment { .. }
            | Node::Literal { .. }
            | Node::Variable { .. } => vec![],
        }
    }

    /// Mutable counterpart of [`Node::slots`], same order.
    pub fn slots_mut(&mut self) -> Vec<(SlotId, SlotMut<'_>)> {
        match self {
            Node::Print { expression, .. }
            | Node::Definition { expression, .. }
            | Node::Increment { expression, .. }
            | Node::Decrement { expression, .. }
            | Node::Not { expression, .. }
            | Node::Sin { expression, .. }
            | Node::Cos { expression, .. }
            | Node::Tan { expression, .. }
            | Node::Round { expression, .. }
            | Node::Floor { expression, .. }
            | Node::Ceil { expression, .. }
            | Node::Abs { expression, .. }
            | Node::Sqrt { expression, .. }
            | Node::Log { expression, .. }
            | Node::Random { expression, .. } => {
                vec![(SlotId::Expression, SlotMut::Single(expression))]
            }

            Node::DrawLine { x1, y1, x2, y2, .. } => vec![
                (SlotId::X1, SlotMut::Single(x1)),
                (SlotId::Y1, SlotMut::Single(y1)),
                (SlotId::X2, SlotMut::Single(x2)),
                (SlotId::Y2, SlotMut::Single(y2)),
            ],

            Node::DrawRect { x, y, w, h, .. } => vec![
                (SlotId::X, SlotMut::Single(x)),
                (SlotId::Y, SlotMut::Single(y)),
                (SlotId::W, SlotMut::Single(w)),
                (SlotId::H, SlotMut::Single(h)),
            ],

            Node::DrawPixel { x, y, .. } => vec![
                (SlotId::X, SlotMut::Single(x)),
                (SlotId::Y, SlotMut::Single(y)),
            ],

            Node::Repeat {
                repetition,
                components,
                ..
            } => vec![
                (SlotId::Repetition, SlotMut::Single(repetition)),
                (SlotId::Components, SlotMut::Statements(components)),
            ],

            Node::While {
                condition,
                components,
                ..
            } => vec![
                (SlotId::Condition, SlotMut::Single(condition)),
                (SlotId::Components, SlotMut::Statements(components)),
            ],

            Node::Forever { components, .. } => {
                vec![(SlotId::Components, SlotMut::Statements(components))]
            }

            Node::Branch {
                condition,
                then_branch,
                else_branch,
                ..
            } => vec![
                (SlotId::Condition, SlotMut::Single(condition)),
                (SlotId::Then, SlotMut::Statements(then_branch)),
                (SlotId::Else, SlotMut::Statements(else_branch)),
            ],

            Node::Assignment { lvalue, rvalue, .. } => vec![
                (SlotId::Lvalue, SlotMut::Single(lvalue)),
                (SlotId::Rvalue, SlotMut::Single(rvalue)),
            ],

            Node::Append { list, item, .. } => vec![
                (SlotId::List, SlotMut::Single(list)),
                (SlotId::Item, SlotMut::Single(item)),
            ],

            Node::Subscript { list, index, .. } => vec![
                (SlotId::List, SlotMut::Single(list)),
                (SlotId::Index, SlotMut::Single(index)),
            ],

            Node::Size { list, .. } => vec![(SlotId::List, SlotMut::Single(list))],

            Node::Add { left, right, .. }
            | Node::Subtract { left, right, .. }
            | Node::Multiply { left, right, .. }
            | Node::Divide { left, right, .. }
            | Node::Modulo { left, right, .. }
            | Node::Exponent { left, right, .. }
            | Node::Eq { left, right, .. }
            | Node::Ne { left, right, .. }
            | Node::Gt { left, right, .. }
            | Node::Lt { left, right, .. }
            | Node::Ge { left, right, .. }
            | Node::Le { left, right, .. }
            | Node::And { left, right, .. }
            | Node::Or { left, right, .. } => vec![
                (SlotId::Left, SlotMut::Single(left)),
                (SlotId::Right, SlotMut::Single(right)),
            ],

            Node::List { items, .. } => vec![(SlotId::Items, SlotMut::Items(items))],

            Node::ClearOutput { .. }
            | Node::ClearScreen { .. }
            | Node::Exit { .. }
            | Node::Comment { .. }
            | Node::Literal { .. }
            | Node::Variable { .. } => vec![],
        }
    }

    /// Every direct child, slot structure flattened away.
    pub fn children(&self) -> Vec<&Arc<Node>> {
        let mut children = Vec::new();
        for (_, slot) in self.slots() {
            match slot {
                SlotRef::Single(child) => {
                    if let Some(child) = child {
                        children.push(child);
                    }
                }
                SlotRef::Statements(seq) => children.extend(seq.iter()),
                SlotRef::Items(cells) => children.extend(cells.iter().flatten()),
            }
        }
        children
    }

    pub fn is_statement(&self) -> bool {
        self.kind().is_statement()
    }

    pub fn is_expression(&self) -> bool {
        self.kind().is_expression()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn literal(id: &str, value: impl Into<Primitive>) -> Arc<Node> {
        Arc::new(Node::Literal {
            id: id.to_string(),
            value: Some(value.into()),
        })
    }

    #[test]
    fn test_kind_tag_round_trip() {
        let node = Node::Print {
            id: "1".to_string(),
            expression: Some(literal("2", "Hello, World!")),
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "print");
        assert_eq!(json["expression"]["kind"], "literal");
        assert_eq!(json["expression"]["value"], "Hello, World!");

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_empty_slots_are_omitted() {
        let node = Node::Print {
            id: "1".to_string(),
            expression: None,
        };

        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("expression").is_none());
    }

    #[test]
    fn test_branch_arms_serialize_as_true_false() {
        let node = Node::Branch {
            id: "b".to_string(),
            condition: None,
            then_branch: vec![Arc::new(Node::Exit {
                id: "e".to_string(),
            })],
            else_branch: vec![],
        };

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["true"][0]["kind"], "exit");
        assert_eq!(json["false"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_missing_bodies_deserialize_as_empty() {
        let node: Node =
            serde_json::from_str(r#"{ "kind": "repeat", "id": "r" }"#).unwrap();
        match node {
            Node::Repeat {
                repetition,
                components,
                ..
            } => {
                assert!(repetition.is_none());
                assert!(components.is_empty());
            }
            other => panic!("expected repeat, got {:?}", other),
        }
    }

    #[test]
    fn test_primitive_is_untagged() {
        let values: Vec<Primitive> =
            serde_json::from_str(r#"[true, 42.5, "text"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Primitive::Boolean(true),
                Primitive::Number(42.5),
                Primitive::String("text".to_string()),
            ]
        );
    }

    #[test]
    fn test_slots_agree_with_schema_table() {
        let node = Node::Branch {
            id: "b".to_string(),
            condition: None,
            then_branch: vec![],
            else_branch: vec![],
        };

        let declared: Vec<SlotId> = schema::slots_of(node.kind())
            .iter()
            .map(|spec| spec.id)
            .collect();
        let actual: Vec<SlotId> = node.slots().into_iter().map(|(id, _)| id).collect();
        assert_eq!(declared, actual);
    }

    #[test]
    fn test_children_flattens_all_slot_shapes() {
        let node = Node::List {
            id: "l".to_string(),
            items: vec![None, Some(literal("1", 1.0)), None, Some(literal("2", 2.0))],
        };
        let ids: Vec<&str> = node.children().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
