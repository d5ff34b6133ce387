//! Node schema: slot declarations and acceptance rules.
//!
//! One table keyed by `(kind, slot)` declares each slot's shape, and one
//! predicate decides whether a candidate node may occupy it. Every edit
//! operation validates and traverses through this module, so adding a
//! kind means touching the table here and the slot accessors on
//! [`Node`], nothing else.
//!
//! Slot identifiers are a closed enum rather than free strings; the wire
//! names ("expression", "true", "false", a decimal index for list cells)
//! map through [`std::fmt::Display`] and [`std::str::FromStr`].

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ast::{Node, PrimitiveKind};

/// Tag identifying a node variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Statements
    Print,
    ClearOutput,
    DrawLine,
    DrawRect,
    DrawPixel,
    ClearScreen,
    Repeat,
    While,
    Forever,
    Branch,
    Exit,
    Definition,
    Assignment,
    Append,
    Increment,
    Decrement,
    Comment,
    // Expressions
    Literal,
    Variable,
    List,
    Subscript,
    Size,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    And,
    Or,
    Not,
    Sin,
    Cos,
    Tan,
    Round,
    Floor,
    Ceil,
    Abs,
    Sqrt,
    Log,
    Random,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown node kind: {0}")]
pub struct UnknownKindName(pub String);

impl NodeKind {
    /// Every kind, statements first.
    pub const ALL: [NodeKind; 47] = [
        NodeKind::Print,
        NodeKind::ClearOutput,
        NodeKind::DrawLine,
        NodeKind::DrawRect,
        NodeKind::DrawPixel,
        NodeKind::ClearScreen,
        NodeKind::Repeat,
        NodeKind::While,
        NodeKind::Forever,
        NodeKind::Branch,
        NodeKind::Exit,
        NodeKind::Definition,
        NodeKind::Assignment,
        NodeKind::Append,
        NodeKind::Increment,
        NodeKind::Decrement,
        NodeKind::Comment,
        NodeKind::Literal,
        NodeKind::Variable,
        NodeKind::List,
        NodeKind::Subscript,
        NodeKind::Size,
        NodeKind::Add,
        NodeKind::Subtract,
        NodeKind::Multiply,
        NodeKind::Divide,
        NodeKind::Modulo,
        NodeKind::Exponent,
        NodeKind::Eq,
        NodeKind::Ne,
        NodeKind::Gt,
        NodeKind::Lt,
        NodeKind::Ge,
        NodeKind::Le,
        NodeKind::And,
        NodeKind::Or,
        NodeKind::Not,
        NodeKind::Sin,
        NodeKind::Cos,
        NodeKind::Tan,
        NodeKind::Round,
        NodeKind::Floor,
        NodeKind::Ceil,
        NodeKind::Abs,
        NodeKind::Sqrt,
        NodeKind::Log,
        NodeKind::Random,
    ];

    /// The serialized tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Print => "print",
            NodeKind::ClearOutput => "clear_output",
            NodeKind::DrawLine => "draw_line",
            NodeKind::DrawRect => "draw_rect",
            NodeKind::DrawPixel => "draw_pixel",
            NodeKind::ClearScreen => "clear_screen",
            NodeKind::Repeat => "repeat",
            NodeKind::While => "while",
            NodeKind::Forever => "forever",
            NodeKind::Branch => "branch",
            NodeKind::Exit => "exit",
            NodeKind::Definition => "definition",
            NodeKind::Assignment => "assignment",
            NodeKind::Append => "append",
            NodeKind::Increment => "increment",
            NodeKind::Decrement => "decrement",
            NodeKind::Comment => "comment",
            NodeKind::Literal => "literal",
            NodeKind::Variable => "variable",
            NodeKind::List => "list",
            NodeKind::Subscript => "subscript",
            NodeKind::Size => "size",
            NodeKind::Add => "add",
            NodeKind::Subtract => "subtract",
            NodeKind::Multiply => "multiply",
            NodeKind::Divide => "divide",
            NodeKind::Modulo => "modulo",
            NodeKind::Exponent => "exponent",
            NodeKind::Eq => "eq",
            NodeKind::Ne => "ne",
            NodeKind::Gt => "gt",
            NodeKind::Lt => "lt",
            NodeKind::Ge => "ge",
            NodeKind::Le => "le",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Not => "not",
            NodeKind::Sin => "sin",
            NodeKind::Cos => "cos",
            NodeKind::Tan => "tan",
            NodeKind::Round => "round",
            NodeKind::Floor => "floor",
            NodeKind::Ceil => "ceil",
            NodeKind::Abs => "abs",
            NodeKind::Sqrt => "sqrt",
            NodeKind::Log => "log",
            NodeKind::Random => "random",
        }
    }

    /// Statements are the kinds legal in statement sequences: the program
    /// root, loop bodies and branch arms.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Print
                | NodeKind::ClearOutput
                | NodeKind::DrawLine
                | NodeKind::DrawRect
                | NodeKind::DrawPixel
                | NodeKind::ClearScreen
                | NodeKind::Repeat
                | NodeKind::While
                | NodeKind::Forever
                | NodeKind::Branch
                | NodeKind::Exit
                | NodeKind::Definition
                | NodeKind::Assignment
                | NodeKind::Append
                | NodeKind::Increment
                | NodeKind::Decrement
                | NodeKind::Comment
        )
    }

    pub fn is_expression(&self) -> bool {
        !self.is_statement()
    }

    /// Boolean-valued expressions: comparisons, conjunctions, negation.
    pub fn is_condition(&self) -> bool {
        matches!(
            self,
            NodeKind::And
                | NodeKind::Or
                | NodeKind::Not
                | NodeKind::Eq
                | NodeKind::Ne
                | NodeKind::Gt
                | NodeKind::Lt
                | NodeKind::Ge
                | NodeKind::Le
        )
    }

    /// Binary numeric operators.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            NodeKind::Add
                | NodeKind::Subtract
                | NodeKind::Multiply
                | NodeKind::Divide
                | NodeKind::Modulo
                | NodeKind::Exponent
        )
    }

    /// Single-operand numeric functions.
    pub fn is_unary_math(&self) -> bool {
        matches!(
            self,
            NodeKind::Sin
                | NodeKind::Cos
                | NodeKind::Tan
                | NodeKind::Round
                | NodeKind::Floor
                | NodeKind::Ceil
                | NodeKind::Abs
                | NodeKind::Sqrt
                | NodeKind::Log
                | NodeKind::Random
        )
    }

    pub fn is_operation(&self) -> bool {
        self.is_arithmetic() || self.is_unary_math()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = UnknownKindName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownKindName(s.to_string()))
    }
}

/// Identifies one slot of a node.
///
/// `Then`/`Else` carry the wire names "true"/"false"; `Cell` addresses a
/// single list cell by position and reads/writes as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotId {
    Expression,
    Condition,
    Repetition,
    Components,
    Then,
    Else,
    Lvalue,
    Rvalue,
    List,
    Item,
    Index,
    Items,
    Left,
    Right,
    X,
    Y,
    W,
    H,
    X1,
    Y1,
    X2,
    Y2,
    Cell(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown slot name: {0}")]
pub struct UnknownSlotName(pub String);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::Expression => f.write_str("expression"),
            SlotId::Condition => f.write_str("condition"),
            SlotId::Repetition => f.write_str("repetition"),
            SlotId::Components => f.write_str("components"),
            SlotId::Then => f.write_str("true"),
            SlotId::Else => f.write_str("false"),
            SlotId::Lvalue => f.write_str("lvalue"),
            SlotId::Rvalue => f.write_str("rvalue"),
            SlotId::List => f.write_str("list"),
            SlotId::Item => f.write_str("item"),
            SlotId::Index => f.write_str("index"),
            SlotId::Items => f.write_str("items"),
            SlotId::Left => f.write_str("left"),
            SlotId::Right => f.write_str("right"),
            SlotId::X => f.write_str("x"),
            SlotId::Y => f.write_str("y"),
            SlotId::W => f.write_str("w"),
            SlotId::H => f.write_str("h"),
            SlotId::X1 => f.write_str("x1"),
            SlotId::Y1 => f.write_str("y1"),
            SlotId::X2 => f.write_str("x2"),
            SlotId::Y2 => f.write_str("y2"),
            SlotId::Cell(index) => write!(f, "{}", index),
        }
    }
}

impl FromStr for SlotId {
    type Err = UnknownSlotName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slot = match s {
            "expression" => SlotId::Expression,
            "condition" => SlotId::Condition,
            "repetition" => SlotId::Repetition,
            "components" => SlotId::Components,
            "true" => SlotId::Then,
            "false" => SlotId::Else,
            "lvalue" => SlotId::Lvalue,
            "rvalue" => SlotId::Rvalue,
            "list" => SlotId::List,
            "item" => SlotId::Item,
            "index" => SlotId::Index,
            "items" => SlotId::Items,
            "left" => SlotId::Left,
            "right" => SlotId::Right,
            "x" => SlotId::X,
            "y" => SlotId::Y,
            "w" => SlotId::W,
            "h" => SlotId::H,
            "x1" => SlotId::X1,
            "y1" => SlotId::Y1,
            "x2" => SlotId::X2,
            "y2" => SlotId::Y2,
            other => match other.parse::<usize>() {
                Ok(index) => SlotId::Cell(index),
                Err(_) => return Err(UnknownSlotName(other.to_string())),
            },
        };
        Ok(slot)
    }
}

impl Serialize for SlotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// How a slot stores children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotShape {
    /// Zero or one child
    Single,
    /// Dense ordered statement sequence
    Statements,
    /// Positional cells that may individually be empty
    Items,
}

/// One slot declaration in the schema table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    pub id: SlotId,
    pub shape: SlotShape,
}

const fn single(id: SlotId) -> SlotSpec {
    SlotSpec {
        id,
        shape: SlotShape::Single,
    }
}

const fn statements(id: SlotId) -> SlotSpec {
    SlotSpec {
        id,
        shape: SlotShape::Statements,
    }
}

/// The slots a kind declares, single slots before sequences.
pub fn slots_of(kind: NodeKind) -> &'static [SlotSpec] {
    match kind {
        NodeKind::Print
        | NodeKind::Definition
        | NodeKind::Increment
        | NodeKind::Decrement
        | NodeKind::Not
        | NodeKind::Sin
        | NodeKind::Cos
        | NodeKind::Tan
        | NodeKind::Round
        | NodeKind::Floor
        | NodeKind::Ceil
        | NodeKind::Abs
        | NodeKind::Sqrt
        | NodeKind::Log
        | NodeKind::Random => const { &[single(SlotId::Expression)] },

        NodeKind::DrawLine => const {
            &[
                single(SlotId::X1),
                single(SlotId::Y1),
                single(SlotId::X2),
                single(SlotId::Y2),
            ]
        },

        NodeKind::DrawRect => const {
            &[
                single(SlotId::X),
                single(SlotId::Y),
                single(SlotId::W),
                single(SlotId::H),
            ]
        },

        NodeKind::DrawPixel => const { &[single(SlotId::X), single(SlotId::Y)] },

        NodeKind::Repeat => const {
            &[
                single(SlotId::Repetition),
                statements(SlotId::Components),
            ]
        },

        NodeKind::While => const {
            &[
                single(SlotId::Condition),
                statements(SlotId::Components),
            ]
        },

        NodeKind::Forever => const { &[statements(SlotId::Components)] },

        NodeKind::Branch => const {
            &[
                single(SlotId::Condition),
                statements(SlotId::Then),
                statements(SlotId::Else),
            ]
        },

        NodeKind::Assignment => const { &[single(SlotId::Lvalue), single(SlotId::Rvalue)] },

        NodeKind::Append => const { &[single(SlotId::List), single(SlotId::Item)] },

        NodeKind::Subscript => const { &[single(SlotId::List), single(SlotId::Index)] },

        NodeKind::Size => const { &[single(SlotId::List)] },

        NodeKind::Add
        | NodeKind::Subtract
        | NodeKind::Multiply
        | NodeKind::Divide
        | NodeKind::Modulo
        | NodeKind::Exponent
        | NodeKind::Eq
        | NodeKind::Ne
        | NodeKind::Gt
        | NodeKind::Lt
        | NodeKind::Ge
        | NodeKind::Le
        | NodeKind::And
        | NodeKind::Or => const { &[single(SlotId::Left), single(SlotId::Right)] },

        NodeKind::List => &[SlotSpec {
            id: SlotId::Items,
            shape: SlotShape::Items,
        }],

        NodeKind::ClearOutput
        | NodeKind::ClearScreen
        | NodeKind::Exit
        | NodeKind::Comment
        | NodeKind::Literal
        | NodeKind::Variable => &[],
    }
}

/// Shape of `slot` on `kind`, or `None` when the kind has no such slot.
///
/// A numeric `Cell` addresses one cell of a list's items.
pub fn slot_shape(kind: NodeKind, slot: SlotId) -> Option<SlotShape> {
    if let SlotId::Cell(_) = slot {
        return match kind {
            NodeKind::List => Some(SlotShape::Items),
            _ => None,
        };
    }

    slots_of(kind)
        .iter()
        .find(|spec| spec.id == slot)
        .map(|spec| spec.shape)
}

/// Whether `candidate` may occupy `slot` on a node of kind `target`.
///
/// Literal candidates are additionally checked by the primitive type of
/// their value; an unfilled literal (no value yet) passes every literal
/// check since it is the palette placeholder.
pub fn accepts(target: NodeKind, slot: SlotId, candidate: &Node) -> bool {
    use NodeKind::*;

    let kind = candidate.kind();
    match (target, slot) {
        // statement sequences take any statement
        (Repeat | While | Forever, SlotId::Components)
        | (Branch, SlotId::Then | SlotId::Else) => kind.is_statement(),

        (Print, SlotId::Expression) => kind.is_expression(),

        (Definition, SlotId::Expression) => {
            kind == Literal
                || kind == Variable
                || kind == List
                || kind.is_condition()
                || kind.is_arithmetic()
        }

        // lvalue must be assignable
        (Assignment, SlotId::Lvalue) => kind == Variable,

        (Assignment, SlotId::Rvalue) => {
            kind == Literal
                || kind == Variable
                || kind == List
                || kind.is_condition()
                || kind.is_operation()
        }

        (Append | Subscript | Size, SlotId::List) => {
            kind == Variable || kind == List || kind == Subscript
        }

        (Append, SlotId::Item) => {
            kind == Literal
                || kind == Variable
                || kind == Subscript
                || kind.is_condition()
                || kind.is_operation()
        }

        (Increment | Decrement, SlotId::Expression) => kind == Variable,

        (Repeat, SlotId::Repetition) => {
            kind == Variable || literal_of(candidate, PrimitiveKind::Number)
        }

        (While, SlotId::Condition) => {
            kind.is_condition()
                || kind == Variable
                || kind == Subscript
                || literal_of(candidate, PrimitiveKind::Number)
                || literal_of(candidate, PrimitiveKind::Boolean)
        }

        (Branch, SlotId::Condition) => boolean_operand(candidate),

        (DrawLine, SlotId::X1 | SlotId::Y1 | SlotId::X2 | SlotId::Y2)
        | (DrawRect, SlotId::X | SlotId::Y | SlotId::W | SlotId::H)
        | (DrawPixel, SlotId::X | SlotId::Y) => numeric_operand(candidate),

        // equality compares values of any primitive type
        (Eq | Ne, SlotId::Left | SlotId::Right) => {
            kind == Variable || matches!(candidate, Node::Literal { .. })
        }

        (Gt | Lt | Ge | Le, SlotId::Left | SlotId::Right) => numeric_operand(candidate),

        (
            Add | Subtract | Multiply | Divide | Modulo | Exponent,
            SlotId::Left | SlotId::Right,
        ) => numeric_operand(candidate),

        (And | Or, SlotId::Left | SlotId::Right) => boolean_operand(candidate),

        (Not, SlotId::Expression) => boolean_operand(candidate),

        (
            Sin | Cos | Tan | Round | Floor | Ceil | Abs | Sqrt | Log | Random,
            SlotId::Expression,
        ) => numeric_operand(candidate),

        (Subscript, SlotId::Index) => {
            kind == Variable
                || kind == Subscript
                || literal_of(candidate, PrimitiveKind::Number)
        }

        (List, SlotId::Items | SlotId::Cell(_)) => {
            kind == Variable || matches!(candidate, Node::Literal { .. }) || kind.is_operation()
        }

        // no such slot on this kind
        _ => false,
    }
}

fn literal_of(candidate: &Node, primitive: PrimitiveKind) -> bool {
    match candidate {
        Node::Literal { value, .. } => {
            value.as_ref().map_or(true, |value| value.kind() == primitive)
        }
        _ => false,
    }
}

fn numeric_operand(candidate: &Node) -> bool {
    let kind = candidate.kind();
    kind == NodeKind::Variable
        || kind.is_operation()
        || literal_of(candidate, PrimitiveKind::Number)
}

fn boolean_operand(candidate: &Node) -> bool {
    let kind = candidate.kind();
    kind == NodeKind::Variable
        || kind.is_condition()
        || literal_of(candidate, PrimitiveKind::Boolean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Primitive;

    fn literal(value: Option<Primitive>) -> Node {
        Node::Literal {
            id: "lit".to_string(),
            value,
        }
    }

    fn variable() -> Node {
        Node::Variable {
            id: "var".to_string(),
            definition_id: "def".to_string(),
        }
    }

    #[test]
    fn test_slot_names_round_trip() {
        for kind in NodeKind::ALL {
            for spec in slots_of(kind) {
                let name = spec.id.to_string();
                assert_eq!(name.parse::<SlotId>().unwrap(), spec.id);
            }
        }
    }

    #[test]
    fn test_numeric_slot_names_address_cells() {
        assert_eq!("3".parse::<SlotId>().unwrap(), SlotId::Cell(3));
        assert_eq!(SlotId::Cell(12).to_string(), "12");
        assert_eq!("bogus".parse::<SlotId>(), Err(UnknownSlotName("bogus".to_string())));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.as_str().parse::<NodeKind>().unwrap(), kind);
        }
        assert!("teleport".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_statement_expression_split() {
        let statements = NodeKind::ALL.iter().filter(|k| k.is_statement()).count();
        assert_eq!(statements, 17);
        assert_eq!(NodeKind::ALL.len() - statements, 30);
        assert!(NodeKind::Repeat.is_statement());
        assert!(NodeKind::Subscript.is_expression());
    }

    #[test]
    fn test_cell_shape_only_on_lists() {
        assert_eq!(slot_shape(NodeKind::List, SlotId::Cell(0)), Some(SlotShape::Items));
        assert_eq!(slot_shape(NodeKind::Print, SlotId::Cell(0)), None);
        assert_eq!(slot_shape(NodeKind::Print, SlotId::Expression), Some(SlotShape::Single));
        assert_eq!(slot_shape(NodeKind::Print, SlotId::Condition), None);
    }

    #[test]
    fn test_lvalue_accepts_variables_only() {
        assert!(accepts(NodeKind::Assignment, SlotId::Lvalue, &variable()));
        assert!(!accepts(
            NodeKind::Assignment,
            SlotId::Lvalue,
            &literal(Some(Primitive::Number(1.0)))
        ));
    }

    #[test]
    fn test_repetition_is_numeric() {
        assert!(accepts(
            NodeKind::Repeat,
            SlotId::Repetition,
            &literal(Some(Primitive::Number(5.0)))
        ));
        assert!(!accepts(
            NodeKind::Repeat,
            SlotId::Repetition,
            &literal(Some(Primitive::String("five".to_string())))
        ));
        // an unfilled literal is the palette placeholder
        assert!(accepts(NodeKind::Repeat, SlotId::Repetition, &literal(None)));
    }

    #[test]
    fn test_branch_condition_is_boolean() {
        let comparison = Node::Gt {
            id: "gt".to_string(),
            left: None,
            right: None,
        };
        assert!(accepts(NodeKind::Branch, SlotId::Condition, &comparison));
        assert!(accepts(
            NodeKind::Branch,
            SlotId::Condition,
            &literal(Some(Primitive::Boolean(true)))
        ));
        assert!(!accepts(
            NodeKind::Branch,
            SlotId::Condition,
            &literal(Some(Primitive::Number(1.0)))
        ));
    }

    #[test]
    fn test_bodies_take_statements_only() {
        let print = Node::Print {
            id: "p".to_string(),
            expression: None,
        };
        assert!(accepts(NodeKind::Repeat, SlotId::Components, &print));
        assert!(accepts(NodeKind::Branch, SlotId::Then, &print));
        assert!(!accepts(NodeKind::Repeat, SlotId::Components, &variable()));
    }

    #[test]
    fn test_equality_compares_any_literal() {
        assert!(accepts(
            NodeKind::Eq,
            SlotId::Left,
            &literal(Some(Primitive::String("a".to_string())))
        ));
        assert!(!accepts(
            NodeKind::Gt,
            SlotId::Left,
            &literal(Some(Primitive::String("a".to_string())))
        ));
    }

    #[test]
    fn test_operands_nest_operations() {
        let product = Node::Multiply {
            id: "m".to_string(),
            left: None,
            right: None,
        };
        assert!(accepts(NodeKind::Add, SlotId::Left, &product));
        assert!(accepts(NodeKind::DrawRect, SlotId::W, &product));
        assert!(!accepts(NodeKind::And, SlotId::Left, &product));
    }

    #[test]
    fn test_statements_never_fit_expression_slots() {
        let exit = Node::Exit {
            id: "x".to_string(),
        };
        for kind in NodeKind::ALL {
            for spec in slots_of(kind) {
                if spec.shape == SlotShape::Single {
                    assert!(
                        !accepts(kind, spec.id, &exit),
                        "{} slot {} accepted a statement",
                        kind,
                        spec.id
                    );
                }
            }
        }
    }
}
