//! Palette defaults: blank nodes ready to drop into a program.

use std::sync::Arc;

use crate::ast::{Node, Primitive, PrimitiveKind};
use crate::id_generator::IDGenerator;
use crate::schema::NodeKind;

/// A fresh node of `kind`, ids minted from `ids`.
///
/// Binary operators come pre-filled with two unfilled literals so they
/// render with editable operands; `print` and `definition` start with an
/// empty string, `repeat` with a count of one, everything else with
/// empty slots. Every default satisfies the slot rules in
/// [`crate::schema`].
pub fn create(kind: NodeKind, ids: &mut IDGenerator) -> Arc<Node> {
    let id = ids.new_id();
    let node = match kind {
        NodeKind::Print => Node::Print {
            id,
            expression: Some(string_literal(ids, "")),
        },
        NodeKind::ClearOutput => Node::ClearOutput { id },
        NodeKind::DrawLine => Node::DrawLine {
            id,
            x1: None,
            y1: None,
            x2: None,
            y2: None,
        },
        NodeKind::DrawRect => Node::DrawRect {
            id,
            x: None,
            y: None,
            w: None,
            h: None,
        },
        NodeKind::DrawPixel => Node::DrawPixel {
            id,
            x: None,
            y: None,
        },
        NodeKind::ClearScreen => Node::ClearScreen { id },
        NodeKind::Repeat => Node::Repeat {
            id,
            repetition: Some(number_literal(ids, 1.0)),
            components: vec![],
        },
        NodeKind::While => Node::While {
            id,
            condition: None,
            components: vec![],
        },
        NodeKind::Forever => Node::Forever {
            id,
            components: vec![],
        },
        NodeKind::Branch => Node::Branch {
            id,
            condition: None,
            then_branch: vec![],
            else_branch: vec![],
        },
        NodeKind::Exit => Node::Exit { id },
        NodeKind::Definition => Node::Definition {
            id,
            name: String::new(),
            primitive: PrimitiveKind::String,
            expression: Some(string_literal(ids, "")),
        },
        NodeKind::Assignment => Node::Assignment {
            id,
            lvalue: None,
            rvalue: None,
        },
        NodeKind::Append => Node::Append {
            id,
            list: None,
            item: None,
        },
        NodeKind::Increment => Node::Increment {
            id,
            expression: None,
        },
        NodeKind::Decrement => Node::Decrement {
            id,
            expression: None,
        },
        NodeKind::Comment => Node::Comment {
            id,
            text: String::new(),
        },
        NodeKind::Literal => Node::Literal { id, value: None },
        NodeKind::Variable => Node::Variable {
            id,
            definition_id: String::new(),
        },
        NodeKind::List => Node::List { id, items: vec![] },
        NodeKind::Subscript => Node::Subscript {
            id,
            list: None,
            index: None,
        },
        NodeKind::Size => Node::Size { id, list: None },
        NodeKind::Add => Node::Add {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Subtract => Node::Subtract {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Multiply => Node::Multiply {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Divide => Node::Divide {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Modulo => Node::Modulo {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Exponent => Node::Exponent {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Eq => Node::Eq {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Ne => Node::Ne {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Gt => Node::Gt {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Lt => Node::Lt {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Ge => Node::Ge {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::Le => Node::Le {
            id,
            left: Some(unfilled_literal(ids)),
            right: Some(unfilled_literal(ids)),
        },
        NodeKind::And => Node::And {
            id,
            left: None,
            right: None,
        },
        NodeKind::Or => Node::Or {
            id,
            left: None,
            right: None,
        },
        NodeKind::Not => Node::Not {
            id,
            expression: None,
        },
        NodeKind::Sin => Node::Sin {
            id,
            expression: None,
        },
        NodeKind::Cos => Node::Cos {
            id,
            expression: None,
        },
        NodeKind::Tan => Node::Tan {
            id,
            expression: None,
        },
        NodeKind::Round => Node::Round {
            id,
            expression: None,
        },
        NodeKind::Floor => Node::Floor {
            id,
            expression: None,
        },
        NodeKind::Ceil => Node::Ceil {
            id,
            expression: None,
        },
        NodeKind::Abs => Node::Abs {
            id,
            expression: None,
        },
        NodeKind::Sqrt => Node::Sqrt {
            id,
            expression: None,
        },
        NodeKind::Log => Node::Log {
            id,
            expression: None,
        },
        NodeKind::Random => Node::Random {
            id,
            expression: None,
        },
    };
    Arc::new(node)
}

fn unfilled_literal(ids: &mut IDGenerator) -> Arc<Node> {
    Arc::new(Node::Literal {
        id: ids.new_id(),
        value: None,
    })
}

fn string_literal(ids: &mut IDGenerator, value: &str) -> Arc<Node> {
    Arc::new(Node::Literal {
        id: ids.new_id(),
        value: Some(Primitive::String(value.to_string())),
    })
}

fn number_literal(ids: &mut IDGenerator, value: f64) -> Arc<Node> {
    Arc::new(Node::Literal {
        id: ids.new_id(),
        value: Some(Primitive::Number(value)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SlotRef;
    use crate::schema;

    fn collect_ids(node: &Node, out: &mut Vec<String>) {
        out.push(node.id().to_string());
        for child in node.children() {
            collect_ids(child, out);
        }
    }

    #[test]
    fn test_every_kind_creates_with_fresh_ids() {
        let mut ids = IDGenerator::new("t".to_string());
        let mut seen = Vec::new();
        for kind in NodeKind::ALL {
            let node = create(kind, &mut ids);
            assert_eq!(node.kind(), kind);
            collect_ids(&node, &mut seen);
        }
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn test_defaults_satisfy_slot_rules() {
        let mut ids = IDGenerator::new("t".to_string());
        for kind in NodeKind::ALL {
            let node = create(kind, &mut ids);
            for (slot, contents) in node.slots() {
                if let SlotRef::Single(Some(child)) = contents {
                    assert!(
                        schema::accepts(kind, slot, child),
                        "{} default violates its own {} slot",
                        kind,
                        slot
                    );
                }
            }
        }
    }

    #[test]
    fn test_binary_operators_come_prefilled() {
        let mut ids = IDGenerator::new("t".to_string());
        match &*create(NodeKind::Add, &mut ids) {
            Node::Add {
                left: Some(left),
                right: Some(right),
                ..
            } => {
                assert!(matches!(&**left, Node::Literal { value: None, .. }));
                assert!(matches!(&**right, Node::Literal { value: None, .. }));
            }
            other => panic!("unexpected default: {:?}", other),
        }
    }

    #[test]
    fn test_repeat_defaults_to_one_iteration() {
        let mut ids = IDGenerator::new("t".to_string());
        match &*create(NodeKind::Repeat, &mut ids) {
            Node::Repeat {
                repetition: Some(repetition),
                components,
                ..
            } => {
                assert!(components.is_empty());
                assert_eq!(
                    repetition.as_ref(),
                    &Node::Literal {
                        id: repetition.id().to_string(),
                        value: Some(Primitive::Number(1.0)),
                    }
                );
            }
            other => panic!("unexpected default: {:?}", other),
        }
    }
}
