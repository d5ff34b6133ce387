//! Tests for chained edits over the raw engine
//!
//! Covers:
//! - id uniqueness across whole edit chains
//! - removal idempotence and find/remove agreement
//! - moves that restructure loops and branches
//! - rejected edits leaving the forest untouched

use std::sync::Arc;

use tenon_editor::{
    emplace, find, move_node, remove, update_fields, EditError, FieldPatch, Placement, SlotId,
};
use tenon_program::ast::{Node, Primitive};
use tenon_program::factory;
use tenon_program::id_generator::IDGenerator;
use tenon_program::program::{Ast, Program};
use tenon_program::schema::NodeKind;

fn collect_ids(node: &Node, out: &mut Vec<String>) {
    out.push(node.id().to_string());
    for child in node.children() {
        collect_ids(child, out);
    }
}

fn all_ids(ast: &Ast) -> Vec<String> {
    let mut ids = Vec::new();
    for root in ast {
        collect_ids(root, &mut ids);
    }
    ids
}

fn assert_unique_ids(ast: &Ast) {
    let mut ids = all_ids(ast);
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total, "forest holds duplicate ids");
}

fn literal(id: &str, value: impl Into<Primitive>) -> Arc<Node> {
    Arc::new(Node::Literal {
        id: id.to_string(),
        value: Some(value.into()),
    })
}

fn print(id: &str, expression: Option<Arc<Node>>) -> Arc<Node> {
    Arc::new(Node::Print {
        id: id.to_string(),
        expression,
    })
}

/// while "w" [ branch "b" { true: [print "p1"], false: [print "p2"] } ]
fn nested() -> Ast {
    vec![Arc::new(Node::While {
        id: "w".to_string(),
        condition: Some(Arc::new(Node::Eq {
            id: "eq".to_string(),
            left: Some(literal("l1", 1.0)),
            right: Some(literal("l2", 1.0)),
        })),
        components: vec![Arc::new(Node::Branch {
            id: "b".to_string(),
            condition: Some(literal("c", true)),
            then_branch: vec![print("p1", Some(literal("t1", "yes")))],
            else_branch: vec![print("p2", Some(literal("t2", "no")))],
        })],
    })]
}

#[test]
fn test_ids_stay_unique_across_an_edit_chain() {
    let mut ids = IDGenerator::new("chain".to_string());
    let mut ast = nested();
    assert_unique_ids(&ast);

    // grow the program from the palette
    let repeat = factory::create(NodeKind::Repeat, &mut ids);
    let repeat_id = repeat.id().to_string();
    ast = emplace(&ast, repeat, Some("w"), Placement::Append).unwrap();
    assert_unique_ids(&ast);

    let assignment = factory::create(NodeKind::Assignment, &mut ids);
    ast = emplace(
        &ast,
        assignment,
        Some(repeat_id.as_str()),
        Placement::Insert {
            slot: SlotId::Components,
        },
    )
    .unwrap();
    assert_unique_ids(&ast);

    // shuffle and shrink it
    ast = move_node(&ast, "p2", Some("p1"), Placement::Append).unwrap();
    assert_unique_ids(&ast);
    ast = remove(&ast, "b");
    assert_unique_ids(&ast);
    assert!(find(&ast, "p1").is_none());
}

#[test]
fn test_removal_is_idempotent() {
    let ast = nested();
    let once = remove(&ast, "p1");
    let twice = remove(&once, "p1");
    assert_eq!(once, twice);
    assert!(find(&twice, "p1").is_none());
    // the sibling arm is untouched
    assert_eq!(find(&twice, "p2").unwrap().id(), "p2");
}

#[test]
fn test_find_agrees_with_remove() {
    let ast = nested();
    for id in all_ids(&ast) {
        assert!(find(&ast, &id).is_some());
        let next = remove(&ast, &id);
        assert!(find(&next, &id).is_none(), "{} survived removal", id);
    }
}

#[test]
fn test_removing_a_parent_takes_the_subtree() {
    let ast = nested();
    let next = remove(&ast, "b");
    for id in ["b", "c", "p1", "t1", "p2", "t2"] {
        assert!(find(&next, id).is_none(), "{} survived removal", id);
    }
    assert!(find(&next, "w").is_some());
}

#[test]
fn test_move_round_trips() {
    let ast = nested();

    // out of the branch arm, then back in
    let out = move_node(&ast, "p1", None, Placement::Prepend).unwrap();
    assert_eq!(out[0].id(), "p1");
    let back = move_node(
        &out,
        "p1",
        Some("b"),
        Placement::Insert { slot: SlotId::Then },
    )
    .unwrap();
    assert_eq!(back, ast);
}

#[test]
fn test_rejected_edits_change_nothing() {
    let ast = nested();

    // a statement cannot sit beside an expression
    assert_eq!(
        move_node(&ast, "p1", Some("c"), Placement::Append),
        Err(EditError::ExpressionDestination)
    );
    // a loop cannot move into its own body
    assert_eq!(
        move_node(&ast, "w", Some("p1"), Placement::Prepend),
        Err(EditError::CycleDetected)
    );
    // expressions never join statement sequences
    assert_eq!(
        move_node(&ast, "c", Some("p1"), Placement::Append),
        Err(EditError::NotAStatement)
    );
    // the eq operands take numbers or variables, not prints
    assert_eq!(
        move_node(
            &ast,
            "p1",
            Some("eq"),
            Placement::Insert {
                slot: SlotId::Left
            }
        ),
        Err(EditError::SlotRejected {
            target: NodeKind::Eq,
            slot: SlotId::Left,
            candidate: NodeKind::Print,
        })
    );

    // nothing moved, nothing vanished
    assert_eq!(all_ids(&ast), all_ids(&nested()));
}

#[test]
fn test_emplace_refuses_colliding_subtrees() {
    let ast = nested();
    // "t2" already exists deep in the else arm
    let colliding = print("fresh", Some(literal("t2", "boom")));
    assert_eq!(
        emplace(&ast, colliding, Some("w"), Placement::Append),
        Err(EditError::DuplicateId("t2".to_string()))
    );
}

#[test]
fn test_update_fields_round_trip_through_json() {
    let mut program = Program::default();
    program.ast = nested();

    let patch = FieldPatch {
        value: Some(Primitive::String("maybe".to_string())),
        ..Default::default()
    };
    program.ast = update_fields(&program.ast, "t1", &patch);

    let json = program.to_json().unwrap();
    let reloaded = Program::from_json(&json).unwrap();
    assert_eq!(reloaded, program);
    match &**find(&reloaded.ast, "t1").unwrap() {
        Node::Literal {
            value: Some(Primitive::String(text)),
            ..
        } => assert_eq!(text, "maybe"),
        other => panic!("unexpected node: {:?}", other),
    }
}

#[test]
fn test_append_beside_a_nested_statement() {
    let mut ids = IDGenerator::new("seq".to_string());
    let ast = nested();

    let exit = factory::create(NodeKind::Exit, &mut ids);
    let exit_id = exit.id().to_string();
    let next = emplace(&ast, exit, Some("p1"), Placement::Append).unwrap();

    match &**find(&next, "b").unwrap() {
        Node::Branch { then_branch, .. } => {
            let order: Vec<&str> = then_branch.iter().map(|c| c.id()).collect();
            assert_eq!(order, vec!["p1", exit_id.as_str()]);
        }
        other => panic!("unexpected node: {:?}", other),
    }
}
