//! The program envelope: metadata, canvas size and the statement forest.

use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use crate::ast::{Node, Primitive};

/// Version tag written into every serialized program.
pub const AST_VERSION: &str = "0.0.1";

/// The root statement sequence. Node ids are unique across the forest.
pub type Ast = Vec<Arc<Node>>;

/// Drawing surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// A complete program as persisted and exchanged with the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default = "default_name")]
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub canvas: Canvas,
    // older saves persist `null` for an empty program
    #[serde(default, deserialize_with = "nullable_ast")]
    pub ast: Ast,
}

fn default_name() -> String {
    "Untitled Program".to_string()
}

fn nullable_ast<'de, D>(deserializer: D) -> Result<Ast, D::Error>
where
    D: Deserializer<'de>,
{
    let ast = Option::<Ast>::deserialize(deserializer)?;
    Ok(ast.unwrap_or_default())
}

impl Default for Program {
    /// The blank program: a single print of "Hello, World!".
    fn default() -> Self {
        Self {
            name: default_name(),
            version: AST_VERSION.to_string(),
            author: None,
            description: None,
            canvas: Canvas::default(),
            ast: vec![Arc::new(Node::Print {
                id: "1".to_string(),
                expression: Some(Arc::new(Node::Literal {
                    id: "2".to_string(),
                    value: Some(Primitive::String("Hello, World!".to_string())),
                })),
            })],
        }
    }
}

impl Program {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_program_prints_hello() {
        let program = Program::default();
        assert_eq!(program.version, AST_VERSION);
        assert_eq!(program.ast.len(), 1);
        match &*program.ast[0] {
            Node::Print {
                id,
                expression: Some(expression),
            } => {
                assert_eq!(id, "1");
                match &**expression {
                    Node::Literal {
                        id,
                        value: Some(Primitive::String(text)),
                    } => {
                        assert_eq!(id, "2");
                        assert_eq!(text, "Hello, World!");
                    }
                    other => panic!("unexpected expression: {:?}", other),
                }
            }
            other => panic!("unexpected root: {:?}", other),
        }
    }

    #[test]
    fn test_program_round_trips_through_json() {
        let program = Program::default();
        let json = program.to_json().unwrap();
        assert_eq!(Program::from_json(&json).unwrap(), program);
    }

    #[test]
    fn test_null_ast_reads_as_empty() {
        let program =
            Program::from_json(r#"{ "version": "0.0.1", "ast": null }"#).unwrap();
        assert!(program.ast.is_empty());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let program = Program::from_json(r#"{ "version": "0.0.1" }"#).unwrap();
        assert_eq!(program.name, "Untitled Program");
        assert_eq!(program.canvas, Canvas::default());
        assert!(program.author.is_none());
        assert!(program.ast.is_empty());
    }
}
