pub mod ast;
pub mod schema;
pub mod factory;
pub mod id_generator;
pub mod program;

pub use ast::{Node, Primitive, PrimitiveKind, SlotMut, SlotRef};
pub use factory::create;
pub use id_generator::{get_program_id, IDGenerator};
pub use program::{Ast, Canvas, Program, AST_VERSION};
pub use schema::{
    accepts, slot_shape, slots_of, NodeKind, SlotId, SlotShape, SlotSpec, UnknownKindName,
    UnknownSlotName,
};
