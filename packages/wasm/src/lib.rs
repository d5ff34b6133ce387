use std::sync::Arc;

use wasm_bindgen::prelude::*;

use tenon_editor::{FieldPatch, Placement, ProgramStore};
use tenon_program::ast::Node;
use tenon_program::get_program_id;
use tenon_program::program::Program;
use tenon_program::schema::NodeKind;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// One editing session held behind the JavaScript boundary.
///
/// All values cross as JSON strings; the host re-renders from
/// `program()` after each edit.
#[wasm_bindgen]
pub struct ProgramSession {
    store: ProgramStore,
}

#[wasm_bindgen]
impl ProgramSession {
    /// Start a session on a blank program with the given name.
    #[wasm_bindgen(constructor)]
    pub fn new(name: &str) -> ProgramSession {
        ProgramSession {
            store: ProgramStore::in_memory(Program::new(name)),
        }
    }

    /// Replace the session contents with a previously saved program.
    pub fn load(&mut self, json: &str) -> Result<(), JsValue> {
        let program = Program::from_json(json)
            .map_err(|e| JsValue::from_str(&format!("Malformed program: {}", e)))?;
        self.store.load(program);
        Ok(())
    }

    /// Serialize the current program as JSON.
    pub fn program(&self) -> Result<String, JsValue> {
        self.store
            .program()
            .to_json()
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Serialize the node with `id`, or `undefined` when absent.
    pub fn find(&self, id: &str) -> Result<Option<String>, JsValue> {
        match self.store.find(id) {
            Some(node) => serde_json::to_string(node.as_ref())
                .map(Some)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e))),
            None => Ok(None),
        }
    }

    /// Insert a fresh palette node at the destination, returning its id.
    pub fn create(
        &mut self,
        kind: &str,
        destination_id: Option<String>,
        placement: &str,
    ) -> Result<String, JsValue> {
        let kind: NodeKind = kind
            .parse()
            .map_err(|e: tenon_program::UnknownKindName| JsValue::from_str(&e.to_string()))?;
        let placement = parse_placement(placement)?;
        self.store
            .create(kind, destination_id.as_deref(), placement)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Insert a node (with its subtree) given as JSON.
    pub fn insert(
        &mut self,
        node: &str,
        destination_id: Option<String>,
        placement: &str,
    ) -> Result<(), JsValue> {
        let node: Node = serde_json::from_str(node)
            .map_err(|e| JsValue::from_str(&format!("Malformed node: {}", e)))?;
        let placement = parse_placement(placement)?;
        self.store
            .insert(Arc::new(node), destination_id.as_deref(), placement)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Remove the node with `id` and its subtree.
    pub fn remove(&mut self, id: &str) {
        self.store.remove(id);
    }

    /// Patch scalar fields on the node with `id`.
    #[wasm_bindgen(js_name = updateFields)]
    pub fn update_fields(&mut self, id: &str, patch: &str) -> Result<(), JsValue> {
        let patch: FieldPatch = serde_json::from_str(patch)
            .map_err(|e| JsValue::from_str(&format!("Malformed patch: {}", e)))?;
        self.store.update_fields(id, &patch);
        Ok(())
    }

    /// Relocate a node and its subtree to a new destination.
    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node(
        &mut self,
        id: &str,
        destination_id: Option<String>,
        placement: &str,
    ) -> Result<(), JsValue> {
        let placement = parse_placement(placement)?;
        self.store
            .move_node(id, destination_id.as_deref(), placement)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Roll back the most recent edit. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Resize the drawing canvas. Not recorded in undo history.
    #[wasm_bindgen(js_name = setCanvasSize)]
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.store.set_canvas_size(width, height);
    }

    #[wasm_bindgen(js_name = canvasWidth)]
    pub fn canvas_width(&self) -> u32 {
        self.store.program().canvas.width
    }

    #[wasm_bindgen(js_name = canvasHeight)]
    pub fn canvas_height(&self) -> u32 {
        self.store.program().canvas.height
    }
}

fn parse_placement(json: &str) -> Result<Placement, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Malformed placement: {}", e)))
}

/// Every node kind the palette can offer, as a JSON array of names.
#[wasm_bindgen(js_name = nodeKinds)]
pub fn node_kinds() -> Result<String, JsValue> {
    let names: Vec<&str> = NodeKind::ALL.iter().map(|kind| kind.as_str()).collect();
    serde_json::to_string(&names)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Stable id seed for a program name.
#[wasm_bindgen(js_name = programId)]
pub fn program_id_js(name: &str) -> String {
    get_program_id(name)
}
