//! Linked schema data model.
//!
//! The translator never touches raw JSON: it walks an arena of linked
//! nodes produced by the linker (or assembled directly by tests). Node
//! identity is the arena index, which is what "shared by identity" means
//! after `$ref` resolution: two slots pointing at the same `SchemaId` are
//! the same schema, and cycles are just ids that point back up the tree.

use indexmap::IndexMap;
use serde_json::Value;

// ------------------------------- Identity --------------------------------- //

/// Identity of a linked schema node. Reference equality in the source
/// document graph maps to equality of these ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub u32);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// -------------------------------- Nodes ----------------------------------- //

/// One linked node: a parent back-reference (None at the root), the JSON
/// Pointer it was linked at (for error reporting), and the payload.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub parent: Option<SchemaId>,
    pub pointer: String,
    pub repr: SchemaRepr,
}

/// Payload of a linked node. Sub-schema positions hold `Object`; raw JSON
/// fragments (enum members, literal payloads) hold `Value` wholesale.
#[derive(Debug, Clone)]
pub enum SchemaRepr {
    Value(Value),
    Object(Box<SchemaObject>),
}

/// The `type` attribute: a single type name or a union of type names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeField {
    One(String),
    Many(Vec<String>),
}

/// The `items` attribute: homogeneous (one schema) or tuple (a list).
#[derive(Debug, Clone)]
pub enum Items {
    One(SchemaId),
    Many(Vec<SchemaId>),
}

/// `additionalProperties` / `additionalItems`: a boolean or a schema.
#[derive(Debug, Clone, Copy)]
pub enum BoolOrSchema {
    Bool(bool),
    Schema(SchemaId),
}

/// An object-shaped schema node with the standard JSON Schema attributes
/// plus the code-generation extensions. Maps preserve document insertion
/// order, which the translator's param lists inherit.
#[derive(Debug, Clone, Default)]
pub struct SchemaObject {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// An unresolved `$ref`. Fatal if it survives into translation.
    pub reference: Option<String>,

    pub type_: Option<TypeField>,
    pub enum_: Option<Vec<SchemaId>>,
    pub all_of: Option<Vec<SchemaId>>,
    pub any_of: Option<Vec<SchemaId>>,
    pub one_of: Option<Vec<SchemaId>>,

    pub items: Option<Items>,
    pub additional_items: Option<BoolOrSchema>,
    pub min_items: Option<u32>,
    pub max_items: Option<u32>,

    pub properties: Option<IndexMap<String, SchemaId>>,
    pub pattern_properties: Option<IndexMap<String, SchemaId>>,
    pub additional_properties: Option<BoolOrSchema>,
    pub property_names: Option<SchemaId>,
    pub required: Vec<String>,
    pub extends: Option<Vec<SchemaId>>,
    pub definitions: Option<IndexMap<String, SchemaId>>,

    pub format: Option<String>,
    pub pattern: Option<String>,

    // codegen extensions
    pub ts_type: Option<String>,
    pub ts_enum_names: Option<Vec<String>>,
    pub ts_enum_ref: Option<SchemaId>,
    pub ts_extend_all_of: bool,
    pub ts_generic_params: Option<Vec<String>>,
    pub ts_generic_values: Option<Vec<SchemaId>>,
}

impl SchemaObject {
    /// True when the node can derive a standalone name from its own
    /// attributes alone (classifier rule; definition keys are a
    /// translation-time fallback and deliberately not consulted here).
    pub fn has_standalone_name_hint(&self) -> bool {
        self.title.is_some() || self.id.is_some()
    }

    /// All child sub-schema ids, in attribute order. Used by the
    /// definitions walk; enum members are raw values and are skipped.
    pub fn children(&self) -> Vec<SchemaId> {
        let mut out = Vec::new();
        for xs in [&self.all_of, &self.any_of, &self.one_of].into_iter().flatten() {
            out.extend(xs.iter().copied());
        }
        match &self.items {
            Some(Items::One(id)) => out.push(*id),
            Some(Items::Many(ids)) => out.extend(ids.iter().copied()),
            None => {}
        }
        if let Some(BoolOrSchema::Schema(id)) = self.additional_items {
            out.push(id);
        }
        for map in [&self.properties, &self.pattern_properties, &self.definitions]
            .into_iter()
            .flatten()
        {
            out.extend(map.values().copied());
        }
        if let Some(BoolOrSchema::Schema(id)) = self.additional_properties {
            out.push(id);
        }
        if let Some(id) = self.property_names {
            out.push(id);
        }
        for xs in [&self.extends, &self.ts_generic_values].into_iter().flatten() {
            out.extend(xs.iter().copied());
        }
        out
    }
}

// -------------------------------- Arena ----------------------------------- //

/// Owns every linked node for one document.
#[derive(Debug, Clone, Default)]
pub struct SchemaArena {
    nodes: Vec<SchemaNode>,
}

impl SchemaArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: SchemaNode) -> SchemaId {
        let id = SchemaId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: SchemaId) -> &mut SchemaNode {
        &mut self.nodes[id.index()]
    }

    /// The object payload at `id`, if the node is object-shaped.
    pub fn obj(&self, id: SchemaId) -> Option<&SchemaObject> {
        match &self.get(id).repr {
            SchemaRepr::Object(o) => Some(o),
            SchemaRepr::Value(_) => None,
        }
    }

    pub fn pointer(&self, id: SchemaId) -> &str {
        &self.get(id).pointer
    }

    /// Follow parent back-references to the document root.
    pub fn root_of(&self, mut id: SchemaId) -> SchemaId {
        while let Some(parent) = self.get(id).parent {
            id = parent;
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A fully linked document: the arena plus its root node.
#[derive(Debug, Clone)]
pub struct LinkedSchema {
    pub arena: SchemaArena,
    pub root: SchemaId,
}
