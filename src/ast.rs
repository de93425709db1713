//! Language-neutral AST for type-declaration codegen.
//!
//! A closed tagged sum, arena-allocated. Cyclic type graphs are expressed
//! as ids pointing back at earlier slots: the translator installs an empty
//! placeholder, recurses, then fills the slot in place, so a cycle in the
//! schema becomes an `AstId` that resolves to the node being built.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

/// Key used for catch-all interface params (the `additionalProperties` /
/// `propertyNames` slot), distinguishing them from concrete property keys.
pub const CATCH_ALL_KEY: &str = "[k: string]";

// ------------------------------- Identity --------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstId(pub u32);

impl AstId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// -------------------------------- Nodes ----------------------------------- //

/// Attributes every AST node carries alongside its kind.
#[derive(Debug, Clone, Default)]
pub struct AstNode {
    /// Property name under which this node appears in its parent.
    pub key_name: Option<String>,
    /// Unique name marking eligibility for a top-level declaration.
    pub standalone_name: Option<String>,
    /// Doc comment, usually the schema `description`.
    pub comment: Option<String>,
    pub kind: AstKind,
}

#[derive(Debug, Clone, Default)]
pub enum AstKind {
    /// Pre-fill state installed before recursion descends. Must not
    /// survive a successful translation except as a cycle target that was
    /// filled in place.
    #[default]
    Placeholder,

    Any,
    Unknown,
    Never,
    Null,
    Boolean,
    Number,
    String,
    Object,

    /// A primitive JSON value or a whole JSON fragment.
    Literal(Value),
    /// Opaque target-language type text.
    CustomType(String),

    Array(AstId),
    Tuple(TupleAst),
    Union(Vec<AstId>),
    Intersection(Vec<AstId>),
    Enum(Vec<EnumMember>),
    Interface(InterfaceAst),

    /// Names a specific member of a referenced enum.
    TypeReference { target: AstId, member: AstId },
}

#[derive(Debug, Clone)]
pub struct TupleAst {
    pub params: Vec<AstId>,
    /// Tail element collecting the rest; present iff `maxItems` is
    /// absent or infinite.
    pub spread_param: Option<AstId>,
    pub min_items: u32,
    pub max_items: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub key_name: String,
    pub ast: AstId,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceAst {
    pub params: Vec<InterfaceParam>,
    /// Mapped-key constraint: the catch-all key is drawn from this named
    /// type instead of arbitrary strings.
    pub params_key_type: Option<AstId>,
    pub super_types: Vec<AstId>,
    pub generic_params: Vec<String>,
    pub generic_values: Vec<AstId>,
}

#[derive(Debug, Clone)]
pub struct InterfaceParam {
    pub key_name: String,
    pub ast: AstId,
    pub is_required: bool,
    pub is_pattern_property: bool,
    pub is_unreachable_definition: bool,
}

// -------------------------------- Arena ----------------------------------- //

#[derive(Debug, Clone, Default)]
pub struct AstArena {
    nodes: Vec<AstNode>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: AstNode) -> AstId {
        let id = AstId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocate the pre-fill placeholder for a cache slot. Metadata
    /// (names, comment) is set early so cycle targets already carry it.
    pub fn alloc_placeholder(
        &mut self,
        key_name: Option<String>,
        standalone_name: Option<String>,
        comment: Option<String>,
    ) -> AstId {
        self.alloc(AstNode {
            key_name,
            standalone_name,
            comment,
            kind: AstKind::Placeholder,
        })
    }

    pub fn get(&self, id: AstId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: AstId) -> &mut AstNode {
        &mut self.nodes[id.index()]
    }

    /// Fill a placeholder in place. Every id handed out for the slot
    /// (including cycle back-edges) now resolves to the finished kind.
    pub fn fill(&mut self, id: AstId, kind: AstKind) {
        self.nodes[id.index()].kind = kind;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Collect every `standalone_name` reachable from `root`.
    pub fn standalone_names(&self, root: AstId) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_names(root, &mut seen, &mut out);
        out
    }

    fn collect_names(&self, id: AstId, seen: &mut HashSet<AstId>, out: &mut Vec<String>) {
        if !seen.insert(id) {
            return;
        }
        let node = self.get(id);
        if let Some(name) = &node.standalone_name {
            out.push(name.clone());
        }
        for child in self.children_of(id) {
            self.collect_names(child, seen, out);
        }
    }

    fn children_of(&self, id: AstId) -> Vec<AstId> {
        match &self.get(id).kind {
            AstKind::Array(el) => vec![*el],
            AstKind::Tuple(t) => {
                let mut v = t.params.clone();
                v.extend(t.spread_param);
                v
            }
            AstKind::Union(xs) | AstKind::Intersection(xs) => xs.clone(),
            AstKind::Enum(members) => members.iter().map(|m| m.ast).collect(),
            AstKind::Interface(i) => {
                let mut v: Vec<AstId> = i.params.iter().map(|p| p.ast).collect();
                v.extend(i.params_key_type);
                v.extend(i.super_types.iter().copied());
                v.extend(i.generic_values.iter().copied());
                v
            }
            AstKind::TypeReference { target, member } => vec![*target, *member],
            _ => Vec::new(),
        }
    }
}

// ------------------------------ JSON render ------------------------------- //

/// Render the AST reachable from `root` as plain JSON, for inspection and
/// for the CLI output. A back-edge to a node still being rendered is
/// emitted as a `{"kind": "cycle", ...}` stub naming the target, so the
/// output is always finite.
pub fn render_json(arena: &AstArena, root: AstId) -> Value {
    let mut on_path = HashSet::new();
    render(arena, root, &mut on_path)
}

fn render(arena: &AstArena, id: AstId, on_path: &mut HashSet<AstId>) -> Value {
    let node = arena.get(id);
    if !on_path.insert(id) {
        let mut stub = Map::new();
        stub.insert("kind".into(), "cycle".into());
        if let Some(name) = &node.standalone_name {
            stub.insert("standaloneName".into(), name.clone().into());
        }
        stub.insert("node".into(), id.0.into());
        return Value::Object(stub);
    }

    let mut out = Map::new();
    if let Some(k) = &node.key_name {
        out.insert("keyName".into(), k.clone().into());
    }
    if let Some(n) = &node.standalone_name {
        out.insert("standaloneName".into(), n.clone().into());
    }
    if let Some(c) = &node.comment {
        out.insert("comment".into(), c.clone().into());
    }

    let kind = |s: &str| Value::from(s);
    match &node.kind {
        AstKind::Placeholder => {
            out.insert("kind".into(), kind("placeholder"));
        }
        AstKind::Any => {
            out.insert("kind".into(), kind("any"));
        }
        AstKind::Unknown => {
            out.insert("kind".into(), kind("unknown"));
        }
        AstKind::Never => {
            out.insert("kind".into(), kind("never"));
        }
        AstKind::Null => {
            out.insert("kind".into(), kind("null"));
        }
        AstKind::Boolean => {
            out.insert("kind".into(), kind("boolean"));
        }
        AstKind::Number => {
            out.insert("kind".into(), kind("number"));
        }
        AstKind::String => {
            out.insert("kind".into(), kind("string"));
        }
        AstKind::Object => {
            out.insert("kind".into(), kind("object"));
        }
        AstKind::Literal(v) => {
            out.insert("kind".into(), kind("literal"));
            out.insert("value".into(), v.clone());
        }
        AstKind::CustomType(text) => {
            out.insert("kind".into(), kind("customType"));
            out.insert("type".into(), text.clone().into());
        }
        AstKind::Array(el) => {
            out.insert("kind".into(), kind("array"));
            out.insert("items".into(), render(arena, *el, on_path));
        }
        AstKind::Tuple(t) => {
            out.insert("kind".into(), kind("tuple"));
            out.insert(
                "params".into(),
                t.params.iter().map(|p| render(arena, *p, on_path)).collect(),
            );
            if let Some(spread) = t.spread_param {
                out.insert("spreadParam".into(), render(arena, spread, on_path));
            }
            out.insert("minItems".into(), t.min_items.into());
            if let Some(max) = t.max_items {
                out.insert("maxItems".into(), max.into());
            }
        }
        AstKind::Union(xs) => {
            out.insert("kind".into(), kind("union"));
            out.insert(
                "params".into(),
                xs.iter().map(|p| render(arena, *p, on_path)).collect(),
            );
        }
        AstKind::Intersection(xs) => {
            out.insert("kind".into(), kind("intersection"));
            out.insert(
                "params".into(),
                xs.iter().map(|p| render(arena, *p, on_path)).collect(),
            );
        }
        AstKind::Enum(members) => {
            out.insert("kind".into(), kind("enum"));
            out.insert(
                "params".into(),
                members
                    .iter()
                    .map(|m| {
                        json!({
                            "memberName": m.key_name,
                            "value": render(arena, m.ast, on_path),
                        })
                    })
                    .collect(),
            );
        }
        AstKind::Interface(i) => {
            out.insert("kind".into(), kind("interface"));
            out.insert(
                "params".into(),
                i.params
                    .iter()
                    .map(|p| {
                        json!({
                            "keyName": p.key_name,
                            "isRequired": p.is_required,
                            "isPatternProperty": p.is_pattern_property,
                            "isUnreachableDefinition": p.is_unreachable_definition,
                            "ast": render(arena, p.ast, on_path),
                        })
                    })
                    .collect(),
            );
            if let Some(key_type) = i.params_key_type {
                out.insert("paramsKeyType".into(), render(arena, key_type, on_path));
            }
            if !i.super_types.is_empty() {
                out.insert(
                    "superTypes".into(),
                    i.super_types
                        .iter()
                        .map(|s| render(arena, *s, on_path))
                        .collect(),
                );
            }
            if !i.generic_params.is_empty() {
                out.insert(
                    "genericParams".into(),
                    i.generic_params.iter().cloned().map(Value::from).collect(),
                );
            }
            if !i.generic_values.is_empty() {
                out.insert(
                    "genericValues".into(),
                    i.generic_values
                        .iter()
                        .map(|v| render(arena, *v, on_path))
                        .collect(),
                );
            }
        }
        AstKind::TypeReference { target, member } => {
            out.insert("kind".into(), kind("typeReference"));
            out.insert("target".into(), render(arena, *target, on_path));
            out.insert("member".into(), render(arena, *member, on_path));
        }
    }

    on_path.remove(&id);
    Value::Object(out)
}
