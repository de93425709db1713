//! Linker: raw JSON document → linked schema arena.
//!
//! Builds one arena node per schema position (parent back-references
//! included), then resolves document-local `$ref` pointers (`#/...`) by
//! aliasing the referring slot to the target node's id. Aliasing is what
//! gives the translator its "shared by identity" contract, and it is how
//! cyclic schemas become expressible from plain JSON: a `$ref` back up
//! the tree turns into a child id pointing at an ancestor.
//!
//! Non-local `$ref`s are left on the node untouched; the translator
//! reports them as fatal `UnresolvedReference` errors.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::LinkError;
use crate::schema::{
    BoolOrSchema, Items, LinkedSchema, SchemaArena, SchemaId, SchemaNode, SchemaObject, SchemaRepr,
    TypeField,
};

/// Link a raw schema document. The root must be a JSON object.
pub fn link_document(doc: &Value) -> Result<LinkedSchema, LinkError> {
    if !doc.is_object() {
        return Err(LinkError::NonObjectRoot {
            found: json_kind(doc),
        });
    }
    let mut linker = Linker::default();
    let root = linker.link_schema(doc, None, String::new());
    linker.resolve_refs(root)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// JSON Pointer token escape (`~` → `~0`, `/` → `~1`). Node pointers are
/// stored escaped so `$ref` fragments compare as plain strings.
fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn string_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

#[derive(Default)]
struct Linker {
    arena: SchemaArena,
    by_pointer: HashMap<String, SchemaId>,
    /// object nodes carrying a document-local `$ref`
    pending_refs: Vec<(SchemaId, String)>,
    /// `tsEnumRef` pointers, resolved after the whole document is linked
    pending_enum_refs: Vec<(SchemaId, String)>,
}

impl Linker {
    // ------------------------------ Phase A ------------------------------- //

    fn link_schema(&mut self, v: &Value, parent: Option<SchemaId>, pointer: String) -> SchemaId {
        let Value::Object(map) = v else {
            // raw fragment in a schema position (e.g. `true`)
            return self.link_value(v, parent, pointer);
        };

        // allocate first so children can carry the parent back-reference
        let id = self.arena.alloc(SchemaNode {
            parent,
            pointer: pointer.clone(),
            repr: SchemaRepr::Object(Box::default()),
        });
        self.by_pointer.insert(pointer.clone(), id);

        let mut obj = SchemaObject::default();

        if let Some(s) = map.get("$ref").and_then(Value::as_str) {
            obj.reference = Some(s.to_string());
            if s.starts_with('#') {
                self.pending_refs.push((id, s.to_string()));
            }
        }
        obj.id = map
            .get("$id")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        obj.title = string_field(map, "title");
        obj.description = string_field(map, "description");
        obj.format = string_field(map, "format");
        obj.pattern = string_field(map, "pattern");

        obj.type_ = match map.get("type") {
            Some(Value::String(t)) => Some(TypeField::One(t.clone())),
            Some(Value::Array(ts)) => Some(TypeField::Many(
                ts.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            )),
            _ => None,
        };

        // enum members are raw JSON fragments, never sub-schemas
        if let Some(Value::Array(members)) = map.get("enum") {
            obj.enum_ = Some(
                members
                    .iter()
                    .enumerate()
                    .map(|(i, m)| self.link_value(m, Some(id), format!("{pointer}/enum/{i}")))
                    .collect(),
            );
        }

        obj.all_of = self.link_list(map, "allOf", id, &pointer);
        obj.any_of = self.link_list(map, "anyOf", id, &pointer);
        obj.one_of = self.link_list(map, "oneOf", id, &pointer);
        obj.extends = self.link_list(map, "extends", id, &pointer);

        obj.items = match map.get("items") {
            Some(Value::Array(xs)) => Some(Items::Many(
                xs.iter()
                    .enumerate()
                    .map(|(i, x)| self.link_schema(x, Some(id), format!("{pointer}/items/{i}")))
                    .collect(),
            )),
            Some(x @ Value::Object(_)) => {
                Some(Items::One(self.link_schema(x, Some(id), format!("{pointer}/items"))))
            }
            _ => None,
        };
        obj.additional_items = self.link_bool_or_schema(map, "additionalItems", id, &pointer);
        obj.min_items = map.get("minItems").and_then(Value::as_u64).map(|n| n as u32);
        obj.max_items = map.get("maxItems").and_then(Value::as_u64).map(|n| n as u32);

        obj.properties = self.link_map(map, "properties", id, &pointer);
        obj.pattern_properties = self.link_map(map, "patternProperties", id, &pointer);
        obj.definitions = self.link_map(map, "definitions", id, &pointer);
        obj.additional_properties =
            self.link_bool_or_schema(map, "additionalProperties", id, &pointer);
        obj.property_names = map.get("propertyNames").map(|v| {
            self.link_schema(v, Some(id), format!("{pointer}/propertyNames"))
        });
        if let Some(Value::Array(req)) = map.get("required") {
            obj.required = req
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }

        obj.ts_type = string_field(map, "tsType");
        if let Some(Value::Array(names)) = map.get("tsEnumNames") {
            obj.ts_enum_names = Some(
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            );
        }
        if let Some(s) = map.get("tsEnumRef").and_then(Value::as_str) {
            self.pending_enum_refs.push((id, s.to_string()));
        }
        obj.ts_extend_all_of = map
            .get("tsExtendAllOf")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if let Some(Value::Array(params)) = map.get("tsGenericParams") {
            obj.ts_generic_params = Some(
                params
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            );
        }
        if let Some(Value::Array(vals)) = map.get("tsGenericValues") {
            obj.ts_generic_values = Some(
                vals.iter()
                    .enumerate()
                    .map(|(i, v)| {
                        self.link_schema(v, Some(id), format!("{pointer}/tsGenericValues/{i}"))
                    })
                    .collect(),
            );
        }

        self.arena.get_mut(id).repr = SchemaRepr::Object(Box::new(obj));
        id
    }

    fn link_value(&mut self, v: &Value, parent: Option<SchemaId>, pointer: String) -> SchemaId {
        let id = self.arena.alloc(SchemaNode {
            parent,
            pointer: pointer.clone(),
            repr: SchemaRepr::Value(v.clone()),
        });
        self.by_pointer.insert(pointer, id);
        id
    }

    fn link_list(
        &mut self,
        map: &serde_json::Map<String, Value>,
        key: &str,
        parent: SchemaId,
        pointer: &str,
    ) -> Option<Vec<SchemaId>> {
        let Some(Value::Array(xs)) = map.get(key) else {
            return None;
        };
        Some(
            xs.iter()
                .enumerate()
                .map(|(i, x)| self.link_schema(x, Some(parent), format!("{pointer}/{key}/{i}")))
                .collect(),
        )
    }

    fn link_map(
        &mut self,
        map: &serde_json::Map<String, Value>,
        key: &str,
        parent: SchemaId,
        pointer: &str,
    ) -> Option<IndexMap<String, SchemaId>> {
        let Some(Value::Object(entries)) = map.get(key) else {
            return None;
        };
        Some(
            entries
                .iter()
                .map(|(k, v)| {
                    let child_ptr = format!("{pointer}/{key}/{}", escape_token(k));
                    (k.clone(), self.link_schema(v, Some(parent), child_ptr))
                })
                .collect(),
        )
    }

    fn link_bool_or_schema(
        &mut self,
        map: &serde_json::Map<String, Value>,
        key: &str,
        parent: SchemaId,
        pointer: &str,
    ) -> Option<BoolOrSchema> {
        match map.get(key) {
            Some(Value::Bool(b)) => Some(BoolOrSchema::Bool(*b)),
            Some(v @ Value::Object(_)) => Some(BoolOrSchema::Schema(self.link_schema(
                v,
                Some(parent),
                format!("{pointer}/{key}"),
            ))),
            _ => None,
        }
    }

    // ------------------------------ Phase B ------------------------------- //

    fn resolve_refs(mut self, root: SchemaId) -> Result<LinkedSchema, LinkError> {
        // one redirect per local-ref node
        let mut redirects: HashMap<SchemaId, SchemaId> = HashMap::new();
        for (id, raw) in &self.pending_refs {
            let target = self.lookup_fragment(raw)?;
            redirects.insert(*id, target);
        }

        // flatten chains (ref to a ref), rejecting ref-only loops
        let mut resolved: HashMap<SchemaId, SchemaId> = HashMap::new();
        for &id in redirects.keys() {
            let mut seen = HashSet::new();
            let mut cur = id;
            while let Some(&next) = redirects.get(&cur) {
                if !seen.insert(cur) {
                    return Err(LinkError::ReferenceCycle {
                        pointer: self.arena.pointer(id).to_string(),
                    });
                }
                cur = next;
            }
            resolved.insert(id, cur);
        }

        if !resolved.is_empty() {
            debug!(count = resolved.len(), "aliased local $ref nodes");
            let follow = |id: SchemaId| resolved.get(&id).copied().unwrap_or(id);
            for i in 0..self.arena.len() {
                let node = self.arena.get_mut(SchemaId(i as u32));
                if let SchemaRepr::Object(obj) = &mut node.repr {
                    map_children(obj, follow);
                }
            }
        }

        // tsEnumRef pointers resolve through the same alias map
        for (id, raw) in std::mem::take(&mut self.pending_enum_refs) {
            let target = self.lookup_fragment(&raw)?;
            let target = resolved.get(&target).copied().unwrap_or(target);
            if let SchemaRepr::Object(obj) = &mut self.arena.get_mut(id).repr {
                obj.ts_enum_ref = Some(target);
            }
        }

        let root = resolved.get(&root).copied().unwrap_or(root);
        Ok(LinkedSchema {
            arena: self.arena,
            root,
        })
    }

    fn lookup_fragment(&self, raw: &str) -> Result<SchemaId, LinkError> {
        let ptr = raw.strip_prefix('#').unwrap_or(raw);
        self.by_pointer
            .get(ptr)
            .copied()
            .ok_or_else(|| LinkError::DanglingPointer {
                pointer: raw.to_string(),
            })
    }
}

fn map_children(obj: &mut SchemaObject, f: impl Fn(SchemaId) -> SchemaId) {
    let map_vec = |xs: &mut Option<Vec<SchemaId>>, f: &dyn Fn(SchemaId) -> SchemaId| {
        if let Some(xs) = xs {
            for x in xs.iter_mut() {
                *x = f(*x);
            }
        }
    };
    map_vec(&mut obj.all_of, &f);
    map_vec(&mut obj.any_of, &f);
    map_vec(&mut obj.one_of, &f);
    map_vec(&mut obj.extends, &f);
    map_vec(&mut obj.enum_, &f);
    map_vec(&mut obj.ts_generic_values, &f);
    match &mut obj.items {
        Some(Items::One(id)) => *id = f(*id),
        Some(Items::Many(ids)) => {
            for id in ids.iter_mut() {
                *id = f(*id);
            }
        }
        None => {}
    }
    if let Some(BoolOrSchema::Schema(id)) = &mut obj.additional_items {
        *id = f(*id);
    }
    if let Some(BoolOrSchema::Schema(id)) = &mut obj.additional_properties {
        *id = f(*id);
    }
    if let Some(id) = &mut obj.property_names {
        *id = f(*id);
    }
    if let Some(id) = &mut obj.ts_enum_ref {
        *id = f(*id);
    }
    let map_map = |m: &mut Option<IndexMap<String, SchemaId>>, f: &dyn Fn(SchemaId) -> SchemaId| {
        if let Some(m) = m {
            for (_, id) in m.iter_mut() {
                *id = f(*id);
            }
        }
    };
    map_map(&mut obj.properties, &f);
    map_map(&mut obj.pattern_properties, &f);
    map_map(&mut obj.definitions, &f);
}
