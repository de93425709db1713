//! Recursive schema-to-AST translator.
//!
//! The dispatcher: classify a node, build one AST per tag, intersect when
//! a node classifies to several tags. Two properties drive the shape of
//! this module:
//!
//! - Identity preservation. A schema node reached twice yields the same
//!   AST id both times, keyed by `(node identity, tag)`.
//! - Cycle termination. An empty placeholder is installed in the cache
//!   before recursion descends, so a schema that reaches itself resolves
//!   to the slot being built and the fill closes the loop.

pub mod array;
pub mod interface;

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, trace};

use crate::ast::{AstArena, AstId, AstKind, AstNode, EnumMember};
use crate::classify::{classify, SchemaType};
use crate::definitions::DefinitionsIndex;
use crate::error::TranslateError;
use crate::names;
use crate::options::Options;
use crate::schema::{LinkedSchema, SchemaArena, SchemaId, SchemaObject, SchemaRepr, TypeField};

/// Result of one translation run.
#[derive(Debug)]
pub struct Translation {
    pub asts: AstArena,
    pub root: AstId,
}

/// Translate a linked document into an AST. The arena is borrowed mutably
/// because stripped-attribute clones (multi-tag and multi-type nodes) are
/// allocated alongside the caller's nodes.
pub fn translate_root(
    linked: &mut LinkedSchema,
    options: Options,
) -> Result<Translation, TranslateError> {
    let definitions = DefinitionsIndex::build(&linked.arena, linked.root);
    let mut tx = Translator {
        arena: &mut linked.arena,
        asts: AstArena::new(),
        options,
        definitions,
        cache: HashMap::new(),
        used_names: HashSet::new(),
        stripped: HashMap::new(),
        variants: HashMap::new(),
    };
    let root = tx.translate(linked.root, None)?;
    Ok(Translation { asts: tx.asts, root })
}

// -------------------------------- Cache ----------------------------------- //

/// Cache key: node identity plus what is being built for it. `Multi` is
/// the dedicated slot for the outer intersection of a node that
/// classifies to several tags, so identity preservation holds for those
/// nodes too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    Literal(SchemaId),
    Tagged(SchemaId, SchemaType),
    Multi(SchemaId),
}

/// How the standalone name is derived for a given build.
enum NameRule {
    /// `title` / `$id` / definition key, name optional.
    Optional,
    /// Like `Optional` with the parent key as a last resort, and the
    /// build fails if nothing seeds a name.
    Required(&'static str),
}

// ------------------------------ Translator -------------------------------- //

pub struct Translator<'a> {
    arena: &'a mut SchemaArena,
    pub(crate) asts: AstArena,
    pub(crate) options: Options,
    definitions: DefinitionsIndex,
    cache: HashMap<CacheKey, AstId>,
    used_names: HashSet<String>,
    /// memoized name-stripped clones for the multi-tag path
    stripped: HashMap<SchemaId, SchemaId>,
    /// memoized single-type clones for the array-typed union path
    variants: HashMap<(SchemaId, String), SchemaId>,
}

enum NodeShape {
    Literal(Value),
    Object(Vec<SchemaType>),
}

impl Translator<'_> {
    /// Translate one node, reusing cached results.
    pub fn translate(
        &mut self,
        id: SchemaId,
        key_name: Option<&str>,
    ) -> Result<AstId, TranslateError> {
        match self.shape_of(id) {
            NodeShape::Literal(value) => Ok(self.translate_literal(id, value, key_name)),
            NodeShape::Object(tags) => {
                if tags.len() == 1 {
                    self.translate_tagged(id, tags[0], key_name)
                } else {
                    self.translate_multi(id, &tags, key_name)
                }
            }
        }
    }

    fn shape_of(&self, id: SchemaId) -> NodeShape {
        match &self.arena.get(id).repr {
            SchemaRepr::Value(v) => NodeShape::Literal(v.clone()),
            SchemaRepr::Object(obj) => {
                let tags = classify(obj);
                trace!(?tags, pointer = self.arena.pointer(id), "classified");
                NodeShape::Object(tags)
            }
        }
    }

    /// Clone of the object payload at `id`. Cheap relative to the borrow
    /// gymnastics of holding `&SchemaObject` across recursive calls.
    fn schema(&self, id: SchemaId) -> SchemaObject {
        match &self.arena.get(id).repr {
            SchemaRepr::Object(obj) => (**obj).clone(),
            SchemaRepr::Value(_) => SchemaObject::default(),
        }
    }

    fn pointer_of(&self, id: SchemaId) -> String {
        self.arena.pointer(id).to_string()
    }

    pub(crate) fn any_kind(&self) -> AstKind {
        if self.options.unknown_any {
            AstKind::Unknown
        } else {
            AstKind::Any
        }
    }

    /// Fresh ANY (or UNKNOWN) sentinel node.
    pub(crate) fn any_ast(&mut self, key_name: Option<&str>) -> AstId {
        let kind = self.any_kind();
        self.asts.alloc(AstNode {
            key_name: key_name.map(str::to_string),
            kind,
            ..Default::default()
        })
    }

    /// Append an origin note to an AST node's doc comment.
    pub(crate) fn append_comment(&mut self, ast: AstId, text: String) {
        let node = self.asts.get_mut(ast);
        node.comment = Some(match node.comment.take() {
            Some(existing) => format!("{existing}\n\n{text}"),
            None => text,
        });
    }

    fn lift_key_name(&mut self, ast: AstId, key_name: Option<&str>) {
        if let Some(key) = key_name {
            let node = self.asts.get_mut(ast);
            if node.key_name.is_none() {
                node.key_name = Some(key.to_string());
            }
        }
    }

    // ------------------------------ Literals ------------------------------ //

    fn translate_literal(&mut self, id: SchemaId, value: Value, key_name: Option<&str>) -> AstId {
        if let Some(&ast) = self.cache.get(&CacheKey::Literal(id)) {
            self.lift_key_name(ast, key_name);
            return ast;
        }
        let ast = self.asts.alloc(AstNode {
            key_name: key_name.map(str::to_string),
            kind: AstKind::Literal(value),
            ..Default::default()
        });
        self.cache.insert(CacheKey::Literal(id), ast);
        ast
    }

    // ----------------------------- Single tag ----------------------------- //

    fn translate_tagged(
        &mut self,
        id: SchemaId,
        tag: SchemaType,
        key_name: Option<&str>,
    ) -> Result<AstId, TranslateError> {
        let key = CacheKey::Tagged(id, tag);
        if let Some(&ast) = self.cache.get(&key) {
            trace!(?tag, pointer = self.arena.pointer(id), "cache hit");
            self.lift_key_name(ast, key_name);
            return Ok(ast);
        }

        // Names and metadata are claimed before children translate, so
        // cycle targets already carry them and name priority follows
        // document order.
        let rule = match tag {
            SchemaType::NamedEnum => NameRule::Required("a named enum"),
            _ => NameRule::Optional,
        };
        let slot = self.placeholder(id, key_name, rule)?;
        self.cache.insert(key, slot);
        self.build_tagged(id, tag, key_name, slot)?;
        Ok(slot)
    }

    /// Allocate the placeholder for `id`, with comment and standalone
    /// name already attached.
    fn placeholder(
        &mut self,
        id: SchemaId,
        key_name: Option<&str>,
        rule: NameRule,
    ) -> Result<AstId, TranslateError> {
        let obj = self.schema(id);
        let def_key = self.definitions.key_for(id).map(str::to_string);
        let seed = obj.title.clone().or(obj.id.clone()).or(def_key);
        let seed = match &rule {
            NameRule::Required(_) => seed.or_else(|| key_name.map(str::to_string)),
            NameRule::Optional => seed,
        };
        let standalone_name = match (seed, rule) {
            (Some(seed), _) => {
                let name = names::generate_name(&seed, &mut self.used_names);
                debug!(name = name.as_str(), pointer = self.arena.pointer(id), "standalone name");
                Some(name)
            }
            (None, NameRule::Required(role)) => {
                return Err(TranslateError::MissingName {
                    pointer: self.pointer_of(id),
                    role,
                })
            }
            (None, NameRule::Optional) => None,
        };
        Ok(self.asts.alloc_placeholder(
            key_name.map(str::to_string),
            standalone_name,
            obj.description.clone(),
        ))
    }

    fn build_tagged(
        &mut self,
        id: SchemaId,
        tag: SchemaType,
        _key_name: Option<&str>,
        slot: AstId,
    ) -> Result<(), TranslateError> {
        let kind = match tag {
            SchemaType::Any => self.any_kind(),
            SchemaType::Boolean => AstKind::Boolean,
            SchemaType::Null => AstKind::Null,
            SchemaType::Number => AstKind::Number,
            SchemaType::String => AstKind::String,
            SchemaType::Object => AstKind::Object,
            SchemaType::Never => AstKind::Never,
            SchemaType::CustomType => {
                AstKind::CustomType(self.schema(id).ts_type.unwrap_or_default())
            }
            SchemaType::Reference => {
                return Err(TranslateError::UnresolvedReference {
                    pointer: self.pointer_of(id),
                    reference: self.schema(id).reference.unwrap_or_default(),
                })
            }
            SchemaType::AllOf => return self.build_all_of(id, slot),
            SchemaType::AnyOf => {
                let children = self.schema(id).any_of.unwrap_or_default();
                AstKind::Union(self.translate_all(&children)?)
            }
            SchemaType::OneOf => {
                let children = self.schema(id).one_of.unwrap_or_default();
                AstKind::Union(self.translate_all(&children)?)
            }
            SchemaType::Union => return self.build_type_union(id, slot),
            SchemaType::NamedEnum => return self.build_named_enum(id, slot),
            SchemaType::UnnamedEnum => return self.build_unnamed_enum(id, slot),
            SchemaType::NamedSchema | SchemaType::UnnamedSchema => {
                return interface::build(self, id, slot)
            }
            SchemaType::TypedArray | SchemaType::UntypedArray => return array::build(self, id, slot),
        };
        self.asts.fill(slot, kind);
        Ok(())
    }

    fn translate_all(&mut self, children: &[SchemaId]) -> Result<Vec<AstId>, TranslateError> {
        children.iter().map(|&c| self.translate(c, None)).collect()
    }

    // ------------------------------- allOf -------------------------------- //

    /// Plain `allOf` intersects its children. When a child carries the
    /// `tsExtendAllOf` flag, the node instead becomes an interface taking
    /// its params from the flagged child, with the remaining children as
    /// named super-types.
    fn build_all_of(&mut self, id: SchemaId, slot: AstId) -> Result<(), TranslateError> {
        let children = self.schema(id).all_of.unwrap_or_default();
        let flagged = children
            .iter()
            .copied()
            .find(|&c| self.schema(c).ts_extend_all_of);

        let Some(flagged) = flagged else {
            let params = self.translate_all(&children)?;
            self.asts.fill(slot, AstKind::Intersection(params));
            return Ok(());
        };

        let mut super_types = Vec::new();
        for &child in children.iter().filter(|&&c| c != flagged) {
            let sup = self.translate(child, None)?;
            self.require_named_interface(sup, child)?;
            super_types.push(sup);
        }
        let parent_name = interface::display_name(self, slot);
        let params = interface::build_params(self, flagged, &parent_name)?;
        let obj = self.schema(id);
        let generic_params = obj.ts_generic_params.unwrap_or_default();
        let generic_values_src = obj.ts_generic_values.unwrap_or_default();
        let generic_values = self.translate_all(&generic_values_src)?;
        self.asts.fill(
            slot,
            AstKind::Interface(crate::ast::InterfaceAst {
                params,
                params_key_type: None,
                super_types,
                generic_params,
                generic_values,
            }),
        );
        Ok(())
    }

    /// A super-type must carry a standalone name and resolve to an
    /// interface (or an intersection of interfaces). A placeholder is
    /// accepted: it means the target is an ancestor still being built.
    pub(crate) fn require_named_interface(
        &self,
        ast: AstId,
        schema_id: SchemaId,
    ) -> Result<(), TranslateError> {
        let node = self.asts.get(ast);
        if node.standalone_name.is_none() {
            return Err(TranslateError::MissingName {
                pointer: self.pointer_of(schema_id),
                role: "a super-type",
            });
        }
        let ok = match &node.kind {
            AstKind::Interface(_) | AstKind::Placeholder => true,
            AstKind::Intersection(members) => members.iter().all(|&m| {
                matches!(
                    self.asts.get(m).kind,
                    AstKind::Interface(_) | AstKind::Placeholder
                )
            }),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(TranslateError::InvalidSuperType {
                pointer: self.pointer_of(schema_id),
            })
        }
    }

    // -------------------------- multi-type union -------------------------- //

    /// `type: [...]` becomes a union with one member per type name, each
    /// built from a clone of the schema pinned to that single type, with
    /// the naming attributes stripped (the union owns them).
    fn build_type_union(&mut self, id: SchemaId, slot: AstId) -> Result<(), TranslateError> {
        let names = match self.schema(id).type_ {
            Some(TypeField::Many(names)) => names,
            _ => Vec::new(),
        };
        let mut params = Vec::with_capacity(names.len());
        for name in names {
            let variant = self.variant_clone(id, &name);
            params.push(self.translate(variant, None)?);
        }
        self.asts.fill(slot, AstKind::Union(params));
        Ok(())
    }

    fn variant_clone(&mut self, id: SchemaId, type_name: &str) -> SchemaId {
        if let Some(&v) = self.variants.get(&(id, type_name.to_string())) {
            return v;
        }
        let mut obj = self.schema(id);
        obj.type_ = Some(TypeField::One(type_name.to_string()));
        obj.title = None;
        obj.id = None;
        obj.description = None;
        let node = self.arena.get(id);
        let (parent, pointer) = (node.parent, node.pointer.clone());
        let v = self.arena.alloc(crate::schema::SchemaNode {
            parent,
            pointer,
            repr: SchemaRepr::Object(Box::new(obj)),
        });
        self.variants.insert((id, type_name.to_string()), v);
        v
    }

    // -------------------------------- enums ------------------------------- //

    /// `enum` + `tsEnumNames`, zipped by index. The name is mandatory
    /// (enforced at placeholder time).
    fn build_named_enum(&mut self, id: SchemaId, slot: AstId) -> Result<(), TranslateError> {
        let obj = self.schema(id);
        let members = obj.enum_.unwrap_or_default();
        let names = obj.ts_enum_names.unwrap_or_default();
        let mut params = Vec::with_capacity(members.len());
        for (i, &member) in members.iter().enumerate() {
            let Some(name) = names.get(i) else { break };
            params.push(EnumMember {
                key_name: name.clone(),
                ast: self.translate(member, None)?,
            });
        }
        self.asts.fill(slot, AstKind::Enum(params));
        Ok(())
    }

    /// A bare `enum` is a union of literals. With `tsEnumRef` it instead
    /// names specific members of the referenced enum.
    fn build_unnamed_enum(&mut self, id: SchemaId, slot: AstId) -> Result<(), TranslateError> {
        let obj = self.schema(id);
        let members = obj.enum_.unwrap_or_default();

        let Some(target) = obj.ts_enum_ref else {
            let params = self.translate_all(&members)?;
            self.asts.fill(slot, AstKind::Union(params));
            return Ok(());
        };

        let target_ast = self.translate(target, None)?;
        let target_members = match &self.asts.get(target_ast).kind {
            AstKind::Enum(members) => members.clone(),
            _ => {
                return Err(TranslateError::InvalidEnumRef {
                    pointer: self.pointer_of(id),
                    detail: "target does not translate to an enum".into(),
                })
            }
        };

        let mut params = Vec::with_capacity(members.len());
        for &member in &members {
            let value = match &self.arena.get(member).repr {
                SchemaRepr::Value(v) => v.clone(),
                SchemaRepr::Object(_) => {
                    return Err(TranslateError::InvalidEnumRef {
                        pointer: self.pointer_of(id),
                        detail: "enum values must be literals".into(),
                    })
                }
            };
            let matched = target_members.iter().find(|m| {
                matches!(&self.asts.get(m.ast).kind, AstKind::Literal(v) if *v == value)
            });
            let Some(matched) = matched else {
                return Err(TranslateError::InvalidEnumRef {
                    pointer: self.pointer_of(id),
                    detail: format!("value {value} is not a member of the referenced enum"),
                });
            };
            params.push(self.asts.alloc(AstNode {
                kind: AstKind::TypeReference {
                    target: target_ast,
                    member: matched.ast,
                },
                ..Default::default()
            }));
        }
        self.asts.fill(slot, AstKind::Union(params));
        Ok(())
    }

    // ------------------------------ multi-tag ------------------------------ //

    /// A node that classifies to several tags becomes an intersection.
    /// The intersection claims the hoisted `description`/`$id`/`title`
    /// (and with them the standalone name) before its children build, and
    /// the children translate from a name-stripped clone.
    fn translate_multi(
        &mut self,
        id: SchemaId,
        tags: &[SchemaType],
        key_name: Option<&str>,
    ) -> Result<AstId, TranslateError> {
        let key = CacheKey::Multi(id);
        if let Some(&ast) = self.cache.get(&key) {
            self.lift_key_name(ast, key_name);
            return Ok(ast);
        }

        let slot = self.placeholder(id, key_name, NameRule::Optional)?;
        self.cache.insert(key, slot);

        let stripped = self.stripped_clone(id);
        let mut params = Vec::with_capacity(tags.len());
        for &tag in tags {
            params.push(self.translate_tagged(stripped, tag, key_name)?);
        }
        self.asts.fill(slot, AstKind::Intersection(params));
        Ok(slot)
    }

    fn stripped_clone(&mut self, id: SchemaId) -> SchemaId {
        if let Some(&s) = self.stripped.get(&id) {
            return s;
        }
        let mut obj = self.schema(id);
        obj.title = None;
        obj.id = None;
        obj.description = None;
        let node = self.arena.get(id);
        let (parent, pointer) = (node.parent, node.pointer.clone());
        let s = self.arena.alloc(crate::schema::SchemaNode {
            parent,
            pointer,
            repr: SchemaRepr::Object(Box::new(obj)),
        });
        self.stripped.insert(id, s);
        s
    }
}
