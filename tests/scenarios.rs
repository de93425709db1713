//! End-to-end translation scenarios: link a document written as plain
//! JSON, translate it, and assert over the resulting AST arena.

use json_schema_ast::ast::{AstArena, AstId, AstKind, InterfaceParam, CATCH_ALL_KEY};
use json_schema_ast::error::TranslateError;
use json_schema_ast::{link_document, translate_root, Options};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn translate(doc: Value) -> (AstArena, AstId) {
    translate_with(doc, Options::default())
}

fn translate_with(doc: Value, options: Options) -> (AstArena, AstId) {
    let mut linked = link_document(&doc).expect("link");
    let translation = translate_root(&mut linked, options).expect("translate");
    (translation.asts, translation.root)
}

fn translate_err(doc: Value) -> TranslateError {
    let mut linked = link_document(&doc).expect("link");
    translate_root(&mut linked, Options::default()).expect_err("translation should fail")
}

fn interface_params(asts: &AstArena, id: AstId) -> Vec<InterfaceParam> {
    match &asts.get(id).kind {
        AstKind::Interface(i) => i.params.clone(),
        other => panic!("expected interface, got {other:?}"),
    }
}

fn prop(asts: &AstArena, interface: AstId, key: &str) -> AstId {
    interface_params(asts, interface)
        .iter()
        .find(|p| p.key_name == key)
        .unwrap_or_else(|| panic!("no param `{key}`"))
        .ast
}

// ---------------------------- S1: arrays ----------------------------------- //

#[test]
fn s1_array_normalization() {
    let (asts, root) = translate(json!({
        "properties": {
            "u":    { "type": "array" },
            "tU":   { "items": { "type": "string" } },
            "tMin": { "items": { "type": "string" }, "minItems": 2 },
            "tMax": { "items": { "type": "string" }, "maxItems": 2 },
            "tMM":  { "items": { "type": "string" }, "minItems": 2, "maxItems": 5 },
            "more": { "items": [{ "type": "string" }, { "type": "number" }], "maxItems": 1 }
        }
    }));

    // u: no items, no bounds
    match &asts.get(prop(&asts, root, "u")).kind {
        AstKind::Array(el) => assert!(matches!(asts.get(*el).kind, AstKind::Any)),
        other => panic!("u: expected array, got {other:?}"),
    }

    // tU: plain homogeneous array
    match &asts.get(prop(&asts, root, "tU")).kind {
        AstKind::Array(el) => assert!(matches!(asts.get(*el).kind, AstKind::String)),
        other => panic!("tU: expected array, got {other:?}"),
    }

    // tMin: 2 fixed strings plus a string spread
    match &asts.get(prop(&asts, root, "tMin")).kind {
        AstKind::Tuple(t) => {
            assert_eq!(t.params.len(), 2);
            for &p in &t.params {
                assert!(matches!(asts.get(p).kind, AstKind::String));
            }
            let spread = t.spread_param.expect("tMin: spread expected");
            assert!(matches!(asts.get(spread).kind, AstKind::String));
            assert_eq!((t.min_items, t.max_items), (2, None));
        }
        other => panic!("tMin: expected tuple, got {other:?}"),
    }

    // tMax: bounded, no spread
    match &asts.get(prop(&asts, root, "tMax")).kind {
        AstKind::Tuple(t) => {
            assert_eq!(t.params.len(), 2);
            assert!(t.spread_param.is_none());
            assert_eq!(t.max_items, Some(2));
        }
        other => panic!("tMax: expected tuple, got {other:?}"),
    }

    // tMM: max(2, 5) fixed elements
    match &asts.get(prop(&asts, root, "tMM")).kind {
        AstKind::Tuple(t) => {
            assert_eq!(t.params.len(), 5);
            assert!(t.spread_param.is_none());
        }
        other => panic!("tMM: expected tuple, got {other:?}"),
    }

    // more: maxItems truncates the tuple form
    match &asts.get(prop(&asts, root, "more")).kind {
        AstKind::Tuple(t) => {
            assert_eq!(t.params.len(), 1);
            assert!(matches!(asts.get(t.params[0]).kind, AstKind::String));
            assert!(t.spread_param.is_none());
        }
        other => panic!("more: expected tuple, got {other:?}"),
    }
}

// ---------------------------- S2: named enum ------------------------------- //

#[test]
fn s2_named_enum_with_index_names() {
    let (asts, root) = translate(json!({
        "type": "string",
        "enum": ["a", "b", "c"],
        "tsEnumNames": ["A", "B", "C"],
        "title": "Color"
    }));

    let node = asts.get(root);
    assert_eq!(node.standalone_name.as_deref(), Some("Color"));
    match &node.kind {
        AstKind::Enum(members) => {
            let rendered: Vec<(String, Value)> = members
                .iter()
                .map(|m| {
                    let value = match &asts.get(m.ast).kind {
                        AstKind::Literal(v) => v.clone(),
                        other => panic!("expected literal, got {other:?}"),
                    };
                    (m.key_name.clone(), value)
                })
                .collect();
            assert_eq!(
                rendered,
                vec![
                    ("A".to_string(), json!("a")),
                    ("B".to_string(), json!("b")),
                    ("C".to_string(), json!("c")),
                ]
            );
        }
        other => panic!("expected enum, got {other:?}"),
    }
}

#[test]
fn named_enum_takes_its_name_from_the_property_key() {
    let (asts, root) = translate(json!({
        "properties": {
            "size": { "enum": ["s", "m"], "tsEnumNames": ["Small", "Medium"] }
        }
    }));
    let size = prop(&asts, root, "size");
    assert_eq!(asts.get(size).standalone_name.as_deref(), Some("Size"));
}

#[test]
fn named_enum_without_any_name_seed_is_fatal() {
    let err = translate_err(json!({ "enum": ["a"], "tsEnumNames": ["A"] }));
    assert!(matches!(err, TranslateError::MissingName { .. }));
}

// ----------------------------- S3: enum ref -------------------------------- //

#[test]
fn s3_enum_ref_names_specific_members() {
    let (asts, root) = translate(json!({
        "properties": {
            "p1": {
                "type": "string",
                "enum": ["a", "b", "c"],
                "tsEnumNames": ["A", "B", "C"],
                "title": "Color"
            },
            "p2": { "type": "string", "enum": ["a"], "tsEnumRef": "#/properties/p1" }
        }
    }));

    let p1 = prop(&asts, root, "p1");
    let member_a = match &asts.get(p1).kind {
        AstKind::Enum(members) => members[0].ast,
        other => panic!("p1: expected enum, got {other:?}"),
    };

    let p2 = prop(&asts, root, "p2");
    match &asts.get(p2).kind {
        AstKind::Union(refs) => {
            assert_eq!(refs.len(), 1);
            match &asts.get(refs[0]).kind {
                AstKind::TypeReference { target, member } => {
                    assert_eq!(*target, p1);
                    assert_eq!(*member, member_a);
                }
                other => panic!("p2: expected type reference, got {other:?}"),
            }
        }
        other => panic!("p2: expected union, got {other:?}"),
    }
}

#[test]
fn enum_ref_to_a_missing_member_is_fatal() {
    let err = translate_err(json!({
        "properties": {
            "p1": { "enum": ["a"], "tsEnumNames": ["A"], "title": "Color" },
            "p2": { "enum": ["nope"], "tsEnumRef": "#/properties/p1" }
        }
    }));
    assert!(matches!(err, TranslateError::InvalidEnumRef { .. }));
}

#[test]
fn enum_ref_to_a_non_enum_is_fatal() {
    let err = translate_err(json!({
        "properties": {
            "p1": { "type": "string" },
            "p2": { "enum": ["a"], "tsEnumRef": "#/properties/p1" }
        }
    }));
    assert!(matches!(err, TranslateError::InvalidEnumRef { .. }));
}

// ------------------------------ S4: cycles --------------------------------- //

#[test]
fn s4_self_referential_schema_closes_the_cycle() {
    let (asts, root) = translate(json!({
        "title": "Node",
        "properties": { "child": { "$ref": "#" } }
    }));

    assert_eq!(asts.get(root).standalone_name.as_deref(), Some("Node"));
    let child = prop(&asts, root, "child");
    assert_eq!(child, root, "the child param must be the outer interface itself");
}

#[test]
fn mutually_recursive_definitions_terminate() {
    let (asts, root) = translate(json!({
        "definitions": {
            "A": { "properties": { "b": { "$ref": "#/definitions/B" } } },
            "B": { "properties": { "a": { "$ref": "#/definitions/A" } } }
        },
        "properties": { "start": { "$ref": "#/definitions/A" } }
    }));

    let a = prop(&asts, root, "start");
    assert_eq!(asts.get(a).standalone_name.as_deref(), Some("A"));
    let b = prop(&asts, a, "b");
    assert_eq!(asts.get(b).standalone_name.as_deref(), Some("B"));
    assert_eq!(prop(&asts, b, "a"), a);
}

// ----------------------- S5: allOf with extend flag ------------------------ //

#[test]
fn s5_all_of_with_extend_flag_becomes_an_interface() {
    let (asts, root) = translate(json!({
        "allOf": [
            { "title": "B", "properties": { "b": { "type": "string" } } },
            { "tsExtendAllOf": true, "properties": { "x": { "type": "string" } } }
        ]
    }));

    match &asts.get(root).kind {
        AstKind::Interface(i) => {
            assert_eq!(i.super_types.len(), 1);
            let sup = asts.get(i.super_types[0]);
            assert_eq!(sup.standalone_name.as_deref(), Some("B"));
            assert!(matches!(sup.kind, AstKind::Interface(_)));

            assert_eq!(i.params.len(), 1);
            assert_eq!(i.params[0].key_name, "x");
        }
        other => panic!("expected interface, got {other:?}"),
    }
}

#[test]
fn plain_all_of_intersects_its_children() {
    let (asts, root) = translate(json!({
        "allOf": [{ "type": "string" }, { "type": "number" }]
    }));
    match &asts.get(root).kind {
        AstKind::Intersection(params) => {
            assert!(matches!(asts.get(params[0]).kind, AstKind::String));
            assert!(matches!(asts.get(params[1]).kind, AstKind::Number));
        }
        other => panic!("expected intersection, got {other:?}"),
    }
}

#[test]
fn unnamed_extend_all_of_base_is_fatal() {
    let err = translate_err(json!({
        "allOf": [
            { "properties": { "b": { "type": "string" } } },
            { "tsExtendAllOf": true, "properties": { "x": { "type": "string" } } }
        ]
    }));
    assert!(matches!(err, TranslateError::MissingName { .. }));
}

// ----------------------- S6: multi-type union hoisting --------------------- //

#[test]
fn s6_multi_type_union_hoists_naming_attributes() {
    let (asts, root) = translate(json!({
        "type": ["string", "number"],
        "title": "StrOrNum",
        "description": "doc"
    }));

    let node = asts.get(root);
    assert_eq!(node.standalone_name.as_deref(), Some("StrOrNum"));
    assert_eq!(node.comment.as_deref(), Some("doc"));
    match &node.kind {
        AstKind::Union(params) => {
            assert_eq!(params.len(), 2);
            assert!(matches!(asts.get(params[0]).kind, AstKind::String));
            assert!(matches!(asts.get(params[1]).kind, AstKind::Number));
            for &p in params {
                assert_eq!(asts.get(p).standalone_name, None);
                assert_eq!(asts.get(p).comment, None);
            }
        }
        other => panic!("expected union, got {other:?}"),
    }
}

// ------------------------- cross-cutting invariants ------------------------ //

#[test]
fn shared_nodes_translate_to_shared_asts() {
    let (asts, root) = translate(json!({
        "definitions": { "Leaf": { "title": "Leaf", "type": "string" } },
        "properties": {
            "x": { "$ref": "#/definitions/Leaf" },
            "y": { "$ref": "#/definitions/Leaf" }
        }
    }));
    assert_eq!(prop(&asts, root, "x"), prop(&asts, root, "y"));
}

#[test]
fn standalone_names_are_unique() {
    let (asts, root) = translate(json!({
        "title": "Thing",
        "properties": {
            "a": { "title": "Thing", "properties": { "v": { "type": "string" } } },
            "b": { "title": "Thing", "properties": { "v": { "type": "string" } } }
        }
    }));
    let mut names = asts.standalone_names(root);
    names.sort();
    let mut deduped = names.clone();
    deduped.dedup();
    assert_eq!(names, deduped, "duplicate standalone names");
    assert_eq!(names, vec!["Thing", "Thing1", "Thing2"]);
}

#[test]
fn multi_tag_intersection_claims_the_hoisted_attributes() {
    let (asts, root) = translate(json!({
        "title": "T",
        "description": "d",
        "enum": ["x"],
        "properties": { "p": { "type": "string" } }
    }));

    let node = asts.get(root);
    assert_eq!(node.standalone_name.as_deref(), Some("T"));
    assert_eq!(node.comment.as_deref(), Some("d"));
    match &node.kind {
        AstKind::Intersection(params) => {
            assert_eq!(params.len(), 2);
            assert!(matches!(asts.get(params[0]).kind, AstKind::Union(_)));
            assert!(matches!(asts.get(params[1]).kind, AstKind::Interface(_)));
            for &p in params {
                assert_eq!(asts.get(p).standalone_name, None);
                assert_eq!(asts.get(p).comment, None);
            }
        }
        other => panic!("expected intersection, got {other:?}"),
    }
}

#[test]
fn unresolved_external_ref_is_fatal() {
    let err = translate_err(json!({
        "properties": { "x": { "$ref": "http://example.com/other.json#/Foo" } }
    }));
    match err {
        TranslateError::UnresolvedReference { reference, .. } => {
            assert_eq!(reference, "http://example.com/other.json#/Foo");
        }
        other => panic!("expected unresolved reference, got {other:?}"),
    }
}

// ------------------------------- interfaces -------------------------------- //

#[test]
fn required_and_additional_properties() {
    let (asts, root) = translate(json!({
        "properties": {
            "a": { "type": "string" },
            "b": { "type": "number" }
        },
        "required": ["a"],
        "additionalProperties": { "type": "boolean" }
    }));

    let params = interface_params(&asts, root);
    assert_eq!(params.len(), 3);
    assert!(params[0].is_required);
    assert!(!params[1].is_required);
    assert_eq!(params[2].key_name, CATCH_ALL_KEY);
    assert!(matches!(asts.get(params[2].ast).kind, AstKind::Boolean));
}

#[test]
fn single_pattern_property_degrades_to_a_catch_all() {
    let (asts, root) = translate(json!({
        "title": "Env",
        "properties": { "name": { "type": "string" } },
        "patternProperties": { "^[A-Z]+$": { "type": "string" } }
    }));

    let params = interface_params(&asts, root);
    let pattern_param = &params[1];
    assert_eq!(pattern_param.key_name, CATCH_ALL_KEY);
    assert!(!pattern_param.is_pattern_property);
    assert!(pattern_param.is_required);
    let comment = asts.get(pattern_param.ast).comment.as_deref().unwrap();
    assert!(comment.contains("patternProperty"), "origin comment missing: {comment}");
    assert!(comment.contains("Env"));
}

#[test]
fn multiple_pattern_properties_stay_patterns() {
    let (asts, root) = translate(json!({
        "patternProperties": {
            "^a": { "type": "string" },
            "^b": { "type": "number" }
        },
        "additionalProperties": true
    }));

    let params = interface_params(&asts, root);
    assert_eq!(params.len(), 3);
    assert!(params[0].is_pattern_property);
    assert_eq!(params[0].key_name, "^a");
    assert!(params[1].is_pattern_property);
    // additionalProperties: true appends the ANY catch-all
    assert_eq!(params[2].key_name, CATCH_ALL_KEY);
    assert!(matches!(asts.get(params[2].ast).kind, AstKind::Any));
}

#[test]
fn extends_builds_named_super_types() {
    let (asts, root) = translate(json!({
        "title": "Derived",
        "properties": { "x": { "type": "string" } },
        "extends": [{ "title": "Base", "properties": { "b": { "type": "string" } } }]
    }));

    match &asts.get(root).kind {
        AstKind::Interface(i) => {
            assert_eq!(i.super_types.len(), 1);
            let sup = asts.get(i.super_types[0]);
            assert_eq!(sup.standalone_name.as_deref(), Some("Base"));
        }
        other => panic!("expected interface, got {other:?}"),
    }
}

#[test]
fn non_interface_super_type_is_fatal() {
    let err = translate_err(json!({
        "properties": { "x": { "type": "string" } },
        "extends": [{ "title": "S", "type": "string" }]
    }));
    assert!(matches!(err, TranslateError::InvalidSuperType { .. }));
}

#[test]
fn property_names_constrains_the_catch_all_key() {
    let (asts, root) = translate(json!({
        "propertyNames": { "title": "Keys", "enum": ["a", "b"] },
        "additionalProperties": { "type": "string" }
    }));

    match &asts.get(root).kind {
        AstKind::Interface(i) => {
            let key_type = i.params_key_type.expect("paramsKeyType expected");
            assert_eq!(asts.get(key_type).standalone_name.as_deref(), Some("Keys"));
            assert_eq!(i.params.len(), 1);
            assert_eq!(i.params[0].key_name, CATCH_ALL_KEY);
            assert!(matches!(asts.get(i.params[0].ast).kind, AstKind::String));
        }
        other => panic!("expected mapped interface, got {other:?}"),
    }
}

#[test]
fn property_names_with_concrete_keys_intersects() {
    let (asts, root) = translate(json!({
        "properties": { "fixed": { "type": "number" } },
        "propertyNames": { "title": "Keys", "enum": ["a", "b"] },
        "additionalProperties": { "type": "string" }
    }));

    match &asts.get(root).kind {
        AstKind::Intersection(halves) => {
            assert_eq!(halves.len(), 2);
            match &asts.get(halves[0]).kind {
                AstKind::Interface(mapped) => assert!(mapped.params_key_type.is_some()),
                other => panic!("expected mapped half, got {other:?}"),
            }
            match &asts.get(halves[1]).kind {
                AstKind::Interface(plain) => {
                    assert_eq!(plain.params.len(), 1);
                    assert_eq!(plain.params[0].key_name, "fixed");
                }
                other => panic!("expected plain half, got {other:?}"),
            }
        }
        other => panic!("expected intersection, got {other:?}"),
    }
}

#[test]
fn property_names_with_extends_is_fatal() {
    let err = translate_err(json!({
        "propertyNames": { "title": "Keys", "enum": ["a"] },
        "extends": [{ "title": "Base", "properties": { "b": { "type": "string" } } }]
    }));
    assert!(matches!(err, TranslateError::InvalidPropertyNames { .. }));
}

#[test]
fn trivial_property_names_are_ignored() {
    let (asts, root) = translate(json!({
        "propertyNames": { "type": "string" },
        "additionalProperties": { "type": "number" }
    }));
    match &asts.get(root).kind {
        AstKind::Interface(i) => {
            assert!(i.params_key_type.is_none());
            assert_eq!(i.params.len(), 1);
            assert_eq!(i.params[0].key_name, CATCH_ALL_KEY);
        }
        other => panic!("expected plain interface, got {other:?}"),
    }
}

#[test]
fn unnamed_property_names_type_is_fatal() {
    let err = translate_err(json!({
        "propertyNames": { "enum": ["a", "b"] },
        "additionalProperties": { "type": "string" }
    }));
    assert!(matches!(
        err,
        TranslateError::MissingName { role: "the `propertyNames` type", .. }
    ));
}

// -------------------------------- options ---------------------------------- //

#[test]
fn unknown_any_replaces_the_any_sentinel() {
    let options = Options { unknown_any: true, ..Default::default() };
    let (asts, root) = translate_with(json!({ "type": "array" }), options);
    match &asts.get(root).kind {
        AstKind::Array(el) => assert!(matches!(asts.get(*el).kind, AstKind::Unknown)),
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn unreachable_definitions_become_params() {
    let options = Options { unreachable_definitions: true, ..Default::default() };
    let (asts, root) = translate_with(
        json!({
            "properties": { "a": { "type": "string" } },
            "definitions": { "Orphan": { "title": "Orphan", "type": "number" } }
        }),
        options,
    );

    let params = interface_params(&asts, root);
    assert_eq!(params.len(), 2);
    let orphan = &params[1];
    assert_eq!(orphan.key_name, "Orphan");
    assert!(orphan.is_unreachable_definition);
    let comment = asts.get(orphan.ast).comment.as_deref().unwrap();
    assert!(comment.contains("definition"));
}

// -------------------------------- literals --------------------------------- //

#[test]
fn primitive_sub_schemas_become_literals() {
    let (asts, root) = translate(json!({
        "properties": { "flag": true }
    }));
    match &asts.get(prop(&asts, root, "flag")).kind {
        AstKind::Literal(v) => assert_eq!(v, &json!(true)),
        other => panic!("expected literal, got {other:?}"),
    }
}
