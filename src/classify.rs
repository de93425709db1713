//! Schema classifier.
//!
//! Pure function from one schema node to an ordered list of AST-kind
//! tags. JSON Schema nodes overlap: a single node can be an enum AND a
//! string AND carry `properties`, so classification returns every tag
//! that fires, in rule-priority order, and the translator intersects the
//! per-tag results. Only the node's own attributes are consulted; the
//! surrounding graph never changes the answer.

use crate::schema::{SchemaObject, TypeField};

/// The closed set of classification tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    AllOf,
    Any,
    AnyOf,
    Boolean,
    CustomType,
    NamedEnum,
    NamedSchema,
    Never,
    Null,
    Number,
    Object,
    OneOf,
    Reference,
    String,
    TypedArray,
    Union,
    UnnamedEnum,
    UnnamedSchema,
    UntypedArray,
}

/// Classify one node. Always non-empty; an otherwise-empty result is the
/// ANY sentinel (the empty schema `{}` validates anything).
pub fn classify(schema: &SchemaObject) -> Vec<SchemaType> {
    // escape hatches that supersede everything else
    if schema.ts_type.is_some() {
        return vec![SchemaType::CustomType];
    }
    if schema.reference.is_some() {
        // should have been resolved upstream; surfaced for a fatal error
        return vec![SchemaType::Reference];
    }

    let mut tags = Vec::new();
    let push = |tag: SchemaType, tags: &mut Vec<SchemaType>| {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    if schema.all_of.is_some() {
        push(SchemaType::AllOf, &mut tags);
    }
    if schema.any_of.is_some() {
        push(SchemaType::AnyOf, &mut tags);
    }
    if schema.one_of.is_some() {
        push(SchemaType::OneOf, &mut tags);
    }

    if schema.enum_.is_some() {
        if schema.ts_enum_names.is_some() {
            push(SchemaType::NamedEnum, &mut tags);
        } else {
            push(SchemaType::UnnamedEnum, &mut tags);
        }
    }

    if let Some(TypeField::Many(_)) = &schema.type_ {
        push(SchemaType::Union, &mut tags);
    }

    let single_type = match &schema.type_ {
        Some(TypeField::One(t)) => Some(t.as_str()),
        _ => None,
    };

    if single_type == Some("array") || schema.items.is_some() {
        if schema.items.is_none() {
            push(SchemaType::UntypedArray, &mut tags);
        } else {
            push(SchemaType::TypedArray, &mut tags);
        }
    }

    let object_shaped = single_type == Some("object")
        || schema.properties.is_some()
        || schema.pattern_properties.is_some()
        || schema.additional_properties.is_some()
        || schema.property_names.is_some()
        || schema.extends.is_some()
        || !schema.required.is_empty();
    if object_shaped {
        let named = schema.has_standalone_name_hint()
            && schema.properties.as_ref().is_some_and(|p| !p.is_empty());
        if named {
            push(SchemaType::NamedSchema, &mut tags);
        } else {
            push(SchemaType::UnnamedSchema, &mut tags);
        }
    }

    // a primitive `type` next to `enum` only restates what the literals
    // already say, so the enum tag wins alone
    if schema.enum_.is_none() {
        match single_type {
            Some("string") => push(SchemaType::String, &mut tags),
            Some("number") | Some("integer") => push(SchemaType::Number, &mut tags),
            Some("boolean") => push(SchemaType::Boolean, &mut tags),
            Some("null") => push(SchemaType::Null, &mut tags),
            Some("never") => push(SchemaType::Never, &mut tags),
            // "array" and "object" were claimed by the rules above
            Some("array") | Some("object") | None => {}
            Some(_) => push(SchemaType::Object, &mut tags),
        }
    }

    if tags.is_empty() {
        tags.push(SchemaType::Any);
    }
    tags
}
