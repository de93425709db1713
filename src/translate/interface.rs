//! Interface builder.
//!
//! Turns an object-shaped schema into a record AST: concrete params from
//! `properties`, pattern params from `patternProperties`, the catch-all
//! from `additionalProperties`, super-types from `extends`. An enum-like
//! `propertyNames` switches the output to a mapped-key interface, or to
//! an intersection of the mapped and the concrete halves.

use crate::ast::{AstId, AstKind, AstNode, InterfaceAst, InterfaceParam, CATCH_ALL_KEY};
use crate::error::TranslateError;
use crate::schema::{BoolOrSchema, SchemaId};
use crate::translate::Translator;

/// Name used when attributing origin comments to an interface that has
/// neither a standalone name nor a parent key.
const ANONYMOUS: &str = "(anonymous)";

pub(crate) fn display_name(tx: &Translator, slot: AstId) -> String {
    let node = tx.asts.get(slot);
    node.standalone_name
        .clone()
        .or_else(|| node.key_name.clone())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

/// Build the interface (or mapped-key intersection) for `id` into `slot`.
pub(crate) fn build(tx: &mut Translator, id: SchemaId, slot: AstId) -> Result<(), TranslateError> {
    let obj = tx.schema(id);
    let parent_name = display_name(tx, slot);
    let params = build_params(tx, id, &parent_name)?;

    // enum-like propertyNames constrains the catch-all key to a named
    // type; pattern/format propertyNames (and bare type constraints)
    // only restrict string shape and are ignored here
    if let Some(pn) = obj.property_names {
        let pn_obj = tx.schema(pn);
        if pn_obj.pattern.is_none() && pn_obj.format.is_none() && pn_obj.enum_.is_some() {
            if obj.extends.as_ref().is_some_and(|e| !e.is_empty()) {
                return Err(TranslateError::InvalidPropertyNames {
                    pointer: tx.pointer_of(id),
                });
            }
            let key_type = tx.translate(pn, None)?;
            if tx.asts.get(key_type).standalone_name.is_none() {
                return Err(TranslateError::MissingName {
                    pointer: tx.pointer_of(pn),
                    role: "the `propertyNames` type",
                });
            }

            let (catch_all, concrete): (Vec<_>, Vec<_>) = params
                .into_iter()
                .partition(|p| p.key_name == CATCH_ALL_KEY);

            if concrete.is_empty() {
                tx.asts.fill(
                    slot,
                    AstKind::Interface(InterfaceAst {
                        params: catch_all,
                        params_key_type: Some(key_type),
                        ..Default::default()
                    }),
                );
            } else {
                // concrete keys stay a plain record; everything else maps
                // over the propertyNames type minus those keys (a codegen
                // concern, not recorded in the AST)
                let mapped = tx.asts.alloc(AstNode {
                    kind: AstKind::Interface(InterfaceAst {
                        params: catch_all,
                        params_key_type: Some(key_type),
                        ..Default::default()
                    }),
                    ..Default::default()
                });
                let plain = tx.asts.alloc(AstNode {
                    kind: AstKind::Interface(InterfaceAst {
                        params: concrete,
                        ..Default::default()
                    }),
                    ..Default::default()
                });
                tx.asts.fill(slot, AstKind::Intersection(vec![mapped, plain]));
            }
            return Ok(());
        }
    }

    let mut super_types = Vec::new();
    for &parent in obj.extends.iter().flatten() {
        let sup = tx.translate(parent, None)?;
        tx.require_named_interface(sup, parent)?;
        super_types.push(sup);
    }

    let mut generic_values = Vec::new();
    for &value in obj.ts_generic_values.iter().flatten() {
        generic_values.push(tx.translate(value, None)?);
    }

    tx.asts.fill(
        slot,
        AstKind::Interface(InterfaceAst {
            params,
            params_key_type: None,
            super_types,
            generic_params: obj.ts_generic_params.unwrap_or_default(),
            generic_values,
        }),
    );
    Ok(())
}

/// Build the param list: `properties`, then `patternProperties`, then
/// (optionally) unreachable `definitions`, then the catch-all.
pub(crate) fn build_params(
    tx: &mut Translator,
    id: SchemaId,
    parent_name: &str,
) -> Result<Vec<InterfaceParam>, TranslateError> {
    let obj = tx.schema(id);
    let mut params = Vec::new();

    for (key, &child) in obj.properties.iter().flatten() {
        params.push(InterfaceParam {
            key_name: key.clone(),
            ast: tx.translate(child, Some(key.as_str()))?,
            is_required: obj.required.iter().any(|r| r == key),
            is_pattern_property: false,
            is_unreachable_definition: false,
        });
    }

    // A single patternProperty with additionalProperties off is the only
    // value shape arbitrary keys can take, so it degrades to a catch-all.
    let additional_off = matches!(
        obj.additional_properties,
        None | Some(BoolOrSchema::Bool(false))
    );
    let mut single_pattern = false;
    if let Some(patterns) = &obj.pattern_properties {
        single_pattern = additional_off && patterns.len() == 1;
        for (pattern, &child) in patterns {
            let ast = tx.translate(child, Some(pattern.as_str()))?;
            tx.append_comment(
                ast,
                format!(
                    "This type was referenced by `{parent_name}`'s JSON-Schema definition\nvia the `patternProperty` \"{}\".",
                    pattern.replace('/', "\\/")
                ),
            );
            params.push(InterfaceParam {
                key_name: if single_pattern {
                    CATCH_ALL_KEY.to_string()
                } else {
                    pattern.clone()
                },
                ast,
                is_required: single_pattern || obj.required.iter().any(|r| r == pattern),
                is_pattern_property: !single_pattern,
                is_unreachable_definition: false,
            });
        }
    }

    if tx.options.unreachable_definitions {
        for (key, &child) in obj.definitions.iter().flatten() {
            let ast = tx.translate(child, Some(key.as_str()))?;
            tx.append_comment(
                ast,
                format!(
                    "This type was referenced by `{parent_name}`'s JSON-Schema\nvia the `definition` \"{}\".",
                    key.replace('/', "\\/")
                ),
            );
            params.push(InterfaceParam {
                key_name: key.clone(),
                ast,
                is_required: obj.required.iter().any(|r| r == key),
                is_pattern_property: false,
                is_unreachable_definition: true,
            });
        }
    }

    match obj.additional_properties {
        Some(BoolOrSchema::Bool(true)) => {
            if !single_pattern {
                let ast = tx.any_ast(Some(CATCH_ALL_KEY));
                params.push(catch_all_param(ast));
            }
        }
        None | Some(BoolOrSchema::Bool(false)) => {}
        Some(BoolOrSchema::Schema(schema)) => {
            let ast = tx.translate(schema, Some(CATCH_ALL_KEY))?;
            params.push(catch_all_param(ast));
        }
    }

    Ok(params)
}

fn catch_all_param(ast: AstId) -> InterfaceParam {
    InterfaceParam {
        key_name: CATCH_ALL_KEY.to_string(),
        ast,
        is_required: true,
        is_pattern_property: false,
        is_unreachable_definition: false,
    }
}
