//! Array normalizer.
//!
//! JSON Schema spells arrays four overlapping ways: `items` as a single
//! schema, `items` as a tuple, plus `minItems`/`maxItems` on either.
//! Downstream codegen wants exactly one shape, so everything collapses to
//! ARRAY or TUPLE here:
//!
//! - a finite `maxItems` pins the tuple length to `max(minItems, maxItems)`
//!   and suppresses the spread;
//! - an unbounded schema keeps a spread element collecting the tail.

use crate::ast::{AstKind, TupleAst};
use crate::error::TranslateError;
use crate::schema::{BoolOrSchema, Items, SchemaId};
use crate::translate::Translator;

pub(crate) fn build(
    tx: &mut Translator,
    id: SchemaId,
    slot: crate::ast::AstId,
) -> Result<(), TranslateError> {
    let obj = tx.schema(id);
    let min_items = obj.min_items.unwrap_or(0);
    let max_items = obj.max_items;

    let kind = match &obj.items {
        Some(Items::Many(elements)) => {
            tuple_form(tx, elements, obj.additional_items, min_items, max_items)?
        }
        Some(Items::One(element)) => homogeneous_form(tx, *element, min_items, max_items)?,
        None => untyped_form(tx, min_items, max_items),
    };
    tx.asts.fill(slot, kind);
    Ok(())
}

/// `items: [...]` (tuple form). With a finite `maxItems` the element list
/// is truncated or ANY-padded to the pinned length; otherwise
/// `additionalItems` decides the spread.
fn tuple_form(
    tx: &mut Translator,
    elements: &[SchemaId],
    additional_items: Option<BoolOrSchema>,
    min_items: u32,
    max_items: Option<u32>,
) -> Result<AstKind, TranslateError> {
    match max_items {
        Some(max) => {
            let pinned = min_items.max(max) as usize;
            let mut params = Vec::with_capacity(pinned);
            for i in 0..pinned {
                match elements.get(i) {
                    Some(&element) => params.push(tx.translate(element, None)?),
                    None => params.push(tx.any_ast(None)),
                }
            }
            Ok(AstKind::Tuple(TupleAst {
                params,
                spread_param: None,
                min_items,
                max_items: Some(max),
            }))
        }
        None => {
            let mut params = Vec::with_capacity(elements.len());
            for &element in elements {
                params.push(tx.translate(element, None)?);
            }
            let spread_param = match additional_items {
                None | Some(BoolOrSchema::Bool(false)) => None,
                Some(BoolOrSchema::Bool(true)) => Some(tx.any_ast(None)),
                Some(BoolOrSchema::Schema(schema)) => Some(tx.translate(schema, None)?),
            };
            Ok(AstKind::Tuple(TupleAst {
                params,
                spread_param,
                min_items,
                max_items: None,
            }))
        }
    }
}

/// `items: {...}` (homogeneous form). Unconstrained stays ARRAY; any
/// `minItems`/`maxItems` turns it into a tuple of the element repeated,
/// spreading the rest when the length is unbounded.
fn homogeneous_form(
    tx: &mut Translator,
    element: SchemaId,
    min_items: u32,
    max_items: Option<u32>,
) -> Result<AstKind, TranslateError> {
    let element = tx.translate(element, None)?;
    if min_items == 0 && max_items.is_none() {
        return Ok(AstKind::Array(element));
    }
    let pinned = max_items.map_or(min_items, |max| min_items.max(max)) as usize;
    Ok(AstKind::Tuple(TupleAst {
        params: vec![element; pinned],
        spread_param: max_items.is_none().then_some(element),
        min_items,
        max_items,
    }))
}

/// No `items` at all: ARRAY of ANY, unless length bounds force a tuple of
/// ANY elements.
fn untyped_form(tx: &mut Translator, min_items: u32, max_items: Option<u32>) -> AstKind {
    if min_items == 0 && max_items.is_none() {
        let any = tx.any_ast(None);
        return AstKind::Array(any);
    }
    let pinned = max_items.map_or(min_items, |max| min_items.max(max)) as usize;
    let any = tx.any_ast(None);
    AstKind::Tuple(TupleAst {
        params: vec![any; pinned],
        spread_param: max_items.is_none().then_some(any),
        min_items,
        max_items,
    })
}
