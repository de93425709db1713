//! JSON Schema → language-neutral type AST.
//!
//! Link a schema document into an identity-preserving node arena, classify
//! each node into one or more AST kinds, and translate recursively with a
//! placeholder-before-fill cache so cyclic schemas terminate and shared
//! nodes stay shared.
//!
//! Design goals:
//! - One AST per (node, kind): repeated reachability never duplicates types.
//! - Cycles close through the cache placeholder, never through recursion depth.
//! - The four overlapping JSON-Schema array forms collapse to ARRAY or TUPLE.
//! - Standalone names are unique per run; naming falls back from `title`
//!   to `$id` to the `definitions` key.
pub mod ast;
pub mod classify;
pub mod cli;
pub mod definitions;
pub mod error;
pub mod link;
pub mod names;
pub mod options;
pub mod schema;
pub mod translate;

pub use ast::{AstArena, AstId, AstKind, AstNode};
pub use error::{LinkError, TranslateError};
pub use link::link_document;
pub use options::Options;
pub use schema::{LinkedSchema, SchemaArena, SchemaId};
pub use translate::{translate_root, Translation};
