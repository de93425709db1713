//! Fatal translation and linking errors.
//!
//! Every error is fatal to the current run: no partial AST is emitted, the
//! caller fixes the input and restarts. Each variant carries the JSON
//! Pointer of the offending node so reports point at the document, not at
//! internal ids.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslateError {
    /// A `$ref` survived into the linked tree. The upstream dereferencer
    /// (or the local linker) should have replaced it with the target node.
    #[error("unresolved $ref `{reference}` at `{pointer}`; dereference the document before translating")]
    UnresolvedReference { pointer: String, reference: String },

    /// A node that must become a named top-level declaration has no
    /// `title`, `$id`, definition key, or property key to derive one from.
    #[error("cannot derive a standalone name for {role} at `{pointer}`")]
    MissingName { pointer: String, role: &'static str },

    /// `extends` and an enum-like `propertyNames` cannot be combined.
    #[error("`extends` cannot be combined with `propertyNames` at `{pointer}`")]
    InvalidPropertyNames { pointer: String },

    /// An `extends` entry translated to something other than an interface
    /// (or an intersection of interfaces).
    #[error("`extends` entry at `{pointer}` does not translate to an interface")]
    InvalidSuperType { pointer: String },

    /// A `tsEnumRef` target is not an enum, or one of our values is not a
    /// member of the referenced enum.
    #[error("invalid `tsEnumRef` at `{pointer}`: {detail}")]
    InvalidEnumRef { pointer: String, detail: String },
}

/// Errors raised while linking a raw document into the schema arena.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("`$ref` pointer `{pointer}` does not resolve to a location in this document")]
    DanglingPointer { pointer: String },

    #[error("`$ref` chain starting at `{pointer}` loops through reference-only nodes")]
    ReferenceCycle { pointer: String },

    #[error("schema document root must be a JSON object, got {found}")]
    NonObjectRoot { found: &'static str },
}
