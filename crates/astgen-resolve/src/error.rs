//! Resolver error kinds (§7, Validation category).
//!
//! `union-of-union-not-allowed` and `map-key-must-be-custom-type` are listed
//! under "Parsing" in the distilled error table, but both depend on cross-
//! referencing the type tables the parser has not yet fully assembled at
//! the point a field is read -- they are checked here, during resolution,
//! alongside the rest of the cross-reference validation.

use std::fmt;

use astgen_common::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverError {
    pub kind: ResolverErrorKind,
    pub span: Span,
}

impl ResolverError {
    pub fn new(kind: ResolverErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolverErrorKind {
    /// Two mutually-exclusive decoration attributes were both present
    /// (invariant 5's ten pairwise conflicts).
    DecorationConflict {
        field: String,
        first: String,
        second: String,
    },
    /// An `Aggr`-modeled field carried a decoration attribute (invariant 6).
    AggrFieldCannotBeDecorated { field: String },
    /// A node ended up with both non-empty `parents` and non-empty
    /// `children` (invariant 3).
    SubnodeOfSubnode { node: String },
    /// An `istrait` field/block collided with a field already declared on
    /// the child it propagated into.
    TraitRedefinesField { node: String, field: String },
    /// A field's textual type did not resolve in any of the four symbol
    /// tables.
    UnknownFieldType { type_name: String },
    /// A union variant's field was itself modeled `Aggr`.
    UnionOfUnionNotAllowed { union_name: String, field: String },
    /// A `map`/`mmap` key attribute did not name a declared custom type.
    MapKeyMustBeCustomType { field: String, key: String },
}

impl fmt::Display for ResolverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecorationConflict { field, first, second } => write!(
                f,
                "field `{field}` combines incompatible decorations `{first}` and `{second}`"
            ),
            Self::AggrFieldCannotBeDecorated { field } => {
                write!(f, "field `{field}` has union type and cannot carry decorations")
            }
            Self::SubnodeOfSubnode { node } => {
                write!(f, "node `{node}` cannot be both a parent and a subnode")
            }
            Self::TraitRedefinesField { node, field } => write!(
                f,
                "trait field `{field}` propagated from a parent redefines an existing field on `{node}`"
            ),
            Self::UnknownFieldType { type_name } => {
                write!(f, "unknown field type `{type_name}`")
            }
            Self::UnionOfUnionNotAllowed { union_name, field } => write!(
                f,
                "field `{field}` in union `{union_name}` cannot itself be a union"
            ),
            Self::MapKeyMustBeCustomType { field, key } => write!(
                f,
                "field `{field}`'s map/multimap key `{key}` must name a declared custom type"
            ),
        }
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ResolverError {}

impl astgen_common::diagnostics::Diagnostic for ResolverError {
    fn message(&self) -> String {
        self.kind.to_string()
    }

    fn span(&self) -> Option<Span> {
        Some(self.span)
    }
}
