//! The raw, pre-resolution data model (§3).
//!
//! Everything here is produced by the [`crate::Parser`] and later mutated
//! in place by the resolver (field tuples filled in, trait fields
//! propagated, attribute rewrites) -- see `astgen-resolve`.

pub mod attrs;

pub use attrs::Attributes;
use astgen_common::span::Span;

/// A field definition before resolution: just its textual type and the
/// decoration attributes the parser collected for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub name: String,
    pub type_name: String,
    pub attributes: Attributes,
    pub default: Option<String>,
    pub span: Span,
}

/// A `PUBLIC:`/`PRIVATE:`/bare `{ ... }` verbatim code block.
#[derive(Debug, Clone, PartialEq)]
pub struct VerbatimBlock {
    pub attributes: Attributes,
    pub code: String,
    pub span: Span,
}

/// A `class` declaration before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub name: String,
    pub attributes: Attributes,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub fields: Vec<RawField>,
    pub public_blocks: Vec<VerbatimBlock>,
    pub private_blocks: Vec<VerbatimBlock>,
    pub span: Span,
}

impl RawNode {
    pub fn new(name: String, attributes: Attributes, span: Span) -> Self {
        Self {
            name,
            attributes,
            parents: Vec::new(),
            children: Vec::new(),
            fields: Vec::new(),
            public_blocks: Vec::new(),
            private_blocks: Vec::new(),
            span,
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

/// An `enum` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEnum {
    pub name: String,
    pub variants: Vec<String>,
    pub span: Span,
}

/// A `#define` custom scalar/pointer-alias declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCustomType {
    pub name: String,
    pub underlying: String,
    pub default: Option<String>,
    pub span: Span,
}

impl RawCustomType {
    /// A trailing `*` in `underlying` denotes pointer semantics (§3).
    pub fn is_pointer(&self) -> bool {
        self.underlying.trim_end().ends_with('*')
    }
}

/// A `union` declaration. Each variant is itself a [`RawNode`] (it has
/// fields and may accumulate guards), but variants cannot themselves
/// contain unions.
#[derive(Debug, Clone, PartialEq)]
pub struct RawUnion {
    pub name: String,
    pub variants: Vec<RawNode>,
    pub span: Span,
}

impl RawUnion {
    pub fn has_variant(&self, name: &str) -> bool {
        self.variants.iter().any(|v| v.name == name)
    }
}

/// The top-level container produced by a complete parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFile {
    pub includes: Vec<String>,
    pub options: Attributes,
    pub nodes: Vec<RawNode>,
    pub enums: Vec<RawEnum>,
    pub types: Vec<RawCustomType>,
    pub unions: Vec<RawUnion>,
    pub public_blocks: Vec<VerbatimBlock>,
    pub private_blocks: Vec<VerbatimBlock>,
}

impl RawFile {
    pub fn node_mut(&mut self, name: &str) -> Option<&mut RawNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    pub fn node(&self, name: &str) -> Option<&RawNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
            || self.enums.iter().any(|e| e.name == name)
            || self.types.iter().any(|t| t.name == name)
            || self.unions.iter().any(|u| u.name == name)
    }
}
