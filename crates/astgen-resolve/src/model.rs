//! The resolved, post-analysis data model (§3, §4.3).
//!
//! Everything here is read-only once [`crate::resolve`] returns: fields
//! carry their full 4-tuple, node/enum names have been fully qualified, and
//! `istrait` fields have already been copied down into children.

use std::fmt;

use astgen_common::span::Span;
use astgen_parser::model::{Attributes, VerbatimBlock};
use rustc_hash::FxHashMap;

/// Which symbol table a field's type was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Node,
    Enum,
    Type,
    Aggr,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Model::Node => "Node",
            Model::Enum => "Enum",
            Model::Type => "Type",
            Model::Aggr => "Aggr",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Full,
    Reference,
    Conditional,
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ownership::Full => "Full",
            Ownership::Reference => "Reference",
            Ownership::Conditional => "Conditional",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Pointer,
    Object,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Access::Pointer => "Pointer",
            Access::Object => "Object",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Value,
    Optional,
    Array,
    DoubleArray,
    Map,
    MultiMap,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Container::Value => "Value",
            Container::Optional => "Optional",
            Container::Array => "Array",
            Container::DoubleArray => "DoubleArray",
            Container::Map => "Map",
            Container::MultiMap => "MultiMap",
        };
        write!(f, "{s}")
    }
}

/// A fully resolved field: the central entity of the resolved model (§3).
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub display_name: String,
    pub type_name: String,
    pub attributes: Attributes,
    pub default: Option<String>,
    pub model: Model,
    pub ownership: Ownership,
    pub access: Access,
    pub container: Container,
    pub is_visitable: bool,
    pub resolved_type: String,
    pub owning_node: String,
    pub span: Span,
}

/// A fully resolved node (§3).
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub fqn: String,
    pub attributes: Attributes,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub fields: Vec<Field>,
    pub public_blocks: Vec<VerbatimBlock>,
    pub private_blocks: Vec<VerbatimBlock>,
    pub guards: FxHashMap<String, Vec<String>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Enumeration {
    pub name: String,
    pub fqn: String,
    pub variants: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CustomType {
    pub name: String,
    pub underlying: String,
    pub default: Option<String>,
    pub span: Span,
}

impl CustomType {
    pub fn is_pointer(&self) -> bool {
        self.underlying.trim_end().ends_with('*')
    }
}

#[derive(Debug, Clone)]
pub struct Union {
    pub name: String,
    pub fqn: String,
    pub variants: Vec<Node>,
    pub span: Span,
}

/// A reference into one of `ResolvedFile`'s tables, in emission order
/// (§4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclRef {
    Enum(String),
    Node(String),
}

/// The fully resolved, validated compilation unit (§3 "File").
#[derive(Debug, Clone, Default)]
pub struct ResolvedFile {
    pub includes: Vec<String>,
    pub options: Attributes,
    pub nodes: FxHashMap<String, Node>,
    pub enums: FxHashMap<String, Enumeration>,
    pub types: FxHashMap<String, CustomType>,
    pub unions: FxHashMap<String, Union>,
    pub declarations: Vec<DeclRef>,
    pub public_blocks: Vec<VerbatimBlock>,
    pub private_blocks: Vec<VerbatimBlock>,
}

impl ResolvedFile {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn is_visitable_enabled(&self) -> bool {
        self.options.contains("visitable")
    }
}
