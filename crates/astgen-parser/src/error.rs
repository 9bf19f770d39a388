//! Parser error kinds (§7, Parsing category).

use std::fmt;

use astgen_common::decl::DeclKind;
use astgen_common::span::Span;

/// A parse error with location information.
///
/// All errors are fail-fast (§7): `Parser::parse` returns the first one it
/// hits and stops descending.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn new(kind: ParserErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParserErrorKind {
    /// A token appeared where none of the grammar's alternatives accept it.
    UnexpectedToken { found: String },
    /// A specific token was required but something else was found.
    ExpectedToken { expected: String, found: String },
    /// A name collides with an existing declaration in a different table.
    NameAlreadyDefines { name: String, kind: DeclKind },
    /// The same field name was declared twice on one node.
    FieldRedefined { node: String, field: String },
    /// An attribute name outside the recognized set (§10.5).
    UnknownAttribute { name: String },
    /// A `->`-attached subnode's own base is itself already a subnode
    /// (inheritance is exactly one level deep, §3 invariant 4).
    SubnodeParentOfSubnode { node: String },
}

impl fmt::Display for ParserErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found } => write!(f, "unexpected token {found}"),
            Self::ExpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::NameAlreadyDefines { name, kind } => {
                write!(f, "name `{name}` already defines a {kind}")
            }
            Self::FieldRedefined { node, field } => {
                write!(f, "field `{field}` redefined on node `{node}`")
            }
            Self::UnknownAttribute { name } => write!(f, "unknown attribute `{name}`"),
            Self::SubnodeParentOfSubnode { node } => {
                write!(f, "subnode attachment to `{node}`, which is itself a subnode")
            }
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParserError {}

impl astgen_common::diagnostics::Diagnostic for ParserError {
    fn message(&self) -> String {
        self.kind.to_string()
    }

    fn span(&self) -> Option<Span> {
        Some(self.span)
    }
}
