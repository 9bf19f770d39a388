//! The four mutually-disjoint declaration namespaces (§3 invariant 1).

use std::fmt;

/// Which of the four symbol tables a name belongs to.
///
/// Nodes, enumerations, custom types and unions all share one flat
/// namespace for uniqueness purposes even though they are stored in four
/// separate tables; this is the tag used to report which table a
/// colliding name was first declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Node,
    Enum,
    Type,
    Union,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclKind::Node => "node",
            DeclKind::Enum => "enum",
            DeclKind::Type => "type",
            DeclKind::Union => "union",
        };
        write!(f, "{s}")
    }
}
