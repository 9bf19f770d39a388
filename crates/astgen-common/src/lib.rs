//! Shared types for the AST-definition compiler.
//!
//! Holds the pieces every later stage needs: byte-offset [`span::Span`]s,
//! the [`decl::DeclKind`] tag for the four disjoint declaration namespaces,
//! and the [`diagnostics::Diagnostic`] rendering contract.

pub mod decl;
pub mod diagnostics;
pub mod span;
