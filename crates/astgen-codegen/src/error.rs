//! Generator error kinds (§7, Generation category).

use std::fmt;

use astgen_common::diagnostics::Diagnostic;
use astgen_common::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// No dispatch entry for a resolved `(model, ownership, access,
    /// container)` tuple. Carries the exact key string (§8 invariant 6).
    UnsupportedFeature { key: String },
    /// The debug backend was requested but the file has no `visitable`
    /// option set.
    AstNotVisitable,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFeature { key } => {
                write!(f, "no dispatch entry for `{key}`")
            }
            Self::AstNotVisitable => {
                write!(f, "debug backend requires the `visitable` file option")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl Diagnostic for GenerationError {
    fn message(&self) -> String {
        self.to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }
}
