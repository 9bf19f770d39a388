//! The token vocabulary produced by the [`crate::Lexer`].

use astgen_common::span::Span;

/// A single token: its kind, the exact source text it covers, and its
/// 1-based line/column (the `{kind, lexeme, line, column}` tuple of the
/// AST-definition language's token model).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
    pub column: u32,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, line: u32, column: u32, span: Span) -> Self {
        Self { kind, lexeme, line, column, span }
    }
}

/// Every kind of token the normal-mode lexer can produce, plus the single
/// `Verbatim` kind a caller-requested balanced scan resolves to.
///
/// Keywords are recognized case-insensitively at the lexer boundary but the
/// lexeme stored on the token is always upper-cased (§3: "Keywords are
/// case-insensitive at the lexer boundary but stored upper-cased").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // ── Punctuation ──────────────────────────────────────────────────
    Lt,
    Gt,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LDBracket,
    RDBracket,
    Hash,
    Colon,
    Amp,
    Star,
    Comma,
    Semicolon,
    Question,
    Quote,
    DQuote,
    Eq,
    Arrow,

    // ── Keywords ─────────────────────────────────────────────────────
    Class,
    Enum,
    Union,
    Using,
    Public,
    Private,
    Include,
    Define,

    // ── Identifiers and verbatim runs ────────────────────────────────
    Ident,
    Verbatim,

    // ── Terminators ──────────────────────────────────────────────────
    Eof,
    Invalid,
}

/// Look up a keyword token for `text`, case-insensitively.
pub fn keyword_from_str(text: &str) -> Option<TokenKind> {
    match text.to_ascii_uppercase().as_str() {
        "CLASS" => Some(TokenKind::Class),
        "ENUM" => Some(TokenKind::Enum),
        "UNION" => Some(TokenKind::Union),
        "USING" => Some(TokenKind::Using),
        "PUBLIC" => Some(TokenKind::Public),
        "PRIVATE" => Some(TokenKind::Private),
        "INCLUDE" => Some(TokenKind::Include),
        "DEFINE" => Some(TokenKind::Define),
        _ => None,
    }
}
