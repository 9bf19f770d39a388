//! Tokenizer for the AST-definition language.
//!
//! The lexer exposes two distinct scanning contracts (§4.1):
//!
//! - [`Lexer::next_token`] -- normal-mode tokenization: punctuation,
//!   keywords, identifiers, `//` line comments.
//! - [`Lexer::next_verbatim`] -- a balanced-delimiter scan requested by the
//!   parser to capture `{ ... }` code blocks, default-value expressions and
//!   `#include` arguments without the normal-mode grammar getting in the way.

mod cursor;
pub mod error;
pub mod token;

use astgen_common::span::{LineIndex, Span};
use cursor::Cursor;
pub use error::LexerError;
pub use token::{keyword_from_str, Token, TokenKind};

/// The AST-definition language lexer.
///
/// Wraps a [`Cursor`] for byte-level iteration and a [`LineIndex`] so every
/// emitted token carries an accurate 1-based line/column in addition to its
/// byte span. Unlike a conventional single-mode tokenizer, `next_token` and
/// `next_verbatim` are both driven explicitly by the parser, which decides
/// per call whether it wants normal-mode or balanced-delimiter scanning --
/// the lexer itself holds no persistent mode.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    lines: LineIndex,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            lines: LineIndex::new(source),
        }
    }

    /// Current byte offset.
    pub fn pos(&self) -> u32 {
        self.cursor.pos()
    }

    fn make_token(&self, kind: TokenKind, lexeme: String, start: u32) -> Token {
        let (line, column) = self.lines.line_col(start);
        Token::new(kind, lexeme, line, column, Span::new(start, self.cursor.pos()))
    }

    // ── Normal mode ────────────────────────────────────────────────────

    /// Produce the next token in normal mode (§4.1).
    ///
    /// Skips whitespace and `//` line comments first. Returns `Ok(Eof)` at
    /// end of input, never `None` -- callers detect the end by matching on
    /// `TokenKind::Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_trivia();

        let start = self.cursor.pos();
        let (line, column) = self.lines.line_col(start);

        let Some(c) = self.cursor.peek() else {
            return Ok(self.make_token(TokenKind::Eof, String::new(), start));
        };

        let kind = match c {
            '<' => self.bump_one(TokenKind::Lt),
            '>' => self.bump_one(TokenKind::Gt),
            '(' => self.bump_one(TokenKind::LParen),
            ')' => self.bump_one(TokenKind::RParen),
            '{' => self.bump_one(TokenKind::LBrace),
            '}' => self.bump_one(TokenKind::RBrace),
            '[' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('[') {
                    self.cursor.advance();
                    TokenKind::LDBracket
                } else {
                    TokenKind::LBracket
                }
            }
            ']' => {
                self.cursor.advance();
                if self.cursor.peek() == Some(']') {
                    self.cursor.advance();
                    TokenKind::RDBracket
                } else {
                    TokenKind::RBracket
                }
            }
            '#' => self.bump_one(TokenKind::Hash),
            ':' => self.bump_one(TokenKind::Colon),
            '&' => self.bump_one(TokenKind::Amp),
            '*' => self.bump_one(TokenKind::Star),
            ',' => self.bump_one(TokenKind::Comma),
            ';' => self.bump_one(TokenKind::Semicolon),
            '?' => self.bump_one(TokenKind::Question),
            '\'' => self.bump_one(TokenKind::Quote),
            '"' => self.bump_one(TokenKind::DQuote),
            '=' => self.bump_one(TokenKind::Eq),
            '-' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('>') {
                    self.cursor.advance();
                    TokenKind::Arrow
                } else {
                    return Err(LexerError::new('-', line, column, start));
                }
            }
            c if is_ident_start(c) => {
                self.cursor.advance();
                self.cursor.eat_while(is_ident_continue);
                let text = self.cursor.slice(start, self.cursor.pos());
                keyword_from_str(text).unwrap_or(TokenKind::Ident)
            }
            other => return Err(LexerError::new(other, line, column, start)),
        };

        let lexeme = self.cursor.slice(start, self.cursor.pos()).to_string();
        Ok(self.make_token(kind, lexeme, start))
    }

    fn bump_one(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    /// Skip spaces, tabs, newlines, and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(|c| c.is_whitespace());
            if self.cursor.peek() == Some('/') && self.cursor.peek_next() == Some('/') {
                self.cursor.eat_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    // ── Verbatim mode ──────────────────────────────────────────────────

    /// Scan a balanced-delimiter verbatim run (§4.1).
    ///
    /// Accumulates characters into a single lexeme until a character from
    /// `until` is seen with the nesting counter at zero. Each character in
    /// `nest_in` increments the counter, each in `nest_out` decrements it.
    /// The terminator is left unconsumed. Leading whitespace is skipped so
    /// the captured text starts at the first non-blank character; for an
    /// empty run the returned span is zero-length at that position.
    pub fn next_verbatim(
        &mut self,
        expected_kind: TokenKind,
        nest_in: &[char],
        nest_out: &[char],
        until: &[char],
    ) -> Token {
        self.cursor.eat_while(|c| c == ' ' || c == '\t');
        let start = self.cursor.pos();
        let mut depth: i32 = 0;

        loop {
            match self.cursor.peek() {
                None => break,
                Some(c) if until.contains(&c) && depth == 0 => break,
                Some(c) => {
                    if nest_in.contains(&c) {
                        depth += 1;
                    } else if nest_out.contains(&c) {
                        depth -= 1;
                    }
                    self.cursor.advance();
                }
            }
        }

        let end = self.cursor.pos();
        let lexeme = self.cursor.slice(start, end).trim_end().to_string();
        self.make_token(expected_kind, lexeme, start)
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex error");
            let eof = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn lex_keywords_case_insensitive() {
        let mut lexer = Lexer::new("class Class CLASS");
        for _ in 0..3 {
            let tok = lexer.next_token().unwrap();
            assert_eq!(tok.kind, TokenKind::Class);
        }
    }

    #[test]
    fn lex_double_brackets() {
        assert_eq!(
            kinds("[[ a ]]"),
            vec![
                TokenKind::LDBracket,
                TokenKind::Ident,
                TokenKind::RDBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_single_brackets_distinct_from_double() {
        assert_eq!(
            kinds("[ ]"),
            vec![TokenKind::LBracket, TokenKind::RBracket, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_arrow_and_field_decorations() {
        assert_eq!(
            kinds("-> ? & : < >"),
            vec![
                TokenKind::Arrow,
                TokenKind::Question,
                TokenKind::Amp,
                TokenKind::Colon,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_skips_line_comments() {
        assert_eq!(
            kinds("class // a comment\nEnum"),
            vec![TokenKind::Class, TokenKind::Enum, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_tracks_line_and_column() {
        let mut lexer = Lexer::new("class\nEnum");
        let first = lexer.next_token().unwrap();
        assert_eq!((first.line, first.column), (1, 1));
        let second = lexer.next_token().unwrap();
        assert_eq!((second.line, second.column), (2, 1));
    }

    #[test]
    fn lex_unexpected_character_errors() {
        let mut lexer = Lexer::new("@");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.character, '@');
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn verbatim_respects_nesting() {
        let mut lexer = Lexer::new("{ a { b } c } ;");
        let open = lexer.next_token().unwrap();
        assert_eq!(open.kind, TokenKind::LBrace);
        let body = lexer.next_verbatim(TokenKind::Verbatim, &['{'], &['}'], &['}']);
        assert_eq!(body.lexeme, "a { b } c");
        let close = lexer.next_token().unwrap();
        assert_eq!(close.kind, TokenKind::RBrace);
    }

    #[test]
    fn verbatim_default_value_stops_at_comma_or_paren() {
        let mut lexer = Lexer::new("0, next");
        let value = lexer.next_verbatim(TokenKind::Verbatim, &[], &[], &['\n', ',', ')']);
        assert_eq!(value.lexeme, "0");
        let comma = lexer.next_token().unwrap();
        assert_eq!(comma.kind, TokenKind::Comma);
    }

    #[test]
    fn verbatim_include_argument_stops_at_newline() {
        let mut lexer = Lexer::new("\"foo.h\"\nclass");
        let path = lexer.next_verbatim(TokenKind::Verbatim, &[], &[], &['\n']);
        assert_eq!(path.lexeme, "\"foo.h\"");
    }
}
