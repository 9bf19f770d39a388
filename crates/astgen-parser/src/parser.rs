//! Recursive-descent parser (§4.2).
//!
//! A single token of lookahead (`current`) drives every production. Most
//! tokens are consumed through [`Parser::bump`], which immediately refills
//! `current` from the lexer's normal mode. The handful of spots where a
//! verbatim scan must follow immediately (`=` defaults, `{ ... }` bodies,
//! `#include` arguments) instead go through [`Parser::bump_raw`], which
//! consumes `current` *without* refilling -- the lexer's cursor is already
//! sitting right after that token's text, exactly where a verbatim scan
//! needs to start. Refilling eagerly there would tokenize the verbatim
//! region under normal-mode rules before the parser ever asks for it.

use astgen_common::decl::DeclKind;
use astgen_common::span::Span;
use astgen_lexer::{Lexer, LexerError, Token, TokenKind};

use crate::error::{ParserError, ParserErrorKind};
use crate::model::{
    Attributes, RawCustomType, RawEnum, RawField, RawFile, RawNode, RawUnion, VerbatimBlock,
};

/// Attribute names this implementation recognizes (§10.5).
const RECOGNIZED_ATTRIBUTES: &[&str] = &[
    "istrait",
    "wastrait",
    "cowned",
    "visitable",
    "notvisitable",
    "namespace",
];

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Result<Self, ParserError> {
        let mut lexer = Lexer::new(source);
        let current = fetch(&mut lexer)?;
        Ok(Self { lexer, current })
    }

    /// Parse an entire file: `file := declaration*`.
    pub fn parse(mut self) -> Result<RawFile, ParserError> {
        let mut file = RawFile::default();
        while self.current.kind != TokenKind::Eof {
            self.parse_declaration(&mut file)?;
        }
        Ok(file)
    }

    // ── Token plumbing ──────────────────────────────────────────────────

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consume `current` and refill it via normal-mode scanning.
    fn bump(&mut self) -> Result<Token, ParserError> {
        let consumed = self.bump_raw();
        self.current = fetch(&mut self.lexer)?;
        Ok(consumed)
    }

    /// Consume `current` without refilling. The lexer's cursor is left
    /// exactly where the consumed token's text ended -- the caller is
    /// responsible for either calling a verbatim scan or refilling via
    /// [`Parser::bump`]'s twin, an explicit `fetch`.
    fn bump_raw(&mut self) -> Token {
        std::mem::replace(
            &mut self.current,
            Token::new(TokenKind::Invalid, String::new(), 0, 0, Span::point(0)),
        )
    }

    fn refill(&mut self) -> Result<(), ParserError> {
        self.current = fetch(&mut self.lexer)?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind, label: &str) -> Result<Token, ParserError> {
        if self.current.kind == kind {
            self.bump()
        } else {
            Err(self.unexpected(label))
        }
    }

    fn unexpected(&self, label: &str) -> ParserError {
        ParserError::new(
            ParserErrorKind::ExpectedToken {
                expected: label.to_string(),
                found: describe(&self.current),
            },
            self.current.span,
        )
    }

    /// A balanced-delimiter verbatim scan, immediately after a `bump_raw`.
    fn verbatim(&mut self, nest_in: &[char], nest_out: &[char], until: &[char]) -> Token {
        self.lexer
            .next_verbatim(TokenKind::Verbatim, nest_in, nest_out, until)
    }

    // ── Declarations ────────────────────────────────────────────────────

    fn parse_declaration(&mut self, file: &mut RawFile) -> Result<(), ParserError> {
        match self.current.kind {
            TokenKind::Hash => self.parse_hash_directive(file),
            TokenKind::Enum => self.parse_enum(file),
            TokenKind::Union => self.parse_union(file),
            TokenKind::Public | TokenKind::Private | TokenKind::LBrace => {
                let (visibility, block) = self.parse_custom_code()?;
                match visibility {
                    Visibility::Public => file.public_blocks.push(block),
                    Visibility::Private => file.private_blocks.push(block),
                }
                Ok(())
            }
            TokenKind::LDBracket => {
                let attrs = self.parse_attributes()?;
                if self.at(TokenKind::Class) {
                    self.parse_node(file, attrs)
                } else {
                    for (key, value) in attrs.iter() {
                        file.options.set(key, value.map(str::to_string));
                    }
                    self.expect(TokenKind::Semicolon, "`;` after file attributes")?;
                    Ok(())
                }
            }
            TokenKind::Class => self.parse_node(file, Attributes::new()),
            _ => Err(ParserError::new(
                ParserErrorKind::UnexpectedToken {
                    found: describe(&self.current),
                },
                self.current.span,
            )),
        }
    }

    fn parse_hash_directive(&mut self, file: &mut RawFile) -> Result<(), ParserError> {
        self.expect(TokenKind::Hash, "`#`")?;
        match self.current.kind {
            TokenKind::Include => {
                self.bump_raw();
                let tok = self.verbatim(&[], &[], &['\n']);
                self.refill()?;
                file.includes.push(tok.lexeme);
                Ok(())
            }
            TokenKind::Define => {
                // `define` itself needs a normal refill so the name that
                // follows it gets scanned as a real identifier; once we
                // have it, take it via `bump_raw` (no refill) so the
                // verbatim scan for the free-form underlying-type/default
                // text starts exactly where the name's text ended.
                self.bump()?;
                if !self.at(TokenKind::Ident) {
                    return Err(self.unexpected("custom type name"));
                }
                let name_tok = self.bump_raw();
                let name = name_tok.lexeme.clone();
                self.check_name_available(file, &name, name_tok.span, DeclKind::Type)?;
                let rest = self.verbatim(&[], &[], &['\n']);
                self.refill()?;
                let (underlying, default) = split_underlying_default(&rest.lexeme);
                let span = name_tok.span.merge(rest.span);
                file.types.push(RawCustomType {
                    name,
                    underlying,
                    default,
                    span,
                });
                Ok(())
            }
            _ => Err(self.unexpected("`include` or `define`")),
        }
    }

    // ── Nodes ───────────────────────────────────────────────────────────

    fn parse_node(&mut self, file: &mut RawFile, attrs: Attributes) -> Result<(), ParserError> {
        self.expect(TokenKind::Class, "`class`")?;
        let name_tok = self.expect(TokenKind::Ident, "node name")?;
        let name = name_tok.lexeme;
        self.declare_or_merge_node(file, &name, attrs, name_tok.span)?;
        self.parse_node_body(file, &name)?;
        self.expect(TokenKind::Semicolon, "`;` after node declaration")?;

        while self.at(TokenKind::Arrow) {
            self.bump()?;
            let sub_attrs = if self.at(TokenKind::LDBracket) {
                self.parse_attributes()?
            } else {
                Attributes::new()
            };
            self.expect(TokenKind::Class, "`class`")?;
            let sub_tok = self.expect(TokenKind::Ident, "subnode name")?;
            let sub_name = sub_tok.lexeme;

            if let Some(parent) = file.node(&name) {
                if !parent.parents.is_empty() {
                    return Err(ParserError::new(
                        ParserErrorKind::SubnodeParentOfSubnode { node: name.clone() },
                        sub_tok.span,
                    ));
                }
            }

            self.declare_or_merge_node(file, &sub_name, sub_attrs, sub_tok.span)?;
            self.parse_node_body(file, &sub_name)?;
            self.expect(TokenKind::Semicolon, "`;` after subnode declaration")?;

            let parent = file.node_mut(&name).expect("just declared");
            if !parent.children.iter().any(|c| c == &sub_name) {
                parent.children.push(sub_name.clone());
            }
            let sub = file.node_mut(&sub_name).expect("just declared");
            if !sub.parents.iter().any(|p| p == &name) {
                sub.parents.push(name.clone());
            }
        }
        Ok(())
    }

    /// Creates a fresh node, or (per §4.2 "Node merging") extends an
    /// existing one after checking it doesn't collide with another table.
    fn declare_or_merge_node(
        &mut self,
        file: &mut RawFile,
        name: &str,
        attrs: Attributes,
        span: Span,
    ) -> Result<(), ParserError> {
        if file.nodes.iter().any(|n| n.name == name) {
            let node = file.node_mut(name).expect("just checked");
            for (key, value) in attrs.iter() {
                node.attributes.set(key, value.map(str::to_string));
            }
        } else {
            self.check_name_available(file, name, span, DeclKind::Node)?;
            file.nodes.push(RawNode::new(name.to_string(), attrs, span));
        }
        Ok(())
    }

    /// `[fields] custom-code*`, applied to whichever node currently owns
    /// `name` (already pushed into `file.nodes` by the caller).
    fn parse_node_body(&mut self, file: &mut RawFile, name: &str) -> Result<(), ParserError> {
        if self.at(TokenKind::LParen) {
            let fields = self.parse_fields()?;
            let node = file.node_mut(name).expect("declared by caller");
            for field in fields {
                if node.has_field(&field.name) {
                    return Err(ParserError::new(
                        ParserErrorKind::FieldRedefined {
                            node: name.to_string(),
                            field: field.name,
                        },
                        field.span,
                    ));
                }
                node.fields.push(field);
            }
        }

        while matches!(
            self.current.kind,
            TokenKind::Public | TokenKind::Private | TokenKind::LBrace | TokenKind::LDBracket
        ) {
            let (visibility, block) = self.parse_custom_code()?;
            let node = file.node_mut(name).expect("declared by caller");
            match visibility {
                Visibility::Public => node.public_blocks.push(block),
                Visibility::Private => node.private_blocks.push(block),
            }
        }
        Ok(())
    }

    // ── Enums and unions ────────────────────────────────────────────────

    fn parse_enum(&mut self, file: &mut RawFile) -> Result<(), ParserError> {
        self.expect(TokenKind::Enum, "`enum`")?;
        let name_tok = self.expect(TokenKind::Ident, "enum name")?;
        self.check_name_available(file, &name_tok.lexeme, name_tok.span, DeclKind::Enum)?;
        self.expect(TokenKind::LBrace, "`{`")?;

        let mut variants = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                variants.push(self.expect(TokenKind::Ident, "enum variant")?.lexeme);
                if self.at(TokenKind::Comma) {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        let end_tok = self.expect(TokenKind::RBrace, "`}`")?;
        self.expect(TokenKind::Semicolon, "`;` after enum declaration")?;

        file.enums.push(RawEnum {
            name: name_tok.lexeme,
            variants,
            span: name_tok.span.merge(end_tok.span),
        });
        Ok(())
    }

    fn parse_union(&mut self, file: &mut RawFile) -> Result<(), ParserError> {
        self.expect(TokenKind::Union, "`union`")?;
        let name_tok = self.expect(TokenKind::Ident, "union name")?;
        self.check_name_available(file, &name_tok.lexeme, name_tok.span, DeclKind::Union)?;

        let mut union = RawUnion {
            name: name_tok.lexeme,
            variants: Vec::new(),
            span: name_tok.span,
        };

        if self.at(TokenKind::LBrace) {
            self.bump()?;
            loop {
                if self.at(TokenKind::RBrace) {
                    break;
                }
                self.expect(TokenKind::Class, "`class`")?;
                self.parse_union_variant_body(&mut union)?;
                self.expect(TokenKind::Semicolon, "`;` after union variant")?;
            }
            self.expect(TokenKind::RBrace, "`}`")?;
        } else {
            // Bare single-variant form: `UNION ident ident [fields] ';'`,
            // with no `class` keyword and no per-variant semicolon -- the
            // union declaration's own trailing `;` is the only terminator.
            self.parse_union_variant_body(&mut union)?;
        }
        self.expect(TokenKind::Semicolon, "`;` after union declaration")?;

        file.unions.push(union);
        Ok(())
    }

    fn parse_union_variant_body(&mut self, union: &mut RawUnion) -> Result<(), ParserError> {
        let name_tok = self.expect(TokenKind::Ident, "union variant name")?;
        let name = name_tok.lexeme;

        if !union.has_variant(&name) {
            union
                .variants
                .push(RawNode::new(name.clone(), Attributes::new(), name_tok.span));
        }

        if self.at(TokenKind::LParen) {
            let fields = self.parse_fields()?;
            let variant = union
                .variants
                .iter_mut()
                .find(|v| v.name == name)
                .expect("just inserted");
            for field in fields {
                if variant.has_field(&field.name) {
                    return Err(ParserError::new(
                        ParserErrorKind::FieldRedefined {
                            node: name.clone(),
                            field: field.name,
                        },
                        field.span,
                    ));
                }
                variant.fields.push(field);
            }
        }
        Ok(())
    }

    // ── Fields ──────────────────────────────────────────────────────────

    fn parse_fields(&mut self) -> Result<Vec<RawField>, ParserError> {
        self.expect(TokenKind::LParen, "`(`")?;
        let mut out = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                out.extend(self.parse_field()?);
                if self.at(TokenKind::Comma) {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`")?;
        Ok(out)
    }

    fn parse_field(&mut self) -> Result<Vec<RawField>, ParserError> {
        let field_attrs = if self.at(TokenKind::LDBracket) {
            self.parse_attributes()?
        } else {
            Attributes::new()
        };

        let mut names = vec![self.expect(TokenKind::Ident, "field name")?.lexeme];
        while self.at(TokenKind::Comma) {
            // A comma here only ever introduces another shared name: the
            // grammar's `field (',' field)*` comma at the `fields` level is
            // only reachable once this field's type (and optional default)
            // have already been consumed, by which point this loop has
            // already exited on `?`/`&`/`:`.
            self.bump()?;
            names.push(self.expect(TokenKind::Ident, "field name")?.lexeme);
        }

        let optional = if self.at(TokenKind::Question) {
            self.bump()?;
            true
        } else {
            false
        };
        let reference = if self.at(TokenKind::Amp) {
            self.bump()?;
            true
        } else {
            false
        };
        self.expect(TokenKind::Colon, "`:`")?;
        let type_tok = self.expect(TokenKind::Ident, "field type")?;

        let mut array = false;
        let mut darray = false;
        let mut map_key = None;
        let mut mmap_key = None;
        if self.at(TokenKind::LBracket) {
            self.bump()?;
            self.expect(TokenKind::RBracket, "`]`")?;
            array = true;
            if self.at(TokenKind::LBracket) {
                self.bump()?;
                self.expect(TokenKind::RBracket, "`]`")?;
                darray = true;
            }
        } else if self.at(TokenKind::Lt) {
            self.bump()?;
            map_key = Some(self.expect(TokenKind::Ident, "map key type")?.lexeme);
            self.expect(TokenKind::Gt, "`>`")?;
        } else if self.at(TokenKind::LBrace) {
            self.bump()?;
            mmap_key = Some(self.expect(TokenKind::Ident, "multimap key type")?.lexeme);
            self.expect(TokenKind::RBrace, "`}`")?;
        }

        let mut default = None;
        let mut end_span = type_tok.span;
        if self.at(TokenKind::Eq) {
            self.bump_raw();
            let tok = self.verbatim(&[], &[], &['\n', ',', ')']);
            self.refill()?;
            end_span = tok.span;
            default = Some(tok.lexeme);
        }

        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let mut attrs = field_attrs.clone();
            if optional {
                attrs.set("optional", None);
            }
            if reference {
                attrs.set("reference", None);
            }
            if darray {
                attrs.set("darray", None);
            } else if array {
                attrs.set("array", None);
            }
            if let Some(key) = &map_key {
                attrs.set("map", Some(key.clone()));
            }
            if let Some(key) = &mmap_key {
                attrs.set("mmap", Some(key.clone()));
            }
            out.push(RawField {
                name,
                type_name: type_tok.lexeme.clone(),
                attributes: attrs,
                default: default.clone(),
                span: type_tok.span.merge(end_span),
            });
        }
        Ok(out)
    }

    // ── Custom code and attributes ──────────────────────────────────────

    fn parse_custom_code(&mut self) -> Result<(Visibility, VerbatimBlock), ParserError> {
        let attrs = if self.at(TokenKind::LDBracket) {
            self.parse_attributes()?
        } else {
            Attributes::new()
        };

        let (visibility, start_span) = match self.current.kind {
            TokenKind::Public => {
                let tok = self.bump()?;
                self.expect(TokenKind::Colon, "`:`")?;
                (Visibility::Public, tok.span)
            }
            TokenKind::Private => {
                let tok = self.bump()?;
                self.expect(TokenKind::Colon, "`:`")?;
                (Visibility::Private, tok.span)
            }
            _ => (Visibility::Private, self.current.span),
        };

        if !self.at(TokenKind::LBrace) {
            return Err(self.unexpected("`{`"));
        }
        let open = self.bump_raw();
        let body = self.verbatim(&['{'], &['}'], &['}']);
        self.refill()?;
        let close = self.expect(TokenKind::RBrace, "`}`")?;

        Ok((
            visibility,
            VerbatimBlock {
                attributes: attrs,
                code: body.lexeme,
                span: start_span.merge(open.span).merge(body.span).merge(close.span),
            },
        ))
    }

    fn parse_attributes(&mut self) -> Result<Attributes, ParserError> {
        self.expect(TokenKind::LDBracket, "`[[`")?;
        let mut attrs = Attributes::new();
        loop {
            let name_tok = self.expect(TokenKind::Ident, "attribute name")?;
            self.validate_attribute_name(&name_tok)?;
            let value = if self.at(TokenKind::Eq) {
                self.bump_raw();
                let tok = self.verbatim(&[], &[], &[',', ']']);
                self.refill()?;
                Some(tok.lexeme)
            } else {
                None
            };
            attrs.set(name_tok.lexeme, value);
            if self.at(TokenKind::Comma) {
                self.bump()?;
                continue;
            }
            break;
        }
        self.expect(TokenKind::RDBracket, "`]]`")?;
        Ok(attrs)
    }

    fn validate_attribute_name(&self, tok: &Token) -> Result<(), ParserError> {
        if RECOGNIZED_ATTRIBUTES.contains(&tok.lexeme.as_str()) {
            Ok(())
        } else {
            Err(ParserError::new(
                ParserErrorKind::UnknownAttribute {
                    name: tok.lexeme.clone(),
                },
                tok.span,
            ))
        }
    }

    fn check_name_available(
        &self,
        file: &RawFile,
        name: &str,
        span: Span,
        this_kind: DeclKind,
    ) -> Result<(), ParserError> {
        let clash = if this_kind == DeclKind::Node {
            // Node redeclaration is a merge (§4.2), so only the other three
            // tables can clash here.
            file.enums.iter().any(|e| e.name == name)
                || file.types.iter().any(|t| t.name == name)
                || file.unions.iter().any(|u| u.name == name)
        } else {
            file.has_name(name)
        };
        if clash {
            let existing_kind = if file.nodes.iter().any(|n| n.name == name) {
                DeclKind::Node
            } else if file.enums.iter().any(|e| e.name == name) {
                DeclKind::Enum
            } else if file.types.iter().any(|t| t.name == name) {
                DeclKind::Type
            } else {
                DeclKind::Union
            };
            return Err(ParserError::new(
                ParserErrorKind::NameAlreadyDefines {
                    name: name.to_string(),
                    kind: existing_kind,
                },
                span,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    Public,
    Private,
}

fn fetch(lexer: &mut Lexer<'_>) -> Result<Token, ParserError> {
    lexer.next_token().map_err(map_lex_error)
}

fn map_lex_error(err: LexerError) -> ParserError {
    ParserError::new(
        ParserErrorKind::UnexpectedToken {
            found: format!("{:?}", err.character),
        },
        Span::point(err.offset),
    )
}

fn describe(tok: &Token) -> String {
    if tok.kind == TokenKind::Eof {
        "end of input".to_string()
    } else {
        format!("{:?} `{}`", tok.kind, tok.lexeme)
    }
}

/// Splits a `#define` directive's trailing text on its first top-level `=`
/// into `(underlying, default)`.
fn split_underlying_default(text: &str) -> (String, Option<String>) {
    match text.find('=') {
        Some(idx) => {
            let underlying = text[..idx].trim().to_string();
            let default = text[idx + 1..].trim().to_string();
            (underlying, if default.is_empty() { None } else { Some(default) })
        }
        None => (text.trim().to_string(), None),
    }
}
