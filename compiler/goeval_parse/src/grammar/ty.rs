//! Type literals: names, pointers, arrays, slices, maps, channels, function
//! signatures, structs and interfaces.

use goeval_ir::{ChanDir, ExprId, ExprKind, FieldGroup, FieldRange, Name, NameRange, Span};
use goeval_stack::ensure_sufficient_stack;

use crate::token::TokenKind;
use crate::{ParseError, ParseErrorKind, Parser};

/// One comma-separated entry of a parameter list before names are resolved.
struct ParamEntry {
    first: ExprId,
    ty: Option<ExprId>,
    span: Span,
}

impl Parser {
    pub(crate) fn parse_type(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_type_inner())
    }

    fn parse_type_inner(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Ident(_) => self.parse_type_name(),
            TokenKind::LBracket => self.parse_array_type(),
            TokenKind::Struct => self.parse_struct_type(),
            TokenKind::Interface => self.parse_interface_type(),
            TokenKind::Map => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.cursor.expect(&TokenKind::RBracket)?;
                let value = self.parse_type()?;
                let span = start.merge(self.span_of(value));
                Ok(self.alloc(ExprKind::MapType { key, value }, span))
            }
            TokenKind::Chan => {
                self.cursor.advance();
                let dir = if self.cursor.eat(&TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = self.parse_type()?;
                let span = start.merge(self.span_of(value));
                Ok(self.alloc(ExprKind::ChanType { dir, value }, span))
            }
            TokenKind::Arrow => {
                self.cursor.advance();
                self.cursor.expect(&TokenKind::Chan)?;
                let value = self.parse_type()?;
                let span = start.merge(self.span_of(value));
                Ok(self.alloc(
                    ExprKind::ChanType {
                        dir: ChanDir::Recv,
                        value,
                    },
                    span,
                ))
            }
            TokenKind::Func => {
                self.cursor.advance();
                let (params, results) = self.parse_signature()?;
                let span = start.merge(self.cursor.previous_span());
                Ok(self.alloc(ExprKind::FuncType { params, results }, span))
            }
            TokenKind::Star => {
                self.cursor.advance();
                let elem = self.parse_type()?;
                let span = start.merge(self.span_of(elem));
                Ok(self.alloc(ExprKind::Star(elem), span))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_type()?;
                let end = self.cursor.expect(&TokenKind::RParen)?;
                Ok(self.alloc(ExprKind::Paren(inner), start.merge(end)))
            }
            found => Err(ParseError::new(
                ParseErrorKind::ExpectedType {
                    found: found.to_string(),
                },
                start,
            )),
        }
    }

    /// `T` or `pkg.T`.
    fn parse_type_name(&mut self) -> Result<ExprId, ParseError> {
        let (name, span) = self.cursor.expect_ident()?;
        let name = self.intern(&name);
        let ident = self.alloc(ExprKind::Ident(name), span);
        if !self.cursor.eat(&TokenKind::Dot) {
            return Ok(ident);
        }
        let (sel, end) = self.cursor.expect_ident()?;
        let sel = self.intern(&sel);
        Ok(self.alloc(ExprKind::Selector { x: ident, sel }, span.merge(end)))
    }

    /// `[]T`, `[N]T` or `[...]T`.
    fn parse_array_type(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(&TokenKind::LBracket)?;
        let len = if self.cursor.eat(&TokenKind::RBracket) {
            None
        } else if self.cursor.check(&TokenKind::Ellipsis) {
            let span = self.cursor.advance().span;
            self.cursor.expect(&TokenKind::RBracket)?;
            Some(self.alloc(ExprKind::Ellipsis(None), span))
        } else {
            let len = self.parse_expr()?;
            self.cursor.expect(&TokenKind::RBracket)?;
            Some(len)
        };
        let elt = self.parse_type()?;
        let span = start.merge(self.span_of(elt));
        Ok(self.alloc(ExprKind::ArrayType { len, elt }, span))
    }

    /// Parameters and optional results, after the `func` keyword.
    fn parse_signature(&mut self) -> Result<(FieldRange, FieldRange), ParseError> {
        let params = self.parse_parameters()?;
        let results = if self.cursor.check(&TokenKind::LParen) {
            self.parse_parameters()?
        } else if self.cursor.current_kind().starts_type()
            && !self.cursor.current().newline_before
        {
            let start = self.cursor.current_span();
            let ty = self.parse_type()?;
            let group = FieldGroup {
                names: NameRange::EMPTY,
                ty,
                tag: None,
                span: start.merge(self.span_of(ty)),
            };
            self.arena.alloc_fields([group])
        } else {
            FieldRange::EMPTY
        };
        Ok((params, results))
    }

    /// `(a, b int, c ...string)` or `(int, string)`.
    ///
    /// Entries are collected first; if any entry has both a name and a type,
    /// every entry must start with a name and untyped names share the type
    /// of the next typed entry.
    fn parse_parameters(&mut self) -> Result<FieldRange, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut entries = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let start = self.cursor.current_span();
            let first = self.parse_param_type()?;
            let ends_entry =
                self.cursor.check(&TokenKind::Comma) || self.cursor.check(&TokenKind::RParen);
            let ty = if ends_entry {
                None
            } else {
                Some(self.parse_param_type()?)
            };
            let span = start.merge(self.cursor.previous_span());
            entries.push(ParamEntry { first, ty, span });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;

        if entries.iter().all(|e| e.ty.is_none()) {
            let groups: Vec<FieldGroup> = entries
                .iter()
                .map(|e| FieldGroup {
                    names: NameRange::EMPTY,
                    ty: e.first,
                    tag: None,
                    span: e.span,
                })
                .collect();
            return Ok(self.arena.alloc_fields(groups));
        }

        let mut pending: Vec<Name> = Vec::new();
        let mut groups = Vec::new();
        let mut last_span = Span::DUMMY;
        for entry in &entries {
            let Some(name) = self.ident_name(entry.first) else {
                return Err(ParseError::new(ParseErrorKind::MixedParameters, entry.span));
            };
            pending.push(name);
            last_span = entry.span;
            if let Some(ty) = entry.ty {
                let names = self.arena.alloc_names(pending.drain(..));
                groups.push(FieldGroup {
                    names,
                    ty,
                    tag: None,
                    span: entry.span,
                });
            }
        }
        if !pending.is_empty() {
            return Err(ParseError::new(ParseErrorKind::MixedParameters, last_span));
        }
        Ok(self.arena.alloc_fields(groups))
    }

    fn parse_param_type(&mut self) -> Result<ExprId, ParseError> {
        if self.cursor.check(&TokenKind::Ellipsis) {
            let start = self.cursor.advance().span;
            let elt = self.parse_type()?;
            let span = start.merge(self.span_of(elt));
            return Ok(self.alloc(ExprKind::Ellipsis(Some(elt)), span));
        }
        self.parse_type()
    }

    fn ident_name(&self, id: ExprId) -> Option<Name> {
        match self.arena.get(id)?.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// `struct { A, B int "tag"; *Embedded; pkg.T }`
    fn parse_struct_type(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.advance().span;
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut groups = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            groups.push(self.parse_field_decl()?);
            self.expect_member_separator()?;
        }
        let end = self.cursor.expect(&TokenKind::RBrace)?;
        let fields = self.arena.alloc_fields(groups);
        Ok(self.alloc(ExprKind::StructType(fields), start.merge(end)))
    }

    fn parse_field_decl(&mut self) -> Result<FieldGroup, ParseError> {
        let start = self.cursor.current_span();
        let embedded = match self.cursor.current_kind() {
            TokenKind::Star => true,
            TokenKind::Ident(_) => {
                let next = self.cursor.peek_next_kind();
                matches!(
                    next,
                    TokenKind::Dot | TokenKind::Semicolon | TokenKind::RBrace
                ) || next.is_literal()
                    || self.cursor.next_on_new_line()
            }
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let names = if embedded {
            NameRange::EMPTY
        } else {
            let mut names = Vec::new();
            loop {
                let (name, _) = self.cursor.expect_ident()?;
                names.push(self.intern(&name));
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.arena.alloc_names(names)
        };

        let ty = self.parse_type()?;
        let tag = if self.cursor.current_kind().is_literal() {
            Some(self.parse_basic_lit()?)
        } else {
            None
        };

        Ok(FieldGroup {
            names,
            ty,
            tag,
            span: start.merge(self.cursor.previous_span()),
        })
    }

    /// `interface { M(int) string; Embedded }`
    fn parse_interface_type(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.advance().span;
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut groups = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            let member_start = self.cursor.current_span();
            let is_method = matches!(self.cursor.current_kind(), TokenKind::Ident(_))
                && matches!(self.cursor.peek_next_kind(), TokenKind::LParen);
            let group = if is_method {
                let (name, _) = self.cursor.expect_ident()?;
                let name = self.intern(&name);
                let (params, results) = self.parse_signature()?;
                let span = member_start.merge(self.cursor.previous_span());
                let ty = self.alloc(ExprKind::FuncType { params, results }, span);
                FieldGroup {
                    names: self.arena.alloc_names([name]),
                    ty,
                    tag: None,
                    span,
                }
            } else {
                let ty = self.parse_type()?;
                FieldGroup {
                    names: NameRange::EMPTY,
                    ty,
                    tag: None,
                    span: self.span_of(ty),
                }
            };
            groups.push(group);
            self.expect_member_separator()?;
        }
        let end = self.cursor.expect(&TokenKind::RBrace)?;
        let methods = self.arena.alloc_fields(groups);
        Ok(self.alloc(ExprKind::InterfaceType(methods), start.merge(end)))
    }

    /// Members are separated by `;` or a line break.
    fn expect_member_separator(&mut self) -> Result<(), ParseError> {
        if self.cursor.eat(&TokenKind::Semicolon)
            || self.cursor.check(&TokenKind::RBrace)
            || self.cursor.current().newline_before
        {
            Ok(())
        } else {
            Err(self.unexpected("`;` or `}`"))
        }
    }
}
