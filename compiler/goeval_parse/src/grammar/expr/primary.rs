//! Operands, postfix forms (selector, index, slice, assertion, call) and
//! composite literals.

use goeval_ir::{ExprId, ExprKind, LitKind, Span};

use crate::token::TokenKind;
use crate::{ParseError, ParseErrorKind, Parser};

impl Parser {
    pub(crate) fn parse_primary_expr(&mut self) -> Result<ExprId, ParseError> {
        let operand = self.parse_operand()?;
        self.parse_postfix(operand)
    }

    fn parse_operand(&mut self) -> Result<ExprId, ParseError> {
        let span = self.cursor.current_span();
        match self.cursor.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.cursor.advance();
                let name = self.intern(&name);
                Ok(self.alloc(ExprKind::Ident(name), span))
            }
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Imag(_)
            | TokenKind::Char(_)
            | TokenKind::Str(_) => self.parse_basic_lit(),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                let end = self.cursor.expect(&TokenKind::RParen)?;
                Ok(self.alloc(ExprKind::Paren(inner), span.merge(end)))
            }
            TokenKind::Func => self.parse_func_type_or_lit(),
            TokenKind::LBracket
            | TokenKind::Struct
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Interface => self.parse_type(),
            found => Err(ParseError::new(
                ParseErrorKind::ExpectedOperand {
                    found: found.to_string(),
                },
                span,
            )),
        }
    }

    /// Consume a literal token into a `BasicLit` node holding its raw text.
    pub(crate) fn parse_basic_lit(&mut self) -> Result<ExprId, ParseError> {
        let span = self.cursor.current_span();
        let (kind, text) = match self.cursor.current_kind() {
            TokenKind::Int(text) => (LitKind::Int, text.clone()),
            TokenKind::Float(text) => (LitKind::Float, text.clone()),
            TokenKind::Imag(text) => (LitKind::Imag, text.clone()),
            TokenKind::Char(text) => (LitKind::Char, text.clone()),
            TokenKind::Str(text) => (LitKind::String, text.clone()),
            _ => return Err(self.unexpected("literal")),
        };
        self.cursor.advance();
        let text = self.intern(&text);
        Ok(self.alloc(ExprKind::BasicLit { kind, text }, span))
    }

    /// `func(...) ...` optionally followed by a body, which is skipped.
    fn parse_func_type_or_lit(&mut self) -> Result<ExprId, ParseError> {
        let ty = self.parse_type()?;
        if !self.cursor.check(&TokenKind::LBrace) {
            return Ok(ty);
        }
        let end = self.skip_block()?;
        let span = self.span_of(ty).merge(end);
        Ok(self.alloc(ExprKind::FuncLit { ty }, span))
    }

    /// Skip a balanced `{ ... }` block, returning the closing brace span.
    fn skip_block(&mut self) -> Result<Span, ParseError> {
        let mut depth = 0usize;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(self.cursor.advance().span);
                    }
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnterminatedBody,
                        self.cursor.current_span(),
                    ));
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }

    pub(crate) fn parse_postfix(&mut self, mut x: ExprId) -> Result<ExprId, ParseError> {
        loop {
            x = match self.cursor.current_kind() {
                TokenKind::Dot => self.parse_selector_or_assert(x)?,
                TokenKind::LBracket => self.parse_index_or_slice(x)?,
                TokenKind::LParen => self.parse_call(x)?,
                TokenKind::LBrace if self.is_literal_type(x) => {
                    self.parse_composite_lit(Some(x))?
                }
                _ => return Ok(x),
            };
        }
    }

    fn parse_selector_or_assert(&mut self, x: ExprId) -> Result<ExprId, ParseError> {
        self.cursor.advance();
        let start = self.span_of(x);

        if self.cursor.eat(&TokenKind::LParen) {
            if matches!(self.cursor.current_kind(), TokenKind::Keyword(kw) if kw == "type") {
                return Err(ParseError::new(
                    ParseErrorKind::TypeSwitchGuard,
                    self.cursor.current_span(),
                ));
            }
            let ty = self.parse_type()?;
            let end = self.cursor.expect(&TokenKind::RParen)?;
            return Ok(self.alloc(ExprKind::TypeAssert { x, ty }, start.merge(end)));
        }

        let (sel, end) = self.cursor.expect_ident()?;
        let sel = self.intern(&sel);
        Ok(self.alloc(ExprKind::Selector { x, sel }, start.merge(end)))
    }

    fn parse_index_or_slice(&mut self, x: ExprId) -> Result<ExprId, ParseError> {
        self.cursor.advance();
        let mut indices: [Option<ExprId>; 3] = [None; 3];
        let mut colons = 0usize;

        if !self.cursor.check(&TokenKind::Colon) {
            indices[0] = Some(self.parse_expr()?);
        }
        while colons < 2 && self.cursor.eat(&TokenKind::Colon) {
            colons += 1;
            if !self.cursor.check(&TokenKind::Colon) && !self.cursor.check(&TokenKind::RBracket)
            {
                indices[colons] = Some(self.parse_expr()?);
            }
        }
        let end = self.cursor.expect(&TokenKind::RBracket)?;
        let span = self.span_of(x).merge(end);

        if colons == 0 {
            let Some(index) = indices[0] else {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedOperand {
                        found: TokenKind::RBracket.to_string(),
                    },
                    end,
                ));
            };
            return Ok(self.alloc(ExprKind::Index { x, index }, span));
        }

        let slice3 = colons == 2;
        if slice3 && (indices[1].is_none() || indices[2].is_none()) {
            return Err(ParseError::new(ParseErrorKind::IncompleteSlice3, span));
        }
        Ok(self.alloc(
            ExprKind::Slice {
                x,
                low: indices[0],
                high: indices[1],
                max: indices[2],
                slice3,
            },
            span,
        ))
    }

    fn parse_call(&mut self, func: ExprId) -> Result<ExprId, ParseError> {
        self.cursor.advance();
        let mut args = Vec::new();
        let mut ellipsis = false;

        while !self.cursor.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if self.cursor.eat(&TokenKind::Ellipsis) {
                ellipsis = true;
                self.cursor.eat(&TokenKind::Comma);
                break;
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.cursor.expect(&TokenKind::RParen)?;

        let args = self.arena.alloc_expr_list(args);
        let span = self.span_of(func).merge(end);
        Ok(self.alloc(
            ExprKind::Call {
                func,
                args,
                ellipsis,
            },
            span,
        ))
    }

    /// Operands that may be followed by a composite-literal body.
    fn is_literal_type(&self, x: ExprId) -> bool {
        let Some(expr) = self.arena.get(x) else {
            return false;
        };
        match expr.kind {
            ExprKind::Ident(_)
            | ExprKind::ArrayType { .. }
            | ExprKind::StructType(_)
            | ExprKind::MapType { .. } => true,
            ExprKind::Selector { x: pkg, .. } => {
                matches!(self.arena.get(pkg).map(|e| e.kind), Some(ExprKind::Ident(_)))
            }
            _ => false,
        }
    }

    /// `T{elts}`, or `{elts}` with an elided type inside another literal.
    fn parse_composite_lit(&mut self, ty: Option<ExprId>) -> Result<ExprId, ParseError> {
        let open = self.cursor.expect(&TokenKind::LBrace)?;
        let start = ty.map_or(open, |ty| self.span_of(ty));

        let mut elts = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            elts.push(self.parse_element()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.cursor.expect(&TokenKind::RBrace)?;

        let elts = self.arena.alloc_expr_list(elts);
        Ok(self.alloc(ExprKind::CompositeLit { ty, elts }, start.merge(end)))
    }

    fn parse_element(&mut self) -> Result<ExprId, ParseError> {
        let key = self.parse_element_value()?;
        if !self.cursor.eat(&TokenKind::Colon) {
            return Ok(key);
        }
        let value = self.parse_element_value()?;
        let span = self.span_of(key).merge(self.span_of(value));
        Ok(self.alloc(ExprKind::KeyValue { key, value }, span))
    }

    fn parse_element_value(&mut self) -> Result<ExprId, ParseError> {
        if self.cursor.check(&TokenKind::LBrace) {
            self.parse_composite_lit(None)
        } else {
            self.parse_expr()
        }
    }
}
