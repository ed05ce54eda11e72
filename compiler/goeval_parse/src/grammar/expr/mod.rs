//! Expression parsing.
//!
//! - `mod.rs`: entry point (`parse_expr`), binary precedence climbing, unary
//! - `operators.rs`: operator matching helpers
//! - `primary.rs`: operands, postfix forms and composite literals

mod operators;
mod primary;

use goeval_ir::{ChanDir, ExprId, ExprKind};
use goeval_stack::ensure_sufficient_stack;

use crate::token::TokenKind;
use crate::{ParseError, Parser};

impl Parser {
    /// Parse an expression (types are expressions too).
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_binary_expr(1))
    }

    /// Precedence climbing over the five binary levels; all are left-associative.
    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<ExprId, ParseError> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.match_binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.cursor.advance();
            let right = self.parse_binary_expr(prec + 1)?;
            let span = self.span_of(left).merge(self.span_of(right));
            left = self.alloc(
                ExprKind::Binary {
                    op,
                    x: left,
                    y: right,
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_unary_expr_inner())
    }

    fn parse_unary_expr_inner(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.current_span();

        // `<-chan T` is a type, not a receive.
        if self.cursor.check(&TokenKind::Arrow)
            && matches!(self.cursor.peek_next_kind(), TokenKind::Chan)
        {
            self.cursor.advance();
            self.cursor.advance();
            let value = self.parse_type()?;
            let span = start.merge(self.span_of(value));
            let ty = self.alloc(
                ExprKind::ChanType {
                    dir: ChanDir::Recv,
                    value,
                },
                span,
            );
            return self.parse_postfix(ty);
        }

        if self.cursor.check(&TokenKind::Star) {
            self.cursor.advance();
            let x = self.parse_unary_expr()?;
            let span = start.merge(self.span_of(x));
            return Ok(self.alloc(ExprKind::Star(x), span));
        }

        if let Some(op) = self.match_unary_op() {
            self.cursor.advance();
            let x = self.parse_unary_expr()?;
            let span = start.merge(self.span_of(x));
            return Ok(self.alloc(ExprKind::Unary { op, x }, span));
        }

        self.parse_primary_expr()
    }
}
