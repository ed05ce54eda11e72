//! Goeval Parse - recursive descent parser for single expressions.
//!
//! Accepts the expression subset of the host grammar, including type
//! literals, and produces a flat [`ExprArena`] plus the root node id.
//!
//! # Module Structure
//!
//! - `lexer`: logos-based tokenizer
//! - `cursor`: token navigation
//! - `grammar::expr`: operators, operands, postfix forms, composite literals
//! - `grammar::ty`: type literals and field/parameter lists

mod cursor;
mod error;
mod grammar;
mod lexer;
mod token;

use goeval_ir::{Expr, ExprArena, ExprId, ExprKind, Name, Span};

use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::lex;
pub use token::{Token, TokenKind};

/// A parsed expression: the arena that owns the tree and its root.
#[derive(Clone, Debug)]
pub struct ParsedExpr {
    pub arena: ExprArena,
    pub root: ExprId,
}

/// Parse one expression. Input left over after the expression is an error.
pub fn parse_expr(source: &str) -> Result<ParsedExpr, ParseError> {
    let tokens = lexer::lex(source)?;
    let mut parser = Parser::new(tokens);
    let root = parser.parse_expr()?;
    if !parser.cursor.is_at_end() {
        return Err(ParseError::new(
            ParseErrorKind::TrailingInput {
                found: parser.cursor.current_kind().to_string(),
            },
            parser.cursor.current_span(),
        ));
    }
    tracing::debug!(nodes = parser.arena.len(), "parsed expression");
    Ok(ParsedExpr {
        arena: parser.arena,
        root,
    })
}

/// Parser state: the token cursor and the arena being filled.
pub(crate) struct Parser {
    pub(crate) cursor: Cursor,
    pub(crate) arena: ExprArena,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena: ExprArena::new(),
        }
    }

    #[inline]
    pub(crate) fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    #[inline]
    pub(crate) fn span_of(&self, id: ExprId) -> Span {
        self.arena.get(id).map_or(Span::DUMMY, |e| e.span)
    }

    #[inline]
    pub(crate) fn intern(&mut self, s: &str) -> Name {
        self.arena.intern(s)
    }

    /// Error for an unexpected token where `expected` was required.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.cursor.current_kind().to_string(),
            },
            self.cursor.current_span(),
        )
    }
}

#[cfg(test)]
mod tests;
