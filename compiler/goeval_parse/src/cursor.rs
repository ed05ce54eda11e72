//! Token cursor for navigating the token stream.

use goeval_ir::Span;

use crate::token::{Token, TokenKind};
use crate::{ParseError, ParseErrorKind};

/// Owns the token list and tracks the current position.
///
/// Invariant: the last token is always `Eof`, and `pos` never moves past it.
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::Eof)
        ));
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    #[inline]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// Peek at the token after the current one.
    pub fn peek_next_kind(&self) -> &TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + 1).min(last)].kind
    }

    /// Whether the token after the current one starts a new line.
    pub fn next_on_new_line(&self) -> bool {
        self.tokens
            .get(self.pos + 1)
            .is_some_and(|t| t.newline_before)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check the current token's variant, ignoring any payload.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Consume the current token and return it. Stays on `Eof`.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given variant.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given variant or report what was found instead.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected: kind.to_string(),
                    found: self.current_kind().to_string(),
                },
                self.current_span(),
            ))
        }
    }

    /// Consume an identifier and return its text.
    pub fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            let span = self.advance().span;
            Ok((name, span))
        } else {
            Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    expected: "identifier".to_string(),
                    found: self.current_kind().to_string(),
                },
                self.current_span(),
            ))
        }
    }
}
