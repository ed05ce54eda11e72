//! Parse errors.

use goeval_ir::Span;

/// What went wrong while parsing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("invalid character")]
    InvalidCharacter,

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected operand, found {found}")]
    ExpectedOperand { found: String },

    #[error("expected type, found {found}")]
    ExpectedType { found: String },

    #[error("unexpected {found} after expression")]
    TrailingInput { found: String },

    #[error("mixed named and unnamed parameters")]
    MixedParameters,

    #[error("middle and final index required in 3-index slice")]
    IncompleteSlice3,

    #[error("use of .(type) outside type switch")]
    TypeSwitchGuard,

    #[error("unterminated function body")]
    UnterminatedBody,
}

/// Parse error with the location of the offending token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }
}
