//! Token types produced by the lexer.

use goeval_ir::Span;
use std::fmt;

/// A token with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line break separated this token from the previous one.
    pub newline_before: bool,
}

/// Token kinds. Literal tokens keep their raw source text.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(String),
    Float(String),
    Imag(String),
    Char(String),
    Str(String),

    // Keywords that start type literals
    Chan,
    Func,
    Interface,
    Map,
    Struct,
    /// Statement keywords; never valid inside an expression.
    Keyword(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AmpCaret,
    AmpAmp,
    PipePipe,
    Arrow,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Bang,
    /// Assignment-like operators (`=`, `:=`, `+=`, `++`, ...); only seen in
    /// skipped function bodies.
    StmtOp(String),

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Ellipsis,
    Colon,
    Semicolon,

    Eof,
}

impl TokenKind {
    /// Whether this token can begin a type.
    pub fn starts_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::LBracket
                | TokenKind::Struct
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Interface
                | TokenKind::Star
                | TokenKind::LParen
                | TokenKind::Arrow
        )
    }

    /// Whether this token is a basic literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imag(_)
                | TokenKind::Char(_)
                | TokenKind::Str(_)
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Ident(name) => return write!(f, "identifier `{name}`"),
            TokenKind::Int(text)
            | TokenKind::Float(text)
            | TokenKind::Imag(text)
            | TokenKind::Char(text)
            | TokenKind::Str(text) => return write!(f, "literal {text}"),
            TokenKind::Keyword(kw) => return write!(f, "keyword `{kw}`"),
            TokenKind::StmtOp(op) => return write!(f, "`{op}`"),
            TokenKind::Chan => "`chan`",
            TokenKind::Func => "`func`",
            TokenKind::Interface => "`interface`",
            TokenKind::Map => "`map`",
            TokenKind::Struct => "`struct`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::AmpCaret => "`&^`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Arrow => "`<-`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Bang => "`!`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}
