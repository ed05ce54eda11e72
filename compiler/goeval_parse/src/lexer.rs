//! Lexer for expression source using logos.
//!
//! Literal tokens keep their raw text; unquoting and numeric conversion
//! happen when the evaluator builds constants. Line breaks are not tokens,
//! they set `newline_before` on the following token so struct field lists
//! written one per line can be split.

use goeval_ir::Span;
use logos::Logos;

use crate::token::{Token, TokenKind};
use crate::{ParseError, ParseErrorKind};

/// Raw token from logos (before keyword classification).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    #[token("\n")]
    Newline,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // === Literals ===
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"0[oO][0-7_]+")]
    #[regex(r"[0-9][0-9_]*")]
    Int,

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+")]
    Float,

    #[regex(r"[0-9][0-9_]*i")]
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?i")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?i")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+i")]
    Imag,

    #[regex(r"'([^'\\\n]|\\[^\n])+'")]
    Char,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r"`[^`]*`")]
    Str,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&^")]
    AmpCaret,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<-")]
    Arrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("!")]
    Bang,
    #[regex(r"(\+|-|\*|/|%|&|\||\^|<<|>>|&\^)=")]
    #[token("++")]
    #[token("--")]
    #[token(":=")]
    #[token("=")]
    StmtOp,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
}

/// Keywords that can never appear inside an expression.
const STMT_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "go",
    "goto",
    "if",
    "import",
    "package",
    "range",
    "return",
    "select",
    "switch",
    "type",
    "var",
];

/// Tokenize `source`. The returned list always ends with an `Eof` token.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();
    let mut newline = false;

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let slice = lexer.slice();
        let Ok(raw) = result else {
            return Err(ParseError::new(ParseErrorKind::InvalidCharacter, span));
        };

        let kind = match raw {
            RawToken::Newline => {
                newline = true;
                continue;
            }
            RawToken::LineComment => continue,
            RawToken::BlockComment => {
                newline |= slice.contains('\n');
                continue;
            }
            _ => convert_token(raw, slice),
        };

        tokens.push(Token {
            kind,
            span,
            newline_before: std::mem::take(&mut newline),
        });
    }

    let end = Span::from_range(source.len()..source.len());
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: end,
        newline_before: newline,
    });
    Ok(tokens)
}

fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Ident => match slice {
            "chan" => TokenKind::Chan,
            "func" => TokenKind::Func,
            "interface" => TokenKind::Interface,
            "map" => TokenKind::Map,
            "struct" => TokenKind::Struct,
            kw if STMT_KEYWORDS.contains(&kw) => TokenKind::Keyword(kw.to_string()),
            name => TokenKind::Ident(name.to_string()),
        },
        RawToken::Int => TokenKind::Int(slice.to_string()),
        RawToken::Float => TokenKind::Float(slice.to_string()),
        RawToken::Imag => TokenKind::Imag(slice.to_string()),
        RawToken::Char => TokenKind::Char(slice.to_string()),
        RawToken::Str => TokenKind::Str(slice.to_string()),
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::AmpCaret => TokenKind::AmpCaret,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Bang => TokenKind::Bang,
        RawToken::StmtOp => TokenKind::StmtOp(slice.to_string()),
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        // Trivia is filtered out by `lex` before conversion.
        RawToken::LineComment | RawToken::BlockComment | RawToken::Newline => TokenKind::Eof,
    }
}
