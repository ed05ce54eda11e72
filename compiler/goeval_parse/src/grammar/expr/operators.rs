//! Operator matching helpers.

use goeval_ir::{BinaryOp, UnaryOp};

use crate::token::TokenKind;
use crate::Parser;

impl Parser {
    pub(crate) fn match_binary_op(&self) -> Option<BinaryOp> {
        match self.cursor.current_kind() {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Quo),
            TokenKind::Percent => Some(BinaryOp::Rem),
            TokenKind::Amp => Some(BinaryOp::And),
            TokenKind::Pipe => Some(BinaryOp::Or),
            TokenKind::Caret => Some(BinaryOp::Xor),
            TokenKind::Shl => Some(BinaryOp::Shl),
            TokenKind::Shr => Some(BinaryOp::Shr),
            TokenKind::AmpCaret => Some(BinaryOp::AndNot),
            TokenKind::AmpAmp => Some(BinaryOp::LAnd),
            TokenKind::PipePipe => Some(BinaryOp::LOr),
            TokenKind::EqEq => Some(BinaryOp::Eql),
            TokenKind::NotEq => Some(BinaryOp::Neq),
            TokenKind::Lt => Some(BinaryOp::Lss),
            TokenKind::LtEq => Some(BinaryOp::Leq),
            TokenKind::Gt => Some(BinaryOp::Gtr),
            TokenKind::GtEq => Some(BinaryOp::Geq),
            _ => None,
        }
    }

    /// Prefix operators other than `*`, which doubles as pointer-type syntax.
    pub(crate) fn match_unary_op(&self) -> Option<UnaryOp> {
        match self.cursor.current_kind() {
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Caret => Some(UnaryOp::Xor),
            TokenKind::Amp => Some(UnaryOp::Addr),
            TokenKind::Arrow => Some(UnaryOp::Recv),
            _ => None,
        }
    }
}
