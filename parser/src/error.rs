//! FILENAME: parser/src/error.rs
//! PURPOSE: Error types for the tokenizer and the parser.
//! CONTEXT: Every user-facing error carries the span where it was detected.
//! Internal errors signal a broken parser invariant, not bad input.

use crate::span::Span;
use crate::token::{TokenData, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unterminated string literal at {span}")]
    UnterminatedString { span: Span },

    #[error("Invalid token: {ch:?} at {span}")]
    InvalidToken { ch: char, span: Span },

    #[error("Empty radix number at {span}")]
    EmptyRadixDigits { span: Span },

    #[error("Empty exponent at {span}")]
    EmptyExponent { span: Span },

    #[error("Trailing _ are not allowed at {span}")]
    TrailingUnderscore { span: Span },

    #[error("Invalid number: {text} at {span}")]
    InvalidNumber { text: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnterminatedString { span }
            | LexError::InvalidToken { span, .. }
            | LexError::EmptyRadixDigits { span }
            | LexError::EmptyExponent { span }
            | LexError::TrailingUnderscore { span }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

/// A token whose payload does not match its kind.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind:?} token cannot carry payload {data:?}")]
pub struct TokenPayloadError {
    pub kind: TokenKind,
    pub data: TokenData,
}

/// Parser bugs. Reaching one of these means the reducer was handed
/// an impossible state, whatever the input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    #[error("operator reduction left the expression stack inconsistent")]
    BrokenReduction,

    #[error("token {0:?} has no binary operator mapping")]
    UnknownOperator(TokenKind),

    #[error("consumed past the end of the token lookahead")]
    MissingToken,

    #[error("token {0:?} carries a payload of the wrong type")]
    PayloadMismatch(TokenKind),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Empty assignment at {span}")]
    EmptyAssignment { span: Span },

    #[error("Expected expression after operator at {span}")]
    DanglingOperator { span: Span },

    #[error("Expected expression after {op} at {span}")]
    MissingOperand { op: char, span: Span },

    #[error("Expected expression at {span}")]
    ExpectedExpression { span: Span },

    #[error("Unclosed parenthesis at {span}")]
    UnclosedParen { span: Span },

    #[error("Unexpected token {kind:?} at {span}")]
    UnexpectedToken { kind: TokenKind, span: Span },

    #[error("Unsupported syntax: {what} at {span}")]
    Unsupported { what: &'static str, span: Span },

    #[error("Internal parser error: {0}")]
    Internal(#[from] InternalError),
}

impl ParseError {
    /// Source span of the failure. Internal errors have none.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Lex(e) => Some(e.span()),
            ParseError::EmptyAssignment { span }
            | ParseError::DanglingOperator { span }
            | ParseError::MissingOperand { span, .. }
            | ParseError::ExpectedExpression { span }
            | ParseError::UnclosedParen { span }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::Unsupported { span, .. } => Some(*span),
            ParseError::Internal(_) => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ParseError::Internal(_))
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
