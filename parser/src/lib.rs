//! FILENAME: parser/src/lib.rs
//! PURPOSE: Library root for the formula language front end.
//! CONTEXT: This crate exposes the tokenizer, parser, and AST components
//! needed to turn formula source text into a syntax tree that a host
//! (editor, evaluator, test harness) can render or execute.
//!
//! PIPELINE: Source chars --> Tokenizer --> Tokens --> Parser --> Formula (AST)
//!
//! Both stages are pull-based: the parser asks for tokens on demand and the
//! tokenizer asks for characters on demand. Nothing buffers the whole input.
//!
//! SUPPORTED FEATURES:
//! - Assignments, one per line: a = 10
//! - Arithmetic: +, -, *, /
//! - Comparison: ==, !=, <, >, <=, >=
//! - Unary: !x, -x
//! - Parentheses for grouping
//! - Literals: 1_000, 3.14, 1e-5, 0xFF, 0o17, "text", 'text', true, false

pub mod logging;

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

#[cfg(test)]
mod property_tests;

// Re-export commonly used types for convenience
pub use ast::{BinaryOp, Expr, Formula, Ident, Literal};
pub use error::{InternalError, LexError, ParseError, ParseResult, TokenPayloadError};
pub use lexer::{normalize_newlines, tokenize, Tokenizer};
pub use parser::{parse, Parser};
pub use span::Span;
pub use token::{render_tokens, Token, TokenData, TokenKind};
