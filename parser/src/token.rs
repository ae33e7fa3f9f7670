//! FILENAME: parser/src/token.rs
//! PURPOSE: Token definitions for the formula tokenizer.
//! CONTEXT: Tokens are the atomic units produced by the tokenizer and consumed by the parser.
//! The payload type is tied to the kind: constructors are the only way to pair them,
//! so a `Number` token always carries a number, a `Name` always carries text, and so on.

use crate::error::TokenPayloadError;
use crate::span::Span;
use serde::{Deserialize, Deserializer, Serialize};

/// Kinds of lexical units recognized by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Structural
    LParen,
    RParen,
    LBracket,
    RBracket,
    LCurly,
    RCurly,
    Dot,
    Comma,
    NewLine,
    EOS,

    // Literals
    Name,
    Number,
    String,
    True,
    False,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Eq,
    EqEq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

impl TokenKind {
    /// Fixed spelling of kinds that have one. Payload kinds return `None`.
    pub fn symbol(self) -> Option<&'static str> {
        let s = match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LCurly => "{",
            TokenKind::RCurly => "}",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::NewLine => "\n",
            TokenKind::EOS => "EndOfFile",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Gt => ">",
            TokenKind::Lt => "<",
            TokenKind::GtEq => ">=",
            TokenKind::LtEq => "<=",
            TokenKind::Name | TokenKind::Number | TokenKind::String => return None,
        };
        Some(s)
    }

    /// Single-character lexemes that map directly to a kind.
    /// `=`, `!`, `<` and `>` are listed with their one-character form only.
    pub fn from_char(ch: char) -> Option<TokenKind> {
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Eq,
            '>' => TokenKind::Gt,
            '<' => TokenKind::Lt,
            '!' => TokenKind::Bang,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LCurly,
            '}' => TokenKind::RCurly,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '\n' => TokenKind::NewLine,
            _ => return None,
        };
        Some(kind)
    }

    /// Two-character form of `=`, `!`, `<`, `>` when followed by `=`.
    pub fn with_trailing_eq(ch: char) -> Option<TokenKind> {
        match ch {
            '=' => Some(TokenKind::EqEq),
            '!' => Some(TokenKind::NotEq),
            '<' => Some(TokenKind::LtEq),
            '>' => Some(TokenKind::GtEq),
            _ => None,
        }
    }

    fn has_payload(self) -> bool {
        matches!(
            self,
            TokenKind::Name | TokenKind::Number | TokenKind::String | TokenKind::True | TokenKind::False
        )
    }
}

/// Typed payload carried by a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenData {
    None,
    /// `Name` identifier text or decoded `String` contents.
    Text(String),
    Number(f64),
    Bool(bool),
}

/// One lexical unit: kind, source span, and kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    kind: TokenKind,
    span: Span,
    data: TokenData,
}

/// Wire shape of a token before the kind/payload pairing is checked.
#[derive(Deserialize)]
struct RawToken {
    kind: TokenKind,
    span: Span,
    data: TokenData,
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawToken::deserialize(deserializer)?;
        Token::from_parts(raw.kind, raw.span, raw.data).map_err(serde::de::Error::custom)
    }
}

impl Token {
    pub fn name(text: impl Into<String>, span: Span) -> Self {
        Token {
            kind: TokenKind::Name,
            span,
            data: TokenData::Text(text.into()),
        }
    }

    pub fn number(value: f64, span: Span) -> Self {
        Token {
            kind: TokenKind::Number,
            span,
            data: TokenData::Number(value),
        }
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Token {
            kind: TokenKind::String,
            span,
            data: TokenData::Text(value.into()),
        }
    }

    /// `True` or `False` keyword token.
    pub fn boolean(value: bool, span: Span) -> Self {
        Token {
            kind: if value { TokenKind::True } else { TokenKind::False },
            span,
            data: TokenData::Bool(value),
        }
    }

    /// Token of a kind without payload (structural or operator).
    /// Returns `None` for payload kinds; use the dedicated constructors for those.
    pub fn simple(kind: TokenKind, span: Span) -> Option<Self> {
        if kind.has_payload() {
            return None;
        }
        Some(Token {
            kind,
            span,
            data: TokenData::None,
        })
    }

    /// Checked assembly from separate parts, for tokens that come from outside the tokenizer.
    pub fn from_parts(kind: TokenKind, span: Span, data: TokenData) -> Result<Self, TokenPayloadError> {
        let fits = match (kind, &data) {
            (TokenKind::Name | TokenKind::String, TokenData::Text(_)) => true,
            (TokenKind::Number, TokenData::Number(_)) => true,
            (TokenKind::True, TokenData::Bool(true)) => true,
            (TokenKind::False, TokenData::Bool(false)) => true,
            (kind, TokenData::None) => !kind.has_payload(),
            _ => false,
        };
        if !fits {
            return Err(TokenPayloadError { kind, data });
        }
        Ok(Token { kind, span, data })
    }

    /// Structural or operator token built by the tokenizer from its fixed tables.
    pub(crate) fn bare(kind: TokenKind, span: Span) -> Self {
        debug_assert!(!kind.has_payload());
        Token {
            kind,
            span,
            data: TokenData::None,
        }
    }

    pub(crate) fn eos() -> Self {
        Token {
            kind: TokenKind::EOS,
            span: Span::new(0, 0),
            data: TokenData::None,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn data(&self) -> &TokenData {
        &self.data
    }

    pub fn is_eos(&self) -> bool {
        self.kind == TokenKind::EOS
    }

    /// Identifier text for `Name`, decoded contents for `String`.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            TokenData::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn number_value(&self) -> Option<f64> {
        match self.data {
            TokenData::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn bool_value(&self) -> Option<bool> {
        match self.data {
            TokenData::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub(crate) fn into_data(self) -> TokenData {
        self.data
    }
}

/// Canonical debug rendering of a token.
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.data) {
            (TokenKind::Name, TokenData::Text(s)) => write!(f, "{}", s),
            (TokenKind::Number, TokenData::Number(n)) => write!(f, "{}", n),
            (TokenKind::String, TokenData::Text(s)) => write!(f, "\"{}\"", escape_for_debug(s)),
            (kind, _) => write!(f, "{}", kind.symbol().unwrap_or("")),
        }
    }
}

/// Joins rendered tokens with single spaces. Newlines are not prefixed with a space.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.kind != TokenKind::NewLine && !out.ends_with('\n') {
            out.push(' ');
        }
        out.push_str(&token.to_string());
    }
    out
}

/// Re-escapes exactly the characters the tokenizer decodes, so rendered strings re-lex
/// to the same contents.
fn escape_for_debug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0C' => out.push_str("\\f"),
            '\0' => out.push_str("\\0"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}
