//! FILENAME: parser/src/lexer.rs
//! PURPOSE: Scans a character source and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It pulls one character
//! at a time with two characters of lookahead (`ch0`, `ch1`) and handles whitespace
//! skipping, names and keywords, numbers in several radixes, escaped string literals,
//! and the two-character operators `==`, `!=`, `<=`, `>=`.
//!
//! Offsets in spans count characters consumed from the source.
//!
//! SUPPORTED LEXEMES:
//! - Names: [A-Za-z_][A-Za-z0-9_]*, with `true` / `false` as keywords
//! - Numbers: 42, 1_000, 3.14, 1e10, 1.5e-3, 0xFF, 0o17, 0b10
//! - Strings: "..." or '...' with \n \f \t \r \\ \0 \' \" escapes
//! - Single char: + - * / ! = < > ( ) [ ] { } . , and newline
//! - Multi char: == != <= >=

use crate::error::LexError;
use crate::span::Span;
use crate::token::{Token, TokenKind};
use std::iter::FusedIterator;

/// Pull-based tokenizer over any character source.
///
/// Yields `Ok` tokens ending with exactly one `EOS`, then `None`. After an error
/// it yields nothing further; tokenizing cannot resume past a failure.
pub struct Tokenizer<I: Iterator<Item = char>> {
    chars: I,
    ch0: Option<char>,
    ch1: Option<char>,
    /// Offset of `ch0` in the source.
    pos: usize,
    finished: bool,
}

impl<'a> Tokenizer<std::str::Chars<'a>> {
    /// Tokenizer over a string slice. Newlines must already be normalized to `\n`.
    pub fn from_source(source: &'a str) -> Self {
        Tokenizer::new(source.chars())
    }
}

impl<I: Iterator<Item = char>> Tokenizer<I> {
    pub fn new(mut chars: I) -> Self {
        let ch0 = chars.next();
        let ch1 = if ch0.is_some() { chars.next() } else { None };
        Tokenizer {
            chars,
            ch0,
            ch1,
            pos: 0,
            finished: false,
        }
    }

    /// Scans and returns the next token. Once the source is exhausted this keeps
    /// returning `EOS`; the `Iterator` impl is what stops after the first one.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let Some(c) = self.ch0 else {
                return Ok(Token::eos());
            };

            if is_name_start(c) {
                return Ok(self.eat_name());
            }
            if c.is_ascii_digit() {
                return self.eat_number();
            }
            if let Some(token) = self.eat_single_character()? {
                return Ok(token);
            }
        }
    }

    /// Shifts the lookahead window by one character and returns the old `ch0`.
    /// The source is not pulled again once it has run dry.
    fn consume(&mut self) -> Option<char> {
        let cur = self.ch0;
        if cur.is_some() {
            self.pos += 1;
        }
        self.ch0 = self.ch1;
        self.ch1 = if self.ch0.is_some() {
            self.chars.next()
        } else {
            None
        };
        cur
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.pos)
    }

    fn eat_name(&mut self) -> Token {
        let start = self.pos;
        let mut name = String::new();

        while let Some(c) = self.ch0.filter(|c| is_name_continuation(*c)) {
            name.push(c);
            self.consume();
        }

        let span = self.span_from(start);
        match name.as_str() {
            "true" => Token::boolean(true, span),
            "false" => Token::boolean(false, span),
            _ => Token::name(name, span),
        }
    }

    // ========================================================================
    // NUMBERS
    // ========================================================================

    fn eat_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;

        let value = if self.ch0 == Some('0') {
            match self.ch1 {
                Some('x' | 'X') => self.eat_radix_number(start, "0x", 16)?,
                Some('o' | 'O') => self.eat_radix_number(start, "0o", 8)?,
                // Binary prefix is scanned as hex; see DESIGN.md.
                Some('b' | 'B') => self.eat_radix_number(start, "0b", 16)?,
                _ => self.eat_decimal_number(start)?,
            }
        } else {
            self.eat_decimal_number(start)?
        };

        if self.ch0 == Some('_') {
            return Err(LexError::TrailingUnderscore {
                span: Span::new(start, self.pos + 1),
            });
        }

        Ok(Token::number(value, self.span_from(start)))
    }

    /// Consumes the two-character prefix, then a maximal run of digits of `radix`.
    fn eat_radix_number(&mut self, start: usize, prefix: &str, radix: u32) -> Result<f64, LexError> {
        self.consume();
        self.consume();

        let mut digits = String::new();
        while let Some(c) = self.ch0.filter(|c| c.is_digit(radix)) {
            digits.push(c);
            self.consume();
        }

        if digits.is_empty() {
            return Err(LexError::EmptyRadixDigits {
                span: self.span_from(start),
            });
        }

        u64::from_str_radix(&digits, radix)
            .map(|n| n as f64)
            .map_err(|_| LexError::InvalidNumber {
                text: format!("{}{}", prefix, digits),
                span: self.span_from(start),
            })
    }

    fn eat_decimal_number(&mut self, start: usize) -> Result<f64, LexError> {
        let mut text = self.run_radix(10);
        let mut is_float = false;

        let dot_starts_fraction =
            self.ch0 == Some('.') && !self.ch1.is_some_and(is_name_start);

        let fraction_or_exponent = self
            .ch0
            .filter(|c| matches!(c, 'e' | 'E') || dot_starts_fraction);

        if let Some(dot_or_e) = fraction_or_exponent {
            self.consume();
            text.push(dot_or_e);

            if dot_or_e == '.' {
                let decimal_places = self.run_radix(10);
                text.push_str(&decimal_places);

                if let Some(e) = self.ch0.filter(|c| matches!(c, 'e' | 'E')) {
                    if !decimal_places.is_empty() {
                        text.push(e);
                        self.consume();
                        self.eat_exponent(start, &mut text)?;
                    }
                }
            } else {
                self.eat_exponent(start, &mut text)?;
            }

            is_float = true;
        }

        let parsed = if is_float {
            text.parse::<f64>().ok()
        } else {
            // Integers too wide for u64 still have a float value.
            text.parse::<u64>()
                .map(|n| n as f64)
                .or_else(|_| text.parse::<f64>())
                .ok()
        };

        // Out-of-range literals overflow to infinity, which has no literal spelling.
        parsed.filter(|n| n.is_finite()).ok_or_else(|| LexError::InvalidNumber {
            text,
            span: self.span_from(start),
        })
    }

    /// Optional sign followed by a non-empty digit run.
    fn eat_exponent(&mut self, start: usize, text: &mut String) -> Result<(), LexError> {
        if let Some(sign) = self.ch0.filter(|c| matches!(c, '+' | '-')) {
            text.push(sign);
            self.consume();
        }

        let digits = self.run_radix(10);
        if digits.is_empty() {
            return Err(LexError::EmptyExponent {
                span: self.span_from(start),
            });
        }
        text.push_str(&digits);
        Ok(())
    }

    /// Maximal run of digits of `radix`. A `_` is skipped only when the next
    /// character is another digit; the separators are not part of the result.
    fn run_radix(&mut self, radix: u32) -> String {
        let mut res = String::new();
        loop {
            match self.ch0 {
                Some(c) if c.is_digit(radix) => {
                    res.push(c);
                    self.consume();
                }
                Some('_') if self.ch1.is_some_and(|n| n.is_digit(radix)) => {
                    self.consume();
                }
                _ => break,
            }
        }
        res
    }

    // ========================================================================
    // STRINGS, OPERATORS AND PUNCTUATION
    // ========================================================================

    fn eat_quoted_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.pos;
        self.consume(); // opening quote

        let mut value = String::new();
        loop {
            match self.ch0 {
                Some(c) if c == quote => {
                    self.consume();
                    break;
                }
                Some('\\') => {
                    self.consume();
                    let Some(escaped) = self.consume() else {
                        return Err(LexError::UnterminatedString {
                            span: self.span_from(start),
                        });
                    };
                    match unescape(escaped) {
                        Some(ch) => value.push(ch),
                        None => {
                            value.push('\\');
                            value.push(escaped);
                        }
                    }
                }
                // strings end before new lines
                Some('\n') | None => {
                    return Err(LexError::UnterminatedString {
                        span: self.span_from(start),
                    });
                }
                Some(c) => {
                    value.push(c);
                    self.consume();
                }
            }
        }

        Ok(Token::string(value, self.span_from(start)))
    }

    /// Scans one non-name, non-number lexeme. Returns `None` for discarded whitespace.
    fn eat_single_character(&mut self) -> Result<Option<Token>, LexError> {
        let start = self.pos;
        let Some(c) = self.ch0 else {
            return Ok(None);
        };

        let kind = match c {
            '"' | '\'' => return self.eat_quoted_string(c).map(Some),
            ' ' | '\t' => {
                self.consume();
                return Ok(None);
            }
            '=' | '!' | '<' | '>' if self.ch1 == Some('=') => {
                self.consume();
                self.consume();
                TokenKind::with_trailing_eq(c)
            }
            _ => {
                self.consume();
                TokenKind::from_char(c)
            }
        };

        let span = self.span_from(start);
        match kind {
            Some(kind) => Ok(Some(Token::bare(kind, span))),
            None => Err(LexError::InvalidToken { ch: c, span }),
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for Tokenizer<I> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_token();
        match &result {
            Ok(token) if token.is_eos() => {
                self.finished = true;
                crate::log_debug!("LEX", "end of stream after {} chars", self.pos);
            }
            Ok(token) => {
                crate::log_trace!("LEX", "{:?} at {}", token.kind(), token.span());
            }
            Err(e) => {
                self.finished = true;
                crate::log_debug!("LEX", "error: {}", e);
            }
        }
        Some(result)
    }
}

impl<I: Iterator<Item = char>> FusedIterator for Tokenizer<I> {}

/// Replaces `\r\n` with `\n`, the only newline form the tokenizer understands.
pub fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n")
}

/// Tokenizes a whole source string, up to and including `EOS`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let normalized = normalize_newlines(source);
    Tokenizer::from_source(&normalized).collect()
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continuation(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn unescape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'f' => Some('\x0C'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\\' => Some('\\'),
        '0' => Some('\0'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    }
}
