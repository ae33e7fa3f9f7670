//! FILENAME: parser/src/parser.rs
//! PURPOSE: Operator-precedence parser that converts a stream of Tokens into a Formula.
//! CONTEXT: This is the second stage of the parsing pipeline. It pulls tokens from
//! the Tokenizer on demand, keeping two tokens of lookahead (`t0`, `t1`).
//!
//! GRAMMAR:
//!   formula    --> NEWLINE* ( item ( NEWLINE+ item )* )? NEWLINE* EOS
//!   item       --> NAME "=" expression | expression
//!   expression --> unit ( binary_op unit )*
//!   unit       --> NUMBER | STRING | "true" | "false" | NAME
//!                | "!" unit | "-" unit | "(" expression ")"
//!   binary_op  --> "==" | "!=" | "<" | "<=" | ">" | ">=" | "+" | "-" | "*" | "/"
//!
//! Binary operators are resolved with an explicit expression stack and operator stack
//! instead of one recursive call per precedence level. Prefix operators and open
//! parentheses are kept on the same operator stack, so no input nests the call stack.
//! Function calls, member access and list/collection literals are rejected as unsupported.

use crate::ast::{BinaryOp, Expr, Formula, Ident, Literal};
use crate::error::{InternalError, LexError, ParseError, ParseResult};
use crate::lexer::Tokenizer;
use crate::span::Span;
use crate::token::{Token, TokenData, TokenKind};

/// Pull-based parser over a token source.
pub struct Parser<T: Iterator<Item = Result<Token, LexError>>> {
    tokens: T,
    t0: Option<Token>,
    t1: Option<Token>,
    primed: bool,
}

impl<'a> Parser<Tokenizer<std::str::Chars<'a>>> {
    /// Parser over a fresh tokenizer. Newlines must already be normalized to `\n`.
    pub fn from_source(source: &'a str) -> Self {
        Parser::new(Tokenizer::from_source(source))
    }
}

impl<T: Iterator<Item = Result<Token, LexError>>> Parser<T> {
    /// Creates a parser. No token is pulled until `parse` is called.
    pub fn new(tokens: T) -> Self {
        Parser {
            tokens,
            t0: None,
            t1: None,
            primed: false,
        }
    }

    /// Parses every statement up to the end of the token stream.
    /// The first error aborts the whole formula.
    pub fn parse(&mut self) -> ParseResult<Formula> {
        crate::log_enter!("PARSE", "parse");

        let result = self.parse_formula();
        match &result {
            Ok(formula) => crate::log_exit!("PARSE", "parse", "items={}", formula.items.len()),
            Err(e) => crate::log_exit!("PARSE", "parse", "error: {}", e),
        }
        result
    }

    fn parse_formula(&mut self) -> ParseResult<Formula> {
        if !self.primed {
            self.consume()?;
            self.consume()?;
            self.primed = true;
        }

        let mut formula = Formula::default();
        loop {
            while self.kind0() == Some(TokenKind::NewLine) {
                self.consume()?;
            }
            if self.at_end() {
                break;
            }

            let item = self.parse_item()?;
            formula.items.push(item);
            crate::log_debug!("PARSE", "item {} parsed, next {:?}", formula.items.len(), self.kind0());

            // Statements are separated by newlines.
            match &self.t0 {
                Some(t) if !t.is_eos() && t.kind() != TokenKind::NewLine => {
                    return Err(ParseError::UnexpectedToken {
                        kind: t.kind(),
                        span: t.span(),
                    });
                }
                _ => {}
            }
        }

        Ok(formula)
    }

    // ========================================================================
    // TOKEN LOOKAHEAD
    // ========================================================================

    /// Returns the current `t0` and shifts the next upstream token into `t1`.
    fn consume(&mut self) -> ParseResult<Option<Token>> {
        let next = self.tokens.next().transpose()?;
        let cur = self.t0.take();
        self.t0 = self.t1.take();
        self.t1 = next;
        Ok(cur)
    }

    /// Consumes a token the caller has already seen in `t0`.
    fn bump(&mut self) -> ParseResult<Token> {
        self.consume()?
            .ok_or_else(|| ParseError::from(InternalError::MissingToken))
    }

    fn kind0(&self) -> Option<TokenKind> {
        self.t0.as_ref().map(Token::kind)
    }

    fn kind1(&self) -> Option<TokenKind> {
        self.t1.as_ref().map(Token::kind)
    }

    fn at_end(&self) -> bool {
        self.t0.as_ref().is_none_or(Token::is_eos)
    }

    // ========================================================================
    // STATEMENTS
    // ========================================================================

    fn parse_item(&mut self) -> ParseResult<Expr> {
        if self.kind0() == Some(TokenKind::Name) && self.kind1() == Some(TokenKind::Eq) {
            let name = self.bump()?;
            let eq = self.bump()?;
            let target = Ident::new(into_text(name)?);

            return match self.parse_expression()? {
                Some(value) => Ok(Expr::Assign {
                    target,
                    value: Box::new(value),
                }),
                None => Err(ParseError::EmptyAssignment { span: eq.span() }),
            };
        }

        match self.parse_expression()? {
            Some(expr) => Ok(expr),
            None => Err(self.unexpected()),
        }
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    /// Parses an expression with an expression stack and an operator stack.
    /// Prefix operators and open parentheses wait on the operator stack too, so
    /// nesting depth never turns into call depth.
    /// Returns `None` when the current token cannot start an expression.
    fn parse_expression(&mut self) -> ParseResult<Option<Expr>> {
        let mut exprs: Vec<Expr> = Vec::new();
        let mut ops: Vec<Pending> = Vec::new();
        let mut open_groups = 0usize;

        loop {
            // Operand position: any run of `!`, `-` and `(` before a primary.
            loop {
                let pending: fn(Span) -> Pending = match self.kind0() {
                    Some(TokenKind::Bang) => Pending::NegateBool,
                    Some(TokenKind::Minus) => Pending::NegateNumber,
                    Some(TokenKind::LParen) => {
                        open_groups += 1;
                        Pending::Group
                    }
                    _ => break,
                };
                let token = self.bump()?;
                ops.push(pending(token.span()));
            }

            match self.parse_primary()? {
                Some(primary) => exprs.push(primary),
                None => {
                    return match ops.last() {
                        None => Ok(None),
                        Some(top) => Err(top.missing_operand()),
                    };
                }
            }

            // Operator position: apply prefixes, then close any groups that end here.
            loop {
                fold_prefixes(&mut exprs, &mut ops)?;
                if open_groups == 0 || self.kind0() != Some(TokenKind::RParen) {
                    break;
                }
                self.consume()?;
                close_group(&mut exprs, &mut ops)?;
                open_groups -= 1;
            }

            if !self.kind0().is_some_and(BinaryOp::is_binary_token) {
                break;
            }
            let op_token = self.bump()?;
            let op = BinaryOp::try_from(op_token.kind())?;
            reduce(&mut exprs, &mut ops, Some(op))?;
            ops.push(Pending::Binary(op, op_token.span()));
        }

        if open_groups > 0 {
            return Err(self.unclosed_group(&ops));
        }

        reduce(&mut exprs, &mut ops, None)?;

        let result = exprs.pop().ok_or(InternalError::BrokenReduction)?;
        if !exprs.is_empty() || !ops.is_empty() {
            return Err(InternalError::BrokenReduction.into());
        }
        Ok(Some(result))
    }

    /// Parses a literal or a name. Returns `None` (not an error) when `t0` is
    /// neither.
    fn parse_primary(&mut self) -> ParseResult<Option<Expr>> {
        let Some(kind) = self.kind0() else {
            return Ok(None);
        };

        match kind {
            TokenKind::String | TokenKind::Number | TokenKind::True | TokenKind::False => {
                let token = self.bump()?;
                Ok(Some(Expr::Literal(into_literal(token)?)))
            }

            TokenKind::Name => {
                let token = self.bump()?;
                let what = match self.kind0() {
                    Some(TokenKind::LParen) => Some("function call"),
                    Some(TokenKind::Dot) => Some("member access"),
                    _ => None,
                };
                if let (Some(what), Some(next)) = (what, &self.t0) {
                    return Err(ParseError::Unsupported {
                        what,
                        span: token.span().merge(next.span()),
                    });
                }
                Ok(Some(Expr::Ident(Ident::new(into_text(token)?))))
            }

            TokenKind::LBracket => Err(self.unsupported("list literal")),
            TokenKind::LCurly => Err(self.unsupported("collection literal")),

            _ => Ok(None),
        }
    }

    /// Reports the innermost `(` still open when the expression ended.
    fn unclosed_group(&self, ops: &[Pending]) -> ParseError {
        let open = ops.iter().rev().find_map(|p| match p {
            Pending::Group(span) => Some(*span),
            _ => None,
        });
        let Some(open) = open else {
            return InternalError::BrokenReduction.into();
        };

        match &self.t0 {
            Some(t) if !t.is_eos() => ParseError::UnclosedParen {
                span: open.merge(t.span()),
            },
            _ => ParseError::UnclosedParen { span: open },
        }
    }

    fn unexpected(&self) -> ParseError {
        match &self.t0 {
            Some(t) => ParseError::UnexpectedToken {
                kind: t.kind(),
                span: t.span(),
            },
            None => InternalError::MissingToken.into(),
        }
    }

    fn unsupported(&self, what: &'static str) -> ParseError {
        match &self.t0 {
            Some(t) => ParseError::Unsupported { what, span: t.span() },
            None => InternalError::MissingToken.into(),
        }
    }
}

/// Operator stack entry. Each remembers the span of the token that opened it.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Binary(BinaryOp, Span),
    NegateBool(Span),
    NegateNumber(Span),
    Group(Span),
}

impl Pending {
    /// Error for an operand position left empty right after this entry.
    fn missing_operand(self) -> ParseError {
        match self {
            Pending::Binary(_, span) => ParseError::DanglingOperator { span },
            Pending::NegateBool(span) => ParseError::MissingOperand { op: '!', span },
            Pending::NegateNumber(span) => ParseError::MissingOperand { op: '-', span },
            Pending::Group(span) => ParseError::ExpectedExpression { span },
        }
    }
}

/// Pops binary operators that bind at least as tightly as `incoming` and combines
/// them with the top two expressions. `None` flushes down to the nearest group
/// marker or the bottom of the stack.
fn reduce(
    exprs: &mut Vec<Expr>,
    ops: &mut Vec<Pending>,
    incoming: Option<BinaryOp>,
) -> Result<(), InternalError> {
    while let Some(&Pending::Binary(top, _)) = ops.last() {
        if incoming.is_some_and(|op| top.precedence() < op.precedence()) {
            break;
        }
        ops.pop();

        let right = exprs.pop().ok_or(InternalError::BrokenReduction)?;
        let left = exprs.pop().ok_or(InternalError::BrokenReduction)?;
        exprs.push(Expr::binary(left, top, right));
    }
    Ok(())
}

/// Wraps the top expression in every prefix operator sitting directly above it.
fn fold_prefixes(exprs: &mut Vec<Expr>, ops: &mut Vec<Pending>) -> Result<(), InternalError> {
    while let Some(&top) = ops.last() {
        let wrap: fn(Box<Expr>) -> Expr = match top {
            Pending::NegateBool(_) => Expr::NegateBool,
            Pending::NegateNumber(_) => Expr::NegateNumber,
            Pending::Binary(..) | Pending::Group(_) => break,
        };
        ops.pop();

        let operand = exprs.pop().ok_or(InternalError::BrokenReduction)?;
        exprs.push(wrap(Box::new(operand)));
    }
    Ok(())
}

/// Reduces the innermost group on `)`; its contents become one operand.
fn close_group(exprs: &mut Vec<Expr>, ops: &mut Vec<Pending>) -> Result<(), InternalError> {
    reduce(exprs, ops, None)?;
    match ops.pop() {
        Some(Pending::Group(_)) => Ok(()),
        _ => Err(InternalError::BrokenReduction),
    }
}

fn into_text(token: Token) -> ParseResult<String> {
    let kind = token.kind();
    match token.into_data() {
        TokenData::Text(s) => Ok(s),
        _ => Err(InternalError::PayloadMismatch(kind).into()),
    }
}

fn into_literal(token: Token) -> ParseResult<Literal> {
    let kind = token.kind();
    match (kind, token.into_data()) {
        (TokenKind::String, TokenData::Text(s)) => Ok(Literal::String(s)),
        (TokenKind::Number, TokenData::Number(n)) => Ok(Literal::Number(n)),
        (TokenKind::True | TokenKind::False, TokenData::Bool(b)) => Ok(Literal::Bool(b)),
        _ => Err(InternalError::PayloadMismatch(kind).into()),
    }
}

/// Convenience function to run the whole pipeline over a source string.
/// `\r\n` line endings are normalized first.
pub fn parse(source: &str) -> ParseResult<Formula> {
    let normalized = crate::lexer::normalize_newlines(source);
    Parser::from_source(&normalized).parse()
}
