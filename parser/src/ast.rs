//! FILENAME: parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formulas.
//! CONTEXT: After the Tokenizer scans the source, the Parser converts the tokens
//! into this tree. A Formula is an ordered list of statements; order matters
//! because assignments are evaluated top to bottom.
//!
//! SUPPORTED EXPRESSIONS:
//! - Literals: Numbers, Strings, Booleans
//! - Identifiers: a, total_2
//! - Assignments: name = expression
//! - Binary operations: == != < <= > >= + - * /
//! - Unary operations: ! (boolean not), - (numeric negation)

use crate::error::InternalError;
use crate::token::TokenKind;
use serde::{Deserialize, Serialize};

/// Root node: top-level statements in source order.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Formula {
    pub items: Vec<Expr>,
}

/// A variable reference.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Ident { name: name.into() }
    }
}

/// A parsed expression. Each node owns its children.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Expr {
    Ident(Ident),

    /// `target = value`
    Assign { target: Ident, value: Box<Expr> },

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// `!operand`
    NegateBool(Box<Expr>),

    /// `-operand`
    NegateNumber(Box<Expr>),

    Literal(Literal),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name))
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Expr::Assign {
            target: Ident::new(target),
            value: Box::new(value),
        }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn number(n: f64) -> Self {
        Expr::Literal(Literal::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Expr::Literal(Literal::Bool(b))
    }
}

/// Children are detached onto a heap stack first, so dropping a deeply nested
/// tree never recurses once per level.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node, &mut pending);
        }
    }
}

fn detach_children(expr: &mut Expr, pending: &mut Vec<Expr>) {
    match expr {
        Expr::Assign { value, .. } => detach(value, pending),
        Expr::Binary { left, right, .. } => {
            detach(left, pending);
            detach(right, pending);
        }
        Expr::NegateBool(operand) | Expr::NegateNumber(operand) => detach(operand, pending),
        Expr::Ident(_) | Expr::Literal(_) => {}
    }
}

fn detach(slot: &mut Box<Expr>, pending: &mut Vec<Expr>) {
    if matches!(**slot, Expr::Ident(_) | Expr::Literal(_)) {
        return;
    }
    pending.push(std::mem::replace(&mut **slot, Expr::boolean(false)));
}

/// Literal values that can appear in formulas.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
}

/// Binary operators. All are left-associative.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,    // ==
    NotEq, // !=
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=
    Add,   // +
    Sub,   // -
    Mul,   // *
    Div,   // /
}

impl BinaryOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Eq | BinaryOp::NotEq => 3,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div => 6,
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_binary_token(kind: TokenKind) -> bool {
        BinaryOp::from_token(kind).is_some()
    }
}

impl TryFrom<TokenKind> for BinaryOp {
    type Error = InternalError;

    fn try_from(kind: TokenKind) -> Result<Self, Self::Error> {
        BinaryOp::from_token(kind).ok_or(InternalError::UnknownOperator(kind))
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        write!(f, "{}", symbol)
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Fully parenthesized canonical form: every binary node is wrapped in `( )`.
impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Ident(id) => write!(f, "{}", id.name),
            Expr::Assign { target, value } => write!(f, "{} = {}", target.name, value),
            Expr::Binary { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::NegateBool(operand) => write!(f, "!{}", operand),
            Expr::NegateNumber(operand) => write!(f, "-{}", operand),
            Expr::Literal(lit) => write!(f, "{}", lit),
        }
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}
