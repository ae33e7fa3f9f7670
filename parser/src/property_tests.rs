//! FILENAME: parser/src/property_tests.rs
//! PURPOSE: Property-based tests for the tokenizer and parser.
//! CONTEXT: Checked invariants:
//! 1. Any input either fails with an in-bounds span or ends with exactly one EOS
//! 2. Token spans stay inside the input and never overlap
//! 3. Rendering tokens and lexing the result gives the same tokens back
//! 4. Number payloads match the separator-stripped literal text
//! 5. Chains of same-precedence operators nest to the left
//! 6. Redundant parentheses at any depth do not change the tree
//! 7. Prefix chains of any length wrap the operand once per operator
//! 8. Literals beyond the float range are rejected, never lexed as infinity

use proptest::prelude::*;

use crate::ast::{BinaryOp, Expr};
use crate::error::LexError;
use crate::lexer::{tokenize, Tokenizer};
use crate::parser::parse;
use crate::token::{render_tokens, Token, TokenData, TokenKind};

// ============================================================================
// Generators
// ============================================================================

/// Known-valid single-token fragments.
const VALID_FRAGMENTS: &[&str] = &[
    "a",
    "_x1",
    "total",
    "42",
    "3.14",
    "1_000",
    "0xFF",
    "0o17",
    "1e5",
    "2.5e-3",
    "1e308",
    "1e-400",
    "\"hi\"",
    "'it\\'s'",
    "\"tab\\there\"",
    "\"\\q\"",
    "true",
    "false",
    "+",
    "-",
    "*",
    "/",
    "!",
    "=",
    "==",
    "!=",
    "<",
    "<=",
    ">",
    ">=",
    "(",
    ")",
    "[",
    "]",
    "{",
    "}",
    ",",
    ".",
    "\n",
];

fn valid_fragment() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_FRAGMENTS).prop_map(std::string::ToString::to_string)
}

fn valid_source() -> impl Strategy<Value = String> {
    prop::collection::vec(valid_fragment(), 0..24).prop_map(|parts| parts.join(" "))
}

/// Groups decimal digits by three from the right: 1234567 -> 1_234_567.
fn with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }
    out
}

const BINARY_OPS: &[&str] = &["+", "-", "*", "/", "==", "!=", "<", "<=", ">", ">="];

/// Short flat expressions over names and all binary operators.
fn flat_expression() -> impl Strategy<Value = String> {
    let op = prop::sample::select(BINARY_OPS);
    ("[a-z]", prop::collection::vec((op, "[a-z]"), 0..6))
        .prop_map(|(first, rest)| {
            let mut out = first;
            for (op, name) in rest {
                out.push_str(&format!(" {} {}", op, name));
            }
            out
        })
}

fn kinds_and_data(tokens: &[Token]) -> Vec<(TokenKind, TokenData)> {
    tokens.iter().map(|t| (t.kind(), t.data().clone())).collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn stream_ends_with_single_eos(input in "\\PC{0,64}") {
        let len = input.chars().count();
        let results: Vec<_> = Tokenizer::from_source(&input).collect();

        match results.last() {
            Some(Ok(last)) => {
                prop_assert!(last.is_eos());
                let eos_count = results
                    .iter()
                    .filter(|r| matches!(r, Ok(t) if t.is_eos()))
                    .count();
                prop_assert_eq!(eos_count, 1);
            }
            Some(Err(e)) => {
                prop_assert!(e.span().end <= len);
                prop_assert!(e.span().start <= e.span().end);
            }
            None => prop_assert!(false, "tokenizer produced nothing"),
        }
    }

    #[test]
    fn spans_are_ordered_and_in_bounds(input in valid_source()) {
        let len = input.chars().count();
        let tokens = tokenize(&input).unwrap();
        let body = &tokens[..tokens.len() - 1];

        let mut prev_end = 0;
        for token in body {
            let span = token.span();
            prop_assert!(span.start < span.end);
            prop_assert!(span.end <= len);
            prop_assert!(prev_end <= span.start);
            prev_end = span.end;
        }
    }

    #[test]
    fn render_then_relex_round_trips(input in valid_source()) {
        let tokens = tokenize(&input).unwrap();
        let rendered = render_tokens(&tokens[..tokens.len() - 1]);
        let relexed = tokenize(&rendered).unwrap();
        prop_assert_eq!(kinds_and_data(&tokens), kinds_and_data(&relexed));
    }

    #[test]
    fn separated_integers_keep_their_value(n in 0u64..1_000_000_000_000_000) {
        let text = with_separators(n);
        let tokens = tokenize(&text).unwrap();
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].number_value(), Some(n as f64));
    }

    #[test]
    fn floats_match_std_parsing(
        whole in 0u32..100_000,
        frac in "[0-9]{1,6}",
        exp in -300i32..300,
    ) {
        let text = format!("{}.{}e{}", whole, frac, exp);
        let expected: f64 = text.parse().unwrap();
        let tokens = tokenize(&text).unwrap();
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].number_value(), Some(expected));
    }

    #[test]
    fn additive_chains_nest_left(
        names in prop::collection::vec("[a-z]", 2..8),
        ops in prop::collection::vec(prop::bool::ANY, 7),
    ) {
        let mut source = format!("x = {}", names[0]);
        for (name, plus) in names.iter().skip(1).zip(&ops) {
            source.push_str(if *plus { " + " } else { " - " });
            source.push_str(name);
        }

        let formula = parse(&source).unwrap();
        let Expr::Assign { value, .. } = &formula.items[0] else {
            return Err(TestCaseError::fail("expected assignment"));
        };

        // Every right operand is a leaf; the tree leans left.
        let mut node: &Expr = value;
        let mut depth = 0;
        while let Expr::Binary { left, op, right } = node {
            prop_assert!(matches!(op, BinaryOp::Add | BinaryOp::Sub));
            prop_assert!(matches!(**right, Expr::Ident(_)));
            node = &**left;
            depth += 1;
        }
        prop_assert_eq!(depth, names.len() - 1);
    }

    #[test]
    fn redundant_groups_do_not_change_the_tree(
        inner in flat_expression(),
        depth in 0usize..3_000,
    ) {
        let flat = parse(&format!("x = {}", inner)).unwrap();
        let nested = parse(&format!("x = {}{}{}", "(".repeat(depth), inner, ")".repeat(depth))).unwrap();
        prop_assert_eq!(nested, flat);
    }

    #[test]
    fn prefix_chains_wrap_once_per_operator(bangs in prop::collection::vec(prop::bool::ANY, 0..3_000)) {
        let prefix: String = bangs.iter().map(|&bang| if bang { '!' } else { '-' }).collect();
        let formula = parse(&format!("x = {}y", prefix)).unwrap();
        let Expr::Assign { value, .. } = &formula.items[0] else {
            return Err(TestCaseError::fail("expected assignment"));
        };

        let mut node: &Expr = value;
        for &bang in &bangs {
            node = match node {
                Expr::NegateBool(inner) if bang => &**inner,
                Expr::NegateNumber(inner) if !bang => &**inner,
                _ => return Err(TestCaseError::fail("prefix chain out of order")),
            };
        }
        prop_assert!(matches!(node, Expr::Ident(id) if id.name == "y"));
    }

    #[test]
    fn out_of_range_literals_are_invalid(
        mantissa in "[1-9](\\.[0-9]{1,4})?",
        exp in 309u32..5_000,
        digits in 310usize..600,
    ) {
        let text = format!("{}e{}", mantissa, exp);
        let is_invalid = matches!(tokenize(&text), Err(LexError::InvalidNumber { .. }));
        prop_assert!(is_invalid, "{} lexed", text);

        let wide = "7".repeat(digits);
        let is_invalid = matches!(tokenize(&wide), Err(LexError::InvalidNumber { .. }));
        prop_assert!(is_invalid, "{} digits lexed", digits);
    }
}
