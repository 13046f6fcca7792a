//! Recursive-descent parser for the filter query language.
//!
//! Two precedence tiers: AND binds tighter than OR. Consecutive terms under
//! the same operator are flattened into one n-ary group, so `a and b and c`
//! is a single three-child AND group rather than nested pairs.
//!
//! Fail-open, like the tokenizer: an unmatched `(` keeps the expression
//! parsed so far, a dangling trailing operator is dropped, and stray tokens
//! after the top-level expression are ignored. Parsing never produces an
//! empty group.

use super::expr::{FilterNode, GroupOperator};
use super::tokenizer::Token;

/// Parse a token sequence into a filter expression tree.
///
/// Returns `None` when the input held nothing parseable (blank or fully
/// unrecognized input), which callers treat as "no filter".
pub fn parse(tokens: &[Token]) -> Option<FilterNode> {
    let (node, _) = parse_or(tokens, 0);
    node
}

/// `orExpr := andExpr ( 'or' andExpr )*`
fn parse_or(tokens: &[Token], mut pos: usize) -> (Option<FilterNode>, usize) {
    let mut children = Vec::new();

    loop {
        let (node, next) = parse_and(tokens, pos);
        pos = next;
        if let Some(node) = node {
            children.push(node);
        }

        match tokens.get(pos) {
            Some(Token::Or) => pos += 1,
            _ => break,
        }
    }

    (group(GroupOperator::Or, children), pos)
}

/// `andExpr := term ( 'and' term )*`
fn parse_and(tokens: &[Token], mut pos: usize) -> (Option<FilterNode>, usize) {
    let mut children = Vec::new();

    loop {
        let (node, next) = parse_term(tokens, pos);
        pos = next;
        if let Some(node) = node {
            children.push(node);
        }

        match tokens.get(pos) {
            Some(Token::And) => pos += 1,
            _ => break,
        }
    }

    (group(GroupOperator::And, children), pos)
}

/// `term := filter | '(' orExpr ')'`
///
/// Anything else yields `None` without consuming, so the caller's operator
/// loop decides what to do with the stray token.
fn parse_term(tokens: &[Token], pos: usize) -> (Option<FilterNode>, usize) {
    match tokens.get(pos) {
        Some(Token::Filter {
            field,
            value,
            is_empty,
        }) => (
            Some(FilterNode::Leaf {
                field: *field,
                value: value.clone(),
                is_empty: *is_empty,
            }),
            pos + 1,
        ),
        Some(Token::LParen) => {
            let (node, mut next) = parse_or(tokens, pos + 1);
            // Missing `)` falls open: keep whatever the group held.
            if matches!(tokens.get(next), Some(Token::RParen)) {
                next += 1;
            }
            (node, next)
        }
        _ => (None, pos),
    }
}

/// Fold collected children into a node: none at all is nothing, a single
/// child stands alone, two or more become a group.
fn group(operator: GroupOperator, mut children: Vec<FilterNode>) -> Option<FilterNode> {
    match children.len() {
        0 => None,
        1 => children.pop(),
        _ => Some(FilterNode::Group { operator, children }),
    }
}
