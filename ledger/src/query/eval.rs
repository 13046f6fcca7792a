//! Generic evaluation of filter expression trees.
//!
//! One tree walker serves both granularities: the store-backed evaluator
//! resolves leaves to transaction-ID sets (AND = intersection, OR = union),
//! and the line matcher resolves the same tree to booleans against a single
//! transaction line. Each supplies its own `LeafResolver`.

use crate::Result;

use super::expr::{FilterField, FilterNode, GroupOperator};

/// Leaf resolution strategy for one evaluation granularity.
pub trait LeafResolver {
    /// What a resolved subtree evaluates to (an ID set, a boolean, ...).
    type Output;

    /// Resolve a single `field:value` predicate.
    fn resolve_leaf(&self, field: FilterField, value: &str, is_empty: bool)
        -> Result<Self::Output>;

    /// Combine AND-group children. `items` is never empty.
    fn combine_all(&self, items: Vec<Self::Output>) -> Self::Output;

    /// Combine OR-group children. `items` is never empty.
    fn combine_any(&self, items: Vec<Self::Output>) -> Self::Output;

    /// Result for a zero-child group: matches nothing. Unreachable from
    /// parsing, but trees arriving over the wire are not trusted to uphold
    /// the parser's invariant.
    fn empty_group(&self) -> Self::Output;
}

/// Recursively evaluate a tree with the given leaf resolution strategy.
///
/// Deterministic for a fixed resolver: child results are combined in order,
/// and no leaf is cached or deduplicated: a tree with repeated identical
/// leaves resolves each occurrence independently.
pub fn evaluate<R: LeafResolver>(node: &FilterNode, resolver: &R) -> Result<R::Output> {
    match node {
        FilterNode::Leaf {
            field,
            value,
            is_empty,
        } => resolver.resolve_leaf(*field, value, *is_empty),
        FilterNode::Group { operator, children } => {
            if children.is_empty() {
                return Ok(resolver.empty_group());
            }
            let mut items = Vec::with_capacity(children.len());
            for child in children {
                items.push(evaluate(child, resolver)?);
            }
            Ok(match operator {
                GroupOperator::And => resolver.combine_all(items),
                GroupOperator::Or => resolver.combine_any(items),
            })
        }
    }
}

/// Boolean-valued resolver for line-level filtering.
///
/// Only `category` is meaningful at line granularity; `tag`, `account`, and
/// `counterparty` are parent-level dimensions and pass vacuously.
pub struct LineResolver<'a> {
    /// The line's category name, joined in by the caller. None when the line
    /// has no category reference.
    pub category_name: Option<&'a str>,
}

impl LeafResolver for LineResolver<'_> {
    type Output = bool;

    fn resolve_leaf(&self, field: FilterField, value: &str, is_empty: bool) -> Result<bool> {
        Ok(match field {
            FilterField::Category => {
                if is_empty {
                    self.category_name.is_none()
                } else {
                    match self.category_name {
                        Some(name) => contains_ci(name, value),
                        None => false,
                    }
                }
            }
            FilterField::Tag | FilterField::Account | FilterField::Counterparty => true,
        })
    }

    fn combine_all(&self, items: Vec<bool>) -> bool {
        items.into_iter().all(|matched| matched)
    }

    fn combine_any(&self, items: Vec<bool>) -> bool {
        items.into_iter().any(|matched| matched)
    }

    fn empty_group(&self) -> bool {
        false
    }
}

/// Decide whether a line with the given category name passes the tree.
///
/// Used to prune lines inside an already-matched parent. Fail-open: an
/// evaluation error counts as a pass rather than hiding the line.
pub fn line_matches(category_name: Option<&str>, node: &FilterNode) -> bool {
    evaluate(node, &LineResolver { category_name }).unwrap_or(true)
}

/// Case-insensitive substring match.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterNode;

    fn category(value: &str) -> FilterNode {
        FilterNode::leaf(FilterField::Category, value)
    }

    #[test]
    fn test_line_category_substring() {
        assert!(line_matches(Some("Groceries"), &category("grocer")));
        assert!(!line_matches(Some("Groceries"), &category("rent")));
        assert!(!line_matches(None, &category("grocer")));
    }

    #[test]
    fn test_line_empty_sentinel() {
        let node = FilterNode::empty_leaf(FilterField::Category);
        assert!(line_matches(None, &node));
        assert!(!line_matches(Some("Groceries"), &node));
    }

    #[test]
    fn test_line_parent_level_fields_pass() {
        for node in [
            FilterNode::leaf(FilterField::Tag, "travel"),
            FilterNode::leaf(FilterField::Account, "checking"),
            FilterNode::leaf(FilterField::Counterparty, "diner"),
            FilterNode::empty_leaf(FilterField::Tag),
        ] {
            assert!(line_matches(None, &node));
            assert!(line_matches(Some("Groceries"), &node));
        }
    }

    #[test]
    fn test_line_group_semantics() {
        let both = FilterNode::Group {
            operator: GroupOperator::And,
            children: vec![category("grocer"), FilterNode::leaf(FilterField::Tag, "x")],
        };
        assert!(line_matches(Some("Groceries"), &both));
        assert!(!line_matches(Some("Rent"), &both));

        let either = FilterNode::Group {
            operator: GroupOperator::Or,
            children: vec![category("rent"), category("grocer")],
        };
        assert!(line_matches(Some("Groceries"), &either));
        assert!(!line_matches(Some("Utilities"), &either));
    }

    #[test]
    fn test_empty_group_matches_nothing() {
        let node = FilterNode::Group {
            operator: GroupOperator::And,
            children: Vec::new(),
        };
        assert!(!line_matches(Some("Groceries"), &node));
    }
}
