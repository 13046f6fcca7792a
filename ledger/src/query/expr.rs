//! Filter expression tree and its wire encoding.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

use super::dates::extract_date_range;
use super::parser::parse;
use super::tokenizer::tokenize;

/// The filterable dimensions.
///
/// Extending this enum is the only way to add a new filterable dimension:
/// the tokenizer, parser, wire encoding, and both evaluators all key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Category,
    Tag,
    Account,
    Counterparty,
}

impl FilterField {
    /// All known fields, in tokenizer match order.
    pub const ALL: [FilterField; 4] = [
        FilterField::Category,
        FilterField::Tag,
        FilterField::Account,
        FilterField::Counterparty,
    ];

    /// The field name as it appears in query strings.
    pub fn name(self) -> &'static str {
        match self {
            FilterField::Category => "category",
            FilterField::Tag => "tag",
            FilterField::Account => "account",
            FilterField::Counterparty => "counterparty",
        }
    }

    /// Parse a field name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| s.eq_ignore_ascii_case(field.name()))
    }
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Boolean combinator for a group node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    And,
    Or,
}

/// A node in the filter expression tree.
///
/// A well-formed tree is either a single `Leaf` or a `Group` with at least
/// one child. Parsing never produces an empty group; one can still arrive
/// over the wire, and the evaluator resolves it to "matches nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// A single `field:value` predicate.
    ///
    /// `is_empty` is set when the literal value was the sentinel `-`,
    /// meaning "this dimension is absent on the record", not the text "-".
    Leaf {
        field: FilterField,
        value: String,
        is_empty: bool,
    },
    /// A homogeneous AND/OR combination of one or more children.
    /// Mixed precedence is represented by nesting, never by mixing operators.
    Group {
        operator: GroupOperator,
        children: Vec<FilterNode>,
    },
}

impl FilterNode {
    /// Shorthand for a non-empty leaf.
    pub fn leaf(field: FilterField, value: impl Into<String>) -> Self {
        FilterNode::Leaf {
            field,
            value: value.into(),
            is_empty: false,
        }
    }

    /// Shorthand for an empty-sentinel leaf.
    pub fn empty_leaf(field: FilterField) -> Self {
        FilterNode::Leaf {
            field,
            value: "-".to_string(),
            is_empty: true,
        }
    }
}

/// An inclusive date range, both bounds included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// A fully built query: optional filter tree plus optional date range.
///
/// Pure immutable value, built fresh per incoming query string; nothing here
/// persists beyond the request that produced it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedQuery {
    pub root: Option<FilterNode>,
    pub date_range: Option<DateRange>,
}

/// Wire marker standing in for the `-` empty sentinel.
///
/// Contains a control character so it cannot collide with any value the
/// tokenizer can capture from typed input.
pub const EMPTY_MARKER: &str = "\u{1}empty";

/// Request parameter carrying the serialized filter tree.
pub const FILTER_PARAM: &str = "filter";
/// Request parameter carrying the range start (RFC3339, inclusive).
pub const FROM_PARAM: &str = "from";
/// Request parameter carrying the range end (RFC3339, inclusive).
pub const TO_PARAM: &str = "to";

/// Typed wire form of a `FilterNode`.
///
/// Leaves carry `{field, value}` with the empty sentinel re-encoded as
/// `EMPTY_MARKER`; groups carry `{operator, children}`. Child order is
/// preserved. Malformed input fails deserialization structurally instead of
/// producing a half-typed tree.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum WireNode {
    Group {
        operator: GroupOperator,
        children: Vec<WireNode>,
    },
    Leaf {
        field: FilterField,
        value: String,
    },
}

impl From<&FilterNode> for WireNode {
    fn from(node: &FilterNode) -> Self {
        match node {
            FilterNode::Leaf {
                field,
                value,
                is_empty,
            } => WireNode::Leaf {
                field: *field,
                value: if *is_empty {
                    EMPTY_MARKER.to_string()
                } else {
                    value.clone()
                },
            },
            FilterNode::Group { operator, children } => WireNode::Group {
                operator: *operator,
                children: children.iter().map(WireNode::from).collect(),
            },
        }
    }
}

impl From<WireNode> for FilterNode {
    fn from(node: WireNode) -> Self {
        match node {
            WireNode::Leaf { field, value } => {
                if value == EMPTY_MARKER {
                    FilterNode::empty_leaf(field)
                } else {
                    FilterNode::Leaf {
                        field,
                        value,
                        is_empty: false,
                    }
                }
            }
            WireNode::Group { operator, children } => FilterNode::Group {
                operator,
                children: children.into_iter().map(FilterNode::from).collect(),
            },
        }
    }
}

impl ParsedQuery {
    /// Build a query from a raw user string.
    ///
    /// The `between <date> and <date>` clause is extracted first so date
    /// text never reaches the boolean grammar; the remainder is tokenized
    /// and parsed. Never fails: malformed input degrades to fewer
    /// constraints, and a blank or unrecognized string means "no filter".
    pub fn from_input(raw: &str) -> Self {
        let (date_range, remainder) = extract_date_range(raw);
        let root = parse(&tokenize(&remainder));
        Self { root, date_range }
    }

    /// Serialize into flat request parameters for the evaluation boundary.
    ///
    /// The tree is a single JSON-encoded parameter; the date range becomes a
    /// pair of RFC3339 UTC timestamps at day granularity.
    pub fn to_params(&self) -> Result<Vec<(String, String)>> {
        let mut params = Vec::new();

        if let Some(root) = &self.root {
            let encoded = serde_json::to_string(&WireNode::from(root))
                .map_err(|e| Error::Encoding(format!("Failed to encode filter: {}", e)))?;
            params.push((FILTER_PARAM.to_string(), encoded));
        }

        if let Some(range) = self.date_range {
            params.push((FROM_PARAM.to_string(), day_timestamp(range.from)));
            params.push((TO_PARAM.to_string(), day_timestamp(range.to)));
        }

        Ok(params)
    }

    /// Deserialize from request parameters.
    ///
    /// Round-tripping through `to_params` reproduces an operationally
    /// equivalent query: same tree shape, same child order, same date range.
    pub fn from_params(params: &[(String, String)]) -> Result<Self> {
        let lookup = |key: &str| {
            params
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str())
        };

        let root = match lookup(FILTER_PARAM) {
            Some(encoded) => {
                let wire: WireNode = serde_json::from_str(encoded)
                    .map_err(|e| Error::Encoding(format!("Failed to decode filter: {}", e)))?;
                Some(FilterNode::from(wire))
            }
            None => None,
        };

        let date_range = match (lookup(FROM_PARAM), lookup(TO_PARAM)) {
            (Some(from), Some(to)) => Some(DateRange {
                from: parse_day_timestamp(from)?,
                to: parse_day_timestamp(to)?,
            }),
            _ => None,
        };

        Ok(Self { root, date_range })
    }
}

/// Encode a ledger date as an RFC3339 UTC timestamp at midnight.
fn day_timestamp(date: NaiveDate) -> String {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    midnight.to_rfc3339()
}

/// Decode an RFC3339 timestamp back to its date portion.
fn parse_day_timestamp(s: &str) -> Result<NaiveDate> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|e| Error::Encoding(format!("Invalid date parameter '{}': {}", s, e)))
}
