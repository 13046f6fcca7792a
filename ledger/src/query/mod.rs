//! Filter query language for transactions.
//!
//! # Syntax Overview
//!
//! - **Leaf filters**: `field:value` with field one of
//!   `category`, `tag`, `account`, `counterparty` (case-insensitive).
//!   Values are bare tokens or double-quoted strings (`""` escapes a quote).
//! - **Empty sentinel**: the value `-` means "this dimension is absent",
//!   e.g. `counterparty:-`.
//! - **Boolean operators**: `and` / `or` (case-insensitive); AND binds
//!   tighter than OR; parentheses group.
//! - **Date range**: `between <M/D/Y> and <M/D/Y>`, extracted before the
//!   boolean grammar sees the string.
//!
//! Example: `category:groceries and (tag:travel or tag:work) and
//! counterparty:- between 1/1/24 and 1/31/24`
//!
//! Everything here is fail-open: malformed input degrades to fewer
//! constraints, never an error.

mod dates;
mod eval;
mod expr;
mod parser;
mod tokenizer;

pub use dates::{extract_date_range, parse_short_date};
pub use eval::{evaluate, line_matches, LeafResolver, LineResolver};
pub use expr::{
    DateRange, FilterField, FilterNode, GroupOperator, ParsedQuery, EMPTY_MARKER, FILTER_PARAM,
    FROM_PARAM, TO_PARAM,
};
pub use parser::parse;
pub use tokenizer::{tokenize, Token};
