//! Tally ledger - bookkeeping storage and filter query engine.
//!
//! Stores accounts, transactions (with nested lines), categories, and tags in
//! DuckDB, and resolves filter query strings like
//! `category:groceries and (tag:travel or tag:work)` to matching
//! transaction-ID sets.

pub mod config;
pub mod error;
pub mod init;
pub mod query;
pub mod schema;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use query::{
    evaluate, line_matches, parse, tokenize, DateRange, FilterField, FilterNode, GroupOperator,
    LeafResolver, ParsedQuery, Token,
};
pub use schema::{
    AccountRecord, CategoryRecord, TagRecord, TransactionLineRecord, TransactionRecord,
};
pub use store::{LineSummary, QueryResult, Store, TransactionBatch, TransactionSummary};
