//! Schema definitions for ledger tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account (checking, savings, credit card, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Unique identifier (UUIDv7 for time-ordering).
    pub id: Uuid,

    /// Display name, matched by case-insensitive substring in filter queries.
    pub name: String,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    /// Create a new account record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A spending category, referenced by transaction lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Unique identifier (UUIDv7 for time-ordering).
    pub id: Uuid,

    /// Display name, matched by case-insensitive substring in filter queries.
    pub name: String,

    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

impl CategoryRecord {
    /// Create a new category record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A tag, linked to transactions through the transaction_tags relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    /// Unique identifier (UUIDv7 for time-ordering).
    pub id: Uuid,

    /// Display name, matched by case-insensitive substring in filter queries.
    pub name: String,

    /// When the tag was created.
    pub created_at: DateTime<Utc>,
}

impl TagRecord {
    /// Create a new tag record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A transaction (the parent record matched by filter queries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier (UUIDv7 for time-ordering).
    pub id: Uuid,

    /// Account this transaction belongs to.
    pub account_id: Uuid,

    /// Ledger date.
    pub date: NaiveDate,

    /// Denormalized counterparty text (payee/payer). None when unknown.
    pub counterparty: Option<String>,

    /// Free-form memo.
    pub memo: Option<String>,

    /// Total amount in integer cents (negative for outflows).
    pub amount_cents: i64,

    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Create a new transaction record.
    pub fn new(account_id: Uuid, date: NaiveDate, amount_cents: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            account_id,
            date,
            counterparty: None,
            memo: None,
            amount_cents,
            created_at: Utc::now(),
        }
    }

    /// Set the counterparty.
    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    /// Set the memo.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// A transaction line (nested child record, carries the category reference).
///
/// A split transaction has several lines whose amounts sum to the parent
/// total; a simple transaction has one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLineRecord {
    /// Unique identifier (UUIDv7 for time-ordering).
    pub id: Uuid,

    /// Transaction this line belongs to.
    pub transaction_id: Uuid,

    /// Category reference. None for uncategorized lines.
    pub category_id: Option<Uuid>,

    /// Line amount in integer cents.
    pub amount_cents: i64,

    /// Free-form memo.
    pub memo: Option<String>,
}

impl TransactionLineRecord {
    /// Create a new uncategorized line.
    pub fn new(transaction_id: Uuid, amount_cents: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            transaction_id,
            category_id: None,
            amount_cents,
            memo: None,
        }
    }

    /// Set the category reference.
    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set the memo.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// SQL to create the accounts table.
pub const ACCOUNTS_SCHEMA: &str = r#"
CREATE TABLE accounts (
    id                UUID PRIMARY KEY,
    name              VARCHAR NOT NULL,
    created_at        TIMESTAMP NOT NULL
);
"#;

/// SQL to create the categories table.
pub const CATEGORIES_SCHEMA: &str = r#"
CREATE TABLE categories (
    id                UUID PRIMARY KEY,
    name              VARCHAR NOT NULL,
    created_at        TIMESTAMP NOT NULL
);
"#;

/// SQL to create the tags table.
pub const TAGS_SCHEMA: &str = r#"
CREATE TABLE tags (
    id                UUID PRIMARY KEY,
    name              VARCHAR NOT NULL,
    created_at        TIMESTAMP NOT NULL
);
"#;

/// SQL to create the transactions table.
pub const TRANSACTIONS_SCHEMA: &str = r#"
CREATE TABLE transactions (
    id                UUID PRIMARY KEY,
    account_id        UUID NOT NULL,
    date              DATE NOT NULL,
    counterparty      VARCHAR,
    memo              VARCHAR,
    amount_cents      BIGINT NOT NULL,
    created_at        TIMESTAMP NOT NULL
);
"#;

/// SQL to create the transaction_lines table.
pub const TRANSACTION_LINES_SCHEMA: &str = r#"
CREATE TABLE transaction_lines (
    id                UUID PRIMARY KEY,
    transaction_id    UUID NOT NULL,
    category_id       UUID,
    amount_cents      BIGINT NOT NULL,
    memo              VARCHAR
);
"#;

/// SQL to create the transaction_tags linking table.
pub const TRANSACTION_TAGS_SCHEMA: &str = r#"
CREATE TABLE transaction_tags (
    transaction_id    UUID NOT NULL,
    tag_id            UUID NOT NULL
);
"#;
