//! Store - reads and writes bookkeeping records in DuckDB.

mod accounts;
mod categories;
mod filter;
mod tags;
mod transactions;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use duckdb::{
    params,
    types::{TimeUnit, ValueRef},
    Connection,
};
use uuid::Uuid;

use crate::schema::{TransactionLineRecord, TransactionRecord};
use crate::{Config, Error, Result};

pub use filter::TransactionResolver;
pub use transactions::{LineSummary, TransactionSummary};

/// A transaction with its lines and tag links, written atomically.
#[derive(Debug)]
pub struct TransactionBatch {
    /// The parent transaction record.
    pub transaction: TransactionRecord,

    /// Nested lines. When empty, a single uncategorized line for the full
    /// amount is written so every transaction has at least one line.
    pub lines: Vec<TransactionLineRecord>,

    /// Tags to link through the transaction_tags relation.
    pub tag_ids: Vec<Uuid>,
}

impl TransactionBatch {
    /// Create a new batch for a transaction.
    pub fn new(transaction: TransactionRecord) -> Self {
        Self {
            transaction,
            lines: Vec::new(),
            tag_ids: Vec::new(),
        }
    }

    /// Add a line.
    pub fn with_line(mut self, line: TransactionLineRecord) -> Self {
        self.lines.push(line);
        self
    }

    /// Link a tag.
    pub fn with_tag(mut self, tag_id: Uuid) -> Self {
        self.tag_ids.push(tag_id);
        self
    }
}

/// A ledger store for reading and writing records.
pub struct Store {
    config: Config,
}

impl Store {
    /// Open an existing ledger store.
    pub fn open(config: Config) -> Result<Self> {
        if !config.db_path().exists() {
            return Err(Error::NotInitialized(config.tally_root.clone()));
        }
        Ok(Self { config })
    }

    /// Get a DuckDB connection to the store.
    pub fn connection(&self) -> Result<Connection> {
        let conn = Connection::open(self.config.db_path())?;
        Ok(conn)
    }

    /// Get config reference.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Write a transaction batch in a single database transaction.
    pub fn write_transaction(&self, batch: &TransactionBatch) -> Result<()> {
        for line in &batch.lines {
            if line.transaction_id != batch.transaction.id {
                return Err(Error::Storage(format!(
                    "Line {} does not belong to transaction {}",
                    line.id, batch.transaction.id
                )));
            }
        }

        let conn = self.connection()?;
        conn.execute("BEGIN TRANSACTION", [])?;

        match self.write_transaction_inner(&conn, batch) {
            Ok(()) => {
                conn.execute("COMMIT", [])?;
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn write_transaction_inner(&self, conn: &Connection, batch: &TransactionBatch) -> Result<()> {
        let record = &batch.transaction;

        conn.execute(
            "INSERT INTO transactions VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id.to_string(),
                record.account_id.to_string(),
                record.date.to_string(),
                record.counterparty,
                record.memo,
                record.amount_cents,
                record.created_at.to_rfc3339(),
            ],
        )?;

        if batch.lines.is_empty() {
            let line = TransactionLineRecord::new(record.id, record.amount_cents);
            self.insert_line(conn, &line)?;
        } else {
            for line in &batch.lines {
                self.insert_line(conn, line)?;
            }
        }

        for tag_id in &batch.tag_ids {
            conn.execute(
                "INSERT INTO transaction_tags VALUES (?, ?)",
                params![record.id.to_string(), tag_id.to_string()],
            )?;
        }

        Ok(())
    }

    fn insert_line(&self, conn: &Connection, line: &TransactionLineRecord) -> Result<()> {
        conn.execute(
            "INSERT INTO transaction_lines VALUES (?, ?, ?, ?, ?)",
            params![
                line.id.to_string(),
                line.transaction_id.to_string(),
                line.category_id.map(|id| id.to_string()),
                line.amount_cents,
                line.memo,
            ],
        )?;
        Ok(())
    }

    /// Query the store using SQL.
    ///
    /// Returns rows with every value rendered as a string, for display.
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows_iter = stmt.query([])?;

        let column_count = rows_iter.as_ref().map(|r| r.column_count()).unwrap_or(0);
        let columns: Vec<String> = match rows_iter.as_ref() {
            Some(row_ref) => (0..column_count)
                .map(|i| {
                    row_ref
                        .column_name(i)
                        .map(|s| s.to_string())
                        .unwrap_or_else(|_| format!("col{}", i))
                })
                .collect(),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        while let Some(row) = rows_iter.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(render_value(row.get_ref(i)?));
            }
            rows.push(values);
        }

        Ok(QueryResult { columns, rows })
    }
}

/// Result of a SQL query.
#[derive(Debug)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Render a single DuckDB value as display text.
fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Boolean(b) => b.to_string(),
        ValueRef::TinyInt(n) => n.to_string(),
        ValueRef::SmallInt(n) => n.to_string(),
        ValueRef::Int(n) => n.to_string(),
        ValueRef::BigInt(n) => n.to_string(),
        ValueRef::HugeInt(n) => n.to_string(),
        ValueRef::UTinyInt(n) => n.to_string(),
        ValueRef::USmallInt(n) => n.to_string(),
        ValueRef::UInt(n) => n.to_string(),
        ValueRef::UBigInt(n) => n.to_string(),
        ValueRef::Float(f) => f.to_string(),
        ValueRef::Double(f) => f.to_string(),
        ValueRef::Decimal(d) => d.to_string(),
        ValueRef::Timestamp(unit, val) => {
            let micros = match unit {
                TimeUnit::Second => val * 1_000_000,
                TimeUnit::Millisecond => val * 1_000,
                TimeUnit::Microsecond => val,
                TimeUnit::Nanosecond => val / 1_000,
            };
            DateTime::<Utc>::from_timestamp_micros(micros)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| format!("<invalid timestamp {}>", val))
        }
        ValueRef::Date32(days) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(TimeDelta::days(days as i64)))
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| format!("<invalid date {}>", days)),
        ValueRef::Text(s) => String::from_utf8_lossy(s).to_string(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
        _ => "<complex>".to_string(),
    }
}

/// Build a quoted SQL list from ID strings for an IN clause.
///
/// IDs come from the store's own UUID columns, never from user text.
pub(crate) fn id_list<'a>(ids: impl IntoIterator<Item = &'a String>) -> String {
    ids.into_iter()
        .map(|id| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(", ")
}
