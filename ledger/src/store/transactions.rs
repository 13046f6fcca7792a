//! Transaction storage operations.

use std::collections::HashSet;

use duckdb::params;

use super::{id_list, Store};
use crate::query::DateRange;
use crate::Result;

/// Summary of a transaction (for listing).
#[derive(Debug)]
pub struct TransactionSummary {
    pub id: String,
    pub date: String,
    pub account: String,
    pub counterparty: Option<String>,
    pub amount_cents: i64,
    pub memo: Option<String>,
}

/// Summary of a transaction line, with its category name joined in.
#[derive(Debug)]
pub struct LineSummary {
    pub id: String,
    pub transaction_id: String,
    pub category_name: Option<String>,
    pub amount_cents: i64,
    pub memo: Option<String>,
}

const SUMMARY_SELECT: &str = r#"
SELECT t.id::VARCHAR, t.date::VARCHAR, a.name, t.counterparty, t.amount_cents, t.memo
FROM transactions t
JOIN accounts a ON a.id = t.account_id
"#;

impl Store {
    /// Count all transactions in the ledger.
    pub fn transaction_count(&self) -> Result<i64> {
        let conn = self.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get the most recent transactions, newest first.
    pub fn recent_transactions(&self, limit: usize) -> Result<Vec<TransactionSummary>> {
        let conn = self.connection()?;
        let sql = format!(
            "{} ORDER BY t.date DESC, t.created_at DESC LIMIT {}",
            SUMMARY_SELECT, limit
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], summary_from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Load summaries for a set of transaction IDs, ordered by date.
    pub fn transactions_by_ids(&self, ids: &HashSet<String>) -> Result<Vec<TransactionSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connection()?;
        let sql = format!(
            "{} WHERE t.id::VARCHAR IN ({}) ORDER BY t.date, t.created_at",
            SUMMARY_SELECT,
            id_list(ids)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], summary_from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Load the lines of one transaction with category names joined in.
    pub fn lines_for_transaction(&self, transaction_id: &str) -> Result<Vec<LineSummary>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT l.id::VARCHAR, l.transaction_id::VARCHAR, c.name, l.amount_cents, l.memo
            FROM transaction_lines l
            LEFT JOIN categories c ON c.id = l.category_id
            WHERE l.transaction_id::VARCHAR = ?
            ORDER BY l.id
            "#,
        )?;
        let rows = stmt.query_map(params![transaction_id], |row| {
            Ok(LineSummary {
                id: row.get(0)?,
                transaction_id: row.get(1)?,
                category_name: row.get(2)?,
                amount_cents: row.get(3)?,
                memo: row.get(4)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// IDs of all transactions.
    pub fn all_transaction_ids(&self) -> Result<HashSet<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT id::VARCHAR FROM transactions")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// IDs of transactions dated within the range, both bounds inclusive.
    pub fn transactions_between(&self, range: DateRange) -> Result<HashSet<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id::VARCHAR FROM transactions
            WHERE date BETWEEN CAST(? AS DATE) AND CAST(? AS DATE)
            "#,
        )?;
        let rows = stmt.query_map(
            params![range.from.to_string(), range.to.to_string()],
            |row| row.get(0),
        )?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// IDs of transactions whose counterparty contains `value`,
    /// case-insensitively.
    pub fn transactions_with_counterparty(&self, value: &str) -> Result<HashSet<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id::VARCHAR FROM transactions
            WHERE counterparty IS NOT NULL AND contains(lower(counterparty), ?)
            "#,
        )?;
        let rows = stmt.query_map(params![value.to_lowercase()], |row| row.get(0))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// IDs of transactions with no counterparty recorded.
    pub fn transactions_without_counterparty(&self) -> Result<HashSet<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id::VARCHAR FROM transactions WHERE counterparty IS NULL OR counterparty = ''",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }
}

fn summary_from_row(row: &duckdb::Row<'_>) -> duckdb::Result<TransactionSummary> {
    Ok(TransactionSummary {
        id: row.get(0)?,
        date: row.get(1)?,
        account: row.get(2)?,
        counterparty: row.get(3)?,
        amount_cents: row.get(4)?,
        memo: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::super::tests::setup_store;
    use super::super::TransactionBatch;
    use super::*;
    use crate::schema::{AccountRecord, TransactionRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_recent_transactions_ordering() {
        let (_tmp, store) = setup_store();
        let account = AccountRecord::new("Checking");
        store.insert_account(&account).unwrap();

        for (day, amount) in [(10, -100), (20, -200), (15, -150)] {
            let record = TransactionRecord::new(account.id, date(2024, 1, day), amount)
                .with_counterparty(format!("Payee {}", day));
            store.write_transaction(&TransactionBatch::new(record)).unwrap();
        }

        let recent = store.recent_transactions(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, "2024-01-20");
        assert_eq!(recent[1].date, "2024-01-15");
        assert_eq!(recent[0].account, "Checking");
    }

    #[test]
    fn test_transactions_between_inclusive() {
        let (_tmp, store) = setup_store();
        let account = AccountRecord::new("Checking");
        store.insert_account(&account).unwrap();

        let mut ids = Vec::new();
        for day in [1, 15, 31] {
            let record = TransactionRecord::new(account.id, date(2024, 1, day), -100);
            ids.push(record.id.to_string());
            store.write_transaction(&TransactionBatch::new(record)).unwrap();
        }

        let range = DateRange {
            from: date(2024, 1, 1),
            to: date(2024, 1, 15),
        };
        let matched = store.transactions_between(range).unwrap();
        assert!(matched.contains(&ids[0]));
        assert!(matched.contains(&ids[1]));
        assert!(!matched.contains(&ids[2]));
    }

    #[test]
    fn test_counterparty_lookups() {
        let (_tmp, store) = setup_store();
        let account = AccountRecord::new("Checking");
        store.insert_account(&account).unwrap();

        let with = TransactionRecord::new(account.id, date(2024, 1, 1), -100)
            .with_counterparty("Corner Grocery");
        let with_id = with.id.to_string();
        let without = TransactionRecord::new(account.id, date(2024, 1, 2), -200);
        let without_id = without.id.to_string();
        store.write_transaction(&TransactionBatch::new(with)).unwrap();
        store.write_transaction(&TransactionBatch::new(without)).unwrap();

        let matched = store.transactions_with_counterparty("grocery").unwrap();
        assert_eq!(matched, HashSet::from([with_id.clone()]));

        let empty = store.transactions_without_counterparty().unwrap();
        assert_eq!(empty, HashSet::from([without_id]));
    }
}
