//! Account storage operations.

use std::collections::HashSet;

use duckdb::params;

use super::{id_list, Store};
use crate::schema::AccountRecord;
use crate::Result;

impl Store {
    /// Write an account record.
    pub fn insert_account(&self, record: &AccountRecord) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO accounts VALUES (?, ?, ?)",
            params![
                record.id.to_string(),
                record.name,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Look up an account by exact name (case-insensitive), creating it if
    /// it does not exist. Returns its ID.
    pub fn find_or_create_account(&self, name: &str) -> Result<String> {
        let conn = self.connection()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT id::VARCHAR FROM accounts WHERE lower(name) = lower(?)",
                params![name],
                |row| row.get(0),
            )
            .ok();

        if let Some(id) = existing {
            return Ok(id);
        }

        let record = AccountRecord::new(name);
        self.insert_account(&record)?;
        Ok(record.id.to_string())
    }

    /// Account IDs whose name contains `value`, case-insensitively.
    pub fn find_account_ids(&self, value: &str) -> Result<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id::VARCHAR FROM accounts WHERE contains(lower(name), ?)",
        )?;
        let rows = stmt.query_map(params![value.to_lowercase()], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// IDs of transactions belonging to any of the given accounts.
    pub fn transactions_in_accounts(&self, account_ids: &[String]) -> Result<HashSet<String>> {
        if account_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let conn = self.connection()?;
        let sql = format!(
            "SELECT id::VARCHAR FROM transactions WHERE account_id::VARCHAR IN ({})",
            id_list(account_ids)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_store;
    use crate::schema::AccountRecord;

    #[test]
    fn test_find_account_ids_substring() {
        let (_tmp, store) = setup_store();
        let checking = AccountRecord::new("Joint Checking");
        let savings = AccountRecord::new("Savings");
        store.insert_account(&checking).unwrap();
        store.insert_account(&savings).unwrap();

        let ids = store.find_account_ids("check").unwrap();
        assert_eq!(ids, [checking.id.to_string()]);

        assert!(store.find_account_ids("brokerage").unwrap().is_empty());
    }

    #[test]
    fn test_find_or_create_account() {
        let (_tmp, store) = setup_store();

        let first = store.find_or_create_account("Checking").unwrap();
        let second = store.find_or_create_account("checking").unwrap();
        assert_eq!(first, second);

        let other = store.find_or_create_account("Savings").unwrap();
        assert_ne!(first, other);
    }
}
