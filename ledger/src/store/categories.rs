//! Category storage operations.

use std::collections::HashSet;

use duckdb::params;

use super::{id_list, Store};
use crate::schema::CategoryRecord;
use crate::Result;

impl Store {
    /// Write a category record.
    pub fn insert_category(&self, record: &CategoryRecord) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO categories VALUES (?, ?, ?)",
            params![
                record.id.to_string(),
                record.name,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Look up a category by exact name (case-insensitive), creating it if
    /// it does not exist. Returns its ID.
    pub fn find_or_create_category(&self, name: &str) -> Result<String> {
        let conn = self.connection()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT id::VARCHAR FROM categories WHERE lower(name) = lower(?)",
                params![name],
                |row| row.get(0),
            )
            .ok();

        if let Some(id) = existing {
            return Ok(id);
        }

        let record = CategoryRecord::new(name);
        self.insert_category(&record)?;
        Ok(record.id.to_string())
    }

    /// Category IDs whose name contains `value`, case-insensitively.
    pub fn find_category_ids(&self, value: &str) -> Result<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id::VARCHAR FROM categories WHERE contains(lower(name), ?)",
        )?;
        let rows = stmt.query_map(params![value.to_lowercase()], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// IDs of transactions with at least one line in any of the given
    /// categories.
    pub fn transactions_with_category_ids(
        &self,
        category_ids: &[String],
    ) -> Result<HashSet<String>> {
        if category_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let conn = self.connection()?;
        let sql = format!(
            r#"
            SELECT DISTINCT transaction_id::VARCHAR
            FROM transaction_lines
            WHERE category_id::VARCHAR IN ({})
            "#,
            id_list(category_ids)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// IDs of transactions with no categorized line at all.
    pub fn transactions_without_category(&self) -> Result<HashSet<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id::VARCHAR
            FROM transactions t
            WHERE NOT EXISTS (
                SELECT 1 FROM transaction_lines l
                WHERE l.transaction_id = t.id AND l.category_id IS NOT NULL
            )
            "#,
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }
}
