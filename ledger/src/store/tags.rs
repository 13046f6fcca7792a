//! Tag storage operations.

use std::collections::HashSet;

use duckdb::params;

use super::{id_list, Store};
use crate::schema::TagRecord;
use crate::Result;

impl Store {
    /// Write a tag record.
    pub fn insert_tag(&self, record: &TagRecord) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO tags VALUES (?, ?, ?)",
            params![
                record.id.to_string(),
                record.name,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Look up a tag by exact name (case-insensitive), creating it if it
    /// does not exist. Returns its ID.
    pub fn find_or_create_tag(&self, name: &str) -> Result<String> {
        let conn = self.connection()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT id::VARCHAR FROM tags WHERE lower(name) = lower(?)",
                params![name],
                |row| row.get(0),
            )
            .ok();

        if let Some(id) = existing {
            return Ok(id);
        }

        let record = TagRecord::new(name);
        self.insert_tag(&record)?;
        Ok(record.id.to_string())
    }

    /// Tag IDs whose name contains `value`, case-insensitively.
    pub fn find_tag_ids(&self, value: &str) -> Result<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT id::VARCHAR FROM tags WHERE contains(lower(name), ?)")?;
        let rows = stmt.query_map(params![value.to_lowercase()], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// IDs of transactions linked to any of the given tags.
    pub fn transactions_with_tag_ids(&self, tag_ids: &[String]) -> Result<HashSet<String>> {
        if tag_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let conn = self.connection()?;
        let sql = format!(
            r#"
            SELECT DISTINCT transaction_id::VARCHAR
            FROM transaction_tags
            WHERE tag_id::VARCHAR IN ({})
            "#,
            id_list(tag_ids)
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// IDs of transactions with no tag links at all.
    pub fn transactions_without_tags(&self) -> Result<HashSet<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id::VARCHAR
            FROM transactions t
            WHERE NOT EXISTS (
                SELECT 1 FROM transaction_tags tt WHERE tt.transaction_id = t.id
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
