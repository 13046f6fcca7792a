//! Ledger initialization - creates the directory structure and database.

use std::fs;

use crate::schema;
use crate::{Config, Error, Result};

/// Initialize a new ledger.
///
/// Creates the directory structure, the DuckDB database with the bookkeeping
/// schema, and saves the config.
pub fn initialize(config: &Config) -> Result<()> {
    // Check if already initialized
    if config.db_path().exists() {
        return Err(Error::AlreadyInitialized(config.tally_root.clone()));
    }

    fs::create_dir_all(config.db_dir())?;

    init_database(config)?;

    config.save()?;

    Ok(())
}

/// Create the bookkeeping tables.
fn init_database(config: &Config) -> Result<()> {
    let conn = duckdb::Connection::open(config.db_path())?;

    conn.execute_batch(schema::ACCOUNTS_SCHEMA)?;
    conn.execute_batch(schema::CATEGORIES_SCHEMA)?;
    conn.execute_batch(schema::TAGS_SCHEMA)?;
    conn.execute_batch(schema::TRANSACTIONS_SCHEMA)?;
    conn.execute_batch(schema::TRANSACTION_LINES_SCHEMA)?;
    conn.execute_batch(schema::TRANSACTION_TAGS_SCHEMA)?;

    Ok(())
}
