//! SQLite connection ownership and schema bootstrap.

use crate::{DeckcatError, Result};
use log::info;
use rusqlite::Connection;
use std::path::Path;

/// Tables every catalog file must contain.
const REQUIRED_TABLES: [&str; 5] = ["decks", "deck_configs", "items", "catalog_meta", "operations"];

pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Creates (or completes) the catalog schema in the database at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(include_str!("schema.sql"))?;
        info!("created catalog schema at {}", path.as_ref().display());
        Ok(Self { conn })
    }

    /// Opens an existing catalog file, refusing files without the catalog tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;

        let placeholders = REQUIRED_TABLES.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let table_count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ({placeholders})"
            ),
            rusqlite::params_from_iter(REQUIRED_TABLES.iter()),
            |row| row.get(0),
        )?;

        if table_count != REQUIRED_TABLES.len() as i64 {
            return Err(DeckcatError::InvalidCatalog(
                "Not a valid deck catalog database".to_string(),
            ));
        }

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
