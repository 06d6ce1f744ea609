//! Durable change history and purge strategies for the catalog.

use crate::{Operation, Result};
use rusqlite::Connection;

/// Seconds in one day; used to convert `retention_days` to a Unix timestamp cutoff.
const SECONDS_PER_DAY: i64 = 86_400;

/// Controls which old operations are removed from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeStrategy {
    /// Retain only the most recent `keep_last` operations.
    LocalOnly { keep_last: usize },
    /// Retain operations for up to `retention_days` before removing them.
    MaxAge { retention_days: u32 },
}

impl Default for PurgeStrategy {
    fn default() -> Self {
        Self::LocalOnly { keep_last: 1000 }
    }
}

/// A logged operation as read back from the `operations` table.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSummary {
    pub operation_id: String,
    pub timestamp: i64,
    pub operation_type: String,
    pub operation: Operation,
}

/// Records catalog mutations to the `operations` table and purges stale entries.
pub struct OperationLog {
    strategy: PurgeStrategy,
}

impl OperationLog {
    /// Creates a new `OperationLog` with the given purge strategy.
    pub fn new(strategy: PurgeStrategy) -> Self {
        Self { strategy }
    }

    /// Serialises `op` and appends it to the `operations` table.
    ///
    /// Callers pass the open transaction of the mutation being logged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DeckcatError::Persistence`] if the INSERT fails, or
    /// [`crate::DeckcatError::Json`] if `op` cannot be serialised.
    pub fn log(&self, conn: &Connection, op: &Operation) -> Result<()> {
        let op_json = serde_json::to_string(op)?;

        conn.execute(
            "INSERT INTO operations (operation_id, timestamp, operation_type, operation_data)
             VALUES (?, ?, ?, ?)",
            rusqlite::params![op.operation_id(), op.timestamp(), op.type_name(), op_json],
        )?;

        Ok(())
    }

    /// Deletes old operations from the log according to the purge strategy.
    ///
    /// Call this after every [`log`](Self::log) call to keep the table bounded in size.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DeckcatError::Persistence`] if the DELETE fails.
    pub fn purge_if_needed(&self, conn: &Connection) -> Result<()> {
        match self.strategy {
            PurgeStrategy::LocalOnly { keep_last } => {
                conn.execute(
                    "DELETE FROM operations WHERE id NOT IN (
                        SELECT id FROM operations ORDER BY id DESC LIMIT ?
                    )",
                    [keep_last as i64],
                )?;
            }
            PurgeStrategy::MaxAge { retention_days } => {
                let cutoff =
                    chrono::Utc::now().timestamp() - (i64::from(retention_days) * SECONDS_PER_DAY);
                conn.execute("DELETE FROM operations WHERE timestamp < ?", [cutoff])?;
            }
        }
        Ok(())
    }

    /// Returns up to `limit` most recent operations, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DeckcatError::Json`] if a stored entry cannot be decoded.
    pub fn list(&self, conn: &Connection, limit: usize) -> Result<Vec<OperationSummary>> {
        let mut stmt = conn.prepare(
            "SELECT operation_id, timestamp, operation_type, operation_data
             FROM operations ORDER BY id DESC LIMIT ?",
        )?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(operation_id, timestamp, operation_type, data)| {
                Ok(OperationSummary {
                    operation_id,
                    timestamp,
                    operation_type,
                    operation: serde_json::from_str(&data)?,
                })
            })
            .collect()
    }
}
