//! Catalog-level settings stored in the `catalog_meta` key/value table.
//!
//! Values are JSON text. Older writers stored some integer settings as
//! strings or floats, so the readers here coerce instead of failing.

use crate::Result;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

/// Setting key holding the currently selected deck id.
pub const CURRENT_DECK: &str = "curDeck";

/// Reads the raw JSON value stored under `key`.
///
/// Returns `None` if the key is absent. A stored value that is not valid JSON
/// is returned as a JSON string.
pub fn get_config(conn: &Connection, key: &str) -> Result<Option<Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM catalog_meta WHERE key = ?",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw.map(|text| serde_json::from_str(&text).unwrap_or(Value::String(text))))
}

/// Stores `value` under `key`, replacing any previous value.
pub fn set_config(conn: &Connection, key: &str, value: &Value) -> Result<()> {
    conn.execute(
        "INSERT INTO catalog_meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        rusqlite::params![key, serde_json::to_string(value)?],
    )?;
    Ok(())
}

/// Reads `key` as a 64-bit integer.
///
/// Integers, floats (truncated toward zero), numeric strings, and booleans are
/// accepted. Anything else reads as `None`.
pub fn get_config_long(conn: &Connection, key: &str) -> Result<Option<i64>> {
    Ok(get_config(conn, key)?.and_then(|value| coerce_long(&value)))
}

/// Stores `value` under `key` as a JSON integer.
pub fn set_config_long(conn: &Connection, key: &str, value: i64) -> Result<()> {
    set_config(conn, key, &Value::from(value))
}

fn coerce_long(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}
