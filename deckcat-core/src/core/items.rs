//! Item references to decks.
//!
//! Item contents and scheduling live elsewhere; the catalog only tracks which
//! deck each item points at so that removal can re-home orphaned items.

use crate::{DeckId, Result};
use rusqlite::{Connection, OptionalExtension};

/// Numeric item identifier.
pub type ItemId = i64;

/// Inserts a new item referencing `deck_id` and returns its id.
pub fn add_item(conn: &Connection, deck_id: DeckId, created_at: i64) -> Result<ItemId> {
    conn.execute(
        "INSERT INTO items (deck_id, created_at) VALUES (?1, ?2)",
        rusqlite::params![deck_id, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns the deck `item_id` references, or `None` if the item does not exist.
pub fn item_deck(conn: &Connection, item_id: ItemId) -> Result<Option<DeckId>> {
    Ok(conn
        .query_row("SELECT deck_id FROM items WHERE id = ?", [item_id], |row| row.get(0))
        .optional()?)
}

/// Points every item referencing one of `old_ids` at `new_id`.
///
/// Returns the number of items that were reassigned.
pub fn reassign_deck_references(conn: &Connection, old_ids: &[DeckId], new_id: DeckId) -> Result<usize> {
    if old_ids.is_empty() {
        return Ok(0);
    }
    let placeholders = old_ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let sql = format!("UPDATE items SET deck_id = ? WHERE deck_id IN ({placeholders})");
    let mut params: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(old_ids.len() + 1);
    params.push(&new_id);
    params.extend(old_ids.iter().map(|id| id as &dyn rusqlite::ToSql));
    Ok(conn.execute(&sql, params.as_slice())?)
}

/// Counts items referencing any of `deck_ids`.
pub fn count_items_in(conn: &Connection, deck_ids: &[DeckId]) -> Result<usize> {
    if deck_ids.is_empty() {
        return Ok(0);
    }
    let placeholders = deck_ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let sql = format!("SELECT COUNT(*) FROM items WHERE deck_id IN ({placeholders})");
    let count: i64 = conn.query_row(&sql, rusqlite::params_from_iter(deck_ids.iter()), |row| {
        row.get(0)
    })?;
    Ok(count as usize)
}

/// Counts all items in the catalog.
pub fn item_count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    Ok(count as usize)
}
