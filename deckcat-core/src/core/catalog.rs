//! High-level catalog operations over a deck catalog SQLite database.

use crate::core::{items, meta, name};
use crate::{
    ConfigId, Deck, DeckConfig, DeckId, DeckKind, DeckcatError, FilteredDeck, ItemId, Operation,
    OperationLog, OperationSummary, PurgeStrategy, Result, SchedulingParams, Storage,
    DEFAULT_CONFIG_ID, DEFAULT_DECK_ID, DEFAULT_DECK_NAME, NO_DECK_LABEL,
};
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

/// Display name given to the default config when it is created or recreated.
const DEFAULT_CONFIG_NAME: &str = "Default";

/// Columns selected by every deck query, in [`map_deck_row`] order.
const DECK_COLUMNS: &str = "id, name, conf_id, description, collapsed, mtime, kind_json";

/// Columns selected by every config query, in [`map_config_row`] order.
const CONFIG_COLUMNS: &str = "id, name, is_filtered, mtime, config_json";

/// An open deck catalog backed by a SQLite database.
///
/// `Catalog` is the single entry point for reading and mutating decks and
/// their configs. Every mutation runs inside one SQLite transaction and takes
/// `&mut self`, so a catalog has exactly one writer at a time. Embedders that
/// share a catalog across threads wrap it in a `Mutex`.
pub struct Catalog {
    pub(crate) storage: Storage,
    pub(crate) operation_log: OperationLog,
}

impl Catalog {
    /// Creates a new catalog at `path` holding only the default deck and config.
    ///
    /// On a file that already holds a catalog, missing tables and defaults are
    /// completed and existing decks and the current selection are kept.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::Persistence`] for any SQLite failure.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with(path, PurgeStrategy::default())
    }

    /// Like [`create`](Self::create), with an explicit change-history retention policy.
    pub fn create_with<P: AsRef<Path>>(path: P, strategy: PurgeStrategy) -> Result<Self> {
        let mut storage = Storage::create(&path)?;

        let tx = storage.connection_mut().transaction()?;
        ensure_defaults(&tx)?;
        if meta::get_config_long(&tx, meta::CURRENT_DECK)?.is_none() {
            meta::set_config_long(&tx, meta::CURRENT_DECK, DEFAULT_DECK_ID)?;
        }
        tx.commit()?;

        info!("created deck catalog at {}", path.as_ref().display());
        Ok(Self {
            storage,
            operation_log: OperationLog::new(strategy),
        })
    }

    /// Opens an existing catalog, recreating the default deck and config if missing.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::InvalidCatalog`] if the file lacks the catalog
    /// tables, or [`DeckcatError::Persistence`] for any SQLite failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, PurgeStrategy::default())
    }

    /// Like [`open`](Self::open), with an explicit change-history retention policy.
    pub fn open_with<P: AsRef<Path>>(path: P, strategy: PurgeStrategy) -> Result<Self> {
        let mut storage = Storage::open(&path)?;

        let tx = storage.connection_mut().transaction()?;
        ensure_defaults(&tx)?;
        tx.commit()?;

        info!("opened deck catalog at {}", path.as_ref().display());
        Ok(Self {
            storage,
            operation_log: OperationLog::new(strategy),
        })
    }

    /// Returns the underlying SQLite connection.
    pub fn connection(&self) -> &Connection {
        self.storage.connection()
    }

    /// Returns the id of the deck named `name`, creating it and any missing
    /// ancestors as standard decks with the default config.
    ///
    /// Matching is case-insensitive on the normalized name; the first spelling
    /// used is the one that is displayed.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::Persistence`] if the catalog cannot be written.
    pub fn get_or_create_by_name(&mut self, name: &str) -> Result<DeckId> {
        let name = name::strip(name);
        if let Some(id) = find_id_by_key(self.connection(), &name.to_lowercase())? {
            return Ok(id);
        }

        let tx = self.storage.connection_mut().transaction()?;
        ensure_parents(&tx, &self.operation_log, &name)?;
        let id = insert_new_deck(&tx, &self.operation_log, &name, DeckKind::default(), DEFAULT_CONFIG_ID)?;
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        info!("created deck {id} '{name}'");
        Ok(id)
    }

    /// Creates a filtered deck named `name` with its own filtered config.
    ///
    /// Missing ancestors are created as standard decks.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::DuplicateName`] if a deck with that name already
    /// exists, [`DeckcatError::InvalidName`] for an empty name, or
    /// [`DeckcatError::Persistence`] for any SQLite failure.
    pub fn new_filtered(&mut self, name: &str, filter: FilteredDeck) -> Result<DeckId> {
        let name = name::strip(name);
        if name.is_empty() {
            return Err(DeckcatError::InvalidName(name));
        }
        if find_id_by_key(self.connection(), &name.to_lowercase())?.is_some() {
            return Err(DeckcatError::DuplicateName(name));
        }

        let tx = self.storage.connection_mut().transaction()?;
        let conf_id = insert_new_config(&tx, &self.operation_log, &name, true, SchedulingParams::default())?;
        ensure_parents(&tx, &self.operation_log, &name)?;
        let id = insert_new_deck(&tx, &self.operation_log, &name, DeckKind::Filtered(filter), conf_id)?;
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        info!("created filtered deck {id} '{name}' with config {conf_id}");
        Ok(id)
    }

    /// Returns the id of the deck named `name`, or `None`. Never creates anything.
    pub fn id_for_name(&self, name: &str) -> Result<Option<DeckId>> {
        find_id_by_key(self.connection(), &name::name_key(name))
    }

    /// Returns the deck named `name` (case-insensitive), or `None`.
    pub fn by_name(&self, name: &str) -> Result<Option<Deck>> {
        match self.id_for_name(name)? {
            Some(id) => find_deck(self.connection(), id),
            None => Ok(None),
        }
    }

    /// Returns the display name of `deck_id`, or [`NO_DECK_LABEL`] if it does not resolve.
    pub fn name(&self, deck_id: DeckId) -> Result<String> {
        let name: Option<String> = self
            .connection()
            .query_row("SELECT name FROM decks WHERE id = ?", [deck_id], |row| row.get(0))
            .optional()?;
        Ok(name.unwrap_or_else(|| NO_DECK_LABEL.to_string()))
    }

    /// Fetches a single deck by id.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::DeckNotFound`] if no deck has that id.
    pub fn get(&self, deck_id: DeckId) -> Result<Deck> {
        find_deck(self.connection(), deck_id)?.ok_or(DeckcatError::DeckNotFound(deck_id))
    }

    /// Returns every deck ordered by id.
    pub fn all(&self) -> Result<Vec<Deck>> {
        load_decks(self.connection())
    }

    /// Returns every deck name, sorted lexicographically.
    pub fn all_sorted_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.all()?.into_iter().map(|d| d.name).collect();
        names.sort();
        Ok(names)
    }

    /// Returns `(name, id)` pairs for every deck, sorted by name.
    pub fn all_names_and_ids(&self) -> Result<Vec<(String, DeckId)>> {
        let mut pairs: Vec<(String, DeckId)> =
            self.all()?.into_iter().map(|d| (d.name, d.id)).collect();
        pairs.sort();
        Ok(pairs)
    }

    /// Returns the number of decks in the catalog.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM decks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Writes every field of `deck` back to the catalog and refreshes its `mtime`.
    ///
    /// The name is stored as given. Name changes that must keep the tree
    /// consistent go through [`rename`](Self::rename) instead.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::DeckNotFound`] if `deck.id` does not exist.
    pub fn save(&mut self, deck: &Deck) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let changed = self.connection().execute(
            "UPDATE decks SET name = ?1, name_key = ?2, conf_id = ?3, is_filtered = ?4,
                              description = ?5, collapsed = ?6, mtime = ?7, kind_json = ?8
             WHERE id = ?9",
            rusqlite::params![
                deck.name,
                name::name_key(&deck.name),
                deck.conf_id,
                deck.is_dyn(),
                deck.description,
                deck.collapsed,
                now,
                serde_json::to_string(&deck.kind)?,
                deck.id,
            ],
        )?;
        if changed == 0 {
            return Err(DeckcatError::DeckNotFound(deck.id));
        }
        Ok(())
    }

    /// Flips the `collapsed` tree-UI flag of `deck_id`.
    ///
    /// Like selection, this is UI state and is not written to the change history.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::DeckNotFound`] if `deck_id` does not exist.
    pub fn collapse(&mut self, deck_id: DeckId) -> Result<()> {
        let changed = self.connection().execute(
            "UPDATE decks SET collapsed = 1 - collapsed WHERE id = ?",
            [deck_id],
        )?;
        if changed == 0 {
            return Err(DeckcatError::DeckNotFound(deck_id));
        }
        Ok(())
    }

    /// Returns the config that applies to `deck_id`.
    ///
    /// Falls back to the default config when the deck does not exist or its
    /// config reference dangles, so every read path stays total.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::ConfigNotFound`] only if the default config
    /// itself is missing, which [`open`](Self::open) prevents.
    pub fn conf_for_did(&self, deck_id: DeckId) -> Result<DeckConfig> {
        let conn = self.connection();
        if let Some(deck) = find_deck(conn, deck_id)? {
            if let Some(conf) = find_config(conn, deck.conf_id)? {
                return Ok(conf);
            }
            warn!(
                "deck {deck_id} references missing config {}; using the default",
                deck.conf_id
            );
        }
        find_config(conn, DEFAULT_CONFIG_ID)?.ok_or(DeckcatError::ConfigNotFound(DEFAULT_CONFIG_ID))
    }

    /// Fetches a config by id.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::ConfigNotFound`] if no config has that id.
    pub fn get_config(&self, conf_id: ConfigId) -> Result<DeckConfig> {
        find_config(self.connection(), conf_id)?.ok_or(DeckcatError::ConfigNotFound(conf_id))
    }

    /// Returns every config ordered by id.
    pub fn all_configs(&self) -> Result<Vec<DeckConfig>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("SELECT {CONFIG_COLUMNS} FROM deck_configs ORDER BY id"))?;
        let rows = stmt
            .query_map([], map_config_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(config_from_row).collect()
    }

    /// Creates a standard config named `name`, copying the scheduling
    /// parameters of `clone_from` when given.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::ConfigNotFound`] if `clone_from` does not exist.
    pub fn add_config(&mut self, name: &str, clone_from: Option<ConfigId>) -> Result<ConfigId> {
        let scheduling = match clone_from {
            Some(source) => self.get_config(source)?.scheduling,
            None => SchedulingParams::default(),
        };

        let tx = self.storage.connection_mut().transaction()?;
        let conf_id = insert_new_config(&tx, &self.operation_log, name, false, scheduling)?;
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        info!("created deck config {conf_id} '{name}'");
        Ok(conf_id)
    }

    /// Writes the name, kind flag, and scheduling parameters of `conf` back to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::ConfigNotFound`] if `conf.id` does not exist.
    pub fn update_config(&mut self, conf: &DeckConfig) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let changed = self.connection().execute(
            "UPDATE deck_configs SET name = ?1, is_filtered = ?2, mtime = ?3, config_json = ?4
             WHERE id = ?5",
            rusqlite::params![
                conf.name,
                conf.filtered,
                now,
                serde_json::to_string(&conf.scheduling)?,
                conf.id,
            ],
        )?;
        if changed == 0 {
            return Err(DeckcatError::ConfigNotFound(conf.id));
        }
        Ok(())
    }

    /// Points `deck_id` at `conf_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::DeckNotFound`] or [`DeckcatError::ConfigNotFound`]
    /// if either side does not exist.
    pub fn set_conf(&mut self, deck_id: DeckId, conf_id: ConfigId) -> Result<()> {
        self.get_config(conf_id)?;
        let now = chrono::Utc::now().timestamp();

        let tx = self.storage.connection_mut().transaction()?;
        let changed = tx.execute(
            "UPDATE decks SET conf_id = ?1, mtime = ?2 WHERE id = ?3",
            rusqlite::params![conf_id, now, deck_id],
        )?;
        if changed == 0 {
            return Err(DeckcatError::DeckNotFound(deck_id));
        }
        self.operation_log.log(
            &tx,
            &Operation::SetDeckConfig {
                operation_id: Uuid::new_v4().to_string(),
                timestamp: now,
                deck_id,
                conf_id,
            },
        )?;
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Returns the ids of every deck referencing `conf_id`, in id order.
    pub fn decks_using_config(&self, conf_id: ConfigId) -> Result<Vec<DeckId>> {
        decks_using_config(self.connection(), conf_id)
    }

    /// Deletes the config `conf_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DeckcatError::DefaultConfig`] for the default config,
    /// [`DeckcatError::ConfigInUse`] while any deck references it, and
    /// [`DeckcatError::ConfigNotFound`] if it does not exist.
    pub fn remove_config(&mut self, conf_id: ConfigId) -> Result<()> {
        if conf_id == DEFAULT_CONFIG_ID {
            return Err(DeckcatError::DefaultConfig);
        }
        if !self.decks_using_config(conf_id)?.is_empty() {
            return Err(DeckcatError::ConfigInUse(conf_id));
        }

        let tx = self.storage.connection_mut().transaction()?;
        if !delete_config(&tx, &self.operation_log, conf_id)? {
            return Err(DeckcatError::ConfigNotFound(conf_id));
        }
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        info!("removed deck config {conf_id}");
        Ok(())
    }

    /// Adds an item referencing `deck_id` and returns its id.
    ///
    /// The deck is not required to exist.
    pub fn add_item(&mut self, deck_id: DeckId) -> Result<ItemId> {
        items::add_item(self.connection(), deck_id, chrono::Utc::now().timestamp())
    }

    /// Returns the deck `item_id` references, or `None` for an unknown item.
    pub fn item_deck(&self, item_id: ItemId) -> Result<Option<DeckId>> {
        items::item_deck(self.connection(), item_id)
    }

    /// Counts items referencing any of `deck_ids`.
    pub fn count_items_in(&self, deck_ids: &[DeckId]) -> Result<usize> {
        items::count_items_in(self.connection(), deck_ids)
    }

    /// Counts all items in the catalog.
    pub fn item_count(&self) -> Result<usize> {
        items::item_count(self.connection())
    }

    /// Returns up to `limit` most recent change-history entries, newest first.
    pub fn list_operations(&self, limit: usize) -> Result<Vec<OperationSummary>> {
        self.operation_log.list(self.connection(), limit)
    }
}

/// Inserts the default config and default deck when either is absent.
pub(crate) fn ensure_defaults(conn: &Connection) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    if find_config(conn, DEFAULT_CONFIG_ID)?.is_none() {
        conn.execute(
            "INSERT INTO deck_configs (id, name, is_filtered, mtime, config_json) VALUES (?1, ?2, 0, ?3, ?4)",
            rusqlite::params![
                DEFAULT_CONFIG_ID,
                DEFAULT_CONFIG_NAME,
                now,
                serde_json::to_string(&SchedulingParams::default())?,
            ],
        )?;
        info!("inserted default deck config");
    }
    if find_deck(conn, DEFAULT_DECK_ID)?.is_none() {
        insert_deck(
            conn,
            &Deck {
                id: DEFAULT_DECK_ID,
                name: DEFAULT_DECK_NAME.to_string(),
                conf_id: DEFAULT_CONFIG_ID,
                description: String::new(),
                collapsed: false,
                mtime: now,
                kind: DeckKind::default(),
            },
        )?;
        info!("inserted default deck");
    }
    Ok(())
}

/// Returns a fresh id for `table`: the current time in milliseconds, or one
/// past the largest existing id if that is larger.
pub(crate) fn next_id(conn: &Connection, table: &str) -> Result<i64> {
    let max: Option<i64> = conn.query_row(&format!("SELECT MAX(id) FROM {table}"), [], |row| row.get(0))?;
    let now_ms = chrono::Utc::now().timestamp_millis();
    Ok(max.map_or(now_ms, |max| now_ms.max(max + 1)))
}

/// Looks up a deck id by its case-insensitive key. The lowest id wins when a
/// legacy catalog holds duplicates.
pub(crate) fn find_id_by_key(conn: &Connection, key: &str) -> Result<Option<DeckId>> {
    Ok(conn
        .query_row(
            "SELECT id FROM decks WHERE name_key = ? ORDER BY id LIMIT 1",
            [key],
            |row| row.get(0),
        )
        .optional()?)
}

pub(crate) fn find_deck(conn: &Connection, deck_id: DeckId) -> Result<Option<Deck>> {
    let row = conn
        .query_row(
            &format!("SELECT {DECK_COLUMNS} FROM decks WHERE id = ?"),
            [deck_id],
            map_deck_row,
        )
        .optional()?;
    row.map(deck_from_row).transpose()
}

/// Loads every deck ordered by id.
pub(crate) fn load_decks(conn: &Connection) -> Result<Vec<Deck>> {
    let mut stmt = conn.prepare(&format!("SELECT {DECK_COLUMNS} FROM decks ORDER BY id"))?;
    let rows = stmt
        .query_map([], map_deck_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(deck_from_row).collect()
}

pub(crate) fn find_config(conn: &Connection, conf_id: ConfigId) -> Result<Option<DeckConfig>> {
    let row = conn
        .query_row(
            &format!("SELECT {CONFIG_COLUMNS} FROM deck_configs WHERE id = ?"),
            [conf_id],
            map_config_row,
        )
        .optional()?;
    row.map(config_from_row).transpose()
}

pub(crate) fn decks_using_config(conn: &Connection, conf_id: ConfigId) -> Result<Vec<DeckId>> {
    let mut stmt = conn.prepare("SELECT id FROM decks WHERE conf_id = ? ORDER BY id")?;
    let ids = stmt
        .query_map([conf_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

pub(crate) fn insert_deck(conn: &Connection, deck: &Deck) -> Result<()> {
    conn.execute(
        "INSERT INTO decks (id, name, name_key, conf_id, is_filtered, description, collapsed, mtime, kind_json)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            deck.id,
            deck.name,
            name::name_key(&deck.name),
            deck.conf_id,
            deck.is_dyn(),
            deck.description,
            deck.collapsed,
            deck.mtime,
            serde_json::to_string(&deck.kind)?,
        ],
    )?;
    Ok(())
}

/// Creates a deck with a fresh id and logs a `CreateDeck` operation.
pub(crate) fn insert_new_deck(
    conn: &Connection,
    log: &OperationLog,
    name: &str,
    kind: DeckKind,
    conf_id: ConfigId,
) -> Result<DeckId> {
    let now = chrono::Utc::now().timestamp();
    let deck = Deck {
        id: next_id(conn, "decks")?,
        name: name.to_string(),
        conf_id,
        description: String::new(),
        collapsed: false,
        mtime: now,
        kind,
    };
    insert_deck(conn, &deck)?;
    log.log(
        conn,
        &Operation::CreateDeck {
            operation_id: Uuid::new_v4().to_string(),
            timestamp: now,
            deck_id: deck.id,
            name: deck.name.clone(),
            filtered: deck.is_dyn(),
        },
    )?;
    Ok(deck.id)
}

/// Creates every ancestor of `name` that is not in the catalog yet, root-most
/// first, as a standard deck with the default config. Returns the created ids.
pub(crate) fn ensure_parents(conn: &Connection, log: &OperationLog, name: &str) -> Result<Vec<DeckId>> {
    let mut created = Vec::new();
    for ancestor in name::ancestors(name) {
        if find_id_by_key(conn, &ancestor.to_lowercase())?.is_none() {
            let id = insert_new_deck(conn, log, &ancestor, DeckKind::default(), DEFAULT_CONFIG_ID)?;
            debug!("created missing ancestor {id} '{ancestor}' for '{name}'");
            created.push(id);
        }
    }
    Ok(created)
}

/// Creates a config with a fresh id and logs a `CreateConfig` operation.
pub(crate) fn insert_new_config(
    conn: &Connection,
    log: &OperationLog,
    name: &str,
    filtered: bool,
    scheduling: SchedulingParams,
) -> Result<ConfigId> {
    let now = chrono::Utc::now().timestamp();
    let conf_id = next_id(conn, "deck_configs")?;
    conn.execute(
        "INSERT INTO deck_configs (id, name, is_filtered, mtime, config_json) VALUES (?, ?, ?, ?, ?)",
        rusqlite::params![conf_id, name, filtered, now, serde_json::to_string(&scheduling)?],
    )?;
    log.log(
        conn,
        &Operation::CreateConfig {
            operation_id: Uuid::new_v4().to_string(),
            timestamp: now,
            conf_id,
            name: name.to_string(),
        },
    )?;
    Ok(conf_id)
}

/// Deletes a config row and logs it. Returns `false` if the row did not exist.
pub(crate) fn delete_config(conn: &Connection, log: &OperationLog, conf_id: ConfigId) -> Result<bool> {
    let changed = conn.execute("DELETE FROM deck_configs WHERE id = ?", [conf_id])?;
    if changed == 0 {
        return Ok(false);
    }
    log.log(
        conn,
        &Operation::RemoveConfig {
            operation_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            conf_id,
        },
    )?;
    Ok(true)
}

/// Raw 7-column tuple extracted from a `decks` row.
type DeckRow = (i64, String, i64, String, i64, i64, String);

fn map_deck_row(row: &rusqlite::Row) -> rusqlite::Result<DeckRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn deck_from_row((id, name, conf_id, description, collapsed, mtime, kind_json): DeckRow) -> Result<Deck> {
    Ok(Deck {
        id,
        name,
        conf_id,
        description,
        collapsed: collapsed != 0,
        mtime,
        kind: serde_json::from_str(&kind_json)?,
    })
}

/// Raw 5-column tuple extracted from a `deck_configs` row.
type ConfigRow = (i64, String, i64, i64, String);

fn map_config_row(row: &rusqlite::Row) -> rusqlite::Result<ConfigRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn config_from_row((id, name, is_filtered, mtime, config_json): ConfigRow) -> Result<DeckConfig> {
    Ok(DeckConfig {
        id,
        name,
        filtered: is_filtered != 0,
        mtime,
        scheduling: serde_json::from_str(&config_json)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn new_catalog() -> (Catalog, NamedTempFile) {
        let temp = NamedTempFile::new().unwrap();
        let catalog = Catalog::create(temp.path()).unwrap();
        (catalog, temp)
    }

    #[test]
    fn test_create_catalog_has_only_default_deck() {
        let (catalog, _temp) = new_catalog();

        assert_eq!(catalog.all_sorted_names().unwrap().len(), 1);
        assert_eq!(catalog.name(DEFAULT_DECK_ID).unwrap(), DEFAULT_DECK_NAME);
        assert_eq!(catalog.all_configs().unwrap().len(), 1);
        assert_eq!(catalog.get_config(DEFAULT_CONFIG_ID).unwrap().name, "Default");
    }

    #[test]
    fn test_get_or_create_returns_same_id() {
        let (mut catalog, _temp) = new_catalog();

        let parent_id = catalog.get_or_create_by_name("new deck").unwrap();
        assert_ne!(parent_id, 0);
        assert_ne!(parent_id, DEFAULT_DECK_ID);
        assert_eq!(catalog.all_sorted_names().unwrap().len(), 2);
        assert_eq!(catalog.get_or_create_by_name("new deck").unwrap(), parent_id);
        assert_eq!(catalog.get_or_create_by_name("  NEW Deck ").unwrap(), parent_id);
        assert_eq!(catalog.count().unwrap(), 2);
    }

    #[test]
    fn test_get_or_create_adds_missing_ancestors() {
        let (mut catalog, _temp) = new_catalog();
        catalog.get_or_create_by_name("a").unwrap();
        let before = catalog.count().unwrap();

        let leaf = catalog.get_or_create_by_name("a::b::c::d").unwrap();

        // "a" existed; "a::b" and "a::b::c" are new, plus the leaf itself.
        assert_eq!(catalog.count().unwrap(), before + 3);
        assert_eq!(catalog.name(leaf).unwrap(), "a::b::c::d");
        assert!(catalog.id_for_name("a::b").unwrap().is_some());
        assert!(catalog.id_for_name("a::b::c").unwrap().is_some());
    }

    #[test]
    fn test_ancestor_match_ignores_case() {
        let (mut catalog, _temp) = new_catalog();
        let one = catalog.get_or_create_by_name("ONE").unwrap();
        catalog.get_or_create_by_name("one::two").unwrap();

        let names = catalog.all_sorted_names().unwrap();
        assert!(names.contains(&"ONE".to_string()));
        assert!(names.contains(&"one::two".to_string()));
        assert!(!names.contains(&"one".to_string()));
        assert_eq!(catalog.id_for_name("one").unwrap(), Some(one));
    }

    #[test]
    fn test_id_for_name_never_creates() {
        let (mut catalog, _temp) = new_catalog();
        let parent_id = catalog.get_or_create_by_name("new deck").unwrap();

        assert_eq!(catalog.id_for_name("new deck").unwrap(), Some(parent_id));
        assert_eq!(catalog.id_for_name("  New Deck  ").unwrap(), Some(parent_id));
        assert_eq!(catalog.id_for_name("Not existing deck").unwrap(), None);
        assert_eq!(catalog.id_for_name("new deck::not either").unwrap(), None);
        assert_eq!(catalog.count().unwrap(), 2);
    }

    #[test]
    fn test_all_names_and_ids_sorted_by_name() {
        let (mut catalog, _temp) = new_catalog();
        let zeta = catalog.get_or_create_by_name("zeta").unwrap();
        let alpha_child = catalog.get_or_create_by_name("alpha::child").unwrap();
        let alpha = catalog.id_for_name("alpha").unwrap().unwrap();

        assert_eq!(
            catalog.all_names_and_ids().unwrap(),
            vec![
                ("Default".to_string(), DEFAULT_DECK_ID),
                ("alpha".to_string(), alpha),
                ("alpha::child".to_string(), alpha_child),
                ("zeta".to_string(), zeta),
            ]
        );
    }

    #[test]
    fn test_create_on_existing_catalog_keeps_selection() {
        let temp = NamedTempFile::new().unwrap();
        let id = {
            let mut catalog = Catalog::create(temp.path()).unwrap();
            let id = catalog.get_or_create_by_name("picked").unwrap();
            catalog.select(id).unwrap();
            id
        };

        let catalog = Catalog::create(temp.path()).unwrap();
        assert_eq!(catalog.selected().unwrap(), id);
        assert_eq!(catalog.name(id).unwrap(), "picked");
    }

    #[test]
    fn test_ids_increase_in_creation_order() {
        let (mut catalog, _temp) = new_catalog();
        let first = catalog.get_or_create_by_name("first").unwrap();
        let second = catalog.get_or_create_by_name("second").unwrap();
        let third = catalog.get_or_create_by_name("third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_legacy_malformed_names_are_tolerated() {
        let (mut catalog, _temp) = new_catalog();

        let foobar = catalog.get_or_create_by_name("::foobar").unwrap();
        let trailing = catalog.get_or_create_by_name("A::").unwrap();

        assert_eq!(catalog.name(foobar).unwrap(), "::foobar");
        assert_eq!(catalog.name(trailing).unwrap(), "A::");
        assert!(catalog.id_for_name("A").unwrap().is_some());
        assert!(catalog.id_for_name("").unwrap().is_some());
        assert_eq!(catalog.get_or_create_by_name("::foobar").unwrap(), foobar);
    }

    #[test]
    fn test_name_of_unknown_deck_is_sentinel() {
        let (catalog, _temp) = new_catalog();
        assert_eq!(catalog.name(123_456).unwrap(), NO_DECK_LABEL);
        assert!(matches!(catalog.get(123_456), Err(DeckcatError::DeckNotFound(123_456))));
    }

    #[test]
    fn test_all_is_ordered_by_id() {
        let (mut catalog, _temp) = new_catalog();
        catalog.get_or_create_by_name("zeta").unwrap();
        catalog.get_or_create_by_name("alpha").unwrap();

        let ids: Vec<DeckId> = catalog.all().unwrap().iter().map(|d| d.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(
            catalog.all_sorted_names().unwrap(),
            vec!["Default".to_string(), "alpha".to_string(), "zeta".to_string()]
        );
    }

    #[test]
    fn test_save_persists_across_open() {
        let temp = NamedTempFile::new().unwrap();
        let id = {
            let mut catalog = Catalog::create(temp.path()).unwrap();
            let id = catalog.get_or_create_by_name("cmxieunwoogyxsctnjmv::INSBGDS").unwrap();
            let mut deck = catalog.get(id).unwrap();
            deck.name = "CMXIEUNWOOGYXSCTNJMV::INSBGDS".to_string();
            deck.description = "changed case".to_string();
            catalog.save(&deck).unwrap();
            id
        };

        let catalog = Catalog::open(temp.path()).unwrap();
        let deck = catalog.get(id).unwrap();
        assert_eq!(deck.name, "CMXIEUNWOOGYXSCTNJMV::INSBGDS");
        assert_eq!(deck.description, "changed case");
        assert_eq!(catalog.id_for_name("cmxieunwoogyxsctnjmv::insbgds").unwrap(), Some(id));
    }

    #[test]
    fn test_save_unknown_deck_fails() {
        let (mut catalog, _temp) = new_catalog();
        let mut deck = catalog.get(DEFAULT_DECK_ID).unwrap();
        deck.id = 999;
        assert!(matches!(catalog.save(&deck), Err(DeckcatError::DeckNotFound(999))));
    }

    #[test]
    fn test_collapse_toggles() {
        let (mut catalog, _temp) = new_catalog();
        let id = catalog.get_or_create_by_name("deck").unwrap();
        assert!(!catalog.get(id).unwrap().collapsed);

        catalog.collapse(id).unwrap();
        assert!(catalog.get(id).unwrap().collapsed);
        catalog.collapse(id).unwrap();
        assert!(!catalog.get(id).unwrap().collapsed);

        assert!(catalog.collapse(777).is_err());
    }

    #[test]
    fn test_open_recreates_missing_defaults() {
        let temp = NamedTempFile::new().unwrap();
        {
            let catalog = Catalog::create(temp.path()).unwrap();
            catalog.connection().execute("DELETE FROM decks WHERE id = 1", []).unwrap();
            catalog.connection().execute("DELETE FROM deck_configs WHERE id = 1", []).unwrap();
        }

        let catalog = Catalog::open(temp.path()).unwrap();
        assert_eq!(catalog.name(DEFAULT_DECK_ID).unwrap(), DEFAULT_DECK_NAME);
        assert_eq!(catalog.get_config(DEFAULT_CONFIG_ID).unwrap().id, DEFAULT_CONFIG_ID);
    }

    #[test]
    fn test_std_and_filtered_flags() {
        let (mut catalog, _temp) = new_catalog();
        let filtered_id = catalog.new_filtered("filtered", FilteredDeck::default()).unwrap();
        let deck_id = catalog.get_or_create_by_name("deck").unwrap();

        let filtered = catalog.get(filtered_id).unwrap();
        let deck = catalog.get(deck_id).unwrap();
        assert!(deck.is_std() && !deck.is_dyn());
        assert!(filtered.is_dyn() && !filtered.is_std());

        let filtered_conf = catalog.conf_for_did(filtered_id).unwrap();
        let deck_conf = catalog.conf_for_did(deck_id).unwrap();
        assert!(deck_conf.is_std() && !deck_conf.is_dyn());
        assert!(filtered_conf.is_dyn() && !filtered_conf.is_std());
    }

    #[test]
    fn test_new_filtered_rejects_existing_name() {
        let (mut catalog, _temp) = new_catalog();
        catalog.get_or_create_by_name("Busy").unwrap();

        let result = catalog.new_filtered("busy", FilteredDeck::default());
        assert!(matches!(result, Err(DeckcatError::DuplicateName(_))));
        assert!(matches!(
            catalog.new_filtered("  ", FilteredDeck::default()),
            Err(DeckcatError::InvalidName(_))
        ));
    }

    #[test]
    fn test_new_filtered_creates_standard_ancestors() {
        let (mut catalog, _temp) = new_catalog();
        let id = catalog.new_filtered("Review::Hard ones", FilteredDeck::default()).unwrap();

        let parent = catalog.by_name("review").unwrap().unwrap();
        assert!(parent.is_std());
        assert!(catalog.get(id).unwrap().is_dyn());
    }

    #[test]
    fn test_conf_for_did_falls_back_to_default() {
        let (mut catalog, _temp) = new_catalog();

        let mut deck = catalog.all().unwrap()[0].clone();
        deck.conf_id = 12;
        catalog.save(&deck).unwrap();

        let conf = catalog.conf_for_did(deck.id).unwrap();
        assert_eq!(conf.id, DEFAULT_CONFIG_ID);
        assert_eq!(catalog.conf_for_did(424_242).unwrap().id, DEFAULT_CONFIG_ID);
    }

    #[test]
    fn test_config_sharing_and_removal_rules() {
        let (mut catalog, _temp) = new_catalog();
        let a = catalog.get_or_create_by_name("a").unwrap();
        let b = catalog.get_or_create_by_name("b").unwrap();

        let shared = catalog.add_config("Shared", Some(DEFAULT_CONFIG_ID)).unwrap();
        catalog.set_conf(a, shared).unwrap();
        catalog.set_conf(b, shared).unwrap();
        assert_eq!(catalog.decks_using_config(shared).unwrap(), vec![a, b]);
        assert_eq!(catalog.conf_for_did(a).unwrap().id, shared);

        assert!(matches!(catalog.remove_config(shared), Err(DeckcatError::ConfigInUse(_))));
        assert!(matches!(catalog.remove_config(DEFAULT_CONFIG_ID), Err(DeckcatError::DefaultConfig)));

        catalog.set_conf(a, DEFAULT_CONFIG_ID).unwrap();
        catalog.set_conf(b, DEFAULT_CONFIG_ID).unwrap();
        catalog.remove_config(shared).unwrap();
        assert!(matches!(catalog.get_config(shared), Err(DeckcatError::ConfigNotFound(_))));
        assert!(matches!(catalog.remove_config(shared), Err(DeckcatError::ConfigNotFound(_))));
    }

    #[test]
    fn test_set_conf_validates_both_ids() {
        let (mut catalog, _temp) = new_catalog();
        let deck = catalog.get_or_create_by_name("deck").unwrap();

        assert!(matches!(catalog.set_conf(deck, 55), Err(DeckcatError::ConfigNotFound(55))));
        assert!(matches!(
            catalog.set_conf(66, DEFAULT_CONFIG_ID),
            Err(DeckcatError::DeckNotFound(66))
        ));
    }

    #[test]
    fn test_update_config_round_trip() {
        let (mut catalog, _temp) = new_catalog();
        let mut conf = catalog.get_config(DEFAULT_CONFIG_ID).unwrap();
        conf.scheduling.new_per_day = 7;
        conf.name = "Slow".to_string();
        catalog.update_config(&conf).unwrap();

        let stored = catalog.get_config(DEFAULT_CONFIG_ID).unwrap();
        assert_eq!(stored.name, "Slow");
        assert_eq!(stored.scheduling.new_per_day, 7);
    }

    #[test]
    fn test_mutations_are_logged() {
        let (mut catalog, _temp) = new_catalog();
        catalog.get_or_create_by_name("x::y").unwrap();

        let ops = catalog.list_operations(10).unwrap();
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.operation_type == "CreateDeck"));
        match &ops[0].operation {
            Operation::CreateDeck { name, filtered, .. } => {
                assert_eq!(name, "x::y");
                assert!(!filtered);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }
}
