//! Cascading deck removal.
//!
//! Removing a deck removes its whole sub-tree. Items that referenced any
//! removed deck are moved to the default deck, and configs left without a
//! referencing deck are cleaned up afterwards. The default deck itself is
//! never removed; removing it clears its descendants only.
//!
//! [`RemoveResult`] serializes in camelCase for embedders that pass it across
//! an IPC boundary:
//!
//! ```rust
//! use deckcat_core::RemoveResult;
//!
//! let result = RemoveResult {
//!     removed_ids: vec![1_700_000_000_000],
//!     reassigned_items: 2,
//!     removed_configs: vec![],
//! };
//! let json = serde_json::to_string(&result).unwrap();
//! assert!(json.contains("removedIds"));
//! assert!(json.contains("reassignedItems"));
//! ```

use crate::core::catalog::{decks_using_config, delete_config, find_deck, load_decks};
use crate::core::{items, name};
use crate::{Catalog, ConfigId, DeckId, Operation, Result, DEFAULT_CONFIG_ID, DEFAULT_DECK_ID};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// The outcome of [`Catalog::remove`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResult {
    /// Ids of every deck that was removed, in id order.
    pub removed_ids: Vec<DeckId>,

    /// Number of items moved to the default deck.
    pub reassigned_items: usize,

    /// Configs deleted because no remaining deck referenced them.
    pub removed_configs: Vec<ConfigId>,
}

impl Catalog {
    /// Removes `deck_id` and all of its descendants.
    ///
    /// Removing an unknown id is a no-op that returns an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DeckcatError::Persistence`] if the removal cannot be
    /// written; the catalog is then unchanged. Failures while cleaning up
    /// orphaned configs are logged and do not fail the call.
    pub fn remove(&mut self, deck_id: DeckId) -> Result<RemoveResult> {
        let conn = self.storage.connection();
        let Some(root) = find_deck(conn, deck_id)? else {
            debug!("remove of unknown deck {deck_id} ignored");
            return Ok(RemoveResult::default());
        };

        let root_key = root.key();
        let doomed: Vec<_> = load_decks(conn)?
            .into_iter()
            .filter(|d| d.id == root.id || name::is_descendant_key(&d.key(), &root_key))
            .filter(|d| d.id != DEFAULT_DECK_ID)
            .collect();
        if doomed.is_empty() {
            return Ok(RemoveResult::default());
        }

        let now = chrono::Utc::now().timestamp();
        let tx = self.storage.connection_mut().transaction()?;
        let mut reassigned_items = 0;
        for deck in &doomed {
            let moved = items::reassign_deck_references(&tx, &[deck.id], DEFAULT_DECK_ID)?;
            reassigned_items += moved;
            tx.execute("DELETE FROM decks WHERE id = ?", [deck.id])?;
            self.operation_log.log(
                &tx,
                &Operation::RemoveDeck {
                    operation_id: Uuid::new_v4().to_string(),
                    timestamp: now,
                    deck_id: deck.id,
                    name: deck.name.clone(),
                    reassigned_items: moved,
                },
            )?;
        }
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        let candidates: BTreeSet<ConfigId> = doomed
            .iter()
            .map(|d| d.conf_id)
            .filter(|conf_id| *conf_id != DEFAULT_CONFIG_ID)
            .collect();
        let mut removed_configs = Vec::new();
        for conf_id in candidates {
            match self.drop_orphaned_config(conf_id) {
                Ok(true) => removed_configs.push(conf_id),
                Ok(false) => {}
                Err(e) => warn!("could not clean up config {conf_id} after deck removal: {e}"),
            }
        }

        info!(
            "removed deck {deck_id} '{}' with {} deck(s) total, {reassigned_items} item(s) reassigned",
            root.name,
            doomed.len()
        );
        Ok(RemoveResult {
            removed_ids: doomed.iter().map(|d| d.id).collect(),
            reassigned_items,
            removed_configs,
        })
    }

    /// Deletes `conf_id` if no deck references it. Returns whether it was deleted.
    fn drop_orphaned_config(&mut self, conf_id: ConfigId) -> Result<bool> {
        if !decks_using_config(self.connection(), conf_id)?.is_empty() {
            return Ok(false);
        }
        let tx = self.storage.connection_mut().transaction()?;
        let removed = delete_config(&tx, &self.operation_log, conf_id)?;
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;
        Ok(removed)
    }
}
