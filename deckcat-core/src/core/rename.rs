//! Deck renaming with cascading sub-tree renames.

use crate::core::catalog::{ensure_parents, find_deck, load_decks};
use crate::core::name;
use crate::{Catalog, Deck, DeckId, DeckcatError, Operation, Result};
use log::{debug, info};
use uuid::Uuid;

/// One row of a validated rename: a deck id and the name it will carry.
#[derive(Debug, Clone, PartialEq)]
struct RenameStep {
    deck_id: DeckId,
    old_name: String,
    new_name: String,
}

impl Catalog {
    /// Renames `deck_id` to `new_name`, renaming its descendants along with it.
    ///
    /// Each descendant keeps its trailing segments under the new prefix, and
    /// ancestors implied by `new_name` that do not exist yet are created as
    /// standard decks. Validation happens before anything is written; on error
    /// the catalog is unchanged. Renaming a deck to its current name is a no-op.
    ///
    /// Duplicate names are rejected rather than suffixed.
    ///
    /// # Errors
    ///
    /// - [`DeckcatError::DeckNotFound`] if `deck_id` does not exist.
    /// - [`DeckcatError::InvalidName`] if `new_name` is empty after normalization.
    /// - [`DeckcatError::FilteredAncestorConflict`] if a standard deck would be
    ///   nested under a filtered deck.
    /// - [`DeckcatError::DuplicateName`] if the new name, or a descendant's new
    ///   name, is already used by a deck outside the renamed sub-tree.
    /// - [`DeckcatError::Persistence`] for any SQLite failure.
    pub fn rename(&mut self, deck_id: DeckId, new_name: &str) -> Result<()> {
        let new_name = name::strip(new_name);
        if new_name.is_empty() {
            return Err(DeckcatError::InvalidName(new_name));
        }

        let conn = self.storage.connection();
        let deck = find_deck(conn, deck_id)?.ok_or(DeckcatError::DeckNotFound(deck_id))?;
        if deck.name == new_name {
            debug!("rename of deck {deck_id} to its own name '{new_name}' is a no-op");
            return Ok(());
        }

        let decks = load_decks(conn)?;
        let steps = plan_rename(&decks, &deck, &new_name)?;

        let now = chrono::Utc::now().timestamp();
        let tx = self.storage.connection_mut().transaction()?;
        for step in &steps {
            tx.execute(
                "UPDATE decks SET name = ?1, name_key = ?2, mtime = ?3 WHERE id = ?4",
                rusqlite::params![step.new_name, name::name_key(&step.new_name), now, step.deck_id],
            )?;
            self.operation_log.log(
                &tx,
                &Operation::RenameDeck {
                    operation_id: Uuid::new_v4().to_string(),
                    timestamp: now,
                    deck_id: step.deck_id,
                    old_name: step.old_name.clone(),
                    new_name: step.new_name.clone(),
                },
            )?;
        }
        ensure_parents(&tx, &self.operation_log, &new_name)?;
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        info!(
            "renamed deck {deck_id} '{}' to '{new_name}' ({} descendant(s))",
            deck.name,
            steps.len() - 1
        );
        Ok(())
    }
}

/// Validates renaming `deck` to `new_name` against the current `decks` and
/// returns the per-deck renames to apply, `deck` first.
fn plan_rename(decks: &[Deck], deck: &Deck, new_name: &str) -> Result<Vec<RenameStep>> {
    let old_key = deck.key();
    let new_key = new_name.to_lowercase();
    let (subtree, outside): (Vec<&Deck>, Vec<&Deck>) = decks
        .iter()
        .partition(|d| d.id == deck.id || name::is_descendant_key(&d.key(), &old_key));

    if subtree.iter().any(|d| d.is_std()) {
        for ancestor in name::ancestors(&new_key) {
            if outside.iter().any(|d| d.is_dyn() && d.key() == ancestor) {
                return Err(DeckcatError::FilteredAncestorConflict(new_name.to_string()));
            }
        }
    }

    // The target itself may collide with one of the deck's own descendants.
    if decks.iter().any(|d| d.id != deck.id && d.key() == new_key) {
        return Err(DeckcatError::DuplicateName(new_name.to_string()));
    }

    // Stored names may carry legacy whitespace; rebuild from the normalized form.
    let old_prefix = name::strip(&deck.name);
    let mut steps = Vec::with_capacity(subtree.len());
    for member in subtree {
        let Some(renamed) = name::reparent(&name::strip(&member.name), &old_prefix, new_name) else {
            return Err(DeckcatError::InvalidCatalog(format!(
                "deck '{}' is not below '{}'",
                member.name, deck.name
            )));
        };
        let renamed_key = renamed.to_lowercase();
        if outside.iter().any(|d| d.key() == renamed_key) {
            return Err(DeckcatError::DuplicateName(renamed));
        }
        steps.push(RenameStep {
            deck_id: member.id,
            old_name: member.name.clone(),
            new_name: renamed,
        });
    }
    steps.sort_by_key(|step| step.deck_id != deck.id);
    Ok(steps)
}
