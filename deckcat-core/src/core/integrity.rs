//! Catalog integrity check and repair.

use crate::core::catalog::{ensure_parents, find_config, load_decks};
use crate::core::name;
use crate::{Catalog, ConfigId, DeckId, Operation, Result, DEFAULT_CONFIG_ID};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A problem found by [`Catalog::check_integrity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IntegrityIssue {
    /// Ancestors of a deck were missing. They have been created.
    BrokenAncestorChain { deck_id: DeckId, missing: Vec<String> },
    /// A deck referenced a config that does not exist. It now uses the default config.
    DanglingConfig { deck_id: DeckId, conf_id: ConfigId },
    /// Several decks share one case-insensitive name. Left as is.
    DuplicateName { name_key: String, deck_ids: Vec<DeckId> },
}

/// Everything [`Catalog::check_integrity`] found and repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
    /// Ids of ancestor decks created to close broken chains.
    pub created_ids: Vec<DeckId>,
}

impl IntegrityReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Catalog {
    /// Scans the catalog for structural problems and repairs what can be
    /// repaired without losing data.
    ///
    /// Missing ancestors are created as standard decks and dangling config
    /// references are pointed at the default config, all in one transaction.
    /// Case-insensitive duplicate names are only reported.
    pub fn check_integrity(&mut self) -> Result<IntegrityReport> {
        let conn = self.storage.connection();
        let decks = load_decks(conn)?;

        let mut by_key: BTreeMap<String, Vec<DeckId>> = BTreeMap::new();
        for deck in &decks {
            by_key.entry(deck.key()).or_default().push(deck.id);
        }

        let mut report = IntegrityReport::default();
        let mut broken = Vec::new();
        let mut dangling = Vec::new();
        for deck in &decks {
            let normalized = name::strip(&deck.name);
            let missing: Vec<String> = name::ancestors(&normalized)
                .into_iter()
                .filter(|ancestor| !by_key.contains_key(&ancestor.to_lowercase()))
                .collect();
            if !missing.is_empty() {
                broken.push(normalized);
                report.issues.push(IntegrityIssue::BrokenAncestorChain {
                    deck_id: deck.id,
                    missing,
                });
            }
            if find_config(conn, deck.conf_id)?.is_none() {
                dangling.push(deck.id);
                report.issues.push(IntegrityIssue::DanglingConfig {
                    deck_id: deck.id,
                    conf_id: deck.conf_id,
                });
            }
        }
        for (name_key, deck_ids) in by_key {
            if deck_ids.len() > 1 {
                warn!("decks {deck_ids:?} share the name '{name_key}'");
                report.issues.push(IntegrityIssue::DuplicateName { name_key, deck_ids });
            }
        }

        if broken.is_empty() && dangling.is_empty() {
            return Ok(report);
        }

        let now = chrono::Utc::now().timestamp();
        let tx = self.storage.connection_mut().transaction()?;
        for deck_name in &broken {
            report.created_ids.extend(ensure_parents(&tx, &self.operation_log, deck_name)?);
        }
        for deck_id in &dangling {
            tx.execute(
                "UPDATE decks SET conf_id = ?1, mtime = ?2 WHERE id = ?3",
                rusqlite::params![DEFAULT_CONFIG_ID, now, deck_id],
            )?;
            self.operation_log.log(
                &tx,
                &Operation::SetDeckConfig {
                    operation_id: Uuid::new_v4().to_string(),
                    timestamp: now,
                    deck_id: *deck_id,
                    conf_id: DEFAULT_CONFIG_ID,
                },
            )?;
        }
        self.operation_log.purge_if_needed(&tx)?;
        tx.commit()?;

        info!(
            "integrity check repaired {} broken chain(s) and {} dangling config(s)",
            broken.len(),
            dangling.len()
        );
        Ok(report)
    }
}
