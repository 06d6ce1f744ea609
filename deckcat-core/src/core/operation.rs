//! Change-history entries for structural catalog mutations.

use crate::{ConfigId, DeckId};
use serde::{Deserialize, Serialize};

/// A single catalog mutation recorded in the change history.
///
/// Every variant carries a stable `operation_id` and a wall-clock `timestamp`
/// (Unix seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    /// A deck was created, either explicitly or as a missing ancestor.
    CreateDeck {
        operation_id: String,
        timestamp: i64,
        deck_id: DeckId,
        name: String,
        filtered: bool,
    },
    /// A deck was renamed. Cascaded descendant renames are logged individually.
    RenameDeck {
        operation_id: String,
        timestamp: i64,
        deck_id: DeckId,
        old_name: String,
        new_name: String,
    },
    /// A deck was removed. `reassigned_items` counts items moved to the default deck.
    RemoveDeck {
        operation_id: String,
        timestamp: i64,
        deck_id: DeckId,
        name: String,
        reassigned_items: usize,
    },
    /// A deck was pointed at a different config.
    SetDeckConfig {
        operation_id: String,
        timestamp: i64,
        deck_id: DeckId,
        conf_id: ConfigId,
    },
    /// A deck config was created.
    CreateConfig {
        operation_id: String,
        timestamp: i64,
        conf_id: ConfigId,
        name: String,
    },
    /// A deck config was deleted.
    RemoveConfig {
        operation_id: String,
        timestamp: i64,
        conf_id: ConfigId,
    },
}

impl Operation {
    /// Returns the stable identifier for this operation.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        match self {
            Self::CreateDeck { operation_id, .. }
            | Self::RenameDeck { operation_id, .. }
            | Self::RemoveDeck { operation_id, .. }
            | Self::SetDeckConfig { operation_id, .. }
            | Self::CreateConfig { operation_id, .. }
            | Self::RemoveConfig { operation_id, .. } => operation_id,
        }
    }

    /// Returns the wall-clock Unix timestamp (seconds) when this operation was created.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::CreateDeck { timestamp, .. }
            | Self::RenameDeck { timestamp, .. }
            | Self::RemoveDeck { timestamp, .. }
            | Self::SetDeckConfig { timestamp, .. }
            | Self::CreateConfig { timestamp, .. }
            | Self::RemoveConfig { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the variant name stored in the `operation_type` column.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateDeck { .. } => "CreateDeck",
            Self::RenameDeck { .. } => "RenameDeck",
            Self::RemoveDeck { .. } => "RemoveDeck",
            Self::SetDeckConfig { .. } => "SetDeckConfig",
            Self::CreateConfig { .. } => "CreateConfig",
            Self::RemoveConfig { .. } => "RemoveConfig",
        }
    }
}
