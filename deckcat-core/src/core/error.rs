//! Error types for the Deckcat core library.

use crate::{ConfigId, DeckId};
use thiserror::Error;

/// All errors that can occur within the Deckcat core library.
#[derive(Debug, Error)]
pub enum DeckcatError {
    /// The backing SQLite store failed. Nothing from the failed call was committed.
    #[error("Persistence unavailable: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// A stored JSON column could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A rename or filtered-deck creation targets a name that another deck already uses.
    #[error("Deck name already exists: {0}")]
    DuplicateName(String),

    /// A standard deck would end up nested underneath a filtered deck.
    #[error("Filtered decks cannot have standard subdecks: {0}")]
    FilteredAncestorConflict(String),

    /// The requested name is empty after normalization.
    #[error("Invalid deck name: {0:?}")]
    InvalidName(String),

    /// A deck id was requested that does not exist in the catalog.
    #[error("Deck not found: {0}")]
    DeckNotFound(DeckId),

    /// A deck config id was requested that does not exist in the catalog.
    #[error("Deck config not found: {0}")]
    ConfigNotFound(ConfigId),

    /// A deck config cannot be deleted while decks still reference it.
    #[error("Deck config {0} is still used by at least one deck")]
    ConfigInUse(ConfigId),

    /// The default deck config (id 1) can never be deleted.
    #[error("The default deck config cannot be removed")]
    DefaultConfig,

    /// The opened file is not a valid deck catalog.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// Convenience alias that pins the error type to [`DeckcatError`].
pub type Result<T> = std::result::Result<T, DeckcatError>;

impl DeckcatError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Persistence(e) => format!("Failed to save: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
            Self::DuplicateName(name) => format!("A deck named '{name}' already exists"),
            Self::FilteredAncestorConflict(name) => {
                format!("'{name}' is inside a filtered deck, which cannot hold subdecks")
            }
            Self::InvalidName(_) => "Deck name cannot be empty".to_string(),
            Self::DeckNotFound(_) => "Deck no longer exists".to_string(),
            Self::ConfigNotFound(_) => "Options group no longer exists".to_string(),
            Self::ConfigInUse(_) => "Options group is still used by a deck".to_string(),
            Self::DefaultConfig => "The default options group cannot be removed".to_string(),
            Self::InvalidCatalog(_) => "Could not open collection file".to_string(),
        }
    }
}
