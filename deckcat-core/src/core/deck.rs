//! Deck records and their kind-specific fields.

use serde::{Deserialize, Serialize};

/// Numeric deck identifier. Id 1 is always the default deck.
pub type DeckId = i64;

/// The reserved, non-removable default deck.
pub const DEFAULT_DECK_ID: DeckId = 1;

/// Display name given to the default deck when it is created or recreated.
pub const DEFAULT_DECK_NAME: &str = "Default";

/// Label returned by [`Catalog::name`](crate::Catalog::name) for ids that do not resolve.
pub const NO_DECK_LABEL: &str = "[no deck]";

/// A named node of the deck hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: DeckId,
    /// Full `::`-separated path, original case preserved.
    pub name: String,
    /// Referenced [`DeckConfig`](crate::DeckConfig) id. May dangle.
    pub conf_id: crate::ConfigId,
    pub description: String,
    /// Tree-UI state: whether the deck's children are hidden.
    pub collapsed: bool,
    pub mtime: i64,
    pub kind: DeckKind,
}

impl Deck {
    /// Returns `true` for a standard deck.
    #[must_use]
    pub fn is_std(&self) -> bool {
        matches!(self.kind, DeckKind::Standard(_))
    }

    /// Returns `true` for a filtered (dynamic) deck.
    #[must_use]
    pub fn is_dyn(&self) -> bool {
        matches!(self.kind, DeckKind::Filtered(_))
    }

    /// Case-insensitive lookup key of this deck's name.
    #[must_use]
    pub fn key(&self) -> String {
        crate::name_key(&self.name)
    }
}

/// Distinguishes standard decks from filtered decks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DeckKind {
    Standard(StandardDeck),
    Filtered(FilteredDeck),
}

impl Default for DeckKind {
    fn default() -> Self {
        Self::Standard(StandardDeck::default())
    }
}

/// Per-deck overrides layered on top of the shared config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardDeck {
    #[serde(default)]
    pub new_limit: Option<u32>,
    #[serde(default)]
    pub review_limit: Option<u32>,
}

/// Search terms and ordering that define a filtered deck's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredDeck {
    pub terms: Vec<FilterTerm>,
    /// Whether reviews in this deck affect scheduling of the underlying items.
    pub reschedule: bool,
}

impl Default for FilteredDeck {
    fn default() -> Self {
        Self {
            terms: vec![FilterTerm::default()],
            reschedule: true,
        }
    }
}

/// One search clause of a filtered deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterTerm {
    pub search: String,
    pub limit: u32,
    pub order: FilterOrder,
}

impl Default for FilterTerm {
    fn default() -> Self {
        Self {
            search: String::new(),
            limit: 100,
            order: FilterOrder::Due,
        }
    }
}

/// Order in which a filtered deck gathers matching items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOrder {
    Oldest,
    Random,
    IntervalsAscending,
    IntervalsDescending,
    Lapses,
    Added,
    Due,
    ReverseAdded,
}
