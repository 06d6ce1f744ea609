//! Core library for deckcat, a hierarchical deck catalog.
//!
//! Decks are named by `::`-separated paths and stored in a SQLite file. The
//! tree is implied by the names: parents are looked up by name prefix, and
//! every mutation keeps the implied tree closed (ancestors exist, descendants
//! follow renames and removals).
//!
//! The primary entry point is [`Catalog`], which represents an open catalog
//! database. All mutations go through `Catalog` methods.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

#[doc(inline)]
pub use self::core::{
    catalog::Catalog,
    deck::{
        Deck, DeckId, DeckKind, FilterOrder, FilterTerm, FilteredDeck, StandardDeck,
        DEFAULT_DECK_ID, DEFAULT_DECK_NAME, NO_DECK_LABEL,
    },
    deck_config::{ConfigId, DeckConfig, SchedulingParams, DEFAULT_CONFIG_ID},
    error::{DeckcatError, Result},
    integrity::{IntegrityIssue, IntegrityReport},
    items::ItemId,
    meta::CURRENT_DECK,
    name::{ancestors, basename, immediate_parent, name_key, same_branch, segments, strip, SEPARATOR},
    operation::Operation,
    operation_log::{OperationLog, OperationSummary, PurgeStrategy},
    remove::RemoveResult,
    storage::Storage,
    traversal::ChildMap,
};
