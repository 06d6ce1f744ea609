//! Internal domain modules for the deck catalog library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod catalog;
pub mod deck;
pub mod deck_config;
pub mod error;
pub mod integrity;
pub mod items;
pub mod meta;
pub mod name;
pub mod operation;
pub mod operation_log;
pub mod remove;
pub mod rename;
pub mod storage;
pub mod traversal;

#[doc(inline)]
pub use catalog::Catalog;
#[doc(inline)]
pub use deck::{
    Deck, DeckId, DeckKind, FilterOrder, FilterTerm, FilteredDeck, StandardDeck, DEFAULT_DECK_ID,
    DEFAULT_DECK_NAME, NO_DECK_LABEL,
};
#[doc(inline)]
pub use deck_config::{ConfigId, DeckConfig, SchedulingParams, DEFAULT_CONFIG_ID};
#[doc(inline)]
pub use error::{DeckcatError, Result};
#[doc(inline)]
pub use integrity::{IntegrityIssue, IntegrityReport};
#[doc(inline)]
pub use items::ItemId;
#[doc(inline)]
pub use operation::Operation;
#[doc(inline)]
pub use operation_log::{OperationLog, OperationSummary, PurgeStrategy};
#[doc(inline)]
pub use remove::RemoveResult;
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use traversal::ChildMap;
