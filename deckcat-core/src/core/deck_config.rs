//! Shared scheduling configuration records.
//!
//! Decks refer to a [`DeckConfig`] by id only; many decks can share one
//! record. Config id 1 is the default and always exists.

use serde::{Deserialize, Serialize};

/// Numeric deck config identifier. Id 1 is always the default config.
pub type ConfigId = i64;

/// The reserved, non-removable default config.
pub const DEFAULT_CONFIG_ID: ConfigId = 1;

/// A scheduling-parameter record referenced by one or more decks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckConfig {
    pub id: ConfigId,
    pub name: String,
    /// Mirrors the kind of the decks using this config: `true` for filtered decks.
    pub filtered: bool,
    pub mtime: i64,
    pub scheduling: SchedulingParams,
}

impl DeckConfig {
    /// Returns `true` if this config belongs to standard decks.
    #[must_use]
    pub fn is_std(&self) -> bool {
        !self.filtered
    }

    /// Returns `true` if this config belongs to a filtered deck.
    #[must_use]
    pub fn is_dyn(&self) -> bool {
        self.filtered
    }
}

/// Scheduling parameters carried by a config. The catalog stores them
/// verbatim and never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulingParams {
    pub new_per_day: u32,
    pub reviews_per_day: u32,
    /// Learning steps in minutes.
    pub learn_steps: Vec<f32>,
    /// Relearning steps in minutes.
    pub relearn_steps: Vec<f32>,
    pub graduating_interval: u32,
    pub easy_interval: u32,
    pub starting_ease: f32,
    pub maximum_interval: u32,
    pub bury_siblings: bool,
}

impl Default for SchedulingParams {
    fn default() -> Self {
        Self {
            new_per_day: 20,
            reviews_per_day: 200,
            learn_steps: vec![1.0, 10.0],
            relearn_steps: vec![10.0],
            graduating_interval: 1,
            easy_interval: 4,
            starting_ease: 2.5,
            maximum_interval: 36_500,
            bury_siblings: false,
        }
    }
}
