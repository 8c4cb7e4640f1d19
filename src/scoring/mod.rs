//! Difficulty scoring.
//!
//! Each indicator turns a pickup's path into a raw number. Raw values are
//! min-max normalized across all routed pickups into `[0, 1]`, then averaged
//! per route.

pub mod indicator;
pub mod scorer;
pub mod types;
pub mod utility;

pub use indicator::{Indicator, IndicatorRegistry};
pub use scorer::DifficultyScorer;
pub use types::{Difficulty, PickupScores, RouteScores, ScoredPickup, ScoredRoute, Scores};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("unknown difficulty indicator '{0}' (known: {1})")]
    UnknownIndicator(String, String),
    #[error("no difficulty indicators requested")]
    NoIndicators,
}
