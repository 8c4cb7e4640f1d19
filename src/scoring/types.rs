//! Scoring results.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::dataset::{PickupId, RouteId};

/// Indicator name → score.
pub type Difficulty = BTreeMap<String, f64>;

/// Normalized scores for one pickup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPickup {
    pub id: PickupId,
    pub route_id: RouteId,
    pub label: String,
    /// `None` when the pickup had no path to score.
    pub difficulty: Option<Difficulty>,
}

impl ScoredPickup {
    pub fn is_scored(&self) -> bool {
        self.difficulty.is_some()
    }

    pub fn score(&self, indicator: &str) -> Option<f64> {
        self.difficulty.as_ref()?.get(indicator).copied()
    }
}

/// Output of per-pickup normalization. Aggregating routes requires one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupScores {
    /// Indicator names in the order they were requested.
    pub indicators: Vec<String>,
    /// Every pickup, in load order.
    pub pickups: Vec<ScoredPickup>,
}

impl PickupScores {
    pub fn scored(&self) -> impl Iterator<Item = &ScoredPickup> {
        self.pickups.iter().filter(|p| p.is_scored())
    }

    pub fn unscored(&self) -> impl Iterator<Item = &PickupId> {
        self.pickups
            .iter()
            .filter(|p| !p.is_scored())
            .map(|p| &p.id)
    }
}

/// Average scores for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRoute {
    pub id: RouteId,
    pub name: String,
    pub destination: String,
    /// Scored pickups averaged into `difficulty`.
    pub num_pickups: usize,
    pub difficulty: Difficulty,
}

impl ScoredRoute {
    pub fn score(&self, indicator: &str) -> Option<f64> {
        self.difficulty.get(indicator).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteScores {
    pub indicators: Vec<String>,
    /// Routes with at least one scored pickup, in load order.
    pub routes: Vec<ScoredRoute>,
    /// Routes left out because none of their pickups were scored.
    pub dropped: Vec<RouteId>,
}

/// Pickup and route scores from one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scores {
    pub pickups: PickupScores,
    pub routes: RouteScores,
}

impl Scores {
    pub fn indicators(&self) -> &[String] {
        &self.pickups.indicators
    }
}
