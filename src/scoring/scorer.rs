use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

use super::ScoreError;
use super::indicator::{Indicator, IndicatorRegistry};
use super::types::{Difficulty, PickupScores, RouteScores, ScoredPickup, ScoredRoute, Scores};
use super::utility::{mean, min_max, normalize};
use crate::dataset::RouteId;
use crate::resolver::ResolvedDataset;

/// Scores pickups and routes with the indicators of a registry.
#[derive(Debug, Clone)]
pub struct DifficultyScorer {
    registry: IndicatorRegistry,
}

impl Default for DifficultyScorer {
    fn default() -> Self {
        Self::new(IndicatorRegistry::standard())
    }
}

impl DifficultyScorer {
    pub fn new(registry: IndicatorRegistry) -> Self {
        Self { registry }
    }

    /// Resolves `names` in request order; repeated names are scored once.
    fn lookup<'a>(&'a self, names: &[&str]) -> Result<Vec<&'a Indicator>, ScoreError> {
        if names.is_empty() {
            return Err(ScoreError::NoIndicators);
        }
        let mut seen = HashSet::new();
        let mut indicators = Vec::with_capacity(names.len());
        for name in names {
            if !seen.insert(*name) {
                continue;
            }
            let indicator = self.registry.get(name).ok_or_else(|| {
                ScoreError::UnknownIndicator(
                    name.to_string(),
                    self.registry.names().collect::<Vec<_>>().join(", "),
                )
            })?;
            indicators.push(indicator);
        }
        Ok(indicators)
    }

    /// Min-max normalizes each indicator across all routed pickups.
    ///
    /// Pickups without a path are left unscored and do not affect the range.
    /// An indicator whose raw values are all equal scores 0.0 everywhere.
    pub fn score_pickups(
        &self,
        resolved: &ResolvedDataset,
        names: &[&str],
    ) -> Result<PickupScores, ScoreError> {
        let indicators = self.lookup(names)?;

        let mut difficulties: Vec<Option<Difficulty>> = resolved
            .pickups
            .iter()
            .map(|p| p.path().map(|_| Difficulty::new()))
            .collect();

        for indicator in &indicators {
            let raw: Vec<Option<f64>> = resolved
                .pickups
                .iter()
                .map(|p| p.path().map(|path| indicator.raw(path)))
                .collect();

            let Some((min, max)) = min_max(raw.iter().flatten().copied()) else {
                debug!(indicator = indicator.name(), "No routed pickups to score");
                continue;
            };
            if min == max {
                debug!(indicator = indicator.name(), value = min, "No variation, scoring 0");
            } else {
                debug!(indicator = indicator.name(), min, max, "Normalizing");
            }

            for (difficulty, value) in difficulties.iter_mut().zip(&raw) {
                if let (Some(difficulty), Some(value)) = (difficulty.as_mut(), value) {
                    difficulty.insert(indicator.name().to_string(), normalize(*value, min, max));
                }
            }
        }

        let pickups = resolved
            .pickups
            .iter()
            .zip(difficulties)
            .map(|(resolved, difficulty)| ScoredPickup {
                id: resolved.pickup.id.clone(),
                route_id: resolved.pickup.route_id.clone(),
                label: resolved.pickup.label(),
                difficulty,
            })
            .collect();

        Ok(PickupScores {
            indicators: indicators.iter().map(|i| i.name().to_string()).collect(),
            pickups,
        })
    }

    /// Averages scored pickups per route. Routes with no scored pickups are
    /// listed in [`RouteScores::dropped`] instead of [`RouteScores::routes`].
    pub fn score_routes(&self, resolved: &ResolvedDataset, pickups: &PickupScores) -> RouteScores {
        let mut series: HashMap<&RouteId, (usize, BTreeMap<&str, Vec<f64>>)> = HashMap::new();

        for pickup in &pickups.pickups {
            let Some(difficulty) = &pickup.difficulty else {
                continue;
            };
            let (count, per_indicator) = series.entry(&pickup.route_id).or_default();
            *count += 1;
            for (indicator, score) in difficulty {
                per_indicator.entry(indicator.as_str()).or_default().push(*score);
            }
        }

        let mut routes = Vec::new();
        let mut dropped = Vec::new();
        for route in &resolved.routes {
            match series.get(&route.id) {
                Some((count, per_indicator)) if *count > 0 => routes.push(ScoredRoute {
                    id: route.id.clone(),
                    name: route.name.clone(),
                    destination: route.destination.clone(),
                    num_pickups: *count,
                    difficulty: per_indicator
                        .iter()
                        .map(|(indicator, scores)| (indicator.to_string(), mean(scores)))
                        .collect(),
                }),
                _ => dropped.push(route.id.clone()),
            }
        }

        RouteScores {
            indicators: pickups.indicators.clone(),
            routes,
            dropped,
        }
    }

    /// Scores pickups, then routes.
    pub fn compute_difficulty(
        &self,
        resolved: &ResolvedDataset,
        names: &[&str],
    ) -> Result<Scores, ScoreError> {
        let pickups = self.score_pickups(resolved, names)?;
        let routes = self.score_routes(resolved, &pickups);

        info!(
            routes_reported = routes.routes.len(),
            routes_dropped = routes.dropped.len(),
            pickups_scored = pickups.scored().count(),
            pickups_unscored = pickups.unscored().count(),
            "Difficulty computed"
        );
        Ok(Scores { pickups, routes })
    }
}
