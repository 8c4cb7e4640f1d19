//! Attaches a path to every pickup.
//!
//! A pickup is routed to the destination its route's classification maps to.
//! Classifications with no mapping produce [`PathOutcome::Unmapped`] instead
//! of a request.

use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Destinations;
use crate::dataset::{Dataset, Pickup, PickupId, Route};
use crate::geography::{Path, PathProvider, RoutingError};

#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    Routed(Path),
    /// The route's classification has no destination, so nothing was routed.
    Unmapped,
}

impl PathOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            PathOutcome::Routed(path) => Some(path),
            PathOutcome::Unmapped => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPickup {
    pub pickup: Pickup,
    pub outcome: PathOutcome,
}

impl ResolvedPickup {
    pub fn path(&self) -> Option<&Path> {
        self.outcome.path()
    }
}

/// Routes and pickups after resolution, in load order.
#[derive(Debug, Clone)]
pub struct ResolvedDataset {
    pub routes: Vec<Route>,
    pub pickups: Vec<ResolvedPickup>,
}

/// A pickup whose path could not be found.
#[derive(Debug)]
pub struct PickupFailure {
    pub pickup_id: PickupId,
    pub error: RoutingError,
}

impl fmt::Display for PickupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pickup '{}': {}", self.pickup_id, self.error)
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Some pickups could not be routed. Scores need every pickup, so none of
    /// the resolved paths are returned.
    #[error("{} of {total} pickups could not be routed: {}", .failures.len(), summarize(.failures))]
    Routing {
        total: usize,
        failures: Vec<PickupFailure>,
    },
    #[error("routing contract violated for pickup '{pickup_id}': {source}")]
    ContractViolation {
        pickup_id: PickupId,
        source: RoutingError,
    },
}

fn summarize(failures: &[PickupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct PathResolver<P> {
    provider: P,
    destinations: Destinations,
}

impl<P: PathProvider> PathResolver<P> {
    pub fn new(provider: P, destinations: Destinations) -> Self {
        Self {
            provider,
            destinations,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Finds the path from `pickup` to the destination of `route`.
    pub async fn resolve(&self, pickup: &Pickup, route: &Route) -> Result<PathOutcome, RoutingError> {
        let Some(destination) = self.destinations.get(&route.destination) else {
            debug!(
                pickup_id = %pickup.id,
                classification = %route.destination,
                "No destination for classification"
            );
            return Ok(PathOutcome::Unmapped);
        };
        let path = self.provider.navigate(pickup.coordinate, destination).await?;
        Ok(PathOutcome::Routed(path))
    }

    /// Resolves every pickup, one request at a time.
    ///
    /// Routing failures are collected across the whole dataset and returned
    /// together. A multi-segment answer stops resolution immediately.
    #[tracing::instrument(skip_all, fields(pickups = dataset.pickups().len()))]
    pub async fn resolve_all(&self, dataset: Dataset) -> Result<ResolvedDataset, ResolveError> {
        let total = dataset.pickups().len();
        let mut resolved = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut unmapped = 0usize;

        for pickup in dataset.pickups() {
            // Dataset guarantees every route_id resolves
            let Some(route) = dataset.route(&pickup.route_id) else {
                continue;
            };
            match self.resolve(pickup, route).await {
                Ok(outcome) => {
                    if outcome == PathOutcome::Unmapped {
                        unmapped += 1;
                    }
                    resolved.push(ResolvedPickup {
                        pickup: pickup.clone(),
                        outcome,
                    });
                }
                Err(e) if e.is_contract_violation() => {
                    error!(pickup_id = %pickup.id, error = %e, "Routing contract violated");
                    return Err(ResolveError::ContractViolation {
                        pickup_id: pickup.id.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(pickup_id = %pickup.id, error = %e, "Pickup could not be routed");
                    failures.push(PickupFailure {
                        pickup_id: pickup.id.clone(),
                        error: e,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(ResolveError::Routing { total, failures });
        }

        info!(
            routed = total - unmapped,
            unmapped, "All pickups resolved"
        );
        let (routes, _) = dataset.into_parts();
        Ok(ResolvedDataset {
            routes,
            pickups: resolved,
        })
    }
}
