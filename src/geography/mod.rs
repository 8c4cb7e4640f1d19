//! Routing between pickups and destinations.
//!
//! [`PathProvider`] is the seam to the routing backend. [`OrsClient`] talks to
//! an openrouteservice instance over HTTP; [`StaticPathProvider`] answers from
//! a fixed table and is used wherever a live service is not wanted.

mod ors;
mod stub;

pub use ors::OrsClient;
pub use stub::StaticPathProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A WGS84 position. Serialized as `[lon, lat]`, the order routing services
/// expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

/// Metrics for a single-leg path from a pickup to its destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    /// `[lon, lat, elevation]` points along the path.
    pub geometry: Vec<[f64; 3]>,
    /// Vertical meters climbed.
    pub ascent: f64,
    /// Vertical meters dropped.
    pub descent: f64,
    /// Path length in meters.
    pub distance: f64,
}

impl Path {
    /// A path with no geometry, handy when only the metrics matter.
    pub fn from_metrics(ascent: f64, descent: f64, distance: f64) -> Self {
        Self {
            geometry: Vec::new(),
            ascent,
            descent,
            distance,
        }
    }
}

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("routing service returned status {status}: {body}")]
    Service { status: u16, body: String },
    #[error("no route found from {start} to {end}")]
    NoRoute { start: Coordinate, end: Coordinate },
    #[error("malformed routing payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("malformed routing response: {0}")]
    BadResponse(String),
    #[error("expected a single-segment route, got {0} segments")]
    MultipleSegments(usize),
}

impl RoutingError {
    /// The service answered a point-to-point request with something other
    /// than one leg. Not a per-pickup failure; the request itself is wrong.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, RoutingError::MultipleSegments(_))
    }
}

/// Finds a path between two points.
#[async_trait]
pub trait PathProvider: Send + Sync {
    async fn navigate(&self, start: Coordinate, end: Coordinate) -> Result<Path, RoutingError>;
}
