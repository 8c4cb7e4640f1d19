use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{Coordinate, Path, PathProvider, RoutingError};

/// Deterministic [`PathProvider`] that answers from a table keyed by the
/// start coordinate. Unknown starts fail with [`RoutingError::NoRoute`]
/// unless a fallback path is set.
#[derive(Default)]
pub struct StaticPathProvider {
    paths: HashMap<(u64, u64), Path>,
    fallback: Option<Path>,
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

fn key(c: Coordinate) -> (u64, u64) {
    (c.lon.to_bits(), c.lat.to_bits())
}

impl StaticPathProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, start: Coordinate, path: Path) -> Self {
        self.paths.insert(key(start), path);
        self
    }

    pub fn with_fallback(mut self, path: Path) -> Self {
        self.fallback = Some(path);
        self
    }

    /// Every `(start, end)` pair navigated so far, in call order.
    pub fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PathProvider for StaticPathProvider {
    async fn navigate(&self, start: Coordinate, end: Coordinate) -> Result<Path, RoutingError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((start, end));
        }
        self.paths
            .get(&key(start))
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or(RoutingError::NoRoute { start, end })
    }
}
