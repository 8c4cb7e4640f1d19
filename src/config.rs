//! Runtime configuration: routing service settings from the environment and
//! the destination lookup table.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::geography::Coordinate;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/ors";
pub const DEFAULT_PROFILE: &str = "cycling-regular";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const LOCUST_ST: Coordinate = Coordinate::new(-72.65808105468751, 42.33334765235137);
pub const VALLEY_RECYCLING: Coordinate = Coordinate::new(-72.65505552291872, 42.30060518470567);

/// Routing service settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub profile: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Reads `ORS_BASE_URL`, `ORS_PROFILE`, `ORS_API_KEY` and
    /// `ORS_TIMEOUT_SECS`, falling back to the defaults for unset values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let timeout = match lookup("ORS_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("ORS_TIMEOUT_SECS must be whole seconds, got '{raw}'"))?,
            ),
            None => defaults.timeout,
        };
        Ok(Self {
            base_url: lookup("ORS_BASE_URL").unwrap_or(defaults.base_url),
            profile: lookup("ORS_PROFILE").unwrap_or(defaults.profile),
            api_key: lookup("ORS_API_KEY").filter(|k| !k.is_empty()),
            timeout,
        })
    }
}

/// Maps a route's destination classification to the coordinate its pickups
/// are routed to. Classifications are matched exactly.
///
/// Stored on disk as a JSON object of `[lon, lat]` pairs:
/// ```json
/// {
///   "Locust": [-72.65808105468751, 42.33334765235137],
///   "Valley": [-72.65505552291872, 42.30060518470567]
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Destinations {
    entries: BTreeMap<String, Coordinate>,
}

impl Default for Destinations {
    fn default() -> Self {
        Self::from_entries([("Locust", LOCUST_ST), ("Valley", VALLEY_RECYCLING)])
    }
}

impl Destinations {
    pub fn from_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, Coordinate)>) -> Self {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Loads the table from a JSON file at `path`, replacing the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read destinations file '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid destinations file '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: BTreeMap<String, Coordinate> = serde_json::from_str(content)?;
        Ok(Self { entries })
    }

    /// Returns the destination for `classification`, if one is configured.
    pub fn get(&self, classification: &str) -> Option<Coordinate> {
        self.entries.get(classification).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinate)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
