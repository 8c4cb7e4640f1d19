use std::fmt;
use std::sync::Arc;

use crate::geography::Path;

type Extract = dyn Fn(&Path) -> f64 + Send + Sync;

/// A named raw measurement over a pickup's path.
#[derive(Clone)]
pub struct Indicator {
    name: String,
    extract: Arc<Extract>,
}

impl Indicator {
    pub fn new(name: impl Into<String>, extract: impl Fn(&Path) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            extract: Arc::new(extract),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self, path: &Path) -> f64 {
        (self.extract)(path)
    }
}

impl fmt::Debug for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indicator").field("name", &self.name).finish()
    }
}

/// Indicators available to the scorer, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct IndicatorRegistry {
    indicators: Vec<Indicator>,
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ascent`, `descent` and `distance`.
    ///
    /// Descent is negated: dropping downhill on the way to the destination
    /// makes a pickup easier, not harder.
    pub fn standard() -> Self {
        Self::new()
            .with(Indicator::new("ascent", |p| p.ascent))
            .with(Indicator::new("descent", |p| -p.descent))
            .with(Indicator::new("distance", |p| p.distance))
    }

    /// Adds `indicator`, replacing any existing one with the same name.
    pub fn with(mut self, indicator: Indicator) -> Self {
        self.register(indicator);
        self
    }

    pub fn register(&mut self, indicator: Indicator) {
        match self.indicators.iter_mut().find(|i| i.name == indicator.name) {
            Some(existing) => *existing = indicator,
            None => self.indicators.push(indicator),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indicators.iter().map(|i| i.name())
    }
}
