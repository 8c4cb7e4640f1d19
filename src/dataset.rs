//! Route and pickup tables.
//!
//! Routes come from a comma-delimited file, pickups from a tab-delimited one.
//! Both need a header row; columns beyond the required ones are ignored.

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use tracing::{debug, info};

use crate::geography::Coordinate;

const ROUTE_COLUMNS: &[&str] = &["indexnum", "destination", "route_name"];
const PICKUP_COLUMNS: &[&str] = &["id", "route_id", "longitude", "latitude", "house_number", "street"];

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickupId(pub String);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PickupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: RouteId,
    /// Classification that selects the destination this route's pickups go to.
    pub destination: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub id: PickupId,
    pub route_id: RouteId,
    pub coordinate: Coordinate,
    pub house_number: String,
    pub street: String,
}

impl Pickup {
    /// Display name, e.g. `"12 Main St"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.house_number, self.street)
    }
}

#[derive(Deserialize)]
struct RouteRecord {
    indexnum: RouteId,
    destination: String,
    route_name: String,
}

#[derive(Deserialize)]
struct PickupRecord {
    id: PickupId,
    route_id: RouteId,
    longitude: f64,
    latitude: f64,
    house_number: String,
    street: String,
}

/// Loaded routes and pickups, in file order, with every pickup's route
/// reference checked.
#[derive(Debug, Clone)]
pub struct Dataset {
    routes: Vec<Route>,
    pickups: Vec<Pickup>,
    route_index: HashMap<RouteId, usize>,
}

impl Dataset {
    /// # Errors
    ///
    /// Fails on duplicate route or pickup ids, and on any pickup whose
    /// `route_id` names no route.
    pub fn new(routes: Vec<Route>, pickups: Vec<Pickup>) -> Result<Self> {
        let mut route_index = HashMap::with_capacity(routes.len());
        for (i, route) in routes.iter().enumerate() {
            if route_index.insert(route.id.clone(), i).is_some() {
                bail!("duplicate route id '{}'", route.id);
            }
        }

        let mut seen = HashSet::with_capacity(pickups.len());
        for pickup in &pickups {
            if !seen.insert(&pickup.id) {
                bail!("duplicate pickup id '{}'", pickup.id);
            }
            if !route_index.contains_key(&pickup.route_id) {
                bail!(
                    "pickup '{}' references unknown route '{}'",
                    pickup.id,
                    pickup.route_id
                );
            }
        }

        Ok(Self {
            routes,
            pickups,
            route_index,
        })
    }

    /// Loads the route table (CSV) and pickup table (TSV) from disk.
    #[tracing::instrument]
    pub fn load(routes_path: &str, pickups_path: &str) -> Result<Self> {
        let routes = File::open(routes_path)
            .with_context(|| format!("failed to open route table '{routes_path}'"))?;
        let pickups = File::open(pickups_path)
            .with_context(|| format!("failed to open pickup table '{pickups_path}'"))?;

        let dataset = Self::from_readers(routes, pickups)?;
        info!(
            routes = dataset.routes.len(),
            pickups = dataset.pickups.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_readers<R: Read, P: Read>(routes: R, pickups: P) -> Result<Self> {
        let routes = load_routes(routes).context("failed to load route table")?;
        let pickups = load_pickups(pickups).context("failed to load pickup table")?;
        Self::new(routes, pickups)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.route_index.get(id).map(|&i| &self.routes[i])
    }

    pub fn into_parts(self) -> (Vec<Route>, Vec<Pickup>) {
        (self.routes, self.pickups)
    }
}

/// Parses comma-delimited route records.
pub fn load_routes<R: Read>(reader: R) -> Result<Vec<Route>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    require_columns(rdr.headers()?, ROUTE_COLUMNS)?;

    let mut routes = Vec::new();
    for rec in rdr.deserialize() {
        let rec: RouteRecord = rec?;
        routes.push(Route {
            id: rec.indexnum,
            destination: rec.destination,
            name: rec.route_name,
        });
    }
    debug!(count = routes.len(), "Parsed route records");
    Ok(routes)
}

/// Parses tab-delimited pickup records.
pub fn load_pickups<R: Read>(reader: R) -> Result<Vec<Pickup>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(Trim::All)
        .from_reader(reader);
    require_columns(rdr.headers()?, PICKUP_COLUMNS)?;

    let mut pickups = Vec::new();
    for rec in rdr.deserialize() {
        let rec: PickupRecord = rec?;
        // the float parser accepts NaN and inf
        let valid = rec.longitude.is_finite()
            && rec.latitude.is_finite()
            && rec.longitude.abs() <= 180.0
            && rec.latitude.abs() <= 90.0;
        if !valid {
            bail!(
                "pickup '{}' has invalid coordinates ({}, {})",
                rec.id,
                rec.longitude,
                rec.latitude
            );
        }
        pickups.push(Pickup {
            id: rec.id,
            route_id: rec.route_id,
            coordinate: Coordinate::new(rec.longitude, rec.latitude),
            house_number: rec.house_number,
            street: rec.street,
        });
    }
    debug!(count = pickups.len(), "Parsed pickup records");
    Ok(pickups)
}

fn require_columns(headers: &StringRecord, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        bail!("missing required column(s): {}", missing.join(", "));
    }
    Ok(())
}
