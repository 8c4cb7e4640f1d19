use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Coordinate, Path, PathProvider, RoutingError};
use crate::fetch::{HttpClient, post_json};

#[derive(Serialize)]
struct DirectionsRequest {
    coordinates: [Coordinate; 2],
    elevation: bool,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    // openrouteservice omits these when the path is flat
    #[serde(default)]
    ascent: f64,
    #[serde(default)]
    descent: f64,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    distance: f64,
}

/// [`PathProvider`] backed by the openrouteservice directions API.
///
/// Requests are single-leg (`start` → `end`) with elevation enabled, so the
/// response must carry exactly one segment.
pub struct OrsClient<C> {
    client: C,
    directions_url: Url,
}

impl<C: HttpClient> OrsClient<C> {
    /// `base_url` is the service root, e.g. `http://localhost:8080/ors`.
    pub fn new(client: C, base_url: &str, profile: &str) -> Result<Self> {
        let raw = format!(
            "{}/v2/directions/{}/geojson",
            base_url.trim_end_matches('/'),
            profile
        );
        let directions_url =
            Url::parse(&raw).with_context(|| format!("invalid routing service URL '{raw}'"))?;
        Ok(Self {
            client,
            directions_url,
        })
    }

    pub fn directions_url(&self) -> &Url {
        &self.directions_url
    }
}

#[async_trait]
impl<C: HttpClient> PathProvider for OrsClient<C> {
    #[tracing::instrument(skip_all, fields(%start, %end))]
    async fn navigate(&self, start: Coordinate, end: Coordinate) -> Result<Path, RoutingError> {
        let body = serde_json::to_vec(&DirectionsRequest {
            coordinates: [start, end],
            elevation: true,
        })?;
        let resp = post_json(&self.client, self.directions_url.clone(), body).await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RoutingError::Service {
                status: status.as_u16(),
                body: text,
            });
        }
        debug!(bytes = text.len(), "Directions received");

        let parsed: DirectionsResponse = serde_json::from_str(&text)?;
        parse_directions(parsed, start, end)
    }
}

/// Extracts path metrics from a GeoJSON directions response.
///
/// # Errors
///
/// [`RoutingError::NoRoute`] when the response has no features,
/// [`RoutingError::MultipleSegments`] when the first feature is not a single
/// leg, and [`RoutingError::BadResponse`] for points without elevation.
pub fn parse_directions(
    response: DirectionsResponse,
    start: Coordinate,
    end: Coordinate,
) -> Result<Path, RoutingError> {
    let Some(feature) = response.features.into_iter().next() else {
        return Err(RoutingError::NoRoute { start, end });
    };

    let segments = feature.properties.segments;
    if segments.len() != 1 {
        return Err(RoutingError::MultipleSegments(segments.len()));
    }

    let geometry = feature
        .geometry
        .coordinates
        .into_iter()
        .map(|point| match point.as_slice() {
            [lon, lat, elevation, ..] => Ok([*lon, *lat, *elevation]),
            _ => Err(RoutingError::BadResponse(format!(
                "expected [lon, lat, elevation], got {point:?}"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Path {
        geometry,
        ascent: feature.properties.ascent,
        descent: feature.properties.descent,
        distance: segments[0].distance,
    })
}
