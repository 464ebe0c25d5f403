#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Facility search for sports courts.
//!
//! Resolves a human-readable facility name for a coordinate by querying
//! a Photon-style named-place search API through a layered strategy:
//!
//! 1. **Schools** (tight radius) — a court on school grounds belongs to
//!    the school.
//! 2. **Sports clubs, community centres, places of worship** (medium
//!    radius).
//! 3. **Parks, playgrounds, recreation grounds** (medium radius).
//! 4. **Named buildings** (last resort).
//! 5. **Reverse geocoding** of the point itself (final fallback).
//!
//! Categories are defined in TOML files under `search/` and loaded from
//! the [`service_registry`]. Candidate quality is gated by the
//! [`filters`] module; the single best candidate is chosen by the
//! bounding-containment [`matcher`], which prefers a facility whose
//! footprint contains the query point over any merely-nearby one.

pub mod filters;
pub mod matcher;
pub mod photon;
pub mod provider;
pub mod service_registry;

use thiserror::Error;

/// An axis-aligned bounding rectangle describing a place's footprint.
///
/// Photon reports extents as `[west, north, east, south]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingExtent {
    /// Western (minimum) longitude.
    pub west: f64,
    /// Northern (maximum) latitude.
    pub north: f64,
    /// Eastern (maximum) longitude.
    pub east: f64,
    /// Southern (minimum) latitude.
    pub south: f64,
}

impl BoundingExtent {
    /// Builds an extent from a 4-element `[west, north, east, south]`
    /// array. Returns `None` if fewer than 4 elements are present.
    #[must_use]
    pub fn from_array(values: &[f64]) -> Option<Self> {
        if values.len() < 4 {
            return None;
        }
        Some(Self {
            west: values[0],
            north: values[1],
            east: values[2],
            south: values[3],
        })
    }

    /// Returns whether the extent contains a coordinate.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        let (min_lat, max_lat) = if self.south <= self.north {
            (self.south, self.north)
        } else {
            (self.north, self.south)
        };
        let (min_lon, max_lon) = if self.west <= self.east {
            (self.west, self.east)
        } else {
            (self.east, self.west)
        };

        min_lat <= latitude && latitude <= max_lat && min_lon <= longitude && longitude <= max_lon
    }
}

/// A named place returned by one search query.
///
/// Ephemeral: produced per call, consumed by the matcher, discarded.
#[derive(Debug, Clone)]
pub struct FacilityCandidate {
    /// Display name of the place.
    pub name: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// OSM tag key of the place (e.g. `"leisure"`).
    pub osm_key: Option<String>,
    /// OSM tag value of the place (e.g. `"park"`, `"school"`).
    pub osm_value: Option<String>,
    /// Footprint rectangle, when the place has one.
    pub extent: Option<BoundingExtent>,
}

/// The facility chosen for a query point.
#[derive(Debug, Clone)]
pub struct ResolvedFacility {
    /// Facility name.
    pub name: String,
    /// Great-circle distance (km) from the query point to the facility.
    pub distance_km: f64,
    /// Which search layer produced the match: a category id from the
    /// registry, or `"reverse"` for the final fallback.
    pub source: String,
    /// OSM tag value of the matched place, when known.
    pub osm_value: Option<String>,
}

/// Errors from facility search operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}
