#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geometry utilities for the court map.
//!
//! Two concerns live here:
//!
//! 1. **Distance** — great-circle (Haversine) distance between WGS84
//!    coordinates, used by the clusterer, the facility matcher, and the
//!    acceptance thresholds.
//! 2. **Extraction** — converting raw `GeoJSON` features from the map
//!    extract into typed [`Court`](court_map_court_models::Court)
//!    records, including representative-point computation and tag
//!    mapping for surface and public access.

pub mod distance;
pub mod extract;

pub use distance::haversine_km;
pub use extract::court_from_feature;
