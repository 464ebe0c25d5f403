#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Sports court domain types.
//!
//! This crate defines the canonical court taxonomy shared across the
//! court-map system: the sport and surface enums, the [`Court`] record
//! produced by geometry extraction, and the enriched [`CourtRecord`]
//! written to the database after facility matching.
//!
//! Enum values serialize as lowercase `snake_case` so they round-trip
//! against raw `OpenStreetMap` tag values (`sport=basketball`,
//! `surface=asphalt`).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Sport played on a court.
///
/// Unrecognized (but non-empty) `sport` tags map to [`Sport::Other`]
/// during extraction; an absent tag causes the feature to be skipped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Sport {
    /// Basketball courts, optionally tagged with a hoop count.
    Basketball,
    /// Tennis courts.
    Tennis,
    /// Soccer / football pitches.
    Soccer,
    /// Volleyball courts.
    Volleyball,
    /// Handball courts.
    Handball,
    /// Pickleball courts.
    Pickleball,
    /// Any sport outside the tracked set.
    Other,
}

impl Sport {
    /// Parses a raw OSM `sport` tag value.
    ///
    /// Multi-valued tags (`"basketball;soccer"`) use the first value.
    /// Returns `None` for empty input; unrecognized values map to
    /// [`Sport::Other`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let first = tag.split(';').next().unwrap_or("").trim();
        if first.is_empty() {
            return None;
        }
        Some(
            first
                .to_lowercase()
                .parse::<Self>()
                .unwrap_or(Self::Other),
        )
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Basketball,
            Self::Tennis,
            Self::Soccer,
            Self::Volleyball,
            Self::Handball,
            Self::Pickleball,
            Self::Other,
        ]
    }
}

/// Playing surface of a court.
///
/// Untracked surfaces (dirt, gravel, sand, anything unrecognized) fold
/// into [`SurfaceType::Other`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SurfaceType {
    /// Asphalt surface.
    Asphalt,
    /// Concrete surface.
    Concrete,
    /// Wood (indoor) surface.
    Wood,
    /// Synthetic / acrylic surface.
    Synthetic,
    /// Clay surface.
    Clay,
    /// Grass surface.
    Grass,
    /// Everything else (dirt, gravel, sand, unknown).
    Other,
}

impl SurfaceType {
    /// Maps a raw surface tag value to a surface type.
    ///
    /// Tracked surfaces map to themselves; dirt, gravel, and sand fold
    /// into [`SurfaceType::Other`], as does anything unrecognized.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "asphalt" => Self::Asphalt,
            "concrete" => Self::Concrete,
            "wood" => Self::Wood,
            "synthetic" => Self::Synthetic,
            "clay" => Self::Clay,
            "grass" => Self::Grass,
            _ => Self::Other,
        }
    }
}

/// A single sports-facility element extracted from map data.
///
/// Immutable within a pipeline run; re-created from the input feature
/// collection on every invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Court {
    /// Stable external id (`"way/123"`, `"node/456"`, `"relation/789"`).
    pub osm_id: String,
    /// Sport played on this court.
    pub sport: Sport,
    /// Hoop count (basketball-specific).
    pub hoops: Option<u32>,
    /// Playing surface.
    pub surface: SurfaceType,
    /// Public-access tri-state: `Some(true)` / `Some(false)` when an
    /// explicit access or fee tag says so, `None` when unknown.
    pub public_access: Option<bool>,
    /// Representative point latitude (WGS84).
    pub latitude: f64,
    /// Representative point longitude (WGS84).
    pub longitude: f64,
    /// Display name used when no facility match is found
    /// (e.g. `"basketball court (2 hoops)"`).
    pub fallback_name: String,
}

/// The enriched, persistable shape of a court after facility matching.
#[derive(Debug, Clone)]
pub struct CourtRecord {
    /// The underlying extracted court.
    pub court: Court,
    /// Cluster this court was grouped into for this run.
    pub cluster_id: Option<String>,
    /// Resolved facility name shared by the whole cluster, if any.
    pub photon_name: Option<String>,
    /// Distance (km) from the cluster representative to the matched
    /// facility.
    pub photon_distance_km: Option<f64>,
    /// Search category that produced the match (`"school"`, `"park"`,
    /// `"reverse"`, ...).
    pub photon_source: Option<String>,
    /// Whether the resolved facility is a school.
    pub is_school: bool,
}

impl CourtRecord {
    /// Wraps an extracted court with no facility match.
    ///
    /// The court keeps its fallback display name; all enrichment fields
    /// stay empty.
    #[must_use]
    pub const fn unmatched(court: Court, cluster_id: Option<String>) -> Self {
        Self {
            court,
            cluster_id,
            photon_name: None,
            photon_distance_km: None,
            photon_source: None,
            is_school: false,
        }
    }
}
