#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Court clustering and naming.
//!
//! Nearby courts usually belong to one physical facility — a school
//! yard with two basketball courts, a park with four tennis courts.
//! Grouping them first means one facility lookup per cluster instead of
//! one per court, and gives every member the same resolved name.
//!
//! The clusterer is a deterministic single pass: each unprocessed court
//! seeds a new cluster and absorbs every remaining court within the
//! radius **of the seed** (membership is measured against the seed
//! only, never against later members, so results don't depend on
//! absorption order).
//!
//! The [`naming`] module holds the pure logic for the post-persistence
//! numbering pass ("Court 1", "Court 2", ...) and school detection.

pub mod naming;

use court_map_court_models::Court;
use court_map_geometry::haversine_km;
use uuid::Uuid;

/// Default clustering radius: 0.05 km (~160 feet).
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 0.05;

/// How courts qualify for the same cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterMode {
    /// Proximity to the seed court only.
    Distance,
    /// Proximity plus matching sport.
    SportAndDistance,
}

/// A group of courts believed to be one physical facility.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Freshly generated id, unique per pipeline run.
    pub id: String,
    /// Member courts, seed first.
    pub members: Vec<Court>,
}

impl Cluster {
    /// The member whose coordinates are used for the cluster's single
    /// facility lookup.
    #[must_use]
    pub fn representative(&self) -> &Court {
        &self.members[0]
    }
}

/// Partitions courts into clusters with a single seed-based pass.
///
/// Iterates courts in input order; each unprocessed court starts a new
/// cluster and absorbs all remaining unprocessed courts within
/// `max_distance_km` of itself (and, in
/// [`ClusterMode::SportAndDistance`], sharing its sport). Every input
/// court lands in exactly one cluster; cluster order follows the order
/// of first-seen seeds, so the output is deterministic for a fixed
/// input order.
#[must_use]
pub fn cluster_courts(courts: &[Court], mode: ClusterMode, max_distance_km: f64) -> Vec<Cluster> {
    let mut processed = vec![false; courts.len()];
    let mut clusters = Vec::new();

    for i in 0..courts.len() {
        if processed[i] {
            continue;
        }
        processed[i] = true;

        let seed = &courts[i];
        let mut members = vec![seed.clone()];

        for j in (i + 1)..courts.len() {
            if processed[j] {
                continue;
            }
            let other = &courts[j];

            if mode == ClusterMode::SportAndDistance && other.sport != seed.sport {
                continue;
            }

            let distance = haversine_km(
                seed.latitude,
                seed.longitude,
                other.latitude,
                other.longitude,
            );
            if distance < max_distance_km {
                processed[j] = true;
                members.push(other.clone());
            }
        }

        clusters.push(Cluster {
            id: Uuid::new_v4().to_string(),
            members,
        });
    }

    log::debug!(
        "Clustered {} courts into {} clusters",
        courts.len(),
        clusters.len()
    );

    clusters
}
