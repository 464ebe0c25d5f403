//! The layered facility search provider.
//!
//! Wraps the Photon client, the category registry, the quality filters,
//! and the containment matcher into the two resolution strategies the
//! pipeline runs:
//!
//! - [`FacilitySearchProvider::resolve_sequential`] — categories in
//!   priority order, first category with an accepted candidate wins.
//! - [`FacilitySearchProvider::resolve_concurrent`] — all categories
//!   queried concurrently under a counting semaphore; accepted
//!   candidates are pooled and the containment matcher picks the
//!   winner.
//!
//! Search failures (network, timeout, malformed response) are logged
//! and treated as "no candidate from this category"; only exhausting
//! every category and the reverse fallback yields `None`.

use std::sync::Arc;

use court_map_geometry::haversine_km;
use tokio::sync::Semaphore;

use crate::service_registry::{SearchCategory, enabled_categories};
use crate::{FacilityCandidate, ResolvedFacility, filters, matcher, photon};

/// Facility search client for one pipeline run.
///
/// Holds the shared HTTP client and the in-flight search permit pool.
/// Construct once per run and share by reference.
pub struct FacilitySearchProvider {
    client: reqwest::Client,
    base_url: String,
    categories: Vec<SearchCategory>,
    permits: Arc<Semaphore>,
}

impl FacilitySearchProvider {
    /// Creates a provider using the enabled categories from the
    /// registry.
    ///
    /// `max_concurrent_searches` caps the number of in-flight category
    /// searches across all concurrently-resolved courts.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        max_concurrent_searches: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            categories: enabled_categories(),
            permits: Arc::new(Semaphore::new(max_concurrent_searches)),
        }
    }

    /// Resolves a facility by querying categories in priority order.
    ///
    /// The first category yielding an accepted candidate wins; within a
    /// category the containment matcher picks among the accepted
    /// candidates. Falls back to reverse geocoding, then to `None`.
    pub async fn resolve_sequential(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Option<ResolvedFacility> {
        for category in &self.categories {
            let accepted = self.search_accepted(category, latitude, longitude).await;

            if let Some((idx, _)) = matcher::best_match(latitude, longitude, &accepted) {
                return Some(resolved_from(category.id.clone(), latitude, longitude, &accepted[idx]));
            }
        }

        self.reverse_fallback(latitude, longitude).await
    }

    /// Resolves a facility by querying all categories concurrently.
    ///
    /// Accepted candidates are pooled across categories and ranked by
    /// the containment matcher, so a containing facility still beats a
    /// nearer one from a higher-priority category; among non-containing
    /// candidates the closest accepted one wins. Falls back to reverse
    /// geocoding, then to `None`.
    pub async fn resolve_concurrent(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Option<ResolvedFacility> {
        let searches = self.categories.iter().map(|category| async move {
            let accepted = self.search_accepted(category, latitude, longitude).await;
            accepted
                .into_iter()
                .map(|candidate| (category.id.clone(), candidate))
                .collect::<Vec<_>>()
        });

        let pool: Vec<(String, FacilityCandidate)> = futures::future::join_all(searches)
            .await
            .into_iter()
            .flatten()
            .collect();

        let candidates: Vec<FacilityCandidate> =
            pool.iter().map(|(_, candidate)| candidate.clone()).collect();

        if let Some((idx, _)) = matcher::best_match(latitude, longitude, &candidates) {
            let (source, candidate) = &pool[idx];
            return Some(resolved_from(source.clone(), latitude, longitude, candidate));
        }

        self.reverse_fallback(latitude, longitude).await
    }

    /// Runs one category search and filters its results.
    ///
    /// A failed search is logged and returns no candidates; it never
    /// aborts sibling searches.
    async fn search_accepted(
        &self,
        category: &SearchCategory,
        latitude: f64,
        longitude: f64,
    ) -> Vec<FacilityCandidate> {
        let Ok(_permit) = self.permits.acquire().await else {
            return Vec::new();
        };

        match photon::search_category(&self.client, &self.base_url, category, latitude, longitude)
            .await
        {
            Ok(candidates) => accept_candidates(category, latitude, longitude, candidates),
            Err(e) => {
                log::warn!("Search failed for category '{}': {e}", category.id);
                Vec::new()
            }
        }
    }

    /// Final fallback: reverse-geocode the point itself.
    ///
    /// Returns whatever place the point administratively belongs to; no
    /// quality filtering applies at this layer.
    async fn reverse_fallback(&self, latitude: f64, longitude: f64) -> Option<ResolvedFacility> {
        match photon::reverse(&self.client, &self.base_url, latitude, longitude).await {
            Ok(Some(place)) => {
                let name = place.preferred_label()?;
                let distance_km =
                    haversine_km(latitude, longitude, place.latitude, place.longitude);
                log::debug!("Reverse fallback resolved '{name}' ({distance_km:.3} km)");
                Some(ResolvedFacility {
                    name,
                    distance_km,
                    source: "reverse".to_string(),
                    osm_value: place.osm_value,
                })
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Reverse geocoding failed: {e}");
                None
            }
        }
    }
}

/// Applies the quality, keyword, and distance gates to one category's
/// raw candidates.
fn accept_candidates(
    category: &SearchCategory,
    latitude: f64,
    longitude: f64,
    candidates: Vec<FacilityCandidate>,
) -> Vec<FacilityCandidate> {
    candidates
        .into_iter()
        .filter(|candidate| {
            if !filters::is_high_quality_name(&candidate.name) {
                log::debug!(
                    "{}: rejecting '{}' (low-quality name)",
                    category.id,
                    candidate.name
                );
                return false;
            }

            if category.require_facility_keyword && !filters::has_facility_keyword(&candidate.name)
            {
                log::debug!(
                    "{}: rejecting '{}' (no facility keyword)",
                    category.id,
                    candidate.name
                );
                return false;
            }

            let distance_km =
                haversine_km(latitude, longitude, candidate.latitude, candidate.longitude);
            if distance_km > category.max_distance_km {
                log::debug!(
                    "{}: rejecting '{}' ({distance_km:.3} km beyond {:.3} km threshold)",
                    category.id,
                    candidate.name,
                    category.max_distance_km
                );
                return false;
            }

            true
        })
        .collect()
}

/// Builds a [`ResolvedFacility`] from an accepted candidate.
///
/// The stored distance is the actual great-circle distance, not the
/// matcher score.
fn resolved_from(
    source: String,
    latitude: f64,
    longitude: f64,
    candidate: &FacilityCandidate,
) -> ResolvedFacility {
    ResolvedFacility {
        name: candidate.name.clone(),
        distance_km: haversine_km(latitude, longitude, candidate.latitude, candidate.longitude),
        source,
        osm_value: candidate.osm_value.clone(),
    }
}
