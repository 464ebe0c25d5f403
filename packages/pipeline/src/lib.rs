#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for enriching raw court geometries with facility names and
//! persisting the results.
//!
//! The pipeline runs in two phases:
//!
//! 1. **Enrich** — parse the input feature collection, cluster nearby
//!    courts, resolve one facility name per cluster through the layered
//!    search provider, and batch-upsert the records.
//! 2. **Assign names** — a post-hoc pass over the persisted rows that
//!    gives courts sharing a facility name and sport sequential
//!    "Court N" labels.
//!
//! Two execution modes are supported: sequential (one search at a
//! time with a courtesy delay, kind to public API instances) and
//! bounded-concurrency (chunks of clusters resolved concurrently, with
//! results reassembled in input order before persistence).

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use court_map_cluster::naming::{individual_assignments, is_school};
use court_map_cluster::{Cluster, ClusterMode, cluster_courts};
use court_map_court_models::{Court, CourtRecord};
use court_map_database::queries;
use court_map_geocoder::ResolvedFacility;
use court_map_geocoder::provider::FacilitySearchProvider;
use futures::stream::{self, StreamExt as _};

/// Records buffered before each persistence flush.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Clusters resolved concurrently per chunk in concurrent mode.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// Cap on total in-flight category searches in concurrent mode.
pub const DEFAULT_MAX_CONCURRENT_SEARCHES: usize = 50;

/// Courtesy delay between searches in sequential mode.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// Per-request timeout for search calls.
pub const SEARCH_TIMEOUT_SECS: u64 = 10;

/// User agent sent on every search request.
pub const USER_AGENT: &str = "court-map/1.0 (https://github.com/court-map/court-map)";

/// How cluster resolution executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One facility search at a time, with a courtesy delay between
    /// searches.
    Sequential,
    /// Chunks of clusters resolved concurrently under the search
    /// semaphore.
    Concurrent,
}

/// Tunables for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Execution mode for cluster resolution.
    pub mode: ExecutionMode,
    /// Whether clustering also requires matching sport.
    pub cluster_mode: ClusterMode,
    /// Clustering radius in kilometers.
    pub max_distance_km: f64,
    /// Clusters per concurrent chunk.
    pub chunk_size: usize,
    /// Records per persistence batch.
    pub batch_size: usize,
    /// Delay between searches in sequential mode, in milliseconds.
    pub rate_limit_ms: u64,
    /// Optional cap on the number of courts processed (for testing
    /// against live APIs).
    pub limit: Option<usize>,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Concurrent,
            cluster_mode: ClusterMode::SportAndDistance,
            max_distance_km: court_map_cluster::DEFAULT_MAX_DISTANCE_KM,
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            limit: None,
        }
    }
}

/// Shared run counters, safe for concurrent increment.
#[derive(Debug, Default)]
pub struct EnrichStats {
    processed: AtomicU64,
    matched: AtomicU64,
    fallback: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl EnrichStats {
    /// Counts one court handed to persistence.
    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one court that received a resolved facility name.
    pub fn inc_matched(&self) {
        self.matched.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one court that kept its fallback name.
    pub fn inc_fallback(&self) {
        self.fallback.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts records lost to a rolled-back batch.
    pub fn add_failed(&self, count: u64) {
        self.failed.fetch_add(count, Ordering::Relaxed);
    }

    /// Counts one input feature skipped during extraction.
    pub fn inc_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value copy of [`EnrichStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Courts handed to persistence.
    pub processed: u64,
    /// Courts with a resolved facility name.
    pub matched: u64,
    /// Courts that kept their fallback name.
    pub fallback: u64,
    /// Records lost to rolled-back batches.
    pub failed: u64,
    /// Input features skipped during extraction.
    pub skipped: u64,
}

/// Builds the HTTP client shared by all search calls for one run.
///
/// # Errors
///
/// Returns an error if the client cannot be constructed.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(SEARCH_TIMEOUT_SECS))
        .build()
}

/// Loads and extracts courts from a `GeoJSON` feature collection file.
///
/// An unreadable file or a top-level document that is not a
/// `FeatureCollection` is fatal; individual features that fail
/// extraction are counted as skipped and logged.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as a
/// `FeatureCollection`.
pub fn load_courts(
    path: &Path,
    stats: &EnrichStats,
) -> Result<Vec<Court>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let geojson: geojson::GeoJson = raw.parse()?;

    let geojson::GeoJson::FeatureCollection(collection) = geojson else {
        return Err(format!("{} is not a GeoJSON FeatureCollection", path.display()).into());
    };

    let total = collection.features.len();
    let mut courts = Vec::with_capacity(total);

    for feature in &collection.features {
        match court_map_geometry::court_from_feature(feature) {
            Some(court) => courts.push(court),
            None => stats.inc_skipped(),
        }
    }

    log::info!(
        "Extracted {} courts from {} features ({} skipped)",
        courts.len(),
        total,
        total - courts.len()
    );

    Ok(courts)
}

/// Clusters courts, resolves one facility per cluster, and persists the
/// enriched records in batches.
///
/// # Errors
///
/// Returns an error if persistence fails at the transaction level
/// (individual failed batches are absorbed into the stats and the run
/// continues).
pub async fn enrich(
    db: &dyn switchy_database::Database,
    provider: &FacilitySearchProvider,
    mut courts: Vec<Court>,
    options: &EnrichOptions,
    stats: &EnrichStats,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    if let Some(limit) = options.limit {
        courts.truncate(limit);
    }

    let clusters = cluster_courts(&courts, options.cluster_mode, options.max_distance_km);
    log::info!(
        "Clustered {} courts into {} clusters ({} search calls saved)",
        courts.len(),
        clusters.len(),
        courts.len() - clusters.len()
    );

    let mut buffer: Vec<CourtRecord> = Vec::with_capacity(options.batch_size);

    match options.mode {
        ExecutionMode::Sequential => {
            for cluster in &clusters {
                tokio::time::sleep(std::time::Duration::from_millis(options.rate_limit_ms)).await;

                let representative = cluster.representative();
                let resolved = provider
                    .resolve_sequential(representative.latitude, representative.longitude)
                    .await;

                buffer_cluster_records(&mut buffer, cluster, resolved.as_ref(), stats);

                if buffer.len() >= options.batch_size {
                    flush(db, &mut buffer, stats).await?;
                }
            }
        }
        ExecutionMode::Concurrent => {
            for chunk in clusters.chunks(options.chunk_size) {
                // Resolutions complete in any order; sort by the
                // original index so cluster/record association is
                // preserved before persistence.
                let mut results: Vec<(usize, Option<ResolvedFacility>)> =
                    stream::iter(chunk.iter().enumerate().map(|(idx, cluster)| async move {
                        let representative = cluster.representative();
                        let resolved = provider
                            .resolve_concurrent(representative.latitude, representative.longitude)
                            .await;
                        (idx, resolved)
                    }))
                    .buffer_unordered(options.chunk_size)
                    .collect()
                    .await;

                results.sort_by_key(|(idx, _)| *idx);

                for (idx, resolved) in results {
                    buffer_cluster_records(&mut buffer, &chunk[idx], resolved.as_ref(), stats);
                }

                if buffer.len() >= options.batch_size {
                    flush(db, &mut buffer, stats).await?;
                }
            }
        }
    }

    flush(db, &mut buffer, stats).await?;

    let snapshot = stats.snapshot();
    log::info!(
        "Enrichment complete in {:.1}s: {} processed, {} matched, {} fallback, {} failed, {} skipped",
        start.elapsed().as_secs_f64(),
        snapshot.processed,
        snapshot.matched,
        snapshot.fallback,
        snapshot.failed,
        snapshot.skipped
    );

    Ok(())
}

/// Fans one cluster's resolution out to records for every member.
///
/// All members share the cluster id and the resolved (name, distance,
/// source) triple; without a resolution each member keeps its fallback
/// name.
fn buffer_cluster_records(
    buffer: &mut Vec<CourtRecord>,
    cluster: &Cluster,
    resolved: Option<&ResolvedFacility>,
    stats: &EnrichStats,
) {
    for member in &cluster.members {
        stats.inc_processed();

        let record = match resolved {
            Some(facility) => {
                stats.inc_matched();
                CourtRecord {
                    court: member.clone(),
                    cluster_id: Some(cluster.id.clone()),
                    photon_name: Some(facility.name.clone()),
                    photon_distance_km: Some(facility.distance_km),
                    photon_source: Some(facility.source.clone()),
                    is_school: is_school(
                        &facility.source,
                        facility.osm_value.as_deref(),
                        &facility.name,
                    ),
                }
            }
            None => {
                stats.inc_fallback();
                log::debug!(
                    "{}: no facility found, keeping '{}'",
                    member.osm_id,
                    member.fallback_name
                );
                CourtRecord::unmatched(member.clone(), Some(cluster.id.clone()))
            }
        };

        buffer.push(record);
    }
}

/// Flushes the record buffer as one batch upsert.
///
/// A failed batch is logged and counted; it does not stop the run.
async fn flush(
    db: &dyn switchy_database::Database,
    buffer: &mut Vec<CourtRecord>,
    stats: &EnrichStats,
) -> Result<(), Box<dyn std::error::Error>> {
    if buffer.is_empty() {
        return Ok(());
    }

    let outcome = queries::upsert_courts_batch(db, buffer).await?;

    if outcome.failed > 0 {
        stats.add_failed(outcome.failed);
        log::warn!("Batch flush: {} records failed", outcome.failed);
    } else {
        log::info!("Flushed batch of {} records", outcome.inserted);
    }

    buffer.clear();
    Ok(())
}

/// Runs the post-hoc individual-naming pass over the persisted courts.
///
/// Groups rows by (facility name, sport); groups with more than one
/// member get "Court N" labels in ascending id order, and stale labels
/// on shrunken groups are cleared. Re-running on unchanged data applies
/// nothing.
///
/// # Errors
///
/// Returns an error if the read-back or the label updates fail; the
/// enrichment output persisted earlier is unaffected.
pub async fn assign_individual_names(
    db: &dyn switchy_database::Database,
) -> Result<u64, Box<dyn std::error::Error>> {
    let rows = queries::fetch_named_courts(db).await?;
    let changes = individual_assignments(&rows);

    if changes.is_empty() {
        log::info!("Individual names already up to date ({} courts)", rows.len());
        return Ok(0);
    }

    let assigned = changes.iter().filter(|(_, name)| name.is_some()).count();
    let cleared = changes.len() - assigned;

    let applied = queries::apply_individual_names(db, &changes).await?;
    log::info!("Individual names: {assigned} assigned, {cleared} cleared ({applied} rows updated)");

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_map_court_models::{Sport, SurfaceType};

    fn court(osm_id: &str) -> Court {
        Court {
            osm_id: osm_id.to_string(),
            sport: Sport::Basketball,
            hoops: Some(1),
            surface: SurfaceType::Asphalt,
            public_access: None,
            latitude: 37.8021,
            longitude: -122.4344,
            fallback_name: "basketball court".to_string(),
        }
    }

    #[test]
    fn default_options_are_concurrent_with_sport_clustering() {
        let options = EnrichOptions::default();
        assert_eq!(options.mode, ExecutionMode::Concurrent);
        assert_eq!(options.cluster_mode, ClusterMode::SportAndDistance);
        assert!((options.max_distance_km - 0.05).abs() < 1e-12);
        assert_eq!(options.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn resolved_cluster_shares_name_across_members() {
        let cluster = Cluster {
            id: "run-1".to_string(),
            members: vec![court("way/1"), court("way/2")],
        };
        let resolved = ResolvedFacility {
            name: "Jackson Playground Park".to_string(),
            distance_km: 0.04,
            source: "park".to_string(),
            osm_value: Some("park".to_string()),
        };

        let stats = EnrichStats::default();
        let mut buffer = Vec::new();
        buffer_cluster_records(&mut buffer, &cluster, Some(&resolved), &stats);

        assert_eq!(buffer.len(), 2);
        for record in &buffer {
            assert_eq!(record.photon_name.as_deref(), Some("Jackson Playground Park"));
            assert_eq!(record.photon_source.as_deref(), Some("park"));
            assert_eq!(record.cluster_id.as_deref(), Some("run-1"));
            assert!(!record.is_school);
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.processed, 2);
        assert_eq!(snapshot.matched, 2);
        assert_eq!(snapshot.fallback, 0);
    }

    #[test]
    fn unresolved_cluster_keeps_fallback_names() {
        let cluster = Cluster {
            id: "run-2".to_string(),
            members: vec![court("way/3")],
        };

        let stats = EnrichStats::default();
        let mut buffer = Vec::new();
        buffer_cluster_records(&mut buffer, &cluster, None, &stats);

        assert_eq!(buffer.len(), 1);
        assert!(buffer[0].photon_name.is_none());
        assert_eq!(buffer[0].court.fallback_name, "basketball court");

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.fallback, 1);
    }

    #[test]
    fn school_matches_are_flagged() {
        let cluster = Cluster {
            id: "run-3".to_string(),
            members: vec![court("way/4")],
        };
        let resolved = ResolvedFacility {
            name: "Gateway High School".to_string(),
            distance_km: 0.02,
            source: "school".to_string(),
            osm_value: Some("school".to_string()),
        };

        let stats = EnrichStats::default();
        let mut buffer = Vec::new();
        buffer_cluster_records(&mut buffer, &cluster, Some(&resolved), &stats);

        assert!(buffer[0].is_school);
    }

    #[test]
    fn stats_support_concurrent_increment() {
        let stats = std::sync::Arc::new(EnrichStats::default());

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let stats = std::sync::Arc::clone(&stats);
                scope.spawn(move || {
                    for _ in 0..1000 {
                        stats.inc_processed();
                    }
                });
            }
        });

        assert_eq!(stats.snapshot().processed, 4000);
    }
}
