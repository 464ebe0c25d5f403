//! Bounding-containment matching.
//!
//! Chooses the best facility candidate for a query point. A candidate
//! whose footprint rectangle contains the point always outranks any
//! non-containing candidate, however close; among the rest, plain
//! great-circle distance decides.

use court_map_geometry::haversine_km;

use crate::FacilityCandidate;

/// Score assigned to a candidate whose extent contains the query point.
///
/// Near-zero so containment beats any realistic distance.
pub const CONTAINMENT_SCORE: f64 = 0.001;

/// Scores one candidate against a query point.
///
/// Containment wins a flat [`CONTAINMENT_SCORE`]; otherwise the score
/// is the great-circle distance in kilometers.
#[must_use]
pub fn score(latitude: f64, longitude: f64, candidate: &FacilityCandidate) -> f64 {
    if candidate
        .extent
        .is_some_and(|extent| extent.contains(latitude, longitude))
    {
        return CONTAINMENT_SCORE;
    }

    haversine_km(latitude, longitude, candidate.latitude, candidate.longitude)
}

/// Returns the index and score of the best-scoring candidate.
///
/// Ties keep the first-seen candidate (strict `<` on the running
/// minimum). Returns `None` for an empty slice.
#[must_use]
pub fn best_match(
    latitude: f64,
    longitude: f64,
    candidates: &[FacilityCandidate],
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, candidate) in candidates.iter().enumerate() {
        let s = score(latitude, longitude, candidate);
        if best.is_none_or(|(_, current)| s < current) {
            best = Some((idx, s));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoundingExtent;

    fn candidate(name: &str, lat: f64, lon: f64, extent: Option<BoundingExtent>) -> FacilityCandidate {
        FacilityCandidate {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            osm_key: None,
            osm_value: None,
            extent,
        }
    }

    #[test]
    fn containment_beats_proximity() {
        // Court inside Moscone Recreation Center's footprint; the
        // corner store is 10x closer by centroid distance.
        let court = (37.802_09, -122.434_42);

        let store = candidate("Corner Store", 37.802_18, -122.434_42, None);
        let moscone = candidate(
            "Moscone Recreation Center",
            37.804_8,
            -122.432_0,
            Some(BoundingExtent {
                west: -122.436_0,
                north: 37.805_5,
                east: -122.431_0,
                south: 37.801_0,
            }),
        );

        let (idx, score) = best_match(court.0, court.1, &[store, moscone]).unwrap();
        assert_eq!(idx, 1);
        assert!((score - CONTAINMENT_SCORE).abs() < 1e-12);
    }

    #[test]
    fn distance_decides_without_containment() {
        let court = (37.8021, -122.4344);
        let near = candidate("Near Park", 37.8025, -122.4344, None);
        let far = candidate("Far Park", 37.8100, -122.4344, None);

        let (idx, _) = best_match(court.0, court.1, &[far, near]).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn ties_keep_first_seen() {
        let court = (37.8021, -122.4344);
        let extent = BoundingExtent {
            west: -122.44,
            north: 37.81,
            east: -122.43,
            south: 37.80,
        };
        let a = candidate("First", 37.8050, -122.4350, Some(extent));
        let b = candidate("Second", 37.8030, -122.4340, Some(extent));

        let (idx, _) = best_match(court.0, court.1, &[a, b]).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn empty_candidates_yield_none() {
        assert!(best_match(37.8, -122.4, &[]).is_none());
    }
}
