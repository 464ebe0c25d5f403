//! Court extraction from raw `GeoJSON` features.
//!
//! Map extracts arrive as a `FeatureCollection` where each feature is a
//! court polygon (or occasionally a bare point) with OSM-style
//! properties. Extraction converts one feature into a typed
//! [`Court`], or skips it (with a log line) when the geometry or
//! required properties are unusable. A skipped feature never aborts the
//! batch.

use court_map_court_models::{Court, Sport, SurfaceType};
use geojson::{Feature, Value as GeomValue};

/// Converts one `GeoJSON` feature into a [`Court`].
///
/// Returns `None` (logging the reason) when:
/// - the geometry is neither `Point` nor `Polygon`,
/// - a polygon ring has fewer than 4 positions,
/// - the stable id or the `sport` property is absent or empty.
#[must_use]
pub fn court_from_feature(feature: &Feature) -> Option<Court> {
    let Some(osm_id) = feature_osm_id(feature) else {
        log::warn!("Skipping feature with no stable id");
        return None;
    };

    let Some(sport) = prop_str(feature, "sport").and_then(Sport::from_tag) else {
        log::warn!("Skipping {osm_id}: missing or empty sport tag");
        return None;
    };

    let Some((latitude, longitude)) = representative_point(feature, &osm_id) else {
        return None;
    };

    let hoops = prop_hoops(feature);

    Some(Court {
        fallback_name: fallback_name(sport, hoops),
        surface: surface_from_tags(feature),
        public_access: access_from_tags(feature),
        osm_id,
        sport,
        hoops,
        latitude,
        longitude,
    })
}

/// Computes the representative point for a feature's geometry.
///
/// For a polygon this is the arithmetic mean of the exterior ring's
/// vertices as stored (including the closing vertex). This is not the
/// true area centroid; the existing dataset was produced with the
/// vertex mean and downstream output must keep matching it.
fn representative_point(feature: &Feature, osm_id: &str) -> Option<(f64, f64)> {
    let Some(geometry) = &feature.geometry else {
        log::warn!("Skipping {osm_id}: no geometry");
        return None;
    };

    match &geometry.value {
        GeomValue::Point(pos) => {
            if pos.len() < 2 {
                log::warn!("Skipping {osm_id}: point with <2 coordinates");
                return None;
            }
            Some((pos[1], pos[0]))
        }
        GeomValue::Polygon(rings) => {
            let Some(ring) = rings.first() else {
                log::warn!("Skipping {osm_id}: polygon with no rings");
                return None;
            };
            if ring.len() < 4 {
                log::warn!(
                    "Skipping {osm_id}: ring has {} positions (need >= 4)",
                    ring.len()
                );
                return None;
            }
            Some(ring_vertex_mean(ring))
        }
        _ => {
            log::warn!("Skipping {osm_id}: geometry is neither Point nor Polygon");
            None
        }
    }
}

/// Arithmetic mean of a ring's vertices, returned as `(lat, lon)`.
#[allow(clippy::cast_precision_loss)]
fn ring_vertex_mean(ring: &[Vec<f64>]) -> (f64, f64) {
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    for pos in ring {
        lon_sum += pos[0];
        lat_sum += pos[1];
    }
    let n = ring.len() as f64;
    (lat_sum / n, lon_sum / n)
}

/// Builds the fallback display name used when no facility is matched.
#[must_use]
pub fn fallback_name(sport: Sport, hoops: Option<u32>) -> String {
    match (sport, hoops) {
        (Sport::Basketball, Some(h)) => format!("basketball court ({h} hoops)"),
        (Sport::Basketball, None) => "basketball court".to_string(),
        (Sport::Other, _) => "sports court".to_string(),
        (s, _) => format!("{s} court"),
    }
}

/// Determines the surface type from `surface`, `surface_type`, or
/// `material` tags, in that order.
fn surface_from_tags(feature: &Feature) -> SurfaceType {
    for key in ["surface", "surface_type", "material"] {
        if let Some(value) = prop_str(feature, key)
            && !value.trim().is_empty()
        {
            return SurfaceType::from_tag(value);
        }
    }
    SurfaceType::Other
}

/// Determines the public-access tri-state from `access` and `fee` tags.
///
/// Only explicit tag values produce a verdict; the leisure/amenity
/// category alone never implies one.
fn access_from_tags(feature: &Feature) -> Option<bool> {
    if let Some(access) = prop_str(feature, "access") {
        match access.trim().to_lowercase().as_str() {
            "private" | "no" | "restricted" => return Some(false),
            "yes" | "public" | "permissive" => return Some(true),
            _ => {}
        }
    }

    if let Some(fee) = prop_str(feature, "fee")
        && fee.trim().eq_ignore_ascii_case("yes")
    {
        return Some(false);
    }

    None
}

/// Reads the stable OSM id from the feature id or `@id`/`id` properties.
fn feature_osm_id(feature: &Feature) -> Option<String> {
    if let Some(geojson::feature::Id::String(id)) = &feature.id
        && !id.is_empty()
    {
        return Some(id.clone());
    }

    for key in ["@id", "id"] {
        if let Some(id) = prop_str(feature, key)
            && !id.is_empty()
        {
            return Some(id.to_string());
        }
    }

    None
}

/// Reads a string property from the feature, if present.
fn prop_str<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    feature
        .properties
        .as_ref()?
        .get(key)?
        .as_str()
}

/// Reads the `hoops` property as a positive integer.
///
/// OSM exports carry it as either a number or a string; anything that
/// is not a positive integer is treated as absent.
fn prop_hoops(feature: &Feature) -> Option<u32> {
    let value = feature.properties.as_ref()?.get("hoops")?;

    let parsed = if let Some(n) = value.as_u64() {
        u32::try_from(n).ok()
    } else {
        value.as_str().and_then(|s| s.trim().parse::<u32>().ok())
    };

    parsed.filter(|&h| h > 0)
}
