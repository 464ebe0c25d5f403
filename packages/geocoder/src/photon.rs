//! Photon search API client.
//!
//! Photon exposes `/api` for forward search (free text + filters) and
//! `/reverse` for reverse geocoding, both returning `GeoJSON`
//! `FeatureCollection` responses. Named-place features may carry an
//! `extent` property describing the place's footprint rectangle.
//!
//! See <https://github.com/komoot/photon>

use crate::service_registry::SearchCategory;
use crate::{BoundingExtent, FacilityCandidate, GeocodeError};

/// Searches for named places of one category near a point.
///
/// Issues a forward search restricted to the category's OSM tags, with
/// a proximity bias toward the query point and the category's result
/// limit.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing
/// fails.
pub async fn search_category(
    client: &reqwest::Client,
    base_url: &str,
    category: &SearchCategory,
    latitude: f64,
    longitude: f64,
) -> Result<Vec<FacilityCandidate>, GeocodeError> {
    let url = format!("{base_url}/api");

    let mut params: Vec<(&str, String)> = vec![
        ("q", category.query.clone()),
        ("lat", latitude.to_string()),
        ("lon", longitude.to_string()),
        ("zoom", category.zoom.to_string()),
        (
            "location_bias_scale",
            category.location_bias_scale.to_string(),
        ),
        ("limit", category.limit.to_string()),
        ("lang", "en".to_string()),
    ];
    for tag in &category.osm_tags {
        params.push(("osm_tag", tag.clone()));
    }

    let resp = client.get(&url).query(&params).send().await?;

    if !resp.status().is_success() {
        return Err(GeocodeError::Parse {
            message: format!("Photon returned status {}", resp.status()),
        });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_candidates(&body)
}

/// Searches for named places within a bounding extent.
///
/// Uses the area form of the forward endpoint (`bbox` parameter instead
/// of point + zoom).
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing
/// fails.
pub async fn search_bbox(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
    extent: &BoundingExtent,
    limit: u32,
) -> Result<Vec<FacilityCandidate>, GeocodeError> {
    let url = format!("{base_url}/api");
    let bbox = format!(
        "{},{},{},{}",
        extent.west, extent.south, extent.east, extent.north
    );

    let resp = client
        .get(&url)
        .query(&[
            ("q", query.to_string()),
            ("bbox", bbox),
            ("limit", limit.to_string()),
            ("lang", "en".to_string()),
        ])
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(GeocodeError::Parse {
            message: format!("Photon returned status {}", resp.status()),
        });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_candidates(&body)
}

/// A reverse-geocoded place with whatever name fields were available.
#[derive(Debug, Clone, Default)]
pub struct ReversePlace {
    /// Place name.
    pub name: Option<String>,
    /// Street name.
    pub street: Option<String>,
    /// House number on the street.
    pub housenumber: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// District within the city.
    pub district: Option<String>,
    /// County name.
    pub county: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Latitude of the place.
    pub latitude: f64,
    /// Longitude of the place.
    pub longitude: f64,
    /// OSM tag value of the place.
    pub osm_value: Option<String>,
}

impl ReversePlace {
    /// Builds the best available label from the place's fields.
    ///
    /// Preference order: name, then city + country, then street + city,
    /// then house number + street, then district, then county.
    #[must_use]
    pub fn preferred_label(&self) -> Option<String> {
        if let Some(name) = &self.name
            && !name.is_empty()
        {
            return Some(name.clone());
        }

        if let (Some(city), Some(country)) = (&self.city, &self.country) {
            return Some(format!("{city}, {country}"));
        }

        if let (Some(street), Some(city)) = (&self.street, &self.city) {
            return Some(format!("{street}, {city}"));
        }

        if let (Some(housenumber), Some(street)) = (&self.housenumber, &self.street) {
            return Some(format!("{housenumber} {street}"));
        }

        if let Some(district) = &self.district {
            return Some(district.clone());
        }

        self.county.clone()
    }
}

/// Reverse-geocodes a point to the place it administratively belongs
/// to.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing
/// fails.
pub async fn reverse(
    client: &reqwest::Client,
    base_url: &str,
    latitude: f64,
    longitude: f64,
) -> Result<Option<ReversePlace>, GeocodeError> {
    let url = format!("{base_url}/reverse");

    let resp = client
        .get(&url)
        .query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("limit", "1".to_string()),
            ("lang", "en".to_string()),
        ])
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(GeocodeError::Parse {
            message: format!("Photon reverse returned status {}", resp.status()),
        });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_reverse(&body)
}

/// Parses a forward-search `FeatureCollection` into candidates.
///
/// Features without a usable name or coordinates are skipped.
fn parse_candidates(body: &serde_json::Value) -> Result<Vec<FacilityCandidate>, GeocodeError> {
    let features = body
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Photon response missing 'features' array".to_string(),
        })?;

    let mut candidates = Vec::with_capacity(features.len());

    for feature in features {
        let Some(name) = feature
            .pointer("/properties/name")
            .and_then(serde_json::Value::as_str)
        else {
            continue;
        };

        let Some((longitude, latitude)) = feature_coordinates(feature) else {
            continue;
        };

        let extent = feature
            .pointer("/properties/extent")
            .and_then(serde_json::Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(serde_json::Value::as_f64)
                    .collect::<Vec<f64>>()
            })
            .and_then(|values| BoundingExtent::from_array(&values));

        candidates.push(FacilityCandidate {
            name: name.to_string(),
            latitude,
            longitude,
            osm_key: feature
                .pointer("/properties/osm_key")
                .and_then(serde_json::Value::as_str)
                .map(String::from),
            osm_value: feature
                .pointer("/properties/osm_value")
                .and_then(serde_json::Value::as_str)
                .map(String::from),
            extent,
        });
    }

    Ok(candidates)
}

/// Parses a reverse-geocoding response into a [`ReversePlace`].
fn parse_reverse(body: &serde_json::Value) -> Result<Option<ReversePlace>, GeocodeError> {
    let features = body
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Photon reverse response missing 'features' array".to_string(),
        })?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    let (longitude, latitude) = feature_coordinates(first).ok_or_else(|| GeocodeError::Parse {
        message: "Reverse feature missing geometry.coordinates".to_string(),
    })?;

    let prop = |key: &str| {
        first
            .pointer(&format!("/properties/{key}"))
            .and_then(serde_json::Value::as_str)
            .map(String::from)
    };

    Ok(Some(ReversePlace {
        name: prop("name"),
        street: prop("street"),
        housenumber: prop("housenumber"),
        city: prop("city"),
        district: prop("district"),
        county: prop("county"),
        country: prop("country"),
        osm_value: prop("osm_value"),
        latitude,
        longitude,
    }))
}

/// Reads `[lon, lat]` from a feature's geometry.
fn feature_coordinates(feature: &serde_json::Value) -> Option<(f64, f64)> {
    let coords = feature
        .pointer("/geometry/coordinates")
        .and_then(serde_json::Value::as_array)?;
    if coords.len() < 2 {
        return None;
    }
    Some((coords[0].as_f64()?, coords[1].as_f64()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_candidates_with_extent() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [-122.4330, 37.8025]
                },
                "properties": {
                    "name": "Moscone Recreation Center",
                    "osm_key": "leisure",
                    "osm_value": "sports_centre",
                    "extent": [-122.4345, 37.8040, -122.4315, 37.8010]
                }
            }, {
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [-122.4350, 37.8030]
                },
                "properties": {
                    "name": "Dolores Park",
                    "osm_key": "leisure",
                    "osm_value": "park"
                }
            }]
        });
        let candidates = parse_candidates(&body).unwrap();
        assert_eq!(candidates.len(), 2);

        let first = &candidates[0];
        assert_eq!(first.name, "Moscone Recreation Center");
        assert_eq!(first.osm_value.as_deref(), Some("sports_centre"));
        let extent = first.extent.unwrap();
        assert!(extent.contains(37.8025, -122.4330));

        assert!(candidates[1].extent.is_none());
    }

    #[test]
    fn skips_unnamed_features() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-122.4, 37.8] },
                "properties": { "osm_key": "highway" }
            }]
        });
        assert!(parse_candidates(&body).unwrap().is_empty());
    }

    #[test]
    fn parses_empty_collection() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": []
        });
        assert!(parse_candidates(&body).unwrap().is_empty());
    }

    #[test]
    fn rejects_missing_features_array() {
        let body = serde_json::json!({ "type": "FeatureCollection" });
        assert!(parse_candidates(&body).is_err());
    }

    #[test]
    fn parses_reverse_place() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-122.4330, 37.8025] },
                "properties": {
                    "street": "Chestnut Street",
                    "city": "San Francisco",
                    "country": "United States"
                }
            }]
        });
        let place = parse_reverse(&body).unwrap().unwrap();
        assert_eq!(place.city.as_deref(), Some("San Francisco"));
        assert!(place.name.is_none());
    }

    #[test]
    fn parses_reverse_empty() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": []
        });
        assert!(parse_reverse(&body).unwrap().is_none());
    }

    #[test]
    fn preferred_label_prefers_name() {
        let place = ReversePlace {
            name: Some("Jackson Playground Park".to_string()),
            city: Some("San Francisco".to_string()),
            country: Some("United States".to_string()),
            ..Default::default()
        };
        assert_eq!(
            place.preferred_label().as_deref(),
            Some("Jackson Playground Park")
        );
    }

    #[test]
    fn preferred_label_falls_back_in_order() {
        let place = ReversePlace {
            city: Some("San Francisco".to_string()),
            country: Some("United States".to_string()),
            street: Some("Chestnut Street".to_string()),
            ..Default::default()
        };
        assert_eq!(
            place.preferred_label().as_deref(),
            Some("San Francisco, United States")
        );

        let place = ReversePlace {
            street: Some("Chestnut Street".to_string()),
            housenumber: Some("100".to_string()),
            ..Default::default()
        };
        assert_eq!(
            place.preferred_label().as_deref(),
            Some("100 Chestnut Street")
        );

        let place = ReversePlace {
            district: Some("Marina District".to_string()),
            county: Some("San Francisco County".to_string()),
            ..Default::default()
        };
        assert_eq!(place.preferred_label().as_deref(), Some("Marina District"));

        let place = ReversePlace::default();
        assert!(place.preferred_label().is_none());
    }
}
