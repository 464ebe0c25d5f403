//! Compile-time registry of facility search categories.
//!
//! Each search layer is defined in a TOML file under `search/`. The
//! registry embeds these at compile time and exposes them via
//! [`all_categories`] and [`enabled_categories`].

use serde::Deserialize;

/// A facility search category loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCategory {
    /// Unique identifier (e.g. `"school"`, `"park"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this category participates in the layered search.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Execution order — lower values run first.
    pub priority: u32,
    /// Free-text query term sent to the search API.
    pub query: String,
    /// OSM tag filters (`"key:value"` or bare `"key"`), repeated as
    /// `osm_tag` parameters on the request.
    pub osm_tags: Vec<String>,
    /// Zoom level controlling the search radius.
    pub zoom: u8,
    /// Proximity-bias weight — lower values bias harder toward the
    /// query point.
    pub location_bias_scale: f64,
    /// Maximum number of results to request.
    pub limit: u32,
    /// Maximum accepted distance (km) between the query point and a
    /// candidate. Candidates beyond this are discarded even when
    /// well-named.
    pub max_distance_km: f64,
    /// Whether accepted names must also carry a recreational or
    /// institutional keyword (the stricter confidence filter).
    #[serde(default)]
    pub require_facility_keyword: bool,
}

const fn default_true() -> bool {
    true
}

// ── Compile-time embedded TOML files ────────────────────────────────

const CATEGORY_TOMLS: &[(&str, &str)] = &[
    ("school", include_str!("../search/school.toml")),
    ("sports", include_str!("../search/sports.toml")),
    ("park", include_str!("../search/park.toml")),
    ("building", include_str!("../search/building.toml")),
];

#[cfg(test)]
const EXPECTED_CATEGORY_COUNT: usize = 4;

/// Returns all search categories (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time
/// guarantee since the configs are embedded).
#[must_use]
pub fn all_categories() -> Vec<SearchCategory> {
    CATEGORY_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse search category '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled categories, sorted by priority (ascending).
#[must_use]
pub fn enabled_categories() -> Vec<SearchCategory> {
    let mut categories: Vec<SearchCategory> =
        all_categories().into_iter().filter(|c| c.enabled).collect();
    categories.sort_by_key(|c| c.priority);
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_categories() {
        let categories = all_categories();
        assert_eq!(categories.len(), EXPECTED_CATEGORY_COUNT);
    }

    #[test]
    fn category_ids_are_unique() {
        let categories = all_categories();
        let mut seen = BTreeSet::new();
        for cat in &categories {
            assert!(seen.insert(&cat.id), "Duplicate category ID: {}", cat.id);
        }
    }

    #[test]
    fn all_categories_have_required_fields() {
        for cat in &all_categories() {
            assert!(!cat.id.is_empty(), "Category has empty id");
            assert!(!cat.name.is_empty(), "Category {} has empty name", cat.id);
            assert!(
                !cat.osm_tags.is_empty(),
                "Category {} has no osm_tags",
                cat.id
            );
            assert!(
                cat.max_distance_km > 0.0,
                "Category {} has non-positive max_distance_km",
                cat.id
            );
            assert!(cat.limit > 0, "Category {} has zero limit", cat.id);
        }
    }

    #[test]
    fn enabled_categories_sorted_by_priority() {
        let categories = enabled_categories();
        for window in categories.windows(2) {
            assert!(
                window[0].priority <= window[1].priority,
                "Categories not sorted by priority: {} ({}) > {} ({})",
                window[0].id,
                window[0].priority,
                window[1].id,
                window[1].priority
            );
        }
    }

    #[test]
    fn schools_run_first_with_tight_radius() {
        let categories = enabled_categories();
        let first = &categories[0];
        assert_eq!(first.id, "school");
        assert!(first.max_distance_km < 0.1);
    }
}
