//! Individual court numbering and school detection.
//!
//! After enrichment is persisted, courts sharing a resolved facility
//! name and sport get sequential labels ("Court 1", "Court 2", ...) so
//! users can tell them apart. Numbering follows the ascending surrogate
//! database id — insert order, not external id order — and only applies
//! to groups with more than one member; a group that shrinks to one
//! member has its stale label cleared.
//!
//! All logic here is pure; the database package fetches the rows and
//! applies the returned changes.

use std::collections::BTreeMap;

/// A persisted court row as read back for the naming pass.
#[derive(Debug, Clone)]
pub struct NamedCourtRow {
    /// Surrogate database id (monotonically increasing at insert time).
    pub id: i64,
    /// Resolved facility name, if any.
    pub facility_name: Option<String>,
    /// Sport tag value as stored.
    pub sport: String,
    /// Current individual label, if any.
    pub individual_name: Option<String>,
}

/// Computes the individual-name changes for a set of persisted courts.
///
/// Groups rows by `(facility_name, sport)`; groups with more than one
/// member get "Court N" labels in ascending id order, every other row
/// gets `None`. Only rows whose desired label differs from the current
/// one are returned, so re-running on unchanged data yields no changes.
#[must_use]
pub fn individual_assignments(rows: &[NamedCourtRow]) -> Vec<(i64, Option<String>)> {
    let mut groups: BTreeMap<(String, String), Vec<&NamedCourtRow>> = BTreeMap::new();
    let mut ungrouped: Vec<&NamedCourtRow> = Vec::new();

    for row in rows {
        match &row.facility_name {
            Some(name) => groups
                .entry((name.clone(), row.sport.clone()))
                .or_default()
                .push(row),
            None => ungrouped.push(row),
        }
    }

    let mut changes = Vec::new();

    for members in groups.values_mut() {
        members.sort_by_key(|row| row.id);

        if members.len() > 1 {
            for (idx, row) in members.iter().enumerate() {
                let desired = Some(format!("Court {}", idx + 1));
                if row.individual_name != desired {
                    changes.push((row.id, desired));
                }
            }
        } else {
            for row in &*members {
                if row.individual_name.is_some() {
                    changes.push((row.id, None));
                }
            }
        }
    }

    for row in ungrouped {
        if row.individual_name.is_some() {
            changes.push((row.id, None));
        }
    }

    changes
}

/// OSM tag values that authoritatively mark a place as a school.
const SCHOOL_OSM_VALUES: &[&str] = &["school", "university", "college"];

/// Name keywords used only when no tag value is available.
const SCHOOL_NAME_KEYWORDS: &[&str] = &[
    "school",
    "academy",
    "college",
    "university",
    "institute",
    "elementary",
    "middle school",
    "high school",
];

/// Returns whether a resolved facility is a school.
///
/// The search category and the place's OSM tag value are authoritative:
/// a match from the school category (or a school/university/college tag
/// value) is a school, and any other tag value is not, regardless of
/// what the name looks like. The name-keyword check only runs when no
/// tag value is available.
#[must_use]
pub fn is_school(source: &str, osm_value: Option<&str>, name: &str) -> bool {
    if source == "school" {
        return true;
    }

    if let Some(value) = osm_value {
        return SCHOOL_OSM_VALUES.contains(&value.to_lowercase().as_str());
    }

    let lower = name.to_lowercase();
    SCHOOL_NAME_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: Option<&str>, sport: &str, individual: Option<&str>) -> NamedCourtRow {
        NamedCourtRow {
            id,
            facility_name: name.map(String::from),
            sport: sport.to_string(),
            individual_name: individual.map(String::from),
        }
    }

    #[test]
    fn numbers_groups_by_ascending_id() {
        let rows = vec![
            row(169, Some("Gateway High School"), "basketball", None),
            row(167, Some("Gateway High School"), "basketball", None),
            row(170, Some("Gateway High School"), "basketball", None),
            row(168, Some("Gateway High School"), "basketball", None),
        ];
        let changes = individual_assignments(&rows);
        assert_eq!(
            changes,
            vec![
                (167, Some("Court 1".to_string())),
                (168, Some("Court 2".to_string())),
                (169, Some("Court 3".to_string())),
                (170, Some("Court 4".to_string())),
            ]
        );
    }

    #[test]
    fn rerun_on_assigned_rows_changes_nothing() {
        let rows = vec![
            row(167, Some("Gateway High School"), "basketball", Some("Court 1")),
            row(168, Some("Gateway High School"), "basketball", Some("Court 2")),
        ];
        assert!(individual_assignments(&rows).is_empty());
    }

    #[test]
    fn group_shrinking_to_one_clears_label() {
        let rows = vec![row(
            167,
            Some("Gateway High School"),
            "basketball",
            Some("Court 1"),
        )];
        assert_eq!(individual_assignments(&rows), vec![(167, None)]);
    }

    #[test]
    fn singleton_without_label_is_untouched() {
        let rows = vec![row(167, Some("Gateway High School"), "basketball", None)];
        assert!(individual_assignments(&rows).is_empty());
    }

    #[test]
    fn sports_number_independently_at_same_facility() {
        let rows = vec![
            row(1, Some("Dolores Park"), "basketball", None),
            row(2, Some("Dolores Park"), "tennis", None),
            row(3, Some("Dolores Park"), "tennis", None),
        ];
        let changes = individual_assignments(&rows);
        // Lone basketball court gets no number; the tennis pair does.
        assert_eq!(
            changes,
            vec![
                (2, Some("Court 1".to_string())),
                (3, Some("Court 2".to_string())),
            ]
        );
    }

    #[test]
    fn unresolved_rows_only_get_cleared() {
        let rows = vec![
            row(1, None, "basketball", Some("Court 1")),
            row(2, None, "basketball", None),
        ];
        assert_eq!(individual_assignments(&rows), vec![(1, None)]);
    }

    #[test]
    fn school_detection_prefers_tag_value() {
        assert!(is_school("school", None, "Anything"));
        assert!(is_school("reverse", Some("university"), "UCSF"));
        // Tag value overrides a school-looking name.
        assert!(!is_school("park", Some("park"), "School House Park"));
        // Keyword fallback when no tag value is known.
        assert!(is_school("building", None, "Lowell High School"));
        assert!(!is_school("building", None, "Moscone Recreation Center"));
    }
}
