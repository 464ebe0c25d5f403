//! Name-quality filters for facility candidates.
//!
//! Search APIs happily return street fragments, bare house numbers, and
//! placeholder names. Two gates keep those out of the results:
//!
//! - [`is_high_quality_name`] — the baseline filter every candidate
//!   must pass: minimum length, no generic/street-suffix words, not
//!   mostly digits.
//! - [`has_facility_keyword`] — the stricter confidence filter used by
//!   the facility-priority categories: the name must also contain a
//!   recreational or institutional keyword.

use regex::Regex;
use std::sync::LazyLock;

/// Generic and street-suffix words that disqualify a name.
///
/// Matched on word boundaries so that e.g. "Gateway High School" is not
/// rejected by "way".
static GENERIC_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(unnamed|street|avenue|road|way|drive|boulevard|lane|alley|highway|terrace)\b",
    )
    .expect("valid regex")
});

/// Recreational/institutional keywords a confident facility name
/// contains at least one of.
static FACILITY_KEYWORDS: &[&str] = &[
    "park",
    "playground",
    "recreation",
    "community",
    "center",
    "centre",
    "sports",
    "athletic",
    "gym",
    "fitness",
    "school",
    "university",
    "college",
    "academy",
    "club",
    "ymca",
    "church",
    "temple",
    "field",
    "stadium",
    "arena",
];

/// Minimum length for a usable name.
const MIN_NAME_LEN: usize = 3;

/// Returns whether a candidate name is usable at all.
///
/// Rejects names that are too short, contain a generic/street-suffix
/// word, or are more than half digits.
#[must_use]
pub fn is_high_quality_name(name: &str) -> bool {
    let trimmed = name.trim();

    if trimmed.len() < MIN_NAME_LEN {
        return false;
    }

    if GENERIC_NAME_RE.is_match(trimmed) {
        return false;
    }

    let total = trimmed.chars().filter(|c| !c.is_whitespace()).count();
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    if total > 0 && digits * 2 > total {
        return false;
    }

    true
}

/// Returns whether a name contains a recreational or institutional
/// keyword.
///
/// Names failing this are not treated as confident facility matches
/// even when superficially well-formed.
#[must_use]
pub fn has_facility_keyword(name: &str) -> bool {
    let lower = name.to_lowercase();
    FACILITY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_facility_names() {
        assert!(is_high_quality_name("Dolores Park"));
        assert!(is_high_quality_name("Gateway High School"));
        assert!(is_high_quality_name("Moscone Recreation Center"));
    }

    #[test]
    fn rejects_street_names() {
        assert!(!is_high_quality_name("Main Street"));
        assert!(!is_high_quality_name("Fifth Avenue"));
        assert!(!is_high_quality_name("Appian Way"));
        assert!(!is_high_quality_name("unnamed road"));
    }

    #[test]
    fn street_suffixes_match_whole_words_only() {
        // "Gateway" contains "way" and "Broadway Park" contains "road"
        // as substrings; neither is a street name.
        assert!(is_high_quality_name("Gateway High School"));
        assert!(is_high_quality_name("Broadway Playground"));
    }

    #[test]
    fn rejects_short_and_numeric_names() {
        assert!(!is_high_quality_name(""));
        assert!(!is_high_quality_name("ab"));
        assert!(!is_high_quality_name("12345"));
        assert!(!is_high_quality_name("100 12"));
    }

    #[test]
    fn accepts_names_with_some_digits() {
        assert!(is_high_quality_name("Pier 39 Sports Club"));
    }

    #[test]
    fn facility_keyword_filter() {
        assert!(has_facility_keyword("Jackson Playground Park"));
        assert!(has_facility_keyword("Gateway High School"));
        assert!(has_facility_keyword("Mission Community Centre"));
        assert!(has_facility_keyword("24 Hour Fitness"));
        assert!(!has_facility_keyword("Flour + Water"));
        assert!(!has_facility_keyword("Corner Store"));
    }
}
