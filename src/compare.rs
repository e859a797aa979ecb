//! Output verification: match verdict, similarity score and a human-readable
//! explanation for a given comparison mode.

use similar::TextDiff;

use crate::domain::Comparison;

/// Fuzzy mode accepts outputs at or above this similarity ratio.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.8;

/// Mismatch details quote at most this many characters of each side.
const PREVIEW_LIMIT: usize = 200;

/// Compares actual against expected output under the given mode.
///
/// Both sides are trimmed of leading/trailing whitespace first, so a trailing
/// newline never causes a spurious mismatch. An unrecognized mode yields a
/// non-match with an explanatory detail rather than an error.
pub fn compare_outputs(actual: &str, expected: &str, mode: &str) -> Comparison {
    let actual = actual.trim();
    let expected = expected.trim();

    let mut comparison = Comparison {
        mode: mode.to_string(),
        matched: false,
        similarity: 0.0,
        details: String::new(),
    };

    match mode {
        "exact" => {
            comparison.matched = actual == expected;
            comparison.similarity = if comparison.matched { 1.0 } else { 0.0 };
            comparison.details = if comparison.matched {
                "Output matches exactly".to_string()
            } else {
                mismatch_details(actual, expected)
            };
        }
        "fuzzy" => {
            let similarity = similarity_ratio(actual, expected);
            comparison.similarity = similarity;
            comparison.matched = similarity >= FUZZY_MATCH_THRESHOLD;
            comparison.details = if comparison.matched {
                format!("Output matches with {:.1}% similarity", similarity * 100.0)
            } else {
                format!(
                    "Output only {:.1}% similar, expected at least {:.0}%",
                    similarity * 100.0,
                    FUZZY_MATCH_THRESHOLD * 100.0
                )
            };
        }
        "contains" => {
            // Containment is binary; similarity stays at its default.
            comparison.matched = actual.contains(expected);
            comparison.details = if comparison.matched {
                "Output contains expected text".to_string()
            } else {
                format!("Output does not contain expected text: '{expected}'")
            };
        }
        other => {
            comparison.details = format!("Unknown comparison mode: {other}");
        }
    }

    comparison
}

/// Normalized longest-matching-block similarity in [0, 1], the same ratio
/// family as Python's `difflib.SequenceMatcher`.
fn similarity_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    f64::from(TextDiff::from_chars(a, b).ratio())
}

fn mismatch_details(actual: &str, expected: &str) -> String {
    let similarity = similarity_ratio(actual, expected);
    format!(
        "Output does not match\n\nExpected:\n{}\n\nGot:\n{}\n\nSimilarity: {:.1}%",
        preview(expected),
        preview(actual),
        similarity * 100.0
    )
}

/// First [`PREVIEW_LIMIT`] characters, with an ellipsis when truncated.
fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LIMIT {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(PREVIEW_LIMIT).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_reflexive() {
        for text in ["", "4", "hello world", "line\nline"] {
            let comparison = compare_outputs(text, text, "exact");
            assert!(comparison.matched, "{text:?} did not match itself");
            assert_eq!(comparison.similarity, 1.0);
        }
    }

    #[test]
    fn exact_ignores_surrounding_whitespace() {
        let comparison = compare_outputs("hi\n", "  hi  ", "exact");
        assert!(comparison.matched);
    }

    #[test]
    fn exact_mismatch_reports_both_sides() {
        let comparison = compare_outputs("got this", "wanted that", "exact");
        assert!(!comparison.matched);
        assert_eq!(comparison.similarity, 0.0);
        assert!(comparison.details.contains("Expected:\nwanted that"));
        assert!(comparison.details.contains("Got:\ngot this"));
        assert!(comparison.details.contains("Similarity:"));
    }

    #[test]
    fn exact_mismatch_truncates_long_previews() {
        let long = "x".repeat(500);
        let comparison = compare_outputs(&long, "short", "exact");
        assert!(comparison.details.contains(&format!("{}...", "x".repeat(200))));
        assert!(!comparison.details.contains(&"x".repeat(201)));
    }

    #[test]
    fn fuzzy_accepts_near_identical_strings() {
        let comparison = compare_outputs("hello world!", "hello world", "fuzzy");
        assert!(comparison.matched);
        assert!(comparison.similarity >= FUZZY_MATCH_THRESHOLD);
        assert!(comparison.details.contains("similarity"));
    }

    #[test]
    fn fuzzy_identical_strings_score_one() {
        let comparison = compare_outputs("same", "same", "fuzzy");
        assert!(comparison.matched);
        assert!((comparison.similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fuzzy_rejects_disjoint_strings() {
        let comparison = compare_outputs("aaaaaaaa", "zzzzzzzz", "fuzzy");
        assert!(!comparison.matched);
        assert!(comparison.similarity < 0.1);
        assert!(comparison.details.contains("at least 80%"));
    }

    #[test]
    fn contains_finds_substring() {
        let comparison = compare_outputs("hello world", "world", "contains");
        assert!(comparison.matched);
        assert_eq!(comparison.similarity, 0.0);
    }

    #[test]
    fn contains_rejects_missing_substring() {
        let comparison = compare_outputs("hello", "world", "contains");
        assert!(!comparison.matched);
        assert!(comparison.details.contains("'world'"));
    }

    #[test]
    fn unknown_mode_reports_the_mode() {
        let comparison = compare_outputs("a", "a", "approximate");
        assert!(!comparison.matched);
        assert_eq!(comparison.details, "Unknown comparison mode: approximate");
    }
}
