//! Heuristic entity extraction over investigation-report text.
//!
//! Deliberately conservative: the validator flags entities that appear on
//! only one side of a rewrite, so a false negative here is cheaper than a
//! false positive (over-extraction in the original would surface as a
//! spurious "new entity" in the rewritten text).

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Entities extracted from one text, grouped by category.
///
/// Ordered sets: extraction over identical text yields an identical set,
/// and iteration order is stable for violation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    pub names: BTreeSet<String>,
    pub roles: BTreeSet<String>,
    pub case_numbers: BTreeSet<String>,
    pub dates: BTreeSet<String>,
    pub times: BTreeSet<String>,
    pub national_ids: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub sections: BTreeSet<String>,
}

/// Swappable extraction capability. The validator depends only on this,
/// so a dictionary or model-based analyzer can replace the regex one
/// without touching the diff logic.
pub trait TextAnalyzer: Send + Sync {
    fn extract(&self, text: &str) -> EntitySet;
}

/// Regex and fixed-vocabulary analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl TextAnalyzer for HeuristicAnalyzer {
    fn extract(&self, text: &str) -> EntitySet {
        let mut set = EntitySet::default();
        extract_names(text, &mut set.names);
        extract_roles(text, &mut set.roles);
        extract_case_numbers(text, &mut set.case_numbers);
        extract_dates(text, &mut set.dates);
        extract_times(text, &mut set.times);
        extract_national_ids(text, &mut set.national_ids);
        extract_locations(text, &mut set.locations);
        extract_sections(text, &mut set.sections);
        set
    }
}

/// Institutional and legal terms that disqualify a capitalized sequence
/// from being treated as a personal name.
static NAME_EXCLUSIONS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        "ministry", "court", "police", "station", "prosecution", "office",
        "department", "directorate", "interior", "justice", "public",
        "general", "state", "republic", "national", "criminal",
        "investigation", "report", "case", "district", "governorate",
        "security", "forces", "bureau", "unit",
    ]
    .into_iter()
    .collect()
});

/// Investigative role words, word-boundary matched.
const ROLE_WORDS: &[&str] = &[
    "complainant", "defendant", "witness", "suspect", "victim", "accused",
    "plaintiff", "officer", "investigator", "prosecutor", "guardian",
    "detainee",
];

/// Section heading words, matched only at the start of a line.
const SECTION_WORDS: &[&str] = &[
    "summary", "parties", "scene", "statements", "damages", "findings",
    "evidence", "conclusion", "decisions", "incident", "signatures",
    "appendices",
];

/// Words that never follow a locative preposition as a place name.
static LOCATION_EXCLUSIONS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    let mut set: BTreeSet<&'static str> =
        ["the", "this", "that", "these", "those", "a", "an", "his", "her", "their"]
            .into_iter()
            .collect();
    set.extend(ROLE_WORDS.iter().copied());
    set
});

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,4}\b").unwrap());

static ROLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b(?:{})\b", ROLE_WORDS.join("|"))).unwrap());

static CASE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:case|report|complaint|record)\s*(?:no\.?|number|#)?\s*:?\s*(\d[\d/-]*\d|\d)\b")
        .unwrap()
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d{1,2}[-/]\d{1,2}[-/]\d{2,4}|\d{4}[-/]\d{1,2}[-/]\d{1,2})\b").unwrap()
});

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}:\d{2}(?::\d{2})?\b").unwrap());

static NATIONAL_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{9,12}\b").unwrap());

static LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:in|at|near|In|At|Near)\s+([A-Z][a-z]+)\b").unwrap());

fn extract_names(text: &str, out: &mut BTreeSet<String>) {
    for m in NAME_RE.find_iter(text) {
        let candidate = m.as_str();
        let excluded = candidate
            .split_whitespace()
            .any(|w| NAME_EXCLUSIONS.contains(w.to_lowercase().as_str()));
        if !excluded {
            out.insert(candidate.to_string());
        }
    }
}

fn extract_roles(text: &str, out: &mut BTreeSet<String>) {
    for m in ROLE_RE.find_iter(text) {
        out.insert(m.as_str().to_lowercase());
    }
}

fn extract_case_numbers(text: &str, out: &mut BTreeSet<String>) {
    for cap in CASE_NUMBER_RE.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            out.insert(m.as_str().to_string());
        }
    }
}

fn extract_dates(text: &str, out: &mut BTreeSet<String>) {
    for m in DATE_RE.find_iter(text) {
        out.insert(m.as_str().to_string());
    }
}

fn extract_times(text: &str, out: &mut BTreeSet<String>) {
    for m in TIME_RE.find_iter(text) {
        out.insert(m.as_str().to_string());
    }
}

fn extract_national_ids(text: &str, out: &mut BTreeSet<String>) {
    for m in NATIONAL_ID_RE.find_iter(text) {
        out.insert(m.as_str().to_string());
    }
}

fn extract_locations(text: &str, out: &mut BTreeSet<String>) {
    for cap in LOCATION_RE.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let token = m.as_str();
            if !LOCATION_EXCLUSIONS.contains(token.to_lowercase().as_str()) {
                out.insert(token.to_string());
            }
        }
    }
}

fn extract_sections(text: &str, out: &mut BTreeSet<String>) {
    for line in text.lines() {
        let trimmed = line.trim();
        let Some(first) = trimmed.split_whitespace().next() else {
            continue;
        };
        let word = first.trim_end_matches(':').to_lowercase();
        if SECTION_WORDS.contains(&word.as_str()) {
            out.insert(word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> EntitySet {
        HeuristicAnalyzer.extract(text)
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "Case 1001. Complainant Ahmed Ali reported the incident \
                    on 12/03/2024 at 14:30 in Cairo. National id 298051234567.";
        assert_eq!(extract(text), extract(text));
    }

    #[test]
    fn test_names_respect_exclusion_vocabulary() {
        let text = "Ahmed Ali appeared before the Public Prosecution Office. \
                    The Police Station referred the file to Sara Hassan.";
        let set = extract(text);
        assert!(set.names.contains("Ahmed Ali"));
        assert!(set.names.contains("Sara Hassan"));
        assert!(!set.names.iter().any(|n| n.contains("Prosecution")));
        assert!(!set.names.iter().any(|n| n.contains("Police")));
    }

    #[test]
    fn test_single_capitalized_word_is_not_a_name() {
        let set = extract("Reported by telephone. Ahmed Ali confirmed.");
        assert!(!set.names.contains("Reported"));
        assert!(set.names.contains("Ahmed Ali"));
    }

    #[test]
    fn test_roles_word_boundary_case_insensitive() {
        let set = extract("The Complainant and a witness were present. Witnessed later.");
        assert!(set.roles.contains("complainant"));
        assert!(set.roles.contains("witness"));
        assert_eq!(set.roles.len(), 2);
    }

    #[test]
    fn test_case_numbers_require_label() {
        let set = extract("Case 1001 was merged with case number 2024-5001. Amount 3500 paid.");
        assert!(set.case_numbers.contains("1001"));
        assert!(set.case_numbers.contains("2024-5001"));
        assert!(!set.case_numbers.contains("3500"));
    }

    #[test]
    fn test_dates_and_times() {
        let set = extract("Seen on 12/03/2024 and again on 2024-03-14 at 09:15:30.");
        assert!(set.dates.contains("12/03/2024"));
        assert!(set.dates.contains("2024-03-14"));
        assert!(set.times.contains("09:15:30"));
    }

    #[test]
    fn test_national_ids_are_9_to_12_digits() {
        let set = extract("Ids 123456789 and 298051234567 match; 12345678 and 1234567890123 do not.");
        assert!(set.national_ids.contains("123456789"));
        assert!(set.national_ids.contains("298051234567"));
        assert!(!set.national_ids.contains("12345678"));
        assert!(!set.national_ids.iter().any(|id| id.len() > 12));
    }

    #[test]
    fn test_locations_follow_prepositions() {
        let set = extract("The incident occurred in Alexandria, near the station. At the scene.");
        assert!(set.locations.contains("Alexandria"));
        assert!(!set.locations.iter().any(|l| l.eq_ignore_ascii_case("the")));
    }

    #[test]
    fn test_sections_match_line_start_only() {
        let text = "Statements:\nThe witness spoke about the evidence found.\nEvidence\n";
        let set = extract(text);
        assert!(set.sections.contains("statements"));
        assert!(set.sections.contains("evidence"));
        assert!(!set.sections.contains("witness"));
    }
}
