//! Rewrite validation and sanitization.
//!
//! Diffs the entity sets of the original and rewritten text and collects
//! every discrepancy. Entity drift is a quality signal for human review,
//! not a hard failure: callers still use the sanitized text and record
//! the violations. Semantic misattribution between already-known entities
//! is outside what this check can see.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::entities::TextAnalyzer;

/// Outcome of validating a rewrite against its original.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub sanitized_text: String,
    pub violations: Vec<String>,
}

/// Boilerplate lines an LLM sometimes invents around a rewrite. Never
/// legitimate report content, stripped wherever they appear.
static FORBIDDEN_HEADINGS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^\s*(?:here is|below is) the (?:rewritten|reorganized|restructured)\b",
        r"(?i)^\s*as an ai\b",
        r"(?i)^\s*\[?end of (?:report|document|text)\]?\s*$",
        r"(?i)^\s*\(?continued (?:from|in) (?:the )?(?:previous|next)\b",
        r"(?i)^\s*note:\s*(?:this|the) (?:report|document|text) (?:has been|was) (?:rewritten|reorganized)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Validate `rewritten` against `original` and return the sanitized text.
///
/// All rules are checked and all findings collected; nothing
/// short-circuits. Sanitization is applied whether or not violations were
/// found.
pub fn validate_and_sanitize(
    analyzer: &dyn TextAnalyzer,
    original: &str,
    rewritten: &str,
) -> ValidationReport {
    let before = analyzer.extract(original);
    let after = analyzer.extract(rewritten);

    let mut violations = Vec::new();

    let fabricated_names: Vec<&str> = diff(&after.names, &before.names);
    if !fabricated_names.is_empty() {
        violations.push(format!(
            "names not present in original: {}",
            fabricated_names.join(", ")
        ));
    }

    let fabricated_roles: Vec<&str> = diff(&after.roles, &before.roles);
    if !fabricated_roles.is_empty() {
        violations.push(format!(
            "roles not present in original: {}",
            fabricated_roles.join(", ")
        ));
    }

    let fabricated_numbers: Vec<&str> = diff(&after.case_numbers, &before.case_numbers);
    if after.case_numbers.len() > before.case_numbers.len() || !fabricated_numbers.is_empty() {
        violations.push(format!(
            "case numbers fabricated or altered: {}",
            fabricated_numbers.join(", ")
        ));
    }

    let dropped_names: Vec<&str> = diff(&before.names, &after.names);
    if !dropped_names.is_empty() {
        violations.push(format!(
            "names missing from rewritten text: {}",
            dropped_names.join(", ")
        ));
    }

    let dropped_numbers: Vec<&str> = diff(&before.case_numbers, &after.case_numbers);
    if !dropped_numbers.is_empty() {
        violations.push(format!(
            "case numbers missing from rewritten text: {}",
            dropped_numbers.join(", ")
        ));
    }

    let fabricated_sections: Vec<&str> = diff(&after.sections, &before.sections);
    if !fabricated_sections.is_empty() {
        violations.push(format!(
            "section headings not present in original: {}",
            fabricated_sections.join(", ")
        ));
    }

    if has_duplicate_paragraphs(rewritten) {
        violations.push("duplicate paragraphs in rewritten text".to_string());
    }

    let mut sanitized = remove_duplicate_paragraphs(rewritten);
    sanitized = strip_forbidden_headings(&sanitized);
    if !violations.is_empty() {
        sanitized = strip_forbidden_headings(&sanitized);
    }

    ValidationReport {
        is_valid: violations.is_empty(),
        sanitized_text: sanitized,
        violations,
    }
}

fn diff<'a>(
    left: &'a std::collections::BTreeSet<String>,
    right: &'a std::collections::BTreeSet<String>,
) -> Vec<&'a str> {
    left.difference(right).map(String::as_str).collect()
}

fn paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_SPLIT_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn paragraph_hash(paragraph: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(paragraph.trim().as_bytes());
    hex::encode(hasher.finalize())
}

fn has_duplicate_paragraphs(text: &str) -> bool {
    let mut seen = HashSet::new();
    paragraphs(text)
        .iter()
        .any(|p| !seen.insert(paragraph_hash(p)))
}

/// Drop exact-duplicate paragraphs, keeping the first occurrence.
fn remove_duplicate_paragraphs(text: &str) -> String {
    let mut seen = HashSet::new();
    let kept: Vec<&str> = paragraphs(text)
        .into_iter()
        .filter(|p| seen.insert(paragraph_hash(p)))
        .collect();
    kept.join("\n\n")
}

fn strip_forbidden_headings(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !FORBIDDEN_HEADINGS.iter().any(|re| re.is_match(line)))
        .collect();
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::HeuristicAnalyzer;

    fn validate(original: &str, rewritten: &str) -> ValidationReport {
        validate_and_sanitize(&HeuristicAnalyzer, original, rewritten)
    }

    #[test]
    fn test_identity_rewrite_is_valid() {
        let text = "Case 1001. Complainant Ahmed Ali reported damage on 12/03/2024.";
        let report = validate(text, text);
        assert!(report.is_valid);
        assert!(report.violations.is_empty());
        assert_eq!(report.sanitized_text, text);
    }

    #[test]
    fn test_fabricated_name_is_flagged() {
        let original = "Case 1001. Reported by Ahmed Ali.";
        let rewritten = "Case 1001. Reported by Ahmed Ali. Witnessed by Sara Hassan.";
        let report = validate(original, rewritten);
        assert!(!report.is_valid);
        assert!(report
            .violations
            .iter()
            .any(|v| v.contains("Sara Hassan") && v.contains("not present in original")));
    }

    #[test]
    fn test_dropped_case_number_is_flagged() {
        let original = "Complaint filed under case number 2024-5001 by Ahmed Ali.";
        let rewritten = "Complaint filed by Ahmed Ali.";
        let report = validate(original, rewritten);
        assert!(!report.is_valid);
        assert!(report
            .violations
            .iter()
            .any(|v| v.contains("2024-5001") && v.contains("missing")));
    }

    #[test]
    fn test_fabricated_role_is_flagged() {
        let original = "Ahmed Ali filed the report.";
        let rewritten = "The complainant Ahmed Ali filed the report.";
        let report = validate(original, rewritten);
        assert!(report.violations.iter().any(|v| v.contains("complainant")));
    }

    #[test]
    fn test_duplicate_paragraphs_removed_and_flagged() {
        let original = "Ahmed Ali reported the theft.";
        let rewritten = "Ahmed Ali reported the theft.\n\nAhmed Ali reported the theft.";
        let report = validate(original, rewritten);
        assert!(!report.is_valid);
        assert!(report
            .violations
            .iter()
            .any(|v| v.contains("duplicate paragraphs")));
        assert_eq!(report.sanitized_text, "Ahmed Ali reported the theft.");
    }

    #[test]
    fn test_forbidden_headings_stripped_even_when_valid() {
        let original = "Ahmed Ali reported the theft.";
        let rewritten = "Here is the rewritten report:\nAhmed Ali reported the theft.";
        let report = validate(original, rewritten);
        assert!(!report.sanitized_text.contains("Here is the rewritten"));
        assert!(report.sanitized_text.contains("Ahmed Ali reported the theft."));
    }

    #[test]
    fn test_all_violations_collected() {
        let original = "Case 1001. Reported by Ahmed Ali.";
        let rewritten = "Reported by Sara Hassan.\n\nReported by Sara Hassan.";
        let report = validate(original, rewritten);
        // Fabricated name, dropped name, dropped case number, duplicates.
        assert!(report.violations.len() >= 4);
    }

    #[test]
    fn test_fabricated_section_is_flagged() {
        let original = "Ahmed Ali reported the theft.";
        let rewritten = "Summary:\nAhmed Ali reported the theft.";
        let report = validate(original, rewritten);
        assert!(report
            .violations
            .iter()
            .any(|v| v.contains("section headings") && v.contains("summary")));
    }
}
