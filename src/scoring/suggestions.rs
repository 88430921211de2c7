use std::collections::HashSet;

use super::{has_test_signal, is_security_rule};
use crate::types::review::{Issue, Metrics, SecurityFinding, Severity};

pub const FIX_SYNTAX: &str = "Fix the syntax error first so static analysis can run cleanly.";
pub const REMOVE_UNUSED_IMPORTS: &str = "Remove unused imports (ruff F401).";
pub const PEP8_SPACING: &str = "Apply PEP 8 spacing around functions/classes.";
pub const WRAP_LONG_LINES: &str = "Wrap long lines (E501) to improve readability.";
pub const REVIEW_SECURITY: &str = "Review potential security issues flagged by Bandit.";
pub const REDUCE_COMPLEXITY: &str = "Refactor large/nested functions to reduce cyclomatic complexity.";
pub const IMPROVE_MAINTAINABILITY: &str =
    "Increase maintainability: simplify logic, extract helpers, add docstrings.";
pub const HARDEN_SECURITY: &str = "Resolve Bandit MED/LOW findings as part of hardening.";
pub const ADD_TESTS: &str = "Add unit tests (pytest or unittest) for critical paths and edge cases.";
pub const LOOKS_GOOD: &str = "Looks good. Consider docstrings and a few tests to lock behavior in.";

const COMPLEXITY_THRESHOLD: f64 = 6.0;
const MAINTAINABILITY_THRESHOLD: f64 = 60.0;

/// Turn metrics and issues into actionable suggestions.
///
/// Rules are evaluated in a fixed order and each contributes at most one
/// line. The result is never empty.
pub fn build_suggestions(
    metrics: &Metrics,
    issues: &[Issue],
    findings: &[SecurityFinding],
    code: &str,
) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();
    let codes: HashSet<&str> = issues
        .iter()
        .map(|i| i.kind.as_str())
        .filter(|kind| !kind.is_empty())
        .collect();

    if issues.iter().any(Issue::is_syntax_error) {
        suggestions.push(FIX_SYNTAX.to_string());
    }
    if codes.contains("F401") {
        suggestions.push(REMOVE_UNUSED_IMPORTS.to_string());
    }
    if codes.contains("E302") || codes.contains("E305") {
        suggestions.push(PEP8_SPACING.to_string());
    }
    if codes.contains("E501") {
        suggestions.push(WRAP_LONG_LINES.to_string());
    }
    if codes.iter().any(|kind| is_security_rule(kind)) {
        suggestions.push(REVIEW_SECURITY.to_string());
    }

    if metrics
        .average_complexity
        .map_or(false, |avg| avg > COMPLEXITY_THRESHOLD)
    {
        suggestions.push(REDUCE_COMPLEXITY.to_string());
    }
    if metrics
        .maintainability_index
        .map_or(false, |mi| mi < MAINTAINABILITY_THRESHOLD)
    {
        suggestions.push(IMPROVE_MAINTAINABILITY.to_string());
    }

    let high = findings
        .iter()
        .filter(|f| f.severity == Severity::High)
        .count();
    if high > 0 {
        suggestions.push(format!(
            "Address {} HIGH-severity Bandit finding(s) immediately.",
            high
        ));
    } else if !findings.is_empty() {
        suggestions.push(HARDEN_SECURITY.to_string());
    }

    if !has_test_signal(code) {
        suggestions.push(ADD_TESTS.to_string());
    }

    if suggestions.is_empty() {
        suggestions.push(LOOKS_GOOD.to_string());
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(id: &str, severity: Severity) -> SecurityFinding {
        SecurityFinding {
            test_id: id.to_string(),
            detail: "finding".to_string(),
            line: Some(1),
            severity,
        }
    }

    #[test]
    fn test_clean_tested_code_gets_fallback() {
        let metrics = Metrics {
            maintainability_index: Some(100.0),
            average_complexity: Some(1.0),
            maximum_complexity: Some(1.0),
        };
        let suggestions = build_suggestions(&metrics, &[], &[], "import pytest\n");
        assert_eq!(suggestions, vec![LOOKS_GOOD.to_string()]);
    }

    #[test]
    fn test_untested_code_only_asks_for_tests() {
        let suggestions = build_suggestions(&Metrics::default(), &[], &[], "print(1)");
        assert_eq!(suggestions, vec![ADD_TESTS.to_string()]);
    }

    #[test]
    fn test_rules_fire_in_fixed_order() {
        let high = finding("B602", Severity::High);
        let issues = vec![
            Issue::new("SYNTAX_ERROR", "invalid syntax", Some(1)),
            Issue::new("E501", "Line too long", Some(2)),
            Issue::new("F401", "unused", Some(1)),
            Issue::new("E302", "expected 2 blank lines", Some(3)),
            Issue::new("E305", "expected 2 blank lines after", Some(5)),
            high.to_issue(),
        ];
        let metrics = Metrics {
            maintainability_index: Some(40.0),
            average_complexity: Some(7.5),
            maximum_complexity: Some(12.0),
        };
        let suggestions = build_suggestions(&metrics, &issues, &[high.clone(), high], "x = 1");
        assert_eq!(
            suggestions,
            vec![
                FIX_SYNTAX.to_string(),
                REMOVE_UNUSED_IMPORTS.to_string(),
                PEP8_SPACING.to_string(),
                WRAP_LONG_LINES.to_string(),
                REVIEW_SECURITY.to_string(),
                REDUCE_COMPLEXITY.to_string(),
                IMPROVE_MAINTAINABILITY.to_string(),
                "Address 2 HIGH-severity Bandit finding(s) immediately.".to_string(),
                ADD_TESTS.to_string(),
            ]
        );
    }

    #[test]
    fn test_low_findings_suggest_hardening() {
        let low = finding("B404", Severity::Low);
        let suggestions =
            build_suggestions(&Metrics::default(), &[low.to_issue()], &[low], "import unittest");
        assert_eq!(
            suggestions,
            vec![REVIEW_SECURITY.to_string(), HARDEN_SECURITY.to_string()]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let metrics = Metrics {
            maintainability_index: Some(60.0),
            average_complexity: Some(6.0),
            maximum_complexity: Some(6.0),
        };
        let suggestions = build_suggestions(&metrics, &[], &[], "import pytest");
        assert_eq!(suggestions, vec![LOOKS_GOOD.to_string()]);
    }

    #[test]
    fn test_tool_diagnostics_do_not_trigger_security_rule() {
        let issues = vec![
            Issue::new("BANDIT_MISSING", "bandit not installed", None),
            Issue::new("RUFF_MISSING", "ruff not installed", None),
        ];
        let suggestions = build_suggestions(&Metrics::default(), &issues, &[], "import pytest");
        assert_eq!(suggestions, vec![LOOKS_GOOD.to_string()]);
    }
}
