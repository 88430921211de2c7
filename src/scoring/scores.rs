use super::{has_test_signal, round_score};
use crate::types::review::{Issue, Metrics, ScoreSet, SecurityFinding};

/// Security score ceiling: zero findings is never a guarantee of safety.
pub const SECURITY_CEILING: u32 = 95;
/// Security score left when the code does not parse but the scanner still flagged something.
const SYNTAX_ERROR_SECURITY: u8 = 30;

const TESTED: u8 = 80;
const UNTESTED: u8 = 20;

/// Step function over average cyclomatic complexity. Upper bounds are inclusive.
const COMPLEXITY_BUCKETS: [(f64, u8); 4] = [(1.0, 95), (3.0, 85), (6.0, 70), (10.0, 55)];
const COMPLEXITY_FLOOR: u8 = 35;

/// Build the four 0-100 scores.
///
/// Unparsable code scores zero everywhere except security, which keeps 30
/// when the scanner still reported findings.
pub fn score_from(
    metrics: &Metrics,
    issues: &[Issue],
    findings: &[SecurityFinding],
    code: &str,
) -> ScoreSet {
    if issues.iter().any(Issue::is_syntax_error) {
        return ScoreSet {
            readability: 0,
            complexity: 0,
            security: if findings.is_empty() { 0 } else { SYNTAX_ERROR_SECURITY },
            testing: 0,
        };
    }

    ScoreSet {
        readability: readability_score(metrics.maintainability_index),
        complexity: complexity_score(metrics.average_complexity),
        security: security_score(findings),
        testing: testing_score(code),
    }
}

pub fn readability_score(maintainability_index: Option<f64>) -> u8 {
    maintainability_index.map_or(0, |mi| round_score(mi, 100.0))
}

pub fn complexity_score(average_complexity: Option<f64>) -> u8 {
    let Some(average) = average_complexity else {
        return 0;
    };
    COMPLEXITY_BUCKETS
        .iter()
        .find(|(upper, _)| average <= *upper)
        .map_or(COMPLEXITY_FLOOR, |(_, score)| *score)
}

pub fn security_score(findings: &[SecurityFinding]) -> u8 {
    let penalty: u32 = findings.iter().map(|f| f.severity.penalty()).sum();
    SECURITY_CEILING.saturating_sub(penalty) as u8
}

pub fn testing_score(code: &str) -> u8 {
    if has_test_signal(code) {
        TESTED
    } else {
        UNTESTED
    }
}
