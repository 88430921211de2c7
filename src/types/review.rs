use serde::{Deserialize, Serialize};

/// Issue category emitted by the syntax check.
pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";

/// A single normalized finding attached to an optional line number.
///
/// Every analyzer (syntax check, lint, metrics, security) reports through
/// this shape so the scoring code never sees tool-specific output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Category code, e.g. `F401`, `B602`, `SYNTAX_ERROR`, `RUFF_MISSING`
    #[serde(rename = "type")]
    pub kind: String,
    /// Human readable message
    pub detail: String,
    /// 1-based line number, when known
    pub line: Option<u32>,
}

impl Issue {
    pub fn new(kind: impl Into<String>, detail: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            kind: kind.into(),
            detail: detail.into(),
            line,
        }
    }

    pub fn is_syntax_error(&self) -> bool {
        self.kind == SYNTAX_ERROR
    }
}

/// Maintainability and complexity metrics for one submission.
///
/// `None` means the metric is unavailable (tool missing or failed), which is
/// different from a measured value of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub maintainability_index: Option<f64>,
    pub average_complexity: Option<f64>,
    pub maximum_complexity: Option<f64>,
}

impl Metrics {
    /// Overlay the values measured in `other` on top of `self`.
    pub fn merge(&mut self, other: Metrics) {
        if other.maintainability_index.is_some() {
            self.maintainability_index = other.maintainability_index;
        }
        if other.average_complexity.is_some() {
            self.average_complexity = other.average_complexity;
        }
        if other.maximum_complexity.is_some() {
            self.maximum_complexity = other.maximum_complexity;
        }
    }
}

/// Severity reported by the security scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    /// Case-insensitive parse; anything unrecognised maps to `Unknown`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Severity::High,
            "MEDIUM" => Severity::Medium,
            "LOW" => Severity::Low,
            _ => Severity::Unknown,
        }
    }

    /// Points deducted from the security score for one finding.
    pub fn penalty(self) -> u32 {
        match self {
            Severity::High => 20,
            Severity::Medium => 10,
            Severity::Low | Severity::Unknown => 5,
        }
    }
}

/// A finding from the security scanner, kept alongside its projected `Issue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub test_id: String,
    pub detail: String,
    pub line: Option<u32>,
    pub severity: Severity,
}

impl SecurityFinding {
    pub fn to_issue(&self) -> Issue {
        Issue::new(self.test_id.clone(), self.detail.clone(), self.line)
    }
}

/// Four independent scores in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub readability: u8,
    pub complexity: u8,
    pub security: u8,
    pub testing: u8,
}

/// Body of `POST /review`. Every field is optional so that malformed or
/// partial payloads still reach validation instead of being rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewRequest {
    pub filename: Option<String>,
    pub code: Option<String>,
}

/// Full response for one review request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub summary: String,
    pub issues: Vec<Issue>,
    pub scores: ScoreSet,
    pub output: String,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_serializes_type_field() {
        let issue = Issue::new("F401", "`os` imported but unused", Some(1));
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "F401");
        assert_eq!(value["line"], 1);

        let no_line = serde_json::to_value(Issue::new("RUFF_MISSING", "ruff not installed", None)).unwrap();
        assert!(no_line["line"].is_null());
    }

    #[test]
    fn test_severity_parse_and_penalty() {
        assert_eq!(Severity::parse("high"), Severity::High);
        assert_eq!(Severity::parse(" MEDIUM "), Severity::Medium);
        assert_eq!(Severity::parse("Low"), Severity::Low);
        assert_eq!(Severity::parse(""), Severity::Unknown);
        assert_eq!(Severity::parse("critical"), Severity::Unknown);

        assert_eq!(Severity::High.penalty(), 20);
        assert_eq!(Severity::Medium.penalty(), 10);
        assert_eq!(Severity::Unknown.penalty(), 5);
    }

    #[test]
    fn test_metrics_merge_keeps_existing_values() {
        let mut metrics = Metrics {
            maintainability_index: Some(70.0),
            ..Metrics::default()
        };
        metrics.merge(Metrics {
            maintainability_index: None,
            average_complexity: Some(2.0),
            maximum_complexity: Some(3.0),
        });
        assert_eq!(metrics.maintainability_index, Some(70.0));
        assert_eq!(metrics.average_complexity, Some(2.0));
        assert_eq!(metrics.maximum_complexity, Some(3.0));
    }

    #[test]
    fn test_review_request_tolerates_missing_fields() {
        let request: ReviewRequest = serde_json::from_str("{}").unwrap();
        assert!(request.code.is_none());
        assert!(request.filename.is_none());
    }
}
