use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{tool_failure_issue, unexpected_exit_issue, AnalysisReport, Analyzer, SourceFile, ToolCommand};
use crate::types::review::{SecurityFinding, Severity};

const ISSUE_PREFIX: &str = "BANDIT";

/// Top-level `bandit -f json` document.
#[derive(Debug, Deserialize)]
struct BanditReport {
    #[serde(default)]
    results: Option<Vec<BanditResult>>,
}

#[derive(Debug, Deserialize)]
struct BanditResult {
    test_id: Option<String>,
    issue_text: Option<String>,
    line_number: Option<u32>,
    issue_severity: Option<String>,
}

/// Security scan adapter backed by `bandit`.
///
/// Each finding is kept as a [`SecurityFinding`] and also projected into
/// the issue list with its rule id as the category.
pub struct BanditAnalyzer {
    program: String,
    timeout: Duration,
}

impl BanditAnalyzer {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl Analyzer for BanditAnalyzer {
    fn name(&self) -> &'static str {
        "bandit"
    }

    async fn analyze(&self, source: &SourceFile) -> AnalysisReport {
        let command = ToolCommand::new(self.program.as_str(), self.timeout)
            .arg("-q")
            .arg("-f")
            .arg("json")
            .arg(source.path());

        let output = match command.run().await {
            Ok(output) => output,
            Err(e) => return AnalysisReport::from_issues(vec![tool_failure_issue(ISSUE_PREFIX, &e)]),
        };

        // 0 = no issues, 1 = issues found
        if !output.exited_with(&[0, 1]) {
            return AnalysisReport::from_issues(vec![unexpected_exit_issue(
                ISSUE_PREFIX,
                "bandit",
                &output,
            )]);
        }

        let findings = match parse_results(&output.stdout) {
            Ok(findings) => findings,
            Err(e) => {
                tracing::warn!("Failed to parse bandit output: {}", e);
                Vec::new()
            }
        };

        AnalysisReport {
            issues: findings.iter().map(SecurityFinding::to_issue).collect(),
            findings,
            ..AnalysisReport::default()
        }
    }
}

/// Normalize bandit JSON into security findings.
pub fn parse_results(stdout: &str) -> Result<Vec<SecurityFinding>, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let report: BanditReport = serde_json::from_str(stdout)?;
    Ok(report
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|r| SecurityFinding {
            test_id: r.test_id.unwrap_or_else(|| "BANDIT".to_string()),
            detail: r
                .issue_text
                .unwrap_or_else(|| "Potential security issue".to_string()),
            line: r.line_number,
            severity: Severity::parse(r.issue_severity.as_deref().unwrap_or_default()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::review::Issue;

    #[test]
    fn test_parse_results() {
        let stdout = r#"{
            "errors": [],
            "generated_at": "2025-01-01T00:00:00Z",
            "metrics": {},
            "results": [
                {"code": "1 import subprocess\n", "filename": "/tmp/s.py", "issue_confidence": "HIGH",
                 "issue_severity": "LOW", "issue_text": "Consider possible security implications associated with the subprocess module.",
                 "line_number": 1, "test_id": "B404", "test_name": "blacklist"},
                {"issue_severity": "HIGH", "issue_text": "subprocess call with shell=True identified, security issue.",
                 "line_number": 3, "test_id": "B602"}
            ]
        }"#;
        let findings = parse_results(stdout).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].test_id, "B404");
        assert_eq!(findings[0].severity, Severity::Low);
        assert_eq!(findings[1].severity, Severity::High);
        assert_eq!(
            findings[1].to_issue(),
            Issue::new(
                "B602",
                "subprocess call with shell=True identified, security issue.",
                Some(3)
            )
        );
    }

    #[test]
    fn test_parse_results_defaults() {
        let findings = parse_results(r#"{"results": [{}]}"#).unwrap();
        assert_eq!(findings[0].test_id, "BANDIT");
        assert_eq!(findings[0].detail, "Potential security issue");
        assert_eq!(findings[0].severity, Severity::Unknown);

        assert!(parse_results(r#"{"results": null}"#).unwrap().is_empty());
        assert!(parse_results("").unwrap().is_empty());
        assert!(parse_results("{").is_err());
    }

    #[tokio::test]
    async fn test_missing_bandit_yields_single_issue() {
        let analyzer = BanditAnalyzer::new("__missing_bandit__", Duration::from_secs(5));
        let source = SourceFile::create("import subprocess\n").unwrap();
        let report = analyzer.analyze(&source).await;
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, "BANDIT_MISSING");
        assert!(report.findings.is_empty());
    }
}
