use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{tool_failure_issue, unexpected_exit_issue, AnalysisReport, Analyzer, SourceFile, ToolCommand};
use crate::types::review::Issue;

const ISSUE_PREFIX: &str = "RUFF";

/// One entry of `ruff check --output-format json`.
#[derive(Debug, Deserialize)]
struct RuffFinding {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    location: Option<RuffLocation>,
}

#[derive(Debug, Deserialize)]
struct RuffLocation {
    row: Option<u32>,
}

/// Lint adapter backed by `ruff`.
pub struct RuffAnalyzer {
    program: String,
    timeout: Duration,
}

impl RuffAnalyzer {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl Analyzer for RuffAnalyzer {
    fn name(&self) -> &'static str {
        "ruff"
    }

    async fn analyze(&self, source: &SourceFile) -> AnalysisReport {
        let command = ToolCommand::new(self.program.as_str(), self.timeout)
            .arg("check")
            .arg(source.path())
            .arg("--output-format")
            .arg("json");

        let output = match command.run().await {
            Ok(output) => output,
            Err(e) => return AnalysisReport::from_issues(vec![tool_failure_issue(ISSUE_PREFIX, &e)]),
        };

        // 0 = clean, 1 = findings, anything else is an internal error
        if !output.exited_with(&[0, 1]) {
            return AnalysisReport::from_issues(vec![unexpected_exit_issue(
                ISSUE_PREFIX,
                "ruff",
                &output,
            )]);
        }

        match parse_findings(&output.stdout) {
            Ok(issues) => AnalysisReport::from_issues(issues),
            Err(e) => {
                tracing::warn!("Failed to parse ruff output: {}", e);
                AnalysisReport::default()
            }
        }
    }
}

/// Normalize ruff JSON into issues. Blank output means no findings.
pub fn parse_findings(stdout: &str) -> Result<Vec<Issue>, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    let findings: Vec<RuffFinding> = serde_json::from_str(stdout)?;
    Ok(findings
        .into_iter()
        .map(|f| {
            Issue::new(
                f.code.unwrap_or_else(|| "RUFF".to_string()),
                f.message.unwrap_or_else(|| "Lint".to_string()),
                f.location.and_then(|loc| loc.row),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_findings() {
        let stdout = r#"[
            {"code": "F401", "message": "`os` imported but unused", "location": {"row": 1, "column": 8},
             "filename": "/tmp/snippet.py", "fix": null, "url": "https://docs.astral.sh/ruff/rules/unused-import"},
            {"code": "E501", "message": "Line too long (120 > 88)", "location": {"row": 4, "column": 89}}
        ]"#;
        let issues = parse_findings(stdout).unwrap();
        assert_eq!(
            issues,
            vec![
                Issue::new("F401", "`os` imported but unused", Some(1)),
                Issue::new("E501", "Line too long (120 > 88)", Some(4)),
            ]
        );
    }

    #[test]
    fn test_parse_findings_defaults() {
        let issues = parse_findings(r#"[{"code": null, "location": null}]"#).unwrap();
        assert_eq!(issues, vec![Issue::new("RUFF", "Lint", None)]);
    }

    #[test]
    fn test_parse_blank_and_invalid_output() {
        assert!(parse_findings("  \n").unwrap().is_empty());
        assert!(parse_findings("[]").unwrap().is_empty());
        assert!(parse_findings("not json").is_err());
    }

    #[tokio::test]
    async fn test_missing_ruff_yields_single_issue() {
        let analyzer = RuffAnalyzer::new("__missing_ruff__", Duration::from_secs(5));
        let source = SourceFile::create("import os\n").unwrap();
        let report = analyzer.analyze(&source).await;
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, "RUFF_MISSING");
        assert!(report.findings.is_empty());
    }
}
