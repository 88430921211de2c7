//! Adapters for the external analysis tools.
//!
//! Each adapter implements [`Analyzer`] and hides its tool's native output
//! behind the normalized [`Issue`], [`Metrics`] and [`SecurityFinding`]
//! shapes. Adapters never fail a review: a missing tool becomes a
//! `<TOOL>_MISSING` issue, a crash or timeout a `<TOOL>_ERROR` issue. The
//! syntax check is the exception: without a usable interpreter it falls back
//! to the in-process grammar.

pub mod bandit;
pub mod process;
pub mod radon;
pub mod ruff;
pub mod syntax;

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::config::ToolsConfig;
use crate::errors::ToolError;
use crate::types::review::{Issue, Metrics, SecurityFinding};

pub use bandit::BanditAnalyzer;
pub use process::{ToolCommand, ToolOutput};
pub use radon::RadonAnalyzer;
pub use ruff::RuffAnalyzer;
pub use syntax::SyntaxAnalyzer;

/// Submitted source written to a temporary `.py` file.
///
/// The file is removed when the value is dropped, on every exit path.
#[derive(Debug)]
pub struct SourceFile {
    code: String,
    file: NamedTempFile,
}

impl SourceFile {
    pub fn create(code: &str) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("snippet-")
            .suffix(".py")
            .tempfile()?;
        file.write_all(code.as_bytes())?;
        file.flush()?;
        Ok(Self {
            code: code.to_string(),
            file,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Path as the tools print it back in their JSON keys.
    pub fn path_key(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }
}

/// Normalized output of one or more analyzers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub issues: Vec<Issue>,
    pub metrics: Metrics,
    pub findings: Vec<SecurityFinding>,
}

impl AnalysisReport {
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            ..Self::default()
        }
    }

    /// Append `other`, preserving issue order.
    pub fn merge(&mut self, other: AnalysisReport) {
        self.issues.extend(other.issues);
        self.metrics.merge(other.metrics);
        self.findings.extend(other.findings);
    }
}

/// Shared capability of every analysis step.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn analyze(&self, source: &SourceFile) -> AnalysisReport;
}

/// Issue describing why `tool` could not produce results.
pub fn tool_failure_issue(prefix: &str, error: &ToolError) -> Issue {
    match error {
        ToolError::Missing { program } => Issue::new(
            format!("{}_MISSING", prefix),
            format!("{} not installed", program),
            None,
        ),
        other => Issue::new(format!("{}_ERROR", prefix), other.to_string(), None),
    }
}

/// Issue for a tool that ran but exited with an unexpected status.
pub fn unexpected_exit_issue(prefix: &str, tool: &str, output: &ToolOutput) -> Issue {
    let stderr = output.stderr.trim();
    let detail = if stderr.is_empty() {
        format!("{} failed", tool)
    } else {
        stderr.to_string()
    };
    Issue::new(format!("{}_ERROR", prefix), detail, None)
}

/// The default analysis chain, in reporting order: syntax, lint, metrics, security.
pub fn default_analyzers(config: &ToolsConfig) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(SyntaxAnalyzer::new(&config.interpreter, config.syntax_timeout())),
        Box::new(RuffAnalyzer::new(&config.ruff, config.lint_timeout())),
        Box::new(RadonAnalyzer::new(&config.radon, config.metrics_timeout())),
        Box::new(BanditAnalyzer::new(&config.bandit, config.security_timeout())),
    ]
}

/// Availability of one configured tool.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: &'static str,
    pub program: String,
    /// First line of `--version` output, or the reason it could not be run
    pub detail: Result<String, String>,
}

/// Run `<tool> --version` for every configured tool.
pub async fn probe_tools(config: &ToolsConfig) -> Vec<ToolStatus> {
    let tools = [
        ("lint", &config.ruff),
        ("metrics", &config.radon),
        ("security", &config.bandit),
        ("interpreter", &config.interpreter),
    ];

    let mut statuses = Vec::with_capacity(tools.len());
    for (name, program) in tools {
        let detail = match ToolCommand::new(program.as_str(), Duration::from_secs(5))
            .arg("--version")
            .run()
            .await
        {
            Ok(output) if output.exited_with(&[0]) => {
                let text = if output.stdout.trim().is_empty() {
                    &output.stderr
                } else {
                    &output.stdout
                };
                Ok(text.lines().next().unwrap_or_default().trim().to_string())
            }
            Ok(output) => Err(unexpected_exit_issue("TOOL", program, &output).detail),
            Err(e) => Err(e.to_string()),
        };
        statuses.push(ToolStatus {
            name,
            program: program.clone(),
            detail,
        });
    }
    statuses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_removed_on_drop() {
        let source = SourceFile::create("print(1)\n").unwrap();
        let path = source.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print(1)\n");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("py"));
        assert_eq!(source.code(), "print(1)\n");
        drop(source);
        assert!(!path.exists());
    }

    #[test]
    fn test_tool_failure_issue_categories() {
        let missing = tool_failure_issue(
            "RUFF",
            &ToolError::Missing {
                program: "ruff".to_string(),
            },
        );
        assert_eq!(missing.kind, "RUFF_MISSING");
        assert_eq!(missing.detail, "ruff not installed");
        assert_eq!(missing.line, None);

        let timeout = tool_failure_issue(
            "BANDIT",
            &ToolError::Timeout {
                command: "bandit -q".to_string(),
                timeout: Duration::from_secs(30),
            },
        );
        assert_eq!(timeout.kind, "BANDIT_ERROR");
        assert!(timeout.detail.contains("timed out"));
    }

    #[test]
    fn test_unexpected_exit_issue_prefers_stderr() {
        let output = ToolOutput {
            status: Some(2),
            stdout: String::new(),
            stderr: "  error: bad config \n".to_string(),
        };
        assert_eq!(
            unexpected_exit_issue("RUFF", "ruff", &output).detail,
            "error: bad config"
        );

        let silent = ToolOutput {
            status: Some(2),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(unexpected_exit_issue("RUFF", "ruff", &silent).detail, "ruff failed");
    }

    #[test]
    fn test_report_merge_preserves_order() {
        let mut report = AnalysisReport::from_issues(vec![Issue::new("SYNTAX_ERROR", "x", Some(1))]);
        report.merge(AnalysisReport::from_issues(vec![Issue::new("F401", "y", Some(2))]));
        let kinds: Vec<_> = report.issues.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, vec!["SYNTAX_ERROR", "F401"]);
    }

    #[tokio::test]
    async fn test_probe_reports_missing_tools() {
        let config = ToolsConfig {
            ruff: "__missing_ruff__".to_string(),
            radon: "__missing_radon__".to_string(),
            bandit: "__missing_bandit__".to_string(),
            interpreter: "__missing_python__".to_string(),
            ..ToolsConfig::default()
        };
        let statuses = probe_tools(&config).await;
        assert_eq!(statuses.len(), 4);
        assert!(statuses.iter().all(|s| s.detail.is_err()));
        assert_eq!(statuses[0].name, "lint");
    }
}
