use crate::config::ToolsConfig;
use crate::errors::ReviewError;
use crate::logging::OperationTimer;
use crate::sandbox::Sandbox;
use crate::scoring::{build_suggestions, pretty_summary, score_from};
use crate::tools::{default_analyzers, AnalysisReport, Analyzer, SourceFile};
use crate::types::review::{ReviewRequest, ReviewResult, ScoreSet};

/// Filename assumed when the request does not carry one.
pub const DEFAULT_FILENAME: &str = "snippet.py";

pub const NON_PYTHON_SUMMARY: &str =
    "Non-Python file — analysis is only enabled for .py in this MVP.";
pub const NON_PYTHON_OUTPUT: &str = "(not run — non-Python file)";
pub const NON_PYTHON_SUGGESTION: &str = "Paste a .py file to get full analysis.";

/// Orchestrates one review: analyzers in order, then scoring, then the sandbox run.
pub struct ReviewService {
    analyzers: Vec<Box<dyn Analyzer>>,
    sandbox: Sandbox,
}

impl ReviewService {
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::with_analyzers(default_analyzers(config), Sandbox::from_config(config))
    }

    pub fn with_analyzers(analyzers: Vec<Box<dyn Analyzer>>, sandbox: Sandbox) -> Self {
        Self { analyzers, sandbox }
    }

    pub async fn review(&self, request: ReviewRequest) -> Result<ReviewResult, ReviewError> {
        let code = request.code.as_deref().unwrap_or_default().trim();
        if code.is_empty() {
            return Err(ReviewError::NoCode);
        }

        let filename = match request.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_FILENAME,
        };
        if !is_python_file(filename) {
            tracing::info!(filename, "Skipping analysis for non-Python file");
            return Ok(non_python_result());
        }

        let timer = OperationTimer::new("review").with_metadata("filename", filename);
        let report = self.analyze(code).await?;

        let scores = score_from(&report.metrics, &report.issues, &report.findings, code);
        let suggestions =
            build_suggestions(&report.metrics, &report.issues, &report.findings, code);
        let lint_count = report
            .issues
            .iter()
            .filter(|issue| !issue.kind.starts_with("SYNTAX"))
            .count();
        let summary = pretty_summary(&report.metrics, lint_count, report.findings.len());

        let output = self.sandbox.run(code).await;
        let elapsed = timer.finish();
        tracing::info!(
            filename,
            issues = report.issues.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Review completed"
        );

        Ok(ReviewResult {
            summary,
            issues: report.issues,
            scores,
            output,
            suggestions,
        })
    }

    /// Run every analyzer against one shared temporary file.
    async fn analyze(&self, code: &str) -> Result<AnalysisReport, ReviewError> {
        let source = SourceFile::create(code).map_err(ReviewError::Workspace)?;
        let mut report = AnalysisReport::default();
        for analyzer in &self.analyzers {
            let timer = OperationTimer::new(analyzer.name());
            report.merge(analyzer.analyze(&source).await);
            timer.finish();
        }
        Ok(report)
    }
}

fn is_python_file(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".py")
}

fn non_python_result() -> ReviewResult {
    ReviewResult {
        summary: NON_PYTHON_SUMMARY.to_string(),
        issues: Vec::new(),
        scores: ScoreSet::default(),
        output: NON_PYTHON_OUTPUT.to_string(),
        suggestions: vec![NON_PYTHON_SUGGESTION.to_string()],
    }
}
