use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{tool_failure_issue, unexpected_exit_issue, AnalysisReport, Analyzer, SourceFile, ToolCommand};
use crate::errors::ToolError;
use crate::types::review::{Issue, Metrics};

const ISSUE_PREFIX: &str = "RADON";

/// Maintainability index and cyclomatic complexity via `radon`.
///
/// Two invocations: `radon mi -j` for the index and `radon cc -s -j` for the
/// per-block complexity list. A failure of either leaves its metrics
/// unavailable and is reported as at most one issue.
pub struct RadonAnalyzer {
    program: String,
    timeout: Duration,
}

impl RadonAnalyzer {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }

    async fn run(&self, subcommand: &[&str], source: &SourceFile) -> Result<String, Issue> {
        let mut command = ToolCommand::new(self.program.as_str(), self.timeout);
        for arg in subcommand {
            command = command.arg(*arg);
        }
        let output = command
            .arg(source.path())
            .run()
            .await
            .map_err(|e: ToolError| tool_failure_issue(ISSUE_PREFIX, &e))?;

        if !output.exited_with(&[0]) {
            return Err(unexpected_exit_issue(ISSUE_PREFIX, "radon", &output));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl Analyzer for RadonAnalyzer {
    fn name(&self) -> &'static str {
        "radon"
    }

    async fn analyze(&self, source: &SourceFile) -> AnalysisReport {
        let key = source.path_key();
        let mut report = AnalysisReport::default();

        match self.run(&["mi", "-j"], source).await {
            Ok(stdout) => report.metrics.maintainability_index = parse_maintainability(&stdout, &key),
            Err(issue) => {
                let missing = issue.kind.ends_with("_MISSING");
                report.issues.push(issue);
                // no point asking a missing binary twice
                if missing {
                    return report;
                }
            }
        }

        match self.run(&["cc", "-s", "-j"], source).await {
            Ok(stdout) => {
                let (average, maximum) = parse_complexity(&stdout, &key);
                report.metrics.average_complexity = average;
                report.metrics.maximum_complexity = maximum;
            }
            Err(issue) => {
                if report.issues.is_empty() {
                    report.issues.push(issue);
                }
            }
        }

        report
    }
}

/// Radon keys its JSON by the scanned path; fall back to the only entry when
/// the path was normalised differently.
fn entry_for<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    let map = data.as_object()?;
    map.get(key).or_else(|| {
        if map.len() == 1 {
            map.values().next()
        } else {
            None
        }
    })
}

/// Maintainability index from `radon mi -j` output.
///
/// Accepts both `{"path": {"mi": 71.2}}` and `{"path": [{"mi": 71.2}]}`.
pub fn parse_maintainability(stdout: &str, key: &str) -> Option<f64> {
    if stdout.trim().is_empty() {
        return None;
    }
    let data: Value = match serde_json::from_str(stdout) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to parse radon mi output: {}", e);
            return None;
        }
    };
    let entry = entry_for(&data, key)?;
    let record = match entry {
        Value::Array(items) => items.first()?,
        other => other,
    };
    record.get("mi").and_then(Value::as_f64)
}

/// `(average, maximum)` complexity from `radon cc -s -j` output.
///
/// An empty block list is trivially simple and yields `(0.0, 0.0)`.
/// Unparsable output or a per-file error leaves both unavailable.
pub fn parse_complexity(stdout: &str, key: &str) -> (Option<f64>, Option<f64>) {
    if stdout.trim().is_empty() {
        return (Some(0.0), Some(0.0));
    }
    let data: Value = match serde_json::from_str(stdout) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to parse radon cc output: {}", e);
            return (None, None);
        }
    };

    let blocks: &[Value] = match entry_for(&data, key) {
        Some(Value::Array(blocks)) => blocks.as_slice(),
        Some(Value::Object(obj)) if obj.contains_key("error") => {
            tracing::warn!("radon cc reported an error: {}", obj["error"]);
            return (None, None);
        }
        _ => &[],
    };

    let values: Vec<f64> = blocks
        .iter()
        .filter_map(|block| block.get("complexity").and_then(Value::as_f64))
        .collect();
    if values.is_empty() {
        return (Some(0.0), Some(0.0));
    }

    let average = values.iter().sum::<f64>() / values.len() as f64;
    let maximum = values.iter().cloned().fold(f64::MIN, f64::max);
    (Some(average), Some(maximum))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "/tmp/snippet-abc.py";

    #[test]
    fn test_parse_maintainability_object_and_list() {
        let object = r#"{"/tmp/snippet-abc.py": {"mi": 71.25, "rank": "A"}}"#;
        assert_eq!(parse_maintainability(object, KEY), Some(71.25));

        let list = r#"{"/tmp/snippet-abc.py": [{"mi": 42.0, "rank": "B"}]}"#;
        assert_eq!(parse_maintainability(list, KEY), Some(42.0));
    }

    #[test]
    fn test_parse_maintainability_falls_back_to_single_entry() {
        let other_key = r#"{"snippet-abc.py": {"mi": 100.0}}"#;
        assert_eq!(parse_maintainability(other_key, KEY), Some(100.0));
    }

    #[test]
    fn test_parse_maintainability_unavailable() {
        assert_eq!(parse_maintainability("", KEY), None);
        assert_eq!(parse_maintainability("garbage", KEY), None);
        assert_eq!(parse_maintainability(r#"{"/tmp/snippet-abc.py": {"error": "x"}}"#, KEY), None);
    }

    #[test]
    fn test_parse_complexity_average_and_max() {
        let stdout = r#"{"/tmp/snippet-abc.py": [
            {"type": "function", "name": "a", "complexity": 1, "rank": "A"},
            {"type": "function", "name": "b", "complexity": 4, "rank": "A"},
            {"type": "method", "name": "c", "complexity": 7, "rank": "B"},
            {"type": "class", "name": "D", "rank": "A"}
        ]}"#;
        assert_eq!(parse_complexity(stdout, KEY), (Some(4.0), Some(7.0)));
    }

    #[test]
    fn test_parse_complexity_no_functions_is_trivial() {
        assert_eq!(parse_complexity(r#"{"/tmp/snippet-abc.py": []}"#, KEY), (Some(0.0), Some(0.0)));
        assert_eq!(parse_complexity("{}", KEY), (Some(0.0), Some(0.0)));
    }

    #[test]
    fn test_parse_complexity_error_entry() {
        let stdout = r#"{"/tmp/snippet-abc.py": {"error": "invalid syntax (<unknown>, line 1)"}}"#;
        assert_eq!(parse_complexity(stdout, KEY), (None, None));
        assert_eq!(parse_complexity("not json", KEY), (None, None));
    }

    #[tokio::test]
    async fn test_missing_radon_reported_once() {
        let analyzer = RadonAnalyzer::new("__missing_radon__", Duration::from_secs(5));
        let source = SourceFile::create("x = 1\n").unwrap();
        let report = analyzer.analyze(&source).await;
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, "RADON_MISSING");
        assert_eq!(report.metrics, Metrics::default());
    }
}
