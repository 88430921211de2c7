use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{AnalysisReport, Analyzer, SourceFile, ToolCommand};
use crate::tree_sitter_analyzer::syntax_check;
use crate::types::review::{Issue, SYNTAX_ERROR};

/// Compiles the file named by `argv[1]` without running it and prints one
/// JSON line: `{"ok": true}` or the compiler's message and line.
const COMPILE_CHECK: &str = r#"import json, sys
try:
    with open(sys.argv[1], encoding="utf-8") as f:
        compile(f.read(), "<string>", "exec")
except (SyntaxError, ValueError) as e:
    print(json.dumps({"ok": False, "msg": getattr(e, "msg", None) or str(e), "lineno": getattr(e, "lineno", None)}))
else:
    print(json.dumps({"ok": True}))
"#;

#[derive(Debug, Deserialize)]
struct CompileReport {
    #[serde(default)]
    ok: bool,
    msg: Option<String>,
    lineno: Option<u32>,
}

/// Syntax check backed by the interpreter's own compiler.
///
/// Falls back to the tree-sitter grammar when the interpreter cannot be run
/// or answers with something other than a compile report.
pub struct SyntaxAnalyzer {
    interpreter: String,
    timeout: Duration,
}

impl SyntaxAnalyzer {
    pub fn new(interpreter: &str, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.to_string(),
            timeout,
        }
    }

    async fn compile_check(&self, source: &SourceFile) -> Result<Option<Issue>, String> {
        let output = ToolCommand::new(self.interpreter.as_str(), self.timeout)
            .arg("-c")
            .arg(COMPILE_CHECK)
            .arg(source.path())
            .run()
            .await
            .map_err(|e| e.to_string())?;

        if !output.exited_with(&[0]) {
            return Err(format!(
                "compile check exited with {:?}: {}",
                output.status,
                output.stderr.trim()
            ));
        }
        parse_compile_report(&output.stdout).map_err(|e| format!("unreadable compile report: {}", e))
    }
}

#[async_trait]
impl Analyzer for SyntaxAnalyzer {
    fn name(&self) -> &'static str {
        "syntax"
    }

    async fn analyze(&self, source: &SourceFile) -> AnalysisReport {
        let issue = match self.compile_check(source).await {
            Ok(issue) => issue,
            Err(reason) => {
                tracing::debug!("Falling back to tree-sitter syntax check: {}", reason);
                syntax_check(source.code())
            }
        };
        AnalysisReport::from_issues(issue.into_iter().collect())
    }
}

/// Read the last JSON line printed by the compile check.
pub fn parse_compile_report(stdout: &str) -> Result<Option<Issue>, serde_json::Error> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    let report: CompileReport = serde_json::from_str(line)?;
    if report.ok {
        return Ok(None);
    }

    let detail = report
        .msg
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| "invalid syntax".to_string());
    Ok(Some(Issue::new(
        SYNTAX_ERROR,
        detail,
        report.lineno.filter(|line| *line > 0),
    )))
}
