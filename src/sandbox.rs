//! Runs submitted code in a subprocess to capture its output.
//!
//! This is a bare interpreter process with a wall-clock limit, not a
//! security boundary.

use std::time::Duration;

use crate::config::ToolsConfig;
use crate::tools::{SourceFile, ToolCommand, ToolOutput};

/// Shown when the program printed nothing at all.
pub const NO_OUTPUT: &str = "(no output)";

#[derive(Debug, Clone)]
pub struct Sandbox {
    interpreter: String,
    timeout: Duration,
}

impl Sandbox {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.interpreter.clone(), config.sandbox_timeout())
    }

    /// Execute `code` and return its combined output.
    ///
    /// Never fails: spawn errors and timeouts come back as a
    /// `Runtime error: ...` line. The temporary file is removed before return.
    pub async fn run(&self, code: &str) -> String {
        let source = match SourceFile::create(code) {
            Ok(source) => source,
            Err(e) => return format!("Runtime error: {}", e),
        };

        let result = ToolCommand::new(self.interpreter.as_str(), self.timeout)
            .arg(source.path())
            .run()
            .await;

        match result {
            Ok(output) => combine_output(&output),
            Err(e) => {
                tracing::warn!("Sandbox run failed: {}", e);
                format!("Runtime error: {}", e)
            }
        }
    }
}

/// Trimmed stdout, then `ERR: ` + trimmed stderr, newline-joined.
pub fn combine_output(output: &ToolOutput) -> String {
    let mut pieces = Vec::with_capacity(2);
    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        pieces.push(stdout.to_string());
    }
    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        pieces.push(format!("ERR: {}", stderr));
    }
    if pieces.is_empty() {
        NO_OUTPUT.to_string()
    } else {
        pieces.join("\n")
    }
}
