//! Bounded subprocess execution for external tools.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::errors::ToolError;

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the exit code is one of `accepted`.
    pub fn exited_with(&self, accepted: &[i32]) -> bool {
        self.status.map_or(false, |code| accepted.contains(&code))
    }
}

/// A single external command run with a wall-clock limit.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Command line as shown in logs and error messages.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run to completion, capturing stdout and stderr.
    ///
    /// Any exit status is returned as `Ok`; only a missing binary, a spawn
    /// failure or an elapsed timeout is an error. A timed-out child is killed.
    pub async fn run(&self) -> Result<ToolOutput, ToolError> {
        let command_line = self.display();
        tracing::debug!(command = %command_line, timeout = ?self.timeout, "Running external tool");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ToolError::Missing {
                    program: self.program.clone(),
                });
            }
            Ok(Err(e)) => {
                return Err(ToolError::Spawn {
                    command: command_line,
                    source: e,
                });
            }
            Err(_) => {
                tracing::warn!(command = %command_line, "External tool timed out");
                return Err(ToolError::Timeout {
                    command: command_line,
                    timeout: self.timeout,
                });
            }
        };

        let result = ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            command = %command_line,
            status = ?result.status,
            stdout_bytes = result.stdout.len(),
            "External tool finished"
        );
        Ok(result)
    }
}
