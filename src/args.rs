use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::logging::{LogFormat, LoggingConfig};

/// Code review service: static analysis, scoring and a coding-assistant chat over HTTP
#[derive(Parser, Debug)]
#[command(name = "code-reviewer", version)]
pub struct Args {
    /// Configuration file (defaults to ~/.config/code-reviewer/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, overrides the configured one
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Report which external tools are available, then exit
    #[arg(long)]
    pub check_tools: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Compact,
}

impl Args {
    pub fn logging_config(&self) -> LoggingConfig {
        let mut config = if self.verbose {
            LoggingConfig::development()
        } else {
            LoggingConfig::production()
        };
        config.format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
        };
        config
    }
}
