//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::models::RiskLevel;

/// Clausewise - LLM-powered insurance clause analyzer
///
/// Rewrites policy clauses in plain English, checks them against IRDAI
/// guidance, scores their risk, translates them and builds agent training
/// material. Markdown/JSON reports.
///
/// Examples:
///   clausewise --clause "The insurer shall indemnify the insured..."
///   clausewise --file policy.txt --concurrency 4 --format json
///   clausewise --file policy.txt --offline
///   clausewise --stats
///   clausewise --init-config
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Clause text to analyze
    #[arg(long, value_name = "TEXT", conflicts_with = "file")]
    pub clause: Option<String>,

    /// Plain text policy document to split into clauses and analyze
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Gemini model to use for analysis
    ///
    /// Can also be set via CLAUSEWISE_MODEL env var or .clausewise.toml config.
    #[arg(short, long, env = "CLAUSEWISE_MODEL")]
    pub model: Option<String>,

    /// Gemini API base URL
    #[arg(long, value_name = "URL", env = "GEMINI_API_URL")]
    pub api_url: Option<String>,

    /// Gemini API key
    ///
    /// Without a key every model call fails and analyzers use their fallbacks.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Never call the model; analyzers take their fallback or error paths
    #[arg(long)]
    pub offline: bool,

    /// Output file path for the report
    ///
    /// Default: from config or clausewise_report.md
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Number of clauses analyzed concurrently
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Maximum number of clauses taken from a document
    #[arg(long, value_name = "COUNT")]
    pub max_clauses: Option<usize>,

    /// Do not append results to the history log
    #[arg(long)]
    pub no_history: bool,

    /// Print analytics over the history log and exit
    #[arg(long)]
    pub stats: bool,

    /// Fail if any clause's risk is at or above this level
    ///
    /// Useful for CI pipelines. Exit code 2 when threshold is exceeded.
    /// Values: low, medium, high
    #[arg(long, value_name = "LEVEL")]
    pub fail_on_risk: Option<FailOnRisk>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .clausewise.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .clausewise.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("clause", &self.clause)
            .field("file", &self.file)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("offline", &self.offline)
            .field("output", &self.output)
            .field("format", &self.format)
            .field("concurrency", &self.concurrency)
            .field("max_clauses", &self.max_clauses)
            .field("no_history", &self.no_history)
            .field("stats", &self.stats)
            .field("fail_on_risk", &self.fail_on_risk)
            .field("config", &self.config)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("init_config", &self.init_config)
            .finish()
    }
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Risk threshold for --fail-on-risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FailOnRisk {
    Low,
    Medium,
    High,
}

impl From<FailOnRisk> for RiskLevel {
    fn from(level: FailOnRisk) -> Self {
        match level {
            FailOnRisk::Low => RiskLevel::Low,
            FailOnRisk::Medium => RiskLevel::Medium,
            FailOnRisk::High => RiskLevel::High,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Nothing to analyze for these
        if self.init_config || self.stats {
            return Ok(());
        }

        if self.clause.is_none() && self.file.is_none() {
            return Err("Provide a clause with --clause or a document with --file".to_string());
        }

        if let Some(ref clause) = self.clause {
            if clause.trim().is_empty() {
                return Err("Clause text must not be empty".to_string());
            }
        }

        if let Some(ref path) = self.file {
            if !path.is_file() {
                return Err(format!("Policy document does not exist: {}", path.display()));
            }
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if self.max_clauses == Some(0) {
            return Err("Max clauses must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
