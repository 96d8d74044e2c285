//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.clausewise.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::llm::GeminiConfig;
use crate::report::ReportOptions;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".clausewise.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of clauses analyzed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum clauses taken from one document.
    #[serde(default = "default_max_clauses")]
    pub max_clauses: usize,

    /// Append every result to the history log.
    #[serde(default = "default_true")]
    pub save_history: bool,

    /// History log location.
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            concurrency: default_concurrency(),
            max_clauses: default_max_clauses(),
            save_history: true,
            history_file: default_history_file(),
        }
    }
}

fn default_output() -> String {
    "clausewise_report.md".to_string()
}

fn default_concurrency() -> usize {
    1
}

fn default_max_clauses() -> usize {
    20
}

fn default_history_file() -> String {
    "data/analysis_history.jsonl".to_string()
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Gemini model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Gemini API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of retries on transient failures.
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> usize {
    2
}

impl ModelConfig {
    /// Client settings for this model. The key never lives in the file.
    pub fn gemini_config(&self, api_key: Option<String>) -> GeminiConfig {
        GeminiConfig {
            api_url: self.api_url.clone(),
            model_name: self.name.clone(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            timeout_seconds: self.timeout_seconds,
            retries: self.retries,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the translation section for each clause.
    #[serde(default = "default_true")]
    pub include_translations: bool,

    /// Include the training material section for each clause.
    #[serde(default = "default_true")]
    pub include_training: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_translations: true,
            include_training: true,
        }
    }
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            include_translations: config.include_translations,
            include_training: config.include_training,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values given on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.api_url {
            self.model.api_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if let Some(max_clauses) = args.max_clauses {
            self.general.max_clauses = max_clauses;
        }

        // Flags always override
        if args.no_history {
            self.general.save_history = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
