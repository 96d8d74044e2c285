//! Analysis history log and analytics.
//!
//! Every result is appended to a JSON Lines file. Writing is best effort:
//! a failed write is logged and never affects the analysis itself.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::agents::multilingual::SUPPORTED_LANGUAGES;
use crate::models::{AggregateResult, RiskLevel};
use crate::text;

/// Append-only JSONL log of analysis results.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one result as a single line.
    pub fn append(&self, result: &AggregateResult) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let line = serde_json::to_string(result).context("Failed to serialize result")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        debug!("Recorded analysis {} in history", result.analysis_id);
        Ok(())
    }

    /// Append every result, logging failures instead of returning them.
    pub fn record(&self, results: &[AggregateResult]) {
        for result in results {
            if let Err(e) = self.append(result) {
                warn!("Could not record analysis history: {:#}", e);
                return;
            }
        }
    }

    /// Read every parsable result. A missing log is an empty history.
    pub fn load(&self) -> Result<Vec<AggregateResult>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let mut results = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AggregateResult>(line) {
                Ok(result) => results.push(result),
                Err(e) => warn!("Skipping history line {}: {}", index + 1, e),
            }
        }

        Ok(results)
    }
}

/// Aggregate figures over the history log.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub total_analyses: usize,
    /// Mean Flesch improvement over completed rewrites.
    pub average_readability_improvement: f64,
    /// Compliance issues plus vague phrases found.
    pub compliance_issues_found: usize,
    pub average_risk_score: f64,
    pub low_risk: usize,
    pub medium_risk: usize,
    pub high_risk: usize,
    pub languages_supported: usize,
}

impl HistoryStats {
    pub fn from_results(results: &[AggregateResult]) -> Self {
        let improvements: Vec<f64> = results
            .iter()
            .filter_map(|r| r.plain_english.completed())
            .map(|r| r.readability_improvement)
            .collect();

        let mut stats = Self {
            total_analyses: results.len(),
            average_readability_improvement: mean(&improvements),
            compliance_issues_found: 0,
            average_risk_score: 0.0,
            low_risk: 0,
            medium_risk: 0,
            high_risk: 0,
            languages_supported: SUPPORTED_LANGUAGES.len(),
        };

        let mut risk_scores = Vec::with_capacity(results.len());
        for result in results {
            stats.compliance_issues_found += result.compliance_check.issues.len()
                + result.compliance_check.vague_language_detected.len();
            risk_scores.push(f64::from(result.risk_score.risk_score));

            match result.risk_score.risk_level {
                RiskLevel::Low => stats.low_risk += 1,
                RiskLevel::Medium => stats.medium_risk += 1,
                RiskLevel::High => stats.high_risk += 1,
            }
        }
        stats.average_risk_score = mean(&risk_scores);

        stats
    }

    /// Plain-text rendering for the terminal.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Total analyses: {}", self.total_analyses));
        lines.push(format!(
            "Average readability improvement: {:+.2}",
            self.average_readability_improvement
        ));
        lines.push(format!("Compliance issues found: {}", self.compliance_issues_found));
        lines.push(format!("Average risk score: {:.1}", self.average_risk_score));
        lines.push("Risk distribution:".to_string());
        lines.push(format!("- {} Low: {}", RiskLevel::Low.emoji(), self.low_risk));
        lines.push(format!("- {} Medium: {}", RiskLevel::Medium.emoji(), self.medium_risk));
        lines.push(format!("- {} High: {}", RiskLevel::High.emoji(), self.high_risk));
        lines.push(format!("Languages supported: {}", self.languages_supported));

        lines.join("\n")
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    text::round_to(values.iter().sum::<f64>() / values.len() as f64, 2)
}
