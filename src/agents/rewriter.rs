//! Plain-English rewriting with before/after readability metrics.

use std::sync::Arc;

use tracing::warn;

use super::ask;
use crate::llm::{ModelClient, PromptTask};
use crate::models::{ReadabilityMetrics, RewriteResult, UnitOutcome};
use crate::text;

/// Highest Flesch-Kincaid grade accepted as plain language.
pub const MAX_PLAIN_GRADE: f64 = 8.0;

pub struct PolicyRewriter {
    client: Arc<dyn ModelClient>,
}

impl PolicyRewriter {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Rewrite `clause` in plain English.
    ///
    /// There is no local substitute for a rewrite, so any model failure is
    /// reported as a failed outcome.
    pub async fn rewrite(&self, clause: &str) -> UnitOutcome<RewriteResult> {
        match ask(self.client.as_ref(), PromptTask::PlainEnglishRewrite, clause).await {
            Ok(rewritten) => UnitOutcome::Completed(build_result(clause, &rewritten)),
            Err(e) => {
                warn!("Plain-English rewrite failed: {}", e);
                UnitOutcome::failed(format!("Rewriting failed: {}", e))
            }
        }
    }
}

pub fn readability(text: &str) -> ReadabilityMetrics {
    ReadabilityMetrics {
        flesch_score: text::round_to(text::flesch_reading_ease(text), 2),
        grade_level: text::round_to(text::flesch_kincaid_grade(text), 2),
        word_count: text::word_count(text),
    }
}

fn build_result(original: &str, rewritten: &str) -> RewriteResult {
    let original_metrics = readability(original);
    let improved_metrics = readability(rewritten);
    let improvement = text::flesch_reading_ease(rewritten) - text::flesch_reading_ease(original);

    RewriteResult {
        original_text: original.to_string(),
        plain_english_text: rewritten.to_string(),
        meets_irdai_standards: text::flesch_kincaid_grade(rewritten) <= MAX_PLAIN_GRADE,
        readability_improvement: text::round_to(improvement, 2),
        original_metrics,
        improved_metrics,
    }
}
