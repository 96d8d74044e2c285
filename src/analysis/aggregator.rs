//! Clause analysis orchestration.
//!
//! [`ClauseAnalyzer`] runs every analyzer unit against one clause in a fixed
//! order, merges their records into an [`AggregateResult`] and derives the
//! cross-cutting metadata: identifier, confidence, regulatory overlay and
//! per-unit timings.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::agents::{
    BenchmarkAnalyzer, ComplianceChecker, MultilingualConverter, PolicyRewriter, RiskScorer,
    ScenarioExplainer, TrainingGenerator,
};
use crate::llm::ModelClient;
use crate::models::{
    AggregateResult, AnalyzerKind, EnterpriseMetadata, ProcessingMetrics, RegulatoryAssessment,
    RewriteResult, RiskLevel, UnitOutcome, UnitStatus, UnitTiming,
};
use crate::text;

pub const FRAMEWORK_VERSION: &str = "IRDAI-2024.1";
const SECURITY_CLASSIFICATION: &str = "CONFIDENTIAL";
const DATA_RETENTION_POLICY: &str = "7_years";

pub const PROHIBITED_TERMS: [&str; 4] = [
    "unlimited liability",
    "discretionary coverage",
    "subject to interpretation",
    "as deemed fit",
];

const REGULATORY_BASE: u32 = 85;
const PROHIBITED_TERM_PENALTY: u32 = 10;
const READABILITY_PENALTY: u32 = 15;
const MIN_PLAIN_FLESCH: f64 = 60.0;
const REGULATORY_PASS: u32 = 80;

const DEFAULT_MODEL_CONFIDENCE: f64 = 0.85;
const CONSISTENCY_SCORE: f64 = 0.95;
const REGULATORY_ALIGNMENT: f64 = 0.92;

/// Runs the full analyzer pipeline over clauses.
pub struct ClauseAnalyzer {
    model_name: String,
    rewriter: PolicyRewriter,
    compliance: ComplianceChecker,
    scenario: ScenarioExplainer,
    multilingual: MultilingualConverter,
    risk: RiskScorer,
    training: TrainingGenerator,
    benchmark: BenchmarkAnalyzer,
}

impl ClauseAnalyzer {
    /// Build every unit around one shared client.
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            model_name: client.model_name().to_string(),
            rewriter: PolicyRewriter::new(client.clone()),
            compliance: ComplianceChecker::new(client.clone()),
            scenario: ScenarioExplainer::new(client.clone()),
            multilingual: MultilingualConverter::new(client.clone()),
            risk: RiskScorer::new(client.clone()),
            training: TrainingGenerator::new(client.clone()),
            benchmark: BenchmarkAnalyzer::new(client),
        }
    }

    /// Analyze one clause. Never fails: unit failures are carried inside the
    /// returned record.
    pub async fn analyze(&self, clause: &str) -> AggregateResult {
        let started = Instant::now();
        let timestamp = Utc::now();
        let analysis_id = analysis_id(clause, &timestamp);
        let mut timings = Vec::with_capacity(AnalyzerKind::ALL.len());

        debug!("Analysis {} started ({} words)", analysis_id, text::word_count(clause));

        let (plain_english, ms) = timed(self.rewriter.rewrite(clause)).await;
        timings.push(timing(AnalyzerKind::PlainEnglish, ms, outcome_status(&plain_english)));

        let (compliance_check, ms) = timed(self.compliance.check_compliance(clause)).await;
        timings.push(timing(
            AnalyzerKind::ComplianceCheck,
            ms,
            fallback_status(compliance_check.fallback_analysis),
        ));

        let (customer_scenario, ms) = timed(self.scenario.generate_scenario(clause)).await;
        timings.push(timing(AnalyzerKind::CustomerScenario, ms, outcome_status(&customer_scenario)));

        let (multilingual, ms) = timed(self.multilingual.convert_languages(clause)).await;
        timings.push(timing(AnalyzerKind::Multilingual, ms, outcome_status(&multilingual)));

        let (risk_score, ms) = timed(self.risk.score_risk(clause)).await;
        timings.push(timing(
            AnalyzerKind::RiskScore,
            ms,
            fallback_status(risk_score.fallback_analysis),
        ));

        let (training_materials, ms) = timed(self.training.generate_training(clause)).await;
        timings.push(timing(
            AnalyzerKind::TrainingMaterials,
            ms,
            fallback_status(!training_materials.fallback_sections.is_empty()),
        ));

        let (benchmark_analysis, ms) = timed(self.benchmark.analyze_similarity(clause)).await;
        timings.push(timing(
            AnalyzerKind::BenchmarkAnalysis,
            ms,
            fallback_status(benchmark_analysis.fallback_analysis),
        ));

        let regulatory_assessment = regulatory_assessment(clause, &plain_english);
        let processing_confidence = processing_confidence(clause, risk_score.model_confidence);

        let processing_metrics = ProcessingMetrics {
            processing_time_ms: started.elapsed().as_millis() as u64,
            tokens_processed: text::word_count(clause),
            analyzers_run: timings.len(),
            fallback_units: count_status(&timings, UnitStatus::Fallback),
            failed_units: count_status(&timings, UnitStatus::Failed),
            unit_timings: timings,
        };

        info!(
            "Analysis {} finished in {}ms (risk {}, {} fallback, {} failed)",
            analysis_id,
            processing_metrics.processing_time_ms,
            risk_score.risk_level,
            processing_metrics.fallback_units,
            processing_metrics.failed_units
        );

        AggregateResult {
            enterprise_metadata: EnterpriseMetadata {
                processing_confidence,
                audit_trail_id: format!("audit_{}", analysis_id),
                compliance_framework: FRAMEWORK_VERSION.to_string(),
                processing_metrics,
                security_classification: SECURITY_CLASSIFICATION.to_string(),
                data_retention_policy: DATA_RETENTION_POLICY.to_string(),
            },
            analysis_id,
            timestamp,
            original_clause: clause.to_string(),
            processing_model: self.model_name.clone(),
            plain_english,
            compliance_check,
            customer_scenario,
            multilingual,
            risk_score,
            training_materials,
            benchmark_analysis,
            regulatory_assessment,
        }
    }

    /// Analyze many clauses, up to `concurrency` at a time. Results come
    /// back in input order.
    pub async fn analyze_batch(&self, clauses: &[String], concurrency: usize) -> Vec<AggregateResult> {
        self.analyze_batch_with(clauses, concurrency, |_| {}).await
    }

    /// Like [`analyze_batch`](Self::analyze_batch), calling `on_result` as
    /// each result is yielded.
    pub async fn analyze_batch_with<F>(
        &self,
        clauses: &[String],
        concurrency: usize,
        on_result: F,
    ) -> Vec<AggregateResult>
    where
        F: Fn(&AggregateResult),
    {
        stream::iter(clauses)
            .map(|clause| self.analyze(clause))
            .buffered(concurrency.max(1))
            .inspect(|result| on_result(result))
            .collect()
            .await
    }
}

async fn timed<F: Future>(future: F) -> (F::Output, u64) {
    let started = Instant::now();
    let output = future.await;
    (output, started.elapsed().as_millis() as u64)
}

fn timing(analyzer: AnalyzerKind, duration_ms: u64, status: UnitStatus) -> UnitTiming {
    UnitTiming {
        analyzer,
        duration_ms,
        status,
    }
}

fn outcome_status<T>(outcome: &UnitOutcome<T>) -> UnitStatus {
    if outcome.is_failed() {
        UnitStatus::Failed
    } else {
        UnitStatus::Completed
    }
}

fn fallback_status(used_fallback: bool) -> UnitStatus {
    if used_fallback {
        UnitStatus::Fallback
    } else {
        UnitStatus::Completed
    }
}

fn count_status(timings: &[UnitTiming], status: UnitStatus) -> usize {
    timings.iter().filter(|t| t.status == status).count()
}

/// First 12 hex characters of SHA-256 over the clause and timestamp.
pub fn analysis_id(clause: &str, timestamp: &DateTime<Utc>) -> String {
    let digest = Sha256::digest(format!("{}{}", clause, timestamp.to_rfc3339()).as_bytes());
    let mut id = format!("{:x}", digest);
    id.truncate(12);
    id
}

/// Prohibited-term scan combined with the rewrite's readability.
pub fn regulatory_assessment(
    clause: &str,
    plain_english: &UnitOutcome<RewriteResult>,
) -> RegulatoryAssessment {
    let prohibited = text::find_phrases(clause, &PROHIBITED_TERMS);
    let readability_requirement_met = plain_english
        .completed()
        .map(|r| r.improved_metrics.flesch_score >= MIN_PLAIN_FLESCH)
        .unwrap_or(false);

    let mut regulatory_issues = Vec::new();
    let mut compliance_recommendations = Vec::new();
    for term in &prohibited {
        regulatory_issues.push(format!("Contains prohibited term: '{}'", term));
        compliance_recommendations.push(format!("Replace '{}' with clearer, specific language", term));
    }

    let mut penalty = prohibited.len() as u32 * PROHIBITED_TERM_PENALTY;
    if !readability_requirement_met {
        penalty += READABILITY_PENALTY;
        regulatory_issues.push("Readability below IRDAI standards".to_string());
        compliance_recommendations.push("Simplify language to improve readability score".to_string());
    }
    let score = REGULATORY_BASE.saturating_sub(penalty);

    RegulatoryAssessment {
        compliance_score: score,
        irdai_compliant: score >= REGULATORY_PASS,
        prohibited_terms_found: prohibited.into_iter().map(str::to_string).collect(),
        readability_requirement_met,
        regulatory_issues,
        compliance_recommendations,
        framework_version: FRAMEWORK_VERSION.to_string(),
    }
}

/// Weighted blend of clause clarity, fixed consistency and alignment
/// figures, and the model's own confidence, rounded to 3 places.
pub fn processing_confidence(clause: &str, model_confidence: Option<f64>) -> f64 {
    let clarity = (text::word_count(clause) as f64 / 50.0).min(1.0);
    let model = model_confidence
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_MODEL_CONFIDENCE);

    let blended =
        0.2 * clarity + 0.3 * CONSISTENCY_SCORE + 0.3 * model + 0.2 * REGULATORY_ALIGNMENT;
    text::round_to(blended, 3)
}

/// Cross-clause figures for a batch of results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub clauses: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub average_risk_score: f64,
    pub average_compliance_score: f64,
    pub failed_units: usize,
    pub fallback_units: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[AggregateResult]) -> Self {
        let mut summary = Self {
            clauses: results.len(),
            ..Self::default()
        };
        if results.is_empty() {
            return summary;
        }

        let mut risk_total = 0u64;
        let mut compliance_total = 0u64;
        for result in results {
            match result.risk_score.risk_level {
                RiskLevel::High => summary.high_risk += 1,
                RiskLevel::Medium => summary.medium_risk += 1,
                RiskLevel::Low => summary.low_risk += 1,
            }
            risk_total += u64::from(result.risk_score.risk_score);
            compliance_total += u64::from(result.compliance_check.compliance_score);

            let metrics = &result.enterprise_metadata.processing_metrics;
            summary.failed_units += metrics.failed_units;
            summary.fallback_units += metrics.fallback_units;
        }

        let n = results.len() as f64;
        summary.average_risk_score = text::round_to(risk_total as f64 / n, 1);
        summary.average_compliance_score = text::round_to(compliance_total as f64 / n, 1);
        summary
    }

    /// Highest risk level in the batch, if any.
    pub fn highest_risk(&self) -> Option<RiskLevel> {
        if self.high_risk > 0 {
            Some(RiskLevel::High)
        } else if self.medium_risk > 0 {
            Some(RiskLevel::Medium)
        } else if self.low_risk > 0 {
            Some(RiskLevel::Low)
        } else {
            None
        }
    }
}
