//! Data models for the clause analyzer.
//!
//! One explicit record type per analyzer unit, the envelope that merges
//! them, and the derived metadata computed over a whole run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a unit that has no local fallback.
///
/// Serialized untagged, so a failed entry is exactly `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitOutcome<T> {
    Completed(T),
    Failed { error: String },
}

impl<T> UnitOutcome<T> {
    pub fn failed(error: impl Into<String>) -> Self {
        UnitOutcome::Failed {
            error: error.into(),
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            UnitOutcome::Completed(value) => Some(value),
            UnitOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UnitOutcome::Completed(_) => None,
            UnitOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UnitOutcome::Failed { .. })
    }
}

/// The analyzer units, in the order the aggregator runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    PlainEnglish,
    ComplianceCheck,
    CustomerScenario,
    Multilingual,
    RiskScore,
    TrainingMaterials,
    BenchmarkAnalysis,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 7] = [
        AnalyzerKind::PlainEnglish,
        AnalyzerKind::ComplianceCheck,
        AnalyzerKind::CustomerScenario,
        AnalyzerKind::Multilingual,
        AnalyzerKind::RiskScore,
        AnalyzerKind::TrainingMaterials,
        AnalyzerKind::BenchmarkAnalysis,
    ];

    /// Key under which the unit's record appears in the envelope.
    pub fn key(&self) -> &'static str {
        match self {
            AnalyzerKind::PlainEnglish => "plain_english",
            AnalyzerKind::ComplianceCheck => "compliance_check",
            AnalyzerKind::CustomerScenario => "customer_scenario",
            AnalyzerKind::Multilingual => "multilingual",
            AnalyzerKind::RiskScore => "risk_score",
            AnalyzerKind::TrainingMaterials => "training_materials",
            AnalyzerKind::BenchmarkAnalysis => "benchmark_analysis",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerKind::PlainEnglish => write!(f, "Plain English Rewrite"),
            AnalyzerKind::ComplianceCheck => write!(f, "Compliance Check"),
            AnalyzerKind::CustomerScenario => write!(f, "Customer Scenario"),
            AnalyzerKind::Multilingual => write!(f, "Multilingual"),
            AnalyzerKind::RiskScore => write!(f, "Risk Score"),
            AnalyzerKind::TrainingMaterials => write!(f, "Training Materials"),
            AnalyzerKind::BenchmarkAnalysis => write!(f, "Benchmark Analysis"),
        }
    }
}

/// Low/Medium/High categorical rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

impl RiskLevel {
    /// Level for a 0-100 risk score: >=80 High, >=50 Medium, else Low.
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => RiskLevel::High,
            50..=79 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Parse a model-reported label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" | "moderate" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Low => "🟢",
            RiskLevel::Medium => "🟡",
            RiskLevel::High => "🔴",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NeedsReview,
    HighRisk,
}

impl ComplianceStatus {
    /// >=80 compliant, >=60 needs review, else high risk.
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => ComplianceStatus::Compliant,
            60..=79 => ComplianceStatus::NeedsReview,
            _ => ComplianceStatus::HighRisk,
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::Compliant => write!(f, "Compliant"),
            ComplianceStatus::NeedsReview => write!(f, "Needs Review"),
            ComplianceStatus::HighRisk => write!(f, "High Risk"),
        }
    }
}

/// Readability figures for one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityMetrics {
    pub flesch_score: f64,
    pub grade_level: f64,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteResult {
    pub original_text: String,
    pub plain_english_text: String,
    pub original_metrics: ReadabilityMetrics,
    pub improved_metrics: ReadabilityMetrics,
    /// Improved Flesch score minus original Flesch score.
    pub readability_improvement: f64,
    /// Rewrite reads at grade 8 or below.
    pub meets_irdai_standards: bool,
}

/// A vague phrase found in the clause and what to say instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VagueLanguageFinding {
    pub phrase: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub compliance_score: u32,
    pub status: ComplianceStatus,
    pub irdai_compliant: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub vague_language_detected: Vec<VagueLanguageFinding>,
    pub fallback_analysis: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub financial_risk: RiskLevel,
    pub dispute_potential: RiskLevel,
    /// High-risk phrases found in the clause.
    pub phrase_risk: Vec<String>,
    pub explanation: String,
    pub mitigation_suggestions: Vec<String>,
    pub requires_underwriter_review: bool,
    pub fallback_analysis: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub main_scenario: String,
    pub real_life_examples: Vec<String>,
    pub customer_script: String,
    pub simple_explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub language_code: String,
    pub language_name: String,
    pub translated_text: String,
    pub ready_for_distribution: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultilingualResult {
    pub source_language: String,
    pub translations: Vec<Translation>,
    pub total_languages: usize,
    pub rural_customer_ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn target_audience(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "New field agents and customer service staff",
            DifficultyLevel::Intermediate => "Experienced field agents",
            DifficultyLevel::Advanced => "Senior underwriters and claims specialists",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Beginner => write!(f, "Beginner"),
            DifficultyLevel::Intermediate => write!(f, "Intermediate"),
            DifficultyLevel::Advanced => write!(f, "Advanced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub difficulty_level: DifficultyLevel,
    pub target_audience: String,
    pub training_module: String,
    pub quiz_questions: Vec<QuizQuestion>,
    pub learning_points: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub practical_examples: Vec<String>,
    pub roleplay_scenarios: Vec<String>,
    pub common_mistakes: Vec<String>,
    pub faq: Vec<FaqEntry>,
    pub pitch_summary: String,
    pub training_ready: bool,
    /// Sections filled with canned content because generation failed.
    pub fallback_sections: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Similar,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMatch {
    pub category: String,
    pub standard_text: String,
    /// Blended similarity in `[0, 1]`.
    pub similarity: f64,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl BenchmarkGrade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => BenchmarkGrade::APlus,
            80..=89 => BenchmarkGrade::A,
            70..=79 => BenchmarkGrade::B,
            60..=69 => BenchmarkGrade::C,
            _ => BenchmarkGrade::D,
        }
    }
}

impl fmt::Display for BenchmarkGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchmarkGrade::APlus => write!(f, "A+"),
            BenchmarkGrade::A => write!(f, "A"),
            BenchmarkGrade::B => write!(f, "B"),
            BenchmarkGrade::C => write!(f, "C"),
            BenchmarkGrade::D => write!(f, "D"),
        }
    }
}

/// Deviation scoring from the older benchmark format.
///
/// Deprecated: still emitted for older consumers, superseded by
/// `similarity_score` and `benchmark_grade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyBenchmark {
    pub deviation_score: u32,
    pub fraud_risk_indicator: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub similarity_score: u32,
    pub benchmark_grade: BenchmarkGrade,
    pub best_match_percentage: f64,
    pub matches: Vec<BenchmarkMatch>,
    pub industry_comparison: String,
    pub industry_rating: String,
    pub recommendations: Vec<String>,
    pub fallback_analysis: bool,
    pub legacy: LegacyBenchmark,
}

/// Prohibited-term and readability overlay across the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryAssessment {
    pub compliance_score: u32,
    pub irdai_compliant: bool,
    pub prohibited_terms_found: Vec<String>,
    pub readability_requirement_met: bool,
    /// One entry per failed check, paired by index with the advice below.
    #[serde(default)]
    pub regulatory_issues: Vec<String>,
    #[serde(default)]
    pub compliance_recommendations: Vec<String>,
    pub framework_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Completed,
    Fallback,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTiming {
    pub analyzer: AnalyzerKind,
    pub duration_ms: u64,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetrics {
    pub processing_time_ms: u64,
    /// Whitespace-separated words in the clause.
    pub tokens_processed: usize,
    pub analyzers_run: usize,
    pub fallback_units: usize,
    pub failed_units: usize,
    pub unit_timings: Vec<UnitTiming>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseMetadata {
    /// Derived quality signal in `[0, 1]`.
    pub processing_confidence: f64,
    pub audit_trail_id: String,
    pub compliance_framework: String,
    pub processing_metrics: ProcessingMetrics,
    pub security_classification: String,
    pub data_retention_policy: String,
}

/// Everything produced for one clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub analysis_id: String,
    pub timestamp: DateTime<Utc>,
    pub original_clause: String,
    pub processing_model: String,
    pub plain_english: UnitOutcome<RewriteResult>,
    pub compliance_check: ComplianceResult,
    pub customer_scenario: UnitOutcome<ScenarioResult>,
    pub multilingual: UnitOutcome<MultilingualResult>,
    pub risk_score: RiskResult,
    pub training_materials: TrainingResult,
    pub benchmark_analysis: BenchmarkResult,
    pub regulatory_assessment: RegulatoryAssessment,
    pub enterprise_metadata: EnterpriseMetadata,
}

impl AggregateResult {
    /// Error text per failed unit, in run order.
    pub fn failed_units(&self) -> Vec<(AnalyzerKind, &str)> {
        [
            (AnalyzerKind::PlainEnglish, self.plain_english.error()),
            (AnalyzerKind::CustomerScenario, self.customer_scenario.error()),
            (AnalyzerKind::Multilingual, self.multilingual.error()),
        ]
        .into_iter()
        .filter_map(|(kind, error)| error.map(|e| (kind, e)))
        .collect()
    }
}
