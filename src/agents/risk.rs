//! Financial and dispute risk scoring.
//!
//! Two scoring formulas exist and are kept apart on purpose:
//!
//! - [`primary_score`] blends the model's Low/Medium/High judgements with a
//!   high-risk phrase count. A reply that cannot be parsed is scored with
//!   this formula against a neutral Medium/Medium judgement.
//! - [`heuristic_assessment`] is used when the model cannot be reached at
//!   all, and scores from phrase counts, length and vague terms only.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::{ask_json, AgentError};
use crate::llm::{ModelClient, PromptTask};
use crate::models::{RiskLevel, RiskResult};
use crate::text;

pub const HIGH_RISK_PHRASES: [&str; 7] = [
    "unlimited coverage",
    "all risks",
    "any loss",
    "regardless of cause",
    "without limitation",
    "maximum coverage",
    "full replacement",
];

const FALLBACK_VAGUE_TERMS: [&str; 5] = [
    "discretion",
    "appropriate",
    "reasonable",
    "from time to time",
    "subject to",
];

const PRIMARY_BASE: u32 = 30;
const FALLBACK_BASE: u32 = 40;
const PHRASE_WEIGHT: u32 = 15;
const REVIEW_THRESHOLD: u32 = 70;

#[derive(Debug, Deserialize)]
struct RiskReply {
    financial_risk: String,
    dispute_potential: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    mitigation_suggestions: Vec<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl RiskReply {
    fn neutral() -> Self {
        Self {
            financial_risk: "Medium".to_string(),
            dispute_potential: "Medium".to_string(),
            explanation: "Model assessment could not be read; moderate risk assumed".to_string(),
            mitigation_suggestions: vec!["Have an underwriter review the clause wording".to_string()],
            confidence: None,
        }
    }
}

pub struct RiskScorer {
    client: Arc<dyn ModelClient>,
}

impl RiskScorer {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub async fn score_risk(&self, clause: &str) -> RiskResult {
        match ask_json::<RiskReply>(self.client.as_ref(), PromptTask::RiskAnalysis, clause).await {
            Ok(reply) => primary_assessment(clause, reply, false),
            Err(AgentError::Parse(e)) => {
                warn!("Risk reply unreadable, scoring neutral judgement: {}", e);
                primary_assessment(clause, RiskReply::neutral(), true)
            }
            Err(AgentError::Invocation(e)) => {
                warn!("Risk model unavailable, using heuristic scoring: {}", e);
                heuristic_assessment(clause)
            }
        }
    }
}

fn level_points(level: RiskLevel) -> u32 {
    match level {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 20,
        RiskLevel::High => 30,
    }
}

/// `min(100, 30 + 15 * phrases + points(financial) + points(dispute))`.
pub fn primary_score(phrase_count: usize, financial: RiskLevel, dispute: RiskLevel) -> u32 {
    let phrases = (phrase_count as u32).saturating_mul(PHRASE_WEIGHT);
    (PRIMARY_BASE + phrases + level_points(financial) + level_points(dispute)).min(100)
}

fn primary_assessment(clause: &str, reply: RiskReply, fallback_analysis: bool) -> RiskResult {
    let phrases = text::find_phrases(clause, &HIGH_RISK_PHRASES);
    let financial = RiskLevel::from_label(&reply.financial_risk).unwrap_or(RiskLevel::Medium);
    let dispute = RiskLevel::from_label(&reply.dispute_potential).unwrap_or(RiskLevel::Medium);
    let score = primary_score(phrases.len(), financial, dispute);

    RiskResult {
        risk_score: score,
        risk_level: RiskLevel::from_score(score),
        financial_risk: financial,
        dispute_potential: dispute,
        phrase_risk: phrases.into_iter().map(str::to_string).collect(),
        explanation: reply.explanation,
        mitigation_suggestions: reply.mitigation_suggestions,
        requires_underwriter_review: score >= REVIEW_THRESHOLD,
        fallback_analysis,
        model_confidence: reply.confidence.map(|c| c.clamp(0.0, 1.0)),
    }
}

/// Score a clause without any model input.
pub fn heuristic_assessment(clause: &str) -> RiskResult {
    let phrases = text::find_phrases(clause, &HIGH_RISK_PHRASES);
    let vague = text::find_phrases(clause, &FALLBACK_VAGUE_TERMS);
    let words = text::word_count(clause);
    let sentences = text::sentence_count(clause);

    let mut score = FALLBACK_BASE + phrases.len() as u32 * PHRASE_WEIGHT;
    if words > 50 {
        score += 10;
    }
    if sentences <= 1 && words > 20 {
        score += 10;
    }
    score += vague.len() as u32 * 8;
    let score = score.min(100);

    let financial = if score >= 50 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    let dispute = match vague.len() {
        0 => RiskLevel::Low,
        1 | 2 => RiskLevel::Medium,
        _ => RiskLevel::High,
    };

    let mut mitigation = Vec::new();
    if !phrases.is_empty() {
        mitigation.push("Add explicit limits to open-ended coverage wording".to_string());
    }
    if !vague.is_empty() {
        mitigation.push("Replace discretionary terms with objective criteria".to_string());
    }
    if words > 50 {
        mitigation.push("Split the clause into shorter, separate conditions".to_string());
    }

    RiskResult {
        risk_score: score,
        risk_level: RiskLevel::from_score(score),
        financial_risk: financial,
        dispute_potential: dispute,
        explanation: format!(
            "Heuristic assessment from {} high-risk phrase(s), {} vague term(s) and {} words \
             (Fallback analysis - LLM unavailable)",
            phrases.len(),
            vague.len(),
            words
        ),
        phrase_risk: phrases.into_iter().map(str::to_string).collect(),
        mitigation_suggestions: mitigation,
        requires_underwriter_review: score >= REVIEW_THRESHOLD,
        fallback_analysis: true,
        model_confidence: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use crate::llm::InvocationError;

    const SIMPLE_CLAUSE: &str = "The insurer will pay for damages to your car caused by accidents.";

    fn scorer(client: ScriptedClient) -> RiskScorer {
        RiskScorer::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_simple_clause_fallback_scores_base() {
        let scorer = scorer(ScriptedClient::always(Err(InvocationError::Connect {
            url: "http://localhost".to_string(),
        })));
        let result = scorer.score_risk(SIMPLE_CLAUSE).await;

        assert!(result.phrase_risk.is_empty());
        assert_eq!(result.risk_score, 40);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.financial_risk, RiskLevel::Low);
        assert_eq!(result.dispute_potential, RiskLevel::Low);
        assert!(result.fallback_analysis);
        assert!(!result.requires_underwriter_review);
        assert!(result.explanation.ends_with("(Fallback analysis - LLM unavailable)"));
    }

    #[tokio::test]
    async fn test_model_judgement_feeds_primary_formula() {
        let reply = "```json\n{\"financial_risk\": \"High\", \"dispute_potential\": \"medium\", \
                     \"explanation\": \"Open-ended cover\", \"mitigation_suggestions\": [\"Cap it\"], \
                     \"confidence\": 0.9}\n```";
        let scorer = scorer(ScriptedClient::new([Ok(reply.to_string())]));

        let result = scorer
            .score_risk("We provide unlimited coverage for any loss.")
            .await;

        // 30 + 2 * 15 + 30 + 20
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.phrase_risk, vec!["unlimited coverage", "any loss"]);
        assert!(result.requires_underwriter_review);
        assert!(!result.fallback_analysis);
        assert_eq!(result.model_confidence, Some(0.9));
        assert_eq!(result.explanation, "Open-ended cover");
    }

    #[tokio::test]
    async fn test_unreadable_reply_scores_neutral_judgement() {
        let scorer = scorer(ScriptedClient::new([Ok("Risk is moderate.".to_string())]));
        let result = scorer.score_risk(SIMPLE_CLAUSE).await;

        // 30 + 0 + 20 + 20
        assert_eq!(result.risk_score, 70);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert!(result.requires_underwriter_review);
        assert!(result.fallback_analysis);
        assert_eq!(result.model_confidence, None);
    }

    #[tokio::test]
    async fn test_unknown_labels_count_as_medium() {
        let reply = r#"{"financial_risk": "Severe", "dispute_potential": "Low"}"#;
        let scorer = scorer(ScriptedClient::new([Ok(reply.to_string())]));
        let result = scorer.score_risk(SIMPLE_CLAUSE).await;

        assert_eq!(result.financial_risk, RiskLevel::Medium);
        assert_eq!(result.risk_score, 50);
    }

    #[test]
    fn test_heuristic_is_deterministic() {
        let clause = "Subject to the schedule, the insurer may at its discretion pay any loss \
                      it deems reasonable from time to time for all risks covered here today";
        let first = heuristic_assessment(clause);
        assert_eq!(first, heuristic_assessment(clause));

        // 40 + 2 phrases * 15 + single long sentence 10 + 4 vague * 8
        assert_eq!(first.risk_score, 100);
        assert_eq!(first.dispute_potential, RiskLevel::High);
        assert_eq!(first.financial_risk, RiskLevel::Medium);
    }

    #[test]
    fn test_scores_are_bounded_and_monotonic_in_phrases() {
        for financial in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            for n in 0..10 {
                let score = primary_score(n, financial, RiskLevel::High);
                assert!(score <= 100);
                assert!(primary_score(n + 1, financial, RiskLevel::High) >= score);
            }
        }

        let mut clause = String::from("The insurer pays.");
        let mut previous = heuristic_assessment(&clause).risk_score;
        for phrase in HIGH_RISK_PHRASES {
            clause.push_str(&format!(" It offers {}.", phrase));
            let score = heuristic_assessment(&clause).risk_score;
            assert!(score >= previous);
            assert!(score <= 100);
            previous = score;
        }
    }
}
