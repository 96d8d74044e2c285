//! Regulatory compliance checking.
//!
//! A fixed vague-phrase scan always runs locally. The model adds issues and
//! recommendations; when its reply is unusable the structural heuristics in
//! [`heuristic_review`] take its place.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::ask_json;
use crate::llm::{ModelClient, PromptTask};
use crate::models::{ComplianceResult, ComplianceStatus, VagueLanguageFinding};
use crate::text;

/// Vague phrases and the wording advice attached to each detection.
pub const VAGUE_PHRASES: [(&str, &str); 7] = [
    (
        "notwithstanding",
        "Replace 'notwithstanding' with 'despite' or 'even if'",
    ),
    (
        "reasonable effort",
        "State exactly which actions the policyholder must take",
    ),
    (
        "as appropriate",
        "Name the specific conditions that apply",
    ),
    (
        "from time to time",
        "Say how often, or under which conditions, this happens",
    ),
    (
        "subject to",
        "Name the exact terms or conditions being referred to",
    ),
    (
        "at our discretion",
        "Define the criteria used to make the decision",
    ),
    (
        "at its discretion",
        "Define the criteria used to make the decision",
    ),
];

const JARGON_TERMS: [&str; 4] = ["notwithstanding", "heretofore", "wherefore", "pursuant to"];

const MAX_AVG_SENTENCE_WORDS: f64 = 25.0;
const MAX_CLAUSE_WORDS: usize = 100;
const PENALTY_PER_ISSUE: u32 = 10;

#[derive(Debug, Deserialize)]
struct ComplianceReply {
    issues: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

pub struct ComplianceChecker {
    client: Arc<dyn ModelClient>,
}

impl ComplianceChecker {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub async fn check_compliance(&self, clause: &str) -> ComplianceResult {
        let vague = detect_vague_language(clause);

        match ask_json::<ComplianceReply>(self.client.as_ref(), PromptTask::ComplianceReview, clause)
            .await
        {
            Ok(reply) => {
                let issues: Vec<String> = reply
                    .issues
                    .into_iter()
                    .filter(|issue| !is_placeholder(issue))
                    .collect();
                build_result(vague, issues, reply.recommendations, false)
            }
            Err(e) => {
                warn!("Compliance review unavailable, using heuristics: {}", e);
                let (issues, recommendations) = heuristic_review(clause);
                build_result(vague, issues, recommendations, true)
            }
        }
    }
}

/// Scan for the fixed vague-phrase list, independent of any model call.
pub fn detect_vague_language(clause: &str) -> Vec<VagueLanguageFinding> {
    let lower = clause.to_lowercase();
    VAGUE_PHRASES
        .iter()
        .filter(|(phrase, _)| lower.contains(phrase))
        .map(|(phrase, recommendation)| VagueLanguageFinding {
            phrase: phrase.to_string(),
            recommendation: recommendation.to_string(),
        })
        .collect()
}

/// Issues derived from sentence length, clause length and legal jargon.
pub fn heuristic_review(clause: &str) -> (Vec<String>, Vec<String>) {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let words = text::word_count(clause);
    let sentences = text::sentence_count(clause).max(1);
    let average = words as f64 / sentences as f64;

    if average > MAX_AVG_SENTENCE_WORDS {
        issues.push(format!(
            "Sentences average {:.0} words, above the plain-language limit of {:.0}",
            average, MAX_AVG_SENTENCE_WORDS
        ));
        recommendations.push("Split long sentences into shorter ones of under 20 words".to_string());
    }

    if words > MAX_CLAUSE_WORDS {
        issues.push(format!("Clause is {} words long and hard to follow", words));
        recommendations.push("Break the clause into separate numbered conditions".to_string());
    }

    let jargon = text::find_phrases(clause, &JARGON_TERMS);
    if !jargon.is_empty() {
        issues.push(format!("Contains legal jargon: {}", jargon.join(", ")));
        recommendations.push("Replace legal jargon with plain English terms".to_string());
    }

    (issues, recommendations)
}

/// `max(0, 100 - 10 * issue_count)`.
pub fn compliance_score(issue_count: usize) -> u32 {
    let penalty = (issue_count as u32).saturating_mul(PENALTY_PER_ISSUE);
    100u32.saturating_sub(penalty)
}

/// Models often answer "No issues found" instead of an empty list.
fn is_placeholder(issue: &str) -> bool {
    let lower = issue.trim().trim_end_matches('.').to_lowercase();
    lower.is_empty()
        || lower == "none"
        || lower == "n/a"
        || lower.starts_with("no issues")
        || lower.starts_with("no compliance issues")
}

fn build_result(
    vague: Vec<VagueLanguageFinding>,
    issues: Vec<String>,
    recommendations: Vec<String>,
    fallback_analysis: bool,
) -> ComplianceResult {
    let score = compliance_score(vague.len() + issues.len());
    let status = ComplianceStatus::from_score(score);

    ComplianceResult {
        compliance_score: score,
        irdai_compliant: status == ComplianceStatus::Compliant,
        status,
        issues,
        recommendations,
        vague_language_detected: vague,
        fallback_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use crate::llm::InvocationError;

    const VAGUE_CLAUSE: &str = "The company may, at its discretion, revise the benefits from time \
                                to time, subject to the terms of the schedule.";

    fn checker(client: ScriptedClient) -> ComplianceChecker {
        ComplianceChecker::new(Arc::new(client))
    }

    #[test]
    fn test_detects_three_vague_phrases() {
        let found = detect_vague_language(VAGUE_CLAUSE);
        let phrases: Vec<&str> = found.iter().map(|f| f.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["from time to time", "subject to", "at its discretion"]);
        assert!(found.iter().all(|f| !f.recommendation.is_empty()));
    }

    #[tokio::test]
    async fn test_vague_detection_independent_of_model_outcome() {
        let replies = [
            Ok(r#"{"issues": [], "recommendations": []}"#.to_string()),
            Ok("I cannot answer that.".to_string()),
            Err(InvocationError::Timeout { seconds: 60 }),
        ];
        let checker = checker(ScriptedClient::new(replies));

        for _ in 0..3 {
            let result = checker.check_compliance(VAGUE_CLAUSE).await;
            assert_eq!(result.vague_language_detected.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_model_issues_count_toward_score() {
        let reply = "```json\n{\"issues\": [\"Benefit revision is one-sided\"], \
                     \"recommendations\": [\"Give 30 days notice of changes\"]}\n```";
        let checker = checker(ScriptedClient::new([Ok(reply.to_string())]));

        let result = checker.check_compliance(VAGUE_CLAUSE).await;
        assert_eq!(result.compliance_score, 60);
        assert_eq!(result.status, ComplianceStatus::NeedsReview);
        assert!(!result.irdai_compliant);
        assert!(!result.fallback_analysis);
        assert_eq!(result.recommendations, vec!["Give 30 days notice of changes"]);
    }

    #[tokio::test]
    async fn test_placeholder_issue_is_not_counted() {
        let reply = r#"{"issues": ["No issues found."], "recommendations": []}"#;
        let checker = checker(ScriptedClient::new([Ok(reply.to_string())]));

        let result = checker.check_compliance("Claims must be reported within 30 days.").await;
        assert!(result.issues.is_empty());
        assert_eq!(result.compliance_score, 100);
        assert_eq!(result.status, ComplianceStatus::Compliant);
        assert!(result.irdai_compliant);
    }

    #[tokio::test]
    async fn test_fallback_is_deterministic() {
        let clause = "Notwithstanding any other provision, and pursuant to the schedule, the insurer \
                      may at its discretion decline claims that it considers, heretofore or hereafter, \
                      to be outside the intended scope of this cover as appropriate";
        let checker = checker(ScriptedClient::always(Err(InvocationError::Offline)));

        let first = checker.check_compliance(clause).await;
        let second = checker.check_compliance(clause).await;

        assert_eq!(first, second);
        assert!(first.fallback_analysis);
        // one long sentence plus one jargon entry, and three vague phrases
        assert_eq!(first.issues.len(), 2);
        assert_eq!(first.vague_language_detected.len(), 3);
        assert_eq!(first.compliance_score, 50);
        assert_eq!(first.status, ComplianceStatus::HighRisk);
    }

    #[tokio::test]
    async fn test_jargon_terms_share_one_issue() {
        let clause = "Notwithstanding clause 4, pursuant to the schedule, heretofore agreed.";
        let checker = checker(ScriptedClient::always(Err(InvocationError::Offline)));

        let result = checker.check_compliance(clause).await;
        assert_eq!(
            result.issues,
            vec!["Contains legal jargon: notwithstanding, heretofore, pursuant to"]
        );
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.vague_language_detected.len(), 1);
        assert_eq!(result.compliance_score, 80);
        assert_eq!(result.status, ComplianceStatus::Compliant);
        assert!(result.irdai_compliant);
    }

    #[tokio::test]
    async fn test_parse_failure_also_falls_back() {
        let checker = checker(ScriptedClient::new([Ok("Looks fine to me".to_string())]));
        let result = checker.check_compliance(VAGUE_CLAUSE).await;
        assert!(result.fallback_analysis);
        assert_eq!(result.compliance_score, 70);
    }

    #[test]
    fn test_score_is_bounded_and_monotonic() {
        assert_eq!(compliance_score(0), 100);
        assert_eq!(compliance_score(3), 70);
        assert_eq!(compliance_score(10), 0);
        assert_eq!(compliance_score(25), 0);
        for n in 0..15 {
            assert!(compliance_score(n + 1) <= compliance_score(n));
        }
    }
}
