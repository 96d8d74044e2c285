//! Benchmarking against standard industry clauses.
//!
//! The clause is compared with a small library of standard wordings using
//! a blend of character-sequence and token-set similarity. When nothing in
//! the library is close enough, shared insurance keywords are used instead.
//! The model only contributes the narrative comparison.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::ask_json;
use crate::llm::{ModelClient, PromptTask};
use crate::models::{BenchmarkGrade, BenchmarkMatch, BenchmarkResult, LegacyBenchmark, MatchType};
use crate::text;

/// Standard clause library as (category, text).
pub const STANDARD_CLAUSES: [(&str, &str); 9] = [
    (
        "motor_own_damage",
        "The insurer will indemnify the insured against loss or damage to the insured vehicle \
         caused by accidental external means.",
    ),
    (
        "claim_notification",
        "The insured must notify the insurer of any claim within 30 days of the loss occurring.",
    ),
    (
        "nuclear_exclusion",
        "The insurer shall not be liable for any loss or damage caused by nuclear reaction, \
         radiation or radioactive contamination.",
    ),
    (
        "war_exclusion",
        "This policy does not cover any loss or damage caused by war, invasion, acts of foreign \
         enemies or civil war.",
    ),
    (
        "deductible",
        "A deductible amount stated in the policy schedule shall be borne by the insured for \
         each and every claim.",
    ),
    (
        "sum_insured_limit",
        "The maximum liability of the insurer shall not exceed the sum insured stated in the \
         policy schedule.",
    ),
    (
        "cancellation",
        "The insurer may cancel this policy by giving thirty days written notice to the insured \
         and shall refund the unexpired premium.",
    ),
    (
        "pre_existing",
        "Coverage excludes any pre-existing condition or damage that existed before the start \
         of the policy period.",
    ),
    (
        "premium_grace",
        "Premium payments must be made within the grace period of fifteen days from the due date \
         to keep coverage in force.",
    ),
];

pub const INSURANCE_KEYWORDS: [&str; 10] = [
    "coverage",
    "premium",
    "claim",
    "deductible",
    "policy",
    "insured",
    "insurer",
    "loss",
    "damage",
    "liability",
];

const LEGACY_TERMS: [&str; 7] = [
    "notwithstanding",
    "heretofore",
    "whereupon",
    "aforementioned",
    "pursuant to",
    "inasmuch as",
    "provided that",
];

pub const SIMILARITY_THRESHOLD: f64 = 0.6;
const EXACT_THRESHOLD: f64 = 0.9;
const MIN_SHARED_KEYWORDS: usize = 2;
const KEYWORD_SCORE_CAP: u32 = 59;
const NO_MATCH_SCORE_CAP: u32 = 25;

/// Library-matching half of the benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryComparison {
    pub matches: Vec<BenchmarkMatch>,
    pub best_match_percentage: f64,
    pub similarity_score: u32,
}

/// `0.6 * sequence ratio + 0.4 * token Jaccard`.
pub fn blended_similarity(a: &str, b: &str) -> f64 {
    0.6 * text::sequence_ratio(a, b) + 0.4 * text::jaccard_similarity(a, b)
}

pub fn compare_with_library(clause: &str) -> LibraryComparison {
    let scored: Vec<(&str, &str, f64)> = STANDARD_CLAUSES
        .iter()
        .map(|&(category, standard)| (category, standard, blended_similarity(clause, standard)))
        .collect();

    let best = scored.iter().map(|&(_, _, s)| s).fold(0.0_f64, f64::max);
    let best_match_percentage = text::round_to(best * 100.0, 2);
    let best_points = best_match_percentage.round() as u32;

    let mut matches: Vec<BenchmarkMatch> = scored
        .iter()
        .filter(|&&(_, _, s)| s >= SIMILARITY_THRESHOLD)
        .map(|&(category, standard, s)| BenchmarkMatch {
            category: category.to_string(),
            standard_text: standard.to_string(),
            similarity: text::round_to(s, 3),
            match_type: if s > EXACT_THRESHOLD {
                MatchType::Exact
            } else {
                MatchType::Similar
            },
            shared_keywords: Vec::new(),
        })
        .collect();
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    if !matches.is_empty() {
        let bonus = (2 * matches.len() as u32).min(10);
        return LibraryComparison {
            similarity_score: (best_points + bonus).min(100),
            matches,
            best_match_percentage,
        };
    }

    debug!("No library clause above threshold, trying keyword matches");
    let keyword_matches = keyword_matches(clause, &scored);
    let similarity_score = match keyword_matches.iter().map(|m| m.shared_keywords.len()).max() {
        Some(shared) => (best_points + 5 * shared as u32).min(KEYWORD_SCORE_CAP),
        None => (best_points / 2).min(NO_MATCH_SCORE_CAP),
    };

    LibraryComparison {
        matches: keyword_matches,
        best_match_percentage,
        similarity_score,
    }
}

fn keyword_matches(clause: &str, scored: &[(&str, &str, f64)]) -> Vec<BenchmarkMatch> {
    let keywords: BTreeSet<String> = INSURANCE_KEYWORDS.iter().map(|k| k.to_string()).collect();
    let clause_keywords: BTreeSet<String> =
        text::tokens(clause).intersection(&keywords).cloned().collect();

    let mut matches: Vec<BenchmarkMatch> = scored
        .iter()
        .filter_map(|&(category, standard, s)| {
            let shared: Vec<String> = text::tokens(standard)
                .intersection(&clause_keywords)
                .cloned()
                .collect();
            (shared.len() >= MIN_SHARED_KEYWORDS).then(|| BenchmarkMatch {
                category: category.to_string(),
                standard_text: standard.to_string(),
                similarity: text::round_to(s, 3),
                match_type: MatchType::Keyword,
                shared_keywords: shared,
            })
        })
        .collect();
    matches.sort_by(|a, b| b.shared_keywords.len().cmp(&a.shared_keywords.len()));
    matches
}

/// Deviation score from the older benchmark format.
pub fn legacy_deviation(clause: &str) -> LegacyBenchmark {
    let words = text::word_count(clause);
    let mut score = 10;
    if words > 100 {
        score += 10;
    }
    if words < 20 {
        score += 5;
    }
    score += 5 * text::find_phrases(clause, &LEGACY_TERMS).len() as u32;
    let score = score.min(100);

    LegacyBenchmark {
        deviation_score: score,
        fraud_risk_indicator: score > 30,
    }
}

#[derive(Debug, Deserialize)]
struct IndustryReply {
    industry_comparison: String,
    industry_rating: String,
    #[serde(default)]
    recommendations: Vec<String>,
}

fn canned_comparison(grade: BenchmarkGrade, comparison: &LibraryComparison) -> IndustryReply {
    let closest = comparison
        .matches
        .first()
        .map(|m| m.category.replace('_', " "))
        .unwrap_or_else(|| "no standard clause".to_string());

    let (rating, summary, recommendations) = match grade {
        BenchmarkGrade::APlus | BenchmarkGrade::A => (
            "Standard",
            "The wording closely follows standard market practice.",
            vec!["Keep the wording aligned with the standard clause"],
        ),
        BenchmarkGrade::B | BenchmarkGrade::C => (
            "Standard",
            "The wording is recognisably standard but departs from it in places.",
            vec!["Review the differences from the standard wording"],
        ),
        BenchmarkGrade::D => (
            "Below Standard",
            "The wording does not follow any standard clause in the library.",
            vec![
                "Compare the clause with standard industry wording",
                "Have the clause reviewed by the product team",
            ],
        ),
    };

    IndustryReply {
        industry_comparison: format!(
            "{} Closest match: {} ({:.0}% similar).",
            summary, closest, comparison.best_match_percentage
        ),
        industry_rating: rating.to_string(),
        recommendations: recommendations.into_iter().map(str::to_string).collect(),
    }
}

pub struct BenchmarkAnalyzer {
    client: Arc<dyn ModelClient>,
}

impl BenchmarkAnalyzer {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub async fn analyze_similarity(&self, clause: &str) -> BenchmarkResult {
        let comparison = compare_with_library(clause);
        let grade = BenchmarkGrade::from_score(comparison.similarity_score);

        let (narrative, fallback_analysis) =
            match ask_json::<IndustryReply>(self.client.as_ref(), PromptTask::IndustryComparison, clause)
                .await
            {
                Ok(reply) => (reply, false),
                Err(e) => {
                    warn!("Industry comparison unavailable, using canned narrative: {}", e);
                    (canned_comparison(grade, &comparison), true)
                }
            };

        BenchmarkResult {
            similarity_score: comparison.similarity_score,
            benchmark_grade: grade,
            best_match_percentage: comparison.best_match_percentage,
            matches: comparison.matches,
            industry_comparison: narrative.industry_comparison,
            industry_rating: narrative.industry_rating,
            recommendations: narrative.recommendations,
            fallback_analysis,
            legacy: legacy_deviation(clause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use crate::llm::InvocationError;

    #[test]
    fn test_identical_clause_scores_100() {
        for (category, standard) in STANDARD_CLAUSES {
            let comparison = compare_with_library(standard);
            assert_eq!(comparison.similarity_score, 100, "{}", category);
            assert_eq!(comparison.matches[0].category, category);
            assert_eq!(comparison.matches[0].match_type, MatchType::Exact);
            assert_eq!(comparison.best_match_percentage, 100.0);
        }
    }

    #[test]
    fn test_every_keyword_occurs_in_library() {
        let library: BTreeSet<String> = STANDARD_CLAUSES
            .iter()
            .flat_map(|(_, standard)| text::tokens(standard))
            .collect();
        for keyword in INSURANCE_KEYWORDS {
            assert!(library.contains(keyword), "{} missing from library", keyword);
        }
    }

    #[test]
    fn test_unrelated_text_scores_at_most_25() {
        for clause in [
            "Quantum zebras juggle xylophones beneath purple volcanoes.",
            "Bananas yield joyful music.",
            "",
        ] {
            let comparison = compare_with_library(clause);
            assert!(comparison.similarity_score <= 25, "{:?}", clause);
            assert!(comparison.matches.is_empty());
            assert_eq!(
                BenchmarkGrade::from_score(comparison.similarity_score),
                BenchmarkGrade::D
            );
        }
    }

    #[test]
    fn test_keyword_fallback() {
        let clause = "Our premium plan gives coverage for every policy holder, one claim a year.";
        let comparison = compare_with_library(clause);

        assert!(!comparison.matches.is_empty());
        assert!(comparison
            .matches
            .iter()
            .all(|m| m.match_type == MatchType::Keyword && m.shared_keywords.len() >= 2));
        assert!(comparison.similarity_score <= 59);
    }

    #[test]
    fn test_near_copy_is_similar_not_exact() {
        let clause = "The insured must notify the insurer about any claim within 30 days of the loss.";
        let comparison = compare_with_library(clause);

        let best = &comparison.matches[0];
        assert_eq!(best.category, "claim_notification");
        assert!(best.similarity >= SIMILARITY_THRESHOLD);
        assert!(comparison.similarity_score >= 80);
    }

    #[test]
    fn test_legacy_deviation_scoring() {
        let long = format!(
            "{} notwithstanding the schedule and pursuant to the terms, provided that notice is given.",
            "word ".repeat(100)
        );
        let legacy = legacy_deviation(&long);
        // 10 base + 10 length + 3 terms * 5
        assert_eq!(legacy.deviation_score, 35);
        assert!(legacy.fraud_risk_indicator);

        let short = legacy_deviation("Claims are paid in seven days.");
        assert_eq!(short.deviation_score, 15);
        assert!(!short.fraud_risk_indicator);
    }

    #[tokio::test]
    async fn test_model_narrative_and_fallback() {
        let reply = r#"{"industry_comparison": "Matches market wording", "industry_rating": "Standard", "recommendations": ["None needed"]}"#;
        let analyzer = BenchmarkAnalyzer::new(Arc::new(ScriptedClient::new([
            Ok(reply.to_string()),
            Err(InvocationError::Offline),
        ])));
        let clause = STANDARD_CLAUSES[4].1;

        let first = analyzer.analyze_similarity(clause).await;
        assert_eq!(first.industry_comparison, "Matches market wording");
        assert!(!first.fallback_analysis);
        assert_eq!(first.benchmark_grade, BenchmarkGrade::APlus);

        let second = analyzer.analyze_similarity(clause).await;
        assert!(second.fallback_analysis);
        assert_eq!(second.industry_rating, "Standard");
        assert!(second.industry_comparison.contains("deductible"));
        assert_eq!(second.similarity_score, first.similarity_score);
    }
}
