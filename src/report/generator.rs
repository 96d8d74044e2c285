//! Markdown and JSON report generation.
//!
//! Reports cover a whole run: a summary across clauses followed by one
//! section per clause with every analyzer's record. Failed analyzers are
//! rendered with their error text so partial results stay readable.

use anyhow::Result;
use chrono::Utc;

use crate::analysis::BatchSummary;
use crate::models::{
    AggregateResult, AnalyzerKind, BenchmarkResult, ComplianceResult, MultilingualResult,
    RegulatoryAssessment, RewriteResult, RiskLevel, RiskResult, ScenarioResult, TrainingResult,
    UnitOutcome,
};

/// Which optional sections to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub include_translations: bool,
    pub include_training: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_translations: true,
            include_training: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(results: &[AggregateResult], options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str("# Clausewise Analysis Report\n\n");
    output.push_str(&generate_metadata_section(results));
    output.push_str(&generate_table_of_contents(results));
    output.push_str(&generate_summary_section(results));

    for (index, result) in results.iter().enumerate() {
        output.push_str(&generate_clause_section(index + 1, result, options));
    }

    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(results: &[AggregateResult]) -> String {
    let mut section = String::new();

    let model = results
        .first()
        .map(|r| r.processing_model.as_str())
        .unwrap_or("n/a");
    let total_ms: u64 = results
        .iter()
        .map(|r| r.enterprise_metadata.processing_metrics.processing_time_ms)
        .sum();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Report Date:** {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", model));
    section.push_str(&format!("- **Clauses Analyzed:** {}\n", results.len()));
    if let Some(first) = results.first() {
        section.push_str(&format!(
            "- **Compliance Framework:** {}\n",
            first.enterprise_metadata.compliance_framework
        ));
        section.push_str(&format!(
            "- **Classification:** {}\n",
            first.enterprise_metadata.security_classification
        ));
    }
    section.push_str(&format!(
        "- **Processing Time:** {:.1}s\n\n",
        total_ms as f64 / 1000.0
    ));

    section
}

fn generate_table_of_contents(results: &[AggregateResult]) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Summary](#summary)\n");
    for (index, result) in results.iter().enumerate() {
        toc.push_str(&format!(
            "  - [Clause {}](#clause-{}-{})\n",
            index + 1,
            index + 1,
            result.analysis_id
        ));
    }
    toc.push('\n');

    toc
}

fn generate_summary_section(results: &[AggregateResult]) -> String {
    let summary = BatchSummary::from_results(results);
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("### Risk Distribution\n\n");
    section.push_str(&format!(
        "| {} High | {} Medium | {} Low | **Average Score** |\n",
        RiskLevel::High.emoji(),
        RiskLevel::Medium.emoji(),
        RiskLevel::Low.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{:.1}** |\n\n",
        summary.high_risk, summary.medium_risk, summary.low_risk, summary.average_risk_score
    ));

    section.push_str(&format!(
        "- **Average Compliance Score:** {:.1}\n",
        summary.average_compliance_score
    ));
    section.push_str(&format!(
        "- **Analyzers on Fallback:** {}\n",
        summary.fallback_units
    ));
    if summary.failed_units > 0 {
        section.push_str(&format!("- **Analyzers Failed:** {}\n", summary.failed_units));
    }
    section.push('\n');

    if !results.is_empty() {
        section.push_str("### Clauses\n\n");
        section.push_str("| # | Clause | Risk | Compliance | Benchmark | Confidence |\n");
        section.push_str("|:---:|:---|:---:|:---:|:---:|:---:|\n");
        for (index, result) in results.iter().enumerate() {
            section.push_str(&format!(
                "| {} | {} | {} {} ({}) | {} | {} | {:.3} |\n",
                index + 1,
                excerpt(&result.original_clause, 60),
                result.risk_score.risk_level.emoji(),
                result.risk_score.risk_level,
                result.risk_score.risk_score,
                result.compliance_check.compliance_score,
                result.benchmark_analysis.benchmark_grade,
                result.enterprise_metadata.processing_confidence
            ));
        }
        section.push('\n');
    }

    section
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('|', "/");
    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }
    let cut: String = cleaned.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

fn generate_clause_section(number: usize, result: &AggregateResult, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## Clause {} {{#clause-{}-{}}}\n\n",
        number, number, result.analysis_id
    ));
    section.push_str(&format!("> {}\n\n", result.original_clause));
    section.push_str(&format!(
        "*Analysis ID: `{}` | Confidence: {:.3} | {}*\n\n",
        result.analysis_id,
        result.enterprise_metadata.processing_confidence,
        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    section.push_str(&outcome_block(AnalyzerKind::PlainEnglish, &result.plain_english, rewrite_block));
    section.push_str(&heading(AnalyzerKind::ComplianceCheck));
    section.push_str(&compliance_block(&result.compliance_check));
    section.push_str(&outcome_block(
        AnalyzerKind::CustomerScenario,
        &result.customer_scenario,
        scenario_block,
    ));
    if options.include_translations {
        section.push_str(&outcome_block(AnalyzerKind::Multilingual, &result.multilingual, translation_block));
    }
    section.push_str(&heading(AnalyzerKind::RiskScore));
    section.push_str(&risk_block(&result.risk_score));
    if options.include_training {
        section.push_str(&heading(AnalyzerKind::TrainingMaterials));
        section.push_str(&training_block(&result.training_materials));
    }
    section.push_str(&heading(AnalyzerKind::BenchmarkAnalysis));
    section.push_str(&benchmark_block(&result.benchmark_analysis));
    section.push_str(&regulatory_block(&result.regulatory_assessment));

    section.push_str("---\n\n");

    section
}

fn heading(kind: AnalyzerKind) -> String {
    format!("### {}\n\n", kind)
}

fn outcome_block<T>(kind: AnalyzerKind, outcome: &UnitOutcome<T>, render: fn(&T) -> String) -> String {
    let mut block = heading(kind);
    match outcome {
        UnitOutcome::Completed(value) => block.push_str(&render(value)),
        UnitOutcome::Failed { error } => block.push_str(&format!("> ❌ **Error:** {}\n\n", error)),
    }
    block
}

fn fallback_note(fallback: bool) -> &'static str {
    if fallback {
        "*Heuristic fallback: model output unavailable.*\n\n"
    } else {
        ""
    }
}

fn bullet_list(items: &[String]) -> String {
    let mut list = String::new();
    for item in items {
        list.push_str(&format!("- {}\n", item));
    }
    list.push('\n');
    list
}

fn rewrite_block(rewrite: &RewriteResult) -> String {
    let mut block = String::new();

    block.push_str(&format!("{}\n\n", rewrite.plain_english_text));
    block.push_str("| | Flesch Score | Grade Level | Words |\n");
    block.push_str("|:---|:---:|:---:|:---:|\n");
    for (label, metrics) in [
        ("Original", &rewrite.original_metrics),
        ("Rewritten", &rewrite.improved_metrics),
    ] {
        block.push_str(&format!(
            "| {} | {:.2} | {:.2} | {} |\n",
            label, metrics.flesch_score, metrics.grade_level, metrics.word_count
        ));
    }
    block.push_str(&format!(
        "\n**Readability Improvement:** {:+.2} | **Meets IRDAI Standards:** {}\n\n",
        rewrite.readability_improvement,
        yes_no(rewrite.meets_irdai_standards)
    ));

    block
}

fn compliance_block(compliance: &ComplianceResult) -> String {
    let mut block = String::new();

    block.push_str(fallback_note(compliance.fallback_analysis));
    block.push_str(&format!(
        "**Score:** {}/100 | **Status:** {} | **IRDAI Compliant:** {}\n\n",
        compliance.compliance_score,
        compliance.status,
        yes_no(compliance.irdai_compliant)
    ));

    if !compliance.vague_language_detected.is_empty() {
        block.push_str("**Vague Language:**\n\n");
        for finding in &compliance.vague_language_detected {
            block.push_str(&format!("- \"{}\": {}\n", finding.phrase, finding.recommendation));
        }
        block.push('\n');
    }
    if !compliance.issues.is_empty() {
        block.push_str("**Issues:**\n\n");
        block.push_str(&bullet_list(&compliance.issues));
    }
    if !compliance.recommendations.is_empty() {
        block.push_str("**Recommendations:**\n\n");
        block.push_str(&bullet_list(&compliance.recommendations));
    }

    block
}

fn scenario_block(scenario: &ScenarioResult) -> String {
    let mut block = String::new();

    block.push_str(&format!("{}\n\n", scenario.main_scenario));
    if !scenario.real_life_examples.is_empty() {
        block.push_str("**Real-life Examples:**\n\n");
        block.push_str(&bullet_list(&scenario.real_life_examples));
    }
    block.push_str(&format!("**Agent Script:** {}\n\n", scenario.customer_script));
    block.push_str(&format!("**In Simple Words:** {}\n\n", scenario.simple_explanation));

    block
}

fn translation_block(multilingual: &MultilingualResult) -> String {
    let mut block = String::new();

    for translation in &multilingual.translations {
        block.push_str(&format!(
            "**{}:** {}\n\n",
            translation.language_name, translation.translated_text
        ));
    }
    block.push_str(&format!(
        "*{} languages | Rural customer ready: {}*\n\n",
        multilingual.total_languages,
        yes_no(multilingual.rural_customer_ready)
    ));

    block
}

fn risk_block(risk: &RiskResult) -> String {
    let mut block = String::new();

    block.push_str(fallback_note(risk.fallback_analysis));
    block.push_str(&format!(
        "{} **{} Risk** ({}/100) | Financial: {} | Dispute: {} | Underwriter Review: {}\n\n",
        risk.risk_level.emoji(),
        risk.risk_level,
        risk.risk_score,
        risk.financial_risk,
        risk.dispute_potential,
        yes_no(risk.requires_underwriter_review)
    ));
    if !risk.phrase_risk.is_empty() {
        block.push_str(&format!(
            "**High-risk Phrases:** {}\n\n",
            risk.phrase_risk.join(", ")
        ));
    }
    if !risk.explanation.is_empty() {
        block.push_str(&format!("{}\n\n", risk.explanation));
    }
    if !risk.mitigation_suggestions.is_empty() {
        block.push_str("**Mitigation:**\n\n");
        block.push_str(&bullet_list(&risk.mitigation_suggestions));
    }

    block
}

fn training_block(training: &TrainingResult) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "**Level:** {} | **Audience:** {}\n\n",
        training.difficulty_level, training.target_audience
    ));
    if !training.fallback_sections.is_empty() {
        block.push_str(&format!(
            "*Canned content used for: {}*\n\n",
            training.fallback_sections.join(", ")
        ));
    }
    block.push_str(&format!("{}\n\n", training.training_module));

    block.push_str("**Learning Objectives:**\n\n");
    block.push_str(&bullet_list(&training.learning_objectives));
    block.push_str("**Key Points:**\n\n");
    block.push_str(&bullet_list(&training.learning_points));

    block.push_str("<details>\n<summary>Quiz</summary>\n\n");
    for (i, question) in training.quiz_questions.iter().enumerate() {
        block.push_str(&format!("{}. {}\n", i + 1, question.question));
        for (j, option) in question.options.iter().enumerate() {
            let marker = if j == question.correct_answer { "x" } else { " " };
            block.push_str(&format!("   - [{}] {}\n", marker, option));
        }
    }
    block.push_str("\n</details>\n\n");

    if !training.faq.is_empty() {
        block.push_str("**FAQ:**\n\n");
        for entry in &training.faq {
            block.push_str(&format!("- **Q:** {}\n  **A:** {}\n", entry.question, entry.answer));
        }
        block.push('\n');
    }
    block.push_str(&format!("> 💡 **Pitch:** {}\n\n", training.pitch_summary));

    block
}

fn benchmark_block(benchmark: &BenchmarkResult) -> String {
    let mut block = String::new();

    block.push_str(fallback_note(benchmark.fallback_analysis));
    block.push_str(&format!(
        "**Grade:** {} | **Similarity Score:** {}/100 | **Best Match:** {:.2}% | **Rating:** {}\n\n",
        benchmark.benchmark_grade,
        benchmark.similarity_score,
        benchmark.best_match_percentage,
        benchmark.industry_rating
    ));
    if !benchmark.matches.is_empty() {
        block.push_str("| Standard Clause | Similarity | Match |\n");
        block.push_str("|:---|:---:|:---:|\n");
        for m in &benchmark.matches {
            block.push_str(&format!(
                "| {} | {:.3} | {:?} |\n",
                m.category, m.similarity, m.match_type
            ));
        }
        block.push('\n');
    }
    block.push_str(&format!("{}\n\n", benchmark.industry_comparison));
    if !benchmark.recommendations.is_empty() {
        block.push_str(&bullet_list(&benchmark.recommendations));
    }

    block
}

fn regulatory_block(regulatory: &RegulatoryAssessment) -> String {
    let mut block = String::new();

    block.push_str("### Regulatory Assessment\n\n");
    block.push_str(&format!(
        "**Score:** {}/100 | **Compliant:** {} | **Readability Met:** {} | **Framework:** {}\n\n",
        regulatory.compliance_score,
        yes_no(regulatory.irdai_compliant),
        yes_no(regulatory.readability_requirement_met),
        regulatory.framework_version
    ));
    if !regulatory.regulatory_issues.is_empty() {
        block.push_str("| Issue | Recommendation |\n");
        block.push_str("|:---|:---|\n");
        for (i, issue) in regulatory.regulatory_issues.iter().enumerate() {
            let advice = regulatory
                .compliance_recommendations
                .get(i)
                .map(String::as_str)
                .unwrap_or("");
            block.push_str(&format!("| {} | {} |\n", issue, advice));
        }
        block.push('\n');
    }

    block
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn generate_footer() -> String {
    "---\n\n*Report generated by Clausewise*\n".to_string()
}

/// Generate a JSON report: a pretty-printed array of results.
pub fn generate_json_report(results: &[AggregateResult]) -> Result<String> {
    serde_json::to_string_pretty(results).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ClauseAnalyzer;
    use crate::llm::testing::{echo_schema, FnClient};
    use crate::llm::OfflineClient;
    use std::sync::Arc;

    const CLAUSE: &str = "Notify any claim within 30 days | or sooner.";

    async fn results_with(client: Arc<dyn crate::llm::ModelClient>) -> Vec<AggregateResult> {
        ClauseAnalyzer::new(client)
            .analyze_batch(&[CLAUSE.to_string()], 1)
            .await
    }

    #[tokio::test]
    async fn test_markdown_report_sections() {
        let results = results_with(Arc::new(FnClient::new(echo_schema))).await;
        let markdown = generate_markdown_report(&results, &ReportOptions::default());

        assert!(markdown.contains("# Clausewise Analysis Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains(&format!("## Clause 1 {{#clause-1-{}}}", results[0].analysis_id)));
        for kind in AnalyzerKind::ALL {
            assert!(markdown.contains(&format!("### {}", kind)), "{} missing", kind);
        }
        assert!(markdown.contains("Hindi (हिंदी)"));
        assert!(markdown.contains("### Regulatory Assessment"));
        // pipes in the clause must not break the summary table
        assert!(markdown.contains("| 1 | Notify any claim within 30 days / or sooner. |"));
    }

    #[tokio::test]
    async fn test_failed_units_render_errors() {
        let results = results_with(Arc::new(OfflineClient)).await;
        let markdown = generate_markdown_report(&results, &ReportOptions::default());

        assert!(markdown.contains("**Error:** Rewriting failed:"));
        assert!(markdown.contains("**Error:** Scenario generation failed:"));
        assert!(markdown.contains("Heuristic fallback"));
        assert!(markdown.contains("Analyzers Failed:** 3"));
        assert!(markdown.contains(
            "| Readability below IRDAI standards | Simplify language to improve readability score |"
        ));
    }

    #[tokio::test]
    async fn test_optional_sections_can_be_left_out() {
        let results = results_with(Arc::new(OfflineClient)).await;
        let options = ReportOptions {
            include_translations: false,
            include_training: false,
        };
        let markdown = generate_markdown_report(&results, &options);

        assert!(!markdown.contains("### Multilingual"));
        assert!(!markdown.contains("### Training Materials"));
        assert!(markdown.contains("### Risk Score"));
    }

    #[tokio::test]
    async fn test_generate_json_report() {
        let results = results_with(Arc::new(OfflineClient)).await;
        let json = generate_json_report(&results).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert!(json.contains("\"analysis_id\""));
        assert!(json.contains("\"enterprise_metadata\""));
        assert!(parsed[0]["plain_english"]["error"].is_string());
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("a very long clause text", 6), "a very...");
    }

    #[test]
    fn test_empty_report() {
        let markdown = generate_markdown_report(&[], &ReportOptions::default());
        assert!(markdown.contains("**Clauses Analyzed:** 0"));
        assert!(!markdown.contains("### Clauses"));
    }
}
