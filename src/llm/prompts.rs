//! Prompt templates.
//!
//! Every analyzer sub-task has one fixed template. Rendering is pure text
//! assembly: the same task and clause always produce the same prompt.
//! Templates that expect JSON embed a valid example of the schema they ask
//! for, so the reply parser and the prompt agree on field names.

use super::GenerationConfig;

const COMPLIANCE_SCHEMA: &str = r#"{
  "issues": ["specific issue found in the clause"],
  "recommendations": ["specific suggestion that fixes the issue"]
}"#;

const RISK_SCHEMA: &str = r#"{
  "financial_risk": "Medium",
  "dispute_potential": "Medium",
  "explanation": "brief explanation of the main risks",
  "mitigation_suggestions": ["suggestion 1", "suggestion 2"],
  "confidence": 0.8
}"#;

const QUIZ_SCHEMA: &str = r#"{
  "questions": [
    {
      "question": "What does this clause cover?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correct_answer": 0,
      "explanation": "Why option A is correct"
    }
  ]
}"#;

const INDUSTRY_SCHEMA: &str = r#"{
  "industry_comparison": "how the clause compares to standard market wording",
  "industry_rating": "Standard",
  "recommendations": ["recommendation 1", "recommendation 2"]
}"#;

/// One model sub-task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTask {
    PlainEnglishRewrite,
    ComplianceReview,
    RiskAnalysis,
    MainScenario,
    RealLifeExamples,
    AgentScript,
    SimpleExplanation,
    Translation { language_name: &'static str },
    TrainingModule,
    QuizQuestions,
    LearningPoints,
    LearningObjectives,
    PracticalExamples,
    RoleplayScenarios,
    CommonMistakes,
    FaqPairs,
    PitchSummary,
    IndustryComparison,
}

impl PromptTask {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            PromptTask::PlainEnglishRewrite => "plain_english_rewrite",
            PromptTask::ComplianceReview => "compliance_review",
            PromptTask::RiskAnalysis => "risk_analysis",
            PromptTask::MainScenario => "main_scenario",
            PromptTask::RealLifeExamples => "real_life_examples",
            PromptTask::AgentScript => "agent_script",
            PromptTask::SimpleExplanation => "simple_explanation",
            PromptTask::Translation { .. } => "translation",
            PromptTask::TrainingModule => "training_module",
            PromptTask::QuizQuestions => "quiz_questions",
            PromptTask::LearningPoints => "learning_points",
            PromptTask::LearningObjectives => "learning_objectives",
            PromptTask::PracticalExamples => "practical_examples",
            PromptTask::RoleplayScenarios => "roleplay_scenarios",
            PromptTask::CommonMistakes => "common_mistakes",
            PromptTask::FaqPairs => "faq_pairs",
            PromptTask::PitchSummary => "pitch_summary",
            PromptTask::IndustryComparison => "industry_comparison",
        }
    }

    /// Generation parameters for this task.
    ///
    /// Scoring and classification run cold (0.2); free-text generation runs
    /// warmer (0.3 - 0.5).
    pub fn generation_config(&self) -> GenerationConfig {
        match self {
            PromptTask::PlainEnglishRewrite => GenerationConfig::new(300, 0.3),
            PromptTask::ComplianceReview => GenerationConfig::new(400, 0.2),
            PromptTask::RiskAnalysis => GenerationConfig::new(300, 0.2),
            PromptTask::MainScenario => GenerationConfig::new(150, 0.4),
            PromptTask::RealLifeExamples => GenerationConfig::new(200, 0.5),
            PromptTask::AgentScript => GenerationConfig::new(150, 0.3),
            PromptTask::SimpleExplanation => GenerationConfig::new(100, 0.2),
            PromptTask::Translation { .. } => GenerationConfig::new(300, 0.3),
            PromptTask::TrainingModule => GenerationConfig::new(400, 0.4),
            PromptTask::QuizQuestions => GenerationConfig::new(500, 0.3),
            PromptTask::LearningPoints
            | PromptTask::LearningObjectives
            | PromptTask::PracticalExamples
            | PromptTask::CommonMistakes => GenerationConfig::new(250, 0.4),
            PromptTask::RoleplayScenarios => GenerationConfig::new(300, 0.4),
            PromptTask::FaqPairs => GenerationConfig::new(400, 0.4),
            PromptTask::PitchSummary => GenerationConfig::new(150, 0.3),
            PromptTask::IndustryComparison => GenerationConfig::new(400, 0.2),
        }
    }

    /// Whether the template asks for a JSON reply.
    pub fn expects_json(&self) -> bool {
        matches!(
            self,
            PromptTask::ComplianceReview
                | PromptTask::RiskAnalysis
                | PromptTask::QuizQuestions
                | PromptTask::IndustryComparison
        )
    }

    /// Render the full instruction for `clause`.
    pub fn render(&self, clause: &str) -> String {
        match self {
            PromptTask::PlainEnglishRewrite => format!(
                "Rewrite this insurance policy clause in plain English that meets IRDAI readability standards:\n\n\
                 Original clause: {}\n\n\
                 Requirements:\n\
                 - Reply with the rewritten clause only, no preamble\n\
                 - Use simple words (8th grade reading level)\n\
                 - Short sentences (max 20 words)\n\
                 - Active voice when possible\n\
                 - Remove legal jargon\n\
                 - Keep the same legal meaning\n\
                 - Make it customer-friendly\n\n\
                 Plain English version:",
                clause
            ),
            PromptTask::ComplianceReview => format!(
                "Analyze this insurance clause for regulatory compliance issues:\n\n\
                 Clause: {}\n\n\
                 Check for:\n\
                 1. Vague or ambiguous language\n\
                 2. Potential consumer disputes\n\
                 3. Non-compliance with the IRDAI plain language mandate\n\
                 4. Misleading or contradictory terms\n\
                 5. Hidden exclusions\n\n\
                 Respond in JSON with exactly these fields:\n{}",
                clause, COMPLIANCE_SCHEMA
            ),
            PromptTask::RiskAnalysis => format!(
                "Analyze this insurance clause for financial and legal risk:\n\n\
                 Clause: {}\n\n\
                 Evaluate:\n\
                 1. Financial risk for the insurer (Low, Medium or High)\n\
                 2. Potential for customer disputes (Low, Medium or High)\n\
                 3. Claim frequency potential\n\
                 4. Ambiguity that could lead to disputes\n\
                 Also report your confidence in this assessment between 0 and 1.\n\n\
                 Respond in JSON with exactly these fields:\n{}",
                clause, RISK_SCHEMA
            ),
            PromptTask::MainScenario => format!(
                "Create a realistic scenario that explains this insurance clause to an average policyholder:\n\n\
                 Clause: {}\n\n\
                 Write one short, relatable example starting with \"Example: If...\" that shows:\n\
                 - What situation this clause covers\n\
                 - What the customer can expect\n\
                 - What happens in practice\n\n\
                 Keep it under 50 words and use simple language.",
                clause
            ),
            PromptTask::RealLifeExamples => format!(
                "Generate 3 different real-life examples for this insurance clause:\n\n\
                 Clause: {}\n\n\
                 Respond with a numbered list of 3 items:\n\
                 1. [Brief scenario]\n\
                 2. [Brief scenario]\n\
                 3. [Brief scenario]\n\n\
                 Each example should be 1-2 sentences and show a different situation.",
                clause
            ),
            PromptTask::AgentScript => format!(
                "Create a simple script for insurance agents to explain this clause to customers:\n\n\
                 Clause: {}\n\n\
                 Format it as a conversation starter agents can use. Keep it friendly and clear.",
                clause
            ),
            PromptTask::SimpleExplanation => format!(
                "Explain this insurance clause in the simplest possible terms (5th grade level):\n\n\
                 Clause: {}\n\n\
                 Use only common words. Maximum 30 words.",
                clause
            ),
            PromptTask::Translation { language_name } => format!(
                "Translate this simple English insurance clause into {lang} for rural customers:\n\n\
                 English text: {}\n\n\
                 Requirements:\n\
                 - Use simple, everyday words in {lang}\n\
                 - Avoid complex insurance jargon\n\
                 - Keep the meaning clear and accurate\n\
                 - Make it suitable for customers with basic education\n\
                 - Reply with the translation only\n\n\
                 {lang} translation:",
                clause,
                lang = language_name
            ),
            PromptTask::TrainingModule => format!(
                "Write a short training module for insurance field agents about this clause:\n\n\
                 Clause: {}\n\n\
                 Cover what the clause means, when it applies, and how to explain it to a customer.\n\
                 Use 2-3 short paragraphs of plain prose.",
                clause
            ),
            PromptTask::QuizQuestions => format!(
                "Create 3 multiple-choice quiz questions that test an agent's understanding of this clause:\n\n\
                 Clause: {}\n\n\
                 Each question has 4 options and correct_answer is the zero-based index of the right option.\n\
                 Respond in JSON with exactly these fields:\n{}",
                clause, QUIZ_SCHEMA
            ),
            PromptTask::LearningPoints => list_prompt(
                "List the 5 key learning points an agent must remember about this clause",
                clause,
                5,
            ),
            PromptTask::LearningObjectives => list_prompt(
                "List 4 learning objectives for a training session on this clause, each starting with a verb",
                clause,
                4,
            ),
            PromptTask::PracticalExamples => list_prompt(
                "List 3 practical customer situations where this clause applies",
                clause,
                3,
            ),
            PromptTask::RoleplayScenarios => list_prompt(
                "List 3 role-play scenarios for agents to practice explaining this clause, each describing the customer and their concern",
                clause,
                3,
            ),
            PromptTask::CommonMistakes => list_prompt(
                "List 4 common mistakes agents make when explaining this clause",
                clause,
                4,
            ),
            PromptTask::FaqPairs => format!(
                "Generate 5 common questions customers might ask about this insurance clause:\n\n\
                 Clause: {}\n\n\
                 Format as:\n\
                 Q1: [Question]\n\
                 A1: [Simple answer]\n\n\
                 Q2: [Question]\n\
                 A2: [Simple answer]\n\n\
                 Continue for 5 questions total.",
                clause
            ),
            PromptTask::PitchSummary => format!(
                "Create a 1-minute elevator pitch for agents to explain this clause quickly:\n\n\
                 Clause: {}\n\n\
                 Requirements:\n\
                 - Under 100 words\n\
                 - Highlights key benefits\n\
                 - Addresses main customer concerns\n\
                 - Easy to memorize\n\n\
                 Pitch:",
                clause
            ),
            PromptTask::IndustryComparison => format!(
                "Compare this insurance clause with standard industry wording:\n\n\
                 Clause: {}\n\n\
                 Evaluate:\n\
                 1. How it compares to typical market clauses\n\
                 2. Any unusual or non-standard terms\n\
                 3. Potential red flags\n\
                 Rate it as \"Above Standard\", \"Standard\" or \"Below Standard\".\n\n\
                 Respond in JSON with exactly these fields:\n{}",
                clause, INDUSTRY_SCHEMA
            ),
        }
    }
}

fn list_prompt(instruction: &str, clause: &str, count: usize) -> String {
    format!(
        "{}:\n\nClause: {}\n\nRespond with a numbered list of {} items, one per line, each a complete sentence.",
        instruction, clause, count
    )
}
