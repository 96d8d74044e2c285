//! Field-agent training material.
//!
//! Every section is generated separately and has canned content to fall
//! back on, so one failed generation degrades only its own section.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::{ask, ask_json, AgentError};
use crate::llm::{parser, ModelClient, ParseError, PromptTask};
use crate::models::{DifficultyLevel, FaqEntry, QuizQuestion, TrainingResult};
use crate::text;

const LEGAL_TERMS: [&str; 10] = [
    "pursuant",
    "notwithstanding",
    "heretofore",
    "whereas",
    "indemnify",
    "indemnity",
    "subrogation",
    "warranty",
    "covenant",
    "liability",
];

const FALLBACK_MODULE: &str = "Read the clause with the customer and explain it in three steps: \
what is covered, what is not covered, and what the customer must do to make a claim. \
Ask the customer to repeat the key condition in their own words to confirm they understood it.";

const FALLBACK_LEARNING_POINTS: [&str; 3] = [
    "Know exactly what situations the clause covers",
    "Know the conditions the customer must meet to claim",
    "Explain exclusions before the customer asks about them",
];

const FALLBACK_OBJECTIVES: [&str; 3] = [
    "Explain the clause to a customer in plain language",
    "Identify when the clause applies to a claim",
    "Answer common customer questions about the clause",
];

const FALLBACK_EXAMPLES: [&str; 2] = [
    "A customer asks whether a recent incident is covered by this clause",
    "A customer wants to know what documents are needed to make a claim",
];

const FALLBACK_ROLEPLAYS: [&str; 2] = [
    "A first-time buyer who is unsure what the clause means for them",
    "An upset customer whose claim was questioned under this clause",
];

const FALLBACK_MISTAKES: [&str; 3] = [
    "Promising cover beyond what the clause actually states",
    "Skipping the conditions the customer must meet",
    "Using legal terms instead of everyday words",
];

const FALLBACK_PITCH: &str = "This clause tells you exactly when your policy helps you and what \
you need to do to claim. Keep your documents ready, tell us quickly, and we will guide you \
through every step.";

#[derive(Debug, Deserialize)]
struct QuizReply {
    questions: Vec<QuizQuestion>,
}

/// Difficulty from clause length and legal vocabulary.
pub fn classify_difficulty(clause: &str) -> DifficultyLevel {
    let words = text::word_count(clause);
    let legal_terms = text::find_phrases(clause, &LEGAL_TERMS).len();

    if words > 50 || legal_terms > 2 {
        DifficultyLevel::Advanced
    } else if words > 25 || legal_terms >= 1 {
        DifficultyLevel::Intermediate
    } else {
        DifficultyLevel::Beginner
    }
}

fn canned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn fallback_quiz() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion {
            question: "What should you explain first when presenting this clause?".to_string(),
            options: vec![
                "What the clause covers".to_string(),
                "The premium amount".to_string(),
                "The agent's commission".to_string(),
                "The company history".to_string(),
            ],
            correct_answer: 0,
            explanation: "Customers need to know what is covered before anything else.".to_string(),
        },
        QuizQuestion {
            question: "How should you describe conditions in this clause?".to_string(),
            options: vec![
                "Using the exact legal wording only".to_string(),
                "In plain everyday language".to_string(),
                "By skipping them".to_string(),
                "Only if the customer asks".to_string(),
            ],
            correct_answer: 1,
            explanation: "Plain language avoids misunderstandings and later disputes.".to_string(),
        },
    ]
}

fn fallback_faq() -> Vec<FaqEntry> {
    vec![
        FaqEntry {
            question: "What does this clause mean for me?".to_string(),
            answer: "It explains when your policy pays and what you need to do.".to_string(),
        },
        FaqEntry {
            question: "What do I do if I need to claim?".to_string(),
            answer: "Contact us as soon as possible and keep all related documents.".to_string(),
        },
    ]
}

/// A question is usable when its answer index points at an option.
fn valid_question(question: &QuizQuestion) -> bool {
    !question.question.trim().is_empty() && question.correct_answer < question.options.len()
}

pub struct TrainingGenerator {
    client: Arc<dyn ModelClient>,
}

impl TrainingGenerator {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    pub async fn generate_training(&self, clause: &str) -> TrainingResult {
        let difficulty = classify_difficulty(clause);
        let mut fallback_sections = Vec::new();

        let training_module = match self.text_section(PromptTask::TrainingModule, clause).await {
            Ok(text) => text,
            Err(e) => {
                note_fallback(&mut fallback_sections, "training_module", &e);
                FALLBACK_MODULE.to_string()
            }
        };

        let quiz_questions = match self.quiz(clause).await {
            Ok(questions) => questions,
            Err(e) => {
                note_fallback(&mut fallback_sections, "quiz_questions", &e);
                fallback_quiz()
            }
        };

        let learning_points = self
            .list_section(
                PromptTask::LearningPoints,
                clause,
                5,
                &FALLBACK_LEARNING_POINTS,
                &mut fallback_sections,
            )
            .await;
        let learning_objectives = self
            .list_section(
                PromptTask::LearningObjectives,
                clause,
                4,
                &FALLBACK_OBJECTIVES,
                &mut fallback_sections,
            )
            .await;
        let practical_examples = self
            .list_section(
                PromptTask::PracticalExamples,
                clause,
                3,
                &FALLBACK_EXAMPLES,
                &mut fallback_sections,
            )
            .await;
        let roleplay_scenarios = self
            .list_section(
                PromptTask::RoleplayScenarios,
                clause,
                3,
                &FALLBACK_ROLEPLAYS,
                &mut fallback_sections,
            )
            .await;
        let common_mistakes = self
            .list_section(
                PromptTask::CommonMistakes,
                clause,
                4,
                &FALLBACK_MISTAKES,
                &mut fallback_sections,
            )
            .await;

        let faq = match self.text_section(PromptTask::FaqPairs, clause).await {
            Ok(raw) => {
                let pairs = parser::extract_qa_pairs(&raw, 5);
                if pairs.is_empty() {
                    fallback_sections.push("faq".to_string());
                    fallback_faq()
                } else {
                    pairs
                        .into_iter()
                        .map(|(question, answer)| FaqEntry { question, answer })
                        .collect()
                }
            }
            Err(e) => {
                note_fallback(&mut fallback_sections, "faq", &e);
                fallback_faq()
            }
        };

        let pitch_summary = match self.text_section(PromptTask::PitchSummary, clause).await {
            Ok(text) => text,
            Err(e) => {
                note_fallback(&mut fallback_sections, "pitch_summary", &e);
                FALLBACK_PITCH.to_string()
            }
        };

        TrainingResult {
            difficulty_level: difficulty,
            target_audience: difficulty.target_audience().to_string(),
            training_module,
            quiz_questions,
            learning_points,
            learning_objectives,
            practical_examples,
            roleplay_scenarios,
            common_mistakes,
            faq,
            pitch_summary,
            training_ready: fallback_sections.is_empty(),
            fallback_sections,
        }
    }

    async fn text_section(&self, task: PromptTask, clause: &str) -> Result<String, AgentError> {
        ask(self.client.as_ref(), task, clause).await
    }

    async fn quiz(&self, clause: &str) -> Result<Vec<QuizQuestion>, AgentError> {
        let reply: QuizReply =
            ask_json(self.client.as_ref(), PromptTask::QuizQuestions, clause).await?;
        let questions: Vec<QuizQuestion> =
            reply.questions.into_iter().filter(valid_question).collect();
        if questions.is_empty() {
            return Err(ParseError::Empty.into());
        }
        Ok(questions)
    }

    async fn list_section(
        &self,
        task: PromptTask,
        clause: &str,
        max: usize,
        fallback: &[&str],
        fallback_sections: &mut Vec<String>,
    ) -> Vec<String> {
        match self.text_section(task, clause).await {
            Ok(raw) => {
                let items = parser::extract_list_items(&raw, max);
                if items.is_empty() {
                    fallback_sections.push(task.name().to_string());
                    canned(fallback)
                } else {
                    items
                }
            }
            Err(e) => {
                note_fallback(fallback_sections, task.name(), &e);
                canned(fallback)
            }
        }
    }
}

fn note_fallback(sections: &mut Vec<String>, section: &str, error: &AgentError) {
    warn!("Training section {} using canned content: {}", section, error);
    sections.push(section.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{echo_schema, FnClient, ScriptedClient};
    use crate::llm::InvocationError;

    #[test]
    fn test_classify_difficulty() {
        assert_eq!(
            classify_difficulty("Claims must be reported within 30 days."),
            DifficultyLevel::Beginner
        );
        assert_eq!(
            classify_difficulty("The insurer shall indemnify the insured for repairs."),
            DifficultyLevel::Intermediate
        );
        assert_eq!(
            classify_difficulty(
                "Notwithstanding the above, and pursuant to the schedule, the insurer shall indemnify."
            ),
            DifficultyLevel::Advanced
        );

        let long_plain = "word ".repeat(51);
        assert_eq!(classify_difficulty(&long_plain), DifficultyLevel::Advanced);
        let medium_plain = "word ".repeat(26);
        assert_eq!(classify_difficulty(&medium_plain), DifficultyLevel::Intermediate);
    }

    #[tokio::test]
    async fn test_offline_training_uses_canned_content_everywhere() {
        let client = ScriptedClient::always(Err(InvocationError::Offline));
        let generator = TrainingGenerator::new(Arc::new(client));
        let result = generator.generate_training("Claims must be reported within 30 days.").await;

        assert_eq!(result.difficulty_level, DifficultyLevel::Beginner);
        assert_eq!(result.target_audience, "New field agents and customer service staff");
        assert_eq!(result.training_module, FALLBACK_MODULE);
        assert_eq!(result.quiz_questions, fallback_quiz());
        assert_eq!(result.faq, fallback_faq());
        assert_eq!(result.fallback_sections.len(), 9);
        assert!(!result.training_ready);
    }

    #[tokio::test]
    async fn test_single_failure_degrades_one_section() {
        let generator = TrainingGenerator::new(Arc::new(FnClient::new(|prompt: &str| {
            if prompt.contains("elevator pitch") {
                Err(InvocationError::Timeout { seconds: 60 })
            } else if prompt.contains("Q1:") {
                Ok("Q1: Is theft covered?\nA1: Yes, if reported quickly.".to_string())
            } else {
                echo_schema(prompt)
            }
        })));
        let result = generator.generate_training("Theft of the vehicle is covered.").await;

        assert_eq!(result.fallback_sections, vec!["pitch_summary".to_string()]);
        assert_eq!(result.pitch_summary, FALLBACK_PITCH);
        assert_eq!(result.quiz_questions.len(), 1);
        assert_eq!(result.quiz_questions[0].correct_answer, 0);
        assert_eq!(result.faq.len(), 1);
        assert_eq!(result.faq[0].answer, "Yes, if reported quickly.");
        assert_eq!(result.learning_points, vec!["This is a sample line of model output."]);
    }

    #[test]
    fn test_quiz_answer_index_must_point_at_option() {
        let mut question = fallback_quiz().remove(0);
        assert!(valid_question(&question));
        question.correct_answer = 4;
        assert!(!valid_question(&question));
    }
}
