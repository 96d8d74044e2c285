//! Customer-facing scenarios and explanations.

use std::sync::Arc;

use tracing::warn;

use super::{ask, AgentError};
use crate::llm::{parser, ModelClient, PromptTask};
use crate::models::{ScenarioResult, UnitOutcome};

const MAX_EXAMPLES: usize = 3;

pub struct ScenarioExplainer {
    client: Arc<dyn ModelClient>,
}

impl ScenarioExplainer {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Four independent generations; the first failure fails the whole unit.
    pub async fn generate_scenario(&self, clause: &str) -> UnitOutcome<ScenarioResult> {
        match self.generate(clause).await {
            Ok(result) => UnitOutcome::Completed(result),
            Err(e) => {
                warn!("Scenario generation failed: {}", e);
                UnitOutcome::failed(format!("Scenario generation failed: {}", e))
            }
        }
    }

    async fn generate(&self, clause: &str) -> Result<ScenarioResult, AgentError> {
        let client = self.client.as_ref();

        let main_scenario = ask(client, PromptTask::MainScenario, clause).await?;
        let examples = ask(client, PromptTask::RealLifeExamples, clause).await?;
        let customer_script = ask(client, PromptTask::AgentScript, clause).await?;
        let simple_explanation = ask(client, PromptTask::SimpleExplanation, clause).await?;

        Ok(ScenarioResult {
            main_scenario,
            real_life_examples: parser::extract_list_items(&examples, MAX_EXAMPLES),
            customer_script,
            simple_explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use crate::llm::InvocationError;

    const CLAUSE: &str = "Theft of the vehicle is covered when reported to police within 24 hours.";

    #[tokio::test]
    async fn test_generate_scenario_collects_all_parts() {
        let client = Arc::new(ScriptedClient::new([
            Ok("Example: If your car is stolen overnight, report it by morning.".to_string()),
            Ok("1. Car stolen from a mall parking lot.\n2. Car taken from outside home.\n\
                3. Car stolen while on holiday.\n4. A fourth example is ignored."
                .to_string()),
            Ok("Hello! Let me explain what happens if your car is stolen.".to_string()),
            Ok("If someone steals your car, tell police fast.".to_string()),
        ]));
        let explainer = ScenarioExplainer::new(client.clone());

        let outcome = explainer.generate_scenario(CLAUSE).await;
        let result = outcome.completed().unwrap();

        assert!(result.main_scenario.starts_with("Example: If"));
        assert_eq!(result.real_life_examples.len(), 3);
        assert_eq!(result.real_life_examples[0], "Car stolen from a mall parking lot.");
        assert!(result.customer_script.starts_with("Hello!"));
        assert_eq!(client.call_count(), 4);
    }

    #[tokio::test]
    async fn test_any_failed_call_fails_the_unit() {
        let client = Arc::new(ScriptedClient::new([
            Ok("Example: If your car is stolen...".to_string()),
            Err(InvocationError::QuotaExhausted("rate limit".to_string())),
        ]));
        let explainer = ScenarioExplainer::new(client.clone());

        let outcome = explainer.generate_scenario(CLAUSE).await;
        let error = outcome.error().unwrap();
        assert!(error.starts_with("Scenario generation failed:"));
        assert!(error.contains("quota"));
        assert_eq!(client.call_count(), 2);
    }
}
