//! Analyzer units.
//!
//! Each unit owns a shared model client and exposes one async operation
//! that always returns a record. Units with a local fallback return the
//! record directly; the rest return a [`UnitOutcome`](crate::models::UnitOutcome)
//! carrying an error string on failure.

pub mod benchmark;
pub mod compliance;
pub mod multilingual;
pub mod rewriter;
pub mod risk;
pub mod scenario;
pub mod training;

pub use benchmark::BenchmarkAnalyzer;
pub use compliance::ComplianceChecker;
pub use multilingual::MultilingualConverter;
pub use rewriter::PolicyRewriter;
pub use risk::RiskScorer;
pub use scenario::ScenarioExplainer;
pub use training::TrainingGenerator;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::llm::{parser, InvocationError, ModelClient, ParseError, PromptTask};

/// Why a model round trip produced nothing usable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AgentError {
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Render, invoke and unwrap a free-text reply.
pub(crate) async fn ask(
    client: &dyn ModelClient,
    task: PromptTask,
    clause: &str,
) -> Result<String, AgentError> {
    let config = task.generation_config();
    debug!(
        "Invoking {} for {} (max_output_tokens={}, temperature={}, json={})",
        client.model_name(),
        task.name(),
        config.max_output_tokens,
        config.temperature,
        task.expects_json()
    );

    let raw = client.invoke(&task.render(clause), config).await?;
    let text = parser::unwrap_fences(&raw);
    if text.is_empty() {
        return Err(ParseError::Empty.into());
    }
    Ok(text.to_string())
}

/// Render, invoke and strictly parse a JSON reply.
pub(crate) async fn ask_json<T: DeserializeOwned>(
    client: &dyn ModelClient,
    task: PromptTask,
    clause: &str,
) -> Result<T, AgentError> {
    let raw = ask(client, task, clause).await?;
    Ok(parser::parse_json(&raw)?)
}
