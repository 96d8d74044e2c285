//! Model plumbing shared by every analyzer.
//!
//! - [`prompts`] renders task-specific instructions for a clause.
//! - [`client`] sends a rendered prompt to the model service.
//! - [`parser`] turns the raw reply back into typed data.

pub mod client;
pub mod parser;
pub mod prompts;

#[cfg(test)]
pub mod testing;

pub use client::{GeminiClient, GeminiConfig, GenerationConfig, InvocationError, ModelClient, OfflineClient};
pub use parser::ParseError;
pub use prompts::PromptTask;
