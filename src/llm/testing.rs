//! In-process model doubles for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{GenerationConfig, InvocationError, ModelClient};

type Reply = Result<String, InvocationError>;

/// Replies from a queue in call order and records every prompt.
///
/// Once the queue is drained every further call gets `fallback`.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Reply>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            fallback: Err(InvocationError::Offline),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call gets the same reply.
    pub fn always(reply: Reply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn invoke(&self, prompt: &str, _config: GenerationConfig) -> Result<String, InvocationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Replies by running a closure over the prompt.
pub struct FnClient<F> {
    respond: F,
}

impl<F> FnClient<F>
where
    F: Fn(&str) -> Reply + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        Self { respond }
    }
}

#[async_trait]
impl<F> ModelClient for FnClient<F>
where
    F: Fn(&str) -> Reply + Send + Sync,
{
    async fn invoke(&self, prompt: &str, _config: GenerationConfig) -> Result<String, InvocationError> {
        (self.respond)(prompt)
    }

    fn model_name(&self) -> &str {
        "fn"
    }
}

/// Echo the JSON example embedded in a prompt back inside a fence, or a
/// fixed sentence for free-text prompts.
pub fn echo_schema(prompt: &str) -> Reply {
    match (prompt.find('{'), prompt.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            Ok(format!("```json\n{}\n```", &prompt[start..=end]))
        }
        _ => Ok("1. This is a sample line of model output.".to_string()),
    }
}
