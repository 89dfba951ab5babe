use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Example, Message, Result};

/// Result of a chat model invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text.
    pub text: String,
    /// Provider identifier, including the model name.
    pub provider: String,
    /// Wall-clock latency of the call in milliseconds.
    pub latency_ms: u64,
}

/// Trait for language model backends that complete chat prompts.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the unique identifier for this backend.
    fn name(&self) -> &'static str;

    /// Checks whether this backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// Generates a completion for the given message sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable, the request fails,
    /// or the response cannot be parsed.
    async fn generate(&self, messages: &[Message]) -> Result<Completion>;
}

/// Trait for objects that pick which examples to include in a prompt.
///
/// The sample size is captured at construction; `select` receives only the
/// query text and is invoked at prompt-render time.
#[async_trait]
pub trait ExampleSelector: Send + Sync {
    /// Selects examples relevant to the given query.
    ///
    /// # Errors
    ///
    /// Returns an error if selection fails, for example when the sample
    /// size exceeds the stored population or an embedding call fails.
    async fn select(&self, query: &str) -> Result<Vec<Example>>;
}
