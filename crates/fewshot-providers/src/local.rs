use std::env;
use std::time::Instant;

use async_trait::async_trait;
use fewshot_core::{ChatModel, Completion, Error, Message, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Maximum number of tokens generated per completion.
const MAX_NEW_TOKENS: u32 = 64;
/// Env var overriding the Ollama base URL.
const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
/// Default Ollama base URL.
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Local generation backend running a model identifier through Ollama.
///
/// Construction pulls the model if it is not installed, which is the
/// download step of building a local text-generation pipeline.
pub struct LocalModelProvider {
    /// HTTP client used to talk to the Ollama runtime.
    client: Client,
    /// Base URL pointing to the Ollama runtime.
    base_url: String,
    /// Model identifier to generate with.
    model_id: String,
}

/// Request payload for the Ollama chat endpoint.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    /// Model identifier.
    model: String,
    /// Conversation messages.
    messages: Vec<WireMessage>,
    /// Disable streaming so a single JSON body is returned.
    stream: bool,
    /// Generation options.
    options: OllamaOptions,
}

/// Generation options for Ollama.
#[derive(Debug, Serialize)]
struct OllamaOptions {
    /// Bound on newly generated tokens.
    num_predict: u32,
}

/// Role-tagged message on the Ollama wire format.
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    /// Author role string.
    role: String,
    /// Message text.
    content: String,
}

/// Response payload from the Ollama chat endpoint.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    /// Generated message.
    message: WireMessage,
}

/// Response payload from the Ollama tags endpoint.
#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    /// Installed models.
    models: Vec<OllamaModelTag>,
}

/// A single installed model entry.
#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    /// Model name, possibly with a tag suffix.
    name: String,
}

impl LocalModelProvider {
    /// Creates a provider for the given model identifier.
    ///
    /// The base URL is taken from `OLLAMA_HOST` when set.
    #[must_use]
    pub fn new(model_id: String) -> Self {
        let base_url =
            env::var(ENV_OLLAMA_HOST).unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_owned());
        Self {
            client: Client::new(),
            base_url,
            model_id,
        }
    }

    /// Overrides the Ollama base URL.
    #[must_use]
    pub fn with_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Ensures the model is installed locally, pulling it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if Ollama is unreachable or the pull fails.
    pub async fn ensure_model(&self) -> Result<()> {
        if self.has_model().await? {
            return Ok(());
        }

        info!("Pulling local model '{}' (first use)...", self.model_id);
        let response = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&serde_json::json!({
                "name": self.model_id,
                "stream": false
            }))
            .send()
            .await?;

        if response.status().is_success() {
            info!("Local model '{}' is available", self.model_id);
            Ok(())
        } else {
            Err(Error::Provider(format!(
                "failed to pull model {}: {}",
                self.model_id,
                response.status()
            )))
        }
    }

    /// Checks whether the model is already installed.
    async fn has_model(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|error| Error::Provider(format!("Ollama not available: {error}")))?;

        let tags: OllamaTagsResponse = response.json().await?;
        Ok(tags
            .models
            .iter()
            .any(|model| model.name.starts_with(&self.model_id)))
    }
}

#[async_trait]
impl ChatModel for LocalModelProvider {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .is_ok()
    }

    async fn generate(&self, messages: &[Message]) -> Result<Completion> {
        let start = Instant::now();

        let request = OllamaChatRequest {
            model: self.model_id.clone(),
            messages: messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role.wire_name().to_owned(),
                    content: message.content.clone(),
                })
                .collect(),
            stream: false,
            options: OllamaOptions {
                num_predict: MAX_NEW_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|error| Error::Provider(format!("Ollama request failed: {error}")))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "Ollama returned error: {}",
                response.status()
            )));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|error| Error::InvalidResponse(format!("Ollama response: {error}")))?;

        Ok(Completion {
            text: chat_response.message.content,
            provider: format!("Ollama/{}", self.model_id),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
