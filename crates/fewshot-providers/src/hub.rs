use std::env;
use std::time::Instant;

use async_trait::async_trait;
use fewshot_core::{ChatModel, Completion, Error, Message, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Hugging Face Inference API base URL.
const HUB_API_URL: &str = "https://api-inference.huggingface.co/models";
/// Env var holding an optional API token.
const ENV_HF_API_TOKEN: &str = "HF_API_TOKEN";
/// Sampling temperature for hub completions.
const TEMPERATURE: f32 = 0.0;
/// Maximum completion length in tokens.
const MAX_LENGTH: u32 = 64;

/// Hosted inference backend addressing a model repository on the hub.
pub struct HubInferenceProvider {
    /// HTTP client for API requests.
    client: Client,
    /// Repository identifier, for example `google/flan-t5-small`.
    repo_id: String,
    /// Optional bearer token; anonymous requests carry no header.
    api_token: Option<String>,
}

/// Request payload for the hub text-generation task.
#[derive(Debug, Serialize)]
struct HubRequest {
    /// Prompt text.
    inputs: String,
    /// Generation parameters.
    parameters: HubParameters,
}

/// Generation parameters for the hub.
#[derive(Debug, Serialize)]
struct HubParameters {
    /// Sampling temperature.
    temperature: f32,
    /// Maximum generated length.
    max_length: u32,
}

/// One generated candidate returned by the hub.
#[derive(Debug, Deserialize)]
struct HubGeneration {
    /// Generated text.
    generated_text: String,
}

impl HubInferenceProvider {
    /// Creates a provider for the given repository identifier.
    ///
    /// The bearer token is taken from `HF_API_TOKEN` when set.
    #[must_use]
    pub fn new(repo_id: String) -> Self {
        Self {
            client: Client::new(),
            repo_id,
            api_token: env::var(ENV_HF_API_TOKEN).ok(),
        }
    }

    /// Sets the API token explicitly.
    #[must_use]
    pub fn with_api_token(mut self, api_token: String) -> Self {
        self.api_token = Some(api_token);
        self
    }

    /// Flattens a chat message sequence into a single prompt string.
    ///
    /// Hub text-generation models take raw text, not role-tagged turns.
    fn flatten(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl ChatModel for HubInferenceProvider {
    fn name(&self) -> &'static str {
        "HuggingFaceHub"
    }

    async fn is_available(&self) -> bool {
        !self.repo_id.is_empty()
    }

    async fn generate(&self, messages: &[Message]) -> Result<Completion> {
        let start = Instant::now();

        let request = HubRequest {
            inputs: Self::flatten(messages),
            parameters: HubParameters {
                temperature: TEMPERATURE,
                max_length: MAX_LENGTH,
            },
        };

        let mut builder = self
            .client
            .post(format!("{HUB_API_URL}/{}", self.repo_id))
            .json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|error| Error::Provider(format!("hub request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            return Err(Error::Provider(format!(
                "hub API error {status}: {error_text}"
            )));
        }

        let generations: Vec<HubGeneration> = response
            .json()
            .await
            .map_err(|error| Error::InvalidResponse(format!("hub response: {error}")))?;

        let text = generations
            .into_iter()
            .next()
            .map(|generation| generation.generated_text)
            .ok_or_else(|| Error::InvalidResponse("hub returned no generations".to_owned()))?;

        Ok(Completion {
            text,
            provider: format!("HuggingFaceHub/{}", self.repo_id),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fewshot_core::Role;

    #[test]
    fn provider_creation() {
        let provider = HubInferenceProvider::new("google/flan-t5-small".to_owned());
        assert_eq!(provider.name(), "HuggingFaceHub");
        assert_eq!(provider.repo_id, "google/flan-t5-small");
    }

    #[test]
    fn flatten_joins_message_contents() {
        let messages = vec![
            Message::new(Role::System, "You are helpful."),
            Message::new(Role::Human, "Plan a poster."),
        ];
        assert_eq!(
            HubInferenceProvider::flatten(&messages),
            "You are helpful.\n\nPlan a poster."
        );
    }

    #[test]
    fn parameters_are_deterministic_and_bounded() {
        let request = HubRequest {
            inputs: "prompt".to_owned(),
            parameters: HubParameters {
                temperature: TEMPERATURE,
                max_length: MAX_LENGTH,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""temperature":0.0"#));
        assert!(json.contains(r#""max_length":64"#));
    }
}
