use std::env;
use std::time::Instant;

use async_trait::async_trait;
use fewshot_core::{ChatModel, Completion, Error, Message, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Env var holding the API version passed through on every request.
const ENV_API_VERSION: &str = "AZURE_OPENAI_API_VERSION";
/// Env var holding the resource endpoint URL.
const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
/// Env var holding the API key.
const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";

/// Managed chat-completion backend addressing an Azure OpenAI deployment.
///
/// The deployment name doubles as the logical model name, and the API
/// version is read once at construction and passed through unvalidated.
pub struct AzureChatProvider {
    /// HTTP client for API requests.
    client: Client,
    /// Deployment name, also used as the model name.
    deployment: String,
    /// Resource endpoint, for example `https://myresource.openai.azure.com`.
    endpoint: String,
    /// API key sent in the `api-key` header.
    api_key: String,
    /// API version query value; may be empty if the env var is unset.
    api_version: String,
}

/// Request payload for the chat completions endpoint.
#[derive(Debug, Serialize)]
struct AzureChatRequest {
    /// Logical model name; mirrors the deployment name.
    model: String,
    /// Conversation messages.
    messages: Vec<AzureMessage>,
}

/// Role-tagged message on the Azure wire format.
#[derive(Debug, Serialize)]
struct AzureMessage {
    /// Author role string.
    role: String,
    /// Message text.
    content: String,
}

/// Response payload from the chat completions endpoint.
#[derive(Debug, Deserialize)]
struct AzureChatResponse {
    /// Candidate completions.
    choices: Vec<AzureChoice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
struct AzureChoice {
    /// Generated message.
    message: AzureResponseMessage,
}

/// Response message containing the generated text.
#[derive(Debug, Deserialize)]
struct AzureResponseMessage {
    /// Generated text content.
    content: String,
}

impl AzureChatProvider {
    /// Creates a provider for the given deployment from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `AZURE_OPENAI_ENDPOINT` or `AZURE_OPENAI_API_KEY`
    /// is not set. `AZURE_OPENAI_API_VERSION` is passed through even when
    /// absent.
    pub fn from_env(deployment: String) -> Result<Self> {
        let endpoint = env::var(ENV_ENDPOINT)
            .map_err(|_| Error::Config(format!("{ENV_ENDPOINT} not set")))?;
        let api_key =
            env::var(ENV_API_KEY).map_err(|_| Error::MissingApiKey(ENV_API_KEY.to_owned()))?;
        let api_version = env::var(ENV_API_VERSION).unwrap_or_default();

        Ok(Self {
            client: Client::new(),
            deployment,
            endpoint,
            api_key,
            api_version,
        })
    }

    /// Returns the chat completions URL for this deployment.
    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

#[async_trait]
impl ChatModel for AzureChatProvider {
    fn name(&self) -> &'static str {
        "AzureOpenAI"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, messages: &[Message]) -> Result<Completion> {
        let start = Instant::now();

        let request = AzureChatRequest {
            model: self.deployment.clone(),
            messages: messages
                .iter()
                .map(|message| AzureMessage {
                    role: message.role.wire_name().to_owned(),
                    content: message.content.clone(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|error| Error::Provider(format!("Azure request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            return Err(Error::Provider(format!(
                "Azure API error {status}: {error_text}"
            )));
        }

        let chat_response: AzureChatResponse = response
            .json()
            .await
            .map_err(|error| Error::InvalidResponse(format!("Azure response: {error}")))?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::InvalidResponse("Azure returned no choices".to_owned()))?;

        Ok(Completion {
            text,
            provider: format!("AzureOpenAI/{}", self.deployment),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider(api_version: &str) -> AzureChatProvider {
        AzureChatProvider {
            client: Client::new(),
            deployment: "gpt-4o-mini".to_owned(),
            endpoint: "https://example.openai.azure.com/".to_owned(),
            api_key: "test-key".to_owned(),
            api_version: api_version.to_owned(),
        }
    }

    #[test]
    fn deployment_names_both_fields() {
        let provider = test_provider("2024-02-01");
        let request = AzureChatRequest {
            model: provider.deployment.clone(),
            messages: Vec::new(),
        };
        assert_eq!(request.model, "gpt-4o-mini");
        assert!(provider.completions_url().contains("/deployments/gpt-4o-mini/"));
    }

    #[test]
    fn api_version_is_passed_through() {
        let provider = test_provider("2024-02-01");
        assert!(provider
            .completions_url()
            .ends_with("api-version=2024-02-01"));

        // An unset env var yields an empty value, passed through unvalidated.
        let bare = test_provider("");
        assert!(bare.completions_url().ends_with("api-version="));
    }

    #[tokio::test]
    async fn availability_requires_api_key() {
        let provider = test_provider("2024-02-01");
        assert!(provider.is_available().await);
        assert_eq!(provider.name(), "AzureOpenAI");
    }
}
