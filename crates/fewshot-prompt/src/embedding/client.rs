use std::env;
use std::process::Command;

use async_trait::async_trait;
use ollama_rs::Ollama;
use ollama_rs::generation::embeddings::request::GenerateEmbeddingsRequest;
use tracing::info;

use fewshot_core::{Error, Result};

use crate::embedding::{Embedding, EmbeddingProvider};

/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
/// Env var overriding the Ollama base URL.
const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";

/// Ollama embedding client.
pub struct OllamaEmbeddingClient {
    /// Handle to the Ollama runtime.
    ollama: Ollama,
    /// Embedding model name.
    model: String,
}

impl OllamaEmbeddingClient {
    /// Creates a client for the given embedding model.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingClient {
    async fn ensure_model_available(&self) -> Result<()> {
        let models = match self.ollama.list_local_models().await {
            Ok(models) => models,
            Err(error) => {
                return Err(Error::Provider(format!(
                    "Failed to connect to Ollama: {error}. Ensure Ollama is installed and running (ollama serve)."
                )));
            }
        };

        let model_available = models.iter().any(|model| model.name.contains(&self.model));

        if !model_available {
            info!("Embedding model '{}' not found, pulling...", self.model);

            let status = Command::new("ollama")
                .args(["pull", &self.model])
                .status()
                .map_err(|error| {
                    Error::Provider(format!(
                        "Failed to run 'ollama pull {}': {error}. Is Ollama installed?",
                        self.model
                    ))
                })?;

            if !status.success() {
                return Err(Error::Provider(format!(
                    "Failed to pull model '{}'. Check Ollama is running.",
                    self.model
                )));
            }

            info!("Pulled embedding model '{}'", self.model);
        }

        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), text.to_owned().into());

        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| Error::Provider(format!("Embedding generation failed: {error}")))?;

        // Ollama returns one vector per input; a single input yields one.
        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("no embeddings returned".to_owned()))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::default());
        }

        if texts.len() == 1 {
            return Ok(vec![self.embed(&texts[0]).await?]);
        }

        let request = GenerateEmbeddingsRequest::new(self.model.clone(), texts.into());

        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| {
                Error::Provider(format!("Batch embedding generation failed: {error}"))
            })?;

        Ok(response.embeddings)
    }
}

impl Default for OllamaEmbeddingClient {
    fn default() -> Self {
        let host =
            env::var(ENV_OLLAMA_HOST).unwrap_or_else(|_| "http://localhost:11434".to_owned());
        Self {
            ollama: Ollama::new(host, 11434),
            model: DEFAULT_EMBEDDING_MODEL.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model() {
        let client = OllamaEmbeddingClient::default();
        assert_eq!(client.model, DEFAULT_EMBEDDING_MODEL);
    }

    #[test]
    fn custom_model() {
        let client = OllamaEmbeddingClient::default().with_model("mxbai-embed-large".to_owned());
        assert_eq!(client.model, "mxbai-embed-large");
    }
}
