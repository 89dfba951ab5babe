//! Embedding providers and the optional on-disk embedding cache.

mod cache;
mod client;

pub use cache::{CachedEmbedder, EmbeddingFileStore};
pub use client::OllamaEmbeddingClient;

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use fewshot_core::Result;

/// A single embedding vector.
pub type Embedding = Vec<f32>;

/// Namespace prefixed to every cache key, so entries from different
/// embedding backends never collide in a shared store.
pub(crate) const CACHE_NAMESPACE: &str = "ollama-default";

/// Trait for generating embeddings from text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Ensures the embedding model is available.
    ///
    /// # Errors
    /// Returns an error if the model is not available or cannot be loaded.
    async fn ensure_model_available(&self) -> Result<()>;

    /// Generates an embedding for one text.
    ///
    /// # Errors
    /// Returns an error if embedding generation fails.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embeds multiple texts in one batch.
    ///
    /// # Errors
    /// Returns an error if any embedding generation fails.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>>;
}

/// Builds the embedding function, optionally cached on disk.
///
/// Without a cache path the bare client is returned and every call hits the
/// embedding model. With a cache path the directory chain is created
/// (idempotently) and every call goes through a content-keyed file store:
/// the same text yields the same cached vector once computed.
///
/// # Errors
///
/// Returns an error if the cache directory cannot be created.
pub fn initialize_embeddings(cache_path: Option<&Path>) -> Result<Box<dyn EmbeddingProvider>> {
    let client = OllamaEmbeddingClient::default();
    match cache_path {
        Some(path) => {
            info!("Using embedding cache at {}", path.display());
            let store = EmbeddingFileStore::open(path)?;
            Ok(Box::new(CachedEmbedder::new(client, store)))
        }
        None => Ok(Box::new(client)),
    }
}
