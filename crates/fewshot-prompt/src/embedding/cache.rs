//! Content-keyed on-disk cache for embedding vectors.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bincode::config::standard as bincode_config;
use bincode::{decode_from_slice, encode_to_vec};
use tracing::debug;

use fewshot_core::{Error, Result};

use crate::embedding::{CACHE_NAMESPACE, Embedding, EmbeddingProvider};

/// Namespaced on-disk key-value store holding one embedding per file.
///
/// Entries are created lazily on first miss and never evicted; growth is
/// bounded only by the set of distinct texts embedded through it.
pub struct EmbeddingFileStore {
    /// Directory holding one file per cache entry.
    root: PathBuf,
}

impl EmbeddingFileStore {
    /// Opens (or creates) a store rooted at the given path.
    ///
    /// The full directory chain is created if missing; creating an already
    /// existing chain is not an error.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Looks up a cached embedding by key.
    ///
    /// # Errors
    /// Returns an error if an existing entry cannot be read or decoded.
    pub fn get(&self, key: &str) -> Result<Option<Embedding>> {
        let path = self.root.join(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        let (embedding, _) = decode_from_slice(&bytes, bincode_config())
            .map_err(|error| Error::Other(format!("failed to decode cached embedding: {error}")))?;
        Ok(Some(embedding))
    }

    /// Writes an embedding under the given key.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn set(&self, key: &str, embedding: &[f32]) -> Result<()> {
        let bytes = encode_to_vec(embedding, bincode_config())
            .map_err(|error| Error::Other(format!("failed to encode embedding: {error}")))?;
        fs::write(self.root.join(key), bytes)?;
        Ok(())
    }
}

/// Derives the store key for a text: namespace plus content hash.
fn cache_key(text: &str) -> String {
    format!("{CACHE_NAMESPACE}-{}", blake3::hash(text.as_bytes()).to_hex())
}

/// Embedding provider that checks an on-disk store before calling through
/// to the wrapped provider.
pub struct CachedEmbedder<E: EmbeddingProvider> {
    /// Wrapped provider performing the actual embedding calls.
    inner: E,
    /// Backing on-disk store.
    store: EmbeddingFileStore,
}

impl<E: EmbeddingProvider> CachedEmbedder<E> {
    /// Wraps a provider with the given store.
    pub fn new(inner: E, store: EmbeddingFileStore) -> Self {
        Self { inner, store }
    }
}

#[async_trait]
impl<E: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<E> {
    async fn ensure_model_available(&self) -> Result<()> {
        self.inner.ensure_model_available().await
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let key = cache_key(text);
        if let Some(embedding) = self.store.get(&key)? {
            debug!("Embedding cache hit for key {key}");
            return Ok(embedding);
        }

        let embedding = self.inner.embed(text).await?;
        self.store.set(&key, &embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        let mut results: Vec<Option<Embedding>> = Vec::with_capacity(texts.len());
        let mut misses: Vec<(usize, String)> = Vec::new();

        for (position, text) in texts.iter().enumerate() {
            match self.store.get(&cache_key(text))? {
                Some(embedding) => results.push(Some(embedding)),
                None => {
                    results.push(None);
                    misses.push((position, text.clone()));
                }
            }
        }

        if !misses.is_empty() {
            debug!(
                "Embedding batch: {} cached, {} to compute",
                texts.len() - misses.len(),
                misses.len()
            );
            let miss_texts: Vec<String> =
                misses.iter().map(|(_, text)| text.clone()).collect();
            let embedded = self.inner.embed_batch(miss_texts).await?;
            if embedded.len() != misses.len() {
                return Err(Error::InvalidResponse(format!(
                    "expected {} embeddings, received {}",
                    misses.len(),
                    embedded.len()
                )));
            }
            for ((position, text), embedding) in misses.into_iter().zip(embedded) {
                self.store.set(&cache_key(&text), &embedding)?;
                results[position] = Some(embedding);
            }
        }

        results
            .into_iter()
            .map(|entry| {
                entry.ok_or_else(|| Error::Other("embedding missing after batch fill".to_owned()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = EmbeddingFileStore::open(temp_dir.path()).unwrap();

        let key = cache_key("a red poster");
        assert!(store.get(&key).unwrap().is_none());

        store.set(&key, &[0.25, -1.5, 3.0]).unwrap();
        assert_eq!(store.get(&key).unwrap(), Some(vec![0.25, -1.5, 3.0]));
    }

    #[test]
    fn keys_are_namespaced_and_content_addressed() {
        let key_a = cache_key("same text");
        let key_b = cache_key("same text");
        let key_c = cache_key("different text");

        assert_eq!(key_a, key_b);
        assert_ne!(key_a, key_c);
        assert!(key_a.starts_with(CACHE_NAMESPACE));
    }

    #[test]
    fn opening_existing_directory_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        EmbeddingFileStore::open(temp_dir.path()).unwrap();
        EmbeddingFileStore::open(temp_dir.path()).unwrap();
    }
}
