//! Tests for the on-disk embedding cache.

#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::tests_outside_test_module,
        reason = "Test allows"
    )
)]

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use fewshot_core::Result;
use fewshot_prompt::{CachedEmbedder, EmbeddingFileStore, EmbeddingProvider, initialize_embeddings};

/// Embedder returning a constant-shaped vector per text, counting calls.
struct CountingEmbedder {
    calls: Arc<AtomicUsize>,
}

impl CountingEmbedder {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    fn vector_for(text: &str) -> Vec<f32> {
        text.bytes().map(|byte| f32::from(byte) / 255.0).collect()
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|text| Self::vector_for(text)).collect())
    }
}

#[tokio::test]
async fn repeated_embedding_hits_the_cache() {
    let temp_dir = TempDir::new().unwrap();
    let (inner, calls) = CountingEmbedder::new();
    let store = EmbeddingFileStore::open(temp_dir.path()).unwrap();
    let embedder = CachedEmbedder::new(inner, store);

    let first = embedder.embed("a red poster").await.unwrap();
    let second = embedder.embed("a red poster").await.unwrap();

    assert_eq!(first, second, "cached vector must be identical");
    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "underlying embedder must be invoked once for the same text"
    );

    embedder.embed("a different text").await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cache_persists_across_store_handles() {
    let temp_dir = TempDir::new().unwrap();

    let (first_inner, first_calls) = CountingEmbedder::new();
    let first_store = EmbeddingFileStore::open(temp_dir.path()).unwrap();
    let first_embedder = CachedEmbedder::new(first_inner, first_store);
    let original = first_embedder.embed("a logo sketch").await.unwrap();
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);

    // A new handle over the same directory sees the entry.
    let (second_inner, second_calls) = CountingEmbedder::new();
    let second_store = EmbeddingFileStore::open(temp_dir.path()).unwrap();
    let second_embedder = CachedEmbedder::new(second_inner, second_store);
    let cached = second_embedder.embed("a logo sketch").await.unwrap();

    assert_eq!(original, cached);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_embedding_computes_only_misses() {
    let temp_dir = TempDir::new().unwrap();
    let (inner, calls) = CountingEmbedder::new();
    let store = EmbeddingFileStore::open(temp_dir.path()).unwrap();
    let embedder = CachedEmbedder::new(inner, store);

    embedder.embed("alpha").await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let batch = embedder
        .embed_batch(vec![
            "alpha".to_owned(),
            "beta".to_owned(),
            "gamma".to_owned(),
        ])
        .await
        .unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0], CountingEmbedder::vector_for("alpha"));
    assert_eq!(
        calls.load(Ordering::SeqCst),
        3,
        "only the two uncached texts are embedded"
    );
}

#[test]
fn initialize_embeddings_creates_missing_directories() {
    let temp_dir = TempDir::new().unwrap();
    let cache_path = temp_dir
        .path()
        .join("nested")
        .join("cache")
        .join("embeddings");
    assert!(!cache_path.exists());

    initialize_embeddings(Some(&cache_path)).unwrap();
    assert!(cache_path.exists(), "directory chain must be created");

    // Creating an existing chain is not an error.
    initialize_embeddings(Some(&cache_path)).unwrap();
}

#[test]
fn initialize_embeddings_without_path_creates_nothing() {
    let temp_dir = TempDir::new().unwrap();
    initialize_embeddings(None).unwrap();
    assert_eq!(
        fs::read_dir(temp_dir.path()).unwrap().count(),
        0,
        "no cache files are written without a cache path"
    );
}
