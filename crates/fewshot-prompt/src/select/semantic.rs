use std::cmp::Ordering;

use async_trait::async_trait;

use fewshot_core::{Error, Example, ExampleSelector, Result};

use crate::embedding::{Embedding, EmbeddingProvider};

/// In-memory vector index over example intentions.
///
/// The store owns the examples once built; callers hold no further
/// reference to the raw list.
#[derive(Default)]
struct VectorStore {
    /// Indexed examples with their intention embeddings.
    entries: Vec<(Example, Embedding)>,
}

impl VectorStore {
    /// Adds an example with its embedding.
    fn add(&mut self, example: Example, embedding: Embedding) {
        self.entries.push((example, embedding));
    }

    /// Returns up to `limit` examples nearest to the query embedding.
    fn nearest(&self, query_embedding: &[f32], limit: usize) -> Vec<Example> {
        let mut scored: Vec<(&Example, f32)> = self
            .entries
            .iter()
            .map(|(example, embedding)| (example, cosine_similarity(query_embedding, embedding)))
            .collect();

        scored.sort_by(|first, second| {
            second.1.partial_cmp(&first.1).unwrap_or(Ordering::Equal)
        });

        scored
            .into_iter()
            .take(limit)
            .map(|(example, _)| example.clone())
            .collect()
    }
}

/// Selector returning the examples whose intentions are most similar to
/// the query, by embedding cosine similarity.
pub struct SemanticExampleSelector {
    /// Indexed examples.
    store: VectorStore,
    /// Provider used to embed queries at select time.
    embedder: Box<dyn EmbeddingProvider>,
    /// Number of neighbors per selection.
    sample_size: usize,
}

impl SemanticExampleSelector {
    /// Indexes the examples under their `intention` text.
    ///
    /// This runs a full embedding pass over all examples, which is the
    /// expensive first-use step; later selections embed only the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding model is unavailable or the batch
    /// embedding call fails.
    pub async fn from_examples(
        examples: Vec<Example>,
        embedder: Box<dyn EmbeddingProvider>,
        sample_size: usize,
    ) -> Result<Self> {
        embedder.ensure_model_available().await?;

        let intentions: Vec<String> = examples
            .iter()
            .map(|example| example.intention.clone())
            .collect();
        let embeddings = embedder.embed_batch(intentions).await?;

        if embeddings.len() != examples.len() {
            return Err(Error::InvalidResponse(format!(
                "expected {} embeddings, received {}",
                examples.len(),
                embeddings.len()
            )));
        }

        let mut store = VectorStore::default();
        for (example, embedding) in examples.into_iter().zip(embeddings) {
            store.add(example, embedding);
        }

        Ok(Self {
            store,
            embedder,
            sample_size,
        })
    }
}

#[async_trait]
impl ExampleSelector for SemanticExampleSelector {
    async fn select(&self, query: &str) -> Result<Vec<Example>> {
        let query_embedding = self.embedder.embed(query).await?;
        Ok(self.store.nearest(&query_embedding, self.sample_size))
    }
}

/// Calculates cosine similarity between two vectors.
fn cosine_similarity(vector_a: &[f32], vector_b: &[f32]) -> f32 {
    if vector_a.len() != vector_b.len() {
        return 0.0;
    }

    let dot_product: f32 = vector_a
        .iter()
        .zip(vector_b.iter())
        .map(|(left, right)| left * right)
        .sum();
    let magnitude_a = vector_a.iter().map(|value| value * value).sum::<f32>().sqrt();
    let magnitude_b = vector_b.iter().map(|value| value * value).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
