//! Few-shot strategy dispatch: each strategy yields either a render-time
//! selector or a fixed, pre-sampled example list.

mod random;
mod semantic;

pub use random::{RandomExampleSelector, fixed_sample, fixed_sample_with_seed};
pub use semantic::SemanticExampleSelector;

use std::path::Path;
use std::str::FromStr;

use tracing::info;

use fewshot_core::{Error, Example, ExampleSelector, Result};

use crate::embedding::{EmbeddingProvider, initialize_embeddings};

/// How few-shot examples are chosen for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FewShotStrategy {
    /// A fresh uniform sample on every prompt render.
    Random,
    /// One uniform sample drawn at setup, identical for every render.
    Fixed,
    /// Embedding-similarity retrieval against the query at render time.
    Similarity,
}

impl FromStr for FewShotStrategy {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "random" => Ok(Self::Random),
            "fixed" => Ok(Self::Fixed),
            "similarity" => Ok(Self::Similarity),
            other => Err(Error::Unsupported(format!("few-shot strategy '{other}'"))),
        }
    }
}

/// The dispatch result: examples supplied lazily by a selector, or a static
/// list sampled once at setup time.
pub enum ExampleSource {
    /// Selector invoked with the query at prompt-render time.
    Selector(Box<dyn ExampleSelector>),
    /// Pre-sampled examples, identical for every render.
    Static(Vec<Example>),
}

impl ExampleSource {
    /// Resolves the examples to show for the given query.
    ///
    /// # Errors
    /// Returns an error if a selector invocation fails.
    pub async fn examples_for(&self, query: &str) -> Result<Vec<Example>> {
        match self {
            Self::Selector(selector) => selector.select(query).await,
            Self::Static(examples) => Ok(examples.clone()),
        }
    }
}

/// Resolves an example source for the given strategy.
///
/// For the similarity strategy this builds the embedding function via
/// [`initialize_embeddings`] and runs a full embedding pass over the
/// examples, which is expensive on first use; subsequent selector
/// invocations are cheap.
///
/// # Errors
///
/// Returns [`Error::Precondition`] if the similarity strategy is requested
/// without a cache path, or if the sample size exceeds the population for
/// the random and fixed strategies.
pub async fn example_source(
    examples: Vec<Example>,
    strategy: FewShotStrategy,
    sample_size: usize,
    cache_path: Option<&Path>,
) -> Result<ExampleSource> {
    build_source(examples, strategy, sample_size, cache_path, None).await
}

/// Same as [`example_source`] but with an injected embedding provider for
/// the similarity strategy, instead of the default Ollama client.
///
/// # Errors
///
/// See [`example_source`]; the cache path precondition still applies.
pub async fn example_source_with_embedder(
    examples: Vec<Example>,
    strategy: FewShotStrategy,
    sample_size: usize,
    cache_path: Option<&Path>,
    embedder: Box<dyn EmbeddingProvider>,
) -> Result<ExampleSource> {
    build_source(examples, strategy, sample_size, cache_path, Some(embedder)).await
}

/// Strategy dispatch shared by the two public entry points.
async fn build_source(
    examples: Vec<Example>,
    strategy: FewShotStrategy,
    sample_size: usize,
    cache_path: Option<&Path>,
    embedder: Option<Box<dyn EmbeddingProvider>>,
) -> Result<ExampleSource> {
    match strategy {
        FewShotStrategy::Similarity => {
            // The cache path is asserted before any embedding work happens.
            let path = cache_path.ok_or_else(|| {
                Error::Precondition(
                    "a cache path is required for similarity-based example retrieval".to_owned(),
                )
            })?;
            let embedder = match embedder {
                Some(provider) => provider,
                None => initialize_embeddings(Some(path))?,
            };
            info!(
                "Initializing similarity-based example selector over {} examples...",
                examples.len()
            );
            let selector =
                SemanticExampleSelector::from_examples(examples, embedder, sample_size).await?;
            info!("Similarity-based example selector ready");
            Ok(ExampleSource::Selector(Box::new(selector)))
        }
        FewShotStrategy::Random => Ok(ExampleSource::Selector(Box::new(
            RandomExampleSelector::new(examples, sample_size),
        ))),
        FewShotStrategy::Fixed => Ok(ExampleSource::Static(fixed_sample(&examples, sample_size)?)),
    }
}
