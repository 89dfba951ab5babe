//! Few-shot prompt construction: embedding cache, example selection, and
//! chat prompt assembly.
//!
//! The entry points mirror the three setup steps callers compose: build an
//! embedding function with [`initialize_embeddings`], resolve a few-shot
//! [`select::ExampleSource`] with [`example_source`], and assemble the full
//! chat template with [`setup_prompt`].

/// Prompt assembly and the fixed instruction templates.
pub mod assemble;
/// Embedding providers and the on-disk embedding cache.
pub mod embedding;
/// Few-shot strategies and example selectors.
pub mod select;
/// Chat prompt templates with lazy few-shot blocks.
pub mod template;

pub use assemble::{INSTRUCTION_TEMPLATE, SYSTEM_TEMPLATE, setup_prompt, setup_prompt_with_embedder};
pub use embedding::{
    CachedEmbedder, Embedding, EmbeddingFileStore, EmbeddingProvider, OllamaEmbeddingClient,
    initialize_embeddings,
};
pub use select::{
    ExampleSource, FewShotStrategy, RandomExampleSelector, SemanticExampleSelector, example_source,
    example_source_with_embedder, fixed_sample, fixed_sample_with_seed,
};
pub use template::{ChatPromptTemplate, FewShotBlock, Slot};
