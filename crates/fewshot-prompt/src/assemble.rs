//! Top-level prompt assembly.

use std::collections::HashMap;
use std::path::Path;

use fewshot_core::{Error, Example, MessageTemplate, Result};

use crate::embedding::EmbeddingProvider;
use crate::select::{FewShotStrategy, example_source, example_source_with_embedder};
use crate::template::{ChatPromptTemplate, FewShotBlock, Slot};

/// System message template; `format_instructions` is pre-bound at build time.
pub const SYSTEM_TEMPLATE: &str = "You are a helpful AI assistant. {format_instructions}";

/// Instruction-request template used for the few-shot human turns and the
/// final human instruction alike.
pub const INSTRUCTION_TEMPLATE: &str =
    "Make a detailed plan for a graphic design for the following request: '{intention}'.";

/// Assembles the chat prompt: system message, optional few-shot block,
/// final human instruction.
///
/// With a sample size of zero the few-shot block is omitted entirely and
/// the template has exactly two slots. The returned template declares
/// `intention` as its one free variable.
///
/// # Errors
///
/// Returns [`Error::Precondition`] if the sample size is positive and the
/// example set is empty, plus any error from resolving the example source.
pub async fn setup_prompt(
    examples: Vec<Example>,
    format_instructions: &str,
    strategy: FewShotStrategy,
    sample_size: usize,
    cache_path: Option<&Path>,
) -> Result<ChatPromptTemplate> {
    assemble(
        examples,
        format_instructions,
        strategy,
        sample_size,
        cache_path,
        None,
    )
    .await
}

/// Same as [`setup_prompt`] but with an injected embedding provider for the
/// similarity strategy.
///
/// # Errors
///
/// See [`setup_prompt`].
pub async fn setup_prompt_with_embedder(
    examples: Vec<Example>,
    format_instructions: &str,
    strategy: FewShotStrategy,
    sample_size: usize,
    cache_path: Option<&Path>,
    embedder: Box<dyn EmbeddingProvider>,
) -> Result<ChatPromptTemplate> {
    assemble(
        examples,
        format_instructions,
        strategy,
        sample_size,
        cache_path,
        Some(embedder),
    )
    .await
}

/// Shared assembly path.
async fn assemble(
    examples: Vec<Example>,
    format_instructions: &str,
    strategy: FewShotStrategy,
    sample_size: usize,
    cache_path: Option<&Path>,
    embedder: Option<Box<dyn EmbeddingProvider>>,
) -> Result<ChatPromptTemplate> {
    let mut slots = vec![Slot::Template(MessageTemplate::system(SYSTEM_TEMPLATE))];

    if sample_size > 0 {
        if examples.is_empty() {
            return Err(Error::Precondition(
                "a positive few-shot sample size requires a non-empty example set".to_owned(),
            ));
        }

        let source = match embedder {
            Some(provider) => {
                example_source_with_embedder(examples, strategy, sample_size, cache_path, provider)
                    .await?
            }
            None => example_source(examples, strategy, sample_size, cache_path).await?,
        };

        slots.push(Slot::FewShot(FewShotBlock {
            example_prompt: vec![
                MessageTemplate::human(INSTRUCTION_TEMPLATE),
                MessageTemplate::ai("{detail}"),
            ],
            source,
        }));
    }

    slots.push(Slot::Template(MessageTemplate::human(INSTRUCTION_TEMPLATE)));

    Ok(ChatPromptTemplate::new(
        slots,
        vec!["intention".to_owned()],
        HashMap::from([(
            "format_instructions".to_owned(),
            format_instructions.to_owned(),
        )]),
    ))
}
