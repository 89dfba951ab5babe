//! Chat prompt templates: ordered message slots with an optional lazy
//! few-shot block.

use std::collections::HashMap;

use fewshot_core::{Message, MessageTemplate, Result};

use crate::select::ExampleSource;

/// One slot in a chat prompt template.
pub enum Slot {
    /// A single role-tagged message template.
    Template(MessageTemplate),
    /// A block expanded from few-shot examples at render time.
    FewShot(FewShotBlock),
}

/// Few-shot block: a message-pair template applied to each selected example.
pub struct FewShotBlock {
    /// Templates rendered once per example, in order (human turn over the
    /// example's `intention`, AI turn over its `detail`).
    pub example_prompt: Vec<MessageTemplate>,
    /// Where the examples come from at render time.
    pub source: ExampleSource,
}

/// An ordered chat prompt: system message, optional few-shot block, final
/// human instruction.
///
/// Built once and immutable; rendering substitutes variables without
/// mutating the template.
pub struct ChatPromptTemplate {
    /// Ordered message slots.
    slots: Vec<Slot>,
    /// Free variables bound at render time.
    input_variables: Vec<String>,
    /// Variables pre-bound at build time.
    partial_variables: HashMap<String, String>,
}

impl ChatPromptTemplate {
    /// Creates a template from slots and variable declarations.
    pub fn new(
        slots: Vec<Slot>,
        input_variables: Vec<String>,
        partial_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            slots,
            input_variables,
            partial_variables,
        }
    }

    /// Returns the ordered message slots.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Returns the free variables bound at render time.
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Returns the variables pre-bound at build time.
    pub fn partial_variables(&self) -> &HashMap<String, String> {
        &self.partial_variables
    }

    /// Renders the template into a message sequence for the given intention.
    ///
    /// The few-shot block, if present, is expanded by querying its example
    /// source with the intention; each example contributes one rendered
    /// message per pair template.
    ///
    /// # Errors
    ///
    /// Returns an error if example selection fails or a template variable
    /// is unbound, including an example missing its `detail`.
    pub async fn format(&self, intention: &str) -> Result<Vec<Message>> {
        let mut variables = self.partial_variables.clone();
        variables.insert("intention".to_owned(), intention.to_owned());

        let mut messages = Vec::new();
        for slot in &self.slots {
            match slot {
                Slot::Template(template) => messages.push(template.render(&variables)?),
                Slot::FewShot(block) => {
                    let examples = block.source.examples_for(intention).await?;
                    for example in examples {
                        let mut example_variables = variables.clone();
                        example_variables
                            .insert("intention".to_owned(), example.intention.clone());
                        if let Some(detail) = &example.detail {
                            example_variables.insert("detail".to_owned(), detail.clone());
                        }
                        for template in &block.example_prompt {
                            messages.push(template.render(&example_variables)?);
                        }
                    }
                }
            }
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fewshot_core::{Error, Example, Role};

    fn few_shot_block(examples: Vec<Example>) -> Slot {
        Slot::FewShot(FewShotBlock {
            example_prompt: vec![
                MessageTemplate::human("Request: {intention}"),
                MessageTemplate::ai("{detail}"),
            ],
            source: ExampleSource::Static(examples),
        })
    }

    #[tokio::test]
    async fn renders_slots_in_order() {
        let template = ChatPromptTemplate::new(
            vec![
                Slot::Template(MessageTemplate::system("Assist. {format_instructions}")),
                few_shot_block(vec![
                    Example::new("a poster").with_detail("Bold headline."),
                ]),
                Slot::Template(MessageTemplate::human("Request: {intention}")),
            ],
            vec!["intention".to_owned()],
            HashMap::from([("format_instructions".to_owned(), "Reply in JSON.".to_owned())]),
        );

        let messages = template.format("a business card").await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::new(Role::System, "Assist. Reply in JSON."));
        assert_eq!(messages[1], Message::new(Role::Human, "Request: a poster"));
        assert_eq!(messages[2], Message::new(Role::Ai, "Bold headline."));
        assert_eq!(messages[3], Message::new(Role::Human, "Request: a business card"));
    }

    #[tokio::test]
    async fn example_without_detail_is_a_template_error() {
        let template = ChatPromptTemplate::new(
            vec![few_shot_block(vec![Example::new("a poster")])],
            vec!["intention".to_owned()],
            HashMap::default(),
        );

        let result = template.format("a banner").await;
        assert!(matches!(result, Err(Error::Template(_))));
    }

    #[tokio::test]
    async fn rendering_does_not_mutate_the_template() {
        let template = ChatPromptTemplate::new(
            vec![Slot::Template(MessageTemplate::human("Request: {intention}"))],
            vec!["intention".to_owned()],
            HashMap::default(),
        );

        let first = template.format("one").await.unwrap();
        let second = template.format("two").await.unwrap();
        assert_eq!(first[0].content, "Request: one");
        assert_eq!(second[0].content, "Request: two");
        assert_eq!(template.slots().len(), 1);
    }
}
