//! Core types and traits for few-shot prompt construction.
//!
//! This crate provides the example record, chat message types, error
//! handling, and the trait seams implemented by the model backends and
//! example selectors.

/// Error types and result definitions.
pub mod error;
/// The few-shot example record.
pub mod example;
/// Chat messages, roles, and message templates.
pub mod message;
/// Trait definitions for chat models and example selectors.
pub mod traits;

pub use error::{Error, Result};
pub use example::Example;
pub use message::{Message, MessageTemplate, Role, render_template};
pub use traits::{ChatModel, Completion, ExampleSelector};
