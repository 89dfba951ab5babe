//! Chat model backends and the model factory.
//!
//! Exactly one backend is selected per [`ModelSpec`]: a local Ollama
//! pipeline, a hosted Hugging Face inference repository, or a managed
//! Azure OpenAI deployment.

/// Azure OpenAI chat completion backend.
pub mod azure;
/// Model selection and backend construction.
pub mod factory;
/// Hosted Hugging Face inference backend.
pub mod hub;
/// Local Ollama generation backend.
pub mod local;

pub use azure::AzureChatProvider;
pub use factory::{ModelSpec, setup_model};
pub use hub::HubInferenceProvider;
pub use local::LocalModelProvider;
