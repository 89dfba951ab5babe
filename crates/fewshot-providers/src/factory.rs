use fewshot_core::{ChatModel, Error, Result};
use tracing::info;

use crate::{AzureChatProvider, HubInferenceProvider, LocalModelProvider};

/// Which language model backend to construct.
///
/// Exactly one backend is selected; the variants replace the older
/// convention of passing three optional identifiers and letting the first
/// non-empty one win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSpec {
    /// Local model identifier run through an Ollama pipeline.
    Local(String),
    /// Hosted repository identifier on the Hugging Face hub.
    HostedRepo(String),
    /// Managed Azure OpenAI deployment name.
    ManagedDeployment(String),
}

impl ModelSpec {
    /// Resolves three optional identifiers into a spec.
    ///
    /// Priority order is fixed: local identifier, then hosted repository,
    /// then managed deployment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if all three are `None`.
    pub fn from_options(
        local_id: Option<String>,
        repo_id: Option<String>,
        deployment: Option<String>,
    ) -> Result<Self> {
        if let Some(model_id) = local_id {
            Ok(Self::Local(model_id))
        } else if let Some(repo) = repo_id {
            Ok(Self::HostedRepo(repo))
        } else if let Some(name) = deployment {
            Ok(Self::ManagedDeployment(name))
        } else {
            Err(Error::Unsupported("no model is specified".to_owned()))
        }
    }
}

/// Constructs a chat model backend for the given spec.
///
/// Each call constructs the backend from scratch; handles are not cached.
/// For the local variant this downloads the model on first use.
///
/// # Errors
///
/// Returns an error if the local model cannot be pulled or the managed
/// deployment's environment configuration is missing. Network failures
/// propagate unchanged.
pub async fn setup_model(model_spec: &ModelSpec) -> Result<Box<dyn ChatModel>> {
    match model_spec {
        ModelSpec::Local(model_id) => {
            info!("Setting up local pipeline for '{model_id}'");
            let provider = LocalModelProvider::new(model_id.clone());
            provider.ensure_model().await?;
            Ok(Box::new(provider))
        }
        ModelSpec::HostedRepo(repo_id) => {
            info!("Setting up hosted hub model '{repo_id}'");
            Ok(Box::new(HubInferenceProvider::new(repo_id.clone())))
        }
        ModelSpec::ManagedDeployment(deployment) => {
            info!("Setting up managed deployment '{deployment}'");
            Ok(Box::new(AzureChatProvider::from_env(deployment.clone())?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_identifier_wins_over_others() {
        let model_spec = ModelSpec::from_options(
            Some("qwen2.5:0.5b".to_owned()),
            Some("google/flan-t5-small".to_owned()),
            Some("gpt-4o-mini".to_owned()),
        )
        .unwrap();
        assert_eq!(model_spec, ModelSpec::Local("qwen2.5:0.5b".to_owned()));
    }

    #[test]
    fn repo_wins_over_deployment() {
        let model_spec = ModelSpec::from_options(
            None,
            Some("google/flan-t5-small".to_owned()),
            Some("gpt-4o-mini".to_owned()),
        )
        .unwrap();
        assert_eq!(
            model_spec,
            ModelSpec::HostedRepo("google/flan-t5-small".to_owned())
        );
    }

    #[test]
    fn deployment_alone_is_selected() {
        let model_spec =
            ModelSpec::from_options(None, None, Some("gpt-4o-mini".to_owned())).unwrap();
        assert_eq!(
            model_spec,
            ModelSpec::ManagedDeployment("gpt-4o-mini".to_owned())
        );
    }

    #[test]
    fn no_identifier_is_unsupported() {
        let result = ModelSpec::from_options(None, None, None);
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }
}
