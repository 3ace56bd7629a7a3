use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{Embedder, LlmClient};
use crate::presentation::config::{EmbeddingsSettings, LlmSettings, ModelProvider};

use super::{OllamaClient, OllamaEmbedder, OpenAiClient, OpenAiEmbedder};

#[derive(Debug, thiserror::Error)]
pub enum ModelFactoryError {
    #[error("missing API key: the {0} provider requires an api_key")]
    MissingApiKey(&'static str),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

fn require_key(api_key: &Option<String>, role: &'static str) -> Result<String, ModelFactoryError> {
    api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or(ModelFactoryError::MissingApiKey(role))
}

pub struct EmbedderFactory;

impl EmbedderFactory {
    pub fn create(settings: &EmbeddingsSettings) -> Result<Arc<dyn Embedder>, ModelFactoryError> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        match settings.provider {
            ModelProvider::Ollama => {
                tracing::info!(model = %settings.model, base_url = %settings.base_url, "Using Ollama embedding model");
                Ok(Arc::new(OllamaEmbedder::new(
                    &settings.base_url,
                    settings.model.clone(),
                    timeout,
                )?))
            }
            ModelProvider::OpenAi => {
                let key = require_key(&settings.api_key, "OpenAI embeddings")?;
                tracing::info!(model = %settings.model, "Using OpenAI embedding model");
                Ok(Arc::new(OpenAiEmbedder::new(
                    &settings.base_url,
                    key,
                    settings.model.clone(),
                    timeout,
                )?))
            }
        }
    }
}

pub struct LlmClientFactory;

impl LlmClientFactory {
    pub fn create(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, ModelFactoryError> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        match settings.provider {
            ModelProvider::Ollama => {
                tracing::info!(model = %settings.chat_model, base_url = %settings.base_url, "Using Ollama language model");
                Ok(Arc::new(OllamaClient::new(
                    &settings.base_url,
                    settings.chat_model.clone(),
                    settings.max_tokens,
                    settings.temperature,
                    timeout,
                )?))
            }
            ModelProvider::OpenAi => {
                let key = require_key(&settings.api_key, "OpenAI chat")?;
                tracing::info!(model = %settings.chat_model, "Using OpenAI-compatible language model");
                Ok(Arc::new(OpenAiClient::new(
                    &settings.base_url,
                    key,
                    settings.chat_model.clone(),
                    settings.max_tokens,
                    settings.temperature,
                    timeout,
                )?))
            }
        }
    }
}
