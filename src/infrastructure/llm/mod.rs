mod http;
mod model_factory;
mod ollama_client;
mod ollama_embedder;
mod openai_client;
mod openai_embedder;

pub use model_factory::{EmbedderFactory, LlmClientFactory, ModelFactoryError};
pub use ollama_client::OllamaClient;
pub use ollama_embedder::OllamaEmbedder;
pub use openai_client::OpenAiClient;
pub use openai_embedder::OpenAiEmbedder;
