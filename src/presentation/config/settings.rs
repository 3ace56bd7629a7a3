use std::path::PathBuf;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub chunking: ChunkingSettings,
    pub embeddings: EmbeddingsSettings,
    pub llm: LlmSettings,
    pub retrieval: RetrievalSettings,
    pub preview: PreviewSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub pdf_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsSettings {
    pub provider: ModelProvider,
    pub model: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Expected vector size; learned from the first document when unset.
    #[serde(default)]
    pub dimension: Option<usize>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub provider: ModelProvider,
    pub chat_model: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewSettings {
    pub enabled: bool,
    pub width: u32,
    /// Directory holding the pdfium shared library; the system search path
    /// is used when unset.
    #[serde(default)]
    pub pdfium_library_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub reset_index_on_upload: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json: bool,
}

impl Settings {
    /// Layers built-in defaults, `appsettings.{environment}.toml` (optional)
    /// and `APP_`-prefixed environment variables, e.g. `APP_LLM__CHAT_MODEL`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let file_name = format!("appsettings.{}", environment.as_str().to_lowercase());

        Self::defaults()?
            .add_source(File::with_name(&file_name).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and the environment.
    pub fn load_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8501)?
            .set_default("server.max_upload_mb", 200)?
            .set_default("storage.pdf_dir", "document_store/pdfs")?
            .set_default("chunking.chunk_size", 1000)?
            .set_default("chunking.chunk_overlap", 200)?
            .set_default("embeddings.provider", "ollama")?
            .set_default("embeddings.model", "deepseek-r1:1.5b")?
            .set_default("embeddings.base_url", "http://localhost:11434")?
            .set_default("embeddings.request_timeout_secs", 120)?
            .set_default("llm.provider", "ollama")?
            .set_default("llm.chat_model", "deepseek-r1:1.5b")?
            .set_default("llm.base_url", "http://localhost:11434")?
            .set_default("llm.max_tokens", 512)?
            .set_default("llm.temperature", 0.2)?
            .set_default("llm.request_timeout_secs", 300)?
            .set_default("retrieval.top_k", 4)?
            .set_default("preview.enabled", true)?
            .set_default("preview.width", 800)?
            .set_default("session.reset_index_on_upload", false)?
            .set_default("logging.json", false)
    }
}
