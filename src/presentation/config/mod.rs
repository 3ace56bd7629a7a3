mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChunkingSettings, EmbeddingsSettings, LlmSettings, LoggingSettings, ModelProvider,
    PreviewSettings, RetrievalSettings, ServerSettings, SessionSettings, Settings,
    StorageSettings,
};
