mod collection_config;
mod distance_metric;
mod document_store;
mod embedder;
mod llm_client;
mod page_renderer;
mod search_result;
mod text_extractor;
mod text_splitter;
mod vector_store;
mod vector_store_error;

pub use collection_config::CollectionConfig;
pub use distance_metric::DistanceMetric;
pub use document_store::{DocumentStore, DocumentStoreError};
pub use embedder::{Embedder, EmbedderError};
pub use llm_client::{LlmClient, LlmClientError};
pub use page_renderer::{PageRenderer, RenderError};
pub use search_result::SearchResult;
pub use text_extractor::{ExtractionError, TextExtractor};
pub use text_splitter::{TextSplitter, TextSplitterError};
pub use vector_store::VectorStore;
pub use vector_store_error::VectorStoreError;
