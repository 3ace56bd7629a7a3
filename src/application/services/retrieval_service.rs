use std::sync::Arc;

use crate::application::ports::{
    Embedder, EmbedderError, SearchResult, VectorStore, VectorStoreError,
};

pub struct RetrievalService {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl RetrievalService {
    pub fn new(embedder: Arc<dyn Embedder>, vector_store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self {
            embedder,
            vector_store,
            top_k,
        }
    }

    pub fn default_top_k(&self) -> usize {
        self.top_k
    }

    /// Embeds the question and returns the closest chunks. Any embedding
    /// failure yields an error, never a partial result list.
    #[tracing::instrument(skip(self, question, top_k), fields(top_k = tracing::field::Empty))]
    pub async fn retrieve(
        &self,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<SearchResult>, RetrievalError> {
        let top_k = top_k.unwrap_or(self.top_k);
        tracing::Span::current().record("top_k", top_k);

        let query_embedding = self
            .embedder
            .embed(question)
            .await
            .map_err(RetrievalError::Embedding)?;

        if !query_embedding.is_well_formed() {
            return Err(RetrievalError::Embedding(EmbedderError::InvalidResponse(
                "query embedding is empty or non-finite".to_string(),
            )));
        }

        if let Some(expected) = self.vector_store.dimensions().await {
            if expected != query_embedding.dimensions() {
                return Err(RetrievalError::Embedding(EmbedderError::DimensionMismatch {
                    expected,
                    actual: query_embedding.dimensions(),
                }));
            }
        }

        let results = self
            .vector_store
            .search(&query_embedding, top_k)
            .await
            .map_err(RetrievalError::Search)?;

        tracing::debug!(result_count = results.len(), "Similarity search complete");

        Ok(results)
    }

    pub async fn index_size(&self) -> usize {
        self.vector_store.len().await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("search: {0}")]
    Search(#[from] VectorStoreError),
}
