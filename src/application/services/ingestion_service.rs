use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{
    DocumentStore, DocumentStoreError, Embedder, EmbedderError, ExtractionError, TextExtractor,
    TextSplitter, TextSplitterError, VectorStore, VectorStoreError,
};
use crate::domain::{Chunk, Embedding, StoredDocument};

const EMBED_BATCH_SIZE: usize = 32;

/// Summary of one successful upload-to-index run.
#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub document: StoredDocument,
    pub page_count: usize,
    pub chunk_count: usize,
    pub index_size: usize,
}

pub struct IngestionService {
    document_store: Arc<dyn DocumentStore>,
    text_extractor: Arc<dyn TextExtractor>,
    text_splitter: Arc<dyn TextSplitter>,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl IngestionService {
    pub fn new(
        document_store: Arc<dyn DocumentStore>,
        text_extractor: Arc<dyn TextExtractor>,
        text_splitter: Arc<dyn TextSplitter>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            document_store,
            text_extractor,
            text_splitter,
            embedder,
            vector_store,
        }
    }

    /// Stages the upload, indexes it, then commits it over any earlier file
    /// with the same name. A failed run discards the staged copy and leaves
    /// the committed files untouched. When `reset_index` is set the new
    /// chunks replace everything previously indexed.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn ingest(
        &self,
        data: Bytes,
        filename: &str,
        reset_index: bool,
    ) -> Result<IngestionReport, IngestionError> {
        let staged = self
            .document_store
            .stage(data, filename)
            .await
            .map_err(IngestionError::Storage)?;

        tracing::debug!(path = %staged.path.display(), "Document staged");

        let mut report = match self.index_document(staged.clone(), reset_index).await {
            Ok(report) => report,
            Err(e) => {
                if let Err(discard_error) = self.document_store.discard(&staged).await {
                    tracing::warn!(error = %discard_error, "Failed to discard staged document");
                }
                return Err(e);
            }
        };

        // the index already holds the new chunks if this fails
        report.document = self
            .document_store
            .commit(&staged)
            .await
            .map_err(IngestionError::Storage)?;

        Ok(report)
    }

    /// Extracts, chunks and embeds a stored document. Nothing reaches the
    /// index unless every step succeeds.
    #[tracing::instrument(
        skip(self, document),
        fields(document_id = %document.id.as_uuid(), filename = %document.filename)
    )]
    pub async fn index_document(
        &self,
        document: StoredDocument,
        reset_index: bool,
    ) -> Result<IngestionReport, IngestionError> {
        let pages = self
            .text_extractor
            .extract(&document.path)
            .await
            .map_err(IngestionError::Extraction)?;

        let chunks = self
            .text_splitter
            .split_pages(&pages)
            .await
            .map_err(IngestionError::Splitting)?;

        tracing::debug!(
            page_count = pages.len(),
            chunk_count = chunks.len(),
            "Document chunked"
        );

        let embeddings = self.embed_chunks(&chunks).await?;

        if reset_index {
            self.vector_store
                .replace_all(&chunks, &embeddings)
                .await
                .map_err(IngestionError::Indexing)?;
        } else {
            self.vector_store
                .insert(&chunks, &embeddings)
                .await
                .map_err(IngestionError::Indexing)?;
        }

        let index_size = self.vector_store.len().await;
        tracing::info!(
            page_count = pages.len(),
            chunk_count = chunks.len(),
            index_size,
            reset_index,
            "Document indexed"
        );

        Ok(IngestionReport {
            document,
            page_count: pages.len(),
            chunk_count: chunks.len(),
            index_size,
        })
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>, IngestionError> {
        let mut embeddings = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let batch_embeddings = self
                .embedder
                .embed_batch(&texts)
                .await
                .map_err(IngestionError::Embedding)?;

            if batch_embeddings.len() != batch.len() {
                return Err(IngestionError::Embedding(EmbedderError::InvalidResponse(
                    format!(
                        "expected {} embeddings, got {}",
                        batch.len(),
                        batch_embeddings.len()
                    ),
                )));
            }

            if let Some(bad) = batch_embeddings.iter().find(|e| !e.is_well_formed()) {
                return Err(IngestionError::Embedding(EmbedderError::InvalidResponse(
                    format!("malformed {}-d embedding", bad.dimensions()),
                )));
            }

            embeddings.extend(batch_embeddings);
        }

        Ok(embeddings)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("storage: {0}")]
    Storage(#[from] DocumentStoreError),
    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("text splitting: {0}")]
    Splitting(#[from] TextSplitterError),
    #[error("embedding: {0}")]
    Embedding(#[from] EmbedderError),
    #[error("indexing: {0}")]
    Indexing(#[from] VectorStoreError),
}
