#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("chunks and embeddings count mismatch: {chunks} chunks, {embeddings} embeddings")]
    CountMismatch { chunks: usize, embeddings: usize },
    #[error("dimension mismatch: index holds {expected}-d vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("embedding is empty or contains non-finite values")]
    MalformedEmbedding,
}
