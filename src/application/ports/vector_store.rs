use async_trait::async_trait;

use super::{SearchResult, VectorStoreError};
use crate::domain::{Chunk, Embedding};

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Appends the pairs in order. The whole batch is validated first, so a
    /// failed insert leaves the store unchanged.
    async fn insert(&self, chunks: &[Chunk], embeddings: &[Embedding])
    -> Result<(), VectorStoreError>;

    /// Atomically drops every entry and inserts the batch in its place.
    async fn replace_all(
        &self,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), VectorStoreError>;

    /// At most `top_k` results, most similar first; ties keep insertion order.
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn dimensions(&self) -> Option<usize>;

    async fn clear(&self);
}
