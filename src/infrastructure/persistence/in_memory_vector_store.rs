use std::cmp::Ordering;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{
    CollectionConfig, DistanceMetric, SearchResult, VectorStore, VectorStoreError,
};
use crate::domain::{Chunk, Embedding};

struct IndexedChunk {
    chunk: Chunk,
    embedding: Embedding,
}

struct Collection {
    entries: Vec<IndexedChunk>,
    dimensions: Option<usize>,
}

/// Process-lifetime vector index. Entries are append-only and scored by a
/// linear scan under the configured metric.
pub struct InMemoryVectorStore {
    config: CollectionConfig,
    collection: RwLock<Collection>,
}

impl InMemoryVectorStore {
    pub fn new(config: CollectionConfig) -> Self {
        let dimensions = config.vector_dimensions;
        Self {
            config,
            collection: RwLock::new(Collection {
                entries: Vec::new(),
                dimensions,
            }),
        }
    }

    pub fn distance_metric(&self) -> DistanceMetric {
        self.config.distance_metric
    }

    fn score(&self, query: &Embedding, candidate: &Embedding) -> f32 {
        match self.config.distance_metric {
            DistanceMetric::Cosine => query.cosine_similarity(candidate),
            DistanceMetric::DotProduct => query.dot_product(candidate),
            // negate so that higher always means closer
            DistanceMetric::Euclidean => -query.euclidean_distance(candidate),
        }
    }

    /// Checks the batch against `dimensions` and returns the dimensionality
    /// the collection has after accepting it.
    fn validate(
        chunks: &[Chunk],
        embeddings: &[Embedding],
        dimensions: Option<usize>,
    ) -> Result<Option<usize>, VectorStoreError> {
        if chunks.len() != embeddings.len() {
            return Err(VectorStoreError::CountMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let mut expected = dimensions;
        for embedding in embeddings {
            if !embedding.is_well_formed() {
                return Err(VectorStoreError::MalformedEmbedding);
            }
            match expected {
                Some(dims) if dims != embedding.dimensions() => {
                    return Err(VectorStoreError::DimensionMismatch {
                        expected: dims,
                        actual: embedding.dimensions(),
                    });
                }
                Some(_) => {}
                None => expected = Some(embedding.dimensions()),
            }
        }

        Ok(expected)
    }

    fn append(collection: &mut Collection, chunks: &[Chunk], embeddings: &[Embedding]) {
        collection.entries.extend(
            chunks
                .iter()
                .zip(embeddings.iter())
                .map(|(chunk, embedding)| IndexedChunk {
                    chunk: chunk.clone(),
                    embedding: embedding.clone(),
                }),
        );
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new(CollectionConfig::default())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    #[tracing::instrument(skip_all, fields(count = chunks.len()))]
    async fn insert(
        &self,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), VectorStoreError> {
        let mut collection = self.collection.write().await;
        let dimensions = Self::validate(chunks, embeddings, collection.dimensions)?;

        collection.dimensions = dimensions;
        Self::append(&mut collection, chunks, embeddings);

        tracing::debug!(index_size = collection.entries.len(), "Chunks indexed");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(count = chunks.len()))]
    async fn replace_all(
        &self,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), VectorStoreError> {
        let mut collection = self.collection.write().await;
        let dimensions = Self::validate(chunks, embeddings, self.config.vector_dimensions)?;

        collection.entries.clear();
        collection.dimensions = dimensions;
        Self::append(&mut collection, chunks, embeddings);

        tracing::debug!(index_size = collection.entries.len(), "Index replaced");
        Ok(())
    }

    #[tracing::instrument(skip(self, embedding))]
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        if !embedding.is_well_formed() {
            return Err(VectorStoreError::MalformedEmbedding);
        }

        let collection = self.collection.read().await;
        if let Some(expected) = collection.dimensions {
            if expected != embedding.dimensions() {
                return Err(VectorStoreError::DimensionMismatch {
                    expected,
                    actual: embedding.dimensions(),
                });
            }
        }

        let mut scored: Vec<(f32, &IndexedChunk)> = collection
            .entries
            .iter()
            .map(|entry| (self.score(embedding, &entry.embedding), entry))
            .collect();

        // stable sort: equal scores stay in insertion order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, entry)| SearchResult {
                chunk: entry.chunk.clone(),
                score,
            })
            .collect())
    }

    async fn len(&self) -> usize {
        self.collection.read().await.entries.len()
    }

    async fn dimensions(&self) -> Option<usize> {
        self.collection.read().await.dimensions
    }

    async fn clear(&self) {
        let mut collection = self.collection.write().await;
        collection.entries.clear();
        collection.dimensions = self.config.vector_dimensions;
        tracing::info!("Vector index cleared");
    }
}
