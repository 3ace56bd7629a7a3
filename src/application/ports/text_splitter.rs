use async_trait::async_trait;

use crate::domain::{Chunk, PageRecord};

#[async_trait]
pub trait TextSplitter: Send + Sync {
    async fn split(&self, page: &PageRecord) -> Result<Vec<Chunk>, TextSplitterError>;

    /// Splits every page in order. No chunk spans two pages.
    async fn split_pages(&self, pages: &[PageRecord]) -> Result<Vec<Chunk>, TextSplitterError> {
        let mut chunks = Vec::new();
        for page in pages {
            chunks.extend(self.split(page).await?);
        }
        Ok(chunks)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("invalid splitter configuration: {0}")]
    InvalidConfiguration(String),
}
