use std::path::Path;

use async_trait::async_trait;

use crate::domain::PageRecord;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns one record per page, in document order.
    async fn extract(&self, path: &Path) -> Result<Vec<PageRecord>, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("file is not a PDF document")]
    NotAPdf,
    #[error("PDF is encrypted: {0}")]
    Encrypted(String),
    #[error("failed to parse PDF: {0}")]
    ParseFailed(String),
    #[error("no extractable text found in {0}")]
    NoTextFound(String),
    #[error("PDF extraction timed out")]
    TimedOut,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
