use std::io;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::StoredDocument;

/// Two-step persistence for uploads. A staged upload lives beside the
/// committed files and only replaces one of them on `commit`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Writes `data` to a staging location that keeps `filename` as its
    /// final path component.
    async fn stage(&self, data: Bytes, filename: &str) -> Result<StoredDocument, DocumentStoreError>;

    /// Moves a staged upload onto its file name, replacing any earlier file
    /// with the same name.
    async fn commit(&self, staged: &StoredDocument) -> Result<StoredDocument, DocumentStoreError>;

    /// Removes a staged upload. Committed files are left alone.
    async fn discard(&self, staged: &StoredDocument) -> Result<(), DocumentStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("invalid file name: {0:?}")]
    InvalidFilename(String),
    #[error("storage directory unavailable: {0}")]
    DirectoryUnavailable(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
