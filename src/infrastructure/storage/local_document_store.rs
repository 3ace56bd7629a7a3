use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{DocumentStore, DocumentStoreError};
use crate::domain::StoredDocument;

const STAGING_DIR: &str = ".staging";

/// Keeps uploads under one directory, one file per original file name.
/// Uploads are staged under `.staging/{id}/` first; committing one with an
/// existing name overwrites the earlier file.
pub struct LocalDocumentStore {
    base_path: PathBuf,
    inner: Arc<LocalFileSystem>,
}

impl LocalDocumentStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, DocumentStoreError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path).map_err(|e| {
            DocumentStoreError::DirectoryUnavailable(format!("{}: {e}", base_path.display()))
        })?;
        let base_path = std::fs::canonicalize(&base_path)?;

        let fs = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| DocumentStoreError::DirectoryUnavailable(e.to_string()))?;

        Ok(Self {
            base_path,
            inner: Arc::new(fs),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    async fn ensure_base_dir(&self) -> Result<(), DocumentStoreError> {
        // the directory may have been removed since startup
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| {
                DocumentStoreError::DirectoryUnavailable(format!(
                    "{}: {e}",
                    self.base_path.display()
                ))
            })
    }

    fn to_filesystem(&self, location: &StorePath) -> Result<PathBuf, DocumentStoreError> {
        self.inner
            .path_to_filesystem(location)
            .map_err(|e| DocumentStoreError::WriteFailed(e.to_string()))
    }

    /// Drops the per-upload staging directory once it is empty.
    async fn remove_staging_dir(&self, staged: &StoredDocument) {
        if let Some(dir) = staged.path.parent() {
            if let Err(e) = tokio::fs::remove_dir(dir).await {
                tracing::debug!(dir = %dir.display(), error = %e, "Staging directory left behind");
            }
        }
    }
}

fn staged_location(staged: &StoredDocument) -> StorePath {
    let id = staged.id.as_uuid().to_string();
    StorePath::from_iter([STAGING_DIR, id.as_str(), staged.filename.as_str()])
}

/// Reduces a client-supplied name to its final path component.
fn storage_name(filename: &str) -> Result<String, DocumentStoreError> {
    let invalid = || DocumentStoreError::InvalidFilename(filename.to_string());

    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .ok_or_else(invalid)?;

    if name.is_empty() || name == "." || name == ".." || name == STAGING_DIR {
        return Err(invalid());
    }

    Ok(name.to_string())
}

#[async_trait::async_trait]
impl DocumentStore for LocalDocumentStore {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn stage(&self, data: Bytes, filename: &str) -> Result<StoredDocument, DocumentStoreError> {
        let name = storage_name(filename)?;
        self.ensure_base_dir().await?;

        let size_bytes = data.len() as u64;
        let mut staged = StoredDocument::new(PathBuf::new(), name, size_bytes);
        let location = staged_location(&staged);

        self.inner
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| DocumentStoreError::WriteFailed(e.to_string()))?;

        staged.path = self.to_filesystem(&location)?;
        tracing::debug!(path = %staged.path.display(), size_bytes, "Document staged");

        Ok(staged)
    }

    #[tracing::instrument(skip(self, staged), fields(filename = %staged.filename))]
    async fn commit(&self, staged: &StoredDocument) -> Result<StoredDocument, DocumentStoreError> {
        let from = staged_location(staged);
        let to = StorePath::from(staged.filename.as_str());

        self.inner
            .rename(&from, &to)
            .await
            .map_err(|e| DocumentStoreError::WriteFailed(e.to_string()))?;
        self.remove_staging_dir(staged).await;

        let path = self.to_filesystem(&to)?;
        tracing::info!(path = %path.display(), size_bytes = staged.size_bytes, "Document stored");

        Ok(StoredDocument {
            path,
            ..staged.clone()
        })
    }

    #[tracing::instrument(skip(self, staged), fields(filename = %staged.filename))]
    async fn discard(&self, staged: &StoredDocument) -> Result<(), DocumentStoreError> {
        self.inner
            .delete(&staged_location(staged))
            .await
            .map_err(|e| DocumentStoreError::DeleteFailed(e.to_string()))?;
        self.remove_staging_dir(staged).await;

        tracing::debug!("Staged document discarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::storage_name;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(storage_name("paper.pdf").unwrap(), "paper.pdf");
    }

    #[test]
    fn strips_directory_components() {
        assert_eq!(storage_name("../../etc/paper.pdf").unwrap(), "paper.pdf");
        assert_eq!(storage_name("C:\\Users\\me\\paper.pdf").unwrap(), "paper.pdf");
    }

    #[test]
    fn rejects_names_without_a_file_component() {
        assert!(storage_name("").is_err());
        assert!(storage_name("docs/").is_err());
        assert!(storage_name("..").is_err());
        assert!(storage_name(".staging").is_err());
    }
}
