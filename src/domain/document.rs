use std::path::PathBuf;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

/// An uploaded file persisted under the storage directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
}

impl StoredDocument {
    pub fn new(path: PathBuf, filename: String, size_bytes: u64) -> Self {
        Self {
            id: DocumentId::new(),
            path,
            filename,
            size_bytes,
        }
    }
}
