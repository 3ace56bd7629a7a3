use std::path::Path;

use async_trait::async_trait;

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Rasterizes one page to a PNG `width` pixels wide, keeping the page's
    /// aspect ratio.
    async fn render_page(
        &self,
        path: &Path,
        page_index: usize,
        width: u32,
    ) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("rasterizer library unavailable: {0}")]
    LibraryUnavailable(String),
    #[error("page {page_index} out of range ({page_count} pages)")]
    PageOutOfRange { page_index: usize, page_count: usize },
    #[error("invalid preview width: {0}")]
    InvalidWidth(u32),
    #[error("render failed: {0}")]
    RenderFailed(String),
    #[error("image encoding failed: {0}")]
    EncodeFailed(String),
}
