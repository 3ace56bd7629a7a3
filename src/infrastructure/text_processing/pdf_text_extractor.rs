use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;
use tokio::io::AsyncReadExt;

use crate::application::ports::{ExtractionError, TextExtractor};
use crate::domain::PageRecord;

use super::text_sanitizer::normalize_page_text;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);
const PDF_SIGNATURE: &[u8] = b"%PDF-";
// readers accept the signature anywhere in the first KiB
const SIGNATURE_SEARCH_WINDOW: u64 = 1024;

pub struct PdfTextExtractor {
    timeout: Duration,
}

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self {
            timeout: EXTRACTION_TIMEOUT,
        }
    }

    async fn check_signature(path: &Path) -> Result<(), ExtractionError> {
        let file = tokio::fs::File::open(path).await?;
        let mut header = Vec::with_capacity(SIGNATURE_SEARCH_WINDOW as usize);
        file.take(SIGNATURE_SEARCH_WINDOW)
            .read_to_end(&mut header)
            .await?;

        if header
            .windows(PDF_SIGNATURE.len())
            .any(|window| window == PDF_SIGNATURE)
        {
            Ok(())
        } else {
            Err(ExtractionError::NotAPdf)
        }
    }

    fn extract_pages(path: &Path) -> Result<Vec<PageRecord>, ExtractionError> {
        let mut doc = PdfDocument::open(path).map_err(|e| classify("open", e))?;

        let page_count = doc
            .page_count()
            .map_err(|e| classify("read page count", e))?;

        let mut pages = Vec::with_capacity(page_count);
        for page_index in 0..page_count {
            let raw = doc
                .extract_text(page_index)
                .map_err(|e| classify(&format!("page {}", page_index + 1), e))?;
            pages.push(PageRecord::new(page_index, normalize_page_text(&raw)));
        }

        Ok(pages)
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(stage: &str, err: impl Display) -> ExtractionError {
    let message = format!("{stage}: {err}");
    if message.to_ascii_lowercase().contains("encrypt") {
        ExtractionError::Encrypted(message)
    } else {
        ExtractionError::ParseFailed(message)
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn extract(&self, path: &Path) -> Result<Vec<PageRecord>, ExtractionError> {
        Self::check_signature(path).await?;

        let owned_path = path.to_path_buf();
        let pages = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || Self::extract_pages(&owned_path)),
        )
        .await
        .map_err(|_| ExtractionError::TimedOut)?
        .map_err(|e| ExtractionError::ParseFailed(format!("task join error: {e}")))??;

        let text_pages = pages.iter().filter(|p| !p.is_blank()).count();
        tracing::info!(
            page_count = pages.len(),
            text_pages,
            "PDF text extraction complete"
        );

        if text_pages == 0 {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            return Err(ExtractionError::NoTextFound(name));
        }

        Ok(pages)
    }
}
