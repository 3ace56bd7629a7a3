use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use pdfium_render::prelude::*;

use crate::application::ports::{PageRenderer, RenderError};

const MAX_PREVIEW_WIDTH: u32 = 4096;

/// Rasterizes pages through the pdfium shared library. The library is bound
/// per call, so a missing library only fails the preview, never startup.
pub struct PdfiumPageRenderer {
    library_dir: Option<PathBuf>,
}

impl PdfiumPageRenderer {
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }

    fn bind(library_dir: Option<&Path>) -> Result<Pdfium, RenderError> {
        let bindings = match library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| RenderError::LibraryUnavailable(e.to_string()))?;

        Ok(Pdfium::new(bindings))
    }

    fn render_blocking(
        library_dir: Option<&Path>,
        path: &Path,
        page_index: usize,
        width: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let pdfium = Self::bind(library_dir)?;

        let doc = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| RenderError::RenderFailed(format!("pdfium open failed: {e}")))?;

        let page_count = doc.pages().len() as usize;
        if page_index >= page_count {
            return Err(RenderError::PageOutOfRange {
                page_index,
                page_count,
            });
        }

        let page = doc.pages().get(page_index as u16).map_err(|e| {
            RenderError::RenderFailed(format!("page {page_index} access failed: {e}"))
        })?;

        // target width only: pdfium derives the height from the page aspect ratio
        let bitmap = page
            .render_with_config(&PdfRenderConfig::new().set_target_width(width as i32))
            .map_err(|e| RenderError::RenderFailed(format!("render page {page_index}: {e}")))?;

        let dynamic_image = bitmap.as_image();
        let mut png_bytes: Vec<u8> = Vec::new();
        dynamic_image
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| RenderError::EncodeFailed(e.to_string()))?;

        Ok(png_bytes)
    }
}

#[async_trait]
impl PageRenderer for PdfiumPageRenderer {
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn render_page(
        &self,
        path: &Path,
        page_index: usize,
        width: u32,
    ) -> Result<Vec<u8>, RenderError> {
        if width == 0 || width > MAX_PREVIEW_WIDTH {
            return Err(RenderError::InvalidWidth(width));
        }

        let library_dir = self.library_dir.clone();
        let path = path.to_path_buf();

        let png = tokio::task::spawn_blocking(move || {
            Self::render_blocking(library_dir.as_deref(), &path, page_index, width)
        })
        .await
        .map_err(|e| RenderError::RenderFailed(format!("task join error: {e}")))??;

        tracing::debug!(png_bytes = png.len(), "Page preview rendered");
        Ok(png)
    }
}
