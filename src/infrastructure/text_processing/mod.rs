mod overlapping_character_splitter;
mod pdf_text_extractor;
mod pdfium_page_renderer;
mod text_sanitizer;

pub use overlapping_character_splitter::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, OverlappingCharacterSplitter,
};
pub use pdf_text_extractor::PdfTextExtractor;
pub use pdfium_page_renderer::PdfiumPageRenderer;
pub use text_sanitizer::normalize_page_text;
