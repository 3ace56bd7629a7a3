use async_trait::async_trait;

use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::{Chunk, PageRecord};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Fixed character windows over a single page. Consecutive windows share
/// exactly `chunk_overlap` characters and the last window ends at the page
/// end.
#[derive(Debug, Clone)]
pub struct OverlappingCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl OverlappingCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, TextSplitterError> {
        if chunk_size == 0 {
            return Err(TextSplitterError::InvalidConfiguration(
                "chunk size must be positive".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(TextSplitterError::InvalidConfiguration(format!(
                "overlap {chunk_overlap} must be smaller than chunk size {chunk_size}"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Character ranges `[start, end)` covering a text of `char_len` characters.
    pub fn windows(&self, char_len: usize) -> Vec<(usize, usize)> {
        let mut windows = Vec::new();
        if char_len == 0 {
            return windows;
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_len);
            windows.push((start, end));
            if end == char_len {
                break;
            }
            start += step;
        }

        windows
    }
}

impl Default for OverlappingCharacterSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

#[async_trait]
impl TextSplitter for OverlappingCharacterSplitter {
    async fn split(&self, page: &PageRecord) -> Result<Vec<Chunk>, TextSplitterError> {
        let text = page.text.as_str();

        // byte position of every char boundary, plus the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        let chunks = self
            .windows(char_len)
            .into_iter()
            .map(|(start, end)| {
                let chunk_text = text[boundaries[start]..boundaries[end]].to_string();
                Chunk::new(chunk_text, page.page_index, start, end)
            })
            .collect();

        Ok(chunks)
    }
}
