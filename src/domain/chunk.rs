use uuid::Uuid;

/// A bounded fragment of one page's text, the unit of retrieval.
///
/// Offsets are character offsets into the page text: `start_offset` is
/// inclusive, `end_offset` exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub page_index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(Uuid);

impl ChunkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChunkId {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    pub fn new(text: String, page_index: usize, start_offset: usize, end_offset: usize) -> Self {
        Self {
            id: ChunkId::new(),
            text,
            page_index,
            start_offset,
            end_offset,
        }
    }

    /// One-based page number for display.
    pub fn page_number(&self) -> usize {
        self.page_index + 1
    }

    pub fn char_len(&self) -> usize {
        self.end_offset - self.start_offset
    }
}
