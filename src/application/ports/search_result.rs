use crate::domain::Chunk;

/// A retrieved chunk with its similarity to the query; higher is closer.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}
