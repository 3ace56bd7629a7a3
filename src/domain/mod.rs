mod answer;
mod chunk;
mod document;
mod embedding;
mod page;
mod session_phase;

pub use answer::Answer;
pub use chunk::{Chunk, ChunkId};
pub use document::{DocumentId, StoredDocument};
pub use embedding::Embedding;
pub use page::PageRecord;
pub use session_phase::SessionPhase;
