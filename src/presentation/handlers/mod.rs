mod documents;
mod error;
mod health;
mod index;
mod query;
mod session;

pub use documents::{UploadResponse, preview_handler, upload_handler};
pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use index::index_handler;
pub use query::{QueryRequestBody, QueryResponse, SourceChunk, query_handler};
pub use session::{SessionResponse, session_handler};
