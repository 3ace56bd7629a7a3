use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::domain::SessionPhase;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub phase: SessionPhase,
    pub accepts_queries: bool,
    pub busy: bool,
    pub document: Option<DocumentSummary>,
    pub index_size: usize,
    pub last_question: Option<String>,
}

#[derive(Serialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub filename: String,
    pub size_bytes: u64,
    pub page_count: usize,
    pub chunk_count: usize,
}

pub async fn session_handler(State(state): State<AppState>) -> Json<SessionResponse> {
    let snapshot = state.session.snapshot().await;

    Json(SessionResponse {
        phase: snapshot.phase,
        accepts_queries: snapshot.phase.accepts_queries(),
        busy: snapshot.phase.is_in_flight(),
        document: snapshot.document.map(|ready| DocumentSummary {
            document_id: ready.document.id.as_uuid().to_string(),
            filename: ready.document.filename,
            size_bytes: ready.document.size_bytes,
            page_count: ready.page_count,
            chunk_count: ready.chunk_count,
        }),
        index_size: snapshot.index_size,
        last_question: snapshot.last_question,
    })
}
