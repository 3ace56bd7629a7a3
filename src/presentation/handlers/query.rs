use axum::Json;
use axum::extract::State;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::application::services::{QueryOutcome, QueryRequest};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error::ApiError;

#[derive(Deserialize)]
pub struct QueryRequestBody {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub include_previews: bool,
    #[serde(default)]
    pub preview_width: Option<u32>,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceChunk>,
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
pub struct SourceChunk {
    pub index: usize,
    pub page_number: usize,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_png_base64: Option<String>,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        let sources = outcome
            .sources
            .into_iter()
            .map(|source| SourceChunk {
                index: source.rank,
                page_number: source.chunk.page_number(),
                start_offset: source.chunk.start_offset,
                end_offset: source.chunk.end_offset,
                text: source.chunk.text,
                score: source.score,
                preview_png_base64: source.preview_png.map(|png| STANDARD.encode(png.as_slice())),
            })
            .collect();

        Self {
            answer: outcome.answer.text,
            sources,
            warnings: outcome.warnings,
        }
    }
}

#[tracing::instrument(skip(state, body))]
pub async fn query_handler(
    State(state): State<AppState>,
    Json(body): Json<QueryRequestBody>,
) -> Result<Json<QueryResponse>, ApiError> {
    tracing::debug!(question = %sanitize_prompt(&body.question), "Received query");

    let request = QueryRequest {
        question: body.question,
        top_k: body.top_k,
        include_previews: body.include_previews,
        preview_width: body.preview_width,
    };

    let outcome = state.session.ask(request).await?;
    Ok(Json(QueryResponse::from(outcome)))
}
