use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::presentation::state::AppState;

use super::error::ApiError;

const UPLOAD_FIELD: &str = "file";

#[derive(Serialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub filename: String,
    pub page_count: usize,
    pub chunk_count: usize,
    pub message: String,
}

#[derive(Deserialize)]
pub struct PreviewParams {
    pub width: Option<u32>,
}

fn looks_like_pdf(filename: &str, content_type: Option<&str>) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
        || matches!(content_type, Some("application/pdf"))
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) && field.file_name().is_none() {
            continue;
        }

        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);

        tracing::debug!(filename = %filename, content_type = ?content_type, "Processing file upload");

        if !looks_like_pdf(&filename, content_type.as_deref()) {
            return Err(ApiError::BadRequest(format!(
                "Only PDF documents are accepted, got {}",
                content_type.as_deref().unwrap_or(&filename)
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

        if data.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        let ready = state.session.upload(data, &filename).await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                document_id: ready.document.id.as_uuid().to_string(),
                filename: ready.document.filename,
                page_count: ready.page_count,
                chunk_count: ready.chunk_count,
                message: "Document processed successfully".to_string(),
            }),
        ));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// `page_number` is one-based, as shown next to each source.
pub async fn preview_handler(
    State(state): State<AppState>,
    Path(page_number): Path<usize>,
    Query(params): Query<PreviewParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page_index = page_number
        .checked_sub(1)
        .ok_or_else(|| ApiError::BadRequest("page numbers start at 1".to_string()))?;

    let png = state
        .session
        .preview_page(page_index, params.width)
        .await
        .map_err(ApiError::for_preview)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
