use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{DocumentStoreError, LlmClientError, RenderError};
use crate::application::services::{
    IngestionError, RetrievalError, SessionError, SynthesisError,
};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Session(e) => session_status(e),
        }
    }
}

fn session_status(error: &SessionError) -> StatusCode {
    match error {
        SessionError::NoDocument | SessionError::Busy => StatusCode::CONFLICT,
        SessionError::EmptyQuestion | SessionError::InvalidTopK => StatusCode::BAD_REQUEST,
        SessionError::PreviewsDisabled => StatusCode::NOT_FOUND,
        SessionError::Ingestion(e) => match e {
            IngestionError::Storage(DocumentStoreError::InvalidFilename(_)) => {
                StatusCode::BAD_REQUEST
            }
            IngestionError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IngestionError::Embedding(_) => StatusCode::BAD_GATEWAY,
            IngestionError::Storage(_)
            | IngestionError::Splitting(_)
            | IngestionError::Indexing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        SessionError::Retrieval(RetrievalError::Embedding(_)) => StatusCode::BAD_GATEWAY,
        SessionError::Retrieval(RetrievalError::Search(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        SessionError::Synthesis(SynthesisError::Generation(LlmClientError::Timeout)) => {
            StatusCode::GATEWAY_TIMEOUT
        }
        SessionError::Synthesis(_) => StatusCode::BAD_GATEWAY,
        SessionError::Preview(e) => match e {
            RenderError::PageOutOfRange { .. } | RenderError::LibraryUnavailable(_) => {
                StatusCode::NOT_FOUND
            }
            RenderError::InvalidWidth(_) => StatusCode::BAD_REQUEST,
            RenderError::RenderFailed(_) | RenderError::EncodeFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    }
}

impl ApiError {
    /// Page previews report a missing document as absent content rather than
    /// as a session conflict.
    pub fn for_preview(error: SessionError) -> Self {
        match error {
            SessionError::NoDocument => Self::NotFound(error.to_string()),
            other => Self::Session(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
