use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::application::ports::{PageRenderer, RenderError};
use crate::domain::{Answer, Chunk, SessionPhase, StoredDocument};
use crate::infrastructure::observability::sanitize_prompt;

use super::answer_synthesizer::{AnswerSynthesizer, SynthesisError};
use super::ingestion_service::{IngestionError, IngestionService};
use super::retrieval_service::{RetrievalError, RetrievalService};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub reset_index_on_upload: bool,
    pub previews_enabled: bool,
    pub preview_width: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            reset_index_on_upload: false,
            previews_enabled: true,
            preview_width: 800,
        }
    }
}

/// The document currently available for questions.
#[derive(Debug, Clone)]
pub struct ReadyDocument {
    pub document: StoredDocument,
    pub page_count: usize,
    pub chunk_count: usize,
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub question: String,
    pub top_k: Option<usize>,
    pub include_previews: bool,
    pub preview_width: Option<u32>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            include_previews: false,
            preview_width: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceView {
    /// One-based rank in the retrieval order.
    pub rank: usize,
    pub chunk: Chunk,
    pub score: f32,
    pub preview_png: Option<Arc<Vec<u8>>>,
}

#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub question: String,
    pub answer: Answer,
    pub sources: Vec<SourceView>,
    /// Soft failures, such as a page preview that could not be rendered.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub document: Option<ReadyDocument>,
    pub index_size: usize,
    pub last_question: Option<String>,
}

struct SessionState {
    phase: SessionPhase,
    document: Option<ReadyDocument>,
    last_outcome: Option<QueryOutcome>,
}

/// Holds the session in an in-flight phase. Dropping it without `settle`,
/// as happens when the request future is cancelled, puts back `fallback`.
struct PhaseGuard<'a> {
    state: &'a Mutex<SessionState>,
    fallback: SessionPhase,
    settled: bool,
}

impl<'a> PhaseGuard<'a> {
    fn enter(state: &'a Mutex<SessionState>, phase: SessionPhase, fallback: SessionPhase) -> Self {
        let mut locked = lock(state);
        tracing::debug!(from = %locked.phase, to = %phase, "Session transition");
        locked.phase = phase;
        Self {
            state,
            fallback,
            settled: false,
        }
    }

    fn settle(mut self) -> MutexGuard<'a, SessionState> {
        self.settled = true;
        lock(self.state)
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = lock(self.state);
            tracing::warn!(from = %state.phase, to = %self.fallback, "Session action cancelled");
            state.phase = self.fallback;
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives the upload and question flow as an explicit state machine:
/// `Idle -> DocumentLoading -> DocumentReady -> Querying -> AnswerReady`.
///
/// One action runs at a time; a second action arriving while one is in
/// flight is rejected with [`SessionError::Busy`].
pub struct SessionController {
    ingestion: Arc<IngestionService>,
    retrieval: Arc<RetrievalService>,
    synthesizer: Arc<AnswerSynthesizer>,
    renderer: Option<Arc<dyn PageRenderer>>,
    options: SessionOptions,
    state: Mutex<SessionState>,
    gate: tokio::sync::Mutex<()>,
}

impl SessionController {
    pub fn new(
        ingestion: Arc<IngestionService>,
        retrieval: Arc<RetrievalService>,
        synthesizer: Arc<AnswerSynthesizer>,
        renderer: Option<Arc<dyn PageRenderer>>,
        options: SessionOptions,
    ) -> Self {
        Self {
            ingestion,
            retrieval,
            synthesizer,
            renderer,
            options,
            state: Mutex::new(SessionState {
                phase: SessionPhase::Idle,
                document: None,
                last_outcome: None,
            }),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        lock(&self.state).phase
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let index_size = self.retrieval.index_size().await;
        let state = lock(&self.state);
        SessionSnapshot {
            phase: state.phase,
            document: state.document.clone(),
            index_size,
            last_question: state.last_outcome.as_ref().map(|o| o.question.clone()),
        }
    }

    pub async fn last_outcome(&self) -> Option<QueryOutcome> {
        lock(&self.state).last_outcome.clone()
    }

    /// Stores and indexes an uploaded PDF. On failure or cancellation the
    /// session returns to the phase it was in before the upload.
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn upload(&self, data: Bytes, filename: &str) -> Result<ReadyDocument, SessionError> {
        let _gate = self.gate.try_lock().map_err(|_| SessionError::Busy)?;

        let prior_phase = self.phase().await;
        let guard = PhaseGuard::enter(&self.state, SessionPhase::DocumentLoading, prior_phase);

        let result = self
            .ingestion
            .ingest(data, filename, self.options.reset_index_on_upload)
            .await;

        let mut state = guard.settle();
        match result {
            Ok(report) => {
                let ready = ReadyDocument {
                    document: report.document,
                    page_count: report.page_count,
                    chunk_count: report.chunk_count,
                };
                state.phase = SessionPhase::DocumentReady;
                state.document = Some(ready.clone());
                state.last_outcome = None;
                tracing::info!(
                    filename = %ready.document.filename,
                    chunk_count = ready.chunk_count,
                    "Session document ready"
                );
                Ok(ready)
            }
            Err(e) => {
                state.phase = prior_phase;
                tracing::error!(error = %e, phase = %prior_phase, "Document ingestion failed");
                Err(SessionError::Ingestion(e))
            }
        }
    }

    /// Answers a question about the ready document. Rejected while no
    /// document is loaded; on failure or cancellation the session returns to
    /// `DocumentReady`.
    #[tracing::instrument(skip_all)]
    pub async fn ask(&self, request: QueryRequest) -> Result<QueryOutcome, SessionError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        if request.top_k == Some(0) {
            return Err(SessionError::InvalidTopK);
        }

        let _gate = self.gate.try_lock().map_err(|_| SessionError::Busy)?;

        let document = {
            let state = lock(&self.state);
            if !state.phase.accepts_queries() {
                return Err(SessionError::NoDocument);
            }
            state.document.clone().ok_or(SessionError::NoDocument)?
        };

        let guard = PhaseGuard::enter(
            &self.state,
            SessionPhase::Querying,
            SessionPhase::DocumentReady,
        );
        tracing::debug!(question = %sanitize_prompt(question), "Processing query");

        let result = self.run_query(question, &request, &document).await;

        let mut state = guard.settle();
        match result {
            Ok(outcome) => {
                state.phase = SessionPhase::AnswerReady;
                state.last_outcome = Some(outcome.clone());
                tracing::info!(
                    sources = outcome.sources.len(),
                    warnings = outcome.warnings.len(),
                    "Query answered"
                );
                Ok(outcome)
            }
            Err(e) => {
                state.phase = SessionPhase::DocumentReady;
                tracing::error!(error = %e, "Query failed");
                Err(e)
            }
        }
    }

    /// Renders one page of the ready document. Does not change the session
    /// phase.
    pub async fn preview_page(
        &self,
        page_index: usize,
        width: Option<u32>,
    ) -> Result<Vec<u8>, SessionError> {
        let document = lock(&self.state)
            .document
            .clone()
            .ok_or(SessionError::NoDocument)?;

        let renderer = self
            .renderer
            .as_ref()
            .filter(|_| self.options.previews_enabled)
            .ok_or(SessionError::PreviewsDisabled)?;

        let width = width.unwrap_or(self.options.preview_width);
        renderer
            .render_page(&document.document.path, page_index, width)
            .await
            .map_err(SessionError::Preview)
    }

    async fn run_query(
        &self,
        question: &str,
        request: &QueryRequest,
        document: &ReadyDocument,
    ) -> Result<QueryOutcome, SessionError> {
        let results = self
            .retrieval
            .retrieve(question, request.top_k)
            .await
            .map_err(SessionError::Retrieval)?;

        let chunks: Vec<Chunk> = results.iter().map(|r| r.chunk.clone()).collect();

        let answer = self
            .synthesizer
            .answer(question, &chunks)
            .await
            .map_err(SessionError::Synthesis)?;

        let mut warnings = Vec::new();
        let previews = if request.include_previews {
            let width = request.preview_width.unwrap_or(self.options.preview_width);
            self.render_previews(document, &chunks, width, &mut warnings)
                .await
        } else {
            HashMap::new()
        };

        let sources = results
            .into_iter()
            .enumerate()
            .map(|(i, r)| SourceView {
                rank: i + 1,
                preview_png: previews.get(&r.chunk.page_index).cloned().flatten(),
                chunk: r.chunk,
                score: r.score,
            })
            .collect();

        Ok(QueryOutcome {
            question: question.to_string(),
            answer,
            sources,
            warnings,
        })
    }

    /// Best effort: a page that cannot be rendered gets no preview and a
    /// warning, and the answer is returned regardless.
    async fn render_previews(
        &self,
        document: &ReadyDocument,
        chunks: &[Chunk],
        width: u32,
        warnings: &mut Vec<String>,
    ) -> HashMap<usize, Option<Arc<Vec<u8>>>> {
        let mut previews: HashMap<usize, Option<Arc<Vec<u8>>>> = HashMap::new();

        let renderer = match (&self.renderer, self.options.previews_enabled) {
            (Some(renderer), true) => renderer,
            _ => {
                warnings.push("Page previews are not available.".to_string());
                return previews;
            }
        };

        for chunk in chunks {
            if previews.contains_key(&chunk.page_index) {
                continue;
            }

            let preview = match renderer
                .render_page(&document.document.path, chunk.page_index, width)
                .await
            {
                Ok(png) => Some(Arc::new(png)),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        page = chunk.page_number(),
                        "Page preview not available"
                    );
                    warnings.push(format!(
                        "Preview for page {} not available: {}",
                        chunk.page_number(),
                        e
                    ));
                    None
                }
            };
            previews.insert(chunk.page_index, preview);
        }

        previews
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no document has been uploaded yet")]
    NoDocument,
    #[error("another request is already in progress")]
    Busy,
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("top_k must be at least 1")]
    InvalidTopK,
    #[error("page previews are disabled")]
    PreviewsDisabled,
    #[error("ingestion: {0}")]
    Ingestion(#[from] IngestionError),
    #[error("retrieval: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("synthesis: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("preview: {0}")]
    Preview(#[from] RenderError),
}
