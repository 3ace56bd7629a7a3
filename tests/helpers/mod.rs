#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;

use folio::application::ports::{
    CollectionConfig, Embedder, EmbedderError, ExtractionError, LlmClient, LlmClientError,
    PageRenderer, RenderError, TextExtractor,
};
use folio::application::services::{
    AnswerSynthesizer, IngestionService, PromptTemplate, RetrievalService, SessionController,
    SessionOptions,
};
use folio::domain::{Chunk, Embedding, PageRecord};
use folio::infrastructure::persistence::InMemoryVectorStore;
use folio::infrastructure::storage::LocalDocumentStore;
use folio::infrastructure::text_processing::OverlappingCharacterSplitter;

pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
pub const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n%stub\n";

/// Counts keyword occurrences, plus a constant dimension so no vector is zero.
pub struct KeywordEmbedder {
    keywords: Vec<&'static str>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&'static str]) -> Self {
        Self {
            keywords: keywords.to_vec(),
        }
    }

    pub fn vector(&self, text: &str) -> Embedding {
        let lower = text.to_lowercase();
        let mut values: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| lower.matches(k).count() as f32)
            .collect();
        values.push(0.1);
        Embedding::new(values)
    }
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self::new(&["sky", "grass", "sea", "sun"])
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbedderError> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding, EmbedderError> {
        Err(EmbedderError::ApiRequestFailed("connection refused".to_string()))
    }

    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, EmbedderError> {
        Err(EmbedderError::ApiRequestFailed("connection refused".to_string()))
    }
}

/// Returns a fixed reply and keeps every prompt it was sent.
pub struct RecordingLlmClient {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingLlmClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for RecordingLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmClientError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub struct FailingLlmClient;

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmClientError> {
        Err(LlmClientError::Timeout)
    }
}

/// Blocks inside `complete` until released, so a test can observe the
/// session while a query is in flight.
#[derive(Default)]
pub struct GatedLlmClient {
    pub started: Notify,
    pub release: Notify,
}

#[async_trait]
impl LlmClient for GatedLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmClientError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok("Released answer".to_string())
    }
}

/// Serves fixed pages for any file carrying the PDF signature.
pub struct StubExtractor {
    pages: Vec<PageRecord>,
}

impl StubExtractor {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages
                .iter()
                .enumerate()
                .map(|(i, text)| PageRecord::new(i, text.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<PageRecord>, ExtractionError> {
        let data = tokio::fs::read(path).await?;
        if !data.starts_with(b"%PDF-") {
            return Err(ExtractionError::NotAPdf);
        }
        Ok(self.pages.clone())
    }
}

/// Blocks inside `extract` until released, so a test can cancel an upload
/// while it is in flight.
pub struct GatedExtractor {
    inner: StubExtractor,
    pub started: Notify,
    pub release: Notify,
}

impl GatedExtractor {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            inner: StubExtractor::new(pages),
            started: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl TextExtractor for GatedExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<PageRecord>, ExtractionError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.extract(path).await
    }
}

/// Renders a PNG header for every page except those listed as broken.
pub struct StubRenderer {
    broken_pages: Vec<usize>,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self {
            broken_pages: Vec::new(),
        }
    }

    pub fn failing_on(pages: &[usize]) -> Self {
        Self {
            broken_pages: pages.to_vec(),
        }
    }
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render_page(
        &self,
        _path: &Path,
        page_index: usize,
        width: u32,
    ) -> Result<Vec<u8>, RenderError> {
        if self.broken_pages.contains(&page_index) {
            return Err(RenderError::RenderFailed(format!("page {page_index} is damaged")));
        }
        let mut png = PNG_MAGIC.to_vec();
        png.extend_from_slice(&width.to_be_bytes());
        Ok(png)
    }
}

pub fn chunk(text: &str, page_index: usize) -> Chunk {
    Chunk::new(text.to_string(), page_index, 0, text.chars().count())
}

pub struct TestSession {
    pub controller: Arc<SessionController>,
    pub vector_store: Arc<InMemoryVectorStore>,
    pub dir: TempDir,
}

pub struct TestSessionBuilder {
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn Embedder>,
    llm_client: Arc<dyn LlmClient>,
    renderer: Option<Arc<dyn PageRenderer>>,
    options: SessionOptions,
}

impl TestSessionBuilder {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            extractor: Arc::new(StubExtractor::new(pages)),
            embedder: Arc::new(KeywordEmbedder::default()),
            llm_client: Arc::new(RecordingLlmClient::new("Mock answer")),
            renderer: Some(Arc::new(StubRenderer::new())),
            options: SessionOptions::default(),
        }
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn llm_client(mut self, llm_client: Arc<dyn LlmClient>) -> Self {
        self.llm_client = llm_client;
        self
    }

    pub fn renderer(mut self, renderer: Option<Arc<dyn PageRenderer>>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> TestSession {
        let dir = TempDir::new().unwrap();
        let document_store = Arc::new(LocalDocumentStore::new(dir.path().join("pdfs")).unwrap());
        let vector_store = Arc::new(InMemoryVectorStore::new(CollectionConfig::default()));

        let ingestion = Arc::new(IngestionService::new(
            document_store,
            self.extractor,
            Arc::new(OverlappingCharacterSplitter::default()),
            Arc::clone(&self.embedder),
            vector_store.clone(),
        ));
        let retrieval = Arc::new(RetrievalService::new(
            self.embedder,
            vector_store.clone(),
            4,
        ));
        let synthesizer = Arc::new(AnswerSynthesizer::new(
            self.llm_client,
            PromptTemplate::default(),
        ));

        let controller = Arc::new(SessionController::new(
            ingestion,
            retrieval,
            synthesizer,
            self.renderer,
            self.options,
        ));

        TestSession {
            controller,
            vector_store,
            dir,
        }
    }
}
