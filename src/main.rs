use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use folio::application::ports::{CollectionConfig, PageRenderer};
use folio::application::services::{
    AnswerSynthesizer, IngestionService, PromptTemplate, RetrievalService, SessionController,
    SessionOptions,
};
use folio::infrastructure::llm::{EmbedderFactory, LlmClientFactory};
use folio::infrastructure::observability::{TracingConfig, init_tracing};
use folio::infrastructure::persistence::InMemoryVectorStore;
use folio::infrastructure::storage::LocalDocumentStore;
use folio::infrastructure::text_processing::{
    OverlappingCharacterSplitter, PdfTextExtractor, PdfiumPageRenderer,
};
use folio::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::new(
        environment.as_str().to_lowercase(),
        settings.logging.json,
    ));

    tracing::info!(
        environment = %environment,
        embeddings_provider = ?settings.embeddings.provider,
        llm_provider = ?settings.llm.provider,
        chat_model = %settings.llm.chat_model,
        "Starting folio"
    );

    let document_store = Arc::new(
        LocalDocumentStore::new(&settings.storage.pdf_dir)
            .context("Failed to prepare document directory")?,
    );
    let text_extractor = Arc::new(PdfTextExtractor::new());
    let text_splitter = Arc::new(
        OverlappingCharacterSplitter::new(
            settings.chunking.chunk_size,
            settings.chunking.chunk_overlap,
        )
        .context("Invalid chunking settings")?,
    );
    let embedder = EmbedderFactory::create(&settings.embeddings)?;
    let llm_client = LlmClientFactory::create(&settings.llm)?;
    let vector_store = Arc::new(InMemoryVectorStore::new(CollectionConfig::new(
        settings.embeddings.dimension,
    )));

    let ingestion_service = Arc::new(IngestionService::new(
        document_store,
        text_extractor,
        text_splitter,
        Arc::clone(&embedder),
        vector_store.clone(),
    ));
    let retrieval_service = Arc::new(RetrievalService::new(
        embedder,
        vector_store,
        settings.retrieval.top_k,
    ));
    let synthesizer = Arc::new(AnswerSynthesizer::new(llm_client, PromptTemplate::default()));

    let renderer: Option<Arc<dyn PageRenderer>> = settings.preview.enabled.then(|| {
        Arc::new(PdfiumPageRenderer::new(
            settings.preview.pdfium_library_dir.clone(),
        )) as Arc<dyn PageRenderer>
    });

    let session = Arc::new(SessionController::new(
        ingestion_service,
        retrieval_service,
        synthesizer,
        renderer,
        SessionOptions {
            reset_index_on_upload: settings.session.reset_index_on_upload,
            previews_enabled: settings.preview.enabled,
            preview_width: settings.preview.width,
        },
    ));

    let state = AppState::new(session, settings.server.max_upload_mb * 1024 * 1024);
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
