mod answer_synthesizer;
mod ingestion_service;
mod prompt_template;
mod retrieval_service;
mod session_controller;

pub use answer_synthesizer::{AnswerSynthesizer, SynthesisError};
pub use ingestion_service::{IngestionError, IngestionReport, IngestionService};
pub use prompt_template::{DEFAULT_PROMPT_TEMPLATE, PromptTemplate, build_context};
pub use retrieval_service::{RetrievalError, RetrievalService};
pub use session_controller::{
    QueryOutcome, QueryRequest, ReadyDocument, SessionController, SessionError, SessionOptions,
    SessionSnapshot, SourceView,
};
