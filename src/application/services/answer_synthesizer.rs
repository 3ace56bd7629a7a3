use std::sync::Arc;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::{Answer, Chunk};
use crate::infrastructure::observability::sanitize_prompt;

use super::prompt_template::{PromptTemplate, build_context};

pub struct AnswerSynthesizer {
    llm_client: Arc<dyn LlmClient>,
    template: PromptTemplate,
}

impl AnswerSynthesizer {
    pub fn new(llm_client: Arc<dyn LlmClient>, template: PromptTemplate) -> Self {
        Self {
            llm_client,
            template,
        }
    }

    pub fn build_prompt(&self, query: &str, context_chunks: &[Chunk]) -> String {
        self.template.render(query, &build_context(context_chunks))
    }

    /// Returns the model output verbatim; it is not checked against the context.
    #[tracing::instrument(skip_all, fields(context_chunks = context_chunks.len()))]
    pub async fn answer(
        &self,
        query: &str,
        context_chunks: &[Chunk],
    ) -> Result<Answer, SynthesisError> {
        let prompt = self.build_prompt(query, context_chunks);
        tracing::debug!(
            query = %sanitize_prompt(query),
            prompt_chars = prompt.len(),
            "Invoking generative model"
        );

        let text = self
            .llm_client
            .complete(&prompt)
            .await
            .map_err(SynthesisError::Generation)?;

        tracing::info!(answer_chars = text.len(), "Answer generated");
        Ok(Answer::new(text))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("generation: {0}")]
    Generation(#[from] LlmClientError),
}
