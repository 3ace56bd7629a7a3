mod helpers;

use std::sync::Arc;

use folio::application::ports::LlmClientError;
use folio::application::services::{
    AnswerSynthesizer, DEFAULT_PROMPT_TEMPLATE, PromptTemplate, SynthesisError, build_context,
};

use helpers::{FailingLlmClient, RecordingLlmClient, chunk};

#[tokio::test]
async fn given_single_chunk_when_answering_then_context_block_equals_chunk_text() {
    let llm = Arc::new(RecordingLlmClient::new("The sky is blue."));
    let synthesizer = AnswerSynthesizer::new(llm.clone(), PromptTemplate::default());
    let chunks = vec![chunk("The sky is blue.", 0)];

    let answer = synthesizer
        .answer("What colour is the sky?", &chunks)
        .await
        .unwrap();

    assert_eq!(answer.text, "The sky is blue.");
    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Query: What colour is the sky?\n"));
    assert!(prompts[0].contains("Context: The sky is blue.\nAnswer:"));
}

#[test]
fn given_default_template_when_rendering_then_instructions_precede_query_and_context() {
    let prompt = PromptTemplate::default().render("Q?", "C.");

    assert!(prompt.starts_with("You are an expert research assistant."));
    assert!(prompt.contains("max 3 sentences"));
    assert!(prompt.ends_with("Query: Q?\nContext: C.\nAnswer:\n"));
    assert!(!prompt.contains("{user_query}"));
    assert!(!prompt.contains("{document_context}"));
}

#[test]
fn given_placeholder_text_in_query_when_rendering_then_it_is_not_expanded() {
    let prompt = PromptTemplate::new("Q={user_query} C={document_context}")
        .render("{document_context}", "facts");

    assert_eq!(prompt, "Q={document_context} C=facts");
}

#[test]
fn given_chunks_when_building_context_then_texts_are_joined_in_rank_order() {
    let chunks = vec![chunk("first", 0), chunk("second", 2), chunk("third", 1)];

    assert_eq!(build_context(&chunks), "first\n\nsecond\n\nthird");
    assert_eq!(build_context(&[]), "");
}

#[tokio::test]
async fn given_model_output_with_whitespace_when_answering_then_returned_verbatim() {
    let reply = "  I don't know.\n\n";
    let synthesizer = AnswerSynthesizer::new(
        Arc::new(RecordingLlmClient::new(reply)),
        PromptTemplate::default(),
    );

    let answer = synthesizer.answer("Who?", &[chunk("x", 0)]).await.unwrap();

    assert_eq!(answer.text, reply);
}

#[tokio::test]
async fn given_failing_model_when_answering_then_generation_error_is_returned() {
    let synthesizer = AnswerSynthesizer::new(Arc::new(FailingLlmClient), PromptTemplate::default());

    let result = synthesizer.answer("Who?", &[chunk("x", 0)]).await;

    assert!(matches!(
        result,
        Err(SynthesisError::Generation(LlmClientError::Timeout))
    ));
}

#[test]
fn given_custom_template_when_building_prompt_then_uses_it() {
    let synthesizer = AnswerSynthesizer::new(
        Arc::new(RecordingLlmClient::new("")),
        PromptTemplate::new("{document_context} | {user_query}"),
    );

    let prompt = synthesizer.build_prompt("why", &[chunk("a", 0), chunk("b", 0)]);

    assert_eq!(prompt, "a\n\nb | why");
    assert!(DEFAULT_PROMPT_TEMPLATE.contains("{user_query}"));
}
