use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, LlmClientError};

use super::http::{Failure, build_client, check_status, trim_base_url};

/// Text generation through a local Ollama server (`/api/generate`).
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(
        base_url: &str,
        model: String,
        max_tokens: usize,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: trim_base_url(base_url),
            model,
            max_tokens,
            temperature,
        })
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String, LlmClientError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmClientError::Timeout
                } else {
                    LlmClientError::ApiRequestFailed(e.to_string())
                }
            })?;

        let response = check_status(response).await.map_err(|f| match f {
            Failure::RateLimited => LlmClientError::RateLimited,
            Failure::Status(msg) => LlmClientError::ApiRequestFailed(msg),
        })?;

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        if generated.response.trim().is_empty() {
            return Err(LlmClientError::InvalidResponse(
                "model returned an empty response".to_string(),
            ));
        }

        Ok(generated.response)
    }
}
