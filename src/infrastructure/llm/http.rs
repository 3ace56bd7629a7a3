use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

/// Builds the shared HTTP client for model collaborators. The timeout is
/// part of the contract, so a builder failure is returned, never papered over.
pub(super) fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

pub(super) enum Failure {
    RateLimited,
    Status(String),
}

/// Splits a response into success or a described failure. The error body is
/// read so it can be surfaced to the user.
pub(super) async fn check_status(response: Response) -> Result<Response, Failure> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(Failure::RateLimited);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Failure::Status(format!("HTTP {}: {}", status, body.trim())));
    }
    Ok(response)
}

pub(super) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
