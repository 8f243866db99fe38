use super::stream::SseTokenStream;
use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

/// Thin HTTP client for an OpenAI-compatible chat completion endpoint.
///
/// The base URL carries any path prefix the gateway expects (for example
/// `https://api.lunos.tech/v1`); requests append `/chat/completions`.
pub struct OpenAiHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl OpenAiHttpClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Self {
        Self::new_with_client(
            api_key,
            base_url,
            Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        )
    }

    pub fn new_with_client(api_key: String, base_url: String, client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            client,
            api_key,
            base_url,
        }
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let response = self.post_chat(request).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse chat completion response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse chat completion response: {}", e))
        })
    }

    /// Open a streaming completion. The returned stream yields delta content
    /// fragments as the server produces them; dropping it closes the
    /// underlying connection.
    pub async fn chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<SseTokenStream> {
        let response = self.post_chat(request).await?;
        Ok(SseTokenStream::new(response.bytes_stream()))
    }

    async fn post_chat(&self, request: &ChatCompletionRequest) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send chat completion request: {}", e);
                Error::AiProvider(format!("Chat completion request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Chat API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Chat API error (status {}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}
