use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage};
use crate::ai::{ChatService, SamplingParams, TextStream};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Chat completion client for any OpenAI-compatible gateway.
pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            http: OpenAiHttpClient::new(api_key, base_url, Duration::from_secs(120)),
            model,
        }
    }

    pub fn new_with_client(
        api_key: String,
        base_url: String,
        model: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, base_url, client),
            model,
        }
    }

    fn build_request(
        &self,
        system: &str,
        user: &str,
        params: &SamplingParams,
        stream: bool,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(system.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(user.to_string()),
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            stream: stream.then_some(true),
        }
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        params: &SamplingParams,
    ) -> Result<String> {
        let request = self.build_request(system, user, params, false);
        let response = self.http.chat_completion(&request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::AiProvider("No content in chat completion response".to_string()))
    }

    async fn generate_streaming(
        &self,
        system: &str,
        user: &str,
        params: &SamplingParams,
    ) -> Result<TextStream> {
        let request = self.build_request(system, user, params, true);
        let stream = self.http.chat_completion_stream(&request).await?;
        Ok(Box::pin(stream))
    }

    async fn health_check(&self) -> Result<bool> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some("ping".to_string()),
            }],
            max_tokens: 1,
            temperature: 0.0,
            stream: None,
        };

        Ok(self.http.chat_completion(&request).await.is_ok())
    }
}
