//! AI service integration for ad copy and image generation
//!
//! Provides capability traits over hosted model APIs: an OpenAI-compatible
//! chat completion endpoint (one-shot and streaming) and the Gemini image
//! generation endpoint. Orchestrators depend only on the traits; one
//! concrete client exists per provider.

pub mod gemini;
pub mod mock;
pub mod openai;

pub use gemini::GeminiImageClient;
pub use mock::{MockChatClient, MockImageClient};
pub use openai::OpenAiChatClient;

use crate::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Lazy sequence of text fragments from a streaming completion.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Sampling parameters forwarded to the chat completion API.
#[derive(Debug, Clone)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 1000,
        }
    }
}

/// Binary image returned by an image generation call, with the optional
/// commentary some models emit alongside it.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub text: Option<String>,
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Run a single completion and return the first candidate's content.
    async fn generate(&self, system: &str, user: &str, params: &SamplingParams)
        -> Result<String>;

    /// Open a streaming completion and return its text fragments lazily.
    async fn generate_streaming(
        &self,
        system: &str,
        user: &str,
        params: &SamplingParams,
    ) -> Result<TextStream>;

    /// Probe whether the upstream API is reachable.
    async fn health_check(&self) -> Result<bool>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate one image for a text prompt.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;

    /// Probe whether the upstream API is reachable.
    async fn health_check(&self) -> Result<bool>;
}
