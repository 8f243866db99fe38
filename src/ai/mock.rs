use super::{ChatService, GeneratedImage, ImageGenerationService, SamplingParams, TextStream};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

const DEFAULT_AD_COPY: &str = "Meet your new favorite. Built to last, priced to move.";

/// Scriptable chat client for tests: queued one-shot responses, scripted
/// stream fragments, and optional mid-stream or up-front failures.
#[derive(Clone)]
pub struct MockChatClient {
    responses: Arc<Mutex<Vec<String>>>,
    stream_fragments: Arc<Mutex<Option<Vec<String>>>>,
    stream_failure: Arc<Mutex<Option<String>>>,
    request_failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            stream_fragments: Arc::new(Mutex::new(None)),
            stream_failure: Arc::new(Mutex::new(None)),
            request_failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Script the fragments the next streaming call yields.
    pub fn with_stream_fragments(self, fragments: Vec<String>) -> Self {
        *self.stream_fragments.lock().unwrap() = Some(fragments);
        self
    }

    /// Make the stream fail with this message after its scripted fragments.
    pub fn with_stream_failure(self, message: String) -> Self {
        *self.stream_failure.lock().unwrap() = Some(message);
        self
    }

    /// Make every call fail before producing anything.
    pub fn with_request_failure(self, message: String) -> Self {
        *self.request_failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn bump(&self) -> usize {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        *count
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn generate(
        &self,
        _system: &str,
        _user: &str,
        _params: &SamplingParams,
    ) -> Result<String> {
        let count = self.bump();

        if let Some(message) = self.request_failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(DEFAULT_AD_COPY.to_string())
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }

    async fn generate_streaming(
        &self,
        _system: &str,
        _user: &str,
        _params: &SamplingParams,
    ) -> Result<TextStream> {
        self.bump();

        if let Some(message) = self.request_failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let fragments = self
            .stream_fragments
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| {
                DEFAULT_AD_COPY
                    .split_inclusive(' ')
                    .map(|part| part.to_string())
                    .collect()
            });

        let mut items: Vec<Result<String>> = fragments.into_iter().map(Ok).collect();
        if let Some(message) = self.stream_failure.lock().unwrap().clone() {
            items.push(Err(Error::AiProvider(message)));
        }

        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.request_failure.lock().unwrap().is_none())
    }
}

/// Scriptable image client for tests.
#[derive(Clone)]
pub struct MockImageClient {
    responses: Arc<Mutex<Vec<Vec<u8>>>>,
    failure: Arc<Mutex<Option<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image_response(self, bytes: Vec<u8>) -> Self {
        self.responses.lock().unwrap().push(bytes);
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate_image(&self, _prompt: &str) -> Result<GeneratedImage> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::AiProvider(message));
        }

        let responses = self.responses.lock().unwrap();
        let bytes = if responses.is_empty() {
            // Tiny valid PNG as default
            vec![
                0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
                0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
                0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
                0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C,
                0x49, 0x44, 0x41, // IDAT chunk
                0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01,
                0xE2, 0x25, 0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND
                0x44, 0xAE, 0x42, 0x60, 0x82,
            ]
        } else {
            responses[(count - 1) % responses.len()].clone()
        };

        Ok(GeneratedImage {
            bytes,
            mime_type: "image/png".to_string(),
            text: None,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.failure.lock().unwrap().is_none())
    }
}
