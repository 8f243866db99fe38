use super::client::GeminiHttpClient;
use super::types::{
    safety_settings, Content, GenerateContentResponse, GenerationConfig, Part, SafetySetting,
};
use crate::ai::{GeneratedImage, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

/// Image generation client for Gemini's `generateContent` endpoint.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
    safety_threshold: String,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String, safety_threshold: String) -> Self {
        Self::new_with_client(api_key, model, safety_threshold, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        safety_threshold: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
            safety_threshold,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = ImageRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part::Text {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
                temperature: 1.0,
                top_p: 1.0,
                top_k: 32,
                max_output_tokens: 1024,
            },
            safety_settings: safety_settings(&self.safety_threshold),
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let parts = response
            .candidates
            .first()
            .map(|candidate| candidate.content.parts.as_slice())
            .unwrap_or_default();

        let text = parts.iter().find_map(|part| match part {
            Part::Text { text } => Some(text.clone()),
            _ => None,
        });

        let inline = parts
            .iter()
            .find_map(|part| match part {
                Part::InlineData { inline_data } => Some(inline_data),
                _ => None,
            })
            .ok_or_else(|| Error::AiProvider("No image data in Gemini response".to_string()))?;

        tracing::debug!("Gemini returned image with mime_type: {}", inline.mime_type);

        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| {
                Error::AiProvider(format!("Failed to decode Gemini base64 image: {}", e))
            })?;

        Ok(GeneratedImage {
            bytes,
            mime_type: inline.mime_type.clone(),
            text,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        self.http.get_model().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_CONTENT_PATH: &str = r"^/v1beta/models/[^/]+:generateContent$";
    const DEFAULT_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

    fn make_client(server: &MockServer) -> GeminiImageClient {
        GeminiImageClient::new(
            "key".to_string(),
            DEFAULT_MODEL.to_string(),
            "BLOCK_MEDIUM_AND_ABOVE".to_string(),
        )
        .with_base_url(server.uri())
    }

    fn image_body(b64: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your product shot" },
                        { "inlineData": { "mimeType": "image/png", "data": b64 } }
                    ]
                }
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_image_decodes_inline_data_and_text() {
        let server = MockServer::start().await;

        use base64::Engine as _;
        let fake_image = vec![0x89, 0x50, 0x4E, 0x47];
        let b64 = base64::engine::general_purpose::STANDARD.encode(&fake_image);

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_body(&b64)))
            .mount(&server)
            .await;

        let image = make_client(&server)
            .generate_image("studio shot of a widget")
            .await
            .unwrap();

        assert_eq!(image.bytes, fake_image);
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.text.as_deref(), Some("Here is your product shot"));
    }

    #[tokio::test]
    async fn test_request_carries_modalities_and_safety_settings() {
        let server = MockServer::start().await;

        use base64::Engine as _;
        let b64 = base64::engine::general_purpose::STANDARD.encode([0x00]);

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH))
            .and(body_string_contains("\"responseModalities\":[\"TEXT\",\"IMAGE\"]"))
            .and(body_string_contains("HARM_CATEGORY_DANGEROUS_CONTENT"))
            .and(body_string_contains("BLOCK_MEDIUM_AND_ABOVE"))
            .and(body_string_contains("\"topK\":32"))
            .respond_with(ResponseTemplate::new(200).set_body_json(image_body(&b64)))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server).generate_image("test").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_image("a widget")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_generate_image_rejects_missing_inline_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "no image here" }] }
                }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_image("a widget")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_generate_image_rejects_invalid_base64() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(GENERATE_CONTENT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [{
                            "inlineData": {
                                "mimeType": "image/png",
                                "data": "!!!invalid-base64!!!"
                            }
                        }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .generate_image("a widget")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_health_check_uses_model_metadata_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/v1beta/models/[^/:]+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": format!("models/{}", DEFAULT_MODEL)
            })))
            .mount(&server)
            .await;

        assert!(make_client(&server).health_check().await.unwrap());
    }
}
