//! Ad generation orchestration
//!
//! Composes the system prompt from the (ad type, tone) axes, flattens the
//! product fields into the user turn, and drives the chat client. The
//! non-streaming path returns one complete [`AdResponse`]; the streaming
//! path yields a sequence of [`StreamEvent`]s that opens with `processing`
//! and closes with exactly one terminal `completed` or `error` event.

use crate::ai::{ChatService, SamplingParams};
use crate::models::{AdRequest, AdResponse, AdSettings, AdTone, AdType, ProductInfo, StreamEvent};
use crate::{prompts, Result};
use chrono::Utc;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

/// Error code attached to terminal `error` stream events.
const GENERATION_FAILED: &str = "generation_failed";

/// Accumulated characters at which progress reaches its cap.
const PROGRESS_FULL_CHARS: f32 = 500.0;

/// Progress ceiling for non-terminal events; only the terminal event
/// signals true completion.
const PROGRESS_CAP: f32 = 95.0;

pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Orchestrates ad copy generation against a chat completion service.
pub struct AdStudio {
    chat: Arc<dyn ChatService>,
    model: String,
}

impl AdStudio {
    pub fn new(chat: Arc<dyn ChatService>, model: String) -> Self {
        Self { chat, model }
    }

    /// Generate a complete ad in one call.
    pub async fn generate(
        &self,
        request: &AdRequest,
        ad_type: AdType,
        ad_tone: AdTone,
    ) -> Result<AdResponse> {
        tracing::info!(
            "Generating {} ad ({} tone) for product: {}",
            ad_type.as_str(),
            ad_tone.as_str(),
            request.product_name
        );
        let started = Instant::now();

        let system = prompts::compose(ad_type, ad_tone)?;
        let user = request.field_block();
        let ad_content = self
            .chat
            .generate(&system, &user, &SamplingParams::default())
            .await?;

        Ok(AdResponse {
            ad_content,
            product_info: ProductInfo::from(request),
            ad_settings: AdSettings { ad_type, ad_tone },
            generation_time: started.elapsed().as_secs_f64(),
            model_used: self.model.clone(),
            request_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
        })
    }

    /// Generate an ad as an event stream.
    ///
    /// Failures terminate the sequence with a single `error` event; they
    /// never escape the stream. When the consumer stops reading before a
    /// terminal event, the producer task notices the closed channel and
    /// drops the upstream connection.
    pub fn generate_streaming(
        &self,
        request: AdRequest,
        ad_type: AdType,
        ad_tone: AdTone,
    ) -> EventStream {
        let (tx, rx) = tokio::sync::mpsc::channel(16);
        let chat = Arc::clone(&self.chat);
        let model = self.model.clone();

        tokio::spawn(async move {
            let request_id = Uuid::new_v4().to_string();

            // Emitted before any remote work so the caller gets immediate
            // feedback on a slow model.
            let processing = StreamEvent::Processing {
                request_id: request_id.clone(),
            };
            if tx.send(processing).await.is_err() {
                return;
            }

            let started = Instant::now();

            let system = match prompts::compose(ad_type, ad_tone) {
                Ok(system) => system,
                Err(e) => {
                    let _ = tx.send(error_event(e.to_string(), &request_id)).await;
                    return;
                }
            };
            let user = request.field_block();

            let mut tokens = match chat
                .generate_streaming(&system, &user, &SamplingParams::default())
                .await
            {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::error!("Failed to open token stream: {}", e);
                    let _ = tx.send(error_event(e.to_string(), &request_id)).await;
                    return;
                }
            };

            let mut content = String::new();
            while let Some(item) = tokens.next().await {
                match item {
                    Ok(fragment) => {
                        content.push_str(&fragment);
                        let event = StreamEvent::Streaming {
                            content: fragment,
                            progress: progress_estimate(content.len()),
                        };
                        if tx.send(event).await.is_err() {
                            tracing::debug!("Stream consumer disconnected, aborting generation");
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Token stream failed mid-generation: {}", e);
                        let _ = tx.send(error_event(e.to_string(), &request_id)).await;
                        return;
                    }
                }
            }

            let completed = StreamEvent::Completed {
                content,
                product_info: ProductInfo::from(&request),
                ad_settings: AdSettings { ad_type, ad_tone },
                generation_time: started.elapsed().as_secs_f64(),
                model_used: model,
                request_id,
            };
            let _ = tx.send(completed).await;
        });

        Box::pin(ReceiverStream::new(rx))
    }
}

fn error_event(message: String, request_id: &str) -> StreamEvent {
    StreamEvent::Error {
        message,
        error_code: GENERATION_FAILED.to_string(),
        request_id: request_id.to_string(),
    }
}

/// Heuristic completion estimate for a partial ad, from accumulated length.
///
/// Non-decreasing in `chars` and pinned at 95 from 500 characters onward.
pub fn progress_estimate(chars: usize) -> f32 {
    (chars as f32 / PROGRESS_FULL_CHARS * 100.0).min(PROGRESS_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockChatClient;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    fn studio(chat: MockChatClient) -> AdStudio {
        AdStudio::new(Arc::new(chat), "google/gemma-3-12b-it".to_string())
    }

    fn widget_request() -> AdRequest {
        AdRequest {
            product_name: "Widget".to_string(),
            brand_name: Some("Acme".to_string()),
            category: vec!["tools".to_string()],
            description: None,
            price: Some(19.99),
            discounted_price: None,
            product_url: None,
            image_url: None,
            ad_type: None,
            ad_tone: None,
        }
    }

    fn is_terminal(event: &StreamEvent) -> bool {
        matches!(
            event,
            StreamEvent::Completed { .. } | StreamEvent::Error { .. }
        )
    }

    #[test]
    fn test_progress_estimate_scales_and_caps() {
        assert_eq!(progress_estimate(0), 0.0);
        assert_eq!(progress_estimate(250), 50.0);
        assert_eq!(progress_estimate(500), 95.0);
        assert_eq!(progress_estimate(5000), 95.0);
    }

    #[tokio::test]
    async fn test_generate_fills_every_response_field() {
        let chat = MockChatClient::new().with_response("Grab the Widget today!".to_string());
        let studio = studio(chat);

        let response = studio
            .generate(&widget_request(), AdType::SocialMedia, AdTone::Friendly)
            .await
            .unwrap();

        assert_eq!(response.ad_content, "Grab the Widget today!");
        assert_eq!(response.product_info.product_name, "Widget");
        assert_eq!(response.product_info.price, Some(19.99));
        assert_eq!(response.ad_settings.ad_type, AdType::SocialMedia);
        assert_eq!(response.ad_settings.ad_tone, AdTone::Friendly);
        assert_eq!(response.model_used, "google/gemma-3-12b-it");
        assert!(response.generation_time >= 0.0);
        assert!(!response.request_id.is_empty());
    }

    #[tokio::test]
    async fn test_generate_stamps_fresh_request_ids() {
        let studio = studio(MockChatClient::new());
        let request = widget_request();

        let first = studio
            .generate(&request, AdType::Email, AdTone::Bold)
            .await
            .unwrap();
        let second = studio
            .generate(&request, AdType::Email, AdTone::Bold)
            .await
            .unwrap();
        assert_ne!(first.request_id, second.request_id);
    }

    #[tokio::test]
    async fn test_generate_propagates_provider_failure() {
        let chat = MockChatClient::new().with_request_failure("model offline".to_string());
        let studio = studio(chat);

        let err = studio
            .generate(&widget_request(), AdType::Email, AdTone::Urgent)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model offline"));
    }

    #[tokio::test]
    async fn test_streaming_opens_with_processing_and_ends_completed() {
        let chat = MockChatClient::new().with_stream_fragments(vec![
            "Fresh ".to_string(),
            "kicks ".to_string(),
            "await.".to_string(),
        ]);
        let studio = studio(chat);

        let events: Vec<StreamEvent> = studio
            .generate_streaming(widget_request(), AdType::SocialMedia, AdTone::Playful)
            .collect()
            .await;

        assert!(matches!(events[0], StreamEvent::Processing { .. }));
        assert_eq!(events.len(), 5);

        match events.last().unwrap() {
            StreamEvent::Completed {
                content,
                ad_settings,
                model_used,
                ..
            } => {
                assert_eq!(content, "Fresh kicks await.");
                assert_eq!(ad_settings.ad_tone, AdTone::Playful);
                assert_eq!(model_used, "google/gemma-3-12b-it");
            }
            other => panic!("expected completed event, got {:?}", other),
        }

        let terminal_count = events.iter().filter(|event| is_terminal(event)).count();
        assert_eq!(terminal_count, 1);
    }

    #[tokio::test]
    async fn test_streaming_progress_is_monotone_and_capped() {
        let long = "x".repeat(250);
        let chat = MockChatClient::new().with_stream_fragments(vec![
            long.clone(),
            long.clone(),
            "tail".to_string(),
        ]);
        let studio = studio(chat);

        let events: Vec<StreamEvent> = studio
            .generate_streaming(widget_request(), AdType::Email, AdTone::Minimalist)
            .collect()
            .await;

        let progress: Vec<f32> = events
            .iter()
            .filter_map(|event| match event {
                StreamEvent::Streaming { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect();

        assert_eq!(progress.len(), 3);
        assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(progress.iter().all(|&p| p <= 95.0));
        assert_eq!(progress[0], 50.0);
        // 500 and 504 accumulated characters are both past the pin point.
        assert_eq!(progress[1], 95.0);
        assert_eq!(progress[2], 95.0);
    }

    #[tokio::test]
    async fn test_streaming_mid_stream_failure_emits_single_error_terminal() {
        let chat = MockChatClient::new()
            .with_stream_fragments(vec!["partial".to_string()])
            .with_stream_failure("connection reset".to_string());
        let studio = studio(chat);

        let events: Vec<StreamEvent> = studio
            .generate_streaming(widget_request(), AdType::SocialMedia, AdTone::Bold)
            .collect()
            .await;

        match events.last().unwrap() {
            StreamEvent::Error {
                message,
                error_code,
                request_id,
            } => {
                assert!(message.contains("connection reset"));
                assert_eq!(error_code, "generation_failed");
                assert!(!request_id.is_empty());
            }
            other => panic!("expected error event, got {:?}", other),
        }

        let terminal_count = events.iter().filter(|event| is_terminal(event)).count();
        assert_eq!(terminal_count, 1);
        assert!(!events
            .iter()
            .any(|event| matches!(event, StreamEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn test_streaming_open_failure_emits_processing_then_error() {
        let chat = MockChatClient::new().with_request_failure("bad gateway".to_string());
        let studio = studio(chat);

        let events: Vec<StreamEvent> = studio
            .generate_streaming(widget_request(), AdType::Email, AdTone::Luxurious)
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], StreamEvent::Processing { .. }));
        assert!(matches!(events[1], StreamEvent::Error { .. }));
    }

    #[tokio::test]
    async fn test_streaming_consumer_can_drop_early() {
        let chat = MockChatClient::new();
        let probe = chat.clone();
        let studio = studio(chat);

        let mut stream =
            studio.generate_streaming(widget_request(), AdType::SocialMedia, AdTone::Friendly);
        let first = stream.next().await.unwrap();
        assert!(matches!(first, StreamEvent::Processing { .. }));
        drop(stream);

        // The producer task observes the closed channel and stops; the
        // remote call is opened at most once.
        tokio::task::yield_now().await;
        assert!(probe.get_call_count() <= 1);
    }
}
